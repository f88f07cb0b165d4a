//! Turns loaded models and the layout tables into scene nodes.

use std::sync::Arc;

use log::{info, warn};

use crate::{
    data_structures::{
        instance::Instance,
        model::{MeshPart, Surface},
        primitives,
        scene_graph::{ContainerNode, ModelNode, SceneNode, for_each_mesh_mut, instantiate},
        texture::TextureHandle,
    },
    layout::{Arrangement, BoxItem, ModelSpec, Placement},
    resources::ModelAsset,
};

/// Key of the generated shelf items in the scene.
pub const BOX_ITEMS_KEY: &str = "items";

/// Builds the scene node of one model.
///
/// The returned container carries one instance per clone of the model; the parsed
/// hierarchy below it is shared by all clones. Every mesh is painted with
/// `texture` and frustum culled.
pub fn assemble_model(spec: &ModelSpec, asset: &ModelAsset, texture: &TextureHandle) -> Box<dyn SceneNode> {
    let placements: Vec<Placement> = match spec.arrangement {
        Arrangement::Single => vec![Placement {
            position: spec.position.unwrap_or([0.0; 3]),
            rotation_y: spec.rotation_y,
        }],
        Arrangement::Fixtures(table) => table.to_vec(),
        Arrangement::Grid(grid) => grid.placements(spec.rotation_y),
    };

    if placements.is_empty() {
        warn!("{} has an empty placement table, nothing is shown", spec.key);
        return Box::new(ContainerNode::new(spec.key, 0));
    }

    let mut root = ContainerNode::new(spec.key, 1);
    let mut model = instantiate(&asset.root);
    for_each_mesh_mut(model.as_mut(), &mut |mesh: &mut MeshPart| {
        mesh.surface = Surface::Baked(texture.clone());
        mesh.frustum_culled = true;
    });
    root.add_child(model);

    for (idx, placement) in placements.iter().enumerate() {
        if idx > 0 {
            root.clone_instance(0);
        }
        root.set_local_transform(
            idx,
            Instance::from_layout(placement.position, placement.rotation_y, spec.scale),
        );
    }
    info!("Placed {} x{}", spec.url, root.instance_count());

    Box::new(root)
}

/// One flat coloured box per item, all sharing one unit cube.
pub fn assemble_box_items(items: &[BoxItem]) -> Box<dyn SceneNode> {
    let cube = Arc::new(primitives::cuboid("item box", 1.0, 1.0, 1.0));
    let mut root = ContainerNode::new(BOX_ITEMS_KEY, 1);
    for (idx, item) in items.iter().enumerate() {
        let mut mesh = MeshPart::new(cube.clone()).with_surface(Surface::Color(item.colour));
        mesh.frustum_culled = true;
        let mut node = ModelNode::new(format!("item {idx}"), None, vec![mesh], 1);
        node.set_local_transform(
            0,
            Instance {
                scale: item.size.into(),
                ..Instance::from_layout(item.position, item.rotation_y, 1.0)
            },
        );
        root.add_child(Box::new(node));
    }
    Box::new(root)
}
