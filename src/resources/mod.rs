//! Asset loading: model files, their animations and the baked texture.
//!
//! Loading produces plain CPU data ([`Asset`]) that can be moved across threads;
//! GPU uploads happen later on the render thread.

use std::{collections::HashMap, sync::Arc};

use anyhow::*;
use log::{debug, warn};

use crate::{
    animation::AnimationClip,
    data_structures::{
        instance::Instance,
        model::{Geometry, ModelVertex},
        scene_graph::NodeData,
    },
};

pub mod animation;
pub mod texture;

pub use texture::{load_binary, load_texture_image};

/// A parsed model file.
#[derive(Clone, Debug)]
pub struct ModelAsset {
    pub url: String,
    pub root: NodeData,
    pub clips: Vec<Arc<AnimationClip>>,
}

#[derive(Debug)]
pub struct TextureAsset {
    pub url: String,
    pub image: image::DynamicImage,
}

#[derive(Debug)]
pub enum Asset {
    Model(ModelAsset),
    Texture(TextureAsset),
}

impl Asset {
    pub fn url(&self) -> &str {
        match self {
            Asset::Model(model) => &model.url,
            Asset::Texture(texture) => &texture.url,
        }
    }
}

fn is_model(url: &str) -> bool {
    let url = url.to_ascii_lowercase();
    url.ends_with(".glb") || url.ends_with(".gltf")
}

/// Loads `url` below `root`, as a model or as a texture depending on its extension.
pub async fn load_asset(root: String, url: String) -> Result<Asset> {
    if is_model(&url) {
        Ok(Asset::Model(load_model_gltf(&root, &url).await?))
    } else {
        let image = load_texture_image(&root, &url).await?;
        Ok(Asset::Texture(TextureAsset { url, image }))
    }
}

/// Directory part of `url` including the trailing slash, used to resolve external
/// buffers of `.gltf` files.
fn base_dir(url: &str) -> &str {
    url.rfind('/').map_or("", |idx| &url[..=idx])
}

pub async fn load_model_gltf(root: &str, url: &str) -> Result<ModelAsset> {
    let bytes = load_binary(root, url).await?;
    let gltf = gltf::Gltf::from_slice(&bytes).with_context(|| format!("Parsing {url}"))?;

    let buffer_data = futures::future::try_join_all(gltf.buffers().map(|buffer| {
        let blob = gltf.blob.as_deref();
        async move {
            match buffer.source() {
                gltf::buffer::Source::Bin => blob
                    .map(<[u8]>::to_vec)
                    .ok_or_else(|| anyhow!("{url} references a binary chunk it does not have")),
                gltf::buffer::Source::Uri(uri) if uri.starts_with("data:") => {
                    bail!("{url}: embedded data URIs are not supported, export as .glb")
                }
                gltf::buffer::Source::Uri(uri) => {
                    load_binary(root, &format!("{}{}", base_dir(url), uri)).await
                }
            }
        }
    }))
    .await?;

    let clips = animation::load_clips(&gltf.document, &buffer_data);

    let scene = gltf
        .default_scene()
        .or_else(|| gltf.scenes().next())
        .ok_or_else(|| anyhow!("{url} contains no scene"))?;
    let mut geometry_cache = HashMap::new();
    let mut roots = scene
        .nodes()
        .map(|node| to_node_data(url, node, &buffer_data, &mut geometry_cache))
        .collect::<Vec<_>>();

    let root = if roots.len() == 1 {
        roots.remove(0)
    } else {
        NodeData {
            name: url.to_string(),
            index: None,
            transform: Instance::default(),
            meshes: vec![],
            children: roots,
        }
    };
    debug!(
        "{url}: {} meshes, {} animation clips",
        root.mesh_count(),
        clips.len()
    );

    Ok(ModelAsset {
        url: url.to_string(),
        root,
        clips,
    })
}

fn to_node_data(
    url: &str,
    node: gltf::Node,
    buffers: &[Vec<u8>],
    geometry_cache: &mut HashMap<usize, Vec<Arc<Geometry>>>,
) -> NodeData {
    let meshes = match node.mesh() {
        Some(mesh) => geometry_cache
            .entry(mesh.index())
            .or_insert_with(|| read_mesh(url, &mesh, buffers))
            .clone(),
        None => vec![],
    };
    let (position, rotation, scale) = node.transform().decomposed();
    let transform = Instance {
        position: position.into(),
        rotation: cgmath::Quaternion::new(rotation[3], rotation[0], rotation[1], rotation[2]),
        scale: scale.into(),
    };
    let children = node
        .children()
        .map(|child| to_node_data(url, child, buffers, geometry_cache))
        .collect();
    NodeData {
        name: node
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("{url}#{}", node.index())),
        index: Some(node.index()),
        transform,
        meshes,
        children,
    }
}

fn read_mesh(url: &str, mesh: &gltf::Mesh, buffers: &[Vec<u8>]) -> Vec<Arc<Geometry>> {
    let name = mesh
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("{url} mesh {}", mesh.index()));
    mesh.primitives()
        .filter_map(|primitive| {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                warn!("{name}: skipping primitive with mode {:?}", primitive.mode());
                return None;
            }
            let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));

            let mut vertices: Vec<ModelVertex> = reader
                .read_positions()?
                .map(|position| ModelVertex {
                    position,
                    tex_coords: Default::default(),
                })
                .collect();
            if let Some(tex_coords) = reader.read_tex_coords(0) {
                vertices
                    .iter_mut()
                    .zip(tex_coords.into_f32())
                    .for_each(|(vertex, uv)| vertex.tex_coords = uv);
            }

            let indices = match reader.read_indices() {
                Some(indices) => indices.into_u32().collect(),
                None => (0..vertices.len() as u32).collect(),
            };
            Some(Arc::new(Geometry::new(
                format!("{name}/{}", primitive.index()),
                vertices,
                indices,
            )))
        })
        .collect()
}
