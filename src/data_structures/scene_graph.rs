//! Scene graph and hierarchical scene organization.
//!
//! Provides the [`SceneNode`] trait and its two implementations: [`ContainerNode`]
//! for transform-only nodes and [`ModelNode`] for nodes carrying meshes. Every node
//! holds N instances (a local TRS and a world matrix per instance). Instance `i` of a
//! node is the child of instance `i` of its parent, so cloning an instance of a root
//! duplicates the transform state of the whole hierarchy while the geometry stays
//! shared.
//!
//! [`Scene`] owns the named root nodes of the showroom and offers the whole-scene
//! operations (world transform propagation, ray casting, buffer uploads).

use std::{mem, ops::Range, sync::Arc};

use cgmath::{Matrix4, SquareMatrix};
use log::warn;

use crate::{
    data_structures::{
        instance::{Instance, InstanceRaw},
        model::{Geometry, MeshPart},
    },
    raycast::{Aabb, Frustum, Hit, Ray},
    render::Instanced,
};

/// Parsed node hierarchy of a model file, before it becomes part of the scene.
#[derive(Clone, Debug)]
pub struct NodeData {
    pub name: String,
    /// Index of the node in its source file. Animation channels target it.
    pub index: Option<usize>,
    pub transform: Instance,
    pub meshes: Vec<Arc<Geometry>>,
    pub children: Vec<NodeData>,
}

impl NodeData {
    pub fn mesh_count(&self) -> usize {
        self.meshes.len() + self.children.iter().map(NodeData::mesh_count).sum::<usize>()
    }
}

pub trait SceneNode {
    fn name(&self) -> &str;

    /// Source file index of the node, if it came from a model file.
    fn index(&self) -> Option<usize>;

    /// World matrices of every instance, as of the last propagation.
    fn get_world_transforms(&self) -> Vec<Matrix4<f32>>;

    fn get_local_transform(&self, idx: usize) -> Option<Instance>;

    fn set_local_transform(&mut self, idx: usize, instance: Instance);

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>>;

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>>;

    fn add_child(&mut self, child: Box<dyn SceneNode>);

    fn instance_count(&self) -> usize;

    /**
     * Inserts a new instance which is a clone of the instance with index `i`, in this
     * node and in all of its descendants.
     *
     * The return value is the index of the newly created instance.
     */
    fn clone_instance(&mut self, i: usize) -> usize;

    /**
     * Multiple instances of a parent can be passed down to multiple instances of multiple children.
     * The argument `parents_world_transform` with a matching `range` size provides control over which instances are transformed.
     */
    fn update_world_transforms(&mut self, range: Range<usize>, parents_world_transform: &[Matrix4<f32>]);

    fn update_world_transform_all(&mut self) {
        let range = 0..self.instance_count();
        let identities = vec![Matrix4::identity(); range.len()];
        self.update_world_transforms(range, &identities);
    }

    fn meshes(&self) -> &[MeshPart];

    fn meshes_mut(&mut self) -> &mut [MeshPart];

    /// World transforms that survive frustum culling. Nodes without culled meshes
    /// return all of them.
    fn visible_world_transforms(&self, _frustum: Option<&Frustum>) -> Vec<Matrix4<f32>> {
        self.get_world_transforms()
    }

    fn write_to_buffers(&mut self, queue: &wgpu::Queue, device: &wgpu::Device, frustum: Option<&Frustum>);

    fn get_render(&self) -> Vec<Instanced<'_>>;
}

/// Writes `parent * local` into the world matrices of `range` and returns them.
///
/// Composing full matrices keeps a non-uniform parent scale acting along the
/// parent's axes, whatever the child's rotation.
fn propagate(
    name: &str,
    instances: &mut [(Instance, Matrix4<f32>)],
    range: Range<usize>,
    parents_world_transform: &[Matrix4<f32>],
) -> Option<Vec<Matrix4<f32>>> {
    if parents_world_transform.len() > instances.len() {
        warn!(
            "Node {name}: tried to transform with len {}, but there are only {} instances to transform.",
            parents_world_transform.len(),
            instances.len()
        );
        return None;
    }
    let Some(slice) = instances.get_mut(range.clone()) else {
        warn!(
            "Node {name}: tried to transform range {}..{}, which is out of bounds for len {}.",
            range.start,
            range.end,
            instances.len(),
        );
        return None;
    };
    Some(
        slice
            .iter_mut()
            .zip(parents_world_transform)
            .map(|((local, world), parent)| {
                *world = parent * local.to_matrix();
                *world
            })
            .collect(),
    )
}

fn clone_at(name: &str, instances: &mut Vec<(Instance, Matrix4<f32>)>, i: usize) -> bool {
    match instances.get(i).cloned() {
        Some(pair) => {
            instances.push(pair);
            true
        }
        None => {
            warn!("Node {name}: cannot clone instance {i}, there are only {}.", instances.len());
            false
        }
    }
}

/// A node without geometry. Only carries transforms for its children.
pub struct ContainerNode {
    name: String,
    index: Option<usize>,
    pub children: Vec<Box<dyn SceneNode>>,
    pub instances: Vec<(Instance, Matrix4<f32>)>,
}

impl ContainerNode {
    pub fn new(name: impl Into<String>, amount: usize) -> Self {
        Self::with_index(name, None, amount)
    }

    pub fn with_index(name: impl Into<String>, index: Option<usize>, amount: usize) -> Self {
        let instances = (0..amount)
            .map(|_| (Instance::default(), Matrix4::identity()))
            .collect();
        Self {
            name: name.into(),
            index,
            children: vec![],
            instances,
        }
    }
}

impl SceneNode for ContainerNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn index(&self) -> Option<usize> {
        self.index
    }

    fn get_world_transforms(&self) -> Vec<Matrix4<f32>> {
        self.instances.iter().map(|(_, world)| *world).collect()
    }

    fn get_local_transform(&self, idx: usize) -> Option<Instance> {
        self.instances.get(idx).map(|(local, _)| local.clone())
    }

    fn set_local_transform(&mut self, idx: usize, instance: Instance) {
        if let Some((local, _)) = self.instances.get_mut(idx) {
            *local = instance;
        }
    }

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>> {
        &self.children
    }

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>> {
        &mut self.children
    }

    fn add_child(&mut self, child: Box<dyn SceneNode>) {
        self.children.push(child);
    }

    fn instance_count(&self) -> usize {
        self.instances.len()
    }

    fn clone_instance(&mut self, i: usize) -> usize {
        if clone_at(&self.name, &mut self.instances, i) {
            for child in &mut self.children {
                child.clone_instance(i);
            }
        }
        self.instances.len().saturating_sub(1)
    }

    fn update_world_transforms(&mut self, range: Range<usize>, parents_world_transform: &[Matrix4<f32>]) {
        let Some(world_transforms) =
            propagate(&self.name, &mut self.instances, range.clone(), parents_world_transform)
        else {
            return;
        };
        for child in self.children.iter_mut() {
            child.update_world_transforms(range.clone(), &world_transforms);
        }
    }

    fn meshes(&self) -> &[MeshPart] {
        &[]
    }

    fn meshes_mut(&mut self) -> &mut [MeshPart] {
        &mut []
    }

    fn write_to_buffers(&mut self, queue: &wgpu::Queue, device: &wgpu::Device, frustum: Option<&Frustum>) {
        self.children
            .iter_mut()
            .for_each(|child| child.write_to_buffers(queue, device, frustum));
    }

    fn get_render(&self) -> Vec<Instanced<'_>> {
        self.children
            .iter()
            .flat_map(|child| child.get_render())
            .collect()
    }
}

/// A node drawing its meshes once per (visible) instance.
pub struct ModelNode {
    name: String,
    index: Option<usize>,
    children: Vec<Box<dyn SceneNode>>,
    instances: Vec<(Instance, Matrix4<f32>)>,
    meshes: Vec<MeshPart>,
    bounds: Aabb,
    instance_buffer: Option<wgpu::Buffer>,
    buffer_capacity: usize,
    visible_instances: u32,
}

impl ModelNode {
    pub fn new(name: impl Into<String>, index: Option<usize>, meshes: Vec<MeshPart>, amount: usize) -> Self {
        let instances = (0..amount)
            .map(|_| (Instance::default(), Matrix4::identity()))
            .collect();
        let bounds = Aabb::from_points(
            meshes
                .iter()
                .flat_map(|mesh| [mesh.geometry.bounds.min, mesh.geometry.bounds.max])
                .filter(|p| p.x.is_finite()),
        );
        Self {
            name: name.into(),
            index,
            children: vec![],
            instances,
            meshes,
            bounds,
            instance_buffer: None,
            buffer_capacity: 0,
            visible_instances: 0,
        }
    }

    fn is_frustum_culled(&self) -> bool {
        !self.meshes.is_empty() && self.meshes.iter().all(|mesh| mesh.frustum_culled)
    }
}

impl SceneNode for ModelNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn index(&self) -> Option<usize> {
        self.index
    }

    fn get_world_transforms(&self) -> Vec<Matrix4<f32>> {
        self.instances.iter().map(|(_, world)| *world).collect()
    }

    fn get_local_transform(&self, idx: usize) -> Option<Instance> {
        self.instances.get(idx).map(|(local, _)| local.clone())
    }

    fn set_local_transform(&mut self, idx: usize, instance: Instance) {
        if let Some((local, _)) = self.instances.get_mut(idx) {
            *local = instance;
        }
    }

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>> {
        &self.children
    }

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>> {
        &mut self.children
    }

    fn add_child(&mut self, child: Box<dyn SceneNode>) {
        self.children.push(child);
    }

    fn instance_count(&self) -> usize {
        self.instances.len()
    }

    fn clone_instance(&mut self, i: usize) -> usize {
        if clone_at(&self.name, &mut self.instances, i) {
            for child in &mut self.children {
                child.clone_instance(i);
            }
        }
        self.instances.len().saturating_sub(1)
    }

    fn update_world_transforms(&mut self, range: Range<usize>, parents_world_transform: &[Matrix4<f32>]) {
        let Some(world_transforms) =
            propagate(&self.name, &mut self.instances, range.clone(), parents_world_transform)
        else {
            return;
        };
        for child in self.children.iter_mut() {
            child.update_world_transforms(range.clone(), &world_transforms);
        }
    }

    fn meshes(&self) -> &[MeshPart] {
        &self.meshes
    }

    fn meshes_mut(&mut self) -> &mut [MeshPart] {
        &mut self.meshes
    }

    fn visible_world_transforms(&self, frustum: Option<&Frustum>) -> Vec<Matrix4<f32>> {
        let frustum = frustum.filter(|_| self.is_frustum_culled());
        self.instances
            .iter()
            .map(|(_, world)| *world)
            .filter(|world| match frustum {
                Some(frustum) => {
                    let (center, radius) = self.bounds.bounding_sphere(world);
                    frustum.intersects_sphere(center, radius)
                }
                None => true,
            })
            .collect()
    }

    fn write_to_buffers(&mut self, queue: &wgpu::Queue, device: &wgpu::Device, frustum: Option<&Frustum>) {
        for mesh in &mut self.meshes {
            mesh.ensure_uploaded(device, queue);
        }

        let raw_instances: Vec<InstanceRaw> = self
            .visible_world_transforms(frustum)
            .into_iter()
            .map(InstanceRaw::from)
            .collect();
        self.visible_instances = raw_instances.len() as u32;

        if !raw_instances.is_empty() {
            if self.instance_buffer.is_none() || self.buffer_capacity < self.instances.len() {
                self.buffer_capacity = self.instances.len();
                self.instance_buffer = Some(device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some(&format!("{} Instance Buffer", self.name)),
                    size: (self.buffer_capacity * mem::size_of::<InstanceRaw>()) as wgpu::BufferAddress,
                    usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                }));
            }
            if let Some(buffer) = &self.instance_buffer {
                queue.write_buffer(buffer, 0, bytemuck::cast_slice(&raw_instances));
            }
        }

        self.children
            .iter_mut()
            .for_each(|child| child.write_to_buffers(queue, device, frustum));
    }

    fn get_render(&self) -> Vec<Instanced<'_>> {
        let own = self
            .instance_buffer
            .as_ref()
            .filter(|_| self.visible_instances > 0)
            .map(|instance| Instanced {
                instance,
                meshes: &self.meshes,
                amount: self.visible_instances,
            });
        self.children
            .iter()
            .flat_map(|child| child.get_render())
            .chain(own)
            .collect()
    }
}

/// Builds scene nodes (one instance each) mirroring a parsed hierarchy.
pub fn instantiate(data: &NodeData) -> Box<dyn SceneNode> {
    let mut node: Box<dyn SceneNode> = if data.meshes.is_empty() {
        Box::new(ContainerNode::with_index(data.name.clone(), data.index, 1))
    } else {
        let meshes = data.meshes.iter().cloned().map(MeshPart::new).collect();
        Box::new(ModelNode::new(data.name.clone(), data.index, meshes, 1))
    };
    node.set_local_transform(0, data.transform.clone());
    for child in &data.children {
        node.add_child(instantiate(child));
    }
    node
}

/// Depth first search for the node with source index `index`.
pub fn find_node_mut<'a>(
    node: &'a mut (dyn SceneNode + 'static),
    index: usize,
) -> Option<&'a mut (dyn SceneNode + 'static)> {
    if node.index() == Some(index) {
        return Some(node);
    }
    for child in node.get_children_mut().iter_mut() {
        if let Some(found) = find_node_mut(child.as_mut(), index) {
            return Some(found);
        }
    }
    None
}

pub fn for_each_mesh(node: &dyn SceneNode, f: &mut dyn FnMut(&MeshPart)) {
    node.meshes().iter().for_each(&mut *f);
    for child in node.get_children() {
        for_each_mesh(child.as_ref(), f);
    }
}

pub fn for_each_mesh_mut(node: &mut dyn SceneNode, f: &mut dyn FnMut(&mut MeshPart)) {
    node.meshes_mut().iter_mut().for_each(&mut *f);
    for child in node.get_children_mut() {
        for_each_mesh_mut(child.as_mut(), f);
    }
}

/// Intersects `ray` with every instance of every mesh below `node`, keeping the
/// nearest hit in `best`.
pub fn raycast_node(node: &dyn SceneNode, ray: &Ray, best: &mut Option<Hit>) {
    let meshes = node.meshes();
    if !meshes.is_empty() {
        for world in node.get_world_transforms() {
            let Some(inverse) = world.invert() else {
                continue;
            };
            let local = ray.transformed(&inverse);
            for mesh in meshes {
                let limit = best.as_ref().map_or(f32::INFINITY, |hit| hit.distance);
                match local.intersect_aabb(&mesh.geometry.bounds) {
                    Some(entry) if entry < limit => {}
                    _ => continue,
                }
                for triangle in mesh.geometry.triangles() {
                    let Some(t) = local.intersect_triangle(triangle) else {
                        continue;
                    };
                    if best.as_ref().is_none_or(|hit| t < hit.distance) {
                        *best = Some(Hit {
                            distance: t,
                            point: ray.at(t),
                            geometry: mesh.geometry.name.clone(),
                        });
                    }
                }
            }
        }
    }
    for child in node.get_children() {
        raycast_node(child.as_ref(), ray, best);
    }
}

/// The named root nodes of the showroom, in insertion order.
#[derive(Default)]
pub struct Scene {
    roots: Vec<(String, Box<dyn SceneNode>)>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a root node. A root added under an existing key replaces it.
    pub fn add(&mut self, key: impl Into<String>, node: Box<dyn SceneNode>) {
        let key = key.into();
        match self.roots.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = node,
            None => self.roots.push((key, node)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&dyn SceneNode> {
        self.roots
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, node)| node.as_ref())
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut (dyn SceneNode + 'static)> {
        self.roots
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, node)| node.as_mut())
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &dyn SceneNode)> {
        self.roots.iter().map(|(k, node)| (k.as_str(), node.as_ref()))
    }

    pub fn update_world_transforms(&mut self) {
        for (_, node) in &mut self.roots {
            node.update_world_transform_all();
        }
    }

    /// Nearest intersection of `ray` with any mesh of the scene.
    pub fn raycast(&self, ray: &Ray) -> Option<Hit> {
        let mut best = None;
        for (_, node) in &self.roots {
            raycast_node(node.as_ref(), ray, &mut best);
        }
        best
    }

    pub fn write_to_buffers(&mut self, queue: &wgpu::Queue, device: &wgpu::Device, frustum: Option<&Frustum>) {
        for (_, node) in &mut self.roots {
            node.write_to_buffers(queue, device, frustum);
        }
    }

    pub fn get_render(&self) -> Vec<Instanced<'_>> {
        self.roots
            .iter()
            .flat_map(|(_, node)| node.get_render())
            .collect()
    }
}
