//! Meshes, materials and the draw helpers used by the render passes.
//!
//! Geometry is kept on the CPU ([`Geometry`]) so that it can be shared between
//! fixture clones and ray cast against. GPU buffers ([`GpuMesh`]) are created
//! lazily the first time a node writes its buffers.

use std::{ops::Range, sync::Arc};

use wgpu::util::DeviceExt;

use crate::{
    data_structures::texture::{self, TextureHandle},
    raycast::Aabb,
};

pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

/// Vertex layout of every showroom mesh.
///
/// Lighting is baked into the texture, so position and texture coordinates are all
/// the shader needs.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
}

impl Vertex for ModelVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

/// Triangle geometry in model space. Read-only once created.
#[derive(Debug)]
pub struct Geometry {
    pub name: String,
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
    pub bounds: Aabb,
}

impl Geometry {
    pub fn new(name: impl Into<String>, vertices: Vec<ModelVertex>, indices: Vec<u32>) -> Self {
        let bounds = Aabb::from_points(vertices.iter().map(|v| v.position.into()));
        Self {
            name: name.into(),
            vertices,
            indices,
            bounds,
        }
    }

    /// Triangles as model-space corner positions. Indices pointing past the vertex
    /// list are skipped.
    pub fn triangles(&self) -> impl Iterator<Item = [cgmath::Point3<f32>; 3]> + '_ {
        self.indices.chunks_exact(3).filter_map(|tri| {
            let a = self.vertices.get(tri[0] as usize)?;
            let b = self.vertices.get(tri[1] as usize)?;
            let c = self.vertices.get(tri[2] as usize)?;
            Some([a.position.into(), b.position.into(), c.position.into()])
        })
    }

    pub fn upload(&self, device: &wgpu::Device) -> GpuMesh {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertex Buffer", self.name)),
            contents: bytemuck::cast_slice(&self.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Index Buffer", self.name)),
            contents: bytemuck::cast_slice(&self.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        GpuMesh {
            vertex_buffer,
            index_buffer,
            num_elements: self.indices.len() as u32,
            color_material: None,
        }
    }
}

/// What a mesh is painted with.
#[derive(Clone, Debug)]
pub enum Surface {
    /// Sampled from the shared baked texture.
    Baked(TextureHandle),
    /// Flat RGBA colour, used by the generated shelf items.
    Color([u8; 4]),
    /// Nothing assigned yet; drawn with the placeholder material.
    Unassigned,
}

impl Surface {
    pub fn texture(&self) -> Option<&TextureHandle> {
        match self {
            Surface::Baked(handle) => Some(handle),
            _ => None,
        }
    }
}

/// One drawable part of a node: shared geometry plus how it is painted.
#[derive(Debug)]
pub struct MeshPart {
    pub geometry: Arc<Geometry>,
    pub surface: Surface,
    pub frustum_culled: bool,
    pub(crate) gpu: Option<GpuMesh>,
}

impl MeshPart {
    pub fn new(geometry: Arc<Geometry>) -> Self {
        Self {
            geometry,
            surface: Surface::Unassigned,
            frustum_culled: false,
            gpu: None,
        }
    }

    pub fn with_surface(mut self, surface: Surface) -> Self {
        self.surface = surface;
        self
    }

    /// Uploads the geometry (and the flat colour material) once.
    pub(crate) fn ensure_uploaded(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) {
        if self.gpu.is_some() {
            return;
        }
        let mut gpu = self.geometry.upload(device);
        if let Surface::Color(rgba) = self.surface {
            let colour = texture::Texture::create_solid(rgba, device, queue);
            gpu.color_material = Some(Material::new(
                device,
                &format!("{} colour", self.geometry.name),
                colour,
                &texture::texture_layout(device),
            ));
        }
        self.gpu = Some(gpu);
    }

    pub(crate) fn gpu(&self) -> Option<&GpuMesh> {
        self.gpu.as_ref()
    }
}

/// Uploaded vertex and index buffers of a [`Geometry`].
#[derive(Debug)]
pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_elements: u32,
    pub color_material: Option<Material>,
}

/// A texture bound for sampling in the fragment shader.
#[derive(Debug)]
pub struct Material {
    #[allow(unused)]
    pub name: String,
    #[allow(unused)]
    pub texture: texture::Texture,
    pub bind_group: wgpu::BindGroup,
}

impl Material {
    pub fn new(
        device: &wgpu::Device,
        name: &str,
        texture: texture::Texture,
        layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
            label: Some(name),
        });

        Self {
            name: name.to_string(),
            texture,
            bind_group,
        }
    }
}

pub trait DrawModel {
    fn draw_mesh_instanced(
        &mut self,
        mesh: &GpuMesh,
        material: &Material,
        instances: Range<u32>,
        camera_bind_group: &wgpu::BindGroup,
    );
}

impl DrawModel for wgpu::RenderPass<'_> {
    fn draw_mesh_instanced(
        &mut self,
        mesh: &GpuMesh,
        material: &Material,
        instances: Range<u32>,
        camera_bind_group: &wgpu::BindGroup,
    ) {
        self.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        self.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.set_bind_group(0, &material.bind_group, &[]);
        self.set_bind_group(1, camera_bind_group, &[]);
        self.draw_indexed(0..mesh.num_elements, 0, instances);
    }
}
