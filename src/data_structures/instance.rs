//! Local transforms of scene node instances and their GPU layout.
//!
//! Every clone of a showroom fixture is one instance of the fixture's node tree. An
//! [`Instance`] is the editable local TRS of one clone; world transforms are full
//! matrices (see [`crate::data_structures::scene_graph`]) and reach the vertex
//! shader as [`InstanceRaw`].

use cgmath::{Matrix4, One, Quaternion, Rad, Rotation3, Vector3};

use crate::data_structures::model;

/// Translation, rotation and scale of one instance relative to its parent.
#[derive(Clone, Debug, PartialEq)]
pub struct Instance {
    pub position: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    pub scale: Vector3<f32>,
}

impl Instance {
    pub fn new() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Quaternion::one(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    /// Uniform scale, rotation around the Y axis and a translation.
    ///
    /// This is the transform every layout entry of the showroom is expressed in.
    pub fn from_layout(position: [f32; 3], rotation_y: f32, scale: f32) -> Self {
        Self {
            position: position.into(),
            rotation: Quaternion::from_angle_y(Rad(rotation_y)),
            scale: Vector3::new(scale, scale, scale),
        }
    }

    /// `T * R * S`: scale first, then rotate, then translate.
    pub fn to_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * Matrix4::from(self.rotation)
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }
}

impl Default for Instance {
    fn default() -> Self {
        Self::new()
    }
}

/// World matrix of one visible instance as stored in the instance buffer.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    model: [[f32; 4]; 4],
}

impl From<Matrix4<f32>> for InstanceRaw {
    fn from(world: Matrix4<f32>) -> Self {
        Self { model: world.into() }
    }
}

/**
 * The matrix occupies shader locations 5 to 8, one column per location.
 */
impl model::Vertex for InstanceRaw {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
            // The shader only advances to the next instance when it starts a new instance
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 5,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                    shader_location: 6,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 7,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 12]>() as wgpu::BufferAddress,
                    shader_location: 8,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}
