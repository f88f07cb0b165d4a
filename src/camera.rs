//! Perspective camera, projection helpers and the camera uniform.
//!
//! The camera itself works in OpenGL clip conventions (as `cgmath::perspective`
//! produces them), which is also what marker projection and ray unprojection
//! expect. Only the GPU uniform is converted to wgpu's depth range.

use cgmath::*;

use crate::raycast::Ray;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub fovy: Rad<f32>,
    pub aspect: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    pub fn new<F: Into<Rad<f32>>>(
        position: Point3<f32>,
        target: Point3<f32>,
        fovy: F,
        aspect: f32,
        znear: f32,
        zfar: f32,
    ) -> Self {
        Self {
            position,
            target,
            up: Vector3::unit_y(),
            fovy: fovy.into(),
            aspect,
            znear,
            zfar,
        }
    }

    /// Aspect ratio follows the viewport. Zero sized viewports are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }

    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }

    /// World point to normalized device coordinates.
    pub fn project(&self, world: Point3<f32>) -> Point3<f32> {
        let clip = self.view_projection() * world.to_homogeneous();
        Point3::from_homogeneous(clip)
    }

    /// Normalized device coordinates back to a world point.
    pub fn unproject(&self, ndc: Point3<f32>) -> Option<Point3<f32>> {
        let inverse = self.view_projection().invert()?;
        Some(Point3::from_homogeneous(inverse * ndc.to_homogeneous()))
    }

    /// Ray from the camera through the screen point `ndc` (x and y in [-1, 1]).
    pub fn ray_from_ndc(&self, x: f32, y: f32) -> Option<Ray> {
        let through = self.unproject(Point3::new(x, y, 0.5))?;
        let direction = through - self.position;
        if direction.magnitude2() <= f32::EPSILON {
            return None;
        }
        Some(Ray::new(self.position, direction))
    }
}

/// Offset in pixels from the centre of a `width` x `height` viewport for a point in
/// normalized device coordinates. Positive y points down, like CSS.
pub fn ndc_to_screen_offset(ndc: Point3<f32>, width: f32, height: f32) -> (f32, f32) {
    (ndc.x * width * 0.5, -ndc.y * height * 0.5)
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_position: [f32; 4],
    pub view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera) {
        self.view_position = camera.position.to_homogeneous().into();
        self.view_proj = (OPENGL_TO_WGPU_MATRIX * camera.view_projection()).into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// GPU side of the camera: uniform buffer and its bind group.
#[derive(Debug)]
pub struct CameraResources {
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}
