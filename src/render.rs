//! Render composition and pipeline batching.
//!
//! This module defines the [`Render`] enum describing what a frame draws. The render
//! loop sorts a `Render` into batches per pipeline: opaque baked geometry first, then
//! the translucent loading overlay on top.
//!
//! # Key types
//!
//! - [`Render<'a>`] is the enum describing render operations
//! - [`Instanced<'a>`] contains data for instanced rendering (meshes + instance buffer)
//! - [`Flat<'a>`] contains data for flat screen-space rendering (vertex + index buffers)
//!

use crate::data_structures::model::MeshPart;

/// Data for instanced object rendering: the meshes of one node and its instance buffer.
pub struct Instanced<'a> {
    pub instance: &'a wgpu::Buffer,
    pub meshes: &'a [MeshPart],
    pub amount: u32,
}

/// Data for flat (screen-space) rendering: vertex and index buffers with a bind group.
pub struct Flat<'a> {
    pub vertex: &'a wgpu::Buffer,
    pub index: &'a wgpu::Buffer,
    pub group: &'a wgpu::BindGroup,
    pub amount: u32,
}

/// Specifies how a frame should be rendered.
///
/// # Variants
///
/// - `Defaults(Vec<Instanced>)` renders a batch of opaque baked objects
/// - `Overlay(Flat)` renders a full-viewport quad on top of everything else
/// - `Composed(Vec<Render>)` recursively renders composition of multiple renders
///
pub enum Render<'a> {
    Defaults(Vec<Instanced<'a>>),
    Overlay(Flat<'a>),
    Composed(Vec<Render<'a>>),
}

impl<'a> Render<'a> {
    pub(crate) fn set_pipelines(self, basics: &mut Vec<Instanced<'a>>, overlays: &mut Vec<Flat<'a>>) {
        match self {
            Render::Defaults(mut vec) => basics.append(&mut vec),
            Render::Overlay(flat) => overlays.push(flat),
            Render::Composed(renders) => renders
                .into_iter()
                .for_each(|render| render.set_pipelines(basics, overlays)),
        }
    }
}
