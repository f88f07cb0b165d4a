//! Showroom data structures: meshes, textures, scene graphs, and instances.
//!
//! This module contains the core data types for scene representation:
//!
//! - `model` contains shared geometry, mesh parts and GPU materials
//! - `texture` contains the GPU texture wrapper and the shared baked texture handle
//! - `instance` holds per-instance transformation data
//! - `scene_graph` enables hierarchical scene organization
//! - `primitives` generates geometry that is not loaded from files

pub mod instance;
pub mod model;
pub mod primitives;
pub mod scene_graph;
pub mod texture;
