//! showroom
//!
//! A pre-baked 3D showroom for native windows and the web. Every model is lit by
//! one baked texture, so the renderer draws unlit textured geometry. Around that
//! sit a loading overlay, orbit controls with a bouncing auto-rotation, looping
//! model animations and page markers that hide when geometry occludes them.
//!
//! High-level modules
//! - `session`: everything one running showroom owns, advanced once per frame
//! - `flow`: the winit event loop, asset loading and frame rendering
//! - `context`: GPU device, surface, pipelines and uploaded textures
//! - `layout`: which models go where, shelf items and points of interest
//! - `assembler`: turns loaded models and layout tables into scene nodes
//! - `data_structures`: meshes, textures, instances and the scene graph
//! - `resources`: fetching and parsing glTF models and textures
//! - `animation`: clips, mixers and per-model clocks
//! - `camera` and `controls`: perspective camera and orbit controls
//! - `markers`, `hud` and `overlay`: the page around the canvas
//!

pub mod animation;
pub mod assembler;
pub mod camera;
pub mod context;
pub mod controls;
pub mod data_structures;
pub mod flow;
pub mod hud;
pub mod layout;
pub mod loading;
pub mod markers;
pub mod overlay;
pub mod pipelines;
pub mod raycast;
pub mod render;
pub mod resources;
pub mod session;
pub mod settings;

pub use flow::run;
pub use settings::Settings;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Entry point on the web.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    run(Settings::default()).map_err(|e| JsValue::from_str(&format!("{e:?}")))
}
