#![allow(dead_code)]

use std::sync::Arc;

use cgmath::{Deg, InnerSpace, Matrix4, Point3, Vector3};
use showroom::{
    animation::{AnimationClip, Channel, Interpolation, Keyframes},
    camera::Camera,
    data_structures::{
        instance::Instance,
        primitives,
        scene_graph::{NodeData, SceneNode},
    },
    resources::ModelAsset,
};

pub const EPSILON: f32 = 1e-4;

pub fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

pub fn vec3_approx(a: Vector3<f32>, b: Vector3<f32>) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y) && approx_eq(a.z, b.z)
}

/// Translation part of a world matrix.
pub fn translation(world: &Matrix4<f32>) -> Vector3<f32> {
    world.w.truncate()
}

/// Length of each transformed basis axis, the scale of a shear-free matrix.
pub fn axis_scale(world: &Matrix4<f32>) -> Vector3<f32> {
    Vector3::new(
        world.x.truncate().magnitude(),
        world.y.truncate().magnitude(),
        world.z.truncate().magnitude(),
    )
}

/// A model file with a single unit cube node (source index 0).
pub fn cube_model(url: &str, clips: Vec<Arc<AnimationClip>>) -> ModelAsset {
    ModelAsset {
        url: url.to_string(),
        root: NodeData {
            name: "cube".to_string(),
            index: Some(0),
            transform: Instance::default(),
            meshes: vec![Arc::new(primitives::cuboid("cube", 1.0, 1.0, 1.0))],
            children: vec![],
        },
        clips,
    }
}

/// Moves node 0 linearly from x = 0 to x = `duration` over `duration` seconds.
pub fn slide_clip(name: &str, duration: f32) -> Arc<AnimationClip> {
    Arc::new(AnimationClip::new(
        name,
        vec![Channel {
            node: 0,
            interpolation: Interpolation::Linear,
            timestamps: vec![0.0, duration],
            keyframes: Keyframes::Translation(vec![
                Vector3::new(0.0, 0.0, 0.0),
                Vector3::new(duration, 0.0, 0.0),
            ]),
        }],
    ))
}

/// Camera on +Z looking at the origin.
pub fn front_camera(distance: f32) -> Camera {
    Camera::new(
        Point3::new(0.0, 0.0, distance),
        Point3::new(0.0, 0.0, 0.0),
        Deg(45.0),
        800.0 / 600.0,
        0.1,
        100.0,
    )
}

/// The parsed model below a root assembled by `assemble_model`.
pub fn model_child(root: &dyn SceneNode) -> &dyn SceneNode {
    root.get_children()[0].as_ref()
}
