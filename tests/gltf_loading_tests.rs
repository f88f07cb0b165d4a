//! Parsing model files from disk: node indices, shared meshes, rotations and clips.

mod common;

use std::{
    f32::consts::FRAC_1_SQRT_2,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use cgmath::Vector3;
use common::*;
use showroom::{
    animation::{Interpolation, Keyframes},
    data_structures::instance::Instance,
    resources::{Asset, ModelAsset, load_asset, load_model_gltf},
};

const MODEL_URL: &str = "models/pivot.gltf";

/// Node 0 (translated) holds nodes 1 and 2, both drawing mesh 0. Node 1 is turned
/// 90 degrees about Y. The animation turns node 1 linearly and moves node 2 along
/// a cubic spline whose tangents are far away from its values.
const PIVOT_GLTF: &str = r#"{
  "asset": { "version": "2.0" },
  "scene": 0,
  "scenes": [{ "nodes": [0] }],
  "nodes": [
    { "name": "pivot", "translation": [0.0, 1.0, 0.0], "children": [1, 2] },
    { "name": "first", "mesh": 0, "rotation": [0.0, 0.70710677, 0.0, 0.70710677] },
    { "name": "second", "mesh": 0 }
  ],
  "meshes": [{
    "name": "triangle",
    "primitives": [{ "attributes": { "POSITION": 0 }, "indices": 1 }]
  }],
  "animations": [{
    "name": "turn and slide",
    "channels": [
      { "sampler": 0, "target": { "node": 1, "path": "rotation" } },
      { "sampler": 1, "target": { "node": 2, "path": "translation" } }
    ],
    "samplers": [
      { "input": 2, "output": 3, "interpolation": "LINEAR" },
      { "input": 2, "output": 4, "interpolation": "CUBICSPLINE" }
    ]
  }],
  "accessors": [
    { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
      "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] },
    { "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" },
    { "bufferView": 2, "componentType": 5126, "count": 2, "type": "SCALAR",
      "min": [0.0], "max": [1.0] },
    { "bufferView": 3, "componentType": 5126, "count": 2, "type": "VEC4" },
    { "bufferView": 4, "componentType": 5126, "count": 6, "type": "VEC3" }
  ],
  "bufferViews": [
    { "buffer": 0, "byteOffset": 0, "byteLength": 36, "target": 34962 },
    { "buffer": 0, "byteOffset": 36, "byteLength": 6, "target": 34963 },
    { "buffer": 0, "byteOffset": 44, "byteLength": 8 },
    { "buffer": 0, "byteOffset": 52, "byteLength": 32 },
    { "buffer": 0, "byteOffset": 84, "byteLength": 72 }
  ],
  "buffers": [{ "byteLength": 156, "uri": "pivot.bin" }]
}"#;

fn floats(bytes: &mut Vec<u8>, values: &[f32]) {
    values
        .iter()
        .for_each(|value| bytes.extend_from_slice(&value.to_le_bytes()));
}

fn pivot_bin() -> Vec<u8> {
    let mut bytes = Vec::new();
    // positions
    floats(&mut bytes, &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
    // indices, padded to 4 bytes
    [0u16, 1, 2]
        .iter()
        .for_each(|index| bytes.extend_from_slice(&index.to_le_bytes()));
    bytes.extend_from_slice(&[0, 0]);
    // key times
    floats(&mut bytes, &[0.0, 1.0]);
    // rotations as x, y, z, w
    floats(
        &mut bytes,
        &[0.0, 0.0, 0.0, 1.0, 0.0, FRAC_1_SQRT_2, 0.0, FRAC_1_SQRT_2],
    );
    // cubic spline: in-tangent, value, out-tangent per key
    floats(
        &mut bytes,
        &[
            9.0, 9.0, 9.0, 0.0, 0.0, 0.0, 9.0, 9.0, 9.0, //
            9.0, 9.0, 9.0, 2.0, 0.0, 0.0, 9.0, 9.0, 9.0,
        ],
    );
    assert_eq!(bytes.len(), 156);
    bytes
}

/// Writes the model below a fresh directory named after the test.
fn write_pivot(test: &str, with_buffer: bool) -> PathBuf {
    let root = std::env::temp_dir().join(format!("showroom-{test}-{}", std::process::id()));
    let models = root.join("models");
    fs::create_dir_all(&models).unwrap();
    fs::write(models.join("pivot.gltf"), PIVOT_GLTF).unwrap();
    if with_buffer {
        fs::write(models.join("pivot.bin"), pivot_bin()).unwrap();
    } else {
        let _ = fs::remove_file(models.join("pivot.bin"));
    }
    root
}

fn load(root: &Path) -> anyhow::Result<ModelAsset> {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    runtime.block_on(load_model_gltf(root.to_str().unwrap(), MODEL_URL))
}

fn turned_x(transform: &Instance) -> Vector3<f32> {
    transform.rotation * Vector3::unit_x()
}

#[test]
fn hierarchy_keeps_source_indices_and_transforms() {
    let root = write_pivot("hierarchy", true);
    let model = load(&root).unwrap();

    assert_eq!(model.url, MODEL_URL);
    assert_eq!(model.root.name, "pivot");
    assert_eq!(model.root.index, Some(0));
    assert!(vec3_approx(model.root.transform.position, Vector3::new(0.0, 1.0, 0.0)));

    let indices: Vec<_> = model.root.children.iter().map(|child| child.index).collect();
    assert_eq!(indices, vec![Some(1), Some(2)]);
    // glTF stores x, y, z, w: a quarter turn about Y sends +X to -Z
    assert!(vec3_approx(
        turned_x(&model.root.children[0].transform),
        Vector3::new(0.0, 0.0, -1.0)
    ));
    assert_eq!(model.root.mesh_count(), 2);
}

#[test]
fn nodes_drawing_the_same_mesh_share_its_geometry() {
    let root = write_pivot("shared-mesh", true);
    let model = load(&root).unwrap();

    let first = &model.root.children[0].meshes[0];
    let second = &model.root.children[1].meshes[0];
    assert!(Arc::ptr_eq(first, second));
    assert_eq!(first.indices, vec![0, 1, 2]);
    let positions: Vec<_> = first.vertices.iter().map(|vertex| vertex.position).collect();
    assert_eq!(positions, vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
}

#[test]
fn clips_target_source_nodes() {
    let root = write_pivot("clips", true);
    let model = load(&root).unwrap();

    assert_eq!(model.clips.len(), 1);
    let clip = &model.clips[0];
    assert_eq!(clip.name, "turn and slide");
    assert!(approx_eq(clip.duration, 1.0));
    assert_eq!(clip.channels.len(), 2);

    let turn = &clip.channels[0];
    assert_eq!(turn.node, 1);
    assert_eq!(turn.interpolation, Interpolation::Linear);
    let mut local = Instance::default();
    turn.apply(1.0, &mut local);
    assert!(vec3_approx(turned_x(&local), Vector3::new(0.0, 0.0, -1.0)));

    let slide = &clip.channels[1];
    assert_eq!(slide.node, 2);
    assert_eq!(slide.interpolation, Interpolation::CubicSpline);
    match &slide.keyframes {
        Keyframes::Translation(values) => assert_eq!(values.len(), 6),
        other => panic!("expected translations, got {other:?}"),
    }
    // sampled at the key values, the tangents never leak in
    let mut local = Instance::default();
    slide.apply(0.5, &mut local);
    assert!(vec3_approx(local.position, Vector3::new(1.0, 0.0, 0.0)));
    slide.apply(1.0, &mut local);
    assert!(vec3_approx(local.position, Vector3::new(2.0, 0.0, 0.0)));
}

#[test]
fn gltf_urls_load_as_models() {
    let root = write_pivot("dispatch", true);
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let asset = runtime
        .block_on(load_asset(
            root.to_str().unwrap().to_string(),
            MODEL_URL.to_string(),
        ))
        .unwrap();
    assert_eq!(asset.url(), MODEL_URL);
    assert!(matches!(asset, Asset::Model(_)));
}

#[test]
fn missing_external_buffers_are_errors() {
    let root = write_pivot("missing-buffer", false);
    let err = load(&root).unwrap_err();
    assert!(format!("{err:#}").contains("pivot.bin"));
}
