//! Clip sampling, looping, per-clone mixers and per-model clocks.

mod common;

use std::sync::Arc;

use cgmath::{Quaternion, Rad, Rotation3, Vector3};
use common::*;
use instant::Duration;
use showroom::{
    animation::{
        AnimationAction, AnimationBinding, AnimationClip, AnimationDriver, Channel, Clock,
        Interpolation, Keyframes,
    },
    assembler::assemble_model,
    data_structures::{instance::Instance, scene_graph::Scene, texture::BakedTexture},
    layout::{Arrangement, ModelSpec, Placement},
};

const THREE_CLONES: &[Placement] = &[
    Placement {
        position: [0.0, 0.0, 0.0],
        rotation_y: 0.0,
    },
    Placement {
        position: [0.0, 0.0, 5.0],
        rotation_y: 0.0,
    },
    Placement {
        position: [0.0, 0.0, 10.0],
        rotation_y: 0.0,
    },
];

const BINDINGS: &[AnimationBinding] = &[
    AnimationBinding {
        instance: 0,
        clip: 0,
        time_scale: 1.0,
    },
    AnimationBinding {
        instance: 2,
        clip: 0,
        time_scale: -1.0,
    },
];

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

fn animated_scene(clips: Vec<Arc<AnimationClip>>) -> Scene {
    let spec = ModelSpec {
        key: "robots",
        url: "models/robot.glb",
        scale: 1.0,
        rotation_y: 0.0,
        position: None,
        arrangement: Arrangement::Fixtures(THREE_CLONES),
        animations: BINDINGS,
    };
    let texture = BakedTexture::new("textures/baked.jpg");
    let mut scene = Scene::new();
    scene.add(
        spec.key,
        assemble_model(&spec, &cube_model(spec.url, clips), &texture),
    );
    scene
}

fn local_x(scene: &Scene, instance: usize) -> f32 {
    let root = scene.get("robots").unwrap();
    model_child(root)
        .get_local_transform(instance)
        .unwrap()
        .position
        .x
}

#[test]
fn clip_duration_is_the_last_timestamp() {
    let clip = slide_clip("slide", 2.0);
    assert_eq!(clip.duration, 2.0);
    assert_eq!(AnimationClip::new("empty", vec![]).duration, 0.0);
}

#[test]
fn actions_loop_forwards_and_backwards() {
    let clip = slide_clip("slide", 2.0);

    let mut forward = AnimationAction::new(clip.clone(), 1.0);
    forward.update(1.9);
    forward.update(0.2);
    assert!(approx_eq(forward.time, 0.1));

    let mut backward = AnimationAction::new(clip.clone(), -1.0);
    backward.update(0.5);
    assert!(approx_eq(backward.time, 1.5));
    backward.update(2.0);
    assert!(approx_eq(backward.time, 1.5));

    let mut half = AnimationAction::new(clip, -0.5);
    half.update(1.0);
    assert!(approx_eq(half.time, 1.5));
}

#[test]
fn linear_and_step_sampling() {
    let mut local = Instance::default();
    let linear = Channel {
        node: 0,
        interpolation: Interpolation::Linear,
        timestamps: vec![0.0, 1.0, 3.0],
        keyframes: Keyframes::Translation(vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(1.0, 4.0, 0.0),
        ]),
    };
    linear.apply(2.0, &mut local);
    assert!(vec3_approx(local.position, Vector3::new(1.0, 2.0, 0.0)));
    // past the end holds the last key
    linear.apply(10.0, &mut local);
    assert!(vec3_approx(local.position, Vector3::new(1.0, 4.0, 0.0)));

    let step = Channel {
        interpolation: Interpolation::Step,
        ..linear
    };
    step.apply(2.0, &mut local);
    assert!(vec3_approx(local.position, Vector3::new(1.0, 0.0, 0.0)));
}

#[test]
fn rotations_are_slerped() {
    let mut local = Instance::default();
    let turn = Channel {
        node: 0,
        interpolation: Interpolation::Linear,
        timestamps: vec![0.0, 1.0],
        keyframes: Keyframes::Rotation(vec![
            Quaternion::from_angle_y(Rad(0.0)),
            Quaternion::from_angle_y(Rad(std::f32::consts::FRAC_PI_2)),
        ]),
    };
    turn.apply(0.5, &mut local);
    let expected = Quaternion::from_angle_y(Rad(std::f32::consts::FRAC_PI_4));
    let forward = local.rotation * Vector3::unit_z();
    assert!(vec3_approx(forward, expected * Vector3::unit_z()));
}

#[test]
fn each_clone_plays_its_own_mixer() {
    let mut scene = animated_scene(vec![slide_clip("slide", 2.0)]);
    let mut driver = AnimationDriver::new();
    assert_eq!(driver.bind("robots", &[slide_clip("slide", 2.0)], BINDINGS, ms(0)), 2);

    driver.update(&mut scene, ms(500));
    assert!(approx_eq(local_x(&scene, 0), 0.5));
    // not animated
    assert!(approx_eq(local_x(&scene, 1), 0.0));
    // negative time scale starts from the end
    assert!(approx_eq(local_x(&scene, 2), 1.5));

    driver.update(&mut scene, ms(2_500));
    assert!(approx_eq(local_x(&scene, 0), 0.5));
    assert!(approx_eq(local_x(&scene, 2), 1.5));
}

#[test]
fn animated_clones_keep_their_placement() {
    let mut scene = animated_scene(vec![slide_clip("slide", 2.0)]);
    let mut driver = AnimationDriver::new();
    driver.bind("robots", &[slide_clip("slide", 2.0)], BINDINGS, ms(0));
    driver.update(&mut scene, ms(1_000));
    scene.update_world_transforms();

    let root = scene.get("robots").unwrap();
    let worlds = model_child(root).get_world_transforms();
    assert!(vec3_approx(translation(&worlds[0]), Vector3::new(1.0, 0.0, 0.0)));
    assert!(vec3_approx(translation(&worlds[2]), Vector3::new(1.0, 0.0, 10.0)));
}

#[test]
fn groups_advance_on_their_own_clocks() {
    let mut driver = AnimationDriver::new();
    let clips = [slide_clip("slide", 10.0)];
    let one: &[AnimationBinding] = &BINDINGS[..1];
    driver.bind("robots", &clips, one, ms(0));
    driver.bind("missing", &clips, one, ms(3_000));

    let mut scene = animated_scene(vec![slide_clip("slide", 10.0)]);
    driver.update(&mut scene, ms(4_000));

    let groups = driver.groups();
    assert_eq!(groups[0].clock.elapsed(), ms(4_000));
    assert_eq!(groups[1].clock.elapsed(), ms(1_000));
    assert!(approx_eq(groups[0].mixers[0].action().time, 4.0));
    // a root missing from the scene is skipped but its clock still runs
    assert!(approx_eq(groups[1].mixers[0].action().time, 0.0));
    assert!(approx_eq(local_x(&scene, 0), 4.0));
}

#[test]
fn missing_clips_are_skipped() {
    let mut driver = AnimationDriver::new();
    assert_eq!(driver.bind("robots", &[], BINDINGS, ms(0)), 0);

    let wants_second_clip = [AnimationBinding {
        instance: 0,
        clip: 1,
        time_scale: 1.0,
    }];
    assert_eq!(
        driver.bind("robots", &[slide_clip("slide", 1.0)], &wants_second_clip, ms(0)),
        0
    );
    assert!(driver.groups().is_empty());
}

#[test]
fn clock_deltas_follow_session_time() {
    let mut clock = Clock::new(ms(1_000));
    assert_eq!(clock.get_delta(ms(1_250)), ms(250));
    assert_eq!(clock.get_delta(ms(1_250)), ms(0));
    // time never runs backwards
    assert_eq!(clock.get_delta(ms(1_000)), ms(0));
    assert_eq!(clock.elapsed(), ms(250));
}
