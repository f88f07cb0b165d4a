//! Orbit controls: limits, damping and the bouncing auto-rotation.

mod common;

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

use cgmath::{Deg, MetricSpace, Point3};
use common::approx_eq;
use showroom::{camera::Camera, controls::OrbitControls, settings::ControlSettings};

fn showroom_camera() -> Camera {
    Camera::new(
        Point3::new(8.0, 5.0, 8.0),
        Point3::new(0.0, 1.0, 0.0),
        Deg(45.0),
        16.0 / 9.0,
        0.1,
        100.0,
    )
}

#[test]
fn starts_from_the_camera_position() {
    let camera = showroom_camera();
    let controls = OrbitControls::new(&ControlSettings::default(), &camera);
    assert!(approx_eq(controls.azimuth(), FRAC_PI_4));
    assert!(approx_eq(controls.distance(), 12.0));
}

#[test]
fn auto_rotation_bounces_and_decays() {
    let mut camera = showroom_camera();
    let settings = ControlSettings::default();
    let mut controls = OrbitControls::new(&settings, &camera);

    let mut bounces = Vec::new();
    let mut last_bounce_frame = None;
    for frame in 0..2_000 {
        if controls.update(&mut camera, 0.1) && controls.bounce_off_azimuth_limits() {
            if let Some(last) = last_bounce_frame {
                assert!(frame - last > 1, "bounced on consecutive frames");
            }
            last_bounce_frame = Some(frame);
            bounces.push(controls.auto_rotate_speed);
        }
        assert!(controls.azimuth() >= settings.min_azimuth_angle - 1e-5);
        assert!(controls.azimuth() <= settings.max_azimuth_angle + 1e-5);
    }

    assert!(bounces.len() >= 2, "expected several bounces, got {bounces:?}");
    // heading towards azimuth 0 first, the bounce reverses the direction
    assert!(approx_eq(bounces[0], -0.5 * 0.8));
    for pair in bounces.windows(2) {
        assert!(approx_eq(pair[1], -pair[0] * settings.bounce_factor));
    }
}

#[test]
fn no_auto_rotation_while_dragging() {
    let mut camera = showroom_camera();
    let mut controls = OrbitControls::new(&ControlSettings::default(), &camera);
    controls.set_interacting(true);
    assert!(controls.is_interacting());
    let azimuth = controls.azimuth();
    for _ in 0..100 {
        controls.update(&mut camera, 0.1);
    }
    assert!(approx_eq(controls.azimuth(), azimuth));
}

#[test]
fn polar_angle_stays_in_band() {
    let mut camera = showroom_camera();
    let settings = ControlSettings::default();
    let mut controls = OrbitControls::new(&settings, &camera);

    controls.rotate(0.0, 10_000.0, 600.0);
    for _ in 0..200 {
        controls.update(&mut camera, 0.016);
    }
    assert!(approx_eq(controls.polar(), settings.min_polar_angle));

    controls.rotate(0.0, -10_000.0, 600.0);
    for _ in 0..200 {
        controls.update(&mut camera, 0.016);
    }
    assert!(approx_eq(controls.polar(), settings.max_polar_angle));
    // never below the floor
    assert!(camera.position.y > settings.target[1]);
    assert!(settings.max_polar_angle < FRAC_PI_2);
}

#[test]
fn dolly_is_clamped_to_distance_limits() {
    let mut camera = showroom_camera();
    let settings = ControlSettings::default();
    let mut controls = OrbitControls::new(&settings, &camera);

    for _ in 0..50 {
        controls.dolly(1_000.0);
        controls.update(&mut camera, 0.016);
    }
    assert!(approx_eq(controls.distance(), settings.max_distance));
    assert!(approx_eq(
        camera.position.distance(Point3::from(settings.target)),
        settings.max_distance
    ));

    for _ in 0..50 {
        controls.dolly(-1_000.0);
        controls.update(&mut camera, 0.016);
    }
    assert!(approx_eq(controls.distance(), settings.min_distance));
}

#[test]
fn damping_releases_a_drag_over_several_frames() {
    let mut camera = showroom_camera();
    let mut controls = OrbitControls::new(
        &ControlSettings {
            auto_rotate_speed: 0.0,
            ..ControlSettings::default()
        },
        &camera,
    );
    let start = controls.azimuth();
    controls.rotate(-20.0, 0.0, 600.0);

    controls.update(&mut camera, 0.016);
    let first = controls.azimuth() - start;
    controls.update(&mut camera, 0.016);
    let second = controls.azimuth() - start;
    assert!(first > 0.0);
    assert!(second > first, "the drag keeps turning the camera after release");
}
