//! Marker projection and ray-cast occlusion.

mod common;

use std::sync::Arc;

use cgmath::{Deg, InnerSpace, MetricSpace, Point3, Quaternion, Rotation3, Vector3};
use common::*;
use showroom::{
    assembler::assemble_box_items,
    camera::{Camera, ndc_to_screen_offset},
    data_structures::{
        instance::Instance,
        model::MeshPart,
        primitives,
        scene_graph::{ContainerNode, ModelNode, Scene, SceneNode},
    },
    hud::HeadlessHud,
    layout::{BoxItem, PointOfInterest},
    markers::{MarkerState, Markers, occlusion},
};

fn wall_at_origin() -> Scene {
    let mut scene = Scene::new();
    scene.add(
        "wall",
        assemble_box_items(&[BoxItem {
            position: [0.0, 0.0, 0.0],
            rotation_y: 0.0,
            size: [2.0, 2.0, 2.0],
            colour: [255, 255, 255, 255],
        }]),
    );
    scene.update_world_transforms();
    scene
}

const BEHIND_THE_WALL: PointOfInterest = PointOfInterest {
    position: [0.1, 0.2, -5.0],
    selector: ".point-0",
};

const IN_FRONT_OF_THE_WALL: PointOfInterest = PointOfInterest {
    position: [0.1, 0.2, 3.0],
    selector: ".point-1",
};

#[test]
fn empty_scene_hides_nothing() {
    let camera = front_camera(10.0);
    let scene = Scene::new();
    assert_eq!(
        occlusion(&camera, &scene, Point3::new(0.0, 0.0, -5.0)),
        MarkerState::Visible
    );
}

#[test]
fn geometry_between_camera_and_marker_hides_it() {
    let camera = front_camera(10.0);
    let scene = wall_at_origin();
    assert_eq!(
        occlusion(&camera, &scene, BEHIND_THE_WALL.position.into()),
        MarkerState::Hidden
    );
    assert_eq!(
        occlusion(&camera, &scene, IN_FRONT_OF_THE_WALL.position.into()),
        MarkerState::Visible
    );
}

#[test]
fn markers_report_to_the_hud_every_update() {
    let camera = front_camera(10.0);
    let scene = wall_at_origin();
    let mut markers = Markers::from_layout(&[BEHIND_THE_WALL, IN_FRONT_OF_THE_WALL]);
    let mut hud = HeadlessHud::new();

    markers.update(&camera, &scene, (800, 600), &mut hud).unwrap();
    assert_eq!(hud.markers.len(), 2);
    assert_eq!(hud.markers[0].map(|(state, _)| state), Some(MarkerState::Hidden));
    assert_eq!(hud.markers[1].map(|(state, _)| state), Some(MarkerState::Visible));

    let states: Vec<_> = markers.iter().map(|marker| marker.state()).collect();
    assert_eq!(states, vec![MarkerState::Hidden, MarkerState::Visible]);

    // the wall moves away, the marker comes back
    let empty = Scene::new();
    markers.update(&camera, &empty, (800, 600), &mut hud).unwrap();
    assert_eq!(hud.markers[0].map(|(state, _)| state), Some(MarkerState::Visible));
}

#[test]
fn screen_offset_is_relative_to_the_viewport_centre() {
    let camera = front_camera(10.0);
    let centre = camera.project(Point3::new(0.0, 0.0, 0.0));
    let (x, y) = ndc_to_screen_offset(centre, 800.0, 600.0);
    assert!(approx_eq(x, 0.0) && approx_eq(y, 0.0));

    // up in the world is up on screen, which is negative in CSS
    let above = camera.project(Point3::new(0.0, 1.0, 0.0));
    let (_, y) = ndc_to_screen_offset(above, 800.0, 600.0);
    assert!(y < 0.0);

    let right = camera.project(Point3::new(1.0, 0.0, 0.0));
    let (x, _) = ndc_to_screen_offset(right, 800.0, 600.0);
    assert!(x > 0.0);
}

#[test]
fn rays_through_the_projection_pass_the_marker() {
    let camera = front_camera(10.0);
    let marker = Point3::new(0.5, -0.3, 1.0);
    let ndc = camera.project(marker);
    let ray = camera.ray_from_ndc(ndc.x, ndc.y).unwrap();
    let along = ray.at(camera.position.distance(marker));
    assert!((along - marker).magnitude() < 1e-3);
}

/// A unit cube turned 90 degrees about Y below a parent stretched along world X.
fn stretched_parent_over_turned_cube() -> Scene {
    let mut parent = ContainerNode::new("stretched", 1);
    parent.set_local_transform(
        0,
        Instance {
            scale: Vector3::new(4.0, 1.0, 1.0),
            ..Instance::default()
        },
    );
    let cube = Arc::new(primitives::cuboid("cube", 1.0, 1.0, 1.0));
    let mut child = ModelNode::new("turned", Some(0), vec![MeshPart::new(cube)], 1);
    child.set_local_transform(
        0,
        Instance {
            rotation: Quaternion::from_angle_y(Deg(90.0)),
            ..Instance::default()
        },
    );
    parent.add_child(Box::new(child));

    let mut scene = Scene::new();
    scene.add("stretched", Box::new(parent));
    scene.update_world_transforms();
    scene
}

#[test]
fn parent_scale_acts_along_the_parent_axes() {
    let scene = stretched_parent_over_turned_cube();
    let parent = scene.get("stretched").unwrap();
    let world = model_child(parent).get_world_transforms()[0];
    // the child's local X now points along world -Z and keeps unit length,
    // its local Z points along world X and picks up the stretch
    assert!(vec3_approx(axis_scale(&world), Vector3::new(1.0, 1.0, 4.0)));
    let corner = world * cgmath::Vector4::new(0.5, 0.5, 0.5, 1.0);
    assert!(vec3_approx(corner.truncate(), Vector3::new(2.0, 0.5, -0.5)));
}

#[test]
fn stretched_geometry_hides_markers_inside_it() {
    let camera = Camera::new(
        Point3::new(10.0, 0.0, 0.0),
        Point3::new(0.0, 0.0, 0.0),
        Deg(45.0),
        800.0 / 600.0,
        0.1,
        100.0,
    );
    let scene = stretched_parent_over_turned_cube();
    // the box reaches x = 2 after the parent stretch
    assert_eq!(
        occlusion(&camera, &scene, Point3::new(1.5, 0.0, 0.0)),
        MarkerState::Hidden
    );
    assert_eq!(
        occlusion(&camera, &scene, Point3::new(3.0, 0.0, 0.0)),
        MarkerState::Visible
    );
}
