//! Screen-space markers following points of interest.
//!
//! Each frame every marker is projected onto the screen and tested for occlusion by
//! casting a ray from the camera through its screen position. The state is derived
//! from scratch every frame.

use anyhow::*;
use cgmath::{MetricSpace, Point3};

use crate::{
    camera::{Camera, ndc_to_screen_offset},
    data_structures::scene_graph::Scene,
    hud::Hud,
    layout::PointOfInterest,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkerState {
    Visible,
    Hidden,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Marker {
    pub position: Point3<f32>,
    pub selector: String,
    state: MarkerState,
    screen: (f32, f32),
}

impl Marker {
    pub fn new(position: Point3<f32>, selector: impl Into<String>) -> Self {
        Self {
            position,
            selector: selector.into(),
            state: MarkerState::Hidden,
            screen: (0.0, 0.0),
        }
    }

    /// State computed by the last update.
    pub fn state(&self) -> MarkerState {
        self.state
    }

    /// Pixel offset from the viewport centre computed by the last update.
    pub fn screen(&self) -> (f32, f32) {
        self.screen
    }
}

/// Whether anything in `scene` lies between the camera and `position`.
pub fn occlusion(camera: &Camera, scene: &Scene, position: Point3<f32>) -> MarkerState {
    let ndc = camera.project(position);
    let Some(ray) = camera.ray_from_ndc(ndc.x, ndc.y) else {
        return MarkerState::Visible;
    };
    match scene.raycast(&ray) {
        Some(hit) if hit.distance < camera.position.distance(position) => MarkerState::Hidden,
        _ => MarkerState::Visible,
    }
}

#[derive(Clone, Debug, Default)]
pub struct Markers {
    markers: Vec<Marker>,
}

impl Markers {
    pub fn new(markers: Vec<Marker>) -> Self {
        Self { markers }
    }

    pub fn from_layout(points: &[PointOfInterest]) -> Self {
        Self::new(
            points
                .iter()
                .map(|point| Marker::new(point.position.into(), point.selector))
                .collect(),
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.markers.iter()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Recomputes position and state of every marker and pushes them to `hud`.
    pub fn update(
        &mut self,
        camera: &Camera,
        scene: &Scene,
        viewport: (u32, u32),
        hud: &mut impl Hud,
    ) -> Result<()> {
        for (idx, marker) in self.markers.iter_mut().enumerate() {
            let ndc = camera.project(marker.position);
            marker.screen = ndc_to_screen_offset(ndc, viewport.0 as f32, viewport.1 as f32);
            marker.state = occlusion(camera, scene, marker.position);
            hud.update_marker(idx, marker.state, marker.screen)?;
        }
        Ok(())
    }
}
