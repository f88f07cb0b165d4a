//! Hard-coded configuration of the showroom.
//!
//! There is no configuration file. Everything that is a tunable value rather than
//! layout data lives here; the placement of models lives in [`crate::layout`].

use std::f32::consts::FRAC_PI_2;

use instant::Duration;

#[derive(Clone, Debug, PartialEq)]
pub struct CameraSettings {
    pub position: [f32; 3],
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            position: [8.0, 5.0, 8.0],
            fov_degrees: 45.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ControlSettings {
    pub target: [f32; 3],
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    pub min_azimuth_angle: f32,
    pub max_azimuth_angle: f32,
    /// Zero disables damping.
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    /// Full turns per minute. Zero disables auto-rotation.
    pub auto_rotate_speed: f32,
    pub bounce_factor: f32,
}

impl Default for ControlSettings {
    fn default() -> Self {
        Self {
            target: [0.0, 1.0, 0.0],
            min_distance: 5.0,
            max_distance: 20.0,
            min_polar_angle: 0.3,
            max_polar_angle: FRAC_PI_2 - 0.1,
            min_azimuth_angle: 0.0,
            max_azimuth_angle: FRAC_PI_2,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            auto_rotate_speed: 0.5,
            bounce_factor: 0.8,
        }
    }
}

/// Timeline of the loading overlay, measured from load completion.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlaySettings {
    /// Completion to fade start (loading bar ended, footer revealed).
    pub fade_start: Duration,
    /// Fade start to the beginning of the alpha tween.
    pub tween_delay: Duration,
    pub tween_duration: Duration,
    /// Fade start to the scene becoming ready.
    pub ready_delay: Duration,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            fade_start: Duration::from_millis(500),
            tween_delay: Duration::from_secs(1),
            tween_duration: Duration::from_secs(3),
            ready_delay: Duration::from_millis(1000),
        }
    }
}

/// CSS selectors of the page elements the showroom drives.
#[derive(Clone, Debug, PartialEq)]
pub struct Selectors {
    pub canvas: String,
    pub loading_bar: String,
    pub footer: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            canvas: "canvas.webgl".to_string(),
            loading_bar: ".loading-bar".to_string(),
            footer: ".footer".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub camera: CameraSettings,
    pub controls: ControlSettings,
    pub overlay: OverlaySettings,
    pub selectors: Selectors,
    /// Directory (native) or path below the page origin (web) holding the assets.
    pub asset_root: String,
    pub clear_colour: wgpu::Color,
    pub max_pixel_ratio: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            camera: CameraSettings::default(),
            controls: ControlSettings::default(),
            overlay: OverlaySettings::default(),
            selectors: Selectors::default(),
            asset_root: "assets".to_string(),
            clear_colour: wgpu::Color {
                r: 0.08,
                g: 0.08,
                b: 0.1,
                a: 1.0,
            },
            max_pixel_ratio: 2.0,
        }
    }
}

