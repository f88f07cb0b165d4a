//! Orbit controls: a damped camera rotating on a sphere around a target.
//!
//! Rotation is kept in spherical coordinates (azimuth `theta` around +Y measured
//! from +Z, polar `phi` measured from +Y). User drags and the continuous
//! auto-rotation accumulate into a pending delta that damping releases over several
//! frames. Whenever an update moves the camera, [`OrbitControls::bounce_off_azimuth_limits`]
//! reverses and weakens the auto-rotation once the azimuth band is hit.

use std::f32::consts::PI;

use cgmath::{InnerSpace, MetricSpace, Point3, Vector3};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

use crate::{camera::Camera, settings::ControlSettings};

const EPS: f32 = 1e-6;

#[derive(Clone, Debug)]
pub struct OrbitControls {
    pub target: Point3<f32>,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    pub min_azimuth_angle: f32,
    pub max_azimuth_angle: f32,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub auto_rotate: bool,
    pub auto_rotate_speed: f32,
    /// Scale applied to the auto-rotate speed on every bounce, in (0, 1).
    pub bounce_factor: f32,

    theta: f32,
    phi: f32,
    radius: f32,
    delta_theta: f32,
    delta_phi: f32,
    scale: f32,

    dragging: bool,
    pointer: Option<(f64, f64)>,
    last_position: Option<Point3<f32>>,
}

impl OrbitControls {
    /// Controls orbiting `settings.target`, starting from the current camera position.
    pub fn new(settings: &ControlSettings, camera: &Camera) -> Self {
        let target = Point3::from(settings.target);
        let offset = camera.position - target;
        let radius = offset.magnitude();
        let (theta, phi) = if radius > EPS {
            (offset.x.atan2(offset.z), (offset.y / radius).clamp(-1.0, 1.0).acos())
        } else {
            (0.0, PI / 2.0)
        };
        Self {
            target,
            min_distance: settings.min_distance,
            max_distance: settings.max_distance,
            min_polar_angle: settings.min_polar_angle,
            max_polar_angle: settings.max_polar_angle,
            min_azimuth_angle: settings.min_azimuth_angle,
            max_azimuth_angle: settings.max_azimuth_angle,
            enable_damping: settings.damping_factor > 0.0,
            damping_factor: settings.damping_factor,
            rotate_speed: settings.rotate_speed,
            zoom_speed: settings.zoom_speed,
            auto_rotate: settings.auto_rotate_speed != 0.0,
            auto_rotate_speed: settings.auto_rotate_speed,
            bounce_factor: settings.bounce_factor,
            theta,
            phi,
            radius,
            delta_theta: 0.0,
            delta_phi: 0.0,
            scale: 1.0,
            dragging: false,
            pointer: None,
            last_position: None,
        }
    }

    pub fn azimuth(&self) -> f32 {
        self.theta
    }

    pub fn polar(&self) -> f32 {
        self.phi
    }

    pub fn distance(&self) -> f32 {
        self.radius
    }

    pub fn is_interacting(&self) -> bool {
        self.dragging
    }

    /// Auto-rotation pauses while the user is interacting.
    pub fn set_interacting(&mut self, interacting: bool) {
        self.dragging = interacting;
        if !interacting {
            self.pointer = None;
        }
    }

    /// Pointer drag by (`dx`, `dy`) pixels. A drag over the full viewport height
    /// turns the camera once around.
    pub fn rotate(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        let height = viewport_height.max(1.0);
        self.delta_theta -= 2.0 * PI * dx / height * self.rotate_speed;
        self.delta_phi -= 2.0 * PI * dy / height * self.rotate_speed;
    }

    /// Wheel input. Positive deltas move the camera away from the target.
    pub fn dolly(&mut self, delta: f32) {
        if delta == 0.0 {
            return;
        }
        let zoom = 0.95_f32.powf(self.zoom_speed * (delta * 0.01).abs());
        if delta > 0.0 {
            self.scale /= zoom;
        } else {
            self.scale *= zoom;
        }
    }

    fn auto_rotation_angle(&self, dt: f32) -> f32 {
        2.0 * PI / 60.0 * self.auto_rotate_speed * dt
    }

    fn clamp_azimuth(&self, theta: f32) -> f32 {
        let (mut min, mut max) = (self.min_azimuth_angle, self.max_azimuth_angle);
        if !(min.is_finite() && max.is_finite()) {
            // unbounded: keep the angle in (-PI, PI]
            return (theta + PI).rem_euclid(2.0 * PI) - PI;
        }
        if min < -PI {
            min += 2.0 * PI;
        } else if min > PI {
            min -= 2.0 * PI;
        }
        if max < -PI {
            max += 2.0 * PI;
        } else if max > PI {
            max -= 2.0 * PI;
        }
        if min <= max {
            theta.clamp(min, max)
        } else if theta > (min + max) / 2.0 {
            theta.max(min)
        } else {
            theta.min(max)
        }
    }

    /// Applies pending rotation/zoom plus auto-rotation and moves `camera`.
    ///
    /// Returns whether the camera moved.
    pub fn update(&mut self, camera: &mut Camera, dt: f32) -> bool {
        let previous_theta = self.theta;
        if self.auto_rotate && !self.dragging {
            self.delta_theta -= self.auto_rotation_angle(dt);
        }

        if self.enable_damping {
            self.theta += self.delta_theta * self.damping_factor;
            self.phi += self.delta_phi * self.damping_factor;
        } else {
            self.theta += self.delta_theta;
            self.phi += self.delta_phi;
        }

        self.theta = self.clamp_azimuth(self.theta);
        self.phi = self
            .phi
            .clamp(self.min_polar_angle, self.max_polar_angle)
            .clamp(EPS, PI - EPS);

        let zoomed = self.scale != 1.0;
        self.radius = (self.radius * self.scale).clamp(self.min_distance, self.max_distance);
        self.scale = 1.0;

        let offset = Vector3::new(
            self.radius * self.phi.sin() * self.theta.sin(),
            self.radius * self.phi.cos(),
            self.radius * self.phi.sin() * self.theta.cos(),
        );
        let position = self.target + offset;
        camera.position = position;
        camera.target = self.target;

        if self.enable_damping {
            self.delta_theta *= 1.0 - self.damping_factor;
            self.delta_phi *= 1.0 - self.damping_factor;
        } else {
            self.delta_theta = 0.0;
            self.delta_phi = 0.0;
        }

        // Sub-EPS steps onto an azimuth limit still count, or a slow rotation could
        // stall on the limit without ever bouncing.
        let moved = self
            .last_position
            .is_none_or(|last| last.distance2(position) > EPS)
            || self.theta != previous_theta;
        self.last_position = Some(position);
        moved || zoomed
    }

    /// Reverses and weakens the auto-rotation if the azimuth sits on a band edge.
    ///
    /// Returns whether a bounce happened.
    pub fn bounce_off_azimuth_limits(&mut self) -> bool {
        if self.theta >= self.max_azimuth_angle || self.theta <= self.min_azimuth_angle {
            self.auto_rotate_speed = -self.auto_rotate_speed * self.bounce_factor;
            true
        } else {
            false
        }
    }

    /// Left button drags rotate, the wheel dollies.
    pub fn handle_window_event(&mut self, event: &WindowEvent, viewport_height: f32) {
        match event {
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => self.set_interacting(*state == ElementState::Pressed),
            WindowEvent::CursorMoved { position, .. } => {
                if self.dragging {
                    if let Some((x, y)) = self.pointer {
                        self.rotate((position.x - x) as f32, (position.y - y) as f32, viewport_height);
                    }
                    self.pointer = Some((position.x, position.y));
                }
            }
            WindowEvent::CursorLeft { .. } => self.set_interacting(false),
            WindowEvent::MouseWheel { delta, .. } => {
                let delta = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -y * 100.0,
                    MouseScrollDelta::PixelDelta(position) => -position.y as f32,
                };
                self.dolly(delta);
            }
            _ => (),
        }
    }
}
