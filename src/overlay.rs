//! Timeline of the loading overlay.
//!
//! The overlay covers the canvas with alpha 1 until loading completes. From the
//! completion time on, fire-once timers evaluated against the session clock drive
//! the rest:
//!
//! ```text
//! completion + fade_start                  FadeStarted (bar ended, footer shown)
//! fade start + ready_delay                 SceneReady
//! fade start + tween_delay .. + duration   alpha eases 1 -> 0, then Removed
//! ```

use instant::Duration;

use crate::settings::OverlaySettings;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverlayEvent {
    FadeStarted,
    SceneReady,
    Removed,
}

pub fn ease_out_quad(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * (2.0 - t)
}

#[derive(Clone, Debug)]
pub struct Overlay {
    settings: OverlaySettings,
    alpha: f32,
    completed_at: Option<Duration>,
    fade_started_at: Option<Duration>,
    ready: bool,
    removed: bool,
}

impl Overlay {
    pub fn new(settings: OverlaySettings) -> Self {
        Self {
            settings,
            alpha: 1.0,
            completed_at: None,
            fade_started_at: None,
            ready: false,
            removed: false,
        }
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Whether the overlay is still drawn.
    pub fn is_visible(&self) -> bool {
        !self.removed
    }

    pub fn fade_started_at(&self) -> Option<Duration> {
        self.fade_started_at
    }

    /// Starts the timeline. Later calls are ignored.
    pub fn complete(&mut self, now: Duration) {
        if self.completed_at.is_none() {
            self.completed_at = Some(now);
        }
    }

    /// Fires every timer that is due at `now`, in timeline order.
    pub fn update(&mut self, now: Duration) -> Vec<OverlayEvent> {
        let mut events = Vec::new();
        let Some(completed_at) = self.completed_at else {
            return events;
        };

        let fade_at = completed_at + self.settings.fade_start;
        if self.fade_started_at.is_none() && now >= fade_at {
            self.fade_started_at = Some(fade_at);
            events.push(OverlayEvent::FadeStarted);
        }
        let Some(fade_started_at) = self.fade_started_at else {
            return events;
        };

        if !self.ready && now >= fade_started_at + self.settings.ready_delay {
            self.ready = true;
            events.push(OverlayEvent::SceneReady);
        }

        let tween_start = fade_started_at + self.settings.tween_delay;
        if !self.removed && now >= tween_start {
            let duration = self.settings.tween_duration.as_secs_f32();
            let progress = if duration > 0.0 {
                (now - tween_start).as_secs_f32() / duration
            } else {
                1.0
            };
            self.alpha = 1.0 - ease_out_quad(progress);
            if progress >= 1.0 {
                self.alpha = 0.0;
                self.removed = true;
                events.push(OverlayEvent::Removed);
            }
        }
        events
    }
}
