//! Looping node animations.
//!
//! Clips are parsed from the animation channels of a model file (see
//! [`crate::resources`]). Every animated clone owns an [`AnimationMixer`] playing one
//! clip with its own time scale, so clones of one fixture can run different clips or
//! run the same clip backwards. Mixers of one model are gathered in an
//! [`AnimationGroup`] advanced by the group's own [`Clock`].
//!
//! Only rigid node transforms are animated. Skinned vertex deformation is not
//! evaluated.

use std::sync::Arc;

use cgmath::{InnerSpace, Quaternion, Vector3, VectorSpace};
use instant::Duration;
use log::{debug, warn};

use crate::data_structures::{
    instance::Instance,
    scene_graph::{Scene, SceneNode, find_node_mut},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interpolation {
    Linear,
    Step,
    /// Stored as (in-tangent, value, out-tangent) triplets and sampled at the values.
    CubicSpline,
}

#[derive(Clone, Debug)]
pub enum Keyframes {
    Translation(Vec<Vector3<f32>>),
    Rotation(Vec<Quaternion<f32>>),
    Scale(Vec<Vector3<f32>>),
}

/// Keyframes of one transform component of one node.
#[derive(Clone, Debug)]
pub struct Channel {
    /// Source index of the animated node.
    pub node: usize,
    pub interpolation: Interpolation,
    pub timestamps: Vec<f32>,
    pub keyframes: Keyframes,
}

impl Channel {
    fn value_index(&self, key: usize) -> usize {
        match self.interpolation {
            Interpolation::CubicSpline => key * 3 + 1,
            _ => key,
        }
    }

    /// Keys surrounding `time` and the blend factor between them.
    fn keys_at(&self, time: f32) -> Option<(usize, usize, f32)> {
        let len = self.timestamps.len();
        if len == 0 {
            return None;
        }
        let next = self.timestamps.partition_point(|&t| t <= time);
        if next == 0 {
            return Some((0, 0, 0.0));
        }
        if next >= len {
            return Some((len - 1, len - 1, 0.0));
        }
        let prev = next - 1;
        let (t0, t1) = (self.timestamps[prev], self.timestamps[next]);
        let span = t1 - t0;
        let factor = if span > 1e-6 {
            ((time - t0) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };
        match self.interpolation {
            Interpolation::Step => Some((prev, prev, 0.0)),
            _ => Some((prev, next, factor)),
        }
    }

    /// Overwrites the animated component of `local` with the value at `time`.
    pub fn apply(&self, time: f32, local: &mut Instance) {
        let Some((a, b, factor)) = self.keys_at(time) else {
            return;
        };
        let (a, b) = (self.value_index(a), self.value_index(b));
        match &self.keyframes {
            Keyframes::Translation(values) => {
                if let (Some(from), Some(to)) = (values.get(a), values.get(b)) {
                    local.position = from.lerp(*to, factor);
                }
            }
            Keyframes::Rotation(values) => {
                if let (Some(from), Some(to)) = (values.get(a), values.get(b)) {
                    local.rotation = if factor > 0.0 {
                        from.slerp(*to, factor).normalize()
                    } else {
                        *from
                    };
                }
            }
            Keyframes::Scale(values) => {
                if let (Some(from), Some(to)) = (values.get(a), values.get(b)) {
                    local.scale = from.lerp(*to, factor);
                }
            }
        }
    }
}

/// A named animation: every channel of one animation of a model file.
#[derive(Clone, Debug)]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
    pub channels: Vec<Channel>,
}

impl AnimationClip {
    pub fn new(name: impl Into<String>, channels: Vec<Channel>) -> Self {
        let duration = channels
            .iter()
            .filter_map(|channel| channel.timestamps.last().copied())
            .fold(0.0_f32, f32::max);
        Self {
            name: name.into(),
            duration,
            channels,
        }
    }
}

/// Playback state of one clip. Always loops, starts immediately.
#[derive(Clone, Debug)]
pub struct AnimationAction {
    clip: Arc<AnimationClip>,
    pub time: f32,
    pub time_scale: f32,
}

impl AnimationAction {
    pub fn new(clip: Arc<AnimationClip>, time_scale: f32) -> Self {
        Self {
            clip,
            time: 0.0,
            time_scale,
        }
    }

    pub fn clip(&self) -> &Arc<AnimationClip> {
        &self.clip
    }

    pub fn update(&mut self, dt: f32) {
        let duration = self.clip.duration;
        if duration <= 0.0 {
            return;
        }
        self.time += dt * self.time_scale;
        if self.time >= duration {
            self.time %= duration;
        } else if self.time < 0.0 {
            // reverse playback wraps to the end
            self.time = duration + (self.time % duration);
            if self.time >= duration {
                self.time = 0.0;
            }
        }
    }
}

/// Drives one clip on one instance of a fixture.
#[derive(Clone, Debug)]
pub struct AnimationMixer {
    instance: usize,
    action: AnimationAction,
}

impl AnimationMixer {
    pub fn new(clip: Arc<AnimationClip>, instance: usize, time_scale: f32) -> Self {
        Self {
            instance,
            action: AnimationAction::new(clip, time_scale),
        }
    }

    pub fn instance(&self) -> usize {
        self.instance
    }

    pub fn action(&self) -> &AnimationAction {
        &self.action
    }

    /// Advances the clip by `dt` seconds and writes the sampled transforms into
    /// instance `self.instance` of the nodes below `root`.
    pub fn update(&mut self, dt: f32, root: &mut (dyn SceneNode + 'static)) {
        self.action.update(dt);
        let time = self.action.time;
        for channel in &self.action.clip().channels {
            let Some(node) = find_node_mut(root, channel.node) else {
                continue;
            };
            if let Some(mut local) = node.get_local_transform(self.instance) {
                channel.apply(time, &mut local);
                node.set_local_transform(self.instance, local);
            }
        }
    }
}

/// Measures elapsed session time between calls.
///
/// The first delta is measured from [`Clock::started`].
#[derive(Clone, Debug)]
pub struct Clock {
    started: Duration,
    last: Duration,
}

impl Clock {
    pub fn new(now: Duration) -> Self {
        Self {
            started: now,
            last: now,
        }
    }

    pub fn started(&self) -> Duration {
        self.started
    }

    pub fn elapsed(&self) -> Duration {
        self.last - self.started
    }

    pub fn get_delta(&mut self, now: Duration) -> Duration {
        let delta = now.saturating_sub(self.last);
        self.last = self.last.max(now);
        delta
    }
}

/// Which clip an instance of a fixture plays, and how fast.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationBinding {
    pub instance: usize,
    pub clip: usize,
    /// Negative values play backwards.
    pub time_scale: f32,
}

/// The mixers of one model, advanced together by the group's clock.
#[derive(Debug)]
pub struct AnimationGroup {
    /// Key of the animated root in the [`Scene`].
    pub root: String,
    pub clock: Clock,
    pub mixers: Vec<AnimationMixer>,
}

#[derive(Debug, Default)]
pub struct AnimationDriver {
    groups: Vec<AnimationGroup>,
}

impl AnimationDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn groups(&self) -> &[AnimationGroup] {
        &self.groups
    }

    /// Creates one mixer per binding for the scene root `root`.
    ///
    /// Bindings naming a clip the model does not have are skipped. Returns the number
    /// of mixers created.
    pub fn bind(
        &mut self,
        root: &str,
        clips: &[Arc<AnimationClip>],
        bindings: &[AnimationBinding],
        now: Duration,
    ) -> usize {
        if clips.is_empty() {
            warn!("{root} has no animation clips, nothing to play");
            return 0;
        }
        let mixers: Vec<_> = bindings
            .iter()
            .filter_map(|binding| match clips.get(binding.clip) {
                Some(clip) => Some(AnimationMixer::new(
                    clip.clone(),
                    binding.instance,
                    binding.time_scale,
                )),
                None => {
                    warn!(
                        "{root}: clip {} requested for instance {}, but only {} clips exist",
                        binding.clip,
                        binding.instance,
                        clips.len()
                    );
                    None
                }
            })
            .collect();
        let count = mixers.len();
        if count > 0 {
            debug!("{root}: {count} animation mixers");
            self.groups.push(AnimationGroup {
                root: root.to_string(),
                clock: Clock::new(now),
                mixers,
            });
        }
        count
    }

    /// Advances every group by the time its clock measured since the last call.
    pub fn update(&mut self, scene: &mut Scene, now: Duration) {
        for group in &mut self.groups {
            let dt = group.clock.get_delta(now).as_secs_f32();
            let Some(root) = scene.get_mut(&group.root) else {
                continue;
            };
            for mixer in &mut group.mixers {
                mixer.update(dt, root);
            }
        }
    }
}
