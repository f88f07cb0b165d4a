use std::sync::Arc;

use log::{debug, warn};

use crate::animation::{AnimationClip, Channel, Interpolation, Keyframes};

/// Reads every animation of a model file. Morph target channels are ignored.
pub fn load_clips(gltf: &gltf::Document, buffers: &[Vec<u8>]) -> Vec<Arc<AnimationClip>> {
    gltf.animations()
        .map(|animation| {
            let channels = animation
                .channels()
                .filter_map(|channel| {
                    let reader = channel.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));
                    let timestamps: Vec<f32> = match reader.read_inputs() {
                        Some(inputs) => inputs.collect(),
                        None => {
                            warn!("No timestamps in animation channel {}", channel.index());
                            return None;
                        }
                    };
                    let keyframes = match reader.read_outputs()? {
                        gltf::animation::util::ReadOutputs::Translations(translations) => {
                            Keyframes::Translation(translations.map(Into::into).collect())
                        }
                        gltf::animation::util::ReadOutputs::Rotations(rotations) => Keyframes::Rotation(
                            rotations
                                .into_f32()
                                .map(|[x, y, z, w]| cgmath::Quaternion::new(w, x, y, z))
                                .collect(),
                        ),
                        gltf::animation::util::ReadOutputs::Scales(scales) => {
                            Keyframes::Scale(scales.map(Into::into).collect())
                        }
                        gltf::animation::util::ReadOutputs::MorphTargetWeights(_) => {
                            debug!("Skipping morph target channel {}", channel.index());
                            return None;
                        }
                    };
                    let interpolation = match channel.sampler().interpolation() {
                        gltf::animation::Interpolation::Linear => Interpolation::Linear,
                        gltf::animation::Interpolation::Step => Interpolation::Step,
                        gltf::animation::Interpolation::CubicSpline => Interpolation::CubicSpline,
                    };
                    Some(Channel {
                        node: channel.target().node().index(),
                        interpolation,
                        timestamps,
                        keyframes,
                    })
                })
                .collect();
            let name = animation
                .name()
                .map(str::to_string)
                .unwrap_or_else(|| format!("Animation {}", animation.index()));
            Arc::new(AnimationClip::new(name, channels))
        })
        .collect()
}
