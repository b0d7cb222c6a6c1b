//! Keyframe animation of node transforms.
//!
//! Each animation sampler is prepared once into a [`Sampler`], whose variant
//! is chosen from the output accessor's element type. Channels are grouped
//! by target node, and [`Animation::apply`] writes the sampled values into
//! the TRS transforms of a document.
//!
//! Only linear interpolation of float translation, rotation and scale
//! tracks is implemented. Other interpolations, component types and morph
//! target weights fail at preparation.

use std::collections::BTreeMap;

use arte_core::gltf::{
    buffer, Accessor, ComponentType, ElementType, Gltf, Index, Interpolation, Member, Node, Owned,
    TargetPath, Transformation,
};
use arte_core::math::{lerp_vec3, quat_from_array, slerp, Quat, Vec3};

use crate::error::{Result, ViewerError};
use crate::logging::PREPARE;

/// Animation time, in seconds.
pub type Time = f32;

/// Keyframe timestamps and outputs, kept in parallel vectors so that both
/// can be filled straight from accessor data.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyframes<T> {
    pub timestamps: Vec<Time>,
    pub outputs: Vec<T>,
}

impl<T> Keyframes<T> {
    /// Pairs timestamps with outputs. Both must have the same, non-zero length.
    pub fn new(timestamps: Vec<Time>, outputs: Vec<T>) -> Result<Self> {
        if timestamps.len() != outputs.len() {
            return Err(ViewerError::Format(format!(
                "{} keyframe timestamps for {} outputs",
                timestamps.len(),
                outputs.len()
            )));
        }
        if timestamps.is_empty() {
            return Err(ViewerError::Format("animation sampler without keyframes".into()));
        }
        Ok(Self {
            timestamps,
            outputs,
        })
    }

    /// Timestamp of the last keyframe.
    pub fn duration(&self) -> Time {
        self.timestamps.last().copied().unwrap_or(0.0)
    }

    /// Keyframes enclosing `time`.
    ///
    /// Returns `(i, Some(i + 1))` when `timestamps[i] <= time < timestamps[i + 1]`.
    /// Before the first keyframe the result is `(0, None)`, at or after the
    /// last one it is `(last, None)`: the track clamps to its edges.
    pub fn get_bounds(&self, time: Time) -> (usize, Option<usize>) {
        match self.timestamps.iter().position(|&timestamp| timestamp > time) {
            Some(0) => (0, None),
            Some(next) => (next - 1, Some(next)),
            None => (self.timestamps.len().saturating_sub(1), None),
        }
    }
}

/// Values that can be interpolated between two keyframes.
pub trait Interpolate: Copy {
    /// Value at `parameter` (in `[0, 1]`) between `from` and `to`.
    fn interpolate(from: Self, to: Self, parameter: f32) -> Self;
}

impl Interpolate for f32 {
    fn interpolate(from: Self, to: Self, parameter: f32) -> Self {
        from + (to - from) * parameter
    }
}

impl Interpolate for Vec3 {
    fn interpolate(from: Self, to: Self, parameter: f32) -> Self {
        lerp_vec3(from, to, parameter)
    }
}

impl Interpolate for Quat {
    fn interpolate(from: Self, to: Self, parameter: f32) -> Self {
        slerp(from, to, parameter)
    }
}

/// Linearly interpolated keyframe track.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplerLinear<T> {
    pub keyframes: Keyframes<T>,
}

impl<T: Interpolate> SamplerLinear<T> {
    pub fn new(keyframes: Keyframes<T>) -> Self {
        Self { keyframes }
    }

    /// Value of the track at `time`, clamped to the edge keyframes.
    pub fn interpolate(&self, time: Time) -> T {
        let Keyframes {
            timestamps,
            outputs,
        } = &self.keyframes;
        match self.keyframes.get_bounds(time) {
            (edge, None) => outputs[edge],
            (previous, Some(next)) => {
                let span = timestamps[next] - timestamps[previous];
                let parameter = if span > 0.0 {
                    ((time - timestamps[previous]) / span).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                T::interpolate(outputs[previous], outputs[next], parameter)
            }
        }
    }
}

/// A sampled value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Scalar(f32),
    Vec3(Vec3),
    Quat(Quat),
}

/// A prepared animation sampler, typed after its output values.
#[derive(Debug, Clone, PartialEq)]
pub enum Sampler {
    Scalar(SamplerLinear<f32>),
    Vec3(SamplerLinear<Vec3>),
    /// `VEC4` outputs, read as `[x, y, z, w]` rotations.
    Quat(SamplerLinear<Quat>),
}

impl Sampler {
    /// Prepares the keyframes of a document sampler.
    pub fn prepare(sampler: Member<'_, arte_core::gltf::AnimationSampler>) -> Result<Self> {
        let output = sampler.get(|s| s.output);
        if output.component_type != ComponentType::Float {
            return Err(ViewerError::unsupported(format!(
                "sampler {} outputs accessor {} with component type {}",
                sampler.position(),
                output.id(),
                output.component_type
            )));
        }
        match output.element_type {
            ElementType::Scalar | ElementType::Vec3 | ElementType::Vec4 => {}
            other => {
                return Err(ViewerError::unsupported(format!(
                    "sampler {} outputs accessor {} with element type {}",
                    sampler.position(),
                    output.id(),
                    other
                )))
            }
        }
        if sampler.interpolation != Interpolation::Linear {
            return Err(ViewerError::unsupported(format!(
                "sampler {} uses interpolation '{}'",
                sampler.position(),
                sampler.interpolation
            )));
        }

        let timestamps = load_timestamps(sampler.get(|s| s.input))?;
        let prepared = match output.element_type {
            ElementType::Scalar => Self::Scalar(SamplerLinear::new(Keyframes::new(
                timestamps,
                buffer::load_accessor_elements::<f32>(output)?,
            )?)),
            ElementType::Vec3 => {
                let outputs = buffer::load_accessor_elements::<[f32; 3]>(output)?
                    .into_iter()
                    .map(Vec3::from)
                    .collect();
                Self::Vec3(SamplerLinear::new(Keyframes::new(timestamps, outputs)?))
            }
            _ => {
                let outputs = buffer::load_accessor_elements::<[f32; 4]>(output)?
                    .into_iter()
                    .map(|xyzw| normalized(quat_from_array(xyzw)))
                    .collect();
                Self::Quat(SamplerLinear::new(Keyframes::new(timestamps, outputs)?))
            }
        };
        log::debug!(
            target: PREPARE,
            "Prepared sampler {} with {} keyframes over {}s.",
            sampler.position(),
            prepared.len(),
            prepared.duration()
        );
        Ok(prepared)
    }

    /// Value of the track at `time`.
    pub fn interpolate(&self, time: Time) -> Value {
        match self {
            Self::Scalar(sampler) => Value::Scalar(sampler.interpolate(time)),
            Self::Vec3(sampler) => Value::Vec3(sampler.interpolate(time)),
            Self::Quat(sampler) => Value::Quat(sampler.interpolate(time)),
        }
    }

    /// Timestamp of the last keyframe.
    pub fn duration(&self) -> Time {
        match self {
            Self::Scalar(sampler) => sampler.keyframes.duration(),
            Self::Vec3(sampler) => sampler.keyframes.duration(),
            Self::Quat(sampler) => sampler.keyframes.duration(),
        }
    }

    /// Number of keyframes.
    pub fn len(&self) -> usize {
        match self {
            Self::Scalar(sampler) => sampler.keyframes.timestamps.len(),
            Self::Vec3(sampler) => sampler.keyframes.timestamps.len(),
            Self::Quat(sampler) => sampler.keyframes.timestamps.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn value_name(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::Vec3(_) => "vec3",
            Self::Quat(_) => "quaternion",
        }
    }
}

fn normalized(rotation: Quat) -> Quat {
    let norm = rotation.norm();
    if norm > f32::EPSILON {
        rotation / norm
    } else {
        Quat::identity()
    }
}

fn load_timestamps(input: Owned<'_, Accessor>) -> Result<Vec<Time>> {
    if input.element_type != ElementType::Scalar || input.component_type != ComponentType::Float {
        return Err(ViewerError::Format(format!(
            "animation input accessor {} must hold float scalars",
            input.id()
        )));
    }
    Ok(buffer::load_accessor_elements::<f32>(input)?)
}

/// Playback policy past the animation's duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Time wraps around the duration.
    #[default]
    Repeat,
    /// Time is used as is: tracks hold their last keyframe.
    Once,
}

/// A node property driven by a sampler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeChannel {
    pub path: TargetPath,
    /// Index into [`Animation::samplers`].
    pub sampler: usize,
}

/// A prepared animation.
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    pub name: String,
    pub samplers: Vec<Sampler>,
    /// Channels grouped by target node, in document order.
    pub node_channels: BTreeMap<Index<Node>, Vec<NodeChannel>>,
    /// Largest sampler duration.
    pub duration: Time,
    pub mode: Mode,
}

impl Animation {
    /// Prepares every sampler and groups the channels by node.
    pub fn prepare(animation: Owned<'_, arte_core::gltf::Animation>) -> Result<Self> {
        let samplers = animation
            .members(|a| a.samplers.as_slice())
            .map(Sampler::prepare)
            .collect::<Result<Vec<_>>>()?;

        let mut node_channels: BTreeMap<Index<Node>, Vec<NodeChannel>> = BTreeMap::new();
        for channel in animation.members(|a| a.channels.as_slice()) {
            let Some(node) = channel.target.node else {
                return Err(ViewerError::unsupported(format!(
                    "channel {} of animation {} does not have a target node",
                    channel.position(),
                    animation.id()
                )));
            };
            let sampler = channel.sampler.value();
            let Some(value_name) = samplers.get(sampler).map(Sampler::value_name) else {
                return Err(ViewerError::Format(format!(
                    "channel {} of animation {} uses sampler {} of {}",
                    channel.position(),
                    animation.id(),
                    sampler,
                    samplers.len()
                )));
            };
            let expected = match channel.target.path {
                TargetPath::Translation | TargetPath::Scale => "vec3",
                TargetPath::Rotation => "quaternion",
                TargetPath::Weights => {
                    return Err(ViewerError::unsupported(format!(
                        "channel {} of animation {} animates morph target weights",
                        channel.position(),
                        animation.id()
                    )))
                }
            };
            if value_name != expected {
                return Err(ViewerError::Format(format!(
                    "channel {} of animation {} drives {:?} with {} values",
                    channel.position(),
                    animation.id(),
                    channel.target.path,
                    value_name
                )));
            }
            node_channels.entry(node).or_default().push(NodeChannel {
                path: channel.target.path,
                sampler,
            });
        }

        let duration = samplers.iter().map(Sampler::duration).fold(0.0, f32::max);
        log::debug!(
            target: PREPARE,
            "Prepared animation {} '{}': {} samplers, {} animated nodes, {}s.",
            animation.id(),
            animation.name,
            samplers.len(),
            node_channels.len(),
            duration
        );
        Ok(Self {
            name: animation.name.clone(),
            samplers,
            node_channels,
            duration,
            mode: Mode::default(),
        })
    }

    /// Sets the playback mode.
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Time at which the tracks are sampled for the playback time `time`.
    pub fn local_time(&self, time: Time) -> Time {
        match self.mode {
            Mode::Repeat if self.duration > 0.0 => time.rem_euclid(self.duration),
            Mode::Repeat => 0.0,
            Mode::Once => time,
        }
    }

    /// Values of the channels targeting `node` at playback time `time`.
    pub fn evaluate(&self, node: Index<Node>, time: Time) -> Vec<(TargetPath, Value)> {
        let time = self.local_time(time);
        self.node_channels
            .get(&node)
            .map(|channels| {
                channels
                    .iter()
                    .map(|channel| (channel.path, self.samplers[channel.sampler].interpolate(time)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Writes the animated values at playback time `time` into the TRS
    /// transforms of the targeted nodes.
    ///
    /// Animating a node whose transformation is a matrix is an error.
    pub fn apply(&self, time: Time, gltf: &mut Gltf) -> Result<()> {
        for &node in self.node_channels.keys() {
            let values = self.evaluate(node, time);
            let element = gltf.get_mut(node)?;
            let Transformation::Trs(trs) = &mut element.transformation else {
                log::error!(
                    target: PREPARE,
                    "Node {} is animated but has a matrix transformation.",
                    node
                );
                return Err(ViewerError::MatrixNodeAnimated(node.value()));
            };
            for (path, value) in values {
                match (path, value) {
                    (TargetPath::Translation, Value::Vec3(translation)) => {
                        trs.translation = translation
                    }
                    (TargetPath::Scale, Value::Vec3(scale)) => trs.scale = scale,
                    (TargetPath::Rotation, Value::Quat(rotation)) => trs.rotation = rotation,
                    // Pairings are validated by `prepare`.
                    _ => {}
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn track() -> Keyframes<f32> {
        Keyframes::new(vec![0.0, 1.0, 3.0], vec![0.0, 10.0, 30.0]).unwrap()
    }

    #[rstest]
    #[case(-1.0, (0, None))]
    #[case(0.0, (0, Some(1)))]
    #[case(0.5, (0, Some(1)))]
    #[case(1.0, (1, Some(2)))]
    #[case(2.9, (1, Some(2)))]
    #[case(3.0, (2, None))]
    #[case(7.0, (2, None))]
    fn test_get_bounds(#[case] time: Time, #[case] expected: (usize, Option<usize>)) {
        assert_eq!(track().get_bounds(time), expected);
    }

    #[test]
    fn test_single_keyframe_clamps() {
        let keyframes = Keyframes::new(vec![2.0], vec![5.0f32]).unwrap();
        assert_eq!(keyframes.get_bounds(0.0), (0, None));
        assert_eq!(keyframes.get_bounds(2.0), (0, None));
        assert_eq!(SamplerLinear::new(keyframes).interpolate(9.0), 5.0);
    }

    #[test]
    fn test_keyframes_validation() {
        assert!(Keyframes::new(vec![0.0, 1.0], vec![1.0f32]).is_err());
        assert!(Keyframes::<f32>::new(vec![], vec![]).is_err());
    }

    #[test]
    fn test_linear_scalar() {
        let sampler = SamplerLinear::new(track());
        assert_eq!(sampler.interpolate(0.0), 0.0);
        assert_eq!(sampler.interpolate(0.25), 2.5);
        assert_eq!(sampler.interpolate(2.0), 20.0);
        assert_eq!(sampler.interpolate(3.0), 30.0);
        assert_eq!(sampler.interpolate(-5.0), 0.0);
    }

    #[test]
    fn test_quaternion_stays_unit() {
        let half_turn = nalgebra::UnitQuaternion::from_axis_angle(
            &nalgebra::Vector3::z_axis(),
            std::f32::consts::PI * 0.9,
        )
        .into_inner();
        let sampler = SamplerLinear::new(
            Keyframes::new(vec![0.0, 1.0], vec![Quat::identity(), half_turn]).unwrap(),
        );
        for step in 0..=10 {
            let rotation = sampler.interpolate(step as f32 / 10.0);
            assert!((rotation.norm() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_local_time() {
        let animation = Animation {
            name: String::new(),
            samplers: Vec::new(),
            node_channels: BTreeMap::new(),
            duration: 2.0,
            mode: Mode::Repeat,
        };
        assert_eq!(animation.local_time(5.0), 1.0);
        assert_eq!(animation.local_time(-0.5), 1.5);
        assert_eq!(animation.clone().with_mode(Mode::Once).local_time(5.0), 5.0);
    }
}
