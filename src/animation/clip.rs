//! Animation clips: per-bone keyframe tracks plus timing metadata

use glam::{Mat4, Quat, Vec3};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use super::{Bone, Skeleton};
use crate::import::{ImportedAnimation, ImportedChannel};

/// Framerate assumed when an importer reports none
pub const DEFAULT_FRAMERATE: f32 = 25.0;

/// Errors raised by clip construction and playback
#[derive(Clone, Debug, Error, PartialEq)]
pub enum AnimationError {
    #[error("invalid framerate {0}")]
    InvalidFramerate(f32),

    #[error("bone '{bone}' has no keyframe track")]
    MissingTrack { bone: String },
}

/// A single sampled bone transform
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KeyFrame {
    pub translation: Vec3,
    pub rotation: Quat,
    /// Imported for completeness; playback always uses unit scale.
    pub scaling: Vec3,
    pub time: f32,
}

impl KeyFrame {
    /// Create a new keyframe with unit scale
    pub fn new(time: f32, translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation,
            scaling: Vec3::ONE,
            time,
        }
    }

    /// Create an identity transform keyframe at the given time
    pub fn identity(time: f32) -> Self {
        Self::new(time, Vec3::ZERO, Quat::IDENTITY)
    }

    /// Interpolate towards `other`: lerp for translation, slerp for rotation.
    pub fn interpolate(&self, other: &Self, t: f32) -> (Vec3, Quat) {
        (
            self.translation.lerp(other.translation, t),
            self.rotation.slerp(other.rotation, t),
        )
    }

    /// Convert this keyframe to a transformation matrix (unit scale)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.translation)
    }
}

/// Ordered keyframes of one bone
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoneTrack {
    pub keyframes: Vec<KeyFrame>,
}

impl BoneTrack {
    pub fn new(keyframes: Vec<KeyFrame>) -> Self {
        Self { keyframes }
    }

    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// Interpolate between two sample indices of this track
    pub fn sample(&self, frame: usize, next_frame: usize, t: f32) -> (Vec3, Quat) {
        self.keyframes[frame].interpolate(&self.keyframes[next_frame], t)
    }

    fn from_channel(channel: &ImportedChannel) -> Self {
        let keyframes = channel
            .position_keys
            .iter()
            .enumerate()
            .map(|(i, key)| {
                let rotation = channel
                    .rotation_keys
                    .get(i)
                    .or(channel.rotation_keys.last())
                    .map_or(Quat::IDENTITY, |k| k.value.normalize());
                let scaling = channel
                    .scaling_keys
                    .get(i)
                    .or(channel.scaling_keys.last())
                    .map_or(Vec3::ONE, |k| k.value);

                KeyFrame {
                    translation: key.value,
                    rotation,
                    scaling,
                    time: key.time,
                }
            })
            .collect();

        Self { keyframes }
    }
}

/// An immutable, shareable animation clip.
///
/// Tracks are keyed by bone name; a bone without a track is legal.
#[derive(Clone, Debug)]
pub struct Animation {
    pub name: String,
    frame_count: usize,
    framerate: f32,
    frame_duration: f32,
    duration: f32,
    tracks: HashMap<String, BoneTrack>,
    skeleton: Option<Arc<Skeleton>>,
}

impl Animation {
    /// Create an empty clip of `frame_count` frames played at `framerate` frames per second
    pub fn new(name: impl Into<String>, frame_count: usize, framerate: f32) -> Result<Self, AnimationError> {
        if !(framerate.is_finite() && framerate > 0.0) {
            return Err(AnimationError::InvalidFramerate(framerate));
        }

        let frame_duration = 1.0 / framerate;
        Ok(Self {
            name: name.into(),
            frame_count,
            framerate,
            frame_duration,
            duration: frame_count as f32 * frame_duration,
            tracks: HashMap::new(),
            skeleton: None,
        })
    }

    /// Build a clip from imported channels. Ticks are treated as frames.
    pub fn from_imported(imported: &ImportedAnimation) -> Result<Self, AnimationError> {
        let framerate = if imported.ticks_per_second > 0.0 {
            imported.ticks_per_second as f32
        } else {
            log::warn!(
                "Animation '{}' has no tick rate, assuming {} fps",
                imported.name,
                DEFAULT_FRAMERATE
            );
            DEFAULT_FRAMERATE
        };

        let mut animation = Self::new(imported.name.as_str(), imported.duration_ticks.max(0.0) as usize, framerate)?;
        for channel in &imported.channels {
            animation.add_track(channel.node_name.as_str(), BoneTrack::from_channel(channel));
        }

        log::debug!(
            "Loaded animation '{}': {} frames at {} fps, {} tracks",
            animation.name,
            animation.frame_count,
            animation.framerate,
            animation.tracks.len()
        );
        Ok(animation)
    }

    /// Add or replace the track of a bone
    pub fn add_track(&mut self, bone_name: impl Into<String>, track: BoneTrack) {
        self.tracks.insert(bone_name.into(), track);
    }

    /// Associate the skeleton this clip animates. Animators ignore unbound clips.
    pub fn bind_skeleton(&mut self, skeleton: Arc<Skeleton>) {
        self.skeleton = Some(skeleton);
    }

    pub fn skeleton(&self) -> Option<&Arc<Skeleton>> {
        self.skeleton.as_ref()
    }

    /// Keyframe track of a bone, `None` when the bone is not animated.
    pub fn bone_track(&self, bone: &Bone) -> Option<&BoneTrack> {
        self.tracks.get(&bone.name)
    }

    pub fn track(&self, bone_name: &str) -> Option<&BoneTrack> {
        self.tracks.get(bone_name)
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Clip length in seconds
    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn framerate(&self) -> f32 {
        self.framerate
    }

    /// Seconds per frame
    pub fn frame_duration(&self) -> f32 {
        self.frame_duration
    }
}
