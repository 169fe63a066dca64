//! Runtime animation playback and crossfade blending

use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};
use rayon::prelude::*;

use super::{Animation, AnimationError, AnimatorConfig, MissingTrackPolicy};

/// Playback state derived from the bound clip and play speed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimationState {
    /// No clip bound, or the clip has no skeleton
    Idle,
    Playing,
    PlayingReversed,
}

/// Plays one animation clip on one skeleton instance.
///
/// Each animator owns its pose and matrix buffers, so many animators can
/// share the same immutable [`Animation`] and [`Skeleton`](super::Skeleton).
#[derive(Clone, Debug)]
pub struct Animator {
    animation: Option<Arc<Animation>>,
    config: AnimatorConfig,
    current_time: f32,
    current_frame: usize,
    next_frame: usize,
    frame_count: usize,
    play_speed: f32,
    cross_fade: f32,
    is_finished: bool,
    positions: Vec<Vec3>,
    rotations: Vec<Quat>,
    global_transforms: Vec<Mat4>,
    final_matrices: Vec<Mat4>,
    identity: Vec<Mat4>,
}

impl Animator {
    /// Create an idle animator with the default configuration
    pub fn new() -> Self {
        Self::with_config(AnimatorConfig::default())
    }

    pub fn with_config(config: AnimatorConfig) -> Self {
        let capacity = config.capacity;
        Self {
            animation: None,
            current_time: 0.0,
            current_frame: 0,
            next_frame: 0,
            frame_count: 0,
            play_speed: config.play_speed,
            cross_fade: 0.0,
            is_finished: false,
            positions: vec![Vec3::ZERO; capacity],
            rotations: vec![Quat::IDENTITY; capacity],
            global_transforms: vec![Mat4::IDENTITY; capacity],
            final_matrices: vec![Mat4::IDENTITY; capacity],
            identity: vec![Mat4::IDENTITY; capacity],
            config,
        }
    }

    /// Create an animator already bound to a clip
    pub fn with_animation(animation: Arc<Animation>) -> Self {
        let mut animator = Self::new();
        animator.start(animation);
        animator
    }

    /// Bind a clip. Playback time is kept when it falls inside the new clip,
    /// otherwise it restarts from the clip boundary matching the play direction.
    pub fn start(&mut self, animation: Arc<Animation>) {
        let same_skeleton = match (self.skeleton_ptr(), animation.skeleton()) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        };
        if !same_skeleton {
            self.final_matrices.fill(Mat4::IDENTITY);
            self.global_transforms.fill(Mat4::IDENTITY);
        }

        let duration = animation.duration();
        if !(0.0..=duration).contains(&self.current_time) {
            self.current_time = if self.play_speed < 0.0 { duration } else { 0.0 };
        }

        self.frame_count = animation.frame_count();
        self.current_frame = frame_at(self.current_time, animation.frame_duration(), self.frame_count);
        self.next_frame = self.current_frame;
        self.is_finished = false;
        self.animation = Some(animation);
    }

    /// Unbind the current clip; matrices fall back to identity.
    pub fn stop(&mut self) {
        self.animation = None;
        self.current_time = 0.0;
        self.current_frame = 0;
        self.next_frame = 0;
        self.is_finished = false;
        self.final_matrices.fill(Mat4::IDENTITY);
    }

    fn skeleton_ptr(&self) -> Option<&Arc<super::Skeleton>> {
        self.animation.as_ref()?.skeleton()
    }

    /// True when a clip with a skeleton is bound
    pub fn is_bound(&self) -> bool {
        self.skeleton_ptr().is_some()
    }

    pub fn animation(&self) -> Option<&Arc<Animation>> {
        self.animation.as_ref()
    }

    pub fn config(&self) -> &AnimatorConfig {
        &self.config
    }

    pub fn state(&self) -> AnimationState {
        if !self.is_bound() {
            AnimationState::Idle
        } else if self.play_speed < 0.0 {
            AnimationState::PlayingReversed
        } else {
            AnimationState::Playing
        }
    }

    pub fn play_speed(&self) -> f32 {
        self.play_speed
    }

    /// Set the playback speed multiplier; negative values play in reverse
    pub fn set_play_speed(&mut self, speed: f32) {
        self.play_speed = speed;
    }

    pub fn cross_fade(&self) -> f32 {
        self.cross_fade
    }

    /// Blend weight towards the blend target, clamped to [0, 1]
    pub fn set_cross_fade(&mut self, weight: f32) {
        self.cross_fade = weight.clamp(0.0, 1.0);
    }

    pub fn current_time(&self) -> f32 {
        self.current_time
    }

    pub fn set_current_time(&mut self, time: f32) {
        self.current_time = time;
    }

    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    /// Frame interpolated towards, in clip-wide frame space
    pub fn next_frame(&self) -> usize {
        self.next_frame
    }

    /// Set once playback crosses a loop boundary; cleared by [`start`](Self::start).
    pub fn is_finished(&self) -> bool {
        self.is_finished
    }

    /// Interpolated bone translations, indexed by bone id
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Interpolated bone rotations, indexed by bone id
    pub fn rotations(&self) -> &[Quat] {
        &self.rotations
    }

    /// Skinning matrices indexed by bone id, always `capacity` long.
    ///
    /// Identity matrices when nothing is bound. Valid until the next `animate`.
    pub fn matrices(&self) -> &[Mat4] {
        if self.is_bound() {
            &self.final_matrices
        } else {
            &self.identity
        }
    }

    /// Advance playback by `delta` seconds and recompute the pose.
    pub fn animate(&mut self, delta: f32) -> Result<(), AnimationError> {
        self.animate_inner(delta, None)
    }

    /// Advance playback and crossfade towards `target`'s pose.
    ///
    /// The target is borrowed for this call only. Its play speed is rescaled so
    /// both clips reach their loop boundary together, then it is animated
    /// before this pose is computed. Both animators must use the same skeleton.
    pub fn animate_blended(&mut self, delta: f32, target: &mut Animator) -> Result<(), AnimationError> {
        self.animate_inner(delta, Some(target))
    }

    fn animate_inner(&mut self, delta: f32, mut blend: Option<&mut Animator>) -> Result<(), AnimationError> {
        let Some(animation) = self.animation.clone() else {
            return Ok(());
        };
        let Some(skeleton) = animation.skeleton().cloned() else {
            return Ok(());
        };

        self.frame_count = animation.frame_count();
        if self.frame_count == 0 {
            return Ok(());
        }

        let frame_duration = animation.frame_duration();
        self.update_time(delta, animation.duration(), frame_duration);

        let reversed = self.play_speed < 0.0;
        self.next_frame = step_frame(self.current_frame, self.frame_count, reversed);

        let mut t = (self.current_time % frame_duration) / frame_duration;
        if reversed {
            t = 1.0 - t;
        }

        if let Some(target) = blend.as_deref_mut() {
            let target_duration = target.animation.as_ref().map(|a| a.duration());
            if let Some(target_duration) = target_duration {
                if animation.duration() > 0.0 {
                    target.play_speed = target_duration / animation.duration() * self.play_speed;
                }
            }
            target.animate(delta)?;
        }

        for bone in skeleton.bones() {
            let id = bone.id;
            if id >= self.config.capacity {
                continue;
            }

            let (position, rotation) = match animation.bone_track(bone).filter(|track| !track.is_empty()) {
                Some(track) => {
                    let frame = remap_frame(self.current_frame, self.frame_count, track.len());
                    let next = step_frame(frame, track.len(), reversed);
                    track.sample(frame, next, t)
                }
                None => match self.config.missing_track {
                    MissingTrackPolicy::ResetAnimation => {
                        log::trace!("Bone '{}' has no track in '{}', rewinding", bone.name, animation.name);
                        self.current_time = 0.0;
                        return Ok(());
                    }
                    MissingTrackPolicy::SkipBone => bone.bind_translation_rotation(),
                    MissingTrackPolicy::Fail => {
                        return Err(AnimationError::MissingTrack {
                            bone: bone.name.clone(),
                        });
                    }
                },
            };

            let target_pose = blend
                .as_deref()
                .and_then(|target| Some((*target.positions.get(id)?, *target.rotations.get(id)?)));
            let (position, rotation) = match target_pose {
                Some(target_pose) => blend_pose((position, rotation), target_pose, self.cross_fade),
                None => (position, rotation),
            };

            self.positions[id] = position;
            self.rotations[id] = rotation;

            let local = Mat4::from_rotation_translation(rotation, position);
            let global = match bone.parent_id {
                Some(parent) => self.global_transforms[parent] * local,
                None => local,
            };
            self.global_transforms[id] = global;
            self.final_matrices[id] = global * bone.bind_inverse;
        }

        Ok(())
    }

    fn update_time(&mut self, delta: f32, duration: f32, frame_duration: f32) {
        self.current_time += delta * self.play_speed;

        if self.play_speed >= 0.0 {
            if self.current_time >= duration {
                self.current_time = 0.0;
                self.is_finished = true;
            }
        } else if self.current_time <= 0.0 {
            self.current_time = duration;
            self.is_finished = true;
        }

        self.current_frame = frame_at(self.current_time, frame_duration, self.frame_count);
    }
}

impl Default for Animator {
    fn default() -> Self {
        Self::new()
    }
}

/// Advance every animator by `delta` seconds in parallel.
pub fn animate_all(animators: &mut [Animator], delta: f32) -> Result<(), AnimationError> {
    animators.par_iter_mut().try_for_each(|animator| animator.animate(delta))
}

fn frame_at(time: f32, frame_duration: f32, frame_count: usize) -> usize {
    if frame_count == 0 || frame_duration <= 0.0 {
        return 0;
    }
    ((time / frame_duration).floor().max(0.0) as usize).min(frame_count - 1)
}

fn step_frame(frame: usize, len: usize, reversed: bool) -> usize {
    if reversed {
        if frame == 0 { len - 1 } else { frame - 1 }
    } else {
        (frame + 1) % len
    }
}

/// Rescale a clip-wide frame index into a track with `track_len` samples.
fn remap_frame(frame: usize, frame_count: usize, track_len: usize) -> usize {
    (frame * track_len / frame_count).min(track_len - 1)
}

fn blend_pose(primary: (Vec3, Quat), target: (Vec3, Quat), weight: f32) -> (Vec3, Quat) {
    if weight <= 0.0 {
        primary
    } else if weight >= 1.0 {
        target
    } else {
        (primary.0.lerp(target.0, weight), primary.1.slerp(target.1, weight))
    }
}
