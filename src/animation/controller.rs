//! Per-model animation component owning a primary and a blend animator

use std::sync::Arc;

use glam::Mat4;

use super::{Animation, AnimationError, Animator, AnimatorConfig};
use crate::core::DeltaTime;

/// Drives one skinned model: plays a clip and optionally crossfades to another.
#[derive(Clone, Debug, Default)]
pub struct AnimationController {
    animator: Animator,
    blend: Animator,
    blending: bool,
}

impl AnimationController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Both animators share the same configuration
    pub fn with_config(config: AnimatorConfig) -> Self {
        Self {
            animator: Animator::with_config(config.clone()),
            blend: Animator::with_config(config),
            blending: false,
        }
    }

    /// Play `animation` on the primary animator
    pub fn start_animation(&mut self, animation: Arc<Animation>) {
        self.animator.start(animation);
    }

    /// Bind `animation` to the blend animator and start crossfading towards it.
    pub fn start_blending(&mut self, animation: Arc<Animation>) {
        self.blend.start(animation);
        self.blending = true;
    }

    pub fn set_cross_fade(&mut self, weight: f32) {
        self.animator.set_cross_fade(weight);
    }

    /// Promote the blend clip to the primary animator, continuing from the
    /// blend animator's playback time.
    pub fn finish_blending(&mut self) {
        if !self.blending {
            return;
        }

        if let Some(target) = self.blend.animation().cloned() {
            self.animator.set_current_time(self.blend.current_time());
            self.animator.start(target);
        }
        self.stop_blending();
    }

    /// Drop the blend target and keep playing the primary clip
    pub fn stop_blending(&mut self) {
        self.blending = false;
        self.animator.set_cross_fade(0.0);
        self.blend.stop();
    }

    pub fn is_blending(&self) -> bool {
        self.blending
    }

    /// Advance by `delta` seconds
    pub fn update(&mut self, delta: f32) -> Result<(), AnimationError> {
        if self.blending {
            self.animator.animate_blended(delta, &mut self.blend)
        } else {
            self.animator.animate(delta)
        }
    }

    /// Advance by the delta reported by `clock`
    pub fn tick(&mut self, clock: &impl DeltaTime) -> Result<(), AnimationError> {
        self.update(clock.delta_secs())
    }

    pub fn matrices(&self) -> &[Mat4] {
        self.animator.matrices()
    }

    pub fn animator(&self) -> &Animator {
        &self.animator
    }

    pub fn animator_mut(&mut self) -> &mut Animator {
        &mut self.animator
    }

    pub fn blend_animator(&self) -> &Animator {
        &self.blend
    }
}
