//! Scripted sequences of clips, crossfades and named notifications

use std::sync::Arc;

use super::timeline::{EventPhase, Timeline};
use super::{Animation, AnimationController};

#[derive(Clone, Debug)]
enum MontageAction {
    Play(Arc<Animation>),
    Blend {
        source: Arc<Animation>,
        target: Arc<Animation>,
    },
}

/// A timeline of actions applied to an [`AnimationController`].
///
/// The montage only switches clips and crossfade weights; the controller
/// still has to be updated every tick to pose the skeleton.
#[derive(Clone, Debug, Default)]
pub struct AnimationMontage {
    actions: Timeline<MontageAction>,
    notifies: Timeline<String>,
    ended: bool,
    pub looping: bool,
}

impl AnimationMontage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total length in seconds
    pub fn duration(&self) -> f32 {
        self.actions.duration()
    }

    fn extend(&mut self, duration: f32) {
        self.actions.set_duration(self.actions.duration() + duration);
        self.notifies.set_duration(self.notifies.duration() + duration);
    }

    /// Play `animation` from `at` seconds. The montage grows by the clip's duration.
    pub fn add_animation(&mut self, at: f32, animation: Arc<Animation>) {
        let duration = animation.duration();
        self.extend(duration);
        self.actions.add_event(at, duration, MontageAction::Play(animation));
    }

    /// Crossfade from `source` to `target` over `blend_duration` seconds starting at `at`.
    pub fn add_blend(&mut self, at: f32, source: Arc<Animation>, target: Arc<Animation>, blend_duration: f32) {
        self.extend(blend_duration);
        self.actions
            .add_event(at, blend_duration, MontageAction::Blend { source, target });
    }

    /// Fire the notification `name` at `at` seconds.
    ///
    /// Returns `false` when `at` is past the current end of the montage.
    pub fn add_notify(&mut self, at: f32, name: impl Into<String>) -> bool {
        self.notifies.add_event(at, 0.0, name.into())
    }

    /// Rewind and play from the start
    pub fn start(&mut self) {
        self.actions.start();
        self.notifies.start();
        self.ended = false;
    }

    /// Advance by `delta` seconds, driving `controller`.
    ///
    /// Returns the notifications fired during this update.
    pub fn update(&mut self, delta: f32, controller: &mut AnimationController) -> Vec<String> {
        let mut fired = Vec::new();
        if self.ended {
            return fired;
        }

        self.notifies.update(delta, |name, phase| {
            if phase == EventPhase::Begin {
                fired.push(name.clone());
            }
        });

        self.ended = self.actions.update(delta, |action, phase| match (action, phase) {
            (MontageAction::Play(animation), EventPhase::Begin) => {
                controller.start_animation(animation.clone());
            }
            (MontageAction::Blend { source, target }, EventPhase::Begin) => {
                controller.start_animation(source.clone());
                controller.start_blending(target.clone());
                controller.set_cross_fade(0.0);
            }
            (MontageAction::Blend { .. }, EventPhase::Update(progress)) => {
                controller.set_cross_fade(progress);
            }
            (MontageAction::Blend { .. }, EventPhase::End) => {
                controller.finish_blending();
            }
            (MontageAction::Play(_), _) => {}
        });

        if self.ended {
            log::debug!("Montage ended after {}s", self.duration());
            if self.looping {
                self.start();
            }
        }

        fired
    }

    pub fn has_ended(&self) -> bool {
        self.ended
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{BoneTrack, KeyFrame, SkeletonBuilder};
    use glam::{Mat4, Quat, Vec3};

    fn create_clips() -> (Arc<Animation>, Arc<Animation>) {
        let skeleton = Arc::new(SkeletonBuilder::new().add_root("root", Mat4::IDENTITY).build().unwrap());
        let clip = |name: &str, x: f32| {
            let mut clip = Animation::new(name, 2, 2.0).unwrap();
            clip.add_track(
                "root",
                BoneTrack::new(vec![
                    KeyFrame::new(0.0, Vec3::new(x, 0.0, 0.0), Quat::IDENTITY),
                    KeyFrame::new(1.0, Vec3::new(x, 0.0, 0.0), Quat::IDENTITY),
                ]),
            );
            clip.bind_skeleton(skeleton.clone());
            Arc::new(clip)
        };
        (clip("walk", 0.0), clip("jump", 4.0))
    }

    fn is_current(controller: &AnimationController, clip: &Arc<Animation>) -> bool {
        controller.animator().animation().is_some_and(|a| Arc::ptr_eq(a, clip))
    }

    #[test]
    fn test_duration_accumulates() {
        let (walk, jump) = create_clips();
        let mut montage = AnimationMontage::new();
        montage.add_animation(0.0, walk.clone());
        montage.add_blend(1.0, walk, jump, 0.5);
        assert!((montage.duration() - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_notify_past_end_is_rejected() {
        let (walk, _) = create_clips();
        let mut montage = AnimationMontage::new();
        assert!(!montage.add_notify(0.0, "too early"));

        montage.add_animation(0.0, walk);
        assert!(montage.add_notify(0.5, "footstep"));
        assert!(!montage.add_notify(1.0, "late"));
    }

    #[test]
    fn test_plays_sequence() {
        let (walk, jump) = create_clips();
        let mut montage = AnimationMontage::new();
        montage.add_animation(0.0, walk.clone());
        montage.add_blend(1.0, walk.clone(), jump.clone(), 1.0);
        montage.add_notify(0.5, "footstep");

        let mut controller = AnimationController::new();
        montage.start();

        assert!(montage.update(0.25, &mut controller).is_empty());
        assert!(is_current(&controller, &walk));

        assert_eq!(montage.update(0.25, &mut controller), vec!["footstep".to_string()]);

        montage.update(0.5, &mut controller);
        assert!(controller.is_blending());
        assert_eq!(controller.animator().cross_fade(), 0.0);

        montage.update(0.5, &mut controller);
        assert!((controller.animator().cross_fade() - 0.5).abs() < 1e-6);

        montage.update(0.25, &mut controller);
        assert!(!montage.has_ended());

        montage.update(0.25, &mut controller);
        assert!(montage.has_ended());
        assert!(montage.update(0.25, &mut controller).is_empty());
    }

    #[test]
    fn test_blend_end_promotes_target() {
        let (walk, jump) = create_clips();
        let mut montage = AnimationMontage::new();
        montage.add_blend(0.0, walk, jump.clone(), 0.5);
        montage.add_animation(1.0, jump.clone());

        let mut controller = AnimationController::new();
        montage.start();
        montage.update(0.1, &mut controller);
        assert!(controller.is_blending());

        montage.update(0.5, &mut controller);
        assert!(!controller.is_blending());
        assert!(is_current(&controller, &jump));
    }

    #[test]
    fn test_trailing_blend_finishes_before_loop() {
        let (walk, jump) = create_clips();
        let mut montage = AnimationMontage::new();
        montage.looping = true;
        montage.add_animation(0.0, walk.clone());
        montage.add_blend(1.0, walk.clone(), jump.clone(), 1.0);

        let mut controller = AnimationController::new();
        montage.start();
        for _ in 0..8 {
            montage.update(0.25, &mut controller);
            controller.update(0.25).unwrap();
        }

        // The blend ran into the end of the montage and was promoted
        assert!(!controller.is_blending());
        assert_eq!(controller.animator().cross_fade(), 0.0);
        assert!(is_current(&controller, &jump));
        assert!(!montage.has_ended());

        montage.update(0.25, &mut controller);
        controller.update(0.25).unwrap();

        assert!(!controller.is_blending());
        assert!(is_current(&controller, &walk));
        assert!(controller.animator().positions()[0].abs_diff_eq(Vec3::ZERO, 1e-6));
    }

    #[test]
    fn test_looping_restarts() {
        let (walk, _) = create_clips();
        let mut montage = AnimationMontage::new();
        montage.looping = true;
        montage.add_animation(0.0, walk);
        montage.add_notify(0.1, "start");

        let mut controller = AnimationController::new();
        montage.start();
        assert_eq!(montage.update(0.2, &mut controller).len(), 1);

        montage.update(1.0, &mut controller);
        assert!(!montage.has_ended());
        assert_eq!(montage.update(0.2, &mut controller).len(), 1);
    }
}
