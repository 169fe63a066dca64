//! Skeletal animation system

pub mod bone;
pub mod skeleton;
pub mod clip;
pub mod config;
pub mod animator;
pub mod controller;
pub mod timeline;
pub mod montage;
pub mod gpu_animation;

pub use bone::Bone;
pub use skeleton::{Skeleton, SkeletonBuilder, SkeletonError, MAX_BONES};
pub use clip::{Animation, AnimationError, BoneTrack, KeyFrame, DEFAULT_FRAMERATE};
pub use config::{AnimatorConfig, MissingTrackPolicy};
pub use animator::{animate_all, AnimationState, Animator};
pub use controller::AnimationController;
pub use timeline::{EventPhase, Timeline};
pub use montage::AnimationMontage;
pub use gpu_animation::GpuBoneTransform;
