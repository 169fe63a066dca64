//! Skelanim - skeletal animation core: bone hierarchies, keyframe clips,
//! playback and crossfade blending

pub mod core;
pub mod animation;
pub mod import;
