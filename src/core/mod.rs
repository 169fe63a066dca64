//! Core utilities shared by the animation and import layers

pub mod error;
pub mod logging;
pub mod time;

pub use error::Error;
pub use time::{DeltaTime, FixedTimestep, FrameTimer};
