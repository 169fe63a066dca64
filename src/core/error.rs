//! Error types for the animation core

use thiserror::Error;

use crate::animation::{AnimationError, SkeletonError};

/// Main error type for the crate
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Skeleton error: {0}")]
    Skeleton(#[from] SkeletonError),

    #[error("Animation error: {0}")]
    Animation(#[from] AnimationError),

    #[error("Import error: {0}")]
    Import(String),
}
