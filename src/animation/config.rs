//! Animator configuration

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::MAX_BONES;
use crate::core::Error;

/// What an animator does when a bone of its skeleton has no keyframe track
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingTrackPolicy {
    /// Rewind playback to 0 and stop posing for this tick
    #[default]
    ResetAnimation,
    /// Hold the bone in its bind pose and keep going
    SkipBone,
    /// Stop posing and report [`AnimationError::MissingTrack`](super::AnimationError::MissingTrack)
    Fail,
}

/// Per-animator playback settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimatorConfig {
    /// Size of the pose and matrix buffers. Bones with a higher id are not posed.
    pub capacity: usize,
    pub missing_track: MissingTrackPolicy,
    /// Initial play speed; negative plays in reverse.
    pub play_speed: f32,
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        Self {
            capacity: MAX_BONES,
            missing_track: MissingTrackPolicy::default(),
            play_speed: 1.0,
        }
    }
}

impl AnimatorConfig {
    pub fn from_json_str(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn save(&self, path: &Path) -> Result<(), Error> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnimatorConfig::default();
        assert_eq!(config.capacity, MAX_BONES);
        assert_eq!(config.missing_track, MissingTrackPolicy::ResetAnimation);
        assert_eq!(config.play_speed, 1.0);
    }

    #[test]
    fn test_partial_json() {
        let config = AnimatorConfig::from_json_str(r#"{ "missing_track": "skip_bone" }"#).unwrap();
        assert_eq!(config.missing_track, MissingTrackPolicy::SkipBone);
        assert_eq!(config.capacity, MAX_BONES);
    }

    #[test]
    fn test_invalid_json() {
        let result = AnimatorConfig::from_json_str(r#"{ "missing_track": "explode" }"#);
        assert!(matches!(result, Err(Error::Json(_))));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("animator.json");

        let config = AnimatorConfig {
            capacity: 32,
            missing_track: MissingTrackPolicy::Fail,
            play_speed: -0.5,
        };
        config.save(&path).unwrap();

        assert_eq!(AnimatorConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = AnimatorConfig::load(&dir.path().join("nope.json"));
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
