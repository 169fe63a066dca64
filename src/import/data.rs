//! Raw data handed over by a model importer.
//!
//! Matrices are expected column-major. Nothing here is validated; the
//! skeleton builder and [`Animation::from_imported`](crate::animation::Animation::from_imported)
//! decide what to accept.

use std::fs;
use std::path::Path;

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::core::Error;

use super::scene::{SceneNodeId, SceneNodes};

/// A bone from an explicit skeleton: parent index and both bind matrices are known.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImportedSkeletonBone {
    pub name: String,
    /// Index into the owning [`ImportedSkeleton::bones`], `None` for the root.
    pub parent: Option<usize>,
    /// Bind transform relative to the parent bone.
    pub local_matrix: Mat4,
    /// Model-space inverse bind matrix.
    pub offset_matrix: Mat4,
}

/// An explicit skeleton.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ImportedSkeleton {
    pub name: String,
    pub bones: Vec<ImportedSkeletonBone>,
}

/// A bone embedded in a mesh. Carries no hierarchy of its own.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImportedMeshBone {
    pub name: String,
    /// Model-space inverse bind matrix.
    pub offset_matrix: Mat4,
    /// Back-reference into the scene graph, when the importer provides one.
    #[serde(default)]
    pub node: Option<SceneNodeId>,
}

/// A mesh with its skinning bones.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ImportedMesh {
    pub name: String,
    #[serde(default)]
    pub bones: Vec<ImportedMeshBone>,
}

impl ImportedMesh {
    pub fn has_bones(&self) -> bool {
        !self.bones.is_empty()
    }
}

/// A timed vector key.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct VectorKey {
    pub time: f32,
    pub value: Vec3,
}

/// A timed rotation key.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct QuatKey {
    pub time: f32,
    pub value: Quat,
}

/// Keyframes for one animated node.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ImportedChannel {
    pub node_name: String,
    #[serde(default)]
    pub position_keys: Vec<VectorKey>,
    #[serde(default)]
    pub rotation_keys: Vec<QuatKey>,
    #[serde(default)]
    pub scaling_keys: Vec<VectorKey>,
}

/// An animation clip as imported. Durations are expressed in ticks.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ImportedAnimation {
    pub name: String,
    pub duration_ticks: f64,
    pub ticks_per_second: f64,
    pub channels: Vec<ImportedChannel>,
}

/// Everything an importer extracted from one model file.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ImportedScene {
    pub nodes: SceneNodes,
    #[serde(default)]
    pub skeletons: Vec<ImportedSkeleton>,
    #[serde(default)]
    pub meshes: Vec<ImportedMesh>,
    #[serde(default)]
    pub animations: Vec<ImportedAnimation>,
}

impl ImportedScene {
    /// Parse a scene from its JSON representation.
    pub fn from_json_str(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a scene from a JSON file.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Save the scene as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), Error> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
