//! Importer-facing data model and model assembly

pub mod scene;
pub mod data;
pub mod model;

pub use scene::{SceneNode, SceneNodeId, SceneNodes};
pub use data::{
    ImportedAnimation, ImportedChannel, ImportedMesh, ImportedMeshBone, ImportedScene, ImportedSkeleton,
    ImportedSkeletonBone, QuatKey, VectorKey,
};
pub use model::SkinnedModel;
