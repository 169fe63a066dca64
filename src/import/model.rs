//! Assemble a shared skeleton and its animation clips from an imported scene

use std::path::Path;
use std::sync::Arc;

use crate::animation::{Animation, Skeleton, SkeletonBuilder};
use crate::core::Error;

use super::ImportedScene;

/// A skeleton plus every clip animating it, ready to hand out to animators.
#[derive(Clone, Debug)]
pub struct SkinnedModel {
    skeleton: Arc<Skeleton>,
    animations: Vec<Arc<Animation>>,
}

impl SkinnedModel {
    /// Build the model from import data.
    ///
    /// The skeleton comes from the first mesh with bones (completed with the
    /// first animation's channels), else from the single explicit skeleton,
    /// else from the first animation's channels alone.
    pub fn from_scene(scene: &ImportedScene) -> Result<Self, Error> {
        let channels = scene
            .animations
            .first()
            .map_or(&[][..], |animation| animation.channels.as_slice());

        let builder = if let Some(mesh) = scene.meshes.iter().find(|m| m.has_bones()) {
            log::debug!("Building skeleton from the bones of mesh '{}'", mesh.name);
            SkeletonBuilder::from_mesh_bones(&mesh.bones, &scene.nodes).with_animation_channels(channels, &scene.nodes)
        } else {
            match scene.skeletons.as_slice() {
                [skeleton] => SkeletonBuilder::from_imported_skeleton(skeleton),
                [] if !channels.is_empty() => SkeletonBuilder::new().with_animation_channels(channels, &scene.nodes),
                [] => {
                    return Err(Error::Import(
                        "scene has no skeleton, skinned mesh or animation channels".to_string(),
                    ));
                }
                skeletons => {
                    return Err(Error::Import(format!(
                        "scene has {} skeletons and no skinned mesh to pick one",
                        skeletons.len()
                    )));
                }
            }
        };

        let skeleton = Arc::new(builder.build()?);

        let animations = scene
            .animations
            .iter()
            .map(|imported| {
                let mut animation = Animation::from_imported(imported)?;
                animation.bind_skeleton(skeleton.clone());
                Ok(Arc::new(animation))
            })
            .collect::<Result<Vec<_>, Error>>()?;

        log::info!(
            "Loaded skinned model: {} bones, {} animations",
            skeleton.bone_count(),
            animations.len()
        );

        Ok(Self { skeleton, animations })
    }

    /// Load import data from a JSON file and build the model.
    pub fn load(path: &Path) -> Result<Self, Error> {
        Self::from_scene(&ImportedScene::load(path)?)
    }

    pub fn skeleton(&self) -> &Arc<Skeleton> {
        &self.skeleton
    }

    pub fn animations(&self) -> &[Arc<Animation>] {
        &self.animations
    }

    /// Find a clip by name
    pub fn animation(&self, name: &str) -> Option<&Arc<Animation>> {
        self.animations.iter().find(|a| a.name == name)
    }
}
