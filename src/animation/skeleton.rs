//! Skeletal bone hierarchy and its construction from import data

use glam::Mat4;
use std::collections::HashMap;
use thiserror::Error;

use super::Bone;
use crate::import::{ImportedChannel, ImportedMeshBone, ImportedSkeleton, SceneNodeId, SceneNodes};

/// Maximum number of bones an animator can pose (GPU uniform buffer limit)
pub const MAX_BONES: usize = 100;

/// Reasons a skeleton cannot be built
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SkeletonError {
    #[error("skeleton has no bones")]
    Empty,

    #[error("no root bone could be identified")]
    NoRoot,

    #[error("bone hierarchy contains a cycle through '{bone}'")]
    Cycle { bone: String },

    #[error("parent bone '{parent}' of '{bone}' not found")]
    UnknownParent { bone: String, parent: String },
}

/// A single-root bone hierarchy stored in topological order.
///
/// Every bone's parent is stored before the bone itself, so global
/// transforms can be accumulated in one forward pass.
#[derive(Clone, Debug)]
pub struct Skeleton {
    bones: Vec<Bone>,
    bone_names: HashMap<String, usize>,
}

impl Skeleton {
    fn from_bones(bones: Vec<Bone>) -> Self {
        let mut skeleton = Self {
            bones,
            bone_names: HashMap::new(),
        };
        skeleton.rebuild_name_index();
        skeleton
    }

    fn rebuild_name_index(&mut self) {
        self.bone_names.clear();
        for bone in &self.bones {
            self.bone_names.entry(bone.name.clone()).or_insert(bone.id);
        }
    }

    /// Get the number of bones in the skeleton
    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    /// All bones, parents first
    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    /// Get a bone by index
    pub fn bone(&self, index: usize) -> Option<&Bone> {
        self.bones.get(index)
    }

    /// The root bone. A built skeleton always stores it first.
    pub fn root(&self) -> &Bone {
        &self.bones[0]
    }

    /// Find a bone index by name
    pub fn find_bone(&self, name: &str) -> Option<usize> {
        self.bone_names.get(name).copied()
    }

    /// Get the parent index of a bone
    pub fn parent_index(&self, bone_index: usize) -> Option<usize> {
        self.bones.get(bone_index)?.parent_id
    }

    /// Get all children of a bone
    pub fn children(&self, bone_index: usize) -> &[usize] {
        self.bones
            .get(bone_index)
            .map(|b| b.children.as_slice())
            .unwrap_or(&[])
    }

    /// Number of parent links between a bone and the root.
    pub fn depth(&self, bone_index: usize) -> usize {
        let mut depth = 0;
        let mut current = self.parent_index(bone_index);
        while let Some(parent) = current {
            depth += 1;
            current = self.parent_index(parent);
        }
        depth
    }

    /// True when every parent is stored before its children.
    pub fn is_topologically_sorted(&self) -> bool {
        self.bones
            .iter()
            .enumerate()
            .all(|(i, b)| b.id == i && b.parent_id.is_none_or(|p| p < i))
    }

    /// Calculate world-space transforms for all bones given local transforms.
    ///
    /// Bones past the end of `local_transforms` use an identity local transform.
    pub fn calculate_world_transforms(&self, local_transforms: &[Mat4]) -> Vec<Mat4> {
        let mut world_transforms = vec![Mat4::IDENTITY; self.bones.len()];

        // Process bones in order (parents before children)
        for (index, bone) in self.bones.iter().enumerate() {
            let local = local_transforms.get(index).copied().unwrap_or(Mat4::IDENTITY);
            world_transforms[index] = match bone.parent_id {
                Some(parent_idx) => world_transforms[parent_idx] * local,
                None => local,
            };
        }

        world_transforms
    }

    /// Model-space bind pose of every bone
    pub fn bind_pose_globals(&self) -> Vec<Mat4> {
        let locals: Vec<Mat4> = self.bones.iter().map(|b| b.bind_local).collect();
        self.calculate_world_transforms(&locals)
    }

    /// Re-emit the bones in pre-order from the root, reassigning ids so that
    /// every parent precedes its children.
    ///
    /// When several parentless bones exist, the one with the largest subtree
    /// is kept as root and the other subtrees are dropped. Returns the number
    /// of dropped bones.
    pub fn reorder_bones(&mut self) -> usize {
        let Some(root) = self.primary_root() else {
            return 0;
        };

        let bone_count = self.bones.len();
        let mut remap: Vec<Option<usize>> = vec![None; bone_count];
        let mut order = Vec::with_capacity(bone_count);
        let mut stack = vec![root];

        while let Some(old) = stack.pop() {
            if remap[old].is_some() {
                continue;
            }
            remap[old] = Some(order.len());
            order.push(old);
            // Reversed so the first child is visited first
            stack.extend(self.bones[old].children.iter().rev().copied());
        }

        let mut old_bones: Vec<Option<Bone>> = std::mem::take(&mut self.bones)
            .into_iter()
            .map(Some)
            .collect();

        let mut new_bones = Vec::with_capacity(order.len());
        for old in order {
            if let Some(mut bone) = old_bones[old].take() {
                bone.id = new_bones.len();
                bone.parent_id = bone.parent_id.and_then(|p| remap[p]);
                bone.children = bone.children.iter().filter_map(|&c| remap[c]).collect();
                new_bones.push(bone);
            }
        }

        let dropped = bone_count - new_bones.len();
        if dropped > 0 {
            let names: Vec<&str> = old_bones.iter().flatten().map(|b| b.name.as_str()).collect();
            log::warn!(
                "Dropped {} bone(s) detached from root '{}': {:?}",
                dropped,
                new_bones[0].name,
                names
            );
        }

        self.bones = new_bones;
        self.rebuild_name_index();
        dropped
    }

    fn primary_root(&self) -> Option<usize> {
        let mut best: Option<(usize, usize)> = None;
        for (index, bone) in self.bones.iter().enumerate() {
            if !bone.is_root() {
                continue;
            }
            let size = self.subtree_size(index);
            if best.is_none_or(|(_, best_size)| size > best_size) {
                best = Some((index, size));
            }
        }
        best.map(|(index, _)| index)
    }

    fn subtree_size(&self, index: usize) -> usize {
        let mut visited = vec![false; self.bones.len()];
        let mut stack = vec![index];
        let mut size = 0;
        while let Some(current) = stack.pop() {
            if std::mem::replace(&mut visited[current], true) {
                continue;
            }
            size += 1;
            stack.extend(self.bones[current].children.iter().copied());
        }
        size
    }
}

/// A bone whose hierarchy and bind matrices may still be incomplete.
#[derive(Clone, Debug, Default)]
struct PendingBone {
    name: String,
    parent: Option<usize>,
    bind_local: Option<Mat4>,
    bind_inverse: Option<Mat4>,
    node: Option<SceneNodeId>,
}

impl PendingBone {
    fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Builder for skeleton construction, from code or from import data
#[derive(Clone, Debug, Default)]
pub struct SkeletonBuilder {
    bones: Vec<PendingBone>,
    last_error: Option<SkeletonError>,
}

impl SkeletonBuilder {
    /// Create a new skeleton builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a root bone (no parent)
    pub fn add_root(mut self, name: &str, transform: Mat4) -> Self {
        if self.last_error.is_some() {
            return self;
        }

        self.bones.push(PendingBone {
            bind_local: Some(transform),
            ..PendingBone::named(name)
        });
        self
    }

    /// Add a bone with a parent
    pub fn add_bone(mut self, name: &str, parent: &str, transform: Mat4) -> Self {
        if self.last_error.is_some() {
            return self;
        }

        let Some(parent_index) = self.index_of(parent) else {
            self.last_error = Some(SkeletonError::UnknownParent {
                bone: name.to_string(),
                parent: parent.to_string(),
            });
            return self;
        };

        self.bones.push(PendingBone {
            parent: Some(parent_index),
            bind_local: Some(transform),
            ..PendingBone::named(name)
        });
        self
    }

    /// Bones of an explicit skeleton: parents and both bind matrices are copied as-is.
    pub fn from_imported_skeleton(skeleton: &ImportedSkeleton) -> Self {
        let bones = skeleton
            .bones
            .iter()
            .map(|bone| PendingBone {
                parent: bone.parent,
                bind_local: Some(bone.local_matrix),
                bind_inverse: Some(bone.offset_matrix),
                ..PendingBone::named(bone.name.as_str())
            })
            .collect();

        Self {
            bones,
            last_error: None,
        }
    }

    /// Bones embedded in a mesh. Parents are recovered through the node
    /// back-reference when present, otherwise by matching the parent node's
    /// name against the other bone names. Unmatched bones stay parentless.
    pub fn from_mesh_bones(mesh_bones: &[ImportedMeshBone], nodes: &SceneNodes) -> Self {
        let mut bones: Vec<PendingBone> = mesh_bones
            .iter()
            .map(|bone| PendingBone {
                bind_inverse: Some(bone.offset_matrix),
                node: bone.node,
                ..PendingBone::named(bone.name.as_str())
            })
            .collect();

        for i in 0..bones.len() {
            let parent = match bones[i].node {
                Some(node) => nodes.parent(node).and_then(|parent_node| {
                    bones.iter().position(|b| b.node == Some(parent_node))
                }),
                None => nodes
                    .find_by_name(&bones[i].name)
                    .and_then(|node| nodes.parent(node))
                    .and_then(|parent_node| nodes.get(parent_node))
                    .and_then(|parent_node| bones.iter().position(|b| b.name == parent_node.name)),
            };

            match parent {
                Some(p) if p != i => bones[i].parent = Some(p),
                _ => log::debug!("Mesh bone '{}' has no parent bone", bones[i].name),
            }
        }

        Self {
            bones,
            last_error: None,
        }
    }

    /// Synthesize a bone for every animated node not already present, linking
    /// it to known bones through the scene graph. Works on an empty builder
    /// to reconstruct a skeleton from animation channels alone.
    ///
    /// The node's transform becomes the bone's local bind pose; nodes missing
    /// from the graph get an identity bind pose.
    pub fn with_animation_channels(mut self, channels: &[ImportedChannel], nodes: &SceneNodes) -> Self {
        for channel in channels {
            let name = channel.node_name.as_str();
            if self.index_of(name).is_some() {
                continue;
            }

            let id = self.bones.len();
            let mut bone = PendingBone {
                bind_local: Some(Mat4::IDENTITY),
                bind_inverse: Some(Mat4::IDENTITY),
                ..PendingBone::named(name)
            };

            let Some(node) = nodes.find_by_name(name) else {
                log::warn!("Animated node '{}' is missing from the scene graph", name);
                self.bones.push(bone);
                continue;
            };
            bone.node = Some(node);
            bone.bind_local = nodes.get(node).map(|n| n.transform);
            bone.bind_inverse = None;

            for child in nodes.children(node) {
                let Some(child_name) = nodes.get(child).map(|n| n.name.as_str()) else {
                    continue;
                };
                if let Some(c) = self.index_of(child_name) {
                    if self.bones[c].parent.is_none() {
                        self.bones[c].parent = Some(id);
                    }
                }
            }

            bone.parent = nodes
                .parent(node)
                .and_then(|parent_node| nodes.get(parent_node))
                .and_then(|parent_node| self.index_of(&parent_node.name));

            self.bones.push(bone);
        }
        self
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.bones.iter().position(|b| b.name == name)
    }

    /// Validate the hierarchy, complete the bind matrices and reorder the
    /// bones parents-first.
    pub fn build(self) -> Result<Skeleton, SkeletonError> {
        if let Some(error) = self.last_error {
            return Err(error);
        }

        let mut pending = self.bones;
        let bone_count = pending.len();
        if bone_count == 0 {
            return Err(SkeletonError::Empty);
        }

        for bone in pending.iter_mut() {
            if bone.parent.is_some_and(|p| p >= bone_count) {
                log::warn!("Bone '{}' has an out-of-range parent, detaching it", bone.name);
                bone.parent = None;
            }
        }

        if pending.iter().all(|b| b.parent.is_some()) {
            return Err(SkeletonError::NoRoot);
        }

        // Bounded walk to the root; more than N steps means a cycle
        let mut depths = vec![0usize; bone_count];
        for (i, bone) in pending.iter().enumerate() {
            let mut current = bone.parent;
            while let Some(parent) = current {
                depths[i] += 1;
                if depths[i] > bone_count {
                    return Err(SkeletonError::Cycle {
                        bone: bone.name.clone(),
                    });
                }
                current = pending[parent].parent;
            }
        }

        if bone_count > MAX_BONES {
            log::warn!(
                "Skeleton has {} bones, animators only pose the first {}",
                bone_count,
                MAX_BONES
            );
        }

        let mut order: Vec<usize> = (0..bone_count).collect();
        order.sort_by_key(|&i| depths[i]);

        let mut globals = vec![Mat4::IDENTITY; bone_count];
        let mut locals = vec![Mat4::IDENTITY; bone_count];
        let mut inverses = vec![Mat4::IDENTITY; bone_count];

        for i in order {
            let parent_global = pending[i].parent.map_or(Mat4::IDENTITY, |p| globals[p]);
            let parent_inverse = pending[i].parent.map_or(Mat4::IDENTITY, |p| inverses[p]);

            let (local, inverse, global) = match (pending[i].bind_local, pending[i].bind_inverse) {
                (Some(local), Some(inverse)) => (local, inverse, parent_global * local),
                (Some(local), None) => {
                    let global = parent_global * local;
                    (local, global.inverse(), global)
                }
                (None, Some(inverse)) => {
                    let global = inverse.inverse();
                    (parent_inverse * global, inverse, global)
                }
                (None, None) => (Mat4::IDENTITY, Mat4::IDENTITY, parent_global),
            };

            locals[i] = local;
            inverses[i] = inverse;
            globals[i] = global;
        }

        let mut bones: Vec<Bone> = pending
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let mut bone = Bone::new(i, p.name.as_str(), locals[i], inverses[i]);
                bone.parent_id = p.parent;
                bone
            })
            .collect();

        for i in 0..bone_count {
            if let Some(parent) = bones[i].parent_id {
                bones[parent].children.push(i);
            }
        }

        let mut skeleton = Skeleton::from_bones(bones);
        if skeleton.bone_names.len() != skeleton.bones.len() {
            log::warn!("Skeleton contains duplicate bone names; lookups resolve to the first");
        }

        skeleton.reorder_bones();
        log::debug!("Built skeleton with {} bones", skeleton.bone_count());
        Ok(skeleton)
    }
}
