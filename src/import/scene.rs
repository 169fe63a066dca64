//! Imported scene graph: the generic node hierarchy delivered by an importer.
//!
//! Bones recovered from meshes or animation channels are matched against
//! these nodes, either through a node back-reference or by name.

use glam::Mat4;
use serde::{Deserialize, Serialize};

/// Index of a node in a [`SceneNodes`] arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SceneNodeId(pub u32);

impl SceneNodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A single named node in the imported scene.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SceneNode {
    pub id: SceneNodeId,
    pub name: String,
    pub parent: Option<SceneNodeId>,
    pub children: Vec<SceneNodeId>,
    /// Transform relative to the parent node.
    #[serde(default = "identity")]
    pub transform: Mat4,
}

fn identity() -> Mat4 {
    Mat4::IDENTITY
}

/// Arena of scene nodes. Nodes are only ever appended, so ids stay valid.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SceneNodes {
    nodes: Vec<SceneNode>,
}

impl SceneNodes {
    /// Create an empty node graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a graph holding a single root node.
    pub fn with_root(name: impl Into<String>) -> Self {
        let mut nodes = Self::new();
        nodes.add_root(name);
        nodes
    }

    /// Add a parentless node. Returns its id.
    pub fn add_root(&mut self, name: impl Into<String>) -> SceneNodeId {
        self.push(name.into(), None)
    }

    /// Add a child node under `parent`. Returns the new node's id.
    pub fn add_child(&mut self, parent: SceneNodeId, name: impl Into<String>) -> SceneNodeId {
        let id = self.push(name.into(), Some(parent));
        if let Some(parent_node) = self.nodes.get_mut(parent.index()) {
            parent_node.children.push(id);
        }
        id
    }

    fn push(&mut self, name: String, parent: Option<SceneNodeId>) -> SceneNodeId {
        let id = SceneNodeId(self.nodes.len() as u32);
        self.nodes.push(SceneNode {
            id,
            name,
            parent,
            children: Vec::new(),
            transform: Mat4::IDENTITY,
        });
        id
    }

    /// Set the local transform of a node.
    pub fn set_transform(&mut self, id: SceneNodeId, transform: Mat4) {
        if let Some(node) = self.nodes.get_mut(id.index()) {
            node.transform = transform;
        }
    }

    /// The first parentless node, if any.
    pub fn root(&self) -> Option<SceneNodeId> {
        self.nodes.iter().find(|n| n.parent.is_none()).map(|n| n.id)
    }

    /// Get an immutable reference to a node.
    pub fn get(&self, id: SceneNodeId) -> Option<&SceneNode> {
        self.nodes.get(id.index())
    }

    /// Find the first node with the given name.
    pub fn find_by_name(&self, name: &str) -> Option<SceneNodeId> {
        self.nodes.iter().find(|n| n.name == name).map(|n| n.id)
    }

    /// Parent of a node, if it has one.
    pub fn parent(&self, id: SceneNodeId) -> Option<SceneNodeId> {
        self.get(id)?.parent
    }

    /// Iterate over the children of a node.
    pub fn children(&self, id: SceneNodeId) -> impl Iterator<Item = SceneNodeId> + '_ {
        self.get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
            .iter()
            .copied()
    }

    /// Total number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_root() {
        let nodes = SceneNodes::with_root("RootNode");
        assert_eq!(nodes.node_count(), 1);
        let root = nodes.root().unwrap();
        assert_eq!(nodes.get(root).unwrap().name, "RootNode");
        assert_eq!(nodes.parent(root), None);
    }

    #[test]
    fn test_add_child_and_find() {
        let mut nodes = SceneNodes::with_root("RootNode");
        let root = nodes.root().unwrap();
        let hips = nodes.add_child(root, "Hips");
        let spine = nodes.add_child(hips, "Spine");

        assert_eq!(nodes.find_by_name("Spine"), Some(spine));
        assert_eq!(nodes.find_by_name("Head"), None);
        assert_eq!(nodes.parent(spine), Some(hips));
        assert!(nodes.children(root).any(|c| c == hips));
        assert_eq!(nodes.children(spine).count(), 0);
    }

    #[test]
    fn test_children_of_unknown_node() {
        let nodes = SceneNodes::new();
        assert_eq!(nodes.children(SceneNodeId(7)).count(), 0);
        assert!(nodes.root().is_none());
    }
}
