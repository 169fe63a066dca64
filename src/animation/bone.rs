//! A single bone of a skeletal hierarchy

use glam::{Mat4, Quat, Vec3};

/// A node in a rigid bone hierarchy.
///
/// Parent and children are indices into the owning skeleton's bone list.
/// Once the skeleton is built, `id` equals the bone's position in that list.
#[derive(Clone, Debug, PartialEq)]
pub struct Bone {
    pub id: usize,
    /// Only used to cross-reference import data and animation tracks.
    pub name: String,
    pub parent_id: Option<usize>,
    pub children: Vec<usize>,
    /// Bind transform relative to the parent bone.
    pub bind_local: Mat4,
    /// Model-space inverse bind matrix, removes the bind pose from an animated global transform.
    pub bind_inverse: Mat4,
}

impl Bone {
    /// Create a parentless bone with the given bind matrices
    pub fn new(id: usize, name: impl Into<String>, bind_local: Mat4, bind_inverse: Mat4) -> Self {
        Self {
            id,
            name: name.into(),
            parent_id: None,
            children: Vec::new(),
            bind_local,
            bind_inverse,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Translation and rotation of the local bind pose. Scale is dropped.
    pub fn bind_translation_rotation(&self) -> (Vec3, Quat) {
        let (_, rotation, translation) = self.bind_local.to_scale_rotation_translation();
        (translation, rotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bone_creation() {
        let bone = Bone::new(3, "spine", Mat4::IDENTITY, Mat4::IDENTITY);
        assert_eq!(bone.id, 3);
        assert_eq!(bone.name, "spine");
        assert!(bone.is_root());
        assert!(bone.children.is_empty());
    }

    #[test]
    fn test_bind_translation_rotation() {
        let rotation = Quat::from_rotation_y(0.5);
        let local = Mat4::from_rotation_translation(rotation, Vec3::new(0.0, 1.0, 0.0));
        let bone = Bone::new(0, "root", local, local.inverse());

        let (t, r) = bone.bind_translation_rotation();
        assert!((t - Vec3::new(0.0, 1.0, 0.0)).length() < 1e-5);
        assert!(r.angle_between(rotation) < 1e-4);
    }
}
