//! GPU-side layout of the skinning matrix palette

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

/// GPU-side bone transform (mat4 for skinning matrix)
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct GpuBoneTransform {
    pub matrix: [[f32; 4]; 4],
}

impl GpuBoneTransform {
    /// Create from a glam Mat4
    pub fn from_mat4(matrix: Mat4) -> Self {
        Self {
            matrix: matrix.to_cols_array_2d(),
        }
    }

    pub fn identity() -> Self {
        Self::from_mat4(Mat4::IDENTITY)
    }

    /// Convert an animator's matrices into an upload-ready palette
    pub fn palette(matrices: &[Mat4]) -> Vec<Self> {
        matrices.iter().copied().map(Self::from_mat4).collect()
    }

    /// Raw bytes of a palette, column-major, for a storage or uniform buffer write
    pub fn as_bytes(palette: &[Self]) -> &[u8] {
        bytemuck::cast_slice(palette)
    }
}
