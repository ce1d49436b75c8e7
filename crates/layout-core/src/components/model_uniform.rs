use bytemuck::{Pod, Zeroable};

use crate::math::Mat4;

/// GPU用モデルUniform
/// ノードのワールド行列を列優先形式で格納
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ModelUniform {
    pub model: [[f32; 4]; 4],
}

impl ModelUniform {
    pub fn from_matrix(matrix: Mat4) -> Self {
        Self {
            model: matrix.to_cols_array_2d(),
        }
    }

    pub fn identity() -> Self {
        Self::from_matrix(Mat4::IDENTITY)
    }

    /// Flat column-major array for hosts that upload `Float32Array`s
    pub fn to_cols_array(&self) -> [f32; 16] {
        Mat4::from_cols_array_2d(&self.model).to_cols_array()
    }
}

impl Default for ModelUniform {
    fn default() -> Self {
        Self::identity()
    }
}
