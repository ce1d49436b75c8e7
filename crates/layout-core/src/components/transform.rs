use serde::{Deserialize, Serialize};

use crate::math::{self, Mat4, Quat, Vec3};

/// 3D Transform of a scene node
/// Position, rotation and scale relative to the parent node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Create a new Transform with specified values
    pub fn new(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    /// Create an identity transform (no translation, rotation, or scale)
    pub fn identity() -> Self {
        Self::IDENTITY
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    /// Create a transform from Euler angles given in radians (XYZ order)
    pub fn from_euler(position: Vec3, rotation_radians: Vec3, scale: Vec3) -> Self {
        Self::new(position, math::quat_from_euler(rotation_radians), scale)
    }

    /// Create a transform from Euler angles given in degrees (XYZ order)
    pub fn from_euler_degrees(position: Vec3, rotation_degrees: Vec3, scale: Vec3) -> Self {
        Self::new(position, math::quat_from_euler_degrees(rotation_degrees), scale)
    }

    /// Decompose a matrix into scale/rotation/translation
    pub fn from_matrix(matrix: Mat4) -> Self {
        let (scale, rotation, position) = matrix.to_scale_rotation_translation();
        Self::new(position, rotation, scale)
    }

    /// Convert to a 4x4 transformation matrix
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Euler angles of the rotation, in radians
    pub fn euler_radians(&self) -> Vec3 {
        math::euler_from_quat(self.rotation)
    }

    /// `self ∘ child`: the transform of `child` once placed under `self`
    pub fn mul_transform(&self, child: &Transform) -> Transform {
        Self::from_matrix(self.to_matrix() * child.to_matrix())
    }

    /// All components are finite
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.rotation.is_finite() && self.scale.is_finite()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_identity() {
        let t = Transform::identity();
        assert_eq!(t.position, Vec3::ZERO);
        assert_eq!(t.rotation, Quat::IDENTITY);
        assert_eq!(t.scale, Vec3::ONE);
    }

    #[test]
    fn test_from_position() {
        let t = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(t.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(t.rotation, Quat::IDENTITY);
        assert_eq!(t.scale, Vec3::ONE);
    }

    #[test]
    fn test_to_matrix_translation() {
        let t = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
        let expected = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(t.to_matrix(), expected);
    }

    #[test]
    fn test_from_euler_degrees_matches_radians() {
        let a = Transform::from_euler_degrees(Vec3::ZERO, Vec3::new(-90.0, 0.0, 0.0), Vec3::ONE);
        let b = Transform::from_euler(Vec3::ZERO, Vec3::new(-FRAC_PI_2, 0.0, 0.0), Vec3::ONE);
        assert!(a.rotation.abs_diff_eq(b.rotation, 1e-6));
        assert!((a.euler_radians().x + FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_mul_transform_rotates_child_offset() {
        let parent = Transform::from_euler(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 0.0, FRAC_PI_2), Vec3::ONE);
        let child = Transform::from_position(Vec3::X);
        let world = parent.mul_transform(&child);

        // +X rotated 90 degrees about Z becomes +Y
        assert!(world.position.abs_diff_eq(Vec3::new(0.0, 2.0, 0.0), 1e-5));
        assert!(world.rotation.abs_diff_eq(parent.rotation, 1e-5));
    }

    #[test]
    fn test_from_matrix_round_trip() {
        let t = Transform::from_euler_degrees(
            Vec3::new(0.5, -1.0, 2.0),
            Vec3::new(10.0, 20.0, 30.0),
            Vec3::new(1.0, 2.0, 3.0),
        );
        let back = Transform::from_matrix(t.to_matrix());
        assert!(back.position.abs_diff_eq(t.position, 1e-5));
        assert!(back.scale.abs_diff_eq(t.scale, 1e-5));
        assert!(back.rotation.abs_diff_eq(t.rotation, 1e-5));
    }
}
