//! Math helpers shared by the layout crates
//!
//! Rotations are authored as Euler angles in degrees and applied in XYZ order.

pub use glam::{EulerRot, Mat4, Quat, Vec3};

/// Euler order used for every authored rotation
pub const EULER_ORDER: EulerRot = EulerRot::XYZ;

/// Vec3 of degrees to a Vec3 of radians (per component)
pub fn degrees_to_radians(degrees: Vec3) -> Vec3 {
    Vec3::new(
        degrees.x.to_radians(),
        degrees.y.to_radians(),
        degrees.z.to_radians(),
    )
}

/// Vec3 of radians to a Vec3 of degrees (per component)
pub fn radians_to_degrees(radians: Vec3) -> Vec3 {
    Vec3::new(
        radians.x.to_degrees(),
        radians.y.to_degrees(),
        radians.z.to_degrees(),
    )
}

/// Quaternion from Euler angles in radians
pub fn quat_from_euler(radians: Vec3) -> Quat {
    Quat::from_euler(EULER_ORDER, radians.x, radians.y, radians.z)
}

/// Quaternion from Euler angles in degrees
pub fn quat_from_euler_degrees(degrees: Vec3) -> Quat {
    quat_from_euler(degrees_to_radians(degrees))
}

/// Euler angles in radians of a quaternion
pub fn euler_from_quat(rotation: Quat) -> Vec3 {
    let (x, y, z) = rotation.to_euler(EULER_ORDER);
    Vec3::new(x, y, z)
}

/// Component-wise approximate equality
pub fn approx_eq(a: Vec3, b: Vec3, epsilon: f32) -> bool {
    (a - b).abs().max_element() <= epsilon
}
