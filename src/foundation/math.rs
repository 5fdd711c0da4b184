//! Transform helpers shared by primitives, cameras and the script encoder.

pub use glam::{Mat3, Mat4, Quat, Vec3};

/// Translation matrix.
pub fn translate(offset: Vec3) -> Mat4 {
    Mat4::from_translation(offset)
}

/// Non-uniform scale matrix.
pub fn scale(factors: Vec3) -> Mat4 {
    Mat4::from_scale(factors)
}

/// Uniform scale matrix.
pub fn uniform_scale(factor: f32) -> Mat4 {
    Mat4::from_scale(Vec3::splat(factor))
}

/// Rotation about the x axis, angle in radians.
pub fn rotation_about_x(angle: f32) -> Mat4 {
    Mat4::from_rotation_x(angle)
}

/// Rotation about the y axis, angle in radians.
pub fn rotation_about_y(angle: f32) -> Mat4 {
    Mat4::from_rotation_y(angle)
}

/// Rotation about the z axis, angle in radians.
pub fn rotation_about_z(angle: f32) -> Mat4 {
    Mat4::from_rotation_z(angle)
}

/// Rotation that maps the +x axis onto `axis`. Degenerate axes yield identity.
pub fn rotation_to_align_x_to_axis(axis: Vec3) -> Mat4 {
    let dir = axis.normalize_or_zero();
    if dir == Vec3::ZERO {
        return Mat4::IDENTITY;
    }
    Mat4::from_quat(Quat::from_rotation_arc(Vec3::X, dir))
}

/// Normal matrix (inverse transpose of the upper 3x3) for `transform`.
pub fn normal_matrix(transform: Mat4) -> Mat3 {
    let linear = Mat3::from_mat4(transform);
    if linear.determinant().abs() <= f32::EPSILON {
        return linear;
    }
    linear.inverse().transpose()
}

/// Row-major flattening, the order the viewer expects for 4x4 matrices.
pub fn row_major(m: Mat4) -> [f32; 16] {
    m.transpose().to_cols_array()
}

/// Inverse of [`row_major`].
pub fn from_row_major(values: &[f32; 16]) -> Mat4 {
    Mat4::from_cols_array(values).transpose()
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
