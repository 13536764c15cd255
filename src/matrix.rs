//! Fixed-function style matrix helpers.
//!
//! These reproduce the `gluPerspective` / `glRotatef` / `glTranslatef` stack on
//! top of [`glam::Mat4`] (column-major). Rotation and translation compose on the
//! right of the current matrix, exactly like the legacy matrix stack, so a
//! sequence of calls reads in the same order the old immediate-mode code did:
//!
//! ```
//! use sector_walk::matrix;
//! use glam::{Mat4, Vec3};
//!
//! let mut model_view = Mat4::IDENTITY;
//! matrix::rotate(&mut model_view, 10.0, Vec3::X);
//! matrix::rotate(&mut model_view, 350.0, Vec3::Y);
//! matrix::translate(&mut model_view, 0.0, -0.25, 0.0);
//!
//! let view_proj = matrix::multiply(matrix::perspective(45.0, 4.0 / 3.0, 0.1, 100.0), model_view);
//! assert!(view_proj.is_finite());
//! ```
//!
//! The projection keeps the OpenGL clip convention (`w' = -z_view`, NDC depth in
//! `[-1, 1]`). The world shader remaps depth to the `[0, 1]` range wgpu expects.

use glam::{Mat3, Mat4, Vec3, Vec4};

/// Builds a symmetric perspective projection, `gluPerspective` style.
///
/// `aspect` must be positive and `far > near > 0`.
pub fn perspective(fovy_degrees: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    debug_assert!(aspect > 0.0, "aspect ratio must be positive");
    debug_assert!(far > near && near > 0.0, "expected far > near > 0");

    let h = 1.0 / (fovy_degrees.to_radians() * 0.5).tan();
    let w = h / aspect;
    let inv_clip_range = 1.0 / (far - near);
    let zh = -(far + near) * inv_clip_range;
    let zl = -(2.0 * far * near) * inv_clip_range;

    Mat4::from_cols(
        Vec4::new(w, 0.0, 0.0, 0.0),
        Vec4::new(0.0, h, 0.0, 0.0),
        Vec4::new(0.0, 0.0, zh, -1.0),
        Vec4::new(0.0, 0.0, zl, 0.0),
    )
}

/// Composes a rotation of `angle_degrees` about `axis` onto `m` (`m = m * R`).
///
/// The axis is normalized unless it is already unit length within
/// `f32::EPSILON`. A zero-length axis has no direction and must not be passed.
pub fn rotate(m: &mut Mat4, angle_degrees: f32, axis: Vec3) {
    let magnitude = axis.length();
    let axis = if (magnitude - 1.0).abs() > f32::EPSILON {
        axis / magnitude
    } else {
        axis
    };

    let r = rodrigues(angle_degrees.to_radians(), axis);
    let (bx, by, bz) = (m.x_axis, m.y_axis, m.z_axis);
    let combine = |c: Vec3| bx * c.x + by * c.y + bz * c.z;

    m.x_axis = combine(r.x_axis);
    m.y_axis = combine(r.y_axis);
    m.z_axis = combine(r.z_axis);
}

/// Composes a translation onto `m` (`m = m * T`), expressed in `m`'s own frame.
pub fn translate(m: &mut Mat4, x: f32, y: f32, z: f32) {
    m.w_axis += m.x_axis * x + m.y_axis * y + m.z_axis * z;
}

/// Standard matrix product, `lhs * rhs`.
pub fn multiply(lhs: Mat4, rhs: Mat4) -> Mat4 {
    lhs * rhs
}

/// Rotation about a unit axis via Rodrigues' formula.
fn rodrigues(theta: f32, axis: Vec3) -> Mat3 {
    let (s, c) = theta.sin_cos();
    let rc = 1.0 - c;
    let Vec3 { x, y, z } = axis;
    let (rcx, rcy, rcz) = (x * rc, y * rc, z * rc);
    let (sx, sy, sz) = (x * s, y * s, z * s);

    Mat3::from_cols(
        Vec3::new(rcx * x + c, rcy * x + sz, rcz * x - sy),
        Vec3::new(rcx * y - sz, rcy * y + c, rcz * y + sx),
        Vec3::new(rcx * z + sy, rcy * z - sx, rcz * z + c),
    )
}
