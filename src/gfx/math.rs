//! # Matrix and Vector Primitives
//!
//! Pure functions producing 4×4 matrices for the scene graph and cameras.
//! Matrices are `cgmath::Matrix4<f32>` and therefore column-major: flat index
//! `i` of [`to_array`] is column `i / 4`, row `i % 4`, which is the layout the
//! shader uniforms expect.
//!
//! None of these functions mutate their inputs; callers that need a copy of a
//! cached matrix simply copy it (`Matrix4` is `Copy`).

use cgmath::{InnerSpace, Matrix4, Rad, SquareMatrix, Vector3};

/// 4×4 matrix used throughout the engine
pub type M4 = Matrix4<f32>;

/// 3-component vector used for translation, Euler rotation (radians) and scale
pub type Vec3 = Vector3<f32>;

pub fn identity() -> M4 {
    Matrix4::identity()
}

pub fn translation(t: Vec3) -> M4 {
    Matrix4::from_translation(t)
}

pub fn rotation_x(angle: f32) -> M4 {
    Matrix4::from_angle_x(Rad(angle))
}

pub fn rotation_y(angle: f32) -> M4 {
    Matrix4::from_angle_y(Rad(angle))
}

pub fn rotation_z(angle: f32) -> M4 {
    Matrix4::from_angle_z(Rad(angle))
}

/// Euler rotation composed as `Rx * Ry * Rz`
pub fn rotation(r: Vec3) -> M4 {
    rotation_x(r.x) * rotation_y(r.y) * rotation_z(r.z)
}

pub fn scale(s: Vec3) -> M4 {
    Matrix4::from_nonuniform_scale(s.x, s.y, s.z)
}

/// Local transform `T * R * S`
pub fn compose(t: Vec3, r: Vec3, s: Vec3) -> M4 {
    translation(t) * rotation(r) * scale(s)
}

pub fn multiply(a: &M4, b: &M4) -> M4 {
    a * b
}

/// Inverse of `m`, or identity when `m` is singular
pub fn inverse(m: &M4) -> M4 {
    m.invert().unwrap_or_else(|| {
        log::warn!("Attempted to invert a singular matrix, using identity");
        Matrix4::identity()
    })
}

/// Orthographic projection of a `width` × `height` box between the positive
/// `near` and `far` distances in front of the camera.
pub fn orthographic(width: f32, height: f32, near: f32, far: f32) -> M4 {
    let depth = near - far;
    #[rustfmt::skip]
    let m = Matrix4::new(
        2.0 / width, 0.0,          0.0,                  0.0,
        0.0,         2.0 / height, 0.0,                  0.0,
        0.0,         0.0,          2.0 / depth,          0.0,
        0.0,         0.0,          (near + far) / depth, 1.0,
    );
    m
}

/// Perspective projection using the `cot(fov / 2)` formulation
pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> M4 {
    let f = (std::f32::consts::FRAC_PI_2 - 0.5 * fov_y).tan();
    let range_inv = 1.0 / (near - far);
    #[rustfmt::skip]
    let m = Matrix4::new(
        f / aspect, 0.0, 0.0,                          0.0,
        0.0,        f,   0.0,                          0.0,
        0.0,        0.0, (near + far) * range_inv,     -1.0,
        0.0,        0.0, near * far * range_inv * 2.0, 0.0,
    );
    m
}

/// Oblique (cavalier/cabinet style) projection: the orthographic matrix
/// pre-multiplied by a shear of clip-space x/y along clip-space z.
pub fn oblique(width: f32, height: f32, near: f32, far: f32, angle_x: f32, angle_y: f32) -> M4 {
    let shear_x = -1.0 / angle_x.tan();
    let shear_y = -1.0 / angle_y.tan();
    #[rustfmt::skip]
    let shear = Matrix4::new(
        1.0,     0.0,     0.0, 0.0,
        0.0,     1.0,     0.0, 0.0,
        shear_x, shear_y, 1.0, 0.0,
        0.0,     0.0,     0.0, 1.0,
    );
    shear * orthographic(width, height, near, far)
}

/// World matrix of an object at `eye` facing `target`
///
/// This is the camera-to-world transform, not a view matrix; invert it to
/// obtain the view.
pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> M4 {
    let z_axis = (eye - target).normalize();
    let x_axis = up.cross(z_axis).normalize();
    let y_axis = z_axis.cross(x_axis).normalize();
    Matrix4::from_cols(
        x_axis.extend(0.0),
        y_axis.extend(0.0),
        z_axis.extend(0.0),
        eye.extend(1.0),
    )
}

/// Pixel-space projection used when no camera is active: maps `(0, 0)` to the
/// top-left corner and `(width, height)` to the bottom-right.
pub fn projection(width: f32, height: f32, depth: f32) -> M4 {
    #[rustfmt::skip]
    let m = Matrix4::new(
        2.0 / width, 0.0,           0.0,         0.0,
        0.0,         -2.0 / height, 0.0,         0.0,
        0.0,         0.0,           2.0 / depth, 0.0,
        -1.0,        1.0,           0.0,         1.0,
    );
    m
}

/// Translation column of a world matrix
pub fn position_of(m: &M4) -> Vec3 {
    m.w.truncate()
}

/// Flat column-major copy suitable for uniform upload
pub fn to_array(m: &M4) -> [f32; 16] {
    let cols: [[f32; 4]; 4] = (*m).into();
    bytemuck::cast(cols)
}

pub fn from_array(values: [f32; 16]) -> M4 {
    let cols: [[f32; 4]; 4] = bytemuck::cast(values);
    cols.into()
}

pub fn deg_to_rad(degrees: f32) -> f32 {
    degrees.to_radians()
}

pub fn rad_to_deg(radians: f32) -> f32 {
    radians.to_degrees()
}

pub fn vec3_to_array(v: Vec3) -> [f32; 3] {
    v.into()
}

#[cfg(test)]
pub(crate) fn assert_mat_close(a: &M4, b: &M4) {
    let (a, b) = (to_array(a), to_array(b));
    for i in 0..16 {
        assert!(
            (a[i] - b[i]).abs() < 1e-3,
            "matrices differ at [{}]: {} vs {}\n{:?}\n{:?}",
            i,
            a[i],
            b[i],
            a,
            b
        );
    }
}
