//! Math utilities.

pub use glam::{Mat3, Vec3};
use std::f32::consts::PI;

/// Conversion from spherical coordinate system to cartesian coordinate system.
///
/// # Arguments
///
/// * `theta` - polar angle
/// * `phi` - azimuthal angle
pub fn sph_to_cart(theta: f32, phi: f32) -> Vec3 {
    let (sin_theta, cos_theta) = theta.sin_cos();
    let (sin_phi, cos_phi) = phi.sin_cos();
    Vec3::new(sin_theta * cos_phi, sin_theta * sin_phi, cos_theta)
}

/// Conversion from cartesian coordinate system to spherical coordinate system.
///
/// The input vector doesn't need to be normalised. Returns (theta, phi) with
/// theta in [0, π] and phi in [0, 2π).
pub fn cart_to_sph(v: Vec3) -> (f32, f32) {
    let len = v.length();
    if len == 0.0 {
        return (0.0, 0.0);
    }
    let theta = (v.z / len).clamp(-1.0, 1.0).acos();
    let mut phi = v.y.atan2(v.x);
    if phi < 0.0 {
        phi += 2.0 * PI;
    }
    (theta, phi)
}

/// Rotates a vector around the z-axis.
#[inline]
pub fn rotate_z(v: Vec3, angle: f32) -> Vec3 { Mat3::from_rotation_z(angle) * v }
