//! Vector and angle helpers for link generation
//!
//! All helpers assume a Y-up coordinate system. Angles crossing the public API
//! are expressed in degrees, matching how the tunables are configured.

use glam::{Quat, Vec3};

/// Vectors shorter than this are treated as having no direction
pub const DIRECTION_EPSILON: f32 = 1e-6;

/// Unsigned angle between two vectors in degrees, in `[0, 180]`.
///
/// Returns 0 when either vector has no usable length.
#[inline]
pub fn angle_between_deg(a: Vec3, b: Vec3) -> f32 {
    let denom = (a.length_squared() * b.length_squared()).sqrt();
    if denom < DIRECTION_EPSILON * DIRECTION_EPSILON {
        return 0.0;
    }
    let cos = (a.dot(b) / denom).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}

/// Projects a vector onto the plane with the given normal.
///
/// The normal does not need to be unit length. A zero normal returns `v`.
#[inline]
pub fn project_on_plane(v: Vec3, normal: Vec3) -> Vec3 {
    let len_sq = normal.length_squared();
    if len_sq < DIRECTION_EPSILON * DIRECTION_EPSILON {
        return v;
    }
    v - normal * (v.dot(normal) / len_sq)
}

/// Drops the vertical component of a vector.
#[inline]
pub fn flatten(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Rotates a vector about the vertical axis by `degrees`.
#[inline]
pub fn rotate_about_up(v: Vec3, degrees: f32) -> Vec3 {
    Quat::from_rotation_y(degrees.to_radians()) * v
}

/// Checks that every component of a vector is finite
#[inline]
pub fn is_finite_vec(v: Vec3) -> bool {
    v.x.is_finite() && v.y.is_finite() && v.z.is_finite()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    #[test]
    fn test_angle_between_deg() {
        assert!((angle_between_deg(Vec3::X, Vec3::Y) - 90.0).abs() < EPS);
        assert!((angle_between_deg(Vec3::X, Vec3::X * 5.0)).abs() < EPS);
        assert!((angle_between_deg(Vec3::X, Vec3::NEG_X) - 180.0).abs() < EPS);

        let diagonal = Vec3::new(1.0, 1.0, 0.0);
        assert!((angle_between_deg(Vec3::X, diagonal) - 45.0).abs() < EPS);
    }

    #[test]
    fn test_angle_between_zero_vector() {
        assert_eq!(angle_between_deg(Vec3::ZERO, Vec3::X), 0.0);
        assert_eq!(angle_between_deg(Vec3::Y, Vec3::ZERO), 0.0);
    }

    #[test]
    fn test_project_on_plane() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        let projected = project_on_plane(v, Vec3::Y * 4.0);
        assert!((projected - Vec3::new(1.0, 0.0, 3.0)).length() < EPS);

        // Degenerate normal leaves the vector untouched
        assert_eq!(project_on_plane(v, Vec3::ZERO), v);
    }

    #[test]
    fn test_rotate_about_up() {
        let rotated = rotate_about_up(Vec3::X, 90.0);
        // Right-handed rotation about +Y takes +X to -Z
        assert!((rotated - Vec3::NEG_Z).length() < EPS);

        let unchanged = rotate_about_up(Vec3::Y, 37.0);
        assert!((unchanged - Vec3::Y).length() < EPS);
    }

    #[test]
    fn test_flatten_and_finite() {
        assert_eq!(flatten(Vec3::new(1.0, -4.0, 2.0)), Vec3::new(1.0, 0.0, 2.0));
        assert!(is_finite_vec(Vec3::ONE));
        assert!(!is_finite_vec(Vec3::new(f32::NAN, 0.0, 0.0)));
        assert!(!is_finite_vec(Vec3::new(0.0, f32::INFINITY, 0.0)));
    }
}
