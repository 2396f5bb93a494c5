/*
 * Math Module
 *
 * Small vector helpers shared by the steering and frame-update code.
 * Degenerate inputs (zero-length vectors) collapse to zero or identity
 * instead of producing NaN.
 */

use glam::{Mat3, Quat, Vec3};

pub const EPSILON: f32 = 1.0e-6;

/// Unit vector in the direction of `v`, or zero when `v` has no direction.
/// Only an exactly zero (or non-finite) length counts as directionless; tiny
/// vectors still normalize.
#[inline]
pub fn normalize_or_zero(v: Vec3) -> Vec3 {
    let length_squared = v.length_squared();
    if length_squared == 0.0 || !length_squared.is_finite() {
        return Vec3::ZERO;
    }
    v / length_squared.sqrt()
}

/// Rotation mapping local +Z onto `direction`, keeping `up` as the roll reference.
pub fn look_rotation(direction: Vec3, up: Vec3) -> Quat {
    let forward = normalize_or_zero(direction);
    if forward == Vec3::ZERO {
        return Quat::IDENTITY;
    }

    let right = up.cross(forward);
    if right.length_squared() <= EPSILON {
        // Looking straight along the up axis
        return Quat::from_rotation_arc(Vec3::Z, forward);
    }

    let right = right.normalize();
    let true_up = forward.cross(right);
    Quat::from_mat3(&Mat3::from_cols(right, true_up, forward)).normalize()
}

/// Snap every axis of `position` into `[-world_size, world_size]`.
/// Returns the clamped position and whether any axis moved.
pub fn clamp_to_world(position: Vec3, world_size: f32) -> (Vec3, bool) {
    let clamped = position.clamp(Vec3::splat(-world_size), Vec3::splat(world_size));
    (clamped, clamped != position)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_vector_normalizes_to_zero() {
        assert_eq!(normalize_or_zero(Vec3::ZERO), Vec3::ZERO);
        assert_eq!(normalize_or_zero(Vec3::splat(f32::NAN)), Vec3::ZERO);
    }

    #[test]
    fn tiny_vectors_still_normalize() {
        let n = normalize_or_zero(Vec3::new(5.0e-4, 0.0, 0.0));
        assert!(n.distance(Vec3::X) < 1.0e-5);
        let n = normalize_or_zero(Vec3::splat(1.0e-5));
        assert!((n.length() - 1.0).abs() < 1.0e-5);
    }

    #[test]
    fn normalize_has_unit_length() {
        let n = normalize_or_zero(Vec3::new(3.0, 4.0, 0.0));
        assert!((n.length() - 1.0).abs() < 1.0e-6);
        assert!((n.x - 0.6).abs() < 1.0e-6);
    }

    #[test]
    fn look_rotation_points_forward_axis_along_direction() {
        let direction = Vec3::new(1.0, 0.5, -2.0);
        let rotation = look_rotation(direction, Vec3::Y);
        let forward = rotation * Vec3::Z;
        assert!(forward.distance(direction.normalize()) < 1.0e-4);

        // Up stays in the plane spanned by world up and the direction
        let up = rotation * Vec3::Y;
        assert!(up.y > 0.0);
    }

    #[test]
    fn look_rotation_handles_vertical_and_zero_directions() {
        let rotation = look_rotation(Vec3::Y * 3.0, Vec3::Y);
        assert!((rotation * Vec3::Z).distance(Vec3::Y) < 1.0e-4);
        assert_eq!(look_rotation(Vec3::ZERO, Vec3::Y), Quat::IDENTITY);
    }

    #[test]
    fn clamp_to_world_reports_movement() {
        let (p, moved) = clamp_to_world(Vec3::new(300.0, -10.0, -260.0), 250.0);
        assert!(moved);
        assert_eq!(p, Vec3::new(250.0, -10.0, -250.0));

        let (p, moved) = clamp_to_world(Vec3::new(1.0, 2.0, 3.0), 250.0);
        assert!(!moved);
        assert_eq!(p, Vec3::new(1.0, 2.0, 3.0));
    }
}
