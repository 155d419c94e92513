//! Vector, rotation and pose aliases for arena space.
//!
//! Arena space is Y-up: +Y points away from the floor, +Z is an entity's
//! forward direction and +X its right. A positive yaw turns forward (+Z)
//! toward right (+X).

use nalgebra::{Isometry3, UnitQuaternion, Vector3};

/// 3D vector type for positions, forces, and directions.
pub type Vec3 = Vector3<f32>;

/// Unit quaternion used for every orientation in the arena.
pub type Quat = UnitQuaternion<f32>;

/// Rigid placement (translation + rotation) of a node, collider or body.
pub type Pose = Isometry3<f32>;

/// World up axis.
#[must_use]
pub fn up() -> Vec3 {
    Vec3::y()
}

/// Local forward axis.
#[must_use]
pub fn forward() -> Vec3 {
    Vec3::z()
}

/// Rotation about the vertical axis only, in degrees.
#[must_use]
pub fn yaw_rotation(yaw_degrees: f32) -> Quat {
    Quat::from_axis_angle(&Vec3::y_axis(), yaw_degrees.to_radians())
}

/// Yaw of a rotation in degrees, measured from +Z toward +X.
///
/// Pitch and roll are discarded. A rotation whose forward axis points
/// straight up or down has no defined yaw and reports `0.0`.
#[must_use]
pub fn yaw_degrees(rotation: &Quat) -> f32 {
    let f = rotation * forward();
    if f.x.abs() < f32::EPSILON && f.z.abs() < f32::EPSILON {
        return 0.0;
    }
    f.x.atan2(f.z).to_degrees()
}

/// Moves `current` toward `target` by at most `max_delta`.
#[must_use]
pub fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    let diff = target - current;
    if diff.abs() <= max_delta {
        target
    } else {
        current + diff.signum() * max_delta
    }
}

/// Normalizes `v`, returning zero for a degenerate vector instead of NaN.
#[must_use]
pub fn normalize_or_zero(v: &Vec3) -> Vec3 {
    v.try_normalize(f32::EPSILON).unwrap_or_else(Vec3::zeros)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_positive_yaw_turns_forward_toward_right() {
        let f = yaw_rotation(90.0) * forward();
        assert_relative_eq!(f, Vec3::x(), epsilon = 1e-6);
    }

    #[test]
    fn test_yaw_degrees_round_trips_through_rotation() {
        for yaw in [-170.0_f32, -45.0, 0.0, 30.0, 179.0] {
            assert_relative_eq!(yaw_degrees(&yaw_rotation(yaw)), yaw, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_move_towards_is_rate_limited() {
        assert_eq!(move_towards(0.0, 1.0, 0.04), 0.04);
        assert_eq!(move_towards(0.0, -1.0, 0.04), -0.04);
        assert_eq!(move_towards(0.98, 1.0, 0.04), 1.0);
    }

    #[test]
    fn test_normalize_or_zero_handles_zero_vector() {
        assert_eq!(normalize_or_zero(&Vec3::zeros()), Vec3::zeros());
        assert_relative_eq!(normalize_or_zero(&Vec3::new(0.0, 0.0, 2.0)), forward());
    }
}
