//! Collider shapes and closest-point queries

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::core_types::{Pose, Vec3};

/// Convex collider shape, expressed in the collider's local frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    Sphere { radius: f32 },
    Cuboid { half_extents: Vec3 },
}

impl Shape {
    /// Closest point on the shape placed at `pose` to `point`.
    ///
    /// A point inside the shape is its own closest point, so a probe that
    /// sits inside a region reports zero distance.
    pub fn closest_point(&self, pose: &Pose, point: Vec3) -> Vec3 {
        match *self {
            Shape::Sphere { radius } => {
                let center = pose.translation.vector;
                let offset = point - center;
                let distance = offset.norm();
                if distance <= radius {
                    point
                } else {
                    center + offset * (radius / distance)
                }
            }
            Shape::Cuboid { half_extents } => {
                let local = pose.inverse_transform_point(&Point3::from(point));
                let clamped = Point3::new(
                    local.x.clamp(-half_extents.x, half_extents.x),
                    local.y.clamp(-half_extents.y, half_extents.y),
                    local.z.clamp(-half_extents.z, half_extents.z),
                );
                if clamped == local {
                    point
                } else {
                    pose.transform_point(&clamped).coords
                }
            }
        }
    }

    /// Distance from `point` to the shape; zero when inside.
    pub fn distance(&self, pose: &Pose, point: Vec3) -> f32 {
        (self.closest_point(pose, point) - point).norm()
    }

    /// Whether a sphere intersects the shape.
    pub fn intersects_sphere(&self, pose: &Pose, center: Vec3, radius: f32) -> bool {
        self.distance(pose, center) <= radius
    }
}
