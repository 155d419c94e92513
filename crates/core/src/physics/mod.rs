//! Physics and collision interfaces consumed by the fire and agent models
//!
//! The core never integrates motion itself. It talks to a [`PhysicsWorld`]
//! for overlap probes, closest-point queries, force application and body
//! sleep control, and receives [`ContactEvent`]s after each physics step.
//! [`ArenaWorld`] is the deterministic reference implementation used by the
//! simulation drivers and the tests.

pub mod shape;
pub mod world;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core_types::{Pose, Vec3};

pub use shape::Shape;
pub use world::{ArenaWorld, BodySettings, ColliderKind, StaticCollider};

/// Identifier of a static collider (scene collider or fire region)
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ColliderId(pub u32);

impl fmt::Display for ColliderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle to a dynamic rigid body owned by the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(pub u32);

/// Semantic tag carried by scene nodes and colliders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceTag {
    #[default]
    Untagged,
    /// Placement node that bears a fire unit
    Fire,
    /// Interactive (trigger) region of a fire unit
    FireRegion,
    /// Solid body of a fire unit
    FireSolid,
    /// Walkable ground; overlapping it never blocks a spawn
    Floor,
    /// Arena boundary wall
    Boundary,
    /// Agent body
    Agent,
    /// Any other solid prop
    Obstacle,
}

/// Result of an overlap probe
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overlap {
    pub target: OverlapTarget,
    pub tag: SurfaceTag,
}

/// What an overlap probe touched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlapTarget {
    Collider(ColliderId),
    Body(BodyHandle),
}

/// The other party of a collision event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub collider: ColliderId,
    pub tag: SurfaceTag,
}

/// Kind of contact reported by a physics step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactPhase {
    /// Body started overlapping a trigger region
    TriggerEnter,
    /// Body still overlaps a trigger region
    TriggerStay,
    /// Body started touching a solid collider
    CollisionEnter,
}

/// A contact reported for one body during one physics step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactEvent {
    pub body: BodyHandle,
    pub contact: Contact,
    pub phase: ContactPhase,
}

/// Physics capabilities the core needs from its host
pub trait PhysicsWorld {
    /// Every enabled collider or body overlapping the sphere.
    fn overlap_sphere(&self, center: Vec3, radius: f32) -> Vec<Overlap>;

    /// Closest point on an enabled collider to `point`; `point` itself if inside.
    fn closest_point(&self, collider: ColliderId, point: Vec3) -> Option<Vec3>;

    fn body_pose(&self, body: BodyHandle) -> Pose;

    fn set_body_pose(&mut self, body: BodyHandle, pose: Pose);

    /// Accumulates a force applied over the next physics step.
    fn add_force(&mut self, body: BodyHandle, force: Vec3);

    /// Zeroes linear and angular velocity.
    fn reset_velocity(&mut self, body: BodyHandle);

    /// Puts the body to rest; it stops integrating until woken.
    fn sleep(&mut self, body: BodyHandle);

    fn wake_up(&mut self, body: BodyHandle);
}
