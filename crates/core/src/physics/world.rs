//! Deterministic reference physics world for headless arenas
//!
//! Bodies are spheres that move in the horizontal plane. Each step:
//! 1. Integrate accumulated forces (semi-implicit Euler, linear drag)
//! 2. Push bodies out of enabled solid colliders (floors are skipped)
//! 3. Report trigger enter/stay and solid collision-enter contacts
//!
//! Bodies never spin on their own: orientation changes only through
//! `set_body_pose`, so there is no angular velocity to integrate. Sleeping
//! bodies keep their pose and report no contacts.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use super::{
    BodyHandle, ColliderId, Contact, ContactEvent, ContactPhase, Overlap, OverlapTarget,
    PhysicsWorld, Shape, SurfaceTag,
};
use crate::core_types::{Pose, Vec3};
use crate::fire::FireField;

/// Whether a collider blocks bodies or only reports overlaps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColliderKind {
    Trigger,
    Solid,
}

/// A static collider in world space
#[derive(Debug, Clone, PartialEq)]
pub struct StaticCollider {
    pub id: ColliderId,
    pub shape: Shape,
    pub pose: Pose,
    pub tag: SurfaceTag,
    pub kind: ColliderKind,
    pub enabled: bool,
}

/// Physical properties of a dynamic body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodySettings {
    /// Solid radius used against walls, props and fire bodies (m)
    pub radius: f32,
    /// Trigger radius, covering the body plus its tool (m)
    pub reach: f32,
    /// Mass (kg)
    pub mass: f32,
    /// Linear drag coefficient (1/s)
    pub linear_drag: f32,
}

impl Default for BodySettings {
    fn default() -> Self {
        Self {
            radius: 0.4,
            reach: 0.8,
            mass: 40.0,
            linear_drag: 10.0,
        }
    }
}

#[derive(Debug, Clone)]
struct Body {
    pose: Pose,
    velocity: Vec3,
    force: Vec3,
    settings: BodySettings,
    asleep: bool,
    touching: FxHashSet<ColliderId>,
    inside: FxHashSet<ColliderId>,
}

/// Reference [`PhysicsWorld`] implementation
#[derive(Debug, Clone, Default)]
pub struct ArenaWorld {
    colliders: Vec<StaticCollider>,
    collider_index: FxHashMap<ColliderId, usize>,
    bodies: Vec<Body>,
}

impl ArenaWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a static collider. A collider with an id that is already
    /// present replaces the previous one.
    pub fn add_collider(&mut self, collider: StaticCollider) {
        if let Some(&index) = self.collider_index.get(&collider.id) {
            self.colliders[index] = collider;
        } else {
            self.collider_index.insert(collider.id, self.colliders.len());
            self.colliders.push(collider);
        }
    }

    /// Registers the interactive (trigger) and solid regions of every fire unit.
    pub fn add_fire_regions(&mut self, field: &FireField) {
        for fire in field.fires() {
            for (region, kind) in [
                (fire.interactive_region(), ColliderKind::Trigger),
                (fire.solid_region(), ColliderKind::Solid),
            ] {
                if let Some(pose) = fire.region_pose(region) {
                    self.add_collider(StaticCollider {
                        id: region.id,
                        shape: region.shape,
                        pose,
                        tag: region.tag,
                        kind,
                        enabled: region.active,
                    });
                }
            }
        }
    }

    /// Mirrors each fire unit's region activity onto the world colliders.
    pub fn sync_fire_regions(&mut self, field: &FireField) {
        for fire in field.fires() {
            for region in [fire.interactive_region(), fire.solid_region()] {
                self.set_collider_enabled(region.id, region.active);
            }
        }
    }

    pub fn set_collider_enabled(&mut self, id: ColliderId, enabled: bool) {
        if let Some(&index) = self.collider_index.get(&id) {
            self.colliders[index].enabled = enabled;
        }
    }

    pub fn collider(&self, id: ColliderId) -> Option<&StaticCollider> {
        self.collider_index.get(&id).map(|&i| &self.colliders[i])
    }

    pub fn colliders(&self) -> &[StaticCollider] {
        &self.colliders
    }

    /// Adds a dynamic body at `pose` and returns its handle.
    pub fn spawn_body(&mut self, pose: Pose, settings: BodySettings) -> BodyHandle {
        let handle = BodyHandle(self.bodies.len() as u32);
        self.bodies.push(Body {
            pose,
            velocity: Vec3::zeros(),
            force: Vec3::zeros(),
            settings,
            asleep: false,
            touching: FxHashSet::default(),
            inside: FxHashSet::default(),
        });
        handle
    }

    pub fn body_velocity(&self, body: BodyHandle) -> Vec3 {
        self.bodies[body.0 as usize].velocity
    }

    pub fn is_asleep(&self, body: BodyHandle) -> bool {
        self.bodies[body.0 as usize].asleep
    }

    /// Advances every awake body by `dt` seconds and returns the contacts
    /// observed at the end of the step, ordered by body then collider.
    pub fn step(&mut self, dt: f32) -> Vec<ContactEvent> {
        let mut events = Vec::new();
        for (index, body) in self.bodies.iter_mut().enumerate() {
            let handle = BodyHandle(index as u32);
            if body.asleep {
                body.force = Vec3::zeros();
                continue;
            }
            integrate(body, dt);
            resolve_solids(body, &self.colliders);
            collect_contacts(handle, body, &self.colliders, &mut events);
        }
        events
    }
}

fn integrate(body: &mut Body, dt: f32) {
    let mut planar_force = body.force;
    planar_force.y = 0.0;
    body.velocity += planar_force / body.settings.mass * dt;
    body.velocity /= 1.0 + body.settings.linear_drag * dt;
    body.velocity.y = 0.0;
    body.pose.translation.vector += body.velocity * dt;
    body.force = Vec3::zeros();
}

fn resolve_solids(body: &mut Body, colliders: &[StaticCollider]) {
    let radius = body.settings.radius;
    for collider in colliders {
        if !collider.enabled || collider.kind != ColliderKind::Solid {
            continue;
        }
        if collider.tag == SurfaceTag::Floor {
            continue;
        }
        let center = body.pose.translation.vector;
        let closest = collider.shape.closest_point(&collider.pose, center);
        let mut normal = center - closest;
        normal.y = 0.0;
        let distance = normal.norm();
        if distance >= radius || distance <= f32::EPSILON {
            continue;
        }
        let normal = normal / distance;
        body.pose.translation.vector += normal * (radius - distance);
        let inward = body.velocity.dot(&normal);
        if inward < 0.0 {
            body.velocity -= normal * inward;
        }
    }
}

fn collect_contacts(
    handle: BodyHandle,
    body: &mut Body,
    colliders: &[StaticCollider],
    events: &mut Vec<ContactEvent>,
) {
    let center = body.pose.translation.vector;
    let mut touching = FxHashSet::default();
    let mut inside = FxHashSet::default();

    for collider in colliders {
        if !collider.enabled {
            continue;
        }
        let contact = Contact {
            collider: collider.id,
            tag: collider.tag,
        };
        match collider.kind {
            ColliderKind::Trigger => {
                if !collider
                    .shape
                    .intersects_sphere(&collider.pose, center, body.settings.reach)
                {
                    continue;
                }
                let phase = if body.inside.contains(&collider.id) {
                    ContactPhase::TriggerStay
                } else {
                    ContactPhase::TriggerEnter
                };
                inside.insert(collider.id);
                events.push(ContactEvent {
                    body: handle,
                    contact,
                    phase,
                });
            }
            ColliderKind::Solid => {
                if collider.tag == SurfaceTag::Floor {
                    continue;
                }
                // Small skin so a body resting against a wall stays in contact
                let skin = 1e-3;
                if !collider.shape.intersects_sphere(
                    &collider.pose,
                    center,
                    body.settings.radius + skin,
                ) {
                    continue;
                }
                if !body.touching.contains(&collider.id) {
                    events.push(ContactEvent {
                        body: handle,
                        contact,
                        phase: ContactPhase::CollisionEnter,
                    });
                }
                touching.insert(collider.id);
            }
        }
    }

    body.touching = touching;
    body.inside = inside;
}

impl PhysicsWorld for ArenaWorld {
    fn overlap_sphere(&self, center: Vec3, radius: f32) -> Vec<Overlap> {
        let mut overlaps: Vec<Overlap> = self
            .colliders
            .iter()
            .filter(|c| c.enabled && c.shape.intersects_sphere(&c.pose, center, radius))
            .map(|c| Overlap {
                target: OverlapTarget::Collider(c.id),
                tag: c.tag,
            })
            .collect();

        for (index, body) in self.bodies.iter().enumerate() {
            let offset = body.pose.translation.vector - center;
            if offset.norm() <= radius + body.settings.radius {
                overlaps.push(Overlap {
                    target: OverlapTarget::Body(BodyHandle(index as u32)),
                    tag: SurfaceTag::Agent,
                });
            }
        }
        overlaps
    }

    fn closest_point(&self, collider: ColliderId, point: Vec3) -> Option<Vec3> {
        self.collider(collider)
            .filter(|c| c.enabled)
            .map(|c| c.shape.closest_point(&c.pose, point))
    }

    fn body_pose(&self, body: BodyHandle) -> Pose {
        self.bodies[body.0 as usize].pose
    }

    fn set_body_pose(&mut self, body: BodyHandle, pose: Pose) {
        self.bodies[body.0 as usize].pose = pose;
    }

    fn add_force(&mut self, body: BodyHandle, force: Vec3) {
        let body = &mut self.bodies[body.0 as usize];
        if !body.asleep {
            body.force += force;
        }
    }

    fn reset_velocity(&mut self, body: BodyHandle) {
        let body = &mut self.bodies[body.0 as usize];
        body.velocity = Vec3::zeros();
    }

    fn sleep(&mut self, body: BodyHandle) {
        let body = &mut self.bodies[body.0 as usize];
        body.asleep = true;
        body.velocity = Vec3::zeros();
        body.force = Vec3::zeros();
    }

    fn wake_up(&mut self, body: BodyHandle) {
        self.bodies[body.0 as usize].asleep = false;
    }
}
