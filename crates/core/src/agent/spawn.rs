//! Safe spawn placement with bounded retries

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::core_types::{vec3, Pose, Quat, Vec3};
use crate::fire::FireField;
use crate::physics::{BodyHandle, Overlap, OverlapTarget, PhysicsWorld, SurfaceTag};

/// Spawn search parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnSettings {
    /// Candidates tried before giving up
    pub max_attempts: u32,
    /// Radius of the overlap probe around each candidate (m)
    pub probe_radius: f32,
    /// Maximum distance from the field center for random placement (m)
    pub area_radius: f32,
    /// Distance range in front of a fire for targeted placement (m)
    pub front_distance: (f32, f32),
    /// Height of the body center above the placement origin (m)
    pub height: f32,
}

impl Default for SpawnSettings {
    fn default() -> Self {
        Self {
            max_attempts: 100,
            probe_radius: 0.35,
            area_radius: 5.0,
            front_distance: (0.8, 1.3),
            height: 0.5,
        }
    }
}

/// Where to look for a spawn pose
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnMode {
    /// Uniform radius and bearing around the field center, random yaw
    #[default]
    RandomInArea,
    /// In front of a random burning fire, facing it
    InFrontOfFire,
}

/// Result of a spawn search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnOutcome {
    pub pose: Pose,
    /// False when every attempt overlapped something; `pose` is then the
    /// last candidate tried.
    pub accepted: bool,
    pub attempts: u32,
}

/// Randomized placement that avoids overlapping anything but the floor
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpawnPlacer {
    settings: SpawnSettings,
}

impl SpawnPlacer {
    pub fn new(settings: SpawnSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &SpawnSettings {
        &self.settings
    }

    /// Search for a clear pose.
    ///
    /// Overlaps with `own_body` are ignored so an agent never blocks its
    /// own respawn. Exhausting every attempt is a layout error: it is logged
    /// loudly and the last candidate is returned anyway.
    pub fn place<R: Rng>(
        &self,
        mode: SpawnMode,
        field: &FireField,
        world: &dyn PhysicsWorld,
        own_body: Option<BodyHandle>,
        rng: &mut R,
    ) -> SpawnOutcome {
        let max_attempts = self.settings.max_attempts.max(1);
        let mut pose = Pose::identity();

        for attempt in 1..=max_attempts {
            pose = self.candidate(mode, field, rng);
            let overlaps = world.overlap_sphere(pose.translation.vector, self.settings.probe_radius);
            if is_clear(&overlaps, own_body) {
                return SpawnOutcome {
                    pose,
                    accepted: true,
                    attempts: attempt,
                };
            }
        }

        error!(
            attempts = max_attempts,
            "Could not find a safe position to spawn, using last candidate"
        );
        SpawnOutcome {
            pose,
            accepted: false,
            attempts: max_attempts,
        }
    }

    fn candidate<R: Rng>(&self, mode: SpawnMode, field: &FireField, rng: &mut R) -> Pose {
        if mode == SpawnMode::InFrontOfFire {
            if let Some(pose) = self.in_front_of_fire(field, rng) {
                return pose;
            }
            debug!("No burning fire to spawn in front of, spawning in area");
        }
        self.random_in_area(field.center(), rng)
    }

    fn random_in_area<R: Rng>(&self, center: Vec3, rng: &mut R) -> Pose {
        let radius = rng.random_range(0.0..=self.settings.area_radius);
        let bearing = vec3::yaw_rotation(rng.random_range(-180.0..180.0));
        let position = center + bearing * vec3::forward() * radius + vec3::up() * self.settings.height;
        let yaw = rng.random_range(-180.0..180.0);
        Pose::from_parts(position.into(), vec3::yaw_rotation(yaw))
    }

    fn in_front_of_fire<R: Rng>(&self, field: &FireField, rng: &mut R) -> Option<Pose> {
        let live: Vec<_> = field.fires().iter().filter(|f| f.is_burning()).collect();
        if live.is_empty() {
            return None;
        }
        let fire = live[rng.random_range(0..live.len())];
        let (near, far) = self.settings.front_distance;
        let distance = rng.random_range(near..=far);

        let origin = fire.position().ok()?;
        let up = fire.up_vector().ok()?;
        let center = fire.center_position().ok()?;
        let position = origin + up * distance + vec3::up() * self.settings.height;

        let to_fire = center - position;
        let rotation = if to_fire.cross(&vec3::up()).norm() > f32::EPSILON {
            Quat::face_towards(&to_fire, &vec3::up())
        } else {
            Quat::identity()
        };
        Some(Pose::from_parts(position.into(), rotation))
    }
}

/// A candidate is clear when nothing overlaps it, or when everything that
/// overlaps it is floor.
fn is_clear(overlaps: &[Overlap], own_body: Option<BodyHandle>) -> bool {
    overlaps
        .iter()
        .filter(|o| match (o.target, own_body) {
            (OverlapTarget::Body(body), Some(own)) => body != own,
            _ => true,
        })
        .all(|o| o.tag == SurfaceTag::Floor)
}
