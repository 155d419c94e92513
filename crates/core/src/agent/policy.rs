//! Decision providers: turn observations into actions

use nalgebra::{Quaternion, UnitQuaternion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::observation::{Action, Observation};
use crate::core_types::vec3;
use crate::core_types::Vec3;
use crate::fire::AREA_DIAMETER;

/// Source of decisions for one agent.
///
/// A policy sees the latest observation, then is asked for an action.
/// Learned policies plug in here; the crate ships simple scripted ones.
pub trait PolicyProvider: Send {
    fn observe(&mut self, observation: &Observation);

    fn act(&mut self) -> Action;
}

/// Scripted policy that walks to the target and turns to face it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeuristicPolicy {
    /// Heading error (degrees) that maps to a full-scale turn
    pub turn_full_scale: f32,
    /// Distance (m) below which movement input ramps down
    pub slow_radius: f32,
    last: Observation,
}

impl Default for HeuristicPolicy {
    fn default() -> Self {
        Self {
            turn_full_scale: 30.0,
            slow_radius: 1.0,
            last: Observation::empty(),
        }
    }
}

impl HeuristicPolicy {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PolicyProvider for HeuristicPolicy {
    fn observe(&mut self, observation: &Observation) {
        self.last = *observation;
    }

    fn act(&mut self) -> Action {
        if self.last.is_empty() {
            return Action::default();
        }

        let [x, y, z, w] = self.last.rotation();
        let rotation = UnitQuaternion::from_quaternion(Quaternion::new(w, x, y, z));
        let facing = rotation * vec3::forward();

        let [tx, _, tz] = self.last.to_target();
        let heading = Vec3::new(tx, 0.0, tz);
        if heading.norm() <= f32::EPSILON {
            return Action::default();
        }

        let error = wrap_degrees(tz.atan2(tx).to_degrees() - facing.z.atan2(facing.x).to_degrees());
        // atan2(z, x) grows counter-clockwise seen from above; yaw grows clockwise
        let yaw = -error / self.turn_full_scale;

        let distance = self.last.normalized_distance() * AREA_DIAMETER;
        let speed = (distance / self.slow_radius).min(1.0);
        let movement = heading.normalize() * speed;

        Action::new(movement.x, movement.z, yaw)
    }
}

fn wrap_degrees(angle: f32) -> f32 {
    let wrapped = (angle + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped <= -180.0 {
        wrapped + 360.0
    } else {
        wrapped
    }
}

/// Uniformly random actions, seeded for reproducibility
#[derive(Debug, Clone)]
pub struct RandomPolicy {
    rng: StdRng,
}

impl RandomPolicy {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl PolicyProvider for RandomPolicy {
    fn observe(&mut self, _observation: &Observation) {}

    fn act(&mut self) -> Action {
        Action::new(
            self.rng.random_range(-1.0..=1.0),
            self.rng.random_range(-1.0..=1.0),
            self.rng.random_range(-1.0..=1.0),
        )
    }
}

/// Always returns the same action
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConstantPolicy(pub Action);

impl PolicyProvider for ConstantPolicy {
    fn observe(&mut self, _observation: &Observation) {}

    fn act(&mut self) -> Action {
        self.0
    }
}
