//! Firefighter agent: perception, action, reward and episode lifecycle
//!
//! The agent never reaches into the engine on its own. Physics is passed in
//! as a [`PhysicsWorld`](crate::physics::PhysicsWorld), contacts arrive
//! through [`CollisionEvents`], and decisions come from a
//! [`PolicyProvider`].

pub mod config;
pub mod firefighter;
pub mod observation;
pub mod policy;
pub mod spawn;
pub mod targeting;

use crate::fire::FireField;
use crate::physics::{Contact, ContactEvent, ContactPhase, PhysicsWorld};

pub use config::AgentConfig;
pub use firefighter::{
    FirefighterAgent, ALIGNMENT_BONUS, BOUNDARY_PENALTY, GRAZE_PENALTY, HIT_REWARD,
    YAW_SMOOTHING_RATE,
};
pub use observation::{Action, Observation, ACTION_SIZE, OBSERVATION_SIZE};
pub use policy::{ConstantPolicy, HeuristicPolicy, PolicyProvider, RandomPolicy};
pub use spawn::{SpawnMode, SpawnOutcome, SpawnPlacer, SpawnSettings};
pub use targeting::TargetSelector;

/// What a contact handler may touch while resolving one event
pub struct ContactContext<'a> {
    pub field: &'a mut FireField,
    pub world: &'a dyn PhysicsWorld,
}

/// Collision callbacks delivered after each physics step
pub trait CollisionEvents {
    /// The body started overlapping a trigger region
    fn on_trigger_enter(&mut self, other: &Contact, ctx: &mut ContactContext<'_>);

    /// The body is still overlapping a trigger region
    fn on_trigger_stay(&mut self, other: &Contact, ctx: &mut ContactContext<'_>);

    /// The body started touching a solid collider
    fn on_collision_enter(&mut self, other: &Contact, ctx: &mut ContactContext<'_>);

    /// Route a contact event to the matching callback
    fn dispatch(&mut self, event: &ContactEvent, ctx: &mut ContactContext<'_>) {
        match event.phase {
            ContactPhase::TriggerEnter => self.on_trigger_enter(&event.contact, ctx),
            ContactPhase::TriggerStay => self.on_trigger_stay(&event.contact, ctx),
            ContactPhase::CollisionEnter => self.on_collision_enter(&event.contact, ctx),
        }
    }
}
