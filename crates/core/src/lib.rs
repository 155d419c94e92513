//! Firefighter Core Library
//!
//! Simulation core for a two-agent firefighting environment. Agents move
//! around a walled arena and put out a ring of fires with a hand-held tool.
//! The same core drives reinforcement-learning episodes and a timed
//! player-versus-opponent match.
//!
//! ## Layout
//!
//! - [`fire`]: fire units and the field that owns them
//! - [`agent`]: targeting, spawning, observations, actions and rewards
//! - [`physics`]: the physics seam and a deterministic reference world
//! - [`scene`]: serde-loadable arena layouts
//! - [`simulation`]: fixed-step arena loop, training pool and match flow

// Core types and utilities
pub mod core_types;
pub mod error;

pub mod agent;
pub mod fire;
pub mod physics;
pub mod scene;
pub mod simulation;

// Re-export core types
pub use core_types::{Pose, Quat, Vec3};
pub use error::FirefighterError;

pub use agent::{
    Action, AgentConfig, CollisionEvents, ContactContext, FirefighterAgent, Observation,
    PolicyProvider, SpawnMode, SpawnPlacer, TargetSelector,
};
pub use fire::{FireField, FireIndex, FireUnit};
pub use physics::{ArenaWorld, PhysicsWorld};
pub use scene::{standard_arena, Scene, SceneNode};
pub use simulation::{Arena, FireMatch, SimulationConfig, TrainingArena, TrainingPool};
