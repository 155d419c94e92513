//! Fixed-step drivers: the shared arena loop, training episodes and the
//! two-agent match

pub mod arena;
pub mod config;
pub mod game;
pub mod training;

pub use arena::{AgentSlot, Arena, StepReport};
pub use config::SimulationConfig;
pub use game::{FireMatch, GameState, MatchSettings, Winner};
pub use training::{mean_reward, EpisodeSummary, TrainingArena, TrainingPool};
