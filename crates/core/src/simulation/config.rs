//! Fixed-step timing and episode limits

use serde::{Deserialize, Serialize};

/// Timing shared by every arena
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Physics step length (s)
    pub fixed_dt: f32,
    /// Physics steps between two policy decisions
    pub decision_period: u32,
    /// Steps per training episode, 0 = unlimited
    pub max_steps: u32,
    /// Seed for spawn placement
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 0.02,
            decision_period: 5,
            max_steps: 5000,
            seed: 0,
        }
    }
}

impl SimulationConfig {
    /// Same timing with a different seed
    pub fn with_seed(self, seed: u64) -> Self {
        Self { seed, ..self }
    }

    pub(crate) fn is_decision_step(&self, step: u64) -> bool {
        step % u64::from(self.decision_period.max(1)) == 0
    }
}
