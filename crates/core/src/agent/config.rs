//! Agent tuning parameters

use serde::{Deserialize, Serialize};

use super::spawn::{SpawnMode, SpawnSettings};
use crate::core_types::Vec3;
use crate::physics::BodySettings;

/// Tuning for one firefighter agent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Force applied for a full-scale move action (N)
    pub move_force: f32,
    /// Turn rate at full smoothed yaw input (degrees/s)
    pub yaw_speed: f32,
    /// Training episodes reset their own field and receive shaped rewards
    pub training_mode: bool,
    /// Tool tip position in the agent's local frame (m)
    pub tool_tip_offset: Vec3,
    /// Maximum tip-to-region distance that counts as a hit (m)
    pub tool_tip_radius: f32,
    /// Health removed from a fire per hit (one hit per physics step)
    pub extinguish_per_hit: f32,
    pub spawn_mode: SpawnMode,
    pub spawn: SpawnSettings,
    pub body: BodySettings,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            move_force: 2000.0,
            yaw_speed: 100.0,
            training_mode: false,
            tool_tip_offset: Vec3::new(0.0, 0.0, 0.7),
            tool_tip_radius: 0.35,
            extinguish_per_hit: 0.01,
            spawn_mode: SpawnMode::RandomInArea,
            spawn: SpawnSettings::default(),
            body: BodySettings::default(),
        }
    }
}

impl AgentConfig {
    /// Default tuning with training mode switched on
    pub fn training() -> Self {
        Self {
            training_mode: true,
            ..Self::default()
        }
    }
}
