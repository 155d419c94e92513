//! A single extinguishable fire
//!
//! A fire unit owns its health and two collider regions: the interactive
//! region an agent must touch with its tool, and the solid region that
//! blocks movement. Both regions are enabled exactly while the fire burns.
//!
//! ```text
//! Burning --extinguish(health -> 0)--> Extinguished
//! Extinguished --reset--> Burning
//! ```

use serde::{Deserialize, Serialize};

use crate::core_types::{vec3, Pose, Vec3};
use crate::error::FirefighterError;
use crate::physics::{ColliderId, Shape, SurfaceTag};

/// Health a fire is restored to by [`FireUnit::reset`]
pub const FULL_HEALTH: f32 = 1.0;

/// Remaining health below this is treated as fully extinguished.
///
/// Repeated `0.01` hits accumulate f32 rounding error; without the snap a
/// fire could survive its 100th hit with a residue around `1e-7`.
pub const EXTINGUISHED_EPSILON: f32 = 1e-5;

/// Burning state of a fire unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FireState {
    Burning,
    Extinguished,
}

/// Particle effect the renderer should show for a fire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FireVisual {
    Flames,
    Smoke,
}

/// One of the two collider regions of a fire unit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FireRegion {
    pub id: ColliderId,
    pub shape: Shape,
    /// Placement relative to the fire unit
    pub local_pose: Pose,
    pub tag: SurfaceTag,
    pub active: bool,
}

impl FireRegion {
    /// Interactive (trigger) region
    pub fn interactive(id: ColliderId, shape: Shape, local_pose: Pose) -> Self {
        Self {
            id,
            shape,
            local_pose,
            tag: SurfaceTag::FireRegion,
            active: true,
        }
    }

    /// Solid (blocking) region
    pub fn solid(id: ColliderId, shape: Shape, local_pose: Pose) -> Self {
        Self {
            id,
            shape,
            local_pose,
            tag: SurfaceTag::FireSolid,
            active: true,
        }
    }
}

/// An extinguishable fire target
#[derive(Debug, Clone)]
pub struct FireUnit {
    name: String,
    health: f32,
    placement: Option<Pose>,
    interactive: FireRegion,
    solid: FireRegion,
    visual: FireVisual,
}

impl FireUnit {
    /// Create a burning fire at full health with no placement yet
    pub fn new(name: impl Into<String>, interactive: FireRegion, solid: FireRegion) -> Self {
        let mut fire = Self {
            name: name.into(),
            health: FULL_HEALTH,
            placement: None,
            interactive,
            solid,
            visual: FireVisual::Flames,
        };
        fire.set_regions_active(true);
        fire
    }

    /// Attach the fire to a world placement
    pub fn attach(&mut self, placement: Pose) {
        self.placement = Some(placement);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Remaining health in `[0, 1]`
    pub fn health(&self) -> f32 {
        self.health
    }

    pub fn is_burning(&self) -> bool {
        self.health > 0.0
    }

    pub fn state(&self) -> FireState {
        if self.is_burning() {
            FireState::Burning
        } else {
            FireState::Extinguished
        }
    }

    pub fn visual(&self) -> FireVisual {
        self.visual
    }

    pub fn interactive_region(&self) -> &FireRegion {
        &self.interactive
    }

    pub fn solid_region(&self) -> &FireRegion {
        &self.solid
    }

    /// Removes up to `amount` health and returns how much was actually removed.
    ///
    /// The amount is clamped to `[0, health]`: negative, NaN or oversized
    /// requests are bounded silently, so the result never exceeds the health
    /// held before the call. Reaching zero deactivates both regions and
    /// switches the visual to smoke; only [`FireUnit::reset`] undoes that.
    pub fn extinguish(&mut self, amount: f32) -> f32 {
        if !self.is_burning() {
            return 0.0;
        }
        let before = self.health;
        let mut removed = amount.max(0.0).min(before);
        self.health = before - removed;

        if self.health <= EXTINGUISHED_EPSILON {
            removed = before;
            self.health = 0.0;
            self.set_regions_active(false);
            self.visual = FireVisual::Smoke;
        }
        removed
    }

    /// Restore full health, re-enable both regions and relight the flames
    pub fn reset(&mut self) {
        self.health = FULL_HEALTH;
        self.set_regions_active(true);
        self.visual = FireVisual::Flames;
    }

    /// World position of the fire's placement
    ///
    /// # Errors
    /// [`FirefighterError::Unplaced`] if the fire was never attached.
    pub fn position(&self) -> Result<Vec3, FirefighterError> {
        self.placement
            .map(|p| p.translation.vector)
            .ok_or(FirefighterError::Unplaced)
    }

    /// Direction the fire faces: the forward axis of its interactive region
    ///
    /// # Errors
    /// [`FirefighterError::Unplaced`] if the fire was never attached.
    pub fn up_vector(&self) -> Result<Vec3, FirefighterError> {
        let pose = self
            .region_pose(&self.interactive)
            .ok_or(FirefighterError::Unplaced)?;
        Ok(pose.rotation * vec3::forward())
    }

    /// World center of the interactive region
    ///
    /// # Errors
    /// [`FirefighterError::Unplaced`] if the fire was never attached.
    pub fn center_position(&self) -> Result<Vec3, FirefighterError> {
        self.region_pose(&self.interactive)
            .map(|p| p.translation.vector)
            .ok_or(FirefighterError::Unplaced)
    }

    /// World pose of one of this fire's regions
    pub fn region_pose(&self, region: &FireRegion) -> Option<Pose> {
        self.placement.map(|p| p * region.local_pose)
    }

    fn set_regions_active(&mut self, active: bool) {
        self.interactive.active = active;
        self.solid.active = active;
    }
}
