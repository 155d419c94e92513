//! Fixed-layout observation and continuous action buffers

use serde::{Deserialize, Serialize};

use crate::error::FirefighterError;

/// Number of scalars in every observation
pub const OBSERVATION_SIZE: usize = 10;

/// Number of continuous action values
pub const ACTION_SIZE: usize = 3;

/// One decision step's observation.
///
/// Layout, always in this order:
///
/// | index | meaning |
/// |-------|---------|
/// | 0..4  | agent local rotation (x, y, z, w), normalized |
/// | 4..7  | unit vector from tool tip to target center |
/// | 7     | dot(to-target, -target up): approach alignment |
/// | 8     | dot(tool forward, -target up): aim accuracy |
/// | 9     | tool-tip distance / [`AREA_DIAMETER`](crate::fire::AREA_DIAMETER) |
///
/// With no target every value is zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation(pub [f32; OBSERVATION_SIZE]);

impl Observation {
    /// The all-zero "no target" observation
    pub fn empty() -> Self {
        Self([0.0; OBSERVATION_SIZE])
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|v| *v == 0.0)
    }

    /// Rotation quaternion as `[x, y, z, w]`
    pub fn rotation(&self) -> [f32; 4] {
        [self.0[0], self.0[1], self.0[2], self.0[3]]
    }

    /// Unit vector from the tool tip to the target
    pub fn to_target(&self) -> [f32; 3] {
        [self.0[4], self.0[5], self.0[6]]
    }

    pub fn approach_alignment(&self) -> f32 {
        self.0[7]
    }

    pub fn aim_alignment(&self) -> f32 {
        self.0[8]
    }

    pub fn normalized_distance(&self) -> f32 {
        self.0[9]
    }
}

impl Default for Observation {
    fn default() -> Self {
        Self::empty()
    }
}

/// Continuous action for one step, each value clipped to `[-1, 1]`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// +1 = right, -1 = left
    pub lateral: f32,
    /// +1 = forward, -1 = backward
    pub forward: f32,
    /// +1 = turn right, -1 = turn left
    pub yaw: f32,
}

impl Action {
    pub fn new(lateral: f32, forward: f32, yaw: f32) -> Self {
        Self {
            lateral: clip(lateral),
            forward: clip(forward),
            yaw: clip(yaw),
        }
    }

    /// Build from a learner's raw action buffer
    ///
    /// # Errors
    /// [`FirefighterError::InvalidAction`] unless the slice holds exactly
    /// three values.
    pub fn from_slice(values: &[f32]) -> Result<Self, FirefighterError> {
        match *values {
            [lateral, forward, yaw] => Ok(Self::new(lateral, forward, yaw)),
            _ => Err(FirefighterError::InvalidAction {
                expected: ACTION_SIZE,
                got: values.len(),
            }),
        }
    }

    pub fn to_array(self) -> [f32; ACTION_SIZE] {
        [self.lateral, self.forward, self.yaw]
    }
}

fn clip(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(-1.0, 1.0)
    }
}
