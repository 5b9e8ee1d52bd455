//! Tunable constants of the traffic model

use super::error::{SimError, SimResult};

/// Chance per step that a running vehicle breaks down
pub const DEFAULT_BREAKDOWN_PROBABILITY: f64 = 0.01;

/// Steps a broken vehicle waits before it is repaired
pub const DEFAULT_REPAIR_DURATION: u32 = 20;

/// Chance per step that a two-way vehicle tries to switch lanes
pub const DEFAULT_LANE_CHANGE_PROBABILITY: f64 = 0.1;

/// Chance per step that a vehicle near the crossing tries to turn
pub const DEFAULT_TURN_PROBABILITY: f64 = 0.1;

/// Steps between traffic light phase flips
pub const DEFAULT_LIGHT_CYCLE: u32 = 20;

/// Parameters a simulation is created with.
///
/// A state keeps the config it was created with, so every later step uses the same values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimConfig {
    pub breakdown_probability: f64,
    pub repair_duration: u32,
    pub lane_change_probability: f64,
    pub turn_probability: f64,
    pub light_cycle: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            breakdown_probability: DEFAULT_BREAKDOWN_PROBABILITY,
            repair_duration: DEFAULT_REPAIR_DURATION,
            lane_change_probability: DEFAULT_LANE_CHANGE_PROBABILITY,
            turn_probability: DEFAULT_TURN_PROBABILITY,
            light_cycle: DEFAULT_LIGHT_CYCLE,
        }
    }
}

impl SimConfig {
    /// A config with breakdowns, lane changes and turns switched off
    pub fn deterministic() -> Self {
        Self {
            breakdown_probability: 0.0,
            lane_change_probability: 0.0,
            turn_probability: 0.0,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> SimResult<()> {
        check_probability("breakdown_probability", self.breakdown_probability)?;
        check_probability("lane_change_probability", self.lane_change_probability)?;
        check_probability("turn_probability", self.turn_probability)?;
        if self.repair_duration == 0 {
            return Err(SimError::InvalidDuration { name: "repair_duration" });
        }
        if self.light_cycle == 0 {
            return Err(SimError::InvalidDuration { name: "light_cycle" });
        }
        Ok(())
    }
}

fn check_probability(name: &'static str, value: f64) -> SimResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SimError::InvalidProbability { name, value })
    }
}

/// Validate a seeding density; NaN is rejected along with anything outside [0, 1]
pub fn check_density(density: f64) -> SimResult<()> {
    if (0.0..=1.0).contains(&density) {
        Ok(())
    } else {
        Err(SimError::InvalidDensity(density))
    }
}
