//! Per-step and cumulative traffic statistics

use super::breakdown::BreakdownReport;

/// Summary of the transition that produced a state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepStats {
    /// Vehicles that advanced along their road
    pub moves: usize,
    /// Vehicles that switched lanes (two-way only)
    pub lane_changes: usize,
    /// Vehicles that turned onto the crossing road (intersection only)
    pub turns: usize,
    /// Vehicles that broke down this step
    pub breakdowns: usize,
    /// Vehicles whose repair finished this step
    pub repairs: usize,
    /// Whether the traffic lights changed phase (intersection only)
    pub light_flipped: bool,
}

impl StepStats {
    pub(crate) fn with_breakdowns(mut self, report: BreakdownReport) -> Self {
        self.breakdowns = report.broken;
        self.repairs = report.repaired;
        self
    }
}

/// Running totals over a whole simulation run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationStats {
    pub steps: u64,
    pub total_moves: u64,
    pub total_lane_changes: u64,
    pub total_turns: u64,
    pub total_breakdowns: u64,
    pub total_repairs: u64,
    pub light_flips: u64,
    /// Sum over steps of the vehicle count, used to normalise flow
    vehicle_steps: u64,
}

impl SimulationStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one step into the totals; `vehicles` is the vehicle count after the step
    pub fn record(&mut self, step: &StepStats, vehicles: usize) {
        self.steps += 1;
        self.total_moves += step.moves as u64;
        self.total_lane_changes += step.lane_changes as u64;
        self.total_turns += step.turns as u64;
        self.total_breakdowns += step.breakdowns as u64;
        self.total_repairs += step.repairs as u64;
        if step.light_flipped {
            self.light_flips += 1;
        }
        self.vehicle_steps += vehicles as u64;
    }

    /// Average fraction of vehicles that advanced per step
    pub fn average_flow(&self) -> f64 {
        if self.vehicle_steps == 0 {
            0.0
        } else {
            self.total_moves as f64 / self.vehicle_steps as f64
        }
    }
}
