//! Random vehicle breakdowns and repairs
//!
//! A broken vehicle keeps its cell and is skipped by every movement rule until its
//! repair countdown runs out. All operations here are pure: they take the previous
//! bookkeeping and return new collections.

use std::collections::{BTreeMap, BTreeSet};

use log::debug;
use rand::Rng;

use super::config::SimConfig;
use super::types::{Direction, Position};

/// Positions of currently disabled vehicles
pub type BrokenSet = BTreeSet<Position>;

/// Remaining repair countdown per disabled vehicle
pub type RepairTimers = BTreeMap<Position, u32>;

/// Count down every repair timer by one step.
///
/// Timers above one are decremented; timers at one expire, are dropped and their
/// positions are returned. The caller removes those positions from the broken set.
pub fn advance_timers(timers: &RepairTimers) -> (RepairTimers, Vec<Position>) {
    let mut updated = RepairTimers::new();
    let mut repaired = Vec::new();
    for (&pos, &remaining) in timers {
        if remaining > 1 {
            updated.insert(pos, remaining - 1);
        } else {
            repaired.push(pos);
        }
    }
    (updated, repaired)
}

/// Break each running vehicle independently with `probability`.
///
/// Vehicles already in `broken` are skipped entirely (no draw, no timer reset).
/// Newly broken vehicles get a timer of `repair_duration`.
pub fn apply_random_breakdowns<R: Rng>(
    occupied: &[Position],
    broken: &BrokenSet,
    timers: &RepairTimers,
    probability: f64,
    repair_duration: u32,
    rng: &mut R,
) -> (BrokenSet, RepairTimers) {
    let mut new_broken = broken.clone();
    let mut new_timers = timers.clone();
    for &pos in occupied {
        if broken.contains(&pos) {
            continue;
        }
        if rng.random::<f64>() < probability {
            new_broken.insert(pos);
            new_timers.insert(pos, repair_duration);
        }
    }
    (new_broken, new_timers)
}

/// True if the cell directly ahead of `pos` in `direction` holds a broken vehicle.
///
/// The neighbour wraps around the grid edges. Only the single adjacent cell is checked.
pub fn has_broken_neighbor(
    pos: Position,
    direction: Direction,
    broken: &BrokenSet,
    width: usize,
    height: usize,
) -> bool {
    broken.contains(&pos.wrapped_step(direction, width, height))
}

/// Broken set and repair timers, kept in lockstep.
///
/// A position is in `broken` exactly when it has a timer, and every timer is positive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Breakdowns {
    broken: BrokenSet,
    timers: RepairTimers,
}

/// What one round of breakdown bookkeeping did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BreakdownReport {
    pub repaired: usize,
    pub broken: usize,
}

impl Breakdowns {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn broken(&self) -> &BrokenSet {
        &self.broken
    }

    pub fn timers(&self) -> &RepairTimers {
        &self.timers
    }

    pub fn is_broken(&self, pos: Position) -> bool {
        self.broken.contains(&pos)
    }

    pub fn len(&self) -> usize {
        self.broken.len()
    }

    pub fn is_empty(&self) -> bool {
        self.broken.is_empty()
    }

    /// Disable the vehicle at `pos` for `duration` steps; already-broken vehicles are left alone
    pub fn mark_broken(&mut self, pos: Position, duration: u32) {
        if duration == 0 || self.broken.contains(&pos) {
            return;
        }
        self.broken.insert(pos);
        self.timers.insert(pos, duration);
    }

    /// Move a broken vehicle's membership and timer along with it.
    /// Does nothing if `from` is not broken.
    pub fn relocate(&mut self, from: Position, to: Position) {
        if let Some(timer) = self.timers.remove(&from) {
            self.broken.remove(&from);
            self.broken.insert(to);
            self.timers.insert(to, timer);
        }
    }

    /// Run one step of repairs followed by random breakdowns over `occupied`
    pub fn advance<R: Rng>(
        &self,
        occupied: &[Position],
        config: &SimConfig,
        rng: &mut R,
    ) -> (Breakdowns, BreakdownReport) {
        let (timers, repaired) = advance_timers(&self.timers);
        let mut broken = self.broken.clone();
        for pos in &repaired {
            broken.remove(pos);
        }
        let still_broken = broken.len();

        let (broken, timers) = apply_random_breakdowns(
            occupied,
            &broken,
            &timers,
            config.breakdown_probability,
            config.repair_duration,
            rng,
        );

        let report = BreakdownReport {
            repaired: repaired.len(),
            broken: broken.len() - still_broken,
        };
        if report.repaired > 0 || report.broken > 0 {
            debug!(
                "Breakdowns: {} repaired, {} new, {} disabled",
                report.repaired,
                report.broken,
                broken.len()
            );
        }
        (Breakdowns { broken, timers }, report)
    }
}
