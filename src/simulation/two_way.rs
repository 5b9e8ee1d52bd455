//! Two opposing lanes with random lane changes
//!
//! Lanes sit one row above and one row below the vertical centre. The upper lane
//! travels right, the lower lane travels left, and the assignment never changes.

use log::trace;
use rand::Rng;

use super::breakdown::{has_broken_neighbor, BrokenSet, Breakdowns};
use super::config::SimConfig;
use super::error::{SimError, SimResult};
use super::grid::Grid;
use super::stats::StepStats;
use super::types::{is_occupied, Cell, Direction, Position, EMPTY, OFF_ROAD, VEHICLE_CLASSES};

/// A lane row and its fixed heading (+1 rightward, -1 leftward)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lane {
    pub row: usize,
    pub heading: i8,
}

impl Lane {
    pub fn direction(&self) -> Direction {
        Direction::from_heading(self.heading)
    }
}

/// Layout of the two-way road
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TwoWay {
    lanes: [Lane; 2],
}

impl TwoWay {
    /// Lay out both lanes and seed them with vehicles of random class
    pub fn create<R: Rng>(
        width: usize,
        height: usize,
        density: f64,
        rng: &mut R,
    ) -> SimResult<(TwoWay, Grid)> {
        if height < 3 {
            return Err(SimError::InvalidDimensions { width, height });
        }
        let mut grid = Grid::create(width, height, OFF_ROAD)?;
        let center = height / 2;
        let lanes = [
            Lane { row: center - 1, heading: 1 },
            Lane { row: center + 1, heading: -1 },
        ];
        for lane in &lanes {
            grid.replace_row(lane.row, vec![EMPTY; width]);
        }
        let rows = lanes.map(|lane| lane.row);
        grid.seed_rows(&rows, density, rng, |rng| rng.random_range(1..=VEHICLE_CLASSES));
        Ok((TwoWay { lanes }, grid))
    }

    pub fn lanes(&self) -> &[Lane; 2] {
        &self.lanes
    }

    /// Heading of the lane on `row`, if `row` is a lane
    pub fn heading_of(&self, row: usize) -> Option<i8> {
        self.lanes.iter().find(|lane| lane.row == row).map(|lane| lane.heading)
    }

    /// Move both lanes, run breakdown bookkeeping, then attempt lane changes
    pub fn step<R: Rng>(
        &self,
        grid: &Grid,
        breakdowns: &Breakdowns,
        config: &SimConfig,
        rng: &mut R,
    ) -> (Grid, Breakdowns, StepStats) {
        let start_broken = breakdowns.broken();
        let mut next = grid.clone();
        let mut moves = 0;
        for lane in &self.lanes {
            let row = grid.row(lane.row).unwrap_or_default();
            let (row, moved) = advance_lane(row, *lane, start_broken);
            next.replace_row(lane.row, row);
            moves += moved;
        }

        let occupied = next.occupied_positions();
        let (mut updated, report) = breakdowns.advance(&occupied, config, rng);

        let lane_changes =
            self.change_lanes(&mut next, &mut updated, start_broken, config, rng);

        let stats = StepStats {
            moves,
            lane_changes,
            ..StepStats::default()
        }
        .with_breakdowns(report);
        (next, updated, stats)
    }

    /// Give each running vehicle a chance to hop to the same column of the other lane.
    ///
    /// Eligibility uses the broken set from the start of the step. A vehicle that broke
    /// down this step may still switch, and its breakdown moves with it.
    fn change_lanes<R: Rng>(
        &self,
        grid: &mut Grid,
        breakdowns: &mut Breakdowns,
        start_broken: &BrokenSet,
        config: &SimConfig,
        rng: &mut R,
    ) -> usize {
        // snapshot first, so a vehicle that just switched is not offered a second change
        let [first, second] = self.lanes;
        let mut candidates = Vec::new();
        for (lane, target_row) in [(first, second.row), (second, first.row)] {
            for x in 0..grid.width() {
                let pos = Position::new(lane.row, x);
                if grid.is_occupied(pos) {
                    candidates.push((pos, target_row));
                }
            }
        }

        let mut changes = 0;
        for (pos, target_row) in candidates {
            if start_broken.contains(&pos) {
                continue;
            }
            // one draw per eligible vehicle, taken before looking at the target
            if rng.random::<f64>() >= config.lane_change_probability {
                continue;
            }
            // earlier changes in this pass may have filled the target
            let target = Position::new(target_row, pos.col);
            if !grid.is_empty_road(target) {
                continue;
            }
            let Some(class) = grid.get(pos) else { continue };
            grid.set(target, class);
            grid.set(pos, EMPTY);
            // a breakdown from this step travels with the vehicle
            breakdowns.relocate(pos, target);
            changes += 1;
            trace!("two-way: lane change {} -> {}", pos, target);
        }
        changes
    }
}

/// Apply Rule 184 to one lane in its direction of travel.
///
/// Columns are visited in the direction of travel with wrap-around addressing.
/// Only vehicles present before the step move, each at most one cell.
pub fn advance_lane(row: &[Cell], lane: Lane, broken: &BrokenSet) -> (Vec<Cell>, usize) {
    let width = row.len();
    let direction = lane.direction();
    let mut next = row.to_vec();
    let mut moves = 0;
    // horizontal steps never wrap vertically, so any height past the lane row will do
    let height = lane.row + 1;

    let order: Box<dyn Iterator<Item = usize>> = if lane.heading > 0 {
        Box::new(0..width)
    } else {
        Box::new((0..width).rev())
    };

    for x in order {
        if !is_occupied(row[x]) {
            continue;
        }
        let pos = Position::new(lane.row, x);
        if broken.contains(&pos) || has_broken_neighbor(pos, direction, broken, width, height) {
            continue;
        }
        let ahead = pos.wrapped_step(direction, width, height).col;
        if next[ahead] == EMPTY {
            next[ahead] = next[x];
            next[x] = EMPTY;
            moves += 1;
        }
    }

    (next, moves)
}
