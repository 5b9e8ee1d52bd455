//! Single ring road running Rule 184
//!
//! One road row at the vertical centre of the grid; every other row is off-road.
//! Vehicles travel right and wrap around from the last column to the first.

use log::trace;
use rand::Rng;

use super::breakdown::{has_broken_neighbor, BrokenSet, Breakdowns};
use super::config::SimConfig;
use super::error::SimResult;
use super::grid::Grid;
use super::stats::StepStats;
use super::types::{is_occupied, Cell, Direction, Position, EMPTY, OFF_ROAD, VEHICLE};

/// Layout of the single-lane road
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SingleLane {
    road_row: usize,
}

impl SingleLane {
    /// Lay out the road at `height / 2` and seed it with canonical vehicles
    pub fn create<R: Rng>(
        width: usize,
        height: usize,
        density: f64,
        rng: &mut R,
    ) -> SimResult<(SingleLane, Grid)> {
        let mut grid = Grid::create(width, height, OFF_ROAD)?;
        let road_row = height / 2;
        grid.replace_row(road_row, vec![EMPTY; width]);
        grid.seed_rows(&[road_row], density, rng, |_| VEHICLE);
        Ok((SingleLane { road_row }, grid))
    }

    pub fn road_row(&self) -> usize {
        self.road_row
    }

    /// Advance every vehicle one step, then run breakdown bookkeeping on the moved road
    pub fn step<R: Rng>(
        &self,
        grid: &Grid,
        breakdowns: &Breakdowns,
        config: &SimConfig,
        rng: &mut R,
    ) -> (Grid, Breakdowns, StepStats) {
        let mut next = grid.clone();
        let road = grid.row(self.road_row).unwrap_or_default();
        let (row, moves) = advance_row(road, self.road_row, breakdowns.broken());
        next.replace_row(self.road_row, row);

        let occupied = next.occupied_positions();
        let (breakdowns, report) = breakdowns.advance(&occupied, config, rng);

        let stats = StepStats {
            moves,
            ..StepStats::default()
        }
        .with_breakdowns(report);
        (next, breakdowns, stats)
    }
}

/// Apply one Rule 184 update to a road row, returning the new row and the number of moves.
///
/// Columns are visited right to left. Only vehicles present before the step are
/// considered, and each checks its destination in the row being written, so a vehicle
/// moves at most once and a freshly vacated cell can be taken by the vehicle behind it.
/// Broken vehicles, and vehicles with a broken vehicle directly ahead, stay put.
pub fn advance_row(row: &[Cell], road_row: usize, broken: &BrokenSet) -> (Vec<Cell>, usize) {
    let width = row.len();
    let mut next = row.to_vec();
    let mut moves = 0;
    let height = road_row + 1;

    for x in (0..width).rev() {
        if !is_occupied(row[x]) {
            continue;
        }
        let pos = Position::new(road_row, x);
        if broken.contains(&pos) {
            continue;
        }
        if has_broken_neighbor(pos, Direction::Right, broken, width, height) {
            continue;
        }
        let ahead = (x + 1) % width;
        if next[ahead] == EMPTY {
            next[ahead] = VEHICLE;
            next[x] = EMPTY;
            moves += 1;
            trace!("single-lane: {} -> column {}", pos, ahead);
        }
    }

    (next, moves)
}
