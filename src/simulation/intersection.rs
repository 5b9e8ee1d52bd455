//! Signalled four-way crossing
//!
//! A five-row horizontal road and a five-column vertical road cross at the grid
//! centre. Vehicles drive towards the centre, a pair of complementary traffic lights
//! gates entry at one checkpoint per approach, and vehicles near the crossing may
//! turn onto the other road.

use std::ops::RangeInclusive;

use log::{debug, trace};
use rand::Rng;

use super::breakdown::{has_broken_neighbor, BrokenSet, Breakdowns};
use super::config::SimConfig;
use super::error::{SimError, SimResult};
use super::grid::Grid;
use super::stats::StepStats;
use super::types::{Direction, Position, EMPTY, OFF_ROAD, VEHICLE_CLASSES};

/// Cells either side of the centre line that belong to a road (five lanes in total)
pub const ROAD_HALF_WIDTH: usize = 2;

/// Distance from the centre of the signal checkpoint on each approach
pub const APPROACH_DISTANCE: usize = 3;

/// How far along its road a vehicle may be from the centre and still turn
pub const TURN_ZONE_REACH: usize = 3;

/// How far across its road a vehicle may be from the centre line and still turn
pub const TURN_ZONE_SPREAD: usize = 1;

/// Aspect shown by a single traffic light
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Green,
    Red,
}

impl Signal {
    pub fn opposite(self) -> Signal {
        match self {
            Signal::Green => Signal::Red,
            Signal::Red => Signal::Green,
        }
    }

    pub fn is_green(self) -> bool {
        self == Signal::Green
    }
}

/// The two crossing lights and the countdown to the next phase flip.
///
/// Only the horizontal aspect is stored; the vertical light always shows the opposite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrafficLights {
    horizontal: Signal,
    timer: u32,
}

impl TrafficLights {
    /// Horizontal green, vertical red, `cycle` steps until the first flip
    pub fn new(cycle: u32) -> Self {
        Self {
            horizontal: Signal::Green,
            timer: cycle,
        }
    }

    pub fn horizontal(&self) -> Signal {
        self.horizontal
    }

    pub fn vertical(&self) -> Signal {
        self.horizontal.opposite()
    }

    /// Steps left before the phases swap
    pub fn timer(&self) -> u32 {
        self.timer
    }

    /// Green light for a vehicle travelling in `direction`
    pub fn allows(&self, direction: Direction) -> bool {
        match direction {
            Direction::Left | Direction::Right => self.horizontal().is_green(),
            Direction::Up | Direction::Down => self.vertical().is_green(),
        }
    }

    /// Count down one step, swapping phases and restarting at `cycle` when the timer expires.
    /// Returns the new lights and whether they flipped.
    pub fn advance(&self, cycle: u32) -> (TrafficLights, bool) {
        let timer = self.timer.saturating_sub(1);
        if timer == 0 {
            let flipped = TrafficLights {
                horizontal: self.horizontal.opposite(),
                timer: cycle,
            };
            (flipped, true)
        } else {
            (TrafficLights { timer, ..*self }, false)
        }
    }
}

/// A vehicle move recorded during the scan and applied afterwards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingMove {
    from: Position,
    to: Position,
}

/// Layout and signal state of the crossing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Intersection {
    center: Position,
    lights: TrafficLights,
}

impl Intersection {
    /// Carve both roads around the grid centre and seed the horizontal road
    pub fn create<R: Rng>(
        width: usize,
        height: usize,
        density: f64,
        config: &SimConfig,
        rng: &mut R,
    ) -> SimResult<(Intersection, Grid)> {
        let min = 2 * ROAD_HALF_WIDTH + 1;
        if width < min || height < min {
            return Err(SimError::InvalidDimensions { width, height });
        }

        let intersection = Intersection {
            center: Position::new(height / 2, width / 2),
            lights: TrafficLights::new(config.light_cycle),
        };

        let mut grid = Grid::create(width, height, OFF_ROAD)?;
        for y in 0..height {
            for x in 0..width {
                if intersection.road_rows().contains(&y) || intersection.road_cols().contains(&x) {
                    grid.set(Position::new(y, x), EMPTY);
                }
            }
        }
        let rows: Vec<usize> = intersection.road_rows().collect();
        grid.seed_rows(&rows, density, rng, |rng| rng.random_range(1..=VEHICLE_CLASSES));

        Ok((intersection, grid))
    }

    pub fn center(&self) -> Position {
        self.center
    }

    pub fn lights(&self) -> &TrafficLights {
        &self.lights
    }

    /// Rows of the horizontal road
    pub fn road_rows(&self) -> RangeInclusive<usize> {
        self.center.row - ROAD_HALF_WIDTH..=self.center.row + ROAD_HALF_WIDTH
    }

    /// Columns of the vertical road
    pub fn road_cols(&self) -> RangeInclusive<usize> {
        self.center.col - ROAD_HALF_WIDTH..=self.center.col + ROAD_HALF_WIDTH
    }

    /// True inside the 5x5 region where both roads overlap
    pub fn in_crossing(&self, pos: Position) -> bool {
        pos.col.abs_diff(self.center.col) <= ROAD_HALF_WIDTH
            && pos.row.abs_diff(self.center.row) <= ROAD_HALF_WIDTH
    }

    /// Whether a vehicle at `pos` travelling in `direction` may advance under `lights`.
    ///
    /// Vehicles inside the crossing always may. Outside it, only the checkpoint on the
    /// centre line `APPROACH_DISTANCE` cells out is gated by the light for that approach.
    pub fn can_enter(&self, pos: Position, direction: Direction, lights: &TrafficLights) -> bool {
        if self.in_crossing(pos) {
            return true;
        }
        let Position { row: cy, col: cx } = self.center;
        let at_checkpoint = match direction {
            Direction::Right => pos.row == cy && pos.col + APPROACH_DISTANCE == cx,
            Direction::Left => pos.row == cy && pos.col == cx + APPROACH_DISTANCE,
            Direction::Down => pos.col == cx && pos.row + APPROACH_DISTANCE == cy,
            Direction::Up => pos.col == cx && pos.row == cy + APPROACH_DISTANCE,
        };
        !at_checkpoint || lights.allows(direction)
    }

    /// Direction a vehicle on the horizontal road drives: towards the centre column
    fn horizontal_heading(&self, pos: Position) -> Direction {
        if pos.col < self.center.col {
            Direction::Right
        } else {
            Direction::Left
        }
    }

    /// Direction a vehicle on the vertical road drives: towards the centre row
    fn vertical_heading(&self, pos: Position) -> Direction {
        if pos.row < self.center.row {
            Direction::Down
        } else {
            Direction::Up
        }
    }

    /// Advance the lights, move vehicles, run breakdown bookkeeping, then attempt turns
    pub fn step<R: Rng>(
        &self,
        grid: &Grid,
        breakdowns: &Breakdowns,
        config: &SimConfig,
        rng: &mut R,
    ) -> (Intersection, Grid, Breakdowns, StepStats) {
        let (lights, light_flipped) = self.lights.advance(config.light_cycle);
        if light_flipped {
            debug!(
                "Lights flipped: horizontal {:?}, vertical {:?}",
                lights.horizontal(),
                lights.vertical()
            );
        }
        let start_broken = breakdowns.broken();

        let pending = self.scan_moves(grid, start_broken, &lights);
        let mut next = grid.clone();
        let mut moved = breakdowns.clone();
        let moves = apply_moves(&mut next, &mut moved, &pending);

        let occupied = next.occupied_positions();
        let (mut updated, report) = moved.advance(&occupied, config, rng);

        let turns = self.turn_vehicles(&mut next, &mut updated, start_broken, config, rng);

        let stats = StepStats {
            moves,
            turns,
            light_flipped,
            ..StepStats::default()
        }
        .with_breakdowns(report);
        let intersection = Intersection {
            center: self.center,
            lights,
        };
        (intersection, next, updated, stats)
    }

    /// Collect every move the pre-step grid allows.
    ///
    /// Horizontal road first (rows top to bottom, columns right to left), then the
    /// vertical road (columns left to right, rows bottom to top). The order of the
    /// returned list is the priority used when two moves compete for a cell.
    fn scan_moves(
        &self,
        grid: &Grid,
        broken: &BrokenSet,
        lights: &TrafficLights,
    ) -> Vec<PendingMove> {
        let (width, height) = (grid.width(), grid.height());
        let mut pending = Vec::new();

        // rows top to bottom, columns right to left
        let horizontal = self
            .road_rows()
            .flat_map(|y| (0..width).rev().map(move |x| Position::new(y, x)))
            .map(|pos| (pos, self.horizontal_heading(pos)));
        // bottom to top; recorded after every horizontal move, so horizontal wins a tie
        let vertical = self
            .road_cols()
            .flat_map(|x| (0..height).rev().map(move |y| Position::new(y, x)))
            .map(|pos| (pos, self.vertical_heading(pos)));

        for (pos, direction) in horizontal.chain(vertical) {
            if !grid.is_occupied(pos) || broken.contains(&pos) {
                continue;
            }
            // a stalled vehicle directly ahead holds this one in place
            if has_broken_neighbor(pos, direction, broken, width, height) {
                continue;
            }
            // only the checkpoint cell consults the light
            if !self.can_enter(pos, direction, lights) {
                continue;
            }
            // the crossing does not wrap, and the target is judged on the pre-step grid
            if let Some(to) = pos.bounded_step(direction, width, height) {
                if grid.is_empty_road(to) {
                    pending.push(PendingMove { from: pos, to });
                }
            }
        }
        pending
    }

    /// Offsets a vehicle at `pos` may turn by, in the order they are tried.
    ///
    /// The centre row turns up then down, the centre column left then right. The
    /// candidates are the same whichever way the vehicle is heading.
    fn turn_offsets(&self, pos: Position) -> &'static [(isize, isize)] {
        if pos.row == self.center.row {
            &[(-1, 0), (1, 0)]
        } else if pos.col == self.center.col {
            &[(0, -1), (0, 1)]
        } else {
            &[]
        }
    }

    /// True close enough to the centre for a vehicle to consider turning
    pub fn in_turn_zone(&self, pos: Position) -> bool {
        let dx = pos.col.abs_diff(self.center.col);
        let dy = pos.row.abs_diff(self.center.row);
        (dx <= TURN_ZONE_REACH && dy <= TURN_ZONE_SPREAD)
            || (dy <= TURN_ZONE_REACH && dx <= TURN_ZONE_SPREAD)
    }

    /// Give each running vehicle in the turn zone a chance to sidestep onto the crossing road.
    ///
    /// Vehicles are taken from a snapshot, so each turns at most once. Eligibility uses the
    /// broken set from the start of the step.
    fn turn_vehicles<R: Rng>(
        &self,
        grid: &mut Grid,
        breakdowns: &mut Breakdowns,
        start_broken: &BrokenSet,
        config: &SimConfig,
        rng: &mut R,
    ) -> usize {
        let (width, height) = (grid.width(), grid.height());
        let mut turns = 0;
        for pos in grid.occupied_positions() {
            if start_broken.contains(&pos) || !self.in_turn_zone(pos) {
                continue;
            }
            if rng.random::<f64>() >= config.turn_probability {
                continue;
            }
            let target = self
                .turn_offsets(pos)
                .iter()
                .filter_map(|&(dr, dc)| pos.offset(dr, dc, width, height))
                .find(|target| grid.is_empty_road(*target));
            let Some(target) = target else { continue };
            let Some(class) = grid.get(pos) else { continue };
            grid.set(target, class);
            grid.set(pos, EMPTY);
            breakdowns.relocate(pos, target);
            turns += 1;
            trace!("intersection: turn {} -> {}", pos, target);
        }
        turns
    }
}

/// Apply pending moves in order. A move whose source has already emptied or whose
/// destination has already filled is dropped, so the earlier move wins.
fn apply_moves(grid: &mut Grid, breakdowns: &mut Breakdowns, pending: &[PendingMove]) -> usize {
    let mut applied = 0;
    for mv in pending {
        let Some(vehicle) = grid.get(mv.from) else { continue };
        // a crossing vehicle appears in both scans; its second entry finds the source empty
        if !grid.is_occupied(mv.from) || !grid.is_empty_road(mv.to) {
            continue;
        }
        grid.set(mv.to, vehicle);
        grid.set(mv.from, EMPTY);
        // the breakdown follows the vehicle
        breakdowns.relocate(mv.from, mv.to);
        applied += 1;
        trace!("intersection: {} -> {}", mv.from, mv.to);
    }
    applied
}
