//! Core types for the cellular-automaton traffic model
//!
//! Cell values, grid positions, travel directions and topology identifiers.

use std::fmt;
use std::str::FromStr;

use super::error::SimError;

/// The state of a single grid cell.
///
/// `-1` is off-road, `0` is an empty road cell and anything `>= 1` is a vehicle.
/// Outside the single-lane topology the vehicle value doubles as a display class (1..=3).
pub type Cell = i32;

/// A cell that is not part of any road
pub const OFF_ROAD: Cell = -1;

/// An empty road cell
pub const EMPTY: Cell = 0;

/// Canonical vehicle value used by the single-lane topology
pub const VEHICLE: Cell = 1;

/// Number of distinct vehicle classes drawn for two-way and intersection roads
pub const VEHICLE_CLASSES: Cell = 3;

/// Returns true if the cell holds a vehicle
pub fn is_occupied(cell: Cell) -> bool {
    cell > EMPTY
}

/// A (row, column) position in the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// The neighbouring position one cell away in `direction`, wrapping at the grid edges
    pub fn wrapped_step(&self, direction: Direction, width: usize, height: usize) -> Position {
        match direction {
            Direction::Right => Position::new(self.row, (self.col + 1) % width),
            Direction::Left => Position::new(self.row, (self.col + width - 1) % width),
            Direction::Down => Position::new((self.row + 1) % height, self.col),
            Direction::Up => Position::new((self.row + height - 1) % height, self.col),
        }
    }

    /// The neighbouring position one cell away in `direction`, or `None` past the grid edge
    pub fn bounded_step(
        &self,
        direction: Direction,
        width: usize,
        height: usize,
    ) -> Option<Position> {
        let (dr, dc) = direction.offset();
        self.offset(dr, dc, width, height)
    }

    /// Offset this position by `(d_row, d_col)`, or `None` if the result leaves the grid
    pub fn offset(
        &self,
        d_row: isize,
        d_col: isize,
        width: usize,
        height: usize,
    ) -> Option<Position> {
        let row = self.row.checked_add_signed(d_row)?;
        let col = self.col.checked_add_signed(d_col)?;
        (row < height && col < width).then(|| Position::new(row, col))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// A direction of travel on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Right,
    Left,
    Down,
    Up,
}

impl Direction {
    /// The (row, column) delta of one step in this direction
    pub fn offset(&self) -> (isize, isize) {
        match self {
            Direction::Right => (0, 1),
            Direction::Left => (0, -1),
            Direction::Down => (1, 0),
            Direction::Up => (-1, 0),
        }
    }

    /// Horizontal direction for a signed lane heading (+1 right, -1 left)
    pub fn from_heading(heading: i8) -> Direction {
        if heading >= 0 {
            Direction::Right
        } else {
            Direction::Left
        }
    }
}

/// One of the supported road layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topology {
    /// A single ring road travelling rightwards
    SingleLane,
    /// Two opposing lanes with lane changes
    TwoWay,
    /// A signalled four-way crossing
    Intersection,
}

impl Topology {
    pub const ALL: [Topology; 3] = [Topology::SingleLane, Topology::TwoWay, Topology::Intersection];

    /// The identifier callers use to select this topology
    pub fn as_str(&self) -> &'static str {
        match self {
            Topology::SingleLane => "single-lane",
            Topology::TwoWay => "two-way",
            Topology::Intersection => "intersection",
        }
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Topology {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Topology::ALL
            .into_iter()
            .find(|topology| topology.as_str() == s)
            .ok_or_else(|| SimError::UnknownTopology(s.to_string()))
    }
}
