//! Rectangular cell grid shared by every topology

use rand::Rng;

use super::error::{SimError, SimResult};
use super::types::{is_occupied, Cell, Position, EMPTY, OFF_ROAD};

/// A width x height mapping from position to cell value.
///
/// Rows are stored top to bottom; every row has the same width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Vec<Cell>>,
}

impl Grid {
    /// Create a grid with every cell set to `fill`
    pub fn create(width: usize, height: usize, fill: Cell) -> SimResult<Self> {
        if width == 0 || height == 0 {
            return Err(SimError::InvalidDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            cells: vec![vec![fill; width]; height],
        })
    }

    /// Build a grid from explicit rows; rejects empty or ragged input
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> SimResult<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if width == 0 || rows.iter().any(|row| row.len() != width) {
            return Err(SimError::InvalidDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            cells: rows,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.cells
    }

    pub fn row(&self, y: usize) -> Option<&[Cell]> {
        self.cells.get(y).map(Vec::as_slice)
    }

    pub fn get(&self, pos: Position) -> Option<Cell> {
        self.cells.get(pos.row)?.get(pos.col).copied()
    }

    /// Overwrite a cell; out-of-range positions are ignored
    pub fn set(&mut self, pos: Position, value: Cell) {
        if let Some(cell) = self.cells.get_mut(pos.row).and_then(|row| row.get_mut(pos.col)) {
            *cell = value;
        }
    }

    /// Replace a whole row, which must have the grid's width
    pub(crate) fn replace_row(&mut self, y: usize, row: Vec<Cell>) {
        debug_assert_eq!(row.len(), self.width);
        self.cells[y] = row;
    }

    pub fn is_empty_road(&self, pos: Position) -> bool {
        self.get(pos) == Some(EMPTY)
    }

    pub fn is_occupied(&self, pos: Position) -> bool {
        self.get(pos).is_some_and(is_occupied)
    }

    /// Positions holding a vehicle, in row-major order
    pub fn occupied_positions(&self) -> Vec<Position> {
        self.cells
            .iter()
            .enumerate()
            .flat_map(|(y, row)| {
                row.iter()
                    .enumerate()
                    .filter(|(_, cell)| is_occupied(**cell))
                    .map(move |(x, _)| Position::new(y, x))
            })
            .collect()
    }

    pub fn count_occupied(&self) -> usize {
        self.cells.iter().flatten().filter(|cell| is_occupied(**cell)).count()
    }

    pub fn count_off_road(&self) -> usize {
        self.cells.iter().flatten().filter(|cell| **cell == OFF_ROAD).count()
    }

    /// Fill the given road rows with vehicles, each cell independently with probability `density`.
    ///
    /// `class_of` picks the value written for a new vehicle.
    pub(crate) fn seed_rows<R, F>(
        &mut self,
        rows: &[usize],
        density: f64,
        rng: &mut R,
        mut class_of: F,
    ) where
        R: Rng,
        F: FnMut(&mut R) -> Cell,
    {
        for &y in rows {
            for x in 0..self.width {
                if rng.random::<f64>() < density {
                    let class = class_of(&mut *rng);
                    self.cells[y][x] = class;
                }
            }
        }
    }
}
