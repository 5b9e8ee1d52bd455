//! Grid construction and queries

use traffic_ca::simulation::{Grid, Position, SimError, OFF_ROAD};

#[test]
fn test_create_fills_every_cell() {
    let grid = Grid::create(4, 2, OFF_ROAD).expect("valid grid");
    assert_eq!(grid.width(), 4);
    assert_eq!(grid.height(), 2);
    assert_eq!(grid.count_off_road(), 8);
    assert_eq!(grid.get(Position::new(1, 3)), Some(OFF_ROAD));
    assert_eq!(grid.get(Position::new(2, 0)), None);
}

#[test]
fn test_create_rejects_empty_dimensions() {
    assert_eq!(
        Grid::create(0, 5, 0).unwrap_err(),
        SimError::InvalidDimensions { width: 0, height: 5 }
    );
    assert_eq!(
        Grid::create(5, 0, 0).unwrap_err(),
        SimError::InvalidDimensions { width: 5, height: 0 }
    );
}

#[test]
fn test_from_rows_rejects_ragged_input() {
    assert!(Grid::from_rows(vec![vec![0, 0], vec![0]]).is_err());
    assert!(Grid::from_rows(Vec::new()).is_err());
}

#[test]
fn test_occupied_positions_in_row_major_order() {
    let grid = Grid::from_rows(vec![vec![-1, 2, 0], vec![1, 0, 3]]).expect("valid grid");
    assert_eq!(
        grid.occupied_positions(),
        vec![Position::new(0, 1), Position::new(1, 0), Position::new(1, 2)]
    );
    assert_eq!(grid.count_occupied(), 3);
    assert!(grid.is_empty_road(Position::new(0, 2)));
    assert!(!grid.is_empty_road(Position::new(0, 0)));
}

#[test]
fn test_set_ignores_out_of_range_positions() {
    let mut grid = Grid::create(2, 2, 0).expect("valid grid");
    grid.set(Position::new(5, 5), 1);
    grid.set(Position::new(1, 1), 2);
    assert_eq!(grid.count_occupied(), 1);
    assert_eq!(grid.get(Position::new(1, 1)), Some(2));
}
