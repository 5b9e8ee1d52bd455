//! Cellular-automaton traffic simulation
//!
//! Rule 184 traffic on three road layouts (single lane, two opposing lanes and a
//! signalled crossing) with random breakdowns. Everything here is deterministic
//! given the random source passed in; nothing renders, sleeps or persists.

mod breakdown;
mod config;
mod error;
mod grid;
mod intersection;
mod session;
mod single_lane;
mod stats;
mod two_way;
mod types;

pub use breakdown::{
    advance_timers, apply_random_breakdowns, has_broken_neighbor, BreakdownReport, Breakdowns,
    BrokenSet, RepairTimers,
};
pub use config::{
    check_density, SimConfig, DEFAULT_BREAKDOWN_PROBABILITY, DEFAULT_LANE_CHANGE_PROBABILITY,
    DEFAULT_LIGHT_CYCLE, DEFAULT_REPAIR_DURATION, DEFAULT_TURN_PROBABILITY,
};
pub use error::{SimError, SimResult};
pub use grid::Grid;
pub use intersection::{
    Intersection, Signal, TrafficLights, APPROACH_DISTANCE, ROAD_HALF_WIDTH, TURN_ZONE_REACH,
    TURN_ZONE_SPREAD,
};
pub use session::{create, create_with_config, step, Layout, Session, SimulationState};
pub use single_lane::{advance_row, SingleLane};
pub use stats::{SimulationStats, StepStats};
pub use two_way::{advance_lane, Lane, TwoWay};
pub use types::{
    is_occupied, Cell, Direction, Position, Topology, EMPTY, OFF_ROAD, VEHICLE, VEHICLE_CLASSES,
};
