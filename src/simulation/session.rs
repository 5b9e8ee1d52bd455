//! Simulation entry points
//!
//! `create` builds the initial state for a topology and `step` maps one state to the
//! next. States are immutable snapshots: stepping never touches the input, so callers
//! may keep old states around for as long as they like.

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::breakdown::{Breakdowns, BrokenSet, RepairTimers};
use super::config::{check_density, SimConfig};
use super::error::SimResult;
use super::grid::Grid;
use super::intersection::{Intersection, TrafficLights};
use super::single_lane::SingleLane;
use super::stats::{SimulationStats, StepStats};
use super::two_way::{Lane, TwoWay};
use super::types::{Position, Topology};

/// Topology-specific part of a state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    SingleLane(SingleLane),
    TwoWay(TwoWay),
    Intersection(Intersection),
}

/// A complete, self-consistent snapshot of a simulation
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationState {
    layout: Layout,
    grid: Grid,
    breakdowns: Breakdowns,
    generation: u64,
    config: SimConfig,
    last_step: StepStats,
}

impl SimulationState {
    pub fn topology(&self) -> Topology {
        match self.layout {
            Layout::SingleLane(_) => Topology::SingleLane,
            Layout::TwoWay(_) => Topology::TwoWay,
            Layout::Intersection(_) => Topology::Intersection,
        }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn broken(&self) -> &BrokenSet {
        self.breakdowns.broken()
    }

    pub fn timers(&self) -> &RepairTimers {
        self.breakdowns.timers()
    }

    pub fn breakdowns(&self) -> &Breakdowns {
        &self.breakdowns
    }

    pub fn is_broken(&self, pos: Position) -> bool {
        self.breakdowns.is_broken(pos)
    }

    /// Number of steps taken since creation
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Statistics of the step that produced this state (all zero right after creation)
    pub fn last_step(&self) -> &StepStats {
        &self.last_step
    }

    pub fn vehicle_count(&self) -> usize {
        self.grid.count_occupied()
    }

    /// Light phases, for the intersection topology
    pub fn traffic_lights(&self) -> Option<&TrafficLights> {
        match &self.layout {
            Layout::Intersection(intersection) => Some(intersection.lights()),
            _ => None,
        }
    }

    /// Lane rows and headings, for the two-way topology
    pub fn lane_directions(&self) -> Option<&[Lane; 2]> {
        match &self.layout {
            Layout::TwoWay(two_way) => Some(two_way.lanes()),
            _ => None,
        }
    }

    /// Return a copy of this state with the vehicle at `pos` disabled for `duration` steps.
    ///
    /// Positions without a vehicle are ignored, so broken positions stay a subset of occupied ones.
    pub fn with_breakdown(&self, pos: Position, duration: u32) -> SimulationState {
        let mut next = self.clone();
        if next.grid.is_occupied(pos) {
            next.breakdowns.mark_broken(pos, duration);
        }
        next
    }

    /// Return a copy of this state with the vehicles on the road replaced.
    ///
    /// Only road cells of `grid` may differ from this state's grid; breakdowns are cleared.
    /// Intended for setting up scenarios, returns `None` if the layouts do not match.
    pub fn with_grid(&self, grid: Grid) -> Option<SimulationState> {
        let same_shape = grid.width() == self.grid.width() && grid.height() == self.grid.height();
        let same_roads = same_shape
            && self
                .grid
                .rows()
                .iter()
                .flatten()
                .zip(grid.rows().iter().flatten())
                .all(|(old, new)| (*old < 0) == (*new < 0));
        same_roads.then(|| SimulationState {
            grid,
            breakdowns: Breakdowns::new(),
            ..self.clone()
        })
    }
}

/// Create a state for the topology named `topology` with default parameters
pub fn create<R: Rng>(
    topology: &str,
    width: usize,
    height: usize,
    density: f64,
    rng: &mut R,
) -> SimResult<SimulationState> {
    let topology = topology.parse::<Topology>()?;
    create_with_config(topology, width, height, density, SimConfig::default(), rng)
}

/// Create a state with explicit model parameters
pub fn create_with_config<R: Rng>(
    topology: Topology,
    width: usize,
    height: usize,
    density: f64,
    config: SimConfig,
    rng: &mut R,
) -> SimResult<SimulationState> {
    check_density(density)?;
    config.validate()?;

    let (layout, grid) = match topology {
        Topology::SingleLane => {
            let (single, grid) = SingleLane::create(width, height, density, rng)?;
            (Layout::SingleLane(single), grid)
        }
        Topology::TwoWay => {
            let (two_way, grid) = TwoWay::create(width, height, density, rng)?;
            (Layout::TwoWay(two_way), grid)
        }
        Topology::Intersection => {
            let (intersection, grid) = Intersection::create(width, height, density, &config, rng)?;
            (Layout::Intersection(intersection), grid)
        }
    };

    debug!(
        "Created {} simulation {}x{} with {} vehicles",
        topology,
        width,
        height,
        grid.count_occupied()
    );

    Ok(SimulationState {
        layout,
        grid,
        breakdowns: Breakdowns::new(),
        generation: 0,
        config,
        last_step: StepStats::default(),
    })
}

/// Compute the state that follows `state`
pub fn step<R: Rng>(state: &SimulationState, rng: &mut R) -> SimulationState {
    let config = &state.config;
    let (layout, grid, breakdowns, last_step) = match &state.layout {
        Layout::SingleLane(single) => {
            let (grid, breakdowns, stats) =
                single.step(&state.grid, &state.breakdowns, config, rng);
            (Layout::SingleLane(*single), grid, breakdowns, stats)
        }
        Layout::TwoWay(two_way) => {
            let (grid, breakdowns, stats) =
                two_way.step(&state.grid, &state.breakdowns, config, rng);
            (Layout::TwoWay(*two_way), grid, breakdowns, stats)
        }
        Layout::Intersection(intersection) => {
            let (intersection, grid, breakdowns, stats) =
                intersection.step(&state.grid, &state.breakdowns, config, rng);
            (Layout::Intersection(intersection), grid, breakdowns, stats)
        }
    };

    SimulationState {
        layout,
        grid,
        breakdowns,
        generation: state.generation + 1,
        config: state.config,
        last_step,
    }
}

/// A running simulation: the current state, its random source and accumulated statistics
pub struct Session {
    state: SimulationState,
    rng: StdRng,
    stats: SimulationStats,
}

impl Session {
    fn new_internal(
        topology: Topology,
        width: usize,
        height: usize,
        density: f64,
        config: SimConfig,
        mut rng: StdRng,
    ) -> SimResult<Self> {
        let state = create_with_config(topology, width, height, density, config, &mut rng)?;
        info!(
            "Session started: {} {}x{}, density {:.2}, {} vehicles",
            topology,
            width,
            height,
            density,
            state.vehicle_count()
        );
        Ok(Self {
            state,
            rng,
            stats: SimulationStats::new(),
        })
    }

    /// Start a session with a seeded RNG for reproducible runs
    pub fn new_with_seed(
        topology: &str,
        width: usize,
        height: usize,
        density: f64,
        seed: u64,
    ) -> SimResult<Self> {
        let topology = topology.parse::<Topology>()?;
        Self::with_config(topology, width, height, density, SimConfig::default(), Some(seed))
    }

    /// Start a session with explicit parameters; `seed` of `None` seeds from the operating system
    pub fn with_config(
        topology: Topology,
        width: usize,
        height: usize,
        density: f64,
        config: SimConfig,
        seed: Option<u64>,
    ) -> SimResult<Self> {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::new_internal(topology, width, height, density, config, rng)
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn stats(&self) -> &SimulationStats {
        &self.stats
    }

    /// Advance one generation and return the new state
    pub fn step(&mut self) -> &SimulationState {
        let next = step(&self.state, &mut self.rng);
        self.stats.record(next.last_step(), next.vehicle_count());
        self.state = next;
        &self.state
    }

    /// Advance `steps` generations
    pub fn run(&mut self, steps: u64) -> &SimulationState {
        for _ in 0..steps {
            self.step();
        }
        &self.state
    }
}
