//! Invariants that hold over long seeded runs

use rand::rngs::StdRng;
use rand::SeedableRng;
use traffic_ca::simulation::{
    create_with_config, step, Position, Session, SimConfig, SimulationState, Topology, OFF_ROAD,
};

const SEEDS: [u64; 5] = [1, 7, 42, 1234, 99_999];
const STEPS: usize = 150;

/// A config that makes breakdowns common enough to exercise repairs in a short run
fn busy_config() -> SimConfig {
    SimConfig {
        breakdown_probability: 0.05,
        repair_duration: 6,
        ..SimConfig::default()
    }
}

fn run(topology: Topology, seed: u64, config: SimConfig) -> Vec<SimulationState> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut state =
        create_with_config(topology, 30, 15, 0.35, config, &mut rng).expect("valid state");
    let mut states = vec![state.clone()];
    for _ in 0..STEPS {
        state = step(&state, &mut rng);
        states.push(state.clone());
    }
    states
}

fn assert_breakdowns_consistent(state: &SimulationState) {
    let broken: Vec<Position> = state.broken().iter().copied().collect();
    let timed: Vec<Position> = state.timers().keys().copied().collect();
    assert_eq!(broken, timed, "broken set and timers disagree");
    for (pos, timer) in state.timers() {
        assert!(*timer >= 1 && *timer <= state.config().repair_duration);
        assert!(state.grid().is_occupied(*pos), "broken position {} has no vehicle", pos);
    }
}

#[test]
fn test_vehicles_are_conserved() {
    for topology in Topology::ALL {
        for seed in SEEDS {
            let states = run(topology, seed, busy_config());
            let count = states[0].vehicle_count();
            for state in &states {
                assert_eq!(state.vehicle_count(), count, "{} seed {}", topology, seed);
            }
        }
    }
}

#[test]
fn test_off_road_cells_never_change() {
    for topology in Topology::ALL {
        for seed in SEEDS {
            let states = run(topology, seed, busy_config());
            for pair in states.windows(2) {
                let (before, after) = (pair[0].grid(), pair[1].grid());
                for (old_row, new_row) in before.rows().iter().zip(after.rows()) {
                    for (old, new) in old_row.iter().zip(new_row) {
                        assert_eq!(*old == OFF_ROAD, *new == OFF_ROAD);
                    }
                }
            }
        }
    }
}

#[test]
fn test_broken_set_matches_timers() {
    let mut saw_breakdown = false;
    for topology in Topology::ALL {
        for seed in SEEDS {
            for state in run(topology, seed, busy_config()) {
                assert_breakdowns_consistent(&state);
                saw_breakdown |= !state.broken().is_empty();
            }
        }
    }
    assert!(saw_breakdown, "runs never exercised a breakdown");
}

#[test]
fn test_single_lane_vehicles_advance_at_most_one_cell() {
    for seed in SEEDS {
        let states = run(Topology::SingleLane, seed, busy_config());
        for pair in states.windows(2) {
            let road = pair[0].grid().height() / 2;
            let before = pair[0].grid().row(road).expect("road row");
            let after = pair[1].grid().row(road).expect("road row");
            let width = before.len();
            for x in 0..width {
                let ahead = (x + 1) % width;
                let behind = (x + width - 1) % width;
                // a vacated cell means its vehicle is now directly ahead
                if before[x] > 0 && after[x] == 0 {
                    assert!(after[ahead] > 0, "seed {} column {} vanished", seed, x);
                }
                // a newly filled cell was reached from directly behind
                if before[x] == 0 && after[x] > 0 {
                    assert!(before[behind] > 0, "seed {} column {} filled from afar", seed, x);
                }
            }
            assert!(pair[1].last_step().moves <= pair[0].vehicle_count());
        }
    }
}

#[test]
fn test_two_way_lanes_advance_at_most_one_cell() {
    let config = SimConfig {
        lane_change_probability: 0.0,
        ..busy_config()
    };
    for seed in SEEDS {
        let states = run(Topology::TwoWay, seed, config);
        for pair in states.windows(2) {
            let lanes = pair[0].lane_directions().expect("two-way lanes");
            for lane in lanes {
                let before = pair[0].grid().row(lane.row).expect("lane row");
                let after = pair[1].grid().row(lane.row).expect("lane row");
                let width = before.len();
                for x in 0..width {
                    let behind =
                        (x as isize - lane.heading as isize).rem_euclid(width as isize) as usize;
                    if before[x] == 0 && after[x] > 0 {
                        assert!(before[behind] > 0, "seed {} lane {} column {}", seed, lane.row, x);
                        assert_eq!(after[x], before[behind], "vehicle class changed in transit");
                    }
                }
            }
        }
    }
}

#[test]
fn test_signals_are_always_complementary() {
    for seed in SEEDS {
        for state in run(Topology::Intersection, seed, busy_config()) {
            let lights = state.traffic_lights().expect("intersection lights");
            assert_ne!(lights.horizontal(), lights.vertical());
            assert!(lights.timer() >= 1 && lights.timer() <= state.config().light_cycle);
        }
    }
}

#[test]
fn test_lane_directions_never_change() {
    for seed in SEEDS {
        let states = run(Topology::TwoWay, seed, busy_config());
        let lanes = *states[0].lane_directions().expect("two-way lanes");
        assert!(states
            .iter()
            .all(|state| state.lane_directions() == Some(&lanes)));
    }
}

#[test]
fn test_same_seed_same_run() {
    for topology in Topology::ALL {
        for seed in SEEDS {
            assert_eq!(run(topology, seed, busy_config()), run(topology, seed, busy_config()));
        }
    }
}

#[test]
fn test_stepping_leaves_old_state_untouched() {
    let mut rng = StdRng::seed_from_u64(5);
    let state = create_with_config(Topology::Intersection, 25, 15, 0.5, busy_config(), &mut rng)
        .expect("valid state");
    let snapshot = state.clone();
    let mut next = step(&state, &mut rng);
    for _ in 0..30 {
        next = step(&next, &mut rng);
    }
    assert_eq!(state, snapshot);
    assert_eq!(next.generation(), 31);
}

#[test]
fn test_seeded_sessions_agree() {
    for topology in Topology::ALL {
        let mut first = Session::with_config(topology, 40, 11, 0.4, busy_config(), Some(77))
            .expect("valid session");
        let mut second = Session::with_config(topology, 40, 11, 0.4, busy_config(), Some(77))
            .expect("valid session");
        first.run(80);
        second.run(80);
        assert_eq!(first.state(), second.state());
        assert_eq!(first.stats(), second.stats());
        assert_eq!(first.stats().steps, 80);
    }
}

#[test]
fn test_session_stats_accumulate_steps() {
    let mut session = Session::new_with_seed("single-lane", 50, 5, 0.3, 11).expect("valid session");
    let mut moves = 0;
    for _ in 0..40 {
        moves += session.step().last_step().moves as u64;
    }
    let stats = session.stats();
    assert_eq!(stats.total_moves, moves);
    assert!(stats.average_flow() > 0.0 && stats.average_flow() <= 1.0);
}

/// Without a seed the session draws from the operating system, but the rules still hold
#[test]
fn test_unseeded_session_keeps_invariants() {
    for topology in Topology::ALL {
        let mut session = Session::with_config(topology, 30, 15, 0.35, busy_config(), None)
            .expect("valid session");
        let vehicles = session.state().vehicle_count();
        let off_road = session.state().grid().count_off_road();
        for _ in 0..60 {
            let state = session.step();
            assert_eq!(state.vehicle_count(), vehicles);
            assert_eq!(state.grid().count_off_road(), off_road);
            assert_breakdowns_consistent(state);
        }
        assert_eq!(session.stats().steps, 60);
        assert_eq!(session.state().generation(), 60);
    }
}
