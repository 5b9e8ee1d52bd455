//! Breakdown and repair bookkeeping

use rand::rngs::StdRng;
use rand::SeedableRng;
use traffic_ca::simulation::{
    advance_timers, apply_random_breakdowns, has_broken_neighbor, Breakdowns, BrokenSet, Direction,
    Position, RepairTimers, SimConfig,
};

fn timers(entries: &[(Position, u32)]) -> RepairTimers {
    entries.iter().copied().collect()
}

#[test]
fn test_timers_count_down_and_expire() {
    let a = Position::new(1, 2);
    let b = Position::new(1, 5);
    let (updated, repaired) = advance_timers(&timers(&[(a, 3), (b, 1)]));

    assert_eq!(updated.get(&a), Some(&2));
    assert!(!updated.contains_key(&b));
    assert_eq!(repaired, vec![b]);
}

#[test]
fn test_repair_happens_on_exactly_the_last_advance() {
    let pos = Position::new(0, 0);
    let mut breakdowns = Breakdowns::new();
    breakdowns.mark_broken(pos, 20);
    let mut rng = StdRng::seed_from_u64(0);
    let config = SimConfig::deterministic();

    for advance in 1..=20 {
        let (next, report) = breakdowns.advance(&[pos], &config, &mut rng);
        breakdowns = next;
        if advance < 20 {
            assert!(breakdowns.is_broken(pos), "repaired early at advance {}", advance);
            assert_eq!(breakdowns.timers().get(&pos), Some(&(20 - advance)));
            assert_eq!(report.repaired, 0);
        } else {
            assert!(!breakdowns.is_broken(pos));
            assert!(breakdowns.timers().is_empty());
            assert_eq!(report.repaired, 1);
        }
    }
}

#[test]
fn test_certain_breakdown_hits_every_running_vehicle() {
    let occupied = [Position::new(1, 0), Position::new(1, 3), Position::new(1, 4)];
    let already = Position::new(1, 3);
    let broken: BrokenSet = [already].into_iter().collect();
    let existing = timers(&[(already, 7)]);
    let mut rng = StdRng::seed_from_u64(42);

    let (broken, updated) =
        apply_random_breakdowns(&occupied, &broken, &existing, 1.0, 20, &mut rng);

    assert_eq!(broken.len(), 3);
    assert_eq!(updated.get(&Position::new(1, 0)), Some(&20));
    assert_eq!(updated.get(&Position::new(1, 4)), Some(&20));
    // an existing breakdown keeps its countdown
    assert_eq!(updated.get(&already), Some(&7));
}

#[test]
fn test_zero_probability_never_breaks() {
    let occupied: Vec<Position> = (0..50).map(|x| Position::new(0, x)).collect();
    let mut rng = StdRng::seed_from_u64(9);

    let (broken, updated) = apply_random_breakdowns(
        &occupied,
        &BrokenSet::new(),
        &RepairTimers::new(),
        0.0,
        20,
        &mut rng,
    );

    assert!(broken.is_empty());
    assert!(updated.is_empty());
}

#[test]
fn test_broken_neighbor_wraps_around_edges() {
    let broken: BrokenSet = [Position::new(2, 0), Position::new(0, 4)].into_iter().collect();

    assert!(has_broken_neighbor(Position::new(2, 4), Direction::Right, &broken, 5, 3));
    assert!(has_broken_neighbor(Position::new(2, 1), Direction::Left, &broken, 5, 3));
    assert!(has_broken_neighbor(Position::new(2, 4), Direction::Down, &broken, 5, 3));
    assert!(has_broken_neighbor(Position::new(1, 4), Direction::Up, &broken, 5, 3));
    assert!(!has_broken_neighbor(Position::new(2, 3), Direction::Left, &broken, 5, 3));
}

#[test]
fn test_relocate_moves_membership_and_timer() {
    let from = Position::new(0, 1);
    let to = Position::new(2, 1);
    let mut breakdowns = Breakdowns::new();
    breakdowns.mark_broken(from, 12);

    breakdowns.relocate(from, to);

    assert!(!breakdowns.is_broken(from));
    assert!(breakdowns.is_broken(to));
    assert_eq!(breakdowns.timers().get(&to), Some(&12));

    // relocating a running vehicle is a no-op
    breakdowns.relocate(Position::new(5, 5), Position::new(6, 6));
    assert_eq!(breakdowns.len(), 1);
}

#[test]
fn test_mark_broken_does_not_reset_timer() {
    let pos = Position::new(3, 3);
    let mut breakdowns = Breakdowns::new();
    breakdowns.mark_broken(pos, 5);
    breakdowns.mark_broken(pos, 20);

    assert_eq!(breakdowns.timers().get(&pos), Some(&5));
}
