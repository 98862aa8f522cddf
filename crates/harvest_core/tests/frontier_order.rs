use std::collections::HashMap;
use std::sync::Once;

use harvest_core::{BlockPos, DiscoveryClass, Frontier, MaterialId};
use pretty_assertions::assert_eq;

const ORE: MaterialId = MaterialId(3);
const STONE: MaterialId = MaterialId(1);

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(harvest_logging::initialize_for_tests);
}

fn world(blocks: &[(BlockPos, MaterialId)]) -> HashMap<BlockPos, MaterialId> {
    blocks.iter().copied().collect()
}

#[test]
fn seed_marks_visited_and_rejects_repeats() {
    init_logging();
    let mut frontier = Frontier::new();
    let origin = BlockPos::new(0, 64, 0);

    assert!(frontier.seed(origin));
    assert!(frontier.is_visited(origin));
    assert!(!frontier.seed(origin));
    assert_eq!(frontier.len(), 1);

    let entry = frontier.next().unwrap();
    assert_eq!(entry.pos, origin);
    assert!(frontier.next().is_none());
    assert!(!frontier.seed(origin));
}

#[test]
fn vertical_neighbours_are_dequeued_before_horizontal_ones() {
    init_logging();
    let origin = BlockPos::new(0, 10, 0);
    let up = origin.offset(0, 1, 0);
    let down = origin.offset(0, -1, 0);
    let east = origin.offset(1, 0, 0);
    let north = origin.offset(0, 0, -1);
    let blocks = world(&[(up, ORE), (down, ORE), (east, ORE), (north, ORE)]);

    let mut frontier = Frontier::new();
    frontier.seed(origin);
    frontier.next();
    let added = frontier.expand_from(origin, ORE, |pos| blocks.get(&pos).copied());
    assert_eq!(added, 4);

    let order: Vec<_> = std::iter::from_fn(|| frontier.next())
        .map(|entry| (entry.pos, entry.class))
        .collect();
    assert_eq!(
        order,
        vec![
            (up, DiscoveryClass::Vertical),
            (down, DiscoveryClass::Vertical),
            (east, DiscoveryClass::Horizontal),
            (north, DiscoveryClass::Horizontal),
        ]
    );
}

#[test]
fn later_vertical_discoveries_jump_ahead_of_pending_horizontals() {
    init_logging();
    let origin = BlockPos::new(5, 5, 5);
    let east = origin.offset(1, 0, 0);
    let above_east = east.offset(0, 1, 0);
    let west = origin.offset(-1, 0, 0);
    let blocks = world(&[(east, ORE), (west, ORE), (above_east, ORE)]);
    let lookup = |pos: BlockPos| blocks.get(&pos).copied();

    let mut frontier = Frontier::new();
    frontier.seed(origin);
    frontier.next();
    frontier.expand_from(origin, ORE, lookup);

    let first = frontier.next().unwrap();
    assert_eq!(first.pos, east);
    frontier.expand_from(east, ORE, lookup);

    let rest: Vec<_> = std::iter::from_fn(|| frontier.next()).map(|e| e.pos).collect();
    assert_eq!(rest, vec![above_east, west]);
}

#[test]
fn expansion_ignores_other_materials_and_visited_positions() {
    init_logging();
    let origin = BlockPos::new(0, 0, 0);
    let up = origin.offset(0, 1, 0);
    let side = origin.offset(0, 0, 1);
    let blocks = world(&[(up, ORE), (side, STONE)]);
    let lookup = |pos: BlockPos| blocks.get(&pos).copied();

    let mut frontier = Frontier::new();
    frontier.seed(origin);
    frontier.next();

    assert_eq!(frontier.expand_from(origin, ORE, lookup), 1);
    // A second expansion from the same spot finds nothing new.
    assert_eq!(frontier.expand_from(origin, ORE, lookup), 0);
    assert_eq!(frontier.len(), 1);

    frontier.next();
    // Expanding from `up` sees `origin` below it, which is already visited.
    assert_eq!(frontier.expand_from(up, ORE, lookup), 0);
    assert!(frontier.is_empty());
    assert_eq!(frontier.visited_count(), 2);
}

#[test]
fn no_eligible_neighbours_leaves_frontier_untouched() {
    init_logging();
    let mut frontier = Frontier::new();
    let origin = BlockPos::new(1, 2, 3);
    frontier.seed(origin);
    frontier.next();

    assert_eq!(frontier.expand_from(origin, ORE, |_| None), 0);
    assert!(frontier.is_empty());
}
