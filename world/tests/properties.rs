//! Property tests for the movement and undo invariants.
//!
//! Random action sequences run against a small level; after every action no
//! two live entities may share a layer at one cell, and undoing everything
//! must restore the level exactly.

use burrow_core::{Command, Coord, Direction, EntityId, EntityKind, EntityRecord, Event, MoveKind};
use burrow_world::{self as world, query, World};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Action {
    Crawl(Direction),
    Grow(Direction),
    Push(usize, Direction),
    Undo,
}

fn direction() -> impl Strategy<Value = Direction> {
    prop::sample::select(Direction::ALL.to_vec())
}

fn action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![
        4 => direction().prop_map(Action::Crawl),
        1 => direction().prop_map(Action::Grow),
        2 => (0..4usize, direction()).prop_map(|(rock, dir)| Action::Push(rock, dir)),
        1 => Just(Action::Undo),
    ]
}

fn level() -> Vec<EntityRecord> {
    let body = vec![Coord::new(2, 1), Coord::new(1, 1), Coord::new(0, 1)];
    let pair = vec![Coord::new(6, 1), Coord::new(6, 2)];
    let mut records: Vec<EntityRecord> = body
        .iter()
        .map(|coord| EntityRecord::new(EntityKind::Player, *coord).with_group(body.clone()))
        .collect();
    // Floor and walls enclose the level so nothing can fall out of it.
    records.extend((-2..=9).map(|x| EntityRecord::new(EntityKind::Ground, Coord::new(x, 0))));
    for y in 1..=6 {
        records.push(EntityRecord::new(EntityKind::Ground, Coord::new(-2, y)));
        records.push(EntityRecord::new(EntityKind::Ground, Coord::new(9, y)));
    }
    records.push(EntityRecord::new(EntityKind::Rock, Coord::new(4, 1)));
    records.push(EntityRecord::new(EntityKind::Rock, Coord::new(4, 3)));
    records.extend(
        pair.iter()
            .map(|coord| EntityRecord::new(EntityKind::Rock, *coord).with_group(pair.clone())),
    );
    records.push(EntityRecord::new(EntityKind::GreenCrystal, Coord::new(5, 4)));
    records.push(EntityRecord::new(EntityKind::CollectLength, Coord::new(2, 2)));
    records.push(EntityRecord::new(EntityKind::CollectFragment, Coord::new(3, 1)));
    records
}

fn movable_ids(world: &World) -> Vec<EntityId> {
    query::entities(world)
        .filter(|entity| {
            matches!(
                entity.kind(),
                EntityKind::Rock | EntityKind::GreenCrystal
            )
        })
        .map(|entity| entity.id())
        .collect()
}

fn assert_unique(world: &World) {
    for entity in query::entities(world) {
        let layer = entity.layer();
        assert!(
            query::entities_at(world, entity.coord()).contains(&entity.id()),
            "entity {:?} missing from its cell",
            entity.id()
        );
        if layer.is_remnant() {
            continue;
        }
        let sharing = query::entities_at(world, entity.coord())
            .iter()
            .filter_map(|id| query::entity(world, *id))
            .filter(|other| other.layer() == layer)
            .count();
        assert_eq!(sharing, 1, "{layer:?} is shared at {:?}", entity.coord());
    }
}

fn perform(world: &mut World, action: &Action, movable: &[EntityId]) {
    let mut events = Vec::new();
    let command = match action {
        Action::Undo => {
            world::apply(world, Command::Undo { silent: true }, &mut events);
            return;
        }
        Action::Crawl(direction) => Command::Crawl {
            direction: *direction,
        },
        Action::Grow(direction) => Command::Grow {
            direction: *direction,
        },
        Action::Push(rock, direction) => Command::Move {
            entity: movable[*rock % movable.len()],
            direction: *direction,
            kind: MoveKind::Block,
        },
    };
    world::apply(world, Command::BeginAction, &mut events);
    world::apply(world, command, &mut events);
    world::apply(world, Command::ApplyGravity, &mut events);
    assert!(!query::is_settling(world));
}

fn undo_everything(world: &mut World) {
    for _ in 0..1_000 {
        let mut events = Vec::new();
        world::apply(world, Command::Undo { silent: true }, &mut events);
        if events.contains(&Event::NothingToUndo { silent: true }) {
            return;
        }
    }
    panic!("undo never ran out of histories");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn random_actions_keep_layers_unique(actions in prop::collection::vec(action_strategy(), 1..40)) {
        let mut world = World::from_records(&level(), Default::default()).expect("level must load");
        let movable = movable_ids(&world);

        for action in &actions {
            perform(&mut world, action, &movable);
            assert_unique(&world);
        }
    }

    #[test]
    fn undoing_every_action_restores_the_level(actions in prop::collection::vec(action_strategy(), 1..40)) {
        let mut world = World::from_records(&level(), Default::default()).expect("level must load");
        let initial = query::records(&world);
        let stats = query::player_stats(&world).clone();
        let movable = movable_ids(&world);

        for action in &actions {
            perform(&mut world, action, &movable);
        }
        undo_everything(&mut world);

        prop_assert_eq!(query::records(&world), initial);
        prop_assert_eq!(query::player_stats(&world), &stats);
        prop_assert_eq!(query::history_len(&world), 0);
    }
}
