use burrow_core::{
    BlockedReason, Command, Coord, Direction, EntityId, EntityKind, EntityRecord, Event, MoveKind,
    RuleConfig,
};
use burrow_world::{self as world, query, World};

fn ground(x: i32, y: i32) -> EntityRecord {
    EntityRecord::new(EntityKind::Ground, Coord::new(x, y))
}

fn rock(x: i32, y: i32) -> EntityRecord {
    EntityRecord::new(EntityKind::Rock, Coord::new(x, y))
}

fn rock_group(cells: &[(i32, i32)]) -> Vec<EntityRecord> {
    let coords: Vec<Coord> = cells.iter().map(|(x, y)| Coord::new(*x, *y)).collect();
    coords
        .iter()
        .map(|coord| EntityRecord::new(EntityKind::Rock, *coord).with_group(coords.clone()))
        .collect()
}

fn load(records: &[EntityRecord]) -> World {
    World::from_records(records, RuleConfig::default()).expect("level must load")
}

fn run(world: &mut World, commands: Vec<Command>) -> Vec<Event> {
    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}

fn coord_of(world: &World, id: u32) -> Coord {
    query::entity(world, EntityId::new(id))
        .expect("entity must exist")
        .coord()
}

#[test]
fn single_rock_is_pushed_into_an_empty_cell() {
    let mut world = load(&[rock(1, 1), ground(1, 0), ground(2, 0)]);

    let events = run(
        &mut world,
        vec![
            Command::BeginAction,
            Command::Move {
                entity: EntityId::new(0),
                direction: Direction::Right,
                kind: MoveKind::Block,
            },
        ],
    );

    assert_eq!(coord_of(&world, 0), Coord::new(2, 1));
    assert_eq!(query::body_coords(&world, EntityId::new(0)), vec![Coord::new(2, 1)]);
    assert_eq!(query::history_len(&world), 1);
    assert!(events.contains(&Event::EntityMoved {
        entity: EntityId::new(0),
        from: Coord::new(1, 1),
        to: Coord::new(2, 1),
    }));
    assert!(
        events.iter().any(|event| matches!(
            event,
            Event::MoveCommitted {
                ground_scrape: true,
                float_moved: false,
                ..
            }
        )),
        "a rock dragged over ground should scrape: {events:?}"
    );
}

#[test]
fn push_into_stop_entity_is_blocked_without_mutation() {
    let mut world = load(&[rock(1, 1), ground(2, 1), ground(1, 0)]);
    let before = query::records(&world);

    let events = run(
        &mut world,
        vec![
            Command::BeginAction,
            Command::Move {
                entity: EntityId::new(0),
                direction: Direction::Right,
                kind: MoveKind::Block,
            },
        ],
    );

    assert_eq!(
        events,
        vec![Event::MoveBlocked {
            initiator: EntityId::new(0),
            direction: Direction::Right,
            kind: MoveKind::Block,
            reason: BlockedReason::Stopped {
                obstacle: EntityId::new(1)
            },
        }]
    );
    assert_eq!(query::records(&world), before, "blocked move must not mutate");
    assert_eq!(query::history_len(&world), 0, "blocked move must not record");
}

#[test]
fn stop_entities_cannot_initiate_moves() {
    let mut world = load(&[ground(0, 0)]);

    let events = run(
        &mut world,
        vec![Command::Move {
            entity: EntityId::new(0),
            direction: Direction::Up,
            kind: MoveKind::Block,
        }],
    );

    assert!(matches!(
        events.as_slice(),
        [Event::MoveBlocked {
            reason: BlockedReason::Immovable,
            ..
        }]
    ));
}

#[test]
fn pushes_chain_through_adjacent_rocks() {
    let mut world = load(&[rock(1, 1), rock(2, 1), rock(3, 1)]);

    let events = run(
        &mut world,
        vec![Command::Move {
            entity: EntityId::new(0),
            direction: Direction::Right,
            kind: MoveKind::Block,
        }],
    );

    assert_eq!(coord_of(&world, 0), Coord::new(2, 1));
    assert_eq!(coord_of(&world, 1), Coord::new(3, 1));
    assert_eq!(coord_of(&world, 2), Coord::new(4, 1));
    let moved = events.iter().find_map(|event| match event {
        Event::MoveCommitted { moved, .. } => Some(moved.clone()),
        _ => None,
    });
    assert_eq!(
        moved,
        Some(vec![EntityId::new(2), EntityId::new(1), EntityId::new(0)]),
        "front-most rock must move first"
    );
}

#[test]
fn group_moves_rigidly_or_not_at_all() {
    let mut records = rock_group(&[(1, 1), (2, 1), (2, 2)]);
    let mut world = load(&records);

    let _ = run(
        &mut world,
        vec![Command::Move {
            entity: EntityId::new(0),
            direction: Direction::Right,
            kind: MoveKind::Block,
        }],
    );

    assert_eq!(coord_of(&world, 0), Coord::new(2, 1));
    assert_eq!(coord_of(&world, 1), Coord::new(3, 1));
    assert_eq!(coord_of(&world, 2), Coord::new(3, 2));
    assert_eq!(
        query::body_coords(&world, EntityId::new(0)),
        vec![Coord::new(2, 1), Coord::new(3, 1), Coord::new(3, 2)]
    );

    records.push(ground(3, 2));
    let mut blocked = load(&records);
    let before = query::records(&blocked);
    let events = run(
        &mut blocked,
        vec![Command::Move {
            entity: EntityId::new(0),
            direction: Direction::Right,
            kind: MoveKind::Block,
        }],
    );

    assert_eq!(query::records(&blocked), before, "no member may move alone");
    assert!(matches!(
        events.as_slice(),
        [Event::MoveBlocked {
            reason: BlockedReason::Stopped { .. },
            ..
        }]
    ));
}

#[test]
fn grounded_group_does_not_sink_or_land() {
    let mut records = rock_group(&[(0, 1), (1, 1), (2, 1)]);
    records.push(ground(1, 0));
    let mut world = load(&records);
    let before = query::records(&world);

    let events = run(&mut world, vec![Command::BeginAction, Command::ApplyGravity]);

    assert_eq!(query::records(&world), before);
    assert!(
        !events
            .iter()
            .any(|event| matches!(event, Event::Landed { .. })),
        "a group that never fell must not land: {events:?}"
    );
    assert!(events.contains(&Event::GravitySettled {
        moves: 0,
        rollbacks: 0
    }));
    assert_eq!(query::history_len(&world), 0);
}

#[test]
fn standalone_fall_collapses_into_one_undo() {
    let mut world = load(&[rock(0, 4), ground(0, 0)]);
    let before = query::records(&world);

    let events = run(&mut world, vec![Command::BeginAction, Command::ApplyGravity]);

    assert_eq!(coord_of(&world, 0), Coord::new(0, 1));
    assert!(events.contains(&Event::Landed {
        representative: EntityId::new(0),
        kind: EntityKind::Rock,
        falls: 3,
        size: 1,
    }));
    assert!(events.contains(&Event::GravitySettled {
        moves: 3,
        rollbacks: 2
    }));
    assert_eq!(query::history_len(&world), 3);
    assert_eq!(query::newest_rollbacks(&world), Some(2));

    let events = run(&mut world, vec![Command::Undo { silent: false }]);

    assert_eq!(query::records(&world), before);
    assert_eq!(query::history_len(&world), 0);
    assert!(events.contains(&Event::UndoApplied {
        histories: 3,
        silent: false
    }));
}

#[test]
fn falling_player_drives_the_rock_beneath_it() {
    let player = EntityRecord::new(EntityKind::Player, Coord::new(0, 3));
    let mut world = load(&[player, rock(0, 2), ground(0, -1)]);

    let events = run(&mut world, vec![Command::BeginAction, Command::ApplyGravity]);

    assert_eq!(coord_of(&world, 0), Coord::new(0, 1));
    assert_eq!(coord_of(&world, 1), Coord::new(0, 0));
    assert!(
        events.iter().any(|event| matches!(
            event,
            Event::MoveCommitted { kind: MoveKind::Gravity, induced, .. }
                if induced == &vec![EntityId::new(1)]
        )),
        "the player pushes the rock as an induced fall: {events:?}"
    );
    assert!(events.contains(&Event::Landed {
        representative: EntityId::new(1),
        kind: EntityKind::Rock,
        falls: 2,
        size: 1,
    }));
}

#[test]
fn floating_crystals_ignore_gravity_and_stop_fallers() {
    let crystal = EntityRecord::new(EntityKind::RedCrystal, Coord::new(0, 2));
    let mut world = load(&[rock(0, 4), crystal, ground(0, -2)]);

    let events = run(&mut world, vec![Command::BeginAction, Command::ApplyGravity]);

    assert_eq!(coord_of(&world, 0), Coord::new(0, 3));
    assert_eq!(coord_of(&world, 1), Coord::new(0, 2));
    assert!(events.iter().any(|event| matches!(
        event,
        Event::MoveBlocked {
            reason: BlockedReason::FloatInTheWay { .. },
            ..
        }
    )));
}

#[test]
fn undo_without_history_reports_nothing() {
    let mut world = load(&[rock(0, 0)]);

    let events = run(&mut world, vec![Command::Undo { silent: true }]);

    assert_eq!(events, vec![Event::NothingToUndo { silent: true }]);
}

#[test]
fn stepping_gravity_refuses_player_actions() {
    let mut world = load(&[rock(0, 3), ground(0, 0)]);

    let mut events = run(&mut world, vec![Command::BeginAction, Command::BeginGravity]);
    assert!(query::is_settling(&world));

    world::apply(
        &mut world,
        Command::Crawl {
            direction: Direction::Left,
        },
        &mut events,
    );
    assert_eq!(
        events.last(),
        Some(&Event::ActionBlocked {
            reason: BlockedReason::Busy
        })
    );

    let mut rounds = 0;
    while query::is_settling(&world) {
        world::apply(&mut world, Command::StepGravity, &mut events);
        rounds += 1;
        assert!(rounds < 10, "gravity must settle");
    }
    assert_eq!(coord_of(&world, 0), Coord::new(0, 1));
    assert_eq!(rounds, 3);
}

#[test]
fn representatives_follow_the_gravity_direction() {
    let config = RuleConfig {
        gravity: Direction::Up,
        ..RuleConfig::default()
    };
    let mut world =
        World::from_records(&[rock(0, 0), ground(0, 3)], config).expect("level must load");

    let _ = run(&mut world, vec![Command::BeginAction, Command::ApplyGravity]);

    assert_eq!(coord_of(&world, 0), Coord::new(0, 2));
}

#[test]
fn scraping_is_judged_by_the_cell_the_block_leaves() {
    let mut world = load(&[rock(0, 1), ground(1, 0), ground(3, 0)]);

    let events = run(
        &mut world,
        vec![
            Command::BeginAction,
            Command::Move {
                entity: EntityId::new(0),
                direction: Direction::Right,
                kind: MoveKind::Block,
            },
        ],
    );

    assert!(
        events.iter().any(|event| matches!(
            event,
            Event::MoveCommitted {
                ground_scrape: false,
                ..
            }
        )),
        "nothing rested under the rock before it moved: {events:?}"
    );

    let events = run(
        &mut world,
        vec![
            Command::BeginAction,
            Command::Move {
                entity: EntityId::new(0),
                direction: Direction::Right,
                kind: MoveKind::Block,
            },
        ],
    );
    assert!(
        events.iter().any(|event| matches!(
            event,
            Event::MoveCommitted {
                ground_scrape: true,
                ..
            }
        )),
        "the rock left a cell above ground: {events:?}"
    );
}

#[test]
fn bodies_falling_out_of_the_level_are_destroyed_once() {
    let mut world = load(&[rock(0, 1), ground(5, 0)]);
    let before = query::records(&world);

    let events = run(&mut world, vec![Command::BeginAction, Command::ApplyGravity]);

    assert!(events.contains(&Event::EntityDestroyed {
        entity: EntityId::new(0)
    }));
    assert!(events.contains(&Event::GravitySettled {
        moves: 2,
        rollbacks: 1
    }));
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::Landed { .. })));
    assert!(query::entity(&world, EntityId::new(0))
        .expect("rock stays in the arena")
        .is_destroyed());
    assert_eq!(coord_of(&world, 0), Coord::new(0, -1));
    assert!(query::representatives(&world).is_empty());

    for _ in 0..8 {
        let events = run(&mut world, vec![Command::BeginAction, Command::ApplyGravity]);
        assert!(events.contains(&Event::GravitySettled {
            moves: 0,
            rollbacks: 0
        }));
        assert_eq!(query::history_len(&world), 2, "later actions must not re-drive the rock");
    }
    assert_eq!(
        query::bounds(&world),
        Some((Coord::new(0, 0), Coord::new(5, 1)))
    );

    let events = run(&mut world, vec![Command::Undo { silent: false }]);

    assert!(events.contains(&Event::EntityRestored {
        entity: EntityId::new(0)
    }));
    assert_eq!(query::records(&world), before);
    assert_eq!(query::history_len(&world), 0);
    assert_eq!(query::representatives(&world), &[EntityId::new(0)]);
}

#[test]
fn rock_pushed_off_a_ledge_falls_out_and_undoes_with_the_push() {
    let body = vec![Coord::new(2, 1), Coord::new(1, 1), Coord::new(0, 1)];
    let mut records: Vec<EntityRecord> = body
        .iter()
        .map(|coord| EntityRecord::new(EntityKind::Player, *coord).with_group(body.clone()))
        .collect();
    records.extend((0..=3).map(|x| ground(x, 0)));
    records.push(ground(6, 0));
    records.push(rock(3, 1));
    let mut world = load(&records);
    let before = query::records(&world);
    let rock_id = EntityId::new(8);

    let events = run(
        &mut world,
        vec![
            Command::BeginAction,
            Command::Crawl {
                direction: Direction::Right,
            },
            Command::ApplyGravity,
        ],
    );

    assert!(events.contains(&Event::EntityDestroyed { entity: rock_id }));
    assert_eq!(coord_of(&world, 8), Coord::new(4, -1));
    assert_eq!(query::history_len(&world), 3);
    assert_eq!(query::newest_rollbacks(&world), Some(2));

    for _ in 0..5 {
        let _ = run(&mut world, vec![Command::BeginAction, Command::ApplyGravity]);
    }
    assert_eq!(query::history_len(&world), 3);

    let events = run(&mut world, vec![Command::Undo { silent: false }]);

    assert!(events.contains(&Event::UndoApplied {
        histories: 3,
        silent: false
    }));
    assert_eq!(query::records(&world), before);
}
