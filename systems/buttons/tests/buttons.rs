use burrow_core::{
    ButtonState, Command, Coord, Direction, EntityId, EntityKind, EntityRecord, Event, Layer,
    MoveKind, RuleConfig,
};
use burrow_system_buttons::Buttons;
use burrow_world::{self as world, query, World};

fn level() -> World {
    let body = vec![Coord::new(2, 1), Coord::new(1, 1), Coord::new(0, 1)];
    let mut records: Vec<EntityRecord> = body
        .iter()
        .map(|coord| EntityRecord::new(EntityKind::Player, *coord).with_group(body.clone()))
        .collect();
    records.extend((0..=6).map(|x| EntityRecord::new(EntityKind::Ground, Coord::new(x, 0))));
    records.push(EntityRecord::new(EntityKind::GreenCrystal, Coord::new(3, 1)));
    records.push(EntityRecord::new(EntityKind::GreenButton, Coord::new(4, 1)));
    World::from_records(&records, RuleConfig::default()).expect("level must load")
}

/// Runs one command and lets the buttons system react to its events.
fn step(world: &mut World, buttons: &mut Buttons, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);

    let mut commands = Vec::new();
    buttons.handle(&events, &query::buttons(world), &mut commands);
    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}

fn button_state(world: &World) -> ButtonState {
    query::buttons(world)
        .first()
        .map(|button| button.state)
        .expect("level has a button")
}

#[test]
fn pushing_a_matching_crystal_onto_a_button_powers_it() {
    let mut world = level();
    let mut buttons = Buttons::new();

    let _ = step(&mut world, &mut buttons, Command::BeginAction);
    let events = step(
        &mut world,
        &mut buttons,
        Command::Crawl {
            direction: Direction::Right,
        },
    );

    let button = query::entity_at(&world, Coord::new(4, 1), Layer::Misc).expect("button");
    assert!(events.contains(&Event::ButtonChanged {
        button,
        state: ButtonState::Crystal,
    }));
    assert_eq!(button_state(&world), ButtonState::Crystal);

    let _ = step(&mut world, &mut buttons, Command::BeginAction);
    let events = step(
        &mut world,
        &mut buttons,
        Command::Crawl {
            direction: Direction::Right,
        },
    );
    assert!(
        events.contains(&Event::ButtonChanged {
            button,
            state: ButtonState::Off,
        }),
        "pushing the crystal off must release the button: {events:?}"
    );
}

#[test]
fn undo_restores_the_recorded_button_state() {
    let mut world = level();
    let mut buttons = Buttons::new();

    let _ = step(&mut world, &mut buttons, Command::BeginAction);
    let _ = step(
        &mut world,
        &mut buttons,
        Command::Crawl {
            direction: Direction::Right,
        },
    );
    assert_eq!(button_state(&world), ButtonState::Crystal);

    let events = step(&mut world, &mut buttons, Command::Undo { silent: false });

    assert_eq!(button_state(&world), ButtonState::Off);
    assert!(events.contains(&Event::UndoApplied {
        histories: 1,
        silent: false
    }));
    assert_eq!(query::history_len(&world), 0);
}

#[test]
fn gravity_moves_do_not_reevaluate_buttons() {
    let mut buttons = Buttons::new();
    let mut commands = Vec::new();
    let snapshot = burrow_world::query::ButtonSnapshot {
        id: EntityId::new(3),
        color: burrow_core::CrystalColor::Red,
        state: ButtonState::Crystal,
        coord: Coord::new(0, 0),
        resting: None,
    };

    buttons.handle(
        &[Event::MoveCommitted {
            initiator: EntityId::new(1),
            direction: Direction::Down,
            kind: MoveKind::Gravity,
            moved: vec![EntityId::new(1)],
            induced: Vec::new(),
            float_moved: false,
            ground_scrape: false,
        }],
        &[snapshot],
        &mut commands,
    );
    assert!(commands.is_empty(), "gravity alone must not touch buttons");

    buttons.refresh(&[snapshot], &mut commands);
    assert_eq!(
        commands,
        vec![Command::SetButton {
            button: EntityId::new(3),
            state: ButtonState::Off,
        }]
    );
}
