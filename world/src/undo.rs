//! Reverting histories, following their rollback counters.

use burrow_core::{Direction, DoorState, Event, Layer};

use crate::{
    entity::Entity,
    ledger::{Change, History},
    World,
};

/// Pops the newest history and as many more as its rollbacks demand.
pub(crate) fn undo(world: &mut World, silent: bool, out_events: &mut Vec<Event>) {
    if world.ledger.len() == 0 {
        out_events.push(Event::NothingToUndo { silent });
        return;
    }

    let mut pending: u32 = 0;
    let mut reverted = 0;
    while let Some(history) = world.ledger.pop() {
        pending = pending.saturating_add(history.rollbacks);
        revert(world, &history, out_events);
        reverted += 1;
        if pending == 0 {
            break;
        }
        pending -= 1;
    }

    world.ledger.close();
    world.refresh_representatives();
    tracing::debug!(histories = reverted, silent, "undo applied");
    out_events.push(Event::UndoApplied {
        histories: reverted,
        silent,
    });
}

fn revert(world: &mut World, history: &History, out_events: &mut Vec<Event>) {
    for change in history.changes.iter().rev() {
        match change {
            Change::Move {
                entity,
                snapshot,
                destination,
                group_snapshot,
            } => {
                assert_eq!(
                    world.index.get(*destination, snapshot.layer()),
                    Some(*entity),
                    "entity {} is not at its recorded destination {destination:?}",
                    entity.get()
                );
                let restored = world.index.restore(snapshot.clone());
                assert!(restored, "entity {} could not return to {:?}", entity.get(), snapshot.coord());
                if let Some((group, coords)) =
                    group_snapshot.and_then(|slot| history.group_snapshot(slot))
                {
                    world.groups.set(*group, coords.clone());
                }
                out_events.push(Event::EntityMoved {
                    entity: *entity,
                    from: *destination,
                    to: snapshot.coord(),
                });
            }
            Change::Grow {
                direction,
                segment,
                head_facing,
                shrank,
            } => revert_growth(world, *direction, segment, *head_facing, *shrank, out_events),
            Change::Destroy { entity, layer } => {
                let restored = world.index.set_layer(*entity, *layer);
                assert!(restored, "entity {} could not return to {layer:?}", entity.get());
                world.index.set_destroyed(*entity, false);
                out_events.push(Event::EntityRestored { entity: *entity });
            }
            Change::Collect { grant, coord } => {
                world.stats.revoke(*grant, *coord);
                out_events.push(Event::AbilityRevoked {
                    grant: *grant,
                    coord: *coord,
                });
            }
            Change::Place {
                entity,
                coord,
                revived,
            } => {
                if *revived {
                    let buried = world.index.set_layer(*entity, Layer::CollectibleDestroyed);
                    assert!(buried, "fragment {} could not be buried", entity.get());
                    world.index.set_destroyed(*entity, true);
                    world.stats.remember_location(*coord);
                    out_events.push(Event::EntityDestroyed { entity: *entity });
                } else {
                    let removed = world.index.despawn(*entity);
                    assert!(removed.is_some(), "fragment {} was already gone", entity.get());
                    out_events.push(Event::EntityRemoved { entity: *entity });
                }
                world.stats.return_fragment();
            }
            Change::ButtonToggle { button, previous } => {
                world.index.set_variant(*button, previous.variant());
                out_events.push(Event::ButtonChanged {
                    button: *button,
                    state: *previous,
                });
            }
            Change::TempDoorReopen { door } => {
                world
                    .index
                    .set_variant(*door, DoorState::TemporarilyOpen.variant());
                out_events.push(Event::DoorChanged {
                    door: *door,
                    state: DoorState::TemporarilyOpen,
                });
            }
        }
    }
}

fn revert_growth(
    world: &mut World,
    direction: Direction,
    segment: &Entity,
    head_facing: Direction,
    shrank: bool,
    out_events: &mut Vec<Event>,
) {
    let (Some(group), Some(head)) = (world.player, world.player_head()) else {
        panic!("growth recorded without a player body");
    };
    let Some(head_coord) = world.index.entity(head).map(Entity::coord) else {
        panic!("player head {} is missing from the arena", head.get());
    };
    let target = head_coord.step(direction.opposite());
    let mut coords = world.groups.coords(group).to_vec();

    if shrank {
        let moved = world.index.move_to(head, target);
        assert!(moved, "head could not return to {target:?}");
        let revived = world.index.revive(segment.clone());
        assert!(revived, "segment {} could not be revived", segment.id().get());
        coords.insert(1, segment.coord());
        out_events.push(Event::EntityPlaced {
            entity: segment.id(),
            coord: segment.coord(),
        });
    } else {
        let removed = world.index.despawn(segment.id());
        assert!(removed.is_some(), "segment {} was already gone", segment.id().get());
        let moved = world.index.move_to(head, target);
        assert!(moved, "head could not return to {target:?}");
        let _ = coords.remove(1);
        out_events.push(Event::EntityRemoved {
            entity: segment.id(),
        });
    }

    coords[0] = target;
    world.groups.set(group, coords);
    world.index.set_facing(head, head_facing);
    out_events.push(Event::EntityMoved {
        entity: head,
        from: head_coord,
        to: target,
    });
}
