//! Push-chain discovery and commit.
//!
//! A move is planned against the spatial index without touching it, then
//! committed in front-to-back order so no mover ever enters a cell that is
//! still occupied on its own layer.

use burrow_core::{
    BlockedReason, Coord, Direction, EntityId, Event, GroupId, Layer, MoveKind, Tag,
};

use crate::{entity::Entity, ledger::Change, spatial::SpatialIndex, World};

/// Result of a single movement request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum MoveOutcome {
    Moved(MoveSummary),
    Blocked(BlockedReason),
}

/// What a committed chain did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct MoveSummary {
    pub(crate) moved: Vec<EntityId>,
    pub(crate) induced: Vec<EntityId>,
    pub(crate) float_moved: bool,
    pub(crate) ground_scrape: bool,
}

#[derive(Debug, Default)]
struct Plan {
    order: Vec<EntityId>,
    groups: Vec<GroupId>,
}

/// Moves the entity one cell, pushing everything in its way, or refuses with no mutation.
pub(crate) fn try_move(
    world: &mut World,
    initiator: EntityId,
    direction: Direction,
    kind: MoveKind,
    out_events: &mut Vec<Event>,
) -> MoveOutcome {
    match plan(world, initiator, direction, kind) {
        Ok(plan) => {
            let summary = commit(world, initiator, direction, kind, plan, out_events);
            out_events.push(Event::MoveCommitted {
                initiator,
                direction,
                kind,
                moved: summary.moved.clone(),
                induced: summary.induced.clone(),
                float_moved: summary.float_moved,
                ground_scrape: summary.ground_scrape,
            });
            MoveOutcome::Moved(summary)
        }
        Err(reason) => {
            tracing::debug!(entity = initiator.get(), ?direction, ?kind, ?reason, "move blocked");
            out_events.push(Event::MoveBlocked {
                initiator,
                direction,
                kind,
                reason,
            });
            MoveOutcome::Blocked(reason)
        }
    }
}

fn plan(
    world: &World,
    initiator: EntityId,
    direction: Direction,
    kind: MoveKind,
) -> Result<Plan, BlockedReason> {
    if kind == MoveKind::Block && world.projectiles_cancelled {
        return Err(BlockedReason::Cancelled);
    }

    let index = &world.index;
    let origin = index.entity(initiator).ok_or(BlockedReason::MissingEntity)?;
    let tags = origin.tags();
    let applying_gravity = world.gravity.is_stepping();
    if (tags.contains(Tag::Stop) && !tags.contains(Tag::Player))
        || (tags.contains(Tag::Player) && !applying_gravity)
        || !tags.is_pushable()
        || origin.is_destroyed()
    {
        return Err(BlockedReason::Immovable);
    }

    let mut plan = Plan::default();
    let mut expanded_singles: Vec<EntityId> = Vec::new();
    let mut worklist = vec![initiator];
    let mut cursor = 0;

    while cursor < worklist.len() {
        let current = worklist[cursor];
        cursor += 1;

        let Some(entry) = index.entity(current) else {
            continue;
        };
        if !entry.tags().is_pushable() {
            continue;
        }

        let members: Vec<EntityId> = match entry.group() {
            Some(group) => {
                if plan.groups.contains(&group) {
                    continue;
                }
                plan.groups.push(group);
                world
                    .groups
                    .coords(group)
                    .iter()
                    .filter_map(|coord| index.get(*coord, entry.layer()))
                    .collect()
            }
            None => {
                if expanded_singles.contains(&current) {
                    continue;
                }
                expanded_singles.push(current);
                vec![current]
            }
        };

        for member_id in members {
            let Some(member) = index.entity(member_id) else {
                continue;
            };
            let destination = member.coord().step(direction);

            for layer in Layer::COLLISION {
                let Some(occupant) = index.get(destination, layer).and_then(|id| index.entity(id))
                else {
                    continue;
                };
                let member_is_player = member.tags().contains(Tag::Player);
                let occupant_tags = occupant.tags();

                if kind == MoveKind::Block
                    && !member_is_player
                    && occupant_tags.contains(Tag::Player)
                    && world.config.block_moves_displace_player
                {
                    worklist.push(occupant.id());
                    continue;
                }

                if occupant_tags.contains(Tag::Stop)
                    && !(occupant_tags.contains(Tag::Player) && member_is_player)
                {
                    return Err(BlockedReason::Stopped {
                        obstacle: occupant.id(),
                    });
                }
                if kind == MoveKind::Player && !member_is_player && occupant_tags.contains(Tag::Player)
                {
                    return Err(BlockedReason::PlayerInTheWay {
                        player: occupant.id(),
                    });
                }
                if kind == MoveKind::Gravity && occupant_tags.contains(Tag::Float) {
                    return Err(BlockedReason::FloatInTheWay {
                        obstacle: occupant.id(),
                    });
                }
            }

            if let Some(occupant) = index
                .get(destination, member.layer())
                .and_then(|id| index.entity(id))
            {
                if !occupant.tags().is_pushable() && !occupant.same_body(member) {
                    return Err(BlockedReason::Obstructed {
                        obstacle: occupant.id(),
                    });
                }
            }

            for layer in Layer::COLLISION {
                match index.get(destination, layer).and_then(|id| index.entity(id)) {
                    Some(occupant) => {
                        if occupant.tags().is_pushable() {
                            insert_ordered(&mut plan.order, member_id, direction, index);
                            if !occupant.same_body(member) {
                                worklist.push(occupant.id());
                            }
                            break;
                        }
                    }
                    None => {
                        insert_ordered(&mut plan.order, member_id, direction, index);
                        break;
                    }
                }
            }
        }
    }

    Ok(plan)
}

fn commit(
    world: &mut World,
    initiator: EntityId,
    direction: Direction,
    kind: MoveKind,
    plan: Plan,
    out_events: &mut Vec<Event>,
) -> MoveSummary {
    let gravity = world.config.gravity;
    let initiator_state = world.index.entity(initiator).cloned();
    let mut summary = MoveSummary::default();
    let _ = world.ledger.open_history();

    for id in plan.order {
        let Some(snapshot) = world.index.entity(id).cloned() else {
            continue;
        };
        let from = snapshot.coord();
        let destination = from.step(direction);
        let tags = snapshot.tags();

        if kind == MoveKind::Gravity
            && id != initiator
            && !tags.contains(Tag::Float)
            && !initiator_state
                .as_ref()
                .is_some_and(|origin| origin.same_body(&snapshot))
        {
            summary.induced.push(id);
        }

        if tags.contains(Tag::Float) {
            summary.float_moved = true;
        } else if !direction.is_vertical()
            && tags.contains(Tag::Push)
            && !summary.ground_scrape
            && scrapes_ground(&world.index, &snapshot, from.step(gravity), kind)
        {
            summary.ground_scrape = true;
        }

        let group_snapshot = match snapshot.group() {
            Some(group) => {
                let coords = world.groups.coords(group);
                Some(world.ledger.current().intern_group(group, coords))
            }
            None => None,
        };
        world.ledger.push_change(Change::Move {
            entity: id,
            snapshot,
            destination,
            group_snapshot,
        });

        let moved = world.index.move_to(id, destination);
        if !moved {
            tracing::error!(entity = id.get(), ?destination, "planned move collided");
        }
        debug_assert!(moved, "planned move collided at {destination:?}");

        out_events.push(Event::EntityMoved {
            entity: id,
            from,
            to: destination,
        });
        summary.moved.push(id);
    }

    for group in plan.groups {
        world.groups.offset(group, direction);
    }

    tracing::trace!(
        entity = initiator.get(),
        ?direction,
        ?kind,
        moved = summary.moved.len(),
        "move committed"
    );
    summary
}

/// Reports whether a horizontally pushed block drags along what rests beneath its starting cell.
fn scrapes_ground(index: &SpatialIndex, mover: &Entity, below: Coord, kind: MoveKind) -> bool {
    Layer::COLLISION.iter().any(|layer| {
        index
            .get(below, *layer)
            .and_then(|id| index.entity(id))
            .is_some_and(|support| {
                !support.same_body(mover)
                    && !(kind == MoveKind::Player && support.tags().contains(Tag::Player))
            })
    })
}

/// Inserts `id` so entities further along `direction` stay ahead of it.
pub(crate) fn insert_ordered(
    order: &mut Vec<EntityId>,
    id: EntityId,
    direction: Direction,
    index: &SpatialIndex,
) {
    let Some(progress) = index.entity(id).map(|entity| entity.coord().progress(direction)) else {
        return;
    };
    let position = order.iter().position(|existing| {
        index
            .entity(*existing)
            .is_some_and(|entity| entity.coord().progress(direction) <= progress)
    });
    match position {
        Some(position) => order.insert(position, id),
        None => order.push(id),
    }
}
