//! Caller-driven gravity cascade.

use burrow_core::{EntityId, Event, MoveKind, Tag};

use crate::{
    movement::{self, MoveOutcome},
    World,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Phase {
    #[default]
    Idle,
    Stepping,
}

#[derive(Clone, Copy, Debug)]
struct Faller {
    entity: EntityId,
    falls: u32,
    retired: bool,
}

/// State of the gravity cascade between rounds.
#[derive(Debug, Default)]
pub(crate) struct GravityStepper {
    phase: Phase,
    fallers: Vec<Faller>,
    moves: u32,
    opened_action: bool,
}

impl GravityStepper {
    pub(crate) fn is_stepping(&self) -> bool {
        self.phase == Phase::Stepping
    }
}

/// Derives one representative per falling body, ordered front first with the player leading.
pub(crate) fn representatives(world: &World) -> Vec<EntityId> {
    let gravity = world.config.gravity;
    let index = &world.index;
    let mut seen_groups = Vec::new();
    let mut ordered = Vec::new();
    let mut player = None;

    for entity in index.iter() {
        let tags = entity.tags();
        if entity.is_destroyed() || !tags.is_pushable() || tags.contains(Tag::Float) {
            continue;
        }

        let representative = match entity.group() {
            Some(group) => {
                if seen_groups.contains(&group) {
                    continue;
                }
                seen_groups.push(group);
                let coords = world.groups.coords(group);
                if tags.contains(Tag::Player) {
                    coords
                        .first()
                        .and_then(|head| index.get(*head, entity.layer()))
                } else {
                    let mut furthest: Option<(i64, EntityId)> = None;
                    for coord in coords {
                        let Some(member) = index.get(*coord, entity.layer()) else {
                            continue;
                        };
                        let progress = coord.progress(gravity);
                        if furthest.map_or(true, |(best, _)| progress > best) {
                            furthest = Some((progress, member));
                        }
                    }
                    furthest.map(|(_, member)| member)
                }
            }
            None => Some(entity.id()),
        };

        let Some(representative) = representative else {
            continue;
        };
        if tags.contains(Tag::Player) {
            player = Some(representative);
        } else {
            movement::insert_ordered(&mut ordered, representative, gravity, index);
        }
    }

    if let Some(player) = player {
        ordered.insert(0, player);
    }
    ordered
}

/// Starts a cascade over the cached representatives.
pub(crate) fn begin(world: &mut World, out_events: &mut Vec<Event>) {
    if world.gravity.is_stepping() {
        return;
    }

    let player = world.player_head();
    let fly_mode = world.fly_mode;
    let fallers: Vec<Faller> = world
        .representatives
        .iter()
        .map(|entity| Faller {
            entity: *entity,
            falls: 0,
            retired: fly_mode && Some(*entity) == player,
        })
        .collect();

    let active = fallers.iter().filter(|faller| !faller.retired).count();
    world.gravity = GravityStepper {
        phase: Phase::Stepping,
        fallers,
        moves: 0,
        opened_action: world.ledger.histories_in_action() == 0,
    };
    out_events.push(Event::GravityStarted {
        representatives: active,
    });
}

/// Advances the cascade by one round, returning whether it is still running.
pub(crate) fn step(world: &mut World, out_events: &mut Vec<Event>) -> bool {
    if !world.gravity.is_stepping() {
        return false;
    }

    let gravity = world.config.gravity;
    for slot in 0..world.gravity.fallers.len() {
        let faller = world.gravity.fallers[slot];
        if faller.retired {
            continue;
        }
        match movement::try_move(world, faller.entity, gravity, MoveKind::Gravity, out_events) {
            MoveOutcome::Blocked(reason) => {
                world.gravity.fallers[slot].retired = true;
                if faller.falls > 0 {
                    tracing::trace!(entity = faller.entity.get(), falls = faller.falls, ?reason, "landed");
                    landed(world, faller, out_events);
                }
            }
            MoveOutcome::Moved(summary) => {
                world.gravity.moves += 1;
                for (other_slot, other) in world.gravity.fallers.iter_mut().enumerate() {
                    if other_slot == slot {
                        other.falls += 1;
                    } else if !other.retired && summary.induced.contains(&other.entity) {
                        other.falls += 1;
                    }
                }
                drop_out_of_bounds(world, &summary.moved, out_events);
            }
        }
    }

    if world.gravity.fallers.iter().all(|faller| faller.retired) {
        settle(world, out_events);
        return false;
    }
    true
}

fn landed(world: &World, faller: Faller, out_events: &mut Vec<Event>) {
    let Some(entity) = world.index.entity(faller.entity) else {
        return;
    };
    let size = entity
        .group()
        .map_or(1, |group| world.groups.coords(group).len());
    out_events.push(Event::Landed {
        representative: faller.entity,
        kind: entity.kind(),
        falls: faller.falls,
        size,
    });
}

fn settle(world: &mut World, out_events: &mut Vec<Event>) {
    let moves = world.gravity.moves;
    let rollbacks = if world.gravity.opened_action {
        moves.saturating_sub(1)
    } else {
        moves
    };
    world.ledger.add_rollbacks(rollbacks);
    world.gravity = GravityStepper::default();
    tracing::debug!(moves, rollbacks, "gravity settled");
    out_events.push(Event::GravitySettled { moves, rollbacks });
}

/// Destroys every body a gravity move carried past the level bounds.
///
/// The destruction joins the move's history, so undo brings the body back.
fn drop_out_of_bounds(world: &mut World, moved: &[EntityId], out_events: &mut Vec<Event>) {
    let mut lost = Vec::new();
    for id in moved {
        let Some(entity) = world.index.entity(*id) else {
            continue;
        };
        if entity.is_destroyed() || world.in_bounds(entity.coord()) || lost.contains(id) {
            continue;
        }
        tracing::warn!(entity = id.get(), coord = ?entity.coord(), "body fell out of the level");
        lost.extend(world.body_members(*id));
    }
    if lost.is_empty() {
        return;
    }

    for id in &lost {
        let _ = world.destroy(*id, out_events);
    }
    for faller in &mut world.gravity.fallers {
        if lost.contains(&faller.entity) {
            faller.retired = true;
        }
    }
    world.refresh_representatives();
}

#[cfg(test)]
mod tests {
    use super::representatives;
    use crate::World;
    use burrow_core::{Coord, EntityKind, EntityRecord, RuleConfig};

    #[test]
    fn player_representative_leads_and_groups_pick_lowest_member() {
        let records = vec![
            EntityRecord::new(EntityKind::Rock, Coord::new(0, 5))
                .with_group(vec![Coord::new(0, 5), Coord::new(0, 4)]),
            EntityRecord::new(EntityKind::Rock, Coord::new(0, 4))
                .with_group(vec![Coord::new(0, 5), Coord::new(0, 4)]),
            EntityRecord::new(EntityKind::Rock, Coord::new(3, 1)),
            EntityRecord::new(EntityKind::Player, Coord::new(6, 9))
                .with_group(vec![Coord::new(6, 9)]),
            EntityRecord::new(EntityKind::BlueCrystal, Coord::new(8, 0)),
        ];
        let world = World::from_records(&records, RuleConfig::default()).expect("level");
        let ids = representatives(&world);

        let coords: Vec<Coord> = ids
            .iter()
            .filter_map(|id| world.index.entity(*id).map(|entity| entity.coord()))
            .collect();
        assert_eq!(coords, vec![Coord::new(6, 9), Coord::new(3, 1), Coord::new(0, 4)]);
    }
}
