//! Player body actions and the inventory they feed.

use burrow_core::{
    Ability, BlockedReason, Collectible, Coord, CrystalColor, Direction, DoorState, EntityId,
    EntityKind, Event, Grant, GroupId, KindEffect, Layer, MoveKind, RuleConfig, DEFAULT_VARIANT,
};

use crate::{
    entity::Entity,
    ledger::Change,
    movement::{self, MoveOutcome},
    World,
};

const STRAIGHT_VARIANT: i32 = 1;
const CORNER_VARIANT: i32 = 2;

/// Inventory and unlocked abilities of the player.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerStats {
    fragments: u32,
    max_length: u8,
    base_length: u8,
    length_cap: u8,
    colors: [bool; 3],
    abilities: [bool; 4],
    ability_locations: Vec<Coord>,
}

impl PlayerStats {
    pub(crate) fn new(config: &RuleConfig) -> Self {
        Self {
            fragments: 0,
            max_length: config.base_length,
            base_length: config.base_length,
            length_cap: config.length_cap.max(config.base_length),
            colors: [false; 3],
            abilities: [false; 4],
            ability_locations: Vec::new(),
        }
    }

    /// Gate fragments carried.
    #[must_use]
    pub fn fragments(&self) -> u32 {
        self.fragments
    }

    /// Longest body length currently reachable.
    #[must_use]
    pub fn max_length(&self) -> u8 {
        self.max_length
    }

    /// Reports whether shots of the colour are unlocked.
    #[must_use]
    pub fn has_color(&self, color: CrystalColor) -> bool {
        self.colors[color.index()]
    }

    /// Reports whether the ability is unlocked.
    #[must_use]
    pub fn has_ability(&self, ability: Ability) -> bool {
        self.abilities[ability.index()]
    }

    /// Cells whose pickups have been collected.
    #[must_use]
    pub fn ability_locations(&self) -> &[Coord] {
        &self.ability_locations
    }

    /// Applies a pickup and returns the concrete effect for the ledger.
    pub(crate) fn grant(&mut self, collectible: Collectible, coord: Coord) -> Grant {
        self.ability_locations.push(coord);
        match collectible {
            Collectible::Fragment => {
                self.fragments += 1;
                Grant::Fragment
            }
            Collectible::Length => {
                self.abilities[Ability::Grow.index()] = true;
                let extended = self.max_length < self.length_cap;
                if extended {
                    self.max_length += 1;
                }
                Grant::Length { extended }
            }
            Collectible::Time => {
                let ability = if self.has_ability(Ability::Undo) {
                    Ability::Reset
                } else {
                    Ability::Undo
                };
                self.abilities[ability.index()] = true;
                Grant::Time(ability)
            }
            Collectible::Color(color) => {
                self.colors[color.index()] = true;
                self.abilities[Ability::Shoot.index()] = true;
                Grant::Color(color)
            }
        }
    }

    /// Reverses a grant recorded by [`PlayerStats::grant`].
    pub(crate) fn revoke(&mut self, grant: Grant, coord: Coord) {
        self.forget_location(coord);
        match grant {
            Grant::Fragment => self.fragments = self.fragments.saturating_sub(1),
            Grant::Length { extended } => {
                if extended {
                    self.max_length = self.max_length.saturating_sub(1);
                }
                self.abilities[Ability::Grow.index()] = self.max_length != self.base_length;
            }
            Grant::Color(color) => {
                self.colors[color.index()] = false;
                self.abilities[Ability::Shoot.index()] = self.colors.iter().any(|unlocked| *unlocked);
            }
            Grant::Time(ability) => self.abilities[ability.index()] = false,
        }
    }

    pub(crate) fn take_fragment(&mut self) {
        self.fragments = self.fragments.saturating_sub(1);
    }

    pub(crate) fn return_fragment(&mut self) {
        self.fragments += 1;
    }

    pub(crate) fn remember_location(&mut self, coord: Coord) {
        self.ability_locations.push(coord);
    }

    pub(crate) fn forget_location(&mut self, coord: Coord) {
        if let Some(position) = self
            .ability_locations
            .iter()
            .position(|location| *location == coord)
        {
            let _ = self.ability_locations.remove(position);
        }
    }
}

fn refuse(reason: BlockedReason, out_events: &mut Vec<Event>) {
    tracing::debug!(?reason, "player action blocked");
    out_events.push(Event::ActionBlocked { reason });
}

/// Moves the body one cell: the head advances and every segment takes the cell ahead of it.
pub(crate) fn crawl(world: &mut World, direction: Direction, out_events: &mut Vec<Event>) {
    let body = world.player_body();
    let (Some(group), Some(head)) = (
        world.player,
        body.first().and_then(|id| world.index.entity(*id)).cloned(),
    ) else {
        refuse(BlockedReason::NoPlayer, out_events);
        return;
    };
    let next = head.coord().step(direction);

    for layer in [Layer::Tunnel, Layer::Player] {
        if let Some(obstacle) = world.index.get(next, layer) {
            refuse(BlockedReason::Stopped { obstacle }, out_events);
            return;
        }
    }

    let meal = world.index.get(next, Layer::Collectible);
    if meal.is_none() && world.stats.fragments() > 0 && direction == head.facing() {
        let slot = world
            .index
            .get(next, Layer::Misc)
            .filter(|id| world.index.entity(*id).map(Entity::effect) == Some(KindEffect::GateSlot));
        if slot.is_some() {
            place_fragment(world, next, out_events);
            return;
        }
    }

    let mut joined_push = false;
    if let Some(block) = world.index.get(next, Layer::Block) {
        match movement::try_move(world, block, direction, MoveKind::Player, out_events) {
            MoveOutcome::Moved(_) => joined_push = true,
            MoveOutcome::Blocked(_) => return,
        }
    }
    if !joined_push {
        let _ = world.ledger.open_history();
    }

    let snapshots: Vec<Entity> = body
        .iter()
        .filter_map(|id| world.index.entity(*id).cloned())
        .collect();
    let old_coords: Vec<Coord> = snapshots.iter().map(Entity::coord).collect();
    let destinations: Vec<Coord> = std::iter::once(next)
        .chain(old_coords.iter().copied())
        .take(snapshots.len())
        .collect();

    let group_slot = {
        let coords = world.groups.coords(group);
        world.ledger.current().intern_group(group, coords)
    };
    for (snapshot, destination) in snapshots.iter().zip(&destinations) {
        world.ledger.push_change(Change::Move {
            entity: snapshot.id(),
            snapshot: snapshot.clone(),
            destination: *destination,
            group_snapshot: Some(group_slot),
        });
    }

    if let Some(meal) = meal {
        eat(world, meal, out_events);
    }

    world.index.set_facing(head.id(), direction);
    for position in (1..snapshots.len()).rev() {
        let own = snapshots[position].facing();
        let ahead = if position == 1 {
            direction
        } else {
            snapshots[position - 1].facing()
        };
        let variant = if own == ahead {
            STRAIGHT_VARIANT
        } else {
            CORNER_VARIANT
        };
        world.index.set_variant(snapshots[position].id(), variant);
        world.index.set_facing(snapshots[position].id(), ahead);
    }

    for (snapshot, destination) in snapshots.iter().zip(&destinations) {
        let moved = world.index.move_to(snapshot.id(), *destination);
        if !moved {
            tracing::error!(entity = snapshot.id().get(), ?destination, "segment collided");
        }
        debug_assert!(moved, "segment collided at {destination:?}");
        out_events.push(Event::EntityMoved {
            entity: snapshot.id(),
            from: snapshot.coord(),
            to: *destination,
        });
    }
    world.groups.set(group, destinations.clone());

    close_temporary_doors(world, out_events);
    if world.fly_mode
        && !destinations
            .iter()
            .any(|coord| world.index.get(*coord, Layer::Tunnel).is_some())
    {
        world.fly_mode = false;
    }

    out_events.push(Event::PlayerCrawled {
        direction,
        ate: meal,
    });
}

/// Grows the body toward `direction`, or shrinks it when moving against the head.
pub(crate) fn grow(world: &mut World, direction: Direction, out_events: &mut Vec<Event>) {
    let body = world.player_body();
    let (Some(group), Some(head)) = (
        world.player,
        body.first().and_then(|id| world.index.entity(*id)).cloned(),
    ) else {
        refuse(BlockedReason::NoPlayer, out_events);
        return;
    };
    let length = body.len();
    let base_length = usize::from(world.config.base_length);

    if length > base_length && direction == head.facing().opposite() {
        shrink(world, group, &head, &body, direction, out_events);
        return;
    }
    if length >= usize::from(world.stats.max_length()) || direction == head.facing().opposite() {
        refuse(BlockedReason::LengthLimit, out_events);
        return;
    }

    let next = head.coord().step(direction);
    for layer in [Layer::Tunnel, Layer::Player] {
        if let Some(obstacle) = world.index.get(next, layer) {
            refuse(BlockedReason::Stopped { obstacle }, out_events);
            return;
        }
    }

    let meal = world.index.get(next, Layer::Collectible);
    let mut joined_push = false;
    if let Some(block) = world.index.get(next, Layer::Block) {
        match movement::try_move(world, block, direction, MoveKind::Player, out_events) {
            MoveOutcome::Moved(_) => joined_push = true,
            MoveOutcome::Blocked(_) => return,
        }
    }
    if !joined_push {
        let _ = world.ledger.open_history();
    }

    let moved = world.index.move_to(head.id(), next);
    debug_assert!(moved, "head collided at {next:?}");
    world.index.set_facing(head.id(), direction);
    out_events.push(Event::EntityMoved {
        entity: head.id(),
        from: head.coord(),
        to: next,
    });

    let follower_facing = body
        .get(1)
        .and_then(|id| world.index.entity(*id))
        .map_or(direction, Entity::facing);
    let variant = if follower_facing == direction {
        STRAIGHT_VARIANT
    } else {
        CORNER_VARIANT
    };
    let mut segment = Entity::new(EntityKind::Player, head.coord(), direction, variant);
    segment.group = Some(group);
    let Some(segment_id) = world.index.spawn(segment) else {
        tracing::error!(coord = ?head.coord(), "new segment collided");
        return;
    };
    let Some(segment) = world.index.entity(segment_id).cloned() else {
        return;
    };

    let mut coords = world.groups.coords(group).to_vec();
    coords.insert(1, head.coord());
    coords[0] = next;
    world.groups.set(group, coords);

    world.ledger.push_change(Change::Grow {
        direction,
        segment,
        head_facing: head.facing(),
        shrank: false,
    });
    out_events.push(Event::EntityPlaced {
        entity: segment_id,
        coord: head.coord(),
    });

    if let Some(meal) = meal {
        eat(world, meal, out_events);
    }

    world.refresh_representatives();
    out_events.push(Event::PlayerGrew {
        direction,
        length: length + 1,
    });
}

fn shrink(
    world: &mut World,
    group: GroupId,
    head: &Entity,
    body: &[EntityId],
    direction: Direction,
    out_events: &mut Vec<Event>,
) {
    let (Some(follower), Some(trailing)) = (body.get(1).copied(), body.get(2).copied()) else {
        refuse(BlockedReason::LengthLimit, out_events);
        return;
    };
    let Some(follower_coord) = world.index.entity(follower).map(Entity::coord) else {
        return;
    };
    if let Some(obstacle) = world.index.get(follower_coord, Layer::Tunnel) {
        refuse(BlockedReason::Stopped { obstacle }, out_events);
        return;
    }
    let trailing_facing = world
        .index
        .entity(trailing)
        .map_or(head.facing(), Entity::facing);

    let Some(segment) = world.index.despawn(follower) else {
        return;
    };
    let _ = world.ledger.open_history();
    world.ledger.push_change(Change::Grow {
        direction,
        segment,
        head_facing: head.facing(),
        shrank: true,
    });
    out_events.push(Event::EntityRemoved { entity: follower });

    let destination = head.coord().step(direction);
    let moved = world.index.move_to(head.id(), destination);
    debug_assert!(moved, "head collided at {destination:?}");
    world.index.set_facing(head.id(), trailing_facing);
    out_events.push(Event::EntityMoved {
        entity: head.id(),
        from: head.coord(),
        to: destination,
    });

    let mut coords = world.groups.coords(group).to_vec();
    let _ = coords.remove(1);
    coords[0] = destination;
    let length = coords.len();
    world.groups.set(group, coords);

    world.refresh_representatives();
    out_events.push(Event::PlayerShrank { direction, length });
}

/// Destroys a collectible and applies its effect.
fn eat(world: &mut World, meal: EntityId, out_events: &mut Vec<Event>) {
    let Some((coord, KindEffect::Collectible(collectible))) = world
        .index
        .entity(meal)
        .map(|entity| (entity.coord(), entity.effect()))
    else {
        return;
    };
    if !world.destroy(meal, out_events) {
        return;
    }
    let grant = world.stats.grant(collectible, coord);
    world.ledger.push_change(Change::Collect { grant, coord });
    tracing::debug!(?grant, ?coord, "collected");
    out_events.push(Event::AbilityCollected { grant, coord });
}

/// Spends a fragment on the slot at `coord`.
fn place_fragment(world: &mut World, coord: Coord, out_events: &mut Vec<Event>) {
    let remnant = world.index.list_at(coord).and_then(|ids| {
        ids.iter().copied().find(|id| {
            world.index.entity(*id).is_some_and(|entity| {
                entity.layer() == Layer::CollectibleDestroyed
                    && entity.kind() == EntityKind::CollectFragment
            })
        })
    });

    let _ = world.ledger.open_history();
    match remnant {
        Some(fragment) => {
            if !world.index.set_layer(fragment, Layer::Collectible) {
                return;
            }
            world.index.set_destroyed(fragment, false);
            world.stats.forget_location(coord);
            world.ledger.push_change(Change::Place {
                entity: fragment,
                coord,
                revived: true,
            });
            out_events.push(Event::EntityRestored { entity: fragment });
        }
        None => {
            let entity = Entity::new(
                EntityKind::CollectFragment,
                coord,
                Direction::Right,
                DEFAULT_VARIANT,
            );
            let Some(fragment) = world.index.spawn(entity) else {
                return;
            };
            world.ledger.push_change(Change::Place {
                entity: fragment,
                coord,
                revived: false,
            });
            out_events.push(Event::EntityPlaced {
                entity: fragment,
                coord,
            });
        }
    }
    world.stats.take_fragment();
}

/// Closes temporarily open doors the body has left.
fn close_temporary_doors(world: &mut World, out_events: &mut Vec<Event>) {
    let doors: Vec<EntityId> = world
        .index
        .iter()
        .filter(|entity| {
            entity.effect() == KindEffect::Door
                && DoorState::from_variant(entity.variant()) == DoorState::TemporarilyOpen
                && world.index.get(entity.coord(), Layer::Player).is_none()
        })
        .map(Entity::id)
        .collect();

    for door in doors {
        world.index.set_variant(door, DoorState::Closed.variant());
        world.ledger.push_change(Change::TempDoorReopen { door });
        out_events.push(Event::DoorChanged {
            door,
            state: DoorState::Closed,
        });
    }
}
