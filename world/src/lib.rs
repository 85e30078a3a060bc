#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for the Burrow rule engine.
//!
//! The world owns the spatial index, the rigid group arena, the history
//! ledger and the gravity stepper. Every mutation enters through [`apply`],
//! and every observable outcome leaves as an [`Event`].

mod entity;
mod gravity;
mod ledger;
mod level;
mod movement;
mod player;
mod projectile;
mod spatial;
mod undo;

use burrow_core::{ButtonState, Command, Coord, EntityId, Event, GroupId, Layer, RuleConfig};

pub use entity::Entity;
pub use level::LevelError;
pub use player::PlayerStats;

use entity::Groups;
use gravity::GravityStepper;
use ledger::{Change, Ledger};
use spatial::SpatialIndex;

/// Represents the authoritative puzzle world.
#[derive(Debug)]
pub struct World {
    config: RuleConfig,
    index: SpatialIndex,
    bounds: Option<(Coord, Coord)>,
    groups: Groups,
    ledger: Ledger,
    gravity: GravityStepper,
    player: Option<GroupId>,
    stats: PlayerStats,
    representatives: Vec<EntityId>,
    fly_mode: bool,
    projectiles_cancelled: bool,
}

impl World {
    /// Creates an empty world governed by the provided rules.
    #[must_use]
    pub fn new(config: RuleConfig) -> Self {
        Self {
            stats: PlayerStats::new(&config),
            config,
            index: SpatialIndex::default(),
            bounds: None,
            groups: Groups::default(),
            ledger: Ledger::default(),
            gravity: GravityStepper::default(),
            player: None,
            representatives: Vec::new(),
            fly_mode: false,
            projectiles_cancelled: false,
        }
    }

    /// Player segments ordered head to tail.
    fn player_body(&self) -> Vec<EntityId> {
        self.player.map_or_else(Vec::new, |group| {
            self.groups
                .coords(group)
                .iter()
                .filter_map(|coord| self.index.get(*coord, Layer::Player))
                .collect()
        })
    }

    fn player_head(&self) -> Option<EntityId> {
        let group = self.player?;
        let head = *self.groups.coords(group).first()?;
        self.index.get(head, Layer::Player)
    }

    /// Live members of the rigid body the entity belongs to.
    fn body_members(&self, id: EntityId) -> Vec<EntityId> {
        let Some(entity) = self.index.entity(id) else {
            return Vec::new();
        };
        match entity.group() {
            Some(group) => self
                .groups
                .coords(group)
                .iter()
                .filter_map(|coord| self.index.get(*coord, entity.layer()))
                .collect(),
            None => vec![id],
        }
    }

    /// Reports whether the coordinate lies inside the level as loaded.
    fn in_bounds(&self, coord: Coord) -> bool {
        self.bounds.map_or(true, |(min, max)| {
            (min.x()..=max.x()).contains(&coord.x()) && (min.y()..=max.y()).contains(&coord.y())
        })
    }

    fn refresh_representatives(&mut self) {
        self.representatives = gravity::representatives(self);
    }

    /// Moves a live entity onto its remnant layer and records the change.
    fn destroy(&mut self, id: EntityId, out_events: &mut Vec<Event>) -> bool {
        let Some(layer) = self
            .index
            .entity(id)
            .filter(|entity| !entity.is_destroyed())
            .map(Entity::layer)
        else {
            return false;
        };
        if !self.index.set_layer(id, layer.remnant()) {
            return false;
        }
        self.index.set_destroyed(id, true);
        self.ledger.push_change(Change::Destroy { entity: id, layer });
        out_events.push(Event::EntityDestroyed { entity: id });
        true
    }

    fn set_button(&mut self, button: EntityId, state: ButtonState, out_events: &mut Vec<Event>) {
        let Some(previous) = self
            .index
            .entity(button)
            .map(|entity| ButtonState::from_variant(entity.variant()))
        else {
            out_events.push(Event::ActionBlocked {
                reason: burrow_core::BlockedReason::MissingEntity,
            });
            return;
        };
        if previous == state {
            return;
        }
        if self.ledger.is_open() {
            self.ledger
                .push_change(Change::ButtonToggle { button, previous });
        }
        self.index.set_variant(button, state.variant());
        out_events.push(Event::ButtonChanged { button, state });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(RuleConfig::default())
    }
}

/// Commands refused while a gravity cascade is still stepping.
fn is_player_action(command: &Command) -> bool {
    matches!(
        command,
        Command::BeginAction
            | Command::Crawl { .. }
            | Command::Grow { .. }
            | Command::Fire { .. }
            | Command::Undo { .. }
            | Command::Move {
                kind: burrow_core::MoveKind::Player,
                ..
            }
    )
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if world.gravity.is_stepping() && is_player_action(&command) {
        tracing::debug!(?command, "refused while gravity is settling");
        out_events.push(Event::ActionBlocked {
            reason: burrow_core::BlockedReason::Busy,
        });
        return;
    }

    match command {
        Command::BeginAction => {
            world.ledger.begin_action();
            world.projectiles_cancelled = false;
        }
        Command::Move {
            entity,
            direction,
            kind,
        } => {
            let _ = movement::try_move(world, entity, direction, kind, out_events);
        }
        Command::Crawl { direction } => player::crawl(world, direction, out_events),
        Command::Grow { direction } => player::grow(world, direction, out_events),
        Command::Fire { origin, direction } => {
            projectile::fire(world, origin, direction, out_events);
        }
        Command::CancelProjectiles => world.projectiles_cancelled = true,
        Command::SetButton { button, state } => world.set_button(button, state, out_events),
        Command::SetFlyMode { enabled } => world.fly_mode = enabled,
        Command::ApplyGravity => {
            gravity::begin(world, out_events);
            while gravity::step(world, out_events) {}
        }
        Command::BeginGravity => gravity::begin(world, out_events),
        Command::StepGravity => {
            let _ = gravity::step(world, out_events);
        }
        Command::Undo { silent } => undo::undo(world, silent, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{Entity, PlayerStats, World};
    use burrow_core::{
        ButtonState, Coord, CrystalColor, EntityId, EntityKind, EntityRecord, KindEffect, Layer,
        RuleConfig,
    };

    /// Rules the world was created with.
    #[must_use]
    pub fn config(world: &World) -> &RuleConfig {
        &world.config
    }

    /// Persistable description of every entity, in identifier order.
    #[must_use]
    pub fn records(world: &World) -> Vec<EntityRecord> {
        world
            .index
            .iter()
            .map(|entity| EntityRecord {
                kind: entity.kind(),
                facing: entity.facing().facing(),
                coord: entity.coord(),
                variant: entity.variant(),
                destroyed: entity.is_destroyed(),
                group: entity
                    .group()
                    .map(|group| world.groups.coords(group).to_vec()),
            })
            .collect()
    }

    /// Every entity in identifier order.
    pub fn entities(world: &World) -> impl Iterator<Item = &Entity> {
        world.index.iter()
    }

    /// Looks up an entity by identifier.
    #[must_use]
    pub fn entity(world: &World, id: EntityId) -> Option<&Entity> {
        world.index.entity(id)
    }

    /// Entity occupying the layer at the coordinate.
    #[must_use]
    pub fn entity_at(world: &World, coord: Coord, layer: Layer) -> Option<EntityId> {
        world.index.get(coord, layer)
    }

    /// Every entity registered at the coordinate.
    #[must_use]
    pub fn entities_at(world: &World, coord: Coord) -> &[EntityId] {
        world.index.list_at(coord).unwrap_or(&[])
    }

    /// Coordinates of the rigid body the entity belongs to.
    #[must_use]
    pub fn body_coords(world: &World, id: EntityId) -> Vec<Coord> {
        match world.index.entity(id) {
            Some(entity) => entity.group().map_or_else(
                || vec![entity.coord()],
                |group| world.groups.coords(group).to_vec(),
            ),
            None => Vec::new(),
        }
    }

    /// Player segments ordered head to tail.
    #[must_use]
    pub fn player_body(world: &World) -> Vec<EntityId> {
        world.player_body()
    }

    /// Inventory and abilities of the player.
    #[must_use]
    pub fn player_stats(world: &World) -> &PlayerStats {
        &world.stats
    }

    /// Reports whether the player ignores gravity.
    #[must_use]
    pub fn fly_mode(world: &World) -> bool {
        world.fly_mode
    }

    /// Cached gravity representatives in stepping order.
    #[must_use]
    pub fn representatives(world: &World) -> &[EntityId] {
        &world.representatives
    }

    /// Reports whether a gravity cascade is in progress.
    #[must_use]
    pub fn is_settling(world: &World) -> bool {
        world.gravity.is_stepping()
    }

    /// Number of histories in the ledger.
    #[must_use]
    pub fn history_len(world: &World) -> usize {
        world.ledger.len()
    }

    /// Rollback counter of the newest history.
    #[must_use]
    pub fn newest_rollbacks(world: &World) -> Option<u32> {
        world.ledger.newest().map(|history| history.rollbacks)
    }

    /// Smallest rectangle containing every cell occupied when the level was loaded.
    #[must_use]
    pub fn bounds(world: &World) -> Option<(Coord, Coord)> {
        world.bounds
    }

    /// Reports whether every gate slot holds a fragment.
    #[must_use]
    pub fn gate_complete(world: &World) -> bool {
        world
            .index
            .iter()
            .filter(|entity| entity.effect() == KindEffect::GateSlot)
            .all(|slot| world.index.get(slot.coord(), Layer::Collectible).is_some())
    }

    /// Captures every pressure button with the block resting on it.
    #[must_use]
    pub fn buttons(world: &World) -> Vec<ButtonSnapshot> {
        world
            .index
            .iter()
            .filter_map(|entity| match entity.effect() {
                KindEffect::Button(color) => Some(ButtonSnapshot {
                    id: entity.id(),
                    color,
                    state: ButtonState::from_variant(entity.variant()),
                    coord: entity.coord(),
                    resting: world
                        .index
                        .get(entity.coord(), Layer::Block)
                        .and_then(|id| world.index.entity(id))
                        .map(Entity::kind),
                }),
                _ => None,
            })
            .collect()
    }

    /// Immutable view of a pressure button.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct ButtonSnapshot {
        /// Identifier of the button.
        pub id: EntityId,
        /// Crystal colour that powers the button.
        pub color: CrystalColor,
        /// Current power state.
        pub state: ButtonState,
        /// Cell the button sits on.
        pub coord: Coord,
        /// Kind of the live block resting on the button, if any.
        pub resting: Option<EntityKind>,
    }
}
