//! Entity state and the arena of rigid group records.

use burrow_core::{Coord, Direction, EntityId, EntityKind, GroupId, KindEffect, Layer, TagSet};

/// Snapshot of a single entity as stored in the arena.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entity {
    pub(crate) id: EntityId,
    pub(crate) kind: EntityKind,
    pub(crate) facing: Direction,
    pub(crate) variant: i32,
    pub(crate) destroyed: bool,
    pub(crate) coord: Coord,
    pub(crate) layer: Layer,
    pub(crate) tags: TagSet,
    pub(crate) group: Option<GroupId>,
}

impl Entity {
    /// Builds a live entity of the given kind before it receives an identifier.
    pub(crate) fn new(kind: EntityKind, coord: Coord, facing: Direction, variant: i32) -> Self {
        let descriptor = kind.descriptor();
        Self {
            id: EntityId::new(0),
            kind,
            facing,
            variant,
            destroyed: false,
            coord,
            layer: descriptor.layer,
            tags: descriptor.tags,
            group: None,
        }
    }

    /// Identifier of the entity.
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Kind the entity was created as.
    #[must_use]
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Direction the entity faces.
    #[must_use]
    pub fn facing(&self) -> Direction {
        self.facing
    }

    /// Tiling variant, button state or door state.
    #[must_use]
    pub fn variant(&self) -> i32 {
        self.variant
    }

    /// Reports whether the entity was destroyed.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Cell occupied by the entity.
    #[must_use]
    pub fn coord(&self) -> Coord {
        self.coord
    }

    /// Layer the entity currently occupies.
    #[must_use]
    pub fn layer(&self) -> Layer {
        self.layer
    }

    /// Capability tags of the entity.
    #[must_use]
    pub fn tags(&self) -> TagSet {
        self.tags
    }

    /// Rigid group the entity belongs to, if any.
    #[must_use]
    pub fn group(&self) -> Option<GroupId> {
        self.group
    }

    /// Behaviour attached to the entity's kind.
    #[must_use]
    pub fn effect(&self) -> KindEffect {
        self.kind.descriptor().effect
    }

    /// Reports whether both entities belong to the same rigid body.
    pub(crate) fn same_body(&self, other: &Entity) -> bool {
        match (self.group, other.group) {
            (Some(lhs), Some(rhs)) => lhs == rhs,
            _ => self.id == other.id,
        }
    }
}

/// Arena of group records, each the ordered coordinate list of one rigid body.
#[derive(Clone, Debug, Default)]
pub(crate) struct Groups {
    records: Vec<Vec<Coord>>,
}

impl Groups {
    pub(crate) fn insert(&mut self, coords: Vec<Coord>) -> GroupId {
        let id = GroupId::new(self.records.len() as u32);
        self.records.push(coords);
        id
    }

    pub(crate) fn coords(&self, id: GroupId) -> &[Coord] {
        self.records
            .get(id.get() as usize)
            .map_or(&[], Vec::as_slice)
    }

    pub(crate) fn set(&mut self, id: GroupId, coords: Vec<Coord>) {
        if let Some(record) = self.records.get_mut(id.get() as usize) {
            *record = coords;
        }
    }

    pub(crate) fn offset(&mut self, id: GroupId, direction: Direction) {
        if let Some(record) = self.records.get_mut(id.get() as usize) {
            for coord in record.iter_mut() {
                *coord = coord.step(direction);
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }
}
