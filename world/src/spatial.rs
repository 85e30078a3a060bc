//! Coordinate index enforcing one live entity per layer and cell.

use std::collections::BTreeMap;

use burrow_core::{Coord, Direction, EntityId, Layer};

use crate::entity::Entity;

/// Entity arena paired with a coordinate-keyed occupancy map.
///
/// The index is the only place that mutates entity positions and layers, so
/// uniqueness of live entities per (coordinate, layer) is checked here and
/// nowhere else.
#[derive(Clone, Debug, Default)]
pub(crate) struct SpatialIndex {
    cells: BTreeMap<Coord, Vec<EntityId>>,
    entities: Vec<Option<Entity>>,
}

impl SpatialIndex {
    /// Assigns a fresh identifier and registers the entity at its coordinate.
    pub(crate) fn spawn(&mut self, mut entity: Entity) -> Option<EntityId> {
        let id = EntityId::new(self.entities.len() as u32);
        entity.id = id;
        if self.occupied(entity.coord, entity.layer) {
            tracing::warn!(
                coord = ?entity.coord,
                layer = ?entity.layer,
                "refused to spawn onto an occupied cell"
            );
            return None;
        }
        self.entities.push(Some(entity));
        let _ = self.add(id);
        Some(id)
    }

    /// Removes the entity from the index and the arena, returning its last state.
    pub(crate) fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        let _ = self.remove(id);
        self.entities.get_mut(id.get() as usize)?.take()
    }

    /// Re-inserts a despawned entity under its original identifier.
    pub(crate) fn revive(&mut self, entity: Entity) -> bool {
        let id = entity.id;
        let vacant = self
            .entities
            .get(id.get() as usize)
            .is_some_and(Option::is_none);
        if !vacant || self.occupied(entity.coord, entity.layer) {
            return false;
        }
        *self.slot_mut(id) = Some(entity);
        self.add(id)
    }

    /// Registers an arena entity at its coordinate.
    pub(crate) fn add(&mut self, id: EntityId) -> bool {
        let Some(entity) = self.entity(id) else {
            return false;
        };
        let (coord, layer) = (entity.coord, entity.layer);
        if self.occupied(coord, layer) {
            tracing::warn!(entity = id.get(), ?coord, ?layer, "refused to add entity");
            return false;
        }
        let list = self.cells.entry(coord).or_default();
        if !list.contains(&id) {
            list.push(id);
        }
        true
    }

    /// Unregisters the entity from its coordinate, dropping empty lists.
    pub(crate) fn remove(&mut self, id: EntityId) -> bool {
        let Some(coord) = self.entity(id).map(|entity| entity.coord) else {
            return false;
        };
        let Some(list) = self.cells.get_mut(&coord) else {
            return false;
        };
        let Some(position) = list.iter().position(|candidate| *candidate == id) else {
            return false;
        };
        let _ = list.remove(position);
        if list.is_empty() {
            let _ = self.cells.remove(&coord);
        }
        true
    }

    /// Relocates the entity, refusing when the destination layer is taken.
    pub(crate) fn move_to(&mut self, id: EntityId, coord: Coord) -> bool {
        let Some(layer) = self.entity(id).map(|entity| entity.layer) else {
            return false;
        };
        if self.get(coord, layer).is_some_and(|occupant| occupant != id) && !layer.is_remnant() {
            tracing::warn!(entity = id.get(), ?coord, ?layer, "refused to move entity");
            return false;
        }
        let _ = self.remove(id);
        if let Some(entity) = self.slot_mut(id).as_mut() {
            entity.coord = coord;
        }
        self.add(id)
    }

    /// Re-slots the entity under a new layer with the same uniqueness rule.
    pub(crate) fn set_layer(&mut self, id: EntityId, layer: Layer) -> bool {
        let Some(coord) = self.entity(id).map(|entity| entity.coord) else {
            return false;
        };
        if self.occupied(coord, layer) {
            tracing::warn!(entity = id.get(), ?coord, ?layer, "refused to change layer");
            return false;
        }
        let _ = self.remove(id);
        if let Some(entity) = self.slot_mut(id).as_mut() {
            entity.layer = layer;
        }
        self.add(id)
    }

    /// Replaces an entity's full state with a snapshot and re-registers it.
    pub(crate) fn restore(&mut self, snapshot: Entity) -> bool {
        let id = snapshot.id;
        let _ = self.remove(id);
        let Some(slot) = self.entities.get_mut(id.get() as usize) else {
            return false;
        };
        *slot = Some(snapshot);
        self.add(id)
    }

    pub(crate) fn set_facing(&mut self, id: EntityId, facing: Direction) {
        if let Some(entity) = self.slot_mut(id).as_mut() {
            entity.facing = facing;
        }
    }

    pub(crate) fn set_variant(&mut self, id: EntityId, variant: i32) {
        if let Some(entity) = self.slot_mut(id).as_mut() {
            entity.variant = variant;
        }
    }

    pub(crate) fn set_destroyed(&mut self, id: EntityId, destroyed: bool) {
        if let Some(entity) = self.slot_mut(id).as_mut() {
            entity.destroyed = destroyed;
        }
    }

    /// Entity occupying the layer at the coordinate.
    pub(crate) fn get(&self, coord: Coord, layer: Layer) -> Option<EntityId> {
        self.list_at(coord)?
            .iter()
            .copied()
            .find(|id| self.entity(*id).is_some_and(|entity| entity.layer == layer))
    }

    /// Entities registered at the coordinate.
    pub(crate) fn list_at(&self, coord: Coord) -> Option<&[EntityId]> {
        self.cells.get(&coord).map(Vec::as_slice)
    }

    pub(crate) fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id.get() as usize)?.as_ref()
    }

    /// Live arena entities in identifier order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().flatten()
    }

    /// Smallest rectangle containing every registered coordinate.
    pub(crate) fn bounds(&self) -> Option<(Coord, Coord)> {
        let mut coords = self.cells.keys();
        let first = *coords.next()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x(), first.y(), first.x(), first.y());
        for coord in coords {
            min_x = min_x.min(coord.x());
            max_x = max_x.max(coord.x());
            min_y = min_y.min(coord.y());
            max_y = max_y.max(coord.y());
        }
        Some((Coord::new(min_x, min_y), Coord::new(max_x, max_y)))
    }

    fn occupied(&self, coord: Coord, layer: Layer) -> bool {
        !layer.is_remnant() && self.get(coord, layer).is_some()
    }

    fn slot_mut(&mut self, id: EntityId) -> &mut Option<Entity> {
        let index = id.get() as usize;
        if index >= self.entities.len() {
            self.entities.resize(index + 1, None);
        }
        &mut self.entities[index]
    }
}
