//! Building a world from persisted entity records.

use std::collections::HashMap;

use burrow_core::{Coord, Direction, EntityKind, EntityRecord, GroupId, Layer, RuleConfig, Tag};

use crate::{entity::Entity, World};

/// Reasons a list of records cannot form a level.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LevelError {
    /// Two live records share a layer at one cell.
    #[error("two live entities share layer {layer:?} at {coord:?}")]
    Overlap {
        /// Contested cell.
        coord: Coord,
        /// Contested layer.
        layer: Layer,
    },
    /// A record's group does not list the record's own cell.
    #[error("entity at {coord:?} is missing from its own group")]
    NotInGroup {
        /// Cell of the record.
        coord: Coord,
    },
    /// A group was attached to a kind that never connects.
    #[error("{kind:?} at {coord:?} cannot belong to a group")]
    UnexpectedGroup {
        /// Kind of the record.
        kind: EntityKind,
        /// Cell of the record.
        coord: Coord,
    },
    /// Player segments belong to more than one body.
    #[error("level contains more than one player body")]
    MultiplePlayers,
    /// A facing index outside `0..4`.
    #[error("facing {facing} at {coord:?} is outside 0..4")]
    InvalidFacing {
        /// Cell of the record.
        coord: Coord,
        /// Offending facing index.
        facing: u8,
    },
}

impl World {
    /// Builds a world from an ordered record list.
    ///
    /// Records sharing an identical group coordinate list form one rigid
    /// body. Connecting records without a group become singleton bodies.
    pub fn from_records(records: &[EntityRecord], config: RuleConfig) -> Result<Self, LevelError> {
        let mut world = World::new(config);
        let mut interned: HashMap<Vec<Coord>, GroupId> = HashMap::new();

        for record in records {
            let coord = record.coord;
            let facing = Direction::from_facing(record.facing).ok_or(LevelError::InvalidFacing {
                coord,
                facing: record.facing,
            })?;
            let mut entity = Entity::new(record.kind, coord, facing, record.variant);
            if record.destroyed {
                entity.destroyed = true;
                entity.layer = entity.layer.remnant();
            }

            let connects = entity.tags.contains(Tag::Connect);
            entity.group = match &record.group {
                Some(_) if !connects => {
                    return Err(LevelError::UnexpectedGroup {
                        kind: record.kind,
                        coord,
                    })
                }
                Some(coords) if !coords.contains(&coord) => {
                    return Err(LevelError::NotInGroup { coord })
                }
                Some(coords) => Some(
                    *interned
                        .entry(coords.clone())
                        .or_insert_with(|| world.groups.insert(coords.clone())),
                ),
                None if connects => Some(world.groups.insert(vec![coord])),
                None => None,
            };

            if record.kind == EntityKind::Player && !record.destroyed {
                match world.player {
                    Some(existing) if Some(existing) != entity.group => {
                        return Err(LevelError::MultiplePlayers)
                    }
                    _ => world.player = entity.group,
                }
            }

            let layer = entity.layer;
            let _ = world
                .index
                .spawn(entity)
                .ok_or(LevelError::Overlap { coord, layer })?;
        }

        world.bounds = world.index.bounds();
        world.refresh_representatives();
        tracing::debug!(
            entities = records.len(),
            groups = world.groups.len(),
            representatives = world.representatives.len(),
            "level loaded"
        );
        Ok(world)
    }
}
