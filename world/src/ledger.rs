//! Append-only record of reversible world mutations.

use burrow_core::{ButtonState, Coord, Direction, EntityId, Grant, GroupId, Layer};

use crate::entity::Entity;

/// Single reversible mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Change {
    /// Entity moved to `destination`; `snapshot` is its state before the move.
    Move {
        entity: EntityId,
        snapshot: Entity,
        destination: Coord,
        group_snapshot: Option<usize>,
    },
    /// Player body grew or shrank by one segment.
    Grow {
        direction: Direction,
        segment: Entity,
        head_facing: Direction,
        shrank: bool,
    },
    /// Entity was moved onto a remnant layer from `layer`.
    Destroy { entity: EntityId, layer: Layer },
    /// Collectible effect was applied.
    Collect { grant: Grant, coord: Coord },
    /// Fragment was placed into a slot.
    Place {
        entity: EntityId,
        coord: Coord,
        revived: bool,
    },
    /// Button state changed from `previous`.
    ButtonToggle {
        button: EntityId,
        previous: ButtonState,
    },
    /// Temporarily open door closed behind the player.
    TempDoorReopen { door: EntityId },
}

/// Changes produced by one logical step.
#[derive(Clone, Debug, Default)]
pub(crate) struct History {
    pub(crate) changes: Vec<Change>,
    pub(crate) rollbacks: u32,
    group_snapshots: Vec<(GroupId, Vec<Coord>)>,
}

impl History {
    /// Returns the slot of the group's snapshot, taking one on first reference.
    pub(crate) fn intern_group(&mut self, group: GroupId, coords: &[Coord]) -> usize {
        if let Some(slot) = self
            .group_snapshots
            .iter()
            .position(|(candidate, _)| *candidate == group)
        {
            return slot;
        }
        self.group_snapshots.push((group, coords.to_vec()));
        self.group_snapshots.len() - 1
    }

    pub(crate) fn group_snapshot(&self, slot: usize) -> Option<&(GroupId, Vec<Coord>)> {
        self.group_snapshots.get(slot)
    }
}

/// Stack of histories with an action boundary marker.
#[derive(Debug, Default)]
pub(crate) struct Ledger {
    histories: Vec<History>,
    open: bool,
    action_start: usize,
}

impl Ledger {
    /// Closes the current history and marks the start of a user action.
    pub(crate) fn begin_action(&mut self) {
        self.open = false;
        self.action_start = self.histories.len();
    }

    /// Starts a fresh history that subsequent changes append to.
    pub(crate) fn open_history(&mut self) -> &mut History {
        self.histories.push(History::default());
        self.open = true;
        let index = self.histories.len() - 1;
        &mut self.histories[index]
    }

    /// History changes are currently appended to, opening one when needed.
    pub(crate) fn current(&mut self) -> &mut History {
        if !self.open || self.histories.is_empty() {
            return self.open_history();
        }
        let index = self.histories.len() - 1;
        &mut self.histories[index]
    }

    pub(crate) fn push_change(&mut self, change: Change) {
        self.current().changes.push(change);
    }

    pub(crate) fn is_open(&self) -> bool {
        self.open && !self.histories.is_empty()
    }

    pub(crate) fn close(&mut self) {
        self.open = false;
    }

    /// Adds rollbacks to the newest history.
    pub(crate) fn add_rollbacks(&mut self, rollbacks: u32) {
        if let Some(newest) = self.histories.last_mut() {
            newest.rollbacks = newest.rollbacks.saturating_add(rollbacks);
        }
    }

    pub(crate) fn pop(&mut self) -> Option<History> {
        let history = self.histories.pop()?;
        self.action_start = self.action_start.min(self.histories.len());
        Some(history)
    }

    pub(crate) fn len(&self) -> usize {
        self.histories.len()
    }

    /// Histories recorded since the last action boundary.
    pub(crate) fn histories_in_action(&self) -> usize {
        self.histories.len() - self.action_start
    }

    pub(crate) fn newest(&self) -> Option<&History> {
        self.histories.last()
    }
}
