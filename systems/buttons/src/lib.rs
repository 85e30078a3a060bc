#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that keeps pressure buttons in step with the crystals resting on them.

use burrow_core::{ButtonState, Command, CrystalColor, EntityKind, Event, KindEffect, MoveKind};
use burrow_world::query::ButtonSnapshot;

/// Re-derives button power from the blocks resting on each button.
#[derive(Debug, Default, Clone, Copy)]
pub struct Buttons;

impl Buttons {
    /// Creates a new buttons system instance.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Consumes world events and emits `SetButton` commands when the board changed.
    ///
    /// Gravity moves alone never re-evaluate buttons; the caller runs the
    /// system once more after the cascade settles.
    pub fn handle(&mut self, events: &[Event], buttons: &[ButtonSnapshot], out: &mut Vec<Command>) {
        if events.iter().any(reevaluates) {
            self.refresh(buttons, out);
        }
    }

    /// Evaluates every button regardless of events, as needed after loading a level.
    pub fn refresh(&mut self, buttons: &[ButtonSnapshot], out: &mut Vec<Command>) {
        for color in CrystalColor::ALL {
            let mut releases = Vec::new();
            let mut presses = Vec::new();
            for button in buttons.iter().filter(|button| button.color == color) {
                match desired_state(button) {
                    Some(ButtonState::Off) => releases.push(button.id),
                    Some(state) => presses.push((button.id, state)),
                    None => {}
                }
            }

            if !releases.is_empty() || !presses.is_empty() {
                tracing::trace!(
                    ?color,
                    released = releases.len(),
                    pressed = presses.len(),
                    "buttons changed"
                );
            }
            out.extend(releases.into_iter().map(|button| Command::SetButton {
                button,
                state: ButtonState::Off,
            }));
            out.extend(
                presses
                    .into_iter()
                    .map(|(button, state)| Command::SetButton { button, state }),
            );
        }
    }
}

fn reevaluates(event: &Event) -> bool {
    match event {
        Event::MoveCommitted { kind, .. } => *kind != MoveKind::Gravity,
        Event::PlayerCrawled { .. }
        | Event::PlayerGrew { .. }
        | Event::PlayerShrank { .. }
        | Event::EntityDestroyed { .. }
        | Event::UndoApplied { .. } => true,
        _ => false,
    }
}

/// New state of the button, or `None` when it should stay as it is.
fn desired_state(button: &ButtonSnapshot) -> Option<ButtonState> {
    match button.resting {
        None => (button.state == ButtonState::Crystal).then_some(ButtonState::Off),
        Some(kind) if is_crystal_of(kind, button.color) => {
            (button.state != ButtonState::Crystal).then_some(ButtonState::Crystal)
        }
        Some(_) => (button.state == ButtonState::Projectile).then_some(ButtonState::Off),
    }
}

fn is_crystal_of(kind: EntityKind, color: CrystalColor) -> bool {
    kind.descriptor().effect == KindEffect::Crystal(color)
}
