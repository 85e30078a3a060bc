#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system translating world outcomes into audio and particle cue descriptors.
//!
//! Presentation layers play the cues; the system itself never touches the world.

use burrow_core::{BlockedReason, EntityKind, Event, MoveKind};

/// Lowest pitch a landing can reach.
const MIN_LANDING_PITCH: f32 = 0.4;
/// Falls beyond this no longer add particles.
const MAX_PARTICLE_FALLS: u32 = 10;
/// Consecutive undos played at one pitch before it rises.
const UNDOS_PER_PITCH_STEP: u32 = 4;

/// Camera shake requested by a heavy landing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Shake {
    /// Number of oscillations, `1..=5`.
    pub shakes: u32,
    /// Displacement strength, `1..=7`.
    pub intensity: u32,
}

/// Presentation cue derived from world events.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Cue {
    /// Head nod and blocked sound for a refused player action.
    Refusal,
    /// Something came to rest after falling.
    Landing {
        /// Pitch multiplier of the landing sound.
        pitch: f32,
        /// Camera shake, for rocks only.
        shake: Option<Shake>,
        /// Dust particles to emit, if any.
        particles: Option<u32>,
    },
    /// A pushed block scraped along the ground.
    Scrape,
    /// A floating crystal moved.
    Hum,
    /// Time was rewound.
    Rewind {
        /// Pitch multiplier, rising while undos repeat.
        pitch: f32,
    },
}

/// Stateful cue generator tracking undo streaks and shake priority.
#[derive(Debug, Default, Clone)]
pub struct Feedback {
    undo_streak: u32,
    shake_priority: u32,
}

impl Feedback {
    /// Creates a new feedback system instance.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            undo_streak: 0,
            shake_priority: 0,
        }
    }

    /// Consumes world events and appends the cues they call for.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Cue>) {
        for event in events {
            match event {
                Event::MoveBlocked {
                    kind: MoveKind::Player,
                    ..
                } => out.push(Cue::Refusal),
                Event::ActionBlocked { reason } if *reason != BlockedReason::Busy => {
                    out.push(Cue::Refusal);
                }
                Event::NothingToUndo { silent: false } => {
                    self.undo_streak = 0;
                    out.push(Cue::Refusal);
                }
                Event::MoveCommitted {
                    ground_scrape,
                    float_moved,
                    ..
                } => {
                    if *ground_scrape {
                        out.push(Cue::Scrape);
                    }
                    if *float_moved {
                        out.push(Cue::Hum);
                    }
                }
                Event::GravityStarted { .. } => self.shake_priority = 0,
                Event::Landed {
                    kind, falls, size, ..
                } => out.push(self.landing(*kind, *falls, *size)),
                Event::UndoApplied { silent: false, .. } => {
                    self.undo_streak += 1;
                    out.push(Cue::Rewind {
                        pitch: rewind_pitch(self.undo_streak),
                    });
                }
                Event::PlayerCrawled { .. }
                | Event::PlayerGrew { .. }
                | Event::PlayerShrank { .. } => self.undo_streak = 0,
                _ => {}
            }
        }
    }

    fn landing(&mut self, kind: EntityKind, falls: u32, size: usize) -> Cue {
        let rock = kind == EntityKind::Rock;
        let size = u32::try_from(size).unwrap_or(u32::MAX);
        let priority = falls.saturating_mul(size);
        let shake = (rock && priority > self.shake_priority).then(|| {
            self.shake_priority = priority;
            Shake {
                shakes: falls.clamp(1, 5),
                intensity: size.clamp(1, 7),
            }
        });
        let particles = (rock || falls > 1).then(|| 20 + 5 * falls.min(MAX_PARTICLE_FALLS));

        Cue::Landing {
            pitch: landing_pitch(falls),
            shake,
            particles,
        }
    }
}

/// Pitch drops by a tenth for every two extra cells fallen.
#[must_use]
pub fn landing_pitch(falls: u32) -> f32 {
    let steps = falls.saturating_sub(1) / 2;
    (1.0 - 0.1 * steps as f32).clamp(MIN_LANDING_PITCH, 1.0)
}

/// Pitch rises by a tenth after every few consecutive undos.
#[must_use]
pub fn rewind_pitch(streak: u32) -> f32 {
    1.0 + 0.1 * (streak.saturating_sub(1) / UNDOS_PER_PITCH_STEP) as f32
}
