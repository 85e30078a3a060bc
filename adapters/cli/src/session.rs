//! Orchestrates the world and the pure systems for one player at a time.

use burrow_core::{Ability, Command, Event};
use burrow_system_buttons::Buttons;
use burrow_system_feedback::{Cue, Feedback};
use burrow_world::{self as world, query, World};

use crate::script::Action;

/// Everything one scripted action produced.
#[derive(Debug, Default)]
pub(crate) struct Outcome {
    pub(crate) events: Vec<Event>,
    pub(crate) cues: Vec<Cue>,
}

/// World plus the systems reacting to it.
#[derive(Debug)]
pub(crate) struct Session {
    world: World,
    buttons: Buttons,
    feedback: Feedback,
    free_play: bool,
}

impl Session {
    /// Wraps a freshly loaded world and settles its buttons.
    ///
    /// With `free_play` set, firing and undo no longer require their abilities.
    pub(crate) fn new(world: World, free_play: bool) -> Self {
        let mut session = Self {
            world,
            buttons: Buttons::new(),
            feedback: Feedback::new(),
            free_play,
        };
        let mut commands = Vec::new();
        session
            .buttons
            .refresh(&query::buttons(&session.world), &mut commands);
        let mut events = Vec::new();
        for command in commands {
            world::apply(&mut session.world, command, &mut events);
        }
        session
    }

    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    /// Runs one action to completion, gravity included.
    pub(crate) fn perform(&mut self, action: Action) -> Outcome {
        let mut outcome = Outcome::default();
        let command = match action {
            Action::Undo => {
                if !self.allows(Ability::Undo) {
                    return refused(action);
                }
                self.submit(Command::Undo { silent: false }, &mut outcome.events);
                self.feedback.handle(&outcome.events, &mut outcome.cues);
                return outcome;
            }
            Action::Crawl(direction) => Command::Crawl { direction },
            Action::Grow(direction) => Command::Grow { direction },
            Action::Fly(enabled) => Command::SetFlyMode { enabled },
            Action::Fire(direction) => {
                if !self.allows(Ability::Shoot) {
                    return refused(action);
                }
                let Some(origin) = query::player_body(&self.world)
                    .first()
                    .and_then(|head| query::entity(&self.world, *head))
                    .map(|head| head.coord())
                else {
                    return refused(action);
                };
                Command::Fire { origin, direction }
            }
        };

        self.submit(Command::BeginAction, &mut outcome.events);
        self.submit(command, &mut outcome.events);
        self.settle(&mut outcome.events);
        self.feedback.handle(&outcome.events, &mut outcome.cues);
        outcome
    }

    fn allows(&self, ability: Ability) -> bool {
        self.free_play || query::player_stats(&self.world).has_ability(ability)
    }

    /// Applies a command and lets the buttons react to what it caused.
    fn submit(&mut self, command: Command, events: &mut Vec<Event>) {
        let start = events.len();
        world::apply(&mut self.world, command, events);

        let mut commands = Vec::new();
        self.buttons
            .handle(&events[start..], &query::buttons(&self.world), &mut commands);
        for command in commands {
            world::apply(&mut self.world, command, events);
        }
    }

    /// Runs gravity to rest, then re-evaluates buttons once for the whole cascade.
    fn settle(&mut self, events: &mut Vec<Event>) {
        world::apply(&mut self.world, Command::ApplyGravity, events);

        let mut commands = Vec::new();
        self.buttons
            .refresh(&query::buttons(&self.world), &mut commands);
        for command in commands {
            world::apply(&mut self.world, command, events);
        }
    }
}

fn refused(action: Action) -> Outcome {
    tracing::debug!(%action, "action locked");
    Outcome {
        events: Vec::new(),
        cues: vec![Cue::Refusal],
    }
}
