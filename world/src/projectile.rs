//! Shots traced cell by cell from an origin.

use std::collections::VecDeque;

use burrow_core::{
    ButtonState, Coord, CrystalColor, Direction, EntityId, Event, KindEffect, Layer, MoveKind,
};

use crate::{movement, World};

const HIT_LAYERS: [Layer; 3] = [Layer::Block, Layer::Tunnel, Layer::Player];

/// Shots waiting to be traced within one `Fire` cascade.
#[derive(Debug, Default)]
struct Volley {
    pending: VecDeque<(Coord, Direction)>,
    activated: Vec<EntityId>,
}

/// Fires a shot and resolves whatever it strikes, including shots re-fired by red crystals.
///
/// Every history the cascade records beyond the first folds into one undo.
pub(crate) fn fire(world: &mut World, origin: Coord, direction: Direction, out_events: &mut Vec<Event>) {
    if world.projectiles_cancelled {
        out_events.push(Event::ProjectileCancelled);
        return;
    }

    clear_projectile_buttons(world, out_events);

    let opened_action = world.ledger.histories_in_action() == 0;
    let recorded = world.ledger.len();
    let mut volley = Volley::default();
    volley.pending.push_back((origin, direction));
    while let Some((origin, direction)) = volley.pending.pop_front() {
        trace_shot(world, origin, direction, &mut volley, out_events);
    }

    let created = u32::try_from(world.ledger.len().saturating_sub(recorded)).unwrap_or(u32::MAX);
    let rollbacks = if opened_action {
        created.saturating_sub(1)
    } else {
        created
    };
    if rollbacks > 0 {
        world.ledger.add_rollbacks(rollbacks);
    }
}

fn trace_shot(
    world: &mut World,
    origin: Coord,
    direction: Direction,
    volley: &mut Volley,
    out_events: &mut Vec<Event>,
) {
    let Some((min, max)) = world.bounds else {
        out_events.push(Event::ProjectileFaded { coord: origin });
        return;
    };
    let margin = i32::try_from(world.config.projectile_range).unwrap_or(i32::MAX);
    let inside = |coord: Coord| {
        coord.x() >= min.x().saturating_sub(margin)
            && coord.x() <= max.x().saturating_add(margin)
            && coord.y() >= min.y().saturating_sub(margin)
            && coord.y() <= max.y().saturating_add(margin)
    };

    let mut cell = origin;
    loop {
        cell = cell.step(direction);
        if !inside(cell) {
            tracing::debug!(?origin, ?direction, "shot faded");
            out_events.push(Event::ProjectileFaded { coord: cell });
            return;
        }

        let target = HIT_LAYERS
            .iter()
            .find_map(|layer| world.index.get(cell, *layer));
        if let Some(target) = target {
            resolve_hit(world, target, cell, direction, volley, out_events);
            return;
        }

        power_button(world, cell, out_events);
    }
}

fn clear_projectile_buttons(world: &mut World, out_events: &mut Vec<Event>) {
    let powered: Vec<EntityId> = world
        .index
        .iter()
        .filter(|entity| {
            matches!(entity.effect(), KindEffect::Button(_))
                && ButtonState::from_variant(entity.variant()) == ButtonState::Projectile
        })
        .map(|entity| entity.id())
        .collect();
    for button in powered {
        world.index.set_variant(button, ButtonState::Off.variant());
        out_events.push(Event::ButtonChanged {
            button,
            state: ButtonState::Off,
        });
    }
}

fn power_button(world: &mut World, cell: Coord, out_events: &mut Vec<Event>) {
    let Some(button) = world.index.get(cell, Layer::Misc) else {
        return;
    };
    let Some(entity) = world.index.entity(button) else {
        return;
    };
    let KindEffect::Button(color) = entity.effect() else {
        return;
    };
    if !world.stats.has_color(color)
        || ButtonState::from_variant(entity.variant()) == ButtonState::Projectile
    {
        return;
    }
    world.index.set_variant(button, ButtonState::Projectile.variant());
    out_events.push(Event::ButtonChanged {
        button,
        state: ButtonState::Projectile,
    });
}

fn resolve_hit(
    world: &mut World,
    target: EntityId,
    coord: Coord,
    direction: Direction,
    volley: &mut Volley,
    out_events: &mut Vec<Event>,
) {
    out_events.push(Event::ProjectileHit { target, coord });
    let Some(effect) = world.index.entity(target).map(|entity| entity.effect()) else {
        return;
    };

    match effect {
        KindEffect::Crystal(CrystalColor::Green) if world.stats.has_color(CrystalColor::Green) => {
            let _ = movement::try_move(world, target, direction, MoveKind::Block, out_events);
        }
        KindEffect::Crystal(CrystalColor::Blue) if world.stats.has_color(CrystalColor::Blue) => {
            shatter(world, target, out_events);
        }
        KindEffect::Crystal(CrystalColor::Red) if world.stats.has_color(CrystalColor::Red) => {
            if volley.activated.contains(&target) {
                return;
            }
            let members = world.body_members(target);
            for member in &members {
                let Some(entity) = world.index.entity(*member) else {
                    continue;
                };
                if is_nub(entity.variant()) {
                    volley.pending.push_back((entity.coord(), entity.facing()));
                }
            }
            tracing::debug!(crystal = target.get(), shots = volley.pending.len(), "red crystal fired");
            volley.activated.extend(members);
        }
        _ => {}
    }
}

/// Red crystal tiles whose variant shows a nub pointing along their facing.
fn is_nub(variant: i32) -> bool {
    variant >= 0 && variant % 3 == 0
}

/// Destroys every member of a crystal cluster in one fresh history.
fn shatter(world: &mut World, crystal: EntityId, out_events: &mut Vec<Event>) {
    let members = world.body_members(crystal);

    let _ = world.ledger.open_history();
    for member in members {
        let _ = world.destroy(member, out_events);
    }
    world.refresh_representatives();
}
