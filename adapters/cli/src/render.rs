//! Plain-text board drawing.

use burrow_core::{ButtonState, Collectible, Coord, CrystalColor, EntityKind, KindEffect, Layer};
use burrow_world::{query, Entity, World};

/// Layers drawn, front to back.
const DRAW_ORDER: [Layer; 5] = [
    Layer::Player,
    Layer::Block,
    Layer::Tunnel,
    Layer::Collectible,
    Layer::Misc,
];

/// Draws the occupied rectangle of the world, top row first.
pub(crate) fn board(world: &World) -> String {
    let Some((min, max)) = query::bounds(world) else {
        return String::new();
    };
    let head = query::player_body(world).first().copied();

    let mut text = String::new();
    for y in (min.y()..=max.y()).rev() {
        for x in min.x()..=max.x() {
            let cell = DRAW_ORDER
                .iter()
                .find_map(|layer| query::entity_at(world, Coord::new(x, y), *layer))
                .and_then(|id| query::entity(world, id))
                .map_or('.', |entity| glyph(entity, Some(entity.id()) == head));
            text.push(cell);
        }
        text.push('\n');
    }
    text
}

fn glyph(entity: &Entity, is_head: bool) -> char {
    match entity.kind() {
        EntityKind::Player if is_head => '@',
        EntityKind::Player => 'o',
        EntityKind::Ground | EntityKind::Edge => '#',
        EntityKind::Rock => 'O',
        EntityKind::Gate => 'H',
        EntityKind::Tunnel => '=',
        EntityKind::Empty => ' ',
        _ => effect_glyph(entity),
    }
}

fn effect_glyph(entity: &Entity) -> char {
    match entity.effect() {
        KindEffect::Crystal(color) => color_letter(color).to_ascii_uppercase(),
        KindEffect::Button(color) => {
            if ButtonState::from_variant(entity.variant()).is_active() {
                '^'
            } else {
                color_letter(color)
            }
        }
        KindEffect::Collectible(Collectible::Fragment) => '*',
        KindEffect::Collectible(Collectible::Length) => '+',
        KindEffect::Collectible(Collectible::Time) => 't',
        KindEffect::Collectible(Collectible::Color(_)) => '$',
        KindEffect::GateSlot => 's',
        KindEffect::Door => '|',
        KindEffect::None => '.',
    }
}

fn color_letter(color: CrystalColor) -> char {
    match color {
        CrystalColor::Red => 'r',
        CrystalColor::Green => 'g',
        CrystalColor::Blue => 'b',
    }
}

#[cfg(test)]
mod tests {
    use super::board;
    use burrow_core::{Coord, EntityKind, EntityRecord, RuleConfig};
    use burrow_world::World;

    #[test]
    fn draws_the_worm_above_the_ground() {
        let body = vec![Coord::new(2, 1), Coord::new(1, 1), Coord::new(0, 1)];
        let mut records: Vec<EntityRecord> = body
            .iter()
            .map(|coord| EntityRecord::new(EntityKind::Player, *coord).with_group(body.clone()))
            .collect();
        records.extend((0..=4).map(|x| EntityRecord::new(EntityKind::Ground, Coord::new(x, 0))));
        records.push(EntityRecord::new(EntityKind::BlueCrystal, Coord::new(4, 2)));
        records.push(EntityRecord::new(EntityKind::RedButton, Coord::new(3, 1)));
        let world = World::from_records(&records, RuleConfig::default()).expect("level must load");

        assert_eq!(board(&world), "....B\noo@r.\n#####\n");
    }

    #[test]
    fn empty_worlds_draw_nothing() {
        assert_eq!(board(&World::default()), "");
    }
}
