#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Burrow rule engine.
//!
//! This crate defines the vocabulary and the message surface that connects
//! adapters, the authoritative world, and pure systems. Adapters submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems and presentation layers to react to. Systems consume event
//! streams, query read-only views, and respond exclusively with new commands.

use serde::{Deserialize, Serialize};

/// Location of a single grid cell. Rows grow upward along `y`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    x: i32,
    y: i32,
}

impl Coord {
    /// Creates a new grid coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Column of the cell.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Row of the cell.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the neighbouring cell one step in the provided direction.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self::new(self.x + dx, self.y + dy)
    }

    /// Projects the coordinate onto the direction's axis.
    ///
    /// Larger values lie further along the direction of travel.
    #[must_use]
    pub const fn progress(self, direction: Direction) -> i64 {
        let (dx, dy) = direction.delta();
        self.x as i64 * dx as i64 + self.y as i64 * dy as i64
    }
}

/// Cardinal directions, listed in facing-index order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Toward increasing `x`. Facing index 0.
    Right,
    /// Toward increasing `y`. Facing index 1.
    Up,
    /// Toward decreasing `x`. Facing index 2.
    Left,
    /// Toward decreasing `y`. Facing index 3.
    Down,
}

impl Direction {
    /// Every direction in facing-index order.
    pub const ALL: [Direction; 4] = [
        Direction::Right,
        Direction::Up,
        Direction::Left,
        Direction::Down,
    ];

    /// Unit offset applied by a single step.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::Right => (1, 0),
            Direction::Up => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Down => (0, -1),
        }
    }

    /// Facing index in the range `0..4`.
    #[must_use]
    pub const fn facing(self) -> u8 {
        match self {
            Direction::Right => 0,
            Direction::Up => 1,
            Direction::Left => 2,
            Direction::Down => 3,
        }
    }

    /// Resolves a facing index, returning `None` outside `0..4`.
    #[must_use]
    pub const fn from_facing(facing: u8) -> Option<Self> {
        match facing {
            0 => Some(Direction::Right),
            1 => Some(Direction::Up),
            2 => Some(Direction::Left),
            3 => Some(Direction::Down),
            _ => None,
        }
    }

    /// Direction pointing the other way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Direction::Right => Direction::Left,
            Direction::Up => Direction::Down,
            Direction::Left => Direction::Right,
            Direction::Down => Direction::Up,
        }
    }

    /// Reports whether the direction moves along the `y` axis.
    #[must_use]
    pub const fn is_vertical(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }
}

/// Disjoint occupancy categories. Uniqueness is enforced per layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Layer {
    /// Buttons, slots, doors and panels.
    Misc,
    /// Solid terrain, rocks and crystals.
    Block,
    /// Tunnel segments.
    Tunnel,
    /// Player body segments.
    Player,
    /// Collectible ability pickups.
    Collectible,
    /// Remnants of destroyed blocks.
    BlockDestroyed,
    /// Remnants of eaten collectibles.
    CollectibleDestroyed,
    /// Decorative supports.
    Support,
    /// Near background.
    Background1,
    /// Far background.
    Background2,
}

impl Layer {
    /// Layers consulted when resolving collisions, in scan order.
    pub const COLLISION: [Layer; 3] = [Layer::Block, Layer::Player, Layer::Tunnel];

    /// Reports whether the layer holds destroyed remnants rather than live entities.
    ///
    /// Remnant layers may stack several entities on one cell.
    #[must_use]
    pub const fn is_remnant(self) -> bool {
        matches!(self, Layer::BlockDestroyed | Layer::CollectibleDestroyed)
    }

    /// Layer a destroyed entity of this layer is moved to.
    #[must_use]
    pub const fn remnant(self) -> Layer {
        match self {
            Layer::Block => Layer::BlockDestroyed,
            _ => Layer::CollectibleDestroyed,
        }
    }
}

/// Capability tags that drive polymorphic behaviour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tag {
    /// Part of the player's body.
    Player,
    /// Cannot be pushed and stops anything moving into it.
    Stop,
    /// Can be pushed by movement chains.
    Push,
    /// Belongs to a rigid multi-cell group.
    Connect,
    /// Ignores gravity and cannot be displaced by falling entities.
    Float,
}

impl Tag {
    const fn bit(self) -> u8 {
        match self {
            Tag::Player => 1,
            Tag::Stop => 1 << 1,
            Tag::Push => 1 << 2,
            Tag::Connect => 1 << 3,
            Tag::Float => 1 << 4,
        }
    }
}

/// Compact set of [`Tag`] values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TagSet(u8);

impl TagSet {
    /// Set without any tags.
    pub const EMPTY: TagSet = TagSet(0);

    /// Builds a set from the provided tags.
    #[must_use]
    pub const fn of(tags: &[Tag]) -> Self {
        let mut bits = 0;
        let mut index = 0;
        while index < tags.len() {
            bits |= tags[index].bit();
            index += 1;
        }
        Self(bits)
    }

    /// Returns a copy of the set with the tag added.
    #[must_use]
    pub const fn with(self, tag: Tag) -> Self {
        Self(self.0 | tag.bit())
    }

    /// Reports whether the tag is present.
    #[must_use]
    pub const fn contains(self, tag: Tag) -> bool {
        self.0 & tag.bit() != 0
    }

    /// Reports whether any of the tags is present.
    #[must_use]
    pub const fn contains_any(self, tags: &[Tag]) -> bool {
        self.0 & Self::of(tags).0 != 0
    }

    /// Pushable entities are tagged `Push` or `Player`.
    #[must_use]
    pub const fn is_pushable(self) -> bool {
        self.contains_any(&[Tag::Push, Tag::Player])
    }

    /// Reports whether the set is empty.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Crystal colours, which double as button colours and shot colours.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CrystalColor {
    /// Red crystals redirect shots.
    Red,
    /// Green crystals are pushed by shots.
    Green,
    /// Blue crystals shatter when shot.
    Blue,
}

impl CrystalColor {
    /// Every colour in index order.
    pub const ALL: [CrystalColor; 3] = [CrystalColor::Red, CrystalColor::Green, CrystalColor::Blue];

    /// Position of the colour in per-colour tables.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            CrystalColor::Red => 0,
            CrystalColor::Green => 1,
            CrystalColor::Blue => 2,
        }
    }
}

/// Player abilities unlocked by collectibles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ability {
    /// Fire projectiles.
    Shoot,
    /// Grow and shrink the body.
    Grow,
    /// Rewind history.
    Undo,
    /// Reset the room.
    Reset,
}

impl Ability {
    /// Position of the ability in per-ability tables.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Ability::Shoot => 0,
            Ability::Grow => 1,
            Ability::Undo => 2,
            Ability::Reset => 3,
        }
    }
}

/// Kind of pickup a collectible represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Collectible {
    /// Gate fragment added to the inventory.
    Fragment,
    /// Raises the maximum body length.
    Length,
    /// Unlocks the undo ability, then the reset ability.
    Time,
    /// Unlocks shots of the given colour.
    Color(CrystalColor),
}

/// Concrete effect recorded when a collectible is eaten.
///
/// Each variant has a matching reversal applied on undo.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Grant {
    /// One fragment was added to the inventory.
    Fragment,
    /// A length pickup was eaten. `extended` records whether the maximum grew.
    Length {
        /// Whether the current maximum length was raised.
        extended: bool,
    },
    /// A colour was unlocked.
    Color(CrystalColor),
    /// A time ability was unlocked.
    Time(Ability),
}

/// Behaviour attached to an entity kind beyond its tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KindEffect {
    /// Plain entity.
    None,
    /// Pressure button powered by crystals or shots of a colour.
    Button(CrystalColor),
    /// Crystal of a colour.
    Crystal(CrystalColor),
    /// Pickup eaten by the player.
    Collectible(Collectible),
    /// Slot that accepts a gate fragment.
    GateSlot,
    /// Tunnel door that may be left temporarily open.
    Door,
}

/// Static description of an entity kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KindDescriptor {
    /// Capability tags of the kind.
    pub tags: TagSet,
    /// Layer entities of the kind occupy.
    pub layer: Layer,
    /// Additional behaviour of the kind.
    pub effect: KindEffect,
}

/// Closed set of entity kinds that may appear in a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    /// Button activated by red crystals or red shots.
    RedButton,
    /// Button activated by green crystals or green shots.
    GreenButton,
    /// Button activated by blue crystals or blue shots.
    BlueButton,
    /// Unlocks red shots.
    CollectRed,
    /// Unlocks green shots.
    CollectGreen,
    /// Unlocks blue shots.
    CollectBlue,
    /// Raises the maximum body length.
    CollectLength,
    /// Unlocks time abilities.
    CollectTime,
    /// Gate fragment.
    CollectFragment,
    /// Floating red crystal cluster.
    RedCrystal,
    /// Floating green crystal cluster.
    GreenCrystal,
    /// Floating blue crystal cluster.
    BlueCrystal,
    /// Editor boundary marker.
    Edge,
    /// Editor placeholder.
    Empty,
    /// Closed gate.
    Gate,
    /// Slot accepting a gate fragment.
    GateSlot,
    /// Solid ground.
    Ground,
    /// Near background ground.
    #[serde(rename = "GroundBG1")]
    GroundBg1,
    /// Far background ground.
    #[serde(rename = "GroundBG2")]
    GroundBg2,
    /// Player body segment.
    Player,
    /// Pushable rock that falls.
    Rock,
    /// Decorative support.
    Support,
    /// Tunnel segment.
    Tunnel,
    /// Door guarding a tunnel.
    TunnelDoor,
    /// Panel displaying door requirements.
    TunnelPanel,
}

impl EntityKind {
    /// Resolves the kind's tags, layer and effect.
    #[must_use]
    pub const fn descriptor(self) -> KindDescriptor {
        const NONE: TagSet = TagSet::EMPTY;
        const CRYSTAL: TagSet = TagSet::of(&[Tag::Push, Tag::Connect, Tag::Float]);
        const STOP: TagSet = TagSet::of(&[Tag::Stop]);

        let (tags, layer, effect) = match self {
            EntityKind::RedButton => (NONE, Layer::Misc, KindEffect::Button(CrystalColor::Red)),
            EntityKind::GreenButton => {
                (NONE, Layer::Misc, KindEffect::Button(CrystalColor::Green))
            }
            EntityKind::BlueButton => (NONE, Layer::Misc, KindEffect::Button(CrystalColor::Blue)),
            EntityKind::CollectRed => (
                NONE,
                Layer::Collectible,
                KindEffect::Collectible(Collectible::Color(CrystalColor::Red)),
            ),
            EntityKind::CollectGreen => (
                NONE,
                Layer::Collectible,
                KindEffect::Collectible(Collectible::Color(CrystalColor::Green)),
            ),
            EntityKind::CollectBlue => (
                NONE,
                Layer::Collectible,
                KindEffect::Collectible(Collectible::Color(CrystalColor::Blue)),
            ),
            EntityKind::CollectLength => (
                NONE,
                Layer::Collectible,
                KindEffect::Collectible(Collectible::Length),
            ),
            EntityKind::CollectTime => (
                NONE,
                Layer::Collectible,
                KindEffect::Collectible(Collectible::Time),
            ),
            EntityKind::CollectFragment => (
                NONE,
                Layer::Collectible,
                KindEffect::Collectible(Collectible::Fragment),
            ),
            EntityKind::RedCrystal => (
                CRYSTAL,
                Layer::Block,
                KindEffect::Crystal(CrystalColor::Red),
            ),
            EntityKind::GreenCrystal => (
                CRYSTAL,
                Layer::Block,
                KindEffect::Crystal(CrystalColor::Green),
            ),
            EntityKind::BlueCrystal => (
                CRYSTAL,
                Layer::Block,
                KindEffect::Crystal(CrystalColor::Blue),
            ),
            EntityKind::Edge | EntityKind::Empty => (NONE, Layer::Block, KindEffect::None),
            EntityKind::Gate | EntityKind::Ground => (STOP, Layer::Block, KindEffect::None),
            EntityKind::GateSlot => (NONE, Layer::Misc, KindEffect::GateSlot),
            EntityKind::GroundBg1 => (NONE, Layer::Background1, KindEffect::None),
            EntityKind::GroundBg2 => (NONE, Layer::Background2, KindEffect::None),
            EntityKind::Player => (
                TagSet::of(&[Tag::Player, Tag::Connect, Tag::Stop]),
                Layer::Player,
                KindEffect::None,
            ),
            EntityKind::Rock => (
                TagSet::of(&[Tag::Push, Tag::Connect]),
                Layer::Block,
                KindEffect::None,
            ),
            EntityKind::Support => (NONE, Layer::Support, KindEffect::None),
            EntityKind::Tunnel => (
                TagSet::of(&[Tag::Connect, Tag::Stop]),
                Layer::Tunnel,
                KindEffect::None,
            ),
            EntityKind::TunnelDoor => (NONE, Layer::Misc, KindEffect::Door),
            EntityKind::TunnelPanel => (NONE, Layer::Misc, KindEffect::None),
        };

        KindDescriptor {
            tags,
            layer,
            effect,
        }
    }

    /// Capability tags of the kind.
    #[must_use]
    pub const fn tags(self) -> TagSet {
        self.descriptor().tags
    }

    /// Layer occupied by entities of the kind.
    #[must_use]
    pub const fn layer(self) -> Layer {
        self.descriptor().layer
    }
}

/// Variant value used by entities that carry no state.
pub const DEFAULT_VARIANT: i32 = -1;

/// Power state of a pressure button, stored in the entity variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ButtonState {
    /// Unpowered.
    Off,
    /// Held down by a crystal of the matching colour.
    Crystal,
    /// Powered by a shot passing over it.
    Projectile,
}

impl ButtonState {
    /// Decodes a button state from an entity variant.
    #[must_use]
    pub const fn from_variant(variant: i32) -> Self {
        match variant {
            0 => ButtonState::Crystal,
            1 => ButtonState::Projectile,
            _ => ButtonState::Off,
        }
    }

    /// Encodes the state as an entity variant.
    #[must_use]
    pub const fn variant(self) -> i32 {
        match self {
            ButtonState::Off => DEFAULT_VARIANT,
            ButtonState::Crystal => 0,
            ButtonState::Projectile => 1,
        }
    }

    /// Reports whether the button counts as pressed.
    #[must_use]
    pub const fn is_active(self) -> bool {
        !matches!(self, ButtonState::Off)
    }
}

/// Open state of a tunnel door, stored in the entity variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DoorState {
    /// Door is shut.
    Closed,
    /// Door is open.
    Open,
    /// Door was opened for a player leaving a tunnel and shuts once the player is clear.
    TemporarilyOpen,
}

impl DoorState {
    /// Decodes a door state from an entity variant.
    #[must_use]
    pub const fn from_variant(variant: i32) -> Self {
        match variant {
            0 => DoorState::Open,
            1 => DoorState::TemporarilyOpen,
            _ => DoorState::Closed,
        }
    }

    /// Encodes the state as an entity variant.
    #[must_use]
    pub const fn variant(self) -> i32 {
        match self {
            DoorState::Closed => DEFAULT_VARIANT,
            DoorState::Open => 0,
            DoorState::TemporarilyOpen => 1,
        }
    }
}

/// Unique identifier assigned to an entity. Identifiers are never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifier of a rigid group record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(u32);

impl GroupId {
    /// Creates a new group identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Persisted description of a single placed entity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    /// Kind of the entity.
    pub kind: EntityKind,
    /// Facing index in `0..4`.
    #[serde(default)]
    pub facing: u8,
    /// Cell occupied by the entity.
    pub coord: Coord,
    /// Tiling variant, button state or door state.
    #[serde(default = "default_variant")]
    pub variant: i32,
    /// Whether the entity was destroyed.
    #[serde(default)]
    pub destroyed: bool,
    /// Cells of the rigid group the entity belongs to, primary first.
    #[serde(default)]
    pub group: Option<Vec<Coord>>,
}

fn default_variant() -> i32 {
    DEFAULT_VARIANT
}

impl EntityRecord {
    /// Creates an ungrouped record facing right with the default variant.
    #[must_use]
    pub fn new(kind: EntityKind, coord: Coord) -> Self {
        Self {
            kind,
            facing: 0,
            coord,
            variant: DEFAULT_VARIANT,
            destroyed: false,
            group: None,
        }
    }

    /// Replaces the facing.
    #[must_use]
    pub fn with_facing(mut self, facing: Direction) -> Self {
        self.facing = facing.facing();
        self
    }

    /// Replaces the variant.
    #[must_use]
    pub fn with_variant(mut self, variant: i32) -> Self {
        self.variant = variant;
        self
    }

    /// Attaches the record to a rigid group.
    #[must_use]
    pub fn with_group(mut self, group: Vec<Coord>) -> Self {
        self.group = Some(group);
        self
    }
}

/// Origin of a movement request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoveKind {
    /// The player pushes something directly.
    Player,
    /// Gravity pulls a representative down.
    Gravity,
    /// A shot or another block moves something.
    Block,
}

/// Reasons a movement or action was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockedReason {
    /// The initiator cannot move on its own.
    Immovable,
    /// A `Stop` entity occupies a destination cell.
    Stopped {
        /// Entity that stopped the chain.
        obstacle: EntityId,
    },
    /// A non-player entity would be pushed into the player.
    PlayerInTheWay {
        /// Player segment in the way.
        player: EntityId,
    },
    /// A falling entity would displace a floating entity.
    FloatInTheWay {
        /// Floating entity in the way.
        obstacle: EntityId,
    },
    /// An entity that cannot be pushed shares the mover's layer at the destination.
    Obstructed {
        /// Entity in the way.
        obstacle: EntityId,
    },
    /// The projectile cascade was cancelled.
    Cancelled,
    /// A gravity cascade is still in progress.
    Busy,
    /// The body cannot grow or shrink any further.
    LengthLimit,
    /// The referenced entity does not exist.
    MissingEntity,
    /// The level has no player body.
    NoPlayer,
}

/// Tunable rules of the engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    /// Direction entities fall in.
    pub gravity: Direction,
    /// Whether blocks moved by shots push the player instead of stopping on it.
    pub block_moves_displace_player: bool,
    /// Shortest body length; also the initial maximum length.
    pub base_length: u8,
    /// Longest body length reachable through length pickups.
    pub length_cap: u8,
    /// Cells a shot may travel past the level bounds before fading.
    pub projectile_range: u32,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            gravity: Direction::Down,
            block_moves_displace_player: true,
            base_length: 3,
            length_cap: 15,
            projectile_range: 2,
        }
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Marks the start of a new user action and closes the current history.
    BeginAction,
    /// Attempts to move an entity, pushing whatever it runs into.
    Move {
        /// Entity initiating the move.
        entity: EntityId,
        /// Direction of the move.
        direction: Direction,
        /// Origin of the request.
        kind: MoveKind,
    },
    /// Crawls the player body one cell.
    Crawl {
        /// Direction the head moves in.
        direction: Direction,
    },
    /// Grows or shrinks the player body.
    Grow {
        /// Direction the head moves in.
        direction: Direction,
    },
    /// Fires a shot from a cell.
    Fire {
        /// Cell the shot starts from.
        origin: Coord,
        /// Direction of travel.
        direction: Direction,
    },
    /// Cancels the in-flight projectile cascade.
    CancelProjectiles,
    /// Updates the power state of a button.
    SetButton {
        /// Button to update.
        button: EntityId,
        /// New state.
        state: ButtonState,
    },
    /// Toggles fly mode, which exempts the player from gravity.
    SetFlyMode {
        /// Whether fly mode is active.
        enabled: bool,
    },
    /// Runs a gravity cascade until every representative rests.
    ApplyGravity,
    /// Starts a gravity cascade without stepping it.
    BeginGravity,
    /// Advances the running gravity cascade by one round.
    StepGravity,
    /// Reverts the most recent history, following rollbacks.
    Undo {
        /// Suppresses user-facing feedback.
        silent: bool,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// An entity changed cells.
    EntityMoved {
        /// Entity that moved.
        entity: EntityId,
        /// Cell it left.
        from: Coord,
        /// Cell it entered.
        to: Coord,
    },
    /// A movement chain was committed.
    MoveCommitted {
        /// Entity that initiated the chain.
        initiator: EntityId,
        /// Direction of the chain.
        direction: Direction,
        /// Origin of the request.
        kind: MoveKind,
        /// Entities moved, in commit order.
        moved: Vec<EntityId>,
        /// Non-floating entities outside the initiator's body moved by a gravity chain.
        induced: Vec<EntityId>,
        /// Whether a floating entity moved.
        float_moved: bool,
        /// Whether a pushed block scraped along the ground.
        ground_scrape: bool,
    },
    /// A movement chain was refused without any mutation.
    MoveBlocked {
        /// Entity that initiated the chain.
        initiator: EntityId,
        /// Direction of the chain.
        direction: Direction,
        /// Origin of the request.
        kind: MoveKind,
        /// Why the chain was refused.
        reason: BlockedReason,
    },
    /// A player action other than a direct move was refused.
    ActionBlocked {
        /// Why the action was refused.
        reason: BlockedReason,
    },
    /// The player body crawled one cell.
    PlayerCrawled {
        /// Direction of the crawl.
        direction: Direction,
        /// Collectible eaten on arrival, if any.
        ate: Option<EntityId>,
    },
    /// The player body grew by one segment.
    PlayerGrew {
        /// Direction the head advanced in.
        direction: Direction,
        /// Body length after growing.
        length: usize,
    },
    /// The player body shrank by one segment.
    PlayerShrank {
        /// Direction the head retreated in.
        direction: Direction,
        /// Body length after shrinking.
        length: usize,
    },
    /// An entity was destroyed.
    EntityDestroyed {
        /// Entity that was destroyed.
        entity: EntityId,
    },
    /// A destroyed entity was restored by undo.
    EntityRestored {
        /// Entity that was restored.
        entity: EntityId,
    },
    /// A new entity was placed into the world.
    EntityPlaced {
        /// Entity that was placed.
        entity: EntityId,
        /// Cell it was placed on.
        coord: Coord,
    },
    /// An entity was removed from the world entirely.
    EntityRemoved {
        /// Entity that was removed.
        entity: EntityId,
    },
    /// An ability pickup took effect.
    AbilityCollected {
        /// Effect that was applied.
        grant: Grant,
        /// Cell the pickup was found on.
        coord: Coord,
    },
    /// An ability pickup was reversed by undo.
    AbilityRevoked {
        /// Effect that was reversed.
        grant: Grant,
        /// Cell the pickup was found on.
        coord: Coord,
    },
    /// A button changed power state.
    ButtonChanged {
        /// Button that changed.
        button: EntityId,
        /// New state.
        state: ButtonState,
    },
    /// A tunnel door changed state.
    DoorChanged {
        /// Door that changed.
        door: EntityId,
        /// New state.
        state: DoorState,
    },
    /// A shot struck an entity.
    ProjectileHit {
        /// Entity that was struck.
        target: EntityId,
        /// Cell of the impact.
        coord: Coord,
    },
    /// A shot left the level without striking anything.
    ProjectileFaded {
        /// Last cell the shot reached.
        coord: Coord,
    },
    /// A shot was cancelled before resolving.
    ProjectileCancelled,
    /// A gravity cascade began.
    GravityStarted {
        /// Number of representatives that may fall.
        representatives: usize,
    },
    /// A representative came to rest after falling.
    Landed {
        /// Representative that landed.
        representative: EntityId,
        /// Kind of the representative.
        kind: EntityKind,
        /// Consecutive cells fallen before landing.
        falls: u32,
        /// Number of cells in the representative's body.
        size: usize,
    },
    /// A gravity cascade finished.
    GravitySettled {
        /// Successful gravity moves during the cascade.
        moves: u32,
        /// Rollbacks folded onto the newest history.
        rollbacks: u32,
    },
    /// Histories were reverted.
    UndoApplied {
        /// Number of histories reverted.
        histories: usize,
        /// Whether feedback was suppressed.
        silent: bool,
    },
    /// Undo was requested with an empty ledger.
    NothingToUndo {
        /// Whether feedback was suppressed.
        silent: bool,
    },
}
