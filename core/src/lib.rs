#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the wave spawner.
//!
//! This crate defines the vocabulary that connects the operator command
//! surface, the host world and the pure systems. Operators submit [`Command`]
//! values that reconfigure the spawner, systems read the world through the
//! [`WorldAccess`] capability, and spawn requests leave through the
//! [`SpawnSink`] capability. Nothing in here depends on a particular host
//! runtime.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of simulation ticks the host executes per second of wall time.
pub const TICKS_PER_SECOND: u32 = 20;

/// Vertical clearance added above the probed surface before spawning.
pub const SPAWN_HEIGHT: i32 = 2;

/// Distance from the origin at which the horizontal world border sits.
pub const MAX_HORIZONTAL_EXTENT: u32 = 30_000_000;

/// Namespace assumed when an identifier omits one.
pub const DEFAULT_NAMESPACE: &str = "minecraft";

/// Entity kind spawned until an operator picks another one.
pub const DEFAULT_ENTITY_KIND: &str = "minecraft:creeper";

const DEFAULT_MIN_COUNT: u32 = 10;
const DEFAULT_MAX_COUNT: u32 = 40;
const DEFAULT_MIN_INTERVAL_SECS: u32 = 45;
const DEFAULT_MAX_INTERVAL_SECS: u32 = 120;
const DEFAULT_SPAWN_RADIUS: u32 = 30;

/// Namespaced identifier naming a kind of entity, such as `minecraft:zombie`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityKind {
    namespace: String,
    path: String,
}

impl EntityKind {
    /// Builds an identifier from its namespace and path components.
    pub fn new(namespace: &str, path: &str) -> Result<Self, EntityKindError> {
        if namespace.is_empty() {
            return Err(EntityKindError::EmptyNamespace);
        }
        if path.is_empty() {
            return Err(EntityKindError::EmptyPath);
        }
        if let Some(character) = namespace.chars().find(|ch| !is_namespace_char(*ch)) {
            return Err(EntityKindError::InvalidNamespaceCharacter { character });
        }
        if let Some(character) = path.chars().find(|ch| !is_path_char(*ch)) {
            return Err(EntityKindError::InvalidPathCharacter { character });
        }

        Ok(Self {
            namespace: namespace.to_owned(),
            path: path.to_owned(),
        })
    }

    /// Namespace component, e.g. `minecraft`.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Path component, e.g. `creeper`.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl Default for EntityKind {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_owned(),
            path: "creeper".to_owned(),
        }
    }
}

impl FromStr for EntityKind {
    type Err = EntityKindError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.split_once(':') {
            Some((namespace, path)) => Self::new(namespace, path),
            None => Self::new(DEFAULT_NAMESPACE, value),
        }
    }
}

impl TryFrom<String> for EntityKind {
    type Error = EntityKindError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EntityKind> for String {
    fn from(kind: EntityKind) -> Self {
        kind.to_string()
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

fn is_namespace_char(ch: char) -> bool {
    ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '_' | '-' | '.')
}

fn is_path_char(ch: char) -> bool {
    is_namespace_char(ch) || ch == '/'
}

/// Reasons a textual identifier fails to parse into an [`EntityKind`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EntityKindError {
    /// The namespace before the `:` separator was empty.
    #[error("identifier namespace must not be empty")]
    EmptyNamespace,
    /// The path after the `:` separator was empty.
    #[error("identifier path must not be empty")]
    EmptyPath,
    /// The namespace contained a character outside `[a-z0-9_.-]`.
    #[error("identifier namespace contains invalid character '{character}'")]
    InvalidNamespaceCharacter {
        /// Offending character.
        character: char,
    },
    /// The path contained a character outside `[a-z0-9_.-/]`.
    #[error("identifier path contains invalid character '{character}'")]
    InvalidPathCharacter {
        /// Offending character.
        character: char,
    },
}

/// Unique identifier assigned by the host to a tracked actor, such as a player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId(u32);

impl ActorId {
    /// Creates a new actor identifier with the provided numeric value.
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

/// Unique identifier assigned by the host to an instantiated entity.
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

/// Sequence number of a spawn wave, starting at one for the first wave.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WaveId(u64);

impl WaveId {
    /// Creates a new wave identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }

    /// Identifier of the wave following this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

/// Integer position of a single block cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockPos {
    x: i32,
    y: i32,
    z: i32,
}

impl BlockPos {
    /// Creates a new block position.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Block position containing the provided continuous coordinates.
    #[must_use]
    pub fn containing(x: f64, y: f64, z: f64) -> Self {
        Self {
            x: x.floor() as i32,
            y: y.floor() as i32,
            z: z.floor() as i32,
        }
    }

    /// East-west coordinate.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical coordinate.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// North-south coordinate.
    #[must_use]
    pub const fn z(&self) -> i32 {
        self.z
    }

    /// Horizontal column that contains the position.
    #[must_use]
    pub const fn column(&self) -> ColumnCoord {
        ColumnCoord::new(self.x, self.z)
    }

    /// Position directly above this one by `dy` blocks.
    #[must_use]
    pub const fn above(self, dy: i32) -> Self {
        Self {
            y: self.y.saturating_add(dy),
            ..self
        }
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Horizontal coordinate identifying one vertical column of blocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnCoord {
    x: i32,
    z: i32,
}

impl ColumnCoord {
    /// Creates a new column coordinate.
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// East-west coordinate.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// North-south coordinate.
    #[must_use]
    pub const fn z(&self) -> i32 {
        self.z
    }

    /// Block in this column at the provided height.
    #[must_use]
    pub const fn at(&self, y: i32) -> BlockPos {
        BlockPos::new(self.x, y, self.z)
    }

    /// Column shifted horizontally by the provided offsets.
    #[must_use]
    pub const fn offset(self, dx: i32, dz: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            z: self.z.saturating_add(dz),
        }
    }
}

impl fmt::Display for ColumnCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// Height of the topmost solid block of a column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceHeight(i32);

impl SurfaceHeight {
    /// Wraps the provided vertical coordinate.
    #[must_use]
    pub const fn new(y: i32) -> Self {
        Self(y)
    }

    /// Retrieves the vertical coordinate of the surface block.
    #[must_use]
    pub const fn get(&self) -> i32 {
        self.0
    }
}

/// Tunable parameters controlling when, what and how many entities spawn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpawnConfig {
    active: bool,
    entity_kind: EntityKind,
    min_count: u32,
    max_count: u32,
    min_interval_ticks: u32,
    max_interval_ticks: u32,
    max_spawn_radius: u32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            active: true,
            entity_kind: EntityKind::default(),
            min_count: DEFAULT_MIN_COUNT,
            max_count: DEFAULT_MAX_COUNT,
            min_interval_ticks: DEFAULT_MIN_INTERVAL_SECS * TICKS_PER_SECOND,
            max_interval_ticks: DEFAULT_MAX_INTERVAL_SECS * TICKS_PER_SECOND,
            max_spawn_radius: DEFAULT_SPAWN_RADIUS,
        }
    }
}

impl SpawnConfig {
    /// Whether waves are currently being scheduled.
    #[must_use]
    pub const fn active(&self) -> bool {
        self.active
    }

    /// Kind of entity spawned in each wave.
    #[must_use]
    pub fn entity_kind(&self) -> &EntityKind {
        &self.entity_kind
    }

    /// Smallest number of entities spawned per actor per wave.
    #[must_use]
    pub const fn min_count(&self) -> u32 {
        self.min_count
    }

    /// Largest number of entities spawned per actor per wave.
    #[must_use]
    pub const fn max_count(&self) -> u32 {
        self.max_count
    }

    /// Shortest delay between waves, in ticks.
    #[must_use]
    pub const fn min_interval_ticks(&self) -> u32 {
        self.min_interval_ticks
    }

    /// Longest delay between waves, in ticks.
    #[must_use]
    pub const fn max_interval_ticks(&self) -> u32 {
        self.max_interval_ticks
    }

    /// Largest horizontal distance from the actor at which entities spawn.
    #[must_use]
    pub const fn max_spawn_radius(&self) -> u32 {
        self.max_spawn_radius
    }

    /// Enables or disables wave scheduling.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Replaces the kind of entity spawned in future batches.
    pub fn set_entity_kind(&mut self, kind: EntityKind) {
        self.entity_kind = kind;
    }

    /// Replaces the per-wave count bounds.
    pub fn set_counts(&mut self, min: u32, max: u32) -> Result<(), ConfigError> {
        if min > max {
            return Err(ConfigError::CountBoundsReversed { min, max });
        }

        self.min_count = min;
        self.max_count = max;
        Ok(())
    }

    /// Replaces the wave interval bounds, expressed in whole seconds.
    pub fn set_interval_secs(&mut self, min_secs: u32, max_secs: u32) -> Result<(), ConfigError> {
        if min_secs == 0 {
            return Err(ConfigError::IntervalTooShort { secs: min_secs });
        }
        if min_secs > max_secs {
            return Err(ConfigError::IntervalBoundsReversed {
                min: min_secs,
                max: max_secs,
            });
        }
        let max_ticks = max_secs
            .checked_mul(TICKS_PER_SECOND)
            .ok_or(ConfigError::IntervalOverflow { secs: max_secs })?;

        self.min_interval_ticks = min_secs * TICKS_PER_SECOND;
        self.max_interval_ticks = max_ticks;
        Ok(())
    }

    /// Replaces the horizontal spawn radius.
    pub fn set_radius(&mut self, radius: u32) -> Result<(), ConfigError> {
        if radius > MAX_HORIZONTAL_EXTENT {
            return Err(ConfigError::RadiusTooLarge {
                radius,
                limit: MAX_HORIZONTAL_EXTENT,
            });
        }

        self.max_spawn_radius = radius;
        Ok(())
    }
}

/// Reasons a configuration change is rejected. The prior configuration is
/// always left untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The minimum count exceeds the maximum count.
    #[error("minimum count {min} exceeds maximum count {max}")]
    CountBoundsReversed {
        /// Requested minimum.
        min: u32,
        /// Requested maximum.
        max: u32,
    },
    /// The minimum interval exceeds the maximum interval.
    #[error("minimum interval of {min}s exceeds maximum interval of {max}s")]
    IntervalBoundsReversed {
        /// Requested minimum, in seconds.
        min: u32,
        /// Requested maximum, in seconds.
        max: u32,
    },
    /// An interval bound is shorter than one second.
    #[error("interval of {secs}s is shorter than one second")]
    IntervalTooShort {
        /// Offending interval, in seconds.
        secs: u32,
    },
    /// An interval bound cannot be expressed in ticks.
    #[error("interval of {secs}s is too long to express in ticks")]
    IntervalOverflow {
        /// Offending interval, in seconds.
        secs: u32,
    },
    /// The radius reaches past the world border.
    #[error("spawn radius {radius} exceeds the limit of {limit}")]
    RadiusTooLarge {
        /// Requested radius.
        radius: u32,
        /// Largest accepted radius.
        limit: u32,
    },
}

/// Operator commands that reconfigure the spawner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Toggles wave scheduling on or off.
    SetSpawnActive {
        /// Whether waves should be scheduled.
        active: bool,
    },
    /// Selects the kind of entity to spawn.
    SetSpawnMob {
        /// Entity kind to spawn in future batches.
        kind: EntityKind,
    },
    /// Sets the bounds of the delay between waves.
    SetSpawnInterval {
        /// Shortest delay, in seconds.
        min_secs: u32,
        /// Longest delay, in seconds.
        max_secs: u32,
    },
    /// Sets the bounds of the number of entities spawned per actor.
    SetSpawnCount {
        /// Smallest batch size.
        min: u32,
        /// Largest batch size.
        max: u32,
    },
    /// Sets the largest horizontal distance from the actor.
    SetSpawnRadius {
        /// Radius measured in blocks.
        distance: u32,
    },
}

impl Command {
    /// Literal name operators type to issue the command.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SetSpawnActive { .. } => "setSpawnActive",
            Self::SetSpawnMob { .. } => "setSpawnMob",
            Self::SetSpawnInterval { .. } => "setSpawnInterval",
            Self::SetSpawnCount { .. } => "setSpawnCount",
            Self::SetSpawnRadius { .. } => "setSpawnRadius",
        }
    }
}

/// Read-only view of the host world used to probe for spawn locations.
pub trait WorldAccess {
    /// Whether the block at `pos` holds solid matter or any fluid.
    fn is_solid_at(&self, pos: BlockPos) -> bool;

    /// Number of block layers in the world, starting at `y = 0`.
    fn world_height(&self) -> i32;

    /// Whether an entity may legally be placed at `pos`.
    fn is_in_spawnable_bounds(&self, pos: BlockPos) -> bool {
        (0..self.world_height()).contains(&pos.y())
            && pos.x().unsigned_abs() < MAX_HORIZONTAL_EXTENT
            && pos.z().unsigned_abs() < MAX_HORIZONTAL_EXTENT
    }
}

/// Host capability that instantiates entities.
pub trait SpawnSink {
    /// Attempts to create an entity of `kind` at `pos`.
    fn try_spawn(&mut self, kind: &EntityKind, pos: BlockPos) -> Result<EntityId, SpawnError>;
}

/// Host registry of entity kinds operators may select.
pub trait SummonableRegistry {
    /// Whether entities of `kind` can be summoned.
    fn is_summonable(&self, kind: &EntityKind) -> bool;
}

/// Reasons the host refuses to instantiate an entity.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SpawnError {
    /// The host has no entity of the requested kind.
    #[error("entity kind {kind} cannot be summoned")]
    UnknownKind {
        /// Kind that was requested.
        kind: EntityKind,
    },
    /// The position lies outside the region where entities may exist.
    #[error("position {pos} lies outside the spawnable bounds")]
    OutOfBounds {
        /// Position that was requested.
        pos: BlockPos,
    },
    /// The world already holds as many entities as it accepts.
    #[error("entity population cap of {limit} reached")]
    CapacityReached {
        /// Population cap of the world.
        limit: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Column {
        height: i32,
    }

    impl WorldAccess for Column {
        fn is_solid_at(&self, _pos: BlockPos) -> bool {
            false
        }

        fn world_height(&self) -> i32 {
            self.height
        }
    }

    #[test]
    fn entity_kind_defaults_namespace() {
        let kind: EntityKind = "zombie".parse().expect("valid identifier");
        assert_eq!(kind.namespace(), DEFAULT_NAMESPACE);
        assert_eq!(kind.path(), "zombie");
        assert_eq!(kind.to_string(), "minecraft:zombie");
    }

    #[test]
    fn entity_kind_rejects_invalid_identifiers() {
        assert_eq!(
            "minecraft:".parse::<EntityKind>(),
            Err(EntityKindError::EmptyPath)
        );
        assert_eq!(
            ":zombie".parse::<EntityKind>(),
            Err(EntityKindError::EmptyNamespace)
        );
        assert_eq!(
            "Minecraft:zombie".parse::<EntityKind>(),
            Err(EntityKindError::InvalidNamespaceCharacter { character: 'M' })
        );
        assert_eq!(
            "mod:bad path".parse::<EntityKind>(),
            Err(EntityKindError::InvalidPathCharacter { character: ' ' })
        );
    }

    #[test]
    fn default_entity_kind_matches_constant() {
        assert_eq!(EntityKind::default().to_string(), DEFAULT_ENTITY_KIND);
    }

    #[test]
    fn default_config_uses_documented_values() {
        let config = SpawnConfig::default();
        assert!(config.active());
        assert_eq!(config.min_count(), 10);
        assert_eq!(config.max_count(), 40);
        assert_eq!(config.min_interval_ticks(), 900);
        assert_eq!(config.max_interval_ticks(), 2_400);
        assert_eq!(config.max_spawn_radius(), 30);
    }

    #[test]
    fn rejected_interval_leaves_config_unchanged() {
        let mut config = SpawnConfig::default();
        assert_eq!(
            config.set_interval_secs(10, 5),
            Err(ConfigError::IntervalBoundsReversed { min: 10, max: 5 })
        );
        assert_eq!(
            config.set_interval_secs(0, 5),
            Err(ConfigError::IntervalTooShort { secs: 0 })
        );
        assert_eq!(
            config.set_interval_secs(1, u32::MAX),
            Err(ConfigError::IntervalOverflow { secs: u32::MAX })
        );
        assert_eq!(config, SpawnConfig::default());
    }

    #[test]
    fn interval_converts_seconds_to_ticks() {
        let mut config = SpawnConfig::default();
        config.set_interval_secs(3, 7).expect("valid interval");
        assert_eq!(config.min_interval_ticks(), 60);
        assert_eq!(config.max_interval_ticks(), 140);
    }

    #[test]
    fn rejected_counts_and_radius_leave_config_unchanged() {
        let mut config = SpawnConfig::default();
        assert!(config.set_counts(5, 4).is_err());
        assert!(config.set_radius(MAX_HORIZONTAL_EXTENT + 1).is_err());
        assert_eq!(config, SpawnConfig::default());

        config.set_counts(0, 0).expect("degenerate counts are valid");
        config.set_radius(0).expect("zero radius is valid");
        assert_eq!(config.max_count(), 0);
        assert_eq!(config.max_spawn_radius(), 0);
    }

    #[test]
    fn spawnable_bounds_follow_world_height() {
        let world = Column { height: 128 };
        assert!(world.is_in_spawnable_bounds(BlockPos::new(0, 0, 0)));
        assert!(world.is_in_spawnable_bounds(BlockPos::new(5, 127, -5)));
        assert!(!world.is_in_spawnable_bounds(BlockPos::new(0, 128, 0)));
        assert!(!world.is_in_spawnable_bounds(BlockPos::new(0, -1, 0)));
        assert!(!world.is_in_spawnable_bounds(BlockPos::new(30_000_000, 64, 0)));
    }

    #[test]
    fn block_pos_containing_floors_coordinates() {
        assert_eq!(
            BlockPos::containing(0.5, 70.0, -0.5),
            BlockPos::new(0, 70, -1)
        );
    }
}
