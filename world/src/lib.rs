#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative in-memory world used to drive the wave spawner without a host game.
//!
//! A [`World`] couples a block [`Level`], which answers the probe's
//! [`WorldAccess`] queries, with an [`Entities`] store, which accepts spawn
//! requests through [`SpawnSink`]. Both halves can be borrowed at once via
//! [`World::parts_mut`].

use std::collections::{BTreeSet, HashMap};

use tracing::trace;
use wave_spawner_core::{
    BlockPos, EntityId, EntityKind, SpawnError, SpawnSink, SummonableRegistry, WorldAccess,
    DEFAULT_NAMESPACE,
};

const DEFAULT_HEIGHT: i32 = 256;
const DEFAULT_FLOOR: i32 = 63;

const HOSTILE_KINDS: [&str; 20] = [
    "blaze",
    "cave_spider",
    "creeper",
    "drowned",
    "enderman",
    "ghast",
    "hoglin",
    "husk",
    "magma_cube",
    "phantom",
    "piglin",
    "pillager",
    "skeleton",
    "slime",
    "spider",
    "stray",
    "vindicator",
    "witch",
    "wither_skeleton",
    "zombie",
];

/// Contents of a single block cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Block {
    /// Empty space.
    Air,
    /// Ordinary opaque rock.
    Stone,
    /// Indestructible rock lining the bottom and roof of the world.
    Bedrock,
    /// Water source.
    Water,
    /// Lava source.
    Lava,
}

impl Block {
    /// Whether the cell is empty.
    #[must_use]
    pub const fn is_air(&self) -> bool {
        matches!(self, Self::Air)
    }

    /// Whether the cell holds a fluid.
    #[must_use]
    pub const fn is_fluid(&self) -> bool {
        matches!(self, Self::Water | Self::Lava)
    }

    /// Whether the cell counts as ground. Fluids count so that nothing spawns
    /// at the bottom of an ocean.
    #[must_use]
    pub const fn is_solid(&self) -> bool {
        !self.is_air() || self.is_fluid()
    }
}

/// Generator describing the default contents of every column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Terrain {
    /// Nothing but air.
    Void,
    /// Bedrock at `y = 0` and stone up to and including `floor`.
    Flat {
        /// Height of the topmost stone layer.
        floor: i32,
    },
    /// A flat floor beneath a solid roof filling the top `ceiling_depth` layers.
    Roofed {
        /// Height of the topmost floor layer.
        floor: i32,
        /// Thickness of the roof.
        ceiling_depth: i32,
    },
}

impl Terrain {
    fn block_at(&self, y: i32, height: i32) -> Block {
        match *self {
            Self::Void => Block::Air,
            Self::Flat { floor } => floor_block(y, floor),
            Self::Roofed {
                floor,
                ceiling_depth,
            } => {
                if y == height - 1 {
                    Block::Bedrock
                } else if y >= height - ceiling_depth {
                    Block::Stone
                } else {
                    floor_block(y, floor)
                }
            }
        }
    }
}

fn floor_block(y: i32, floor: i32) -> Block {
    if y == 0 {
        Block::Bedrock
    } else if y <= floor {
        Block::Stone
    } else {
        Block::Air
    }
}

/// Block storage answering column queries.
#[derive(Debug)]
pub struct Level {
    height: i32,
    terrain: Terrain,
    overrides: HashMap<BlockPos, Block>,
}

impl Level {
    /// Creates a level of the provided height filled by `terrain`.
    #[must_use]
    pub fn new(height: i32, terrain: Terrain) -> Self {
        Self {
            height: height.max(1),
            terrain,
            overrides: HashMap::new(),
        }
    }

    /// Terrain generator backing unmodified blocks.
    #[must_use]
    pub const fn terrain(&self) -> Terrain {
        self.terrain
    }

    /// Contents of the block at `pos`. Positions outside the vertical range are air.
    #[must_use]
    pub fn block_at(&self, pos: BlockPos) -> Block {
        if !(0..self.height).contains(&pos.y()) {
            return Block::Air;
        }

        self.overrides
            .get(&pos)
            .copied()
            .unwrap_or_else(|| self.terrain.block_at(pos.y(), self.height))
    }

    /// Overwrites the block at `pos`. Returns `false` when `pos` lies outside
    /// the vertical range and nothing was written.
    pub fn set_block(&mut self, pos: BlockPos, block: Block) -> bool {
        if !(0..self.height).contains(&pos.y()) {
            return false;
        }

        let _ = self.overrides.insert(pos, block);
        true
    }
}

impl Default for Level {
    fn default() -> Self {
        Self::new(
            DEFAULT_HEIGHT,
            Terrain::Flat {
                floor: DEFAULT_FLOOR,
            },
        )
    }
}

impl WorldAccess for Level {
    fn is_solid_at(&self, pos: BlockPos) -> bool {
        self.block_at(pos).is_solid()
    }

    fn world_height(&self) -> i32 {
        self.height
    }
}

/// Entity recorded after a successful spawn request.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SpawnedEntity {
    id: EntityId,
    kind: EntityKind,
    pos: BlockPos,
}

impl SpawnedEntity {
    /// Identifier assigned when the entity was created.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Kind of the entity.
    #[must_use]
    pub fn kind(&self) -> &EntityKind {
        &self.kind
    }

    /// Block the entity was placed in.
    #[must_use]
    pub const fn pos(&self) -> BlockPos {
        self.pos
    }
}

/// Entity store that validates and records spawn requests.
#[derive(Debug)]
pub struct Entities {
    summonable: BTreeSet<EntityKind>,
    population_cap: Option<usize>,
    spawned: Vec<SpawnedEntity>,
    next_id: u32,
}

impl Entities {
    /// Creates a store accepting the vanilla hostile creatures.
    #[must_use]
    pub fn new() -> Self {
        Self::with_summonable(
            HOSTILE_KINDS
                .iter()
                .filter_map(|path| EntityKind::new(DEFAULT_NAMESPACE, path).ok()),
        )
    }

    /// Creates a store accepting exactly the provided kinds.
    #[must_use]
    pub fn with_summonable(kinds: impl IntoIterator<Item = EntityKind>) -> Self {
        Self {
            summonable: kinds.into_iter().collect(),
            population_cap: None,
            spawned: Vec::new(),
            next_id: 0,
        }
    }

    /// Limits how many entities the store accepts.
    #[must_use]
    pub fn with_population_cap(mut self, cap: usize) -> Self {
        self.population_cap = Some(cap);
        self
    }

    /// Adds `kind` to the set of summonable kinds.
    pub fn register(&mut self, kind: EntityKind) {
        let _ = self.summonable.insert(kind);
    }

    /// Entities spawned so far, in creation order.
    #[must_use]
    pub fn spawned(&self) -> &[SpawnedEntity] {
        &self.spawned
    }
}

impl Default for Entities {
    fn default() -> Self {
        Self::new()
    }
}

impl SpawnSink for Entities {
    fn try_spawn(&mut self, kind: &EntityKind, pos: BlockPos) -> Result<EntityId, SpawnError> {
        if !self.summonable.contains(kind) {
            return Err(SpawnError::UnknownKind { kind: kind.clone() });
        }
        if let Some(limit) = self.population_cap {
            if self.spawned.len() >= limit {
                return Err(SpawnError::CapacityReached { limit });
            }
        }

        let id = EntityId::new(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.spawned.push(SpawnedEntity {
            id,
            kind: kind.clone(),
            pos,
        });
        trace!(entity = id.get(), %kind, %pos, "entity_spawned");
        Ok(id)
    }
}

impl SummonableRegistry for Entities {
    fn is_summonable(&self, kind: &EntityKind) -> bool {
        self.summonable.contains(kind)
    }
}

/// Host world pairing block storage with an entity store.
#[derive(Debug, Default)]
pub struct World {
    level: Level,
    entities: Entities,
}

impl World {
    /// Creates a world from its two halves.
    #[must_use]
    pub fn new(level: Level, entities: Entities) -> Self {
        Self { level, entities }
    }

    /// Creates a flat world of the provided height whose floor tops out at `floor`.
    #[must_use]
    pub fn flat(height: i32, floor: i32) -> Self {
        Self::new(Level::new(height, Terrain::Flat { floor }), Entities::new())
    }

    /// Mutable access to the block storage.
    pub fn level_mut(&mut self) -> &mut Level {
        &mut self.level
    }

    /// Mutable access to the entity store.
    pub fn entities_mut(&mut self) -> &mut Entities {
        &mut self.entities
    }

    /// Splits the world into its read-only level and mutable entity store.
    pub fn parts_mut(&mut self) -> (&Level, &mut Entities) {
        (&self.level, &mut self.entities)
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{Block, Entities, Level, SpawnedEntity, World};
    use wave_spawner_core::BlockPos;

    /// Provides read-only access to the block storage.
    #[must_use]
    pub fn level(world: &World) -> &Level {
        &world.level
    }

    /// Provides read-only access to the entity store.
    #[must_use]
    pub fn entities(world: &World) -> &Entities {
        &world.entities
    }

    /// Contents of the block at `pos`.
    #[must_use]
    pub fn block_at(world: &World, pos: BlockPos) -> Block {
        world.level.block_at(pos)
    }

    /// Entities spawned so far, in creation order.
    #[must_use]
    pub fn spawned(world: &World) -> &[SpawnedEntity] {
        world.entities.spawned()
    }

    /// Number of entities spawned so far.
    #[must_use]
    pub fn spawned_count(world: &World) -> usize {
        world.entities.spawned().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roofed_terrain_places_bedrock_at_the_top() {
        let terrain = Terrain::Roofed {
            floor: 31,
            ceiling_depth: 4,
        };
        assert_eq!(terrain.block_at(127, 128), Block::Bedrock);
        assert_eq!(terrain.block_at(124, 128), Block::Stone);
        assert_eq!(terrain.block_at(123, 128), Block::Air);
        assert_eq!(terrain.block_at(31, 128), Block::Stone);
        assert_eq!(terrain.block_at(0, 128), Block::Bedrock);
    }

    #[test]
    fn fluids_count_as_solid() {
        assert!(Block::Water.is_solid());
        assert!(Block::Lava.is_solid());
        assert!(Block::Stone.is_solid());
        assert!(!Block::Air.is_solid());
    }
}
