use wave_spawner_core::{BlockPos, EntityKind, SpawnError, SpawnSink, SummonableRegistry, WorldAccess};
use wave_spawner_world::{query, Block, Entities, Level, Terrain, World};

fn kind(value: &str) -> EntityKind {
    value.parse().expect("valid identifier")
}

#[test]
fn flat_world_reports_solid_floor() {
    let world = World::flat(128, 64);
    let level = query::level(&world);

    assert_eq!(level.world_height(), 128);
    assert!(level.is_solid_at(BlockPos::new(7, 64, -3)));
    assert!(!level.is_solid_at(BlockPos::new(7, 65, -3)));
    assert!(!level.is_solid_at(BlockPos::new(7, 200, -3)));
}

#[test]
fn overrides_replace_terrain_blocks() {
    let mut world = World::flat(128, 64);
    assert!(world.level_mut().set_block(BlockPos::new(0, 70, 0), Block::Water));
    assert!(!world.level_mut().set_block(BlockPos::new(0, 128, 0), Block::Stone));

    assert_eq!(query::block_at(&world, BlockPos::new(0, 70, 0)), Block::Water);
    assert_eq!(query::block_at(&world, BlockPos::new(1, 70, 0)), Block::Air);
}

#[test]
fn void_level_is_empty() {
    let level = Level::new(16, Terrain::Void);
    assert!((0..16).all(|y| !level.is_solid_at(BlockPos::new(0, y, 0))));
}

#[test]
fn entities_reject_unknown_kinds() {
    let mut entities = Entities::new();
    let unknown = kind("minecraft:pig");

    assert!(!entities.is_summonable(&unknown));
    assert_eq!(
        entities.try_spawn(&unknown, BlockPos::new(0, 66, 0)),
        Err(SpawnError::UnknownKind { kind: unknown.clone() })
    );

    entities.register(unknown.clone());
    assert!(entities.try_spawn(&unknown, BlockPos::new(0, 66, 0)).is_ok());
}

#[test]
fn entities_enforce_population_cap() {
    let creeper = kind("minecraft:creeper");
    let mut entities = Entities::new().with_population_cap(2);

    let first = entities.try_spawn(&creeper, BlockPos::new(0, 66, 0)).expect("first spawn");
    let second = entities.try_spawn(&creeper, BlockPos::new(1, 66, 0)).expect("second spawn");
    assert_ne!(first, second);
    assert_eq!(
        entities.try_spawn(&creeper, BlockPos::new(2, 66, 0)),
        Err(SpawnError::CapacityReached { limit: 2 })
    );
    assert_eq!(entities.spawned().len(), 2);
}

#[test]
fn parts_mut_allows_probing_while_spawning() {
    let mut world = World::flat(128, 64);
    let creeper = kind("creeper");
    {
        let (level, entities) = world.parts_mut();
        let pos = BlockPos::new(3, 66, 4);
        assert!(!level.is_solid_at(pos));
        let _ = entities.try_spawn(&creeper, pos).expect("spawn succeeds");
    }

    assert_eq!(query::spawned_count(&world), 1);
    assert_eq!(query::spawned(&world)[0].pos(), BlockPos::new(3, 66, 4));
    assert_eq!(query::spawned(&world)[0].kind(), &creeper);
}
