#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives the wave spawner against a headless world.

mod config;
mod simulation;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use wave_spawner_core::SummonableRegistry;
use wave_spawner_system_commands::CommandSource;
use wave_spawner_system_spawning::WaveScheduler;
use wave_spawner_world::{query, Entities, Level, Terrain, World};

use crate::{
    config::{FileConfig, TerrainKind, WorldSection},
    simulation::Simulation,
};

const DEFAULT_HEIGHT: i32 = 256;
const DEFAULT_FLOOR: i32 = 63;
const ROOF_DEPTH: i32 = 4;

/// Runs the wave spawner against a headless world and reports what spawned.
#[derive(Debug, Parser)]
#[command(name = "wave-spawner", version)]
struct Cli {
    /// TOML file with `[spawn]` and `[world]` settings.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of ticks to simulate.
    #[arg(long, default_value_t = 6_000)]
    ticks: u64,
    /// Number of connected players.
    #[arg(long, default_value_t = 1)]
    players: u32,
    /// Seed for the scheduler's random source.
    #[arg(long)]
    seed: Option<u64>,
    /// Terrain generator.
    #[arg(long, value_enum)]
    terrain: Option<TerrainKind>,
    /// Height of the topmost floor layer.
    #[arg(long)]
    floor: Option<i32>,
    /// Number of block layers in the world.
    #[arg(long)]
    height: Option<i32>,
    /// Operator command executed before the run, e.g. "setSpawnCount 1 5".
    #[arg(long = "command", value_name = "LINE")]
    commands: Vec<String>,
}

/// Entry point for the wave spawner command-line interface.
fn main() {
    init_tracing();

    if let Err(err) = run(Cli::parse()) {
        error!("run failed: {err:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let file = match &cli.config {
        Some(path) => config::load(path)?,
        None => FileConfig::default(),
    };

    let seed = cli.seed.or(file.seed).unwrap_or_else(rand::random);
    let world = build_world(&cli, &file.world);
    let spawn_config = file.spawn.build()?;
    if !query::entities(&world).is_summonable(spawn_config.entity_kind()) {
        bail!(
            "entity kind {} cannot be summoned",
            spawn_config.entity_kind()
        );
    }

    let scheduler = WaveScheduler::seeded(spawn_config, seed);
    let mut simulation = Simulation::new(world, scheduler, cli.players);

    let console = CommandSource::console();
    for line in &cli.commands {
        let feedback = simulation
            .command(&console, line)
            .with_context(|| format!("command '{line}' failed"))?;
        println!("{feedback}");
    }

    info!(seed, ticks = cli.ticks, players = cli.players, "simulation_started");
    for _ in 0..cli.ticks {
        simulation.step();
    }

    println!("{}", simulation.summary());
    Ok(())
}

fn build_world(cli: &Cli, section: &WorldSection) -> World {
    let height = cli.height.or(section.height).unwrap_or(DEFAULT_HEIGHT);
    let floor = cli.floor.or(section.floor).unwrap_or(DEFAULT_FLOOR);
    let terrain = match cli.terrain.or(section.terrain).unwrap_or(TerrainKind::Flat) {
        TerrainKind::Flat => Terrain::Flat { floor },
        TerrainKind::Roofed => Terrain::Roofed {
            floor,
            ceiling_depth: ROOF_DEPTH,
        },
        TerrainKind::Void => Terrain::Void,
    };

    World::new(Level::new(height, terrain), Entities::new())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
