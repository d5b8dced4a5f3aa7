use std::fmt;

use tracing::info;
use wave_spawner_core::{ActorId, BlockPos, ColumnCoord};
use wave_spawner_system_commands::{dispatch, CommandError, CommandSource, Feedback};
use wave_spawner_system_ground_probe::find_ground_level;
use wave_spawner_system_spawning::{BatchReport, SpawnAttempt, WaveScheduler};
use wave_spawner_world::{query, World};

/// Horizontal gap between neighbouring players.
const PLAYER_SPACING: i32 = 64;

#[derive(Clone, Copy, Debug)]
struct Player {
    id: ActorId,
    position: BlockPos,
}

/// Totals accumulated over a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Summary {
    ticks: u64,
    waves: u64,
    batches: u64,
    spawned: u64,
    no_surface: u64,
    out_of_bounds: u64,
    failed: u64,
}

impl Summary {
    fn record(&mut self, report: &BatchReport) {
        self.batches += 1;
        for attempt in report.attempts() {
            let counter = match attempt {
                SpawnAttempt::Spawned { .. } => &mut self.spawned,
                SpawnAttempt::NoSurface { .. } => &mut self.no_surface,
                SpawnAttempt::OutOfBounds { .. } => &mut self.out_of_bounds,
                SpawnAttempt::Failed { .. } => &mut self.failed,
            };
            *counter += 1;
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ticks={} waves={} batches={} spawned={} no_surface={} out_of_bounds={} failed={}",
            self.ticks,
            self.waves,
            self.batches,
            self.spawned,
            self.no_surface,
            self.out_of_bounds,
            self.failed
        )
    }
}

/// Driver loop owning the world, the scheduler and the connected players.
#[derive(Debug)]
pub(crate) struct Simulation {
    world: World,
    scheduler: WaveScheduler,
    players: Vec<Player>,
    summary: Summary,
}

impl Simulation {
    /// Places `players` players along the x axis, standing on the ground.
    pub(crate) fn new(world: World, scheduler: WaveScheduler, players: u32) -> Self {
        let level = query::level(&world);
        let players = (0..players)
            .map(|index| {
                let column = ColumnCoord::new(index as i32 * PLAYER_SPACING, 0);
                let ground = find_ground_level(level, column).map_or(0, |surface| surface.get());
                Player {
                    id: ActorId::new(index),
                    position: column.at(ground + 1),
                }
            })
            .collect();

        Self {
            world,
            scheduler,
            players,
            summary: Summary::default(),
        }
    }

    /// Runs one operator command line against the scheduler.
    pub(crate) fn command(
        &mut self,
        source: &CommandSource,
        line: &str,
    ) -> Result<Feedback, CommandError> {
        dispatch(
            &mut self.scheduler,
            query::entities(&self.world),
            source,
            line,
        )
    }

    /// Advances the scheduler once, then offers every player the current wave.
    pub(crate) fn step(&mut self) {
        self.summary.ticks += 1;
        if let Some(wave) = self.scheduler.advance_tick() {
            self.summary.waves += 1;
            info!(wave = wave.get(), tick = self.summary.ticks, "wave_started");
        }

        for player in &self.players {
            let (level, entities) = self.world.parts_mut();
            if let Some(report) =
                self.scheduler
                    .maybe_serve_actor(player.id, player.position, level, entities)
            {
                self.summary.record(&report);
            }
        }
    }

    /// Totals accumulated so far.
    pub(crate) fn summary(&self) -> Summary {
        self.summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wave_spawner_core::SpawnConfig;

    fn simulation(players: u32) -> Simulation {
        let mut config = SpawnConfig::default();
        config.set_counts(3, 3).expect("valid counts");
        config.set_radius(0).expect("valid radius");
        config.set_interval_secs(1, 1).expect("valid interval");
        Simulation::new(
            World::flat(256, 64),
            WaveScheduler::seeded(config, 99),
            players,
        )
    }

    #[test]
    fn players_stand_on_the_ground() {
        let simulation = simulation(2);
        assert_eq!(simulation.players[0].position, BlockPos::new(0, 65, 0));
        assert_eq!(simulation.players[1].position, BlockPos::new(64, 65, 0));
    }

    #[test]
    fn every_player_is_served_once_per_wave() {
        let mut simulation = simulation(3);
        for _ in 0..40 {
            simulation.step();
        }

        let summary = simulation.summary();
        assert_eq!(summary.ticks, 40);
        assert_eq!(summary.waves, 2);
        assert_eq!(summary.batches, 6);
        assert_eq!(summary.spawned, 18);
        assert_eq!(query::spawned_count(&simulation.world), 18);
        assert!(query::spawned(&simulation.world)
            .iter()
            .all(|entity| entity.pos().y() == 66));
    }

    #[test]
    fn operator_commands_reach_the_scheduler() {
        let mut simulation = simulation(1);
        let console = CommandSource::console();

        let feedback = simulation
            .command(&console, "setSpawnActive false")
            .expect("command applies");
        assert_eq!(feedback.message(), "Spawning disabled");

        for _ in 0..100 {
            simulation.step();
        }
        assert_eq!(simulation.summary().waves, 0);
        assert_eq!(simulation.summary().spawned, 0);
    }

    #[test]
    fn summary_renders_all_counters() {
        let mut simulation = simulation(1);
        for _ in 0..20 {
            simulation.step();
        }
        assert_eq!(
            simulation.summary().to_string(),
            "ticks=20 waves=1 batches=1 spawned=3 no_surface=0 out_of_bounds=0 failed=0"
        );
    }
}
