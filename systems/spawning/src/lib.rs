#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave scheduling system responsible for spawning entities around actors.
//!
//! The owning driver calls [`WaveScheduler::advance_tick`] once per global
//! tick and then [`WaveScheduler::maybe_serve_actor`] once for every
//! connected actor. Each actor receives at most one batch per wave.

use std::collections::HashSet;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace, warn};
use wave_spawner_core::{
    ActorId, BlockPos, ColumnCoord, ConfigError, EntityId, EntityKind, SpawnConfig, SpawnError,
    SpawnSink, WaveId, WorldAccess, SPAWN_HEIGHT,
};
use wave_spawner_system_ground_probe::find_ground_level;

/// Outcome of a single entity placement within a batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SpawnAttempt {
    /// The host created the entity.
    Spawned {
        /// Identifier the host assigned to the entity.
        entity: EntityId,
        /// Block the entity was placed in.
        pos: BlockPos,
    },
    /// The probed column had no usable ground.
    NoSurface {
        /// Column that was probed.
        column: ColumnCoord,
    },
    /// The position above the ground lies outside the spawnable bounds.
    OutOfBounds {
        /// Position that was rejected.
        pos: BlockPos,
    },
    /// The host refused to create the entity.
    Failed {
        /// Position that was requested.
        pos: BlockPos,
        /// Reason reported by the host.
        error: SpawnError,
    },
}

impl SpawnAttempt {
    /// Whether the attempt produced an entity.
    #[must_use]
    pub const fn is_spawned(&self) -> bool {
        matches!(self, Self::Spawned { .. })
    }
}

/// Summary of the batch spawned for one actor in one wave.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchReport {
    actor: ActorId,
    wave: WaveId,
    attempts: Vec<SpawnAttempt>,
}

impl BatchReport {
    /// Actor the batch was spawned around.
    #[must_use]
    pub const fn actor(&self) -> ActorId {
        self.actor
    }

    /// Wave the batch belongs to.
    #[must_use]
    pub const fn wave(&self) -> WaveId {
        self.wave
    }

    /// One entry per entity drawn for the batch, in placement order.
    #[must_use]
    pub fn attempts(&self) -> &[SpawnAttempt] {
        &self.attempts
    }

    /// Number of entities drawn for the batch.
    #[must_use]
    pub fn requested(&self) -> usize {
        self.attempts.len()
    }

    /// Number of entities the host actually created.
    #[must_use]
    pub fn spawned(&self) -> usize {
        self.attempts
            .iter()
            .filter(|attempt| attempt.is_spawned())
            .count()
    }
}

#[derive(Debug)]
struct WaveState {
    ticks_remaining: u32,
    ready_wave: Option<WaveId>,
    served_actors: HashSet<ActorId>,
}

/// Countdown-driven scheduler that spawns batches of entities near actors.
#[derive(Debug)]
pub struct WaveScheduler<R = ChaCha8Rng> {
    config: SpawnConfig,
    state: WaveState,
    rng: R,
}

impl WaveScheduler<ChaCha8Rng> {
    /// Creates a scheduler whose random draws replay identically for a given seed.
    #[must_use]
    pub fn seeded(config: SpawnConfig, seed: u64) -> Self {
        Self::new(config, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> WaveScheduler<R> {
    /// Creates a scheduler in the counting state, due after the minimum interval.
    #[must_use]
    pub fn new(config: SpawnConfig, rng: R) -> Self {
        let state = WaveState {
            ticks_remaining: config.min_interval_ticks(),
            ready_wave: None,
            served_actors: HashSet::new(),
        };
        Self { config, state, rng }
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> &SpawnConfig {
        &self.config
    }

    /// Ticks left until the next wave becomes ready.
    #[must_use]
    pub fn ticks_remaining(&self) -> u32 {
        self.state.ticks_remaining
    }

    /// Whether a wave has become ready. Stays set once the first wave arrives.
    #[must_use]
    pub fn is_wave_ready(&self) -> bool {
        self.state.ready_wave.is_some()
    }

    /// Most recent wave to become ready, if any.
    #[must_use]
    pub fn current_wave(&self) -> Option<WaveId> {
        self.state.ready_wave
    }

    /// Whether `actor` already received its batch for the current wave.
    #[must_use]
    pub fn has_served(&self, actor: ActorId) -> bool {
        self.state.served_actors.contains(&actor)
    }

    /// Number of actors served in the current wave.
    #[must_use]
    pub fn served_count(&self) -> usize {
        self.state.served_actors.len()
    }

    /// Advances the countdown by one tick. Returns the new wave when one
    /// becomes ready. Does nothing while spawning is inactive.
    pub fn advance_tick(&mut self) -> Option<WaveId> {
        if !self.config.active() {
            return None;
        }

        self.state.ticks_remaining = self.state.ticks_remaining.saturating_sub(1);
        if self.state.ticks_remaining > 0 {
            return None;
        }

        let wave = self
            .state
            .ready_wave
            .map_or(WaveId::new(1), WaveId::next);
        self.state.ready_wave = Some(wave);
        self.state.served_actors.clear();
        self.reroll_interval();

        debug!(
            wave = wave.get(),
            next_wave_in_ticks = self.state.ticks_remaining,
            "wave_ready"
        );
        Some(wave)
    }

    /// Spawns the current wave's batch around `actor` unless it was already served.
    ///
    /// Each entity is placed independently: a column without ground, a
    /// position out of bounds or a host refusal skips only that entity.
    pub fn maybe_serve_actor<W, S>(
        &mut self,
        actor: ActorId,
        position: BlockPos,
        world: &W,
        sink: &mut S,
    ) -> Option<BatchReport>
    where
        W: WorldAccess + ?Sized,
        S: SpawnSink + ?Sized,
    {
        let wave = self.state.ready_wave?;
        if self.state.served_actors.contains(&actor) {
            return None;
        }

        let count = self.draw_count();
        let kind = self.config.entity_kind().clone();
        let origin = position.column();
        let attempts = (0..count)
            .map(|_| self.spawn_one(&kind, origin, world, sink))
            .collect();
        let _ = self.state.served_actors.insert(actor);

        let report = BatchReport {
            actor,
            wave,
            attempts,
        };
        debug!(
            actor = actor.get(),
            wave = wave.get(),
            requested = report.requested(),
            spawned = report.spawned(),
            "batch_served"
        );
        Some(report)
    }

    /// Removes `actor` from the served set, typically when it disconnects.
    pub fn forget_actor(&mut self, actor: ActorId) {
        let _ = self.state.served_actors.remove(&actor);
    }

    /// Draws a batch size uniformly from the configured count bounds.
    pub fn draw_count(&mut self) -> u32 {
        self.rng
            .gen_range(self.config.min_count()..=self.config.max_count())
    }

    /// Enables or disables wave advancement. Batches already in progress complete.
    pub fn set_active(&mut self, active: bool) {
        self.config.set_active(active);
    }

    /// Replaces the kind of entity spawned in future batches.
    pub fn set_entity_kind(&mut self, kind: EntityKind) {
        self.config.set_entity_kind(kind);
    }

    /// Replaces the wave interval and restarts the countdown from the new bounds.
    pub fn set_interval(&mut self, min_secs: u32, max_secs: u32) -> Result<(), ConfigError> {
        self.config.set_interval_secs(min_secs, max_secs)?;
        self.reroll_interval();
        Ok(())
    }

    /// Replaces the per-wave count bounds.
    pub fn set_count(&mut self, min: u32, max: u32) -> Result<(), ConfigError> {
        self.config.set_counts(min, max)
    }

    /// Replaces the horizontal spawn radius.
    pub fn set_radius(&mut self, radius: u32) -> Result<(), ConfigError> {
        self.config.set_radius(radius)
    }

    fn reroll_interval(&mut self) {
        self.state.ticks_remaining = self
            .rng
            .gen_range(self.config.min_interval_ticks()..=self.config.max_interval_ticks());
    }

    fn spawn_one<W, S>(
        &mut self,
        kind: &EntityKind,
        origin: ColumnCoord,
        world: &W,
        sink: &mut S,
    ) -> SpawnAttempt
    where
        W: WorldAccess + ?Sized,
        S: SpawnSink + ?Sized,
    {
        let radius = i32::try_from(self.config.max_spawn_radius()).unwrap_or(i32::MAX);
        let dx = self.rng.gen_range(-radius..=radius);
        let dz = self.rng.gen_range(-radius..=radius);
        let column = origin.offset(dx, dz);

        let surface = match find_ground_level(world, column) {
            Ok(surface) => surface,
            Err(error) => {
                trace!(%error, "spawn_skipped");
                return SpawnAttempt::NoSurface { column };
            }
        };

        let pos = column.at(surface.get()).above(SPAWN_HEIGHT);
        if !world.is_in_spawnable_bounds(pos) {
            trace!(%pos, "spawn_out_of_bounds");
            return SpawnAttempt::OutOfBounds { pos };
        }

        match sink.try_spawn(kind, pos) {
            Ok(entity) => SpawnAttempt::Spawned { entity, pos },
            Err(error) => {
                warn!(%kind, %pos, %error, "spawn_failed");
                SpawnAttempt::Failed { pos, error }
            }
        }
    }
}
