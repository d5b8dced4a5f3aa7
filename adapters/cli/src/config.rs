use std::{fs, path::Path};

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Deserialize;
use wave_spawner_core::{EntityKind, SpawnConfig, TICKS_PER_SECOND};

/// Settings read from the optional TOML configuration file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct FileConfig {
    /// Seed for the scheduler's random source.
    pub(crate) seed: Option<u64>,
    /// Spawner parameters.
    pub(crate) spawn: SpawnSection,
    /// Shape of the headless world.
    pub(crate) world: WorldSection,
}

/// The `[spawn]` table. Absent keys keep their defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct SpawnSection {
    active: Option<bool>,
    mob: Option<EntityKind>,
    min_count: Option<u32>,
    max_count: Option<u32>,
    min_interval_secs: Option<u32>,
    max_interval_secs: Option<u32>,
    radius: Option<u32>,
}

/// The `[world]` table.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct WorldSection {
    pub(crate) height: Option<i32>,
    pub(crate) floor: Option<i32>,
    pub(crate) terrain: Option<TerrainKind>,
}

/// Terrain generators selectable from the file or the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub(crate) enum TerrainKind {
    /// Open sky above a flat floor.
    Flat,
    /// Flat floor beneath a solid roof.
    Roofed,
    /// No blocks at all.
    Void,
}

impl SpawnSection {
    /// Applies the section on top of the default configuration using the
    /// same validation as operator commands.
    pub(crate) fn build(&self) -> Result<SpawnConfig> {
        let mut config = SpawnConfig::default();

        if let Some(active) = self.active {
            config.set_active(active);
        }
        if let Some(mob) = &self.mob {
            config.set_entity_kind(mob.clone());
        }
        if self.min_count.is_some() || self.max_count.is_some() {
            let min = self.min_count.unwrap_or(config.min_count());
            let max = self.max_count.unwrap_or(config.max_count());
            config
                .set_counts(min, max)
                .context("invalid [spawn] count bounds")?;
        }
        if self.min_interval_secs.is_some() || self.max_interval_secs.is_some() {
            let min = self
                .min_interval_secs
                .unwrap_or(config.min_interval_ticks() / TICKS_PER_SECOND);
            let max = self
                .max_interval_secs
                .unwrap_or(config.max_interval_ticks() / TICKS_PER_SECOND);
            config
                .set_interval_secs(min, max)
                .context("invalid [spawn] interval bounds")?;
        }
        if let Some(radius) = self.radius {
            config
                .set_radius(radius)
                .context("invalid [spawn] radius")?;
        }

        Ok(config)
    }
}

/// Reads and parses the configuration file at `path`.
pub(crate) fn load(path: &Path) -> Result<FileConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    parse(&contents).with_context(|| format!("failed to load config file {}", path.display()))
}

fn parse(contents: &str) -> Result<FileConfig> {
    toml::from_str(contents).context("failed to parse config toml contents")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let file = parse("").expect("empty config parses");
        assert_eq!(file.seed, None);
        assert_eq!(file.spawn.build().expect("defaults"), SpawnConfig::default());
        assert_eq!(file.world.terrain, None);
    }

    #[test]
    fn spawn_section_overrides_defaults() {
        let file = parse(
            r#"
            seed = 42

            [spawn]
            active = false
            mob = "minecraft:zombie"
            min_count = 2
            max_count = 5
            min_interval_secs = 10
            max_interval_secs = 20
            radius = 8

            [world]
            height = 128
            floor = 40
            terrain = "roofed"
            "#,
        )
        .expect("config parses");

        assert_eq!(file.seed, Some(42));
        assert_eq!(file.world.height, Some(128));
        assert_eq!(file.world.floor, Some(40));
        assert_eq!(file.world.terrain, Some(TerrainKind::Roofed));

        let config = file.spawn.build().expect("valid config");
        assert!(!config.active());
        assert_eq!(config.entity_kind().to_string(), "minecraft:zombie");
        assert_eq!((config.min_count(), config.max_count()), (2, 5));
        assert_eq!(config.min_interval_ticks(), 200);
        assert_eq!(config.max_interval_ticks(), 400);
        assert_eq!(config.max_spawn_radius(), 8);
    }

    #[test]
    fn partial_bounds_combine_with_defaults() {
        let file = parse("[spawn]\nmax_count = 12\n").expect("config parses");
        let config = file.spawn.build().expect("valid config");
        assert_eq!((config.min_count(), config.max_count()), (10, 12));
    }

    #[test]
    fn invalid_bounds_are_reported() {
        let file = parse("[spawn]\nmin_interval_secs = 30\nmax_interval_secs = 5\n")
            .expect("config parses");
        assert!(file.spawn.build().is_err());
    }

    #[test]
    fn malformed_identifiers_and_unknown_keys_fail_to_parse() {
        assert!(parse("[spawn]\nmob = \"Not Valid\"\n").is_err());
        assert!(parse("[spawn]\nspeed = 3\n").is_err());
    }
}
