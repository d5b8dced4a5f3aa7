#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Operator command surface that reconfigures the wave scheduler.
//!
//! Command lines such as `setSpawnInterval 30 90` are parsed into
//! [`Command`] values, checked against the issuer's permission level and
//! applied to a [`WaveScheduler`]. Every successful command produces a
//! human-readable [`Feedback`] message for the issuer.

use std::{fmt, str::SplitWhitespace};

use rand::Rng;
use thiserror::Error;
use tracing::info;
use wave_spawner_core::{Command, ConfigError, EntityKind, EntityKindError, SummonableRegistry};
use wave_spawner_system_spawning::WaveScheduler;

/// Permission level an issuer needs before any spawner command is accepted.
pub const REQUIRED_PERMISSION_LEVEL: u8 = 2;

const CONSOLE_PERMISSION_LEVEL: u8 = 4;
const MIN_INTEGER_ARGUMENT: u32 = 1;

/// Identity and privileges of whoever issued a command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandSource {
    name: String,
    permission_level: u8,
}

impl CommandSource {
    /// Creates a source with the provided display name and permission level.
    #[must_use]
    pub fn new(name: impl Into<String>, permission_level: u8) -> Self {
        Self {
            name: name.into(),
            permission_level,
        }
    }

    /// The server console, which holds every permission.
    #[must_use]
    pub fn console() -> Self {
        Self::new("Server", CONSOLE_PERMISSION_LEVEL)
    }

    /// Display name of the issuer.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Permission level of the issuer.
    #[must_use]
    pub const fn permission_level(&self) -> u8 {
        self.permission_level
    }
}

/// Confirmation returned to the issuer of a successful command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Feedback {
    message: String,
}

impl Feedback {
    /// Message text.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Reasons a command is rejected. The spawner configuration is left untouched.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The issuer lacks the required permission level.
    #[error("{name} has permission level {level}, {required} is required")]
    PermissionDenied {
        /// Display name of the issuer.
        name: String,
        /// Permission level of the issuer.
        level: u8,
        /// Permission level the command requires.
        required: u8,
    },
    /// The command line was blank.
    #[error("no command given")]
    Empty,
    /// The first token names no known command.
    #[error("unknown command '{name}'")]
    UnknownCommand {
        /// Token that was given.
        name: String,
    },
    /// A required argument was absent.
    #[error("{command}: missing argument <{argument}>")]
    MissingArgument {
        /// Command being parsed.
        command: &'static str,
        /// Name of the absent argument.
        argument: &'static str,
    },
    /// More tokens followed the last argument.
    #[error("{command}: unexpected argument '{value}'")]
    UnexpectedArgument {
        /// Command being parsed.
        command: &'static str,
        /// First surplus token.
        value: String,
    },
    /// A boolean argument was neither `true` nor `false`.
    #[error("<{argument}>: expected true or false, found '{value}'")]
    InvalidBool {
        /// Name of the argument.
        argument: &'static str,
        /// Token that was given.
        value: String,
    },
    /// An integer argument did not parse.
    #[error("<{argument}>: expected an integer, found '{value}'")]
    InvalidInteger {
        /// Name of the argument.
        argument: &'static str,
        /// Token that was given.
        value: String,
    },
    /// An integer argument was below the accepted minimum.
    #[error("<{argument}>: integer must not be less than {min}, found {value}")]
    IntegerTooSmall {
        /// Name of the argument.
        argument: &'static str,
        /// Value that was given.
        value: i64,
        /// Smallest accepted value.
        min: u32,
    },
    /// An entity identifier did not parse.
    #[error("<{argument}>: invalid identifier '{value}'")]
    InvalidEntity {
        /// Name of the argument.
        argument: &'static str,
        /// Token that was given.
        value: String,
        /// Parse failure.
        #[source]
        error: EntityKindError,
    },
    /// The identifier names no summonable entity.
    #[error("unknown entity '{kind}'")]
    UnknownEntity {
        /// Identifier that was given.
        kind: EntityKind,
    },
    /// The scheduler rejected the new parameters.
    #[error("invalid parameter: {0}")]
    InvalidParameter(#[from] ConfigError),
}

/// Parses a command line into a [`Command`]. A leading `/` is ignored.
pub fn parse(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    let line = line.strip_prefix('/').unwrap_or(line);
    let mut tokens = line.split_whitespace();
    let name = tokens.next().ok_or(CommandError::Empty)?;

    let command = match name {
        "setSpawnActive" => {
            let mut args = Arguments::new("setSpawnActive", tokens);
            let active = args.bool("value")?;
            args.finish()?;
            Command::SetSpawnActive { active }
        }
        "setSpawnMob" => {
            let mut args = Arguments::new("setSpawnMob", tokens);
            let kind = args.entity("entity")?;
            args.finish()?;
            Command::SetSpawnMob { kind }
        }
        "setSpawnInterval" => {
            let mut args = Arguments::new("setSpawnInterval", tokens);
            let min_secs = args.int("minSecs")?;
            let max_secs = args.int("maxSecs")?;
            args.finish()?;
            Command::SetSpawnInterval { min_secs, max_secs }
        }
        "setSpawnCount" => {
            let mut args = Arguments::new("setSpawnCount", tokens);
            let min = args.int("min")?;
            let max = args.int("max")?;
            args.finish()?;
            Command::SetSpawnCount { min, max }
        }
        "setSpawnRadius" => {
            let mut args = Arguments::new("setSpawnRadius", tokens);
            let distance = args.int("dist")?;
            args.finish()?;
            Command::SetSpawnRadius { distance }
        }
        other => {
            return Err(CommandError::UnknownCommand {
                name: other.to_owned(),
            })
        }
    };

    Ok(command)
}

/// Checks the issuer's permission and applies `command` to the scheduler.
pub fn execute<R, G>(
    scheduler: &mut WaveScheduler<R>,
    registry: &G,
    source: &CommandSource,
    command: Command,
) -> Result<Feedback, CommandError>
where
    R: Rng,
    G: SummonableRegistry + ?Sized,
{
    authorize(source)?;

    let name = command.name();
    let message = match command {
        Command::SetSpawnActive { active } => {
            scheduler.set_active(active);
            if active {
                "Spawning enabled".to_owned()
            } else {
                "Spawning disabled".to_owned()
            }
        }
        Command::SetSpawnMob { kind } => {
            if !registry.is_summonable(&kind) {
                return Err(CommandError::UnknownEntity { kind });
            }
            let message = format!("{kind} will spawn");
            scheduler.set_entity_kind(kind);
            message
        }
        Command::SetSpawnInterval { min_secs, max_secs } => {
            scheduler.set_interval(min_secs, max_secs)?;
            format!("Mobs will spawn every {min_secs}-{max_secs} seconds")
        }
        Command::SetSpawnCount { min, max } => {
            scheduler.set_count(min, max)?;
            format!("{min}-{max} mobs will spawn")
        }
        Command::SetSpawnRadius { distance } => {
            scheduler.set_radius(distance)?;
            format!("Mobs will spawn up to {distance} blocks away")
        }
    };

    info!(source = source.name(), command = name, %message, "command_applied");
    Ok(Feedback { message })
}

/// Parses and executes a command line on behalf of `source`.
///
/// Permission is checked before parsing so unprivileged issuers learn
/// nothing about the command grammar.
pub fn dispatch<R, G>(
    scheduler: &mut WaveScheduler<R>,
    registry: &G,
    source: &CommandSource,
    line: &str,
) -> Result<Feedback, CommandError>
where
    R: Rng,
    G: SummonableRegistry + ?Sized,
{
    authorize(source)?;
    let command = parse(line)?;
    execute(scheduler, registry, source, command)
}

fn authorize(source: &CommandSource) -> Result<(), CommandError> {
    if source.permission_level < REQUIRED_PERMISSION_LEVEL {
        return Err(CommandError::PermissionDenied {
            name: source.name.clone(),
            level: source.permission_level,
            required: REQUIRED_PERMISSION_LEVEL,
        });
    }
    Ok(())
}

struct Arguments<'a> {
    command: &'static str,
    tokens: SplitWhitespace<'a>,
}

impl<'a> Arguments<'a> {
    fn new(command: &'static str, tokens: SplitWhitespace<'a>) -> Self {
        Self { command, tokens }
    }

    fn take(&mut self, argument: &'static str) -> Result<&'a str, CommandError> {
        self.tokens.next().ok_or(CommandError::MissingArgument {
            command: self.command,
            argument,
        })
    }

    fn bool(&mut self, argument: &'static str) -> Result<bool, CommandError> {
        match self.take(argument)? {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(CommandError::InvalidBool {
                argument,
                value: other.to_owned(),
            }),
        }
    }

    fn int(&mut self, argument: &'static str) -> Result<u32, CommandError> {
        let token = self.take(argument)?;
        let invalid = || CommandError::InvalidInteger {
            argument,
            value: token.to_owned(),
        };
        let value: i64 = token.parse().map_err(|_| invalid())?;
        if value < i64::from(MIN_INTEGER_ARGUMENT) {
            return Err(CommandError::IntegerTooSmall {
                argument,
                value,
                min: MIN_INTEGER_ARGUMENT,
            });
        }
        u32::try_from(value).map_err(|_| invalid())
    }

    fn entity(&mut self, argument: &'static str) -> Result<EntityKind, CommandError> {
        let token = self.take(argument)?;
        token
            .parse()
            .map_err(|error| CommandError::InvalidEntity {
                argument,
                value: token.to_owned(),
                error,
            })
    }

    fn finish(mut self) -> Result<(), CommandError> {
        match self.tokens.next() {
            Some(value) => Err(CommandError::UnexpectedArgument {
                command: self.command,
                value: value.to_owned(),
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_slash_is_ignored() {
        assert_eq!(
            parse("/setSpawnActive false"),
            Ok(Command::SetSpawnActive { active: false })
        );
    }

    #[test]
    fn integers_below_one_are_rejected() {
        assert_eq!(
            parse("setSpawnRadius 0"),
            Err(CommandError::IntegerTooSmall {
                argument: "dist",
                value: 0,
                min: 1,
            })
        );
        assert_eq!(
            parse("setSpawnCount -3 4"),
            Err(CommandError::IntegerTooSmall {
                argument: "min",
                value: -3,
                min: 1,
            })
        );
    }

    #[test]
    fn oversized_integers_are_invalid() {
        assert!(matches!(
            parse("setSpawnRadius 99999999999"),
            Err(CommandError::InvalidInteger { argument: "dist", .. })
        ));
    }
}
