/// Error types for the simulation core and its configuration.
///
/// Blocked moves and zero health are normal control flow and never show up
/// here. Only conditions the caller has to decide about are errors.

use thiserror::Error;

use crate::domain::movement::Obstacle;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SimError {
    /// Level generation asked for more unique placements than the interior has.
    #[error("grid exhausted: no free interior cell left after {claimed} claims")]
    ExhaustedGrid { claimed: usize },

    /// A step vector that is not a single cardinal unit step.
    #[error("invalid direction ({dx}, {dy}): expected one cardinal step")]
    InvalidDirection { dx: i32, dy: i32 },

    /// The targeted actor was already removed from play.
    #[error("{0} has already been removed from play")]
    ActorAlreadyDestroyed(Obstacle),

    /// The level configuration handed to the core was rejected.
    #[error("invalid level config: {0}")]
    Config(#[from] ConfigError),
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("config.toml parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{name}: minimum {min} is greater than maximum {max}")]
    InvalidRange { name: &'static str, min: u32, max: u32 },

    #[error("board must be at least 3x3, got {columns}x{rows}")]
    BoardTooSmall { columns: i32, rows: i32 },

    #[error("at least one enemy kind must be configured")]
    NoEnemyKinds,

    #[error("{name} must be positive")]
    NonPositive { name: &'static str },

    #[error("{name} is {value}, above the largest counter value {}", i32::MAX)]
    TooLarge { name: &'static str, value: u32 },
}
