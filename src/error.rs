// Error types for session configuration and engine callbacks.

use thiserror::Error;

/// Rejections raised by `Engine::start_session` and settings parsing.
/// Nothing is mutated when one of these is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("unknown game mode: {0}")]
    UnknownMode(String),

    #[error("unknown flick difficulty: {0}")]
    UnknownDifficulty(String),

    #[error("unknown tracking pattern: {0}")]
    UnknownPattern(String),

    #[error("session duration must be at least one second")]
    InvalidDuration,

    #[error("target lifetime must be a finite, non-negative number of seconds: {0}")]
    InvalidTargetLifetime(f64),

    #[error("moving target speed must be finite and positive: {0}")]
    InvalidSpeed(f64),

    #[error("arena {width}x{height} is too small to host a target")]
    ArenaTooSmall { width: f64, height: f64 },
}

/// Faults raised while running a scheduled callback. The engine aborts the
/// current session when one of these escapes a mode behavior.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("{0} mode expected a live target but none exists")]
    MissingTarget(&'static str),

    #[error("invalid tick delta: {0}")]
    InvalidDelta(f64),
}

pub type Result<T> = std::result::Result<T, EngineError>;
