//! Error taxonomy for the engine.
//!
//! Resolution-time problems are not represented here: the resolver turns
//! those into failed events so one misbehaving agent cannot abort a tick.
//! These types cover registration, decision, configuration, and output
//! failures that callers handle with `Result`.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised when registering an agent with a world.
#[derive(Debug, Error)]
pub enum RegisterError {
    /// An agent with this id is already registered
    #[error("agent id `{0}` is already registered")]
    DuplicateAgent(String),
    /// The world has reached its configured capacity
    #[error("world is full ({max_agents} agents)")]
    WorldFull { max_agents: usize },
}

/// Errors a strategy may raise while deciding.
///
/// None of these abort a tick: the world logs the error and substitutes an
/// observe no-op so the tick always completes.
#[derive(Debug, Error)]
pub enum DecideError {
    /// An external lookup exceeded its bounded wait
    #[error("decision timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
    /// The strategy's backing data source is unreachable
    #[error("decision backend unavailable: {0}")]
    Unavailable(String),
}

/// Errors loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Errors writing event logs or snapshots.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),
}
