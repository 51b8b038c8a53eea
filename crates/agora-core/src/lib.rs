//! Agora simulation engine: world, agents, resolution, scheduling.
//!
//! A discrete-time multi-agent market simulation. Each tick the market
//! moves, then every registered agent observes the world, decides one
//! action, and has it resolved into an append-only event log — strictly
//! in registration order, so a run is fully determined by its seed and
//! roster.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────┐  start/stop/step   ┌───────┐  decide   ┌────────┐
//! │ scheduler │ ─────────────────▶ │ world │ ────────▶ │ agents │
//! └───────────┘                    └───────┘ ◀──────── └────────┘
//!                                      │       action
//!                             resolve  ▼
//!                                 ┌──────────┐   events.jsonl / snapshots
//!                                 │ resolver │ ────────────────────────▶
//!                                 └──────────┘
//! ```
//!
//! # Modules
//!
//! - [`world`]: shared state, the tick loop, and the pricing policy
//! - [`agents`]: agent identity, memory, and decision strategies
//! - [`resolver`]: action validation and application
//! - [`scheduler`]: serialized manual and interval-driven stepping
//! - [`ledger`]: optional best-effort external event sink
//! - [`output`]: JSONL event log and periodic snapshot files
//! - [`config`]: TOML configuration
//! - [`setup`]: world construction from configuration

pub mod agents;
pub mod config;
pub mod error;
pub mod ledger;
pub mod output;
pub mod resolver;
pub mod scheduler;
pub mod setup;
pub mod world;

// Re-export agent types
pub use agents::{
    Agent, CautiousStrategy, MomentumStrategy, RandomStrategy, Strategy, StrategyKind,
    TrendFollowerStrategy, MEMORY_LIMIT,
};

// Re-export config types
pub use config::{
    default_config_toml, AgentSettings, MarketSettings, SchedulerSettings, SimConfig,
    WorldSettings,
};

// Re-export error types
pub use error::{ConfigError, DecideError, OutputError, RegisterError};

// Re-export ledger types
pub use ledger::{JsonlLedger, LedgerEntry, LedgerSink, NullLedger};

// Re-export output types
pub use output::{EventLogger, SnapshotWriter};

// Re-export resolver types
pub use resolver::MarketResolver;

// Re-export scheduler types
pub use scheduler::Scheduler;

// Re-export world types
pub use world::{Account, GaussianWalk, PricingPolicy, World, WorldConfig, WorldState};

// Re-export setup functions
pub use setup::{build_agent, build_world};
