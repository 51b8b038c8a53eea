//! Shared action, event, and snapshot types for the agora simulation.
//!
//! This crate contains pure data structures with no simulation logic.
//! It is a dependency for all other crates in the workspace.

pub mod action;
pub mod event;
pub mod observation;
pub mod snapshot;

#[cfg(feature = "test-fixtures")]
pub mod fixtures;

// Re-export action types
pub use action::{Action, ActionKind, ActionPayload, MessageTarget, PriceDirection, TradeDirection};

// Re-export event types
pub use event::{generate_event_id, Event, FailureReason, Outcome, OutcomeDetail};

// Re-export observation types
pub use observation::{Observation, RECENT_EVENTS_WINDOW};

// Re-export snapshot types
pub use snapshot::{
    generate_snapshot_id, generate_world_id, AgentSnapshot, MarketSnapshot, WorldSnapshot,
};
