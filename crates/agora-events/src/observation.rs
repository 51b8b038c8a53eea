//! Observation Types
//!
//! The read-only view of the world handed to an agent before it decides.
//! An observation is a value, not a reference: agents can never reach the
//! live world state through it.

use serde::{Deserialize, Serialize};

use crate::event::Event;

/// How many of the most recent events an observation carries.
pub const RECENT_EVENTS_WINDOW: usize = 5;

/// Publicly observable world state at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Current world time
    pub time: u64,
    /// Current market price
    pub market_price: f64,
    /// Current market volatility
    pub volatility: f64,
    /// Shared resource pool
    pub resources: u32,
    /// Number of registered agents
    pub num_agents: usize,
    /// Tail of the event log, newest last
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recent_events: Vec<Event>,
}

impl Observation {
    /// Returns the most recent event, if any.
    pub fn latest_event(&self) -> Option<&Event> {
        self.recent_events.last()
    }
}
