//! Snapshot Types
//!
//! Serialization structs for world snapshots.
//!
//! Snapshots capture the complete public state of a world at a point in
//! time. UI and API layers poll these instead of touching the live world.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::event::Event;

/// Generates a snapshot ID with the given sequence number.
pub fn generate_snapshot_id(sequence: u64) -> String {
    format!("snap_{:06}", sequence)
}

/// Generates a short world id, eight hex characters.
pub fn generate_world_id() -> String {
    let id = Uuid::new_v4().simple().to_string();
    id[..8].to_string()
}

/// Market figures at snapshot time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub market_price: f64,
    pub volatility: f64,
    pub resources: u32,
    /// Cumulative traded volume since world creation or last reset
    pub total_volume: f64,
}

/// One agent's public summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub agent_id: String,
    pub name: String,
    pub strategy: String,
    pub balance: f64,
    pub holdings: f64,
    pub action_count: u64,
    pub success_rate: f64,
    pub memory_size: usize,
}

impl AgentSnapshot {
    /// Total value of balance plus holdings at the given price.
    pub fn portfolio_value(&self, market_price: f64) -> f64 {
        self.balance + self.holdings * market_price
    }
}

/// Complete world snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub snapshot_id: String,
    pub world_id: String,
    pub world_name: String,
    pub time: u64,
    pub market: MarketSnapshot,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub agents: Vec<AgentSnapshot>,
    /// Length of the full event log at snapshot time
    pub event_count: usize,
    /// Tail of the event log, newest last
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recent_events: Vec<Event>,
}
