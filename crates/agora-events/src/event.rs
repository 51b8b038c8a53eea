//! Event Types
//!
//! An event is the immutable record of one attempted action and its
//! resolution outcome. Events are only ever appended to the world log,
//! never edited, removed, or reordered.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::action::{Action, MessageTarget, PriceDirection, TradeDirection};

/// Generates an event ID with the given sequence number.
pub fn generate_event_id(sequence: u64) -> String {
    format!("evt_{:08}", sequence)
}

/// Why an action failed to resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// The kind tag was not recognized by the resolver
    UnknownActionKind,
    /// The payload was malformed (bad amount, empty message, ...)
    InvalidAction { detail: String },
    /// The agent could not cover the fee or the order
    InsufficientBalance,
    /// A sell was submitted with no holdings to sell
    NothingToSell,
    /// The acting agent has no account in this world
    AgentNotRegistered,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::UnknownActionKind => write!(f, "unknown action kind"),
            FailureReason::InvalidAction { detail } => write!(f, "invalid action: {}", detail),
            FailureReason::InsufficientBalance => write!(f, "insufficient balance"),
            FailureReason::NothingToSell => write!(f, "nothing to sell"),
            FailureReason::AgentNotRegistered => write!(f, "agent not registered"),
        }
    }
}

/// Kind-specific result data for a successfully resolved action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeDetail {
    /// Public market figures at resolution time
    Observation {
        market_price: f64,
        volatility: f64,
        resources: u32,
    },
    /// An executed (possibly partial) trade
    TradeFill {
        direction: TradeDirection,
        requested: f64,
        executed: f64,
        price: f64,
        balance_after: f64,
        holdings_after: f64,
    },
    /// The recorded forecast, echoed back
    Prediction {
        direction: PriceDirection,
        confidence: f64,
    },
    /// A delivered message
    Delivery {
        target: MessageTarget,
        message: String,
    },
}

/// Result of resolving one action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    /// Whether the action was applied
    pub success: bool,
    /// Present on failures only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<FailureReason>,
    /// Fee charged for the action (zero on failure)
    pub fee: f64,
    /// Kind-specific result data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<OutcomeDetail>,
}

impl Outcome {
    /// Creates a successful outcome.
    pub fn success(fee: f64, detail: OutcomeDetail) -> Self {
        Self {
            success: true,
            reason: None,
            fee,
            detail: Some(detail),
        }
    }

    /// Creates a failed outcome. Failed actions charge no fee.
    pub fn failure(reason: FailureReason) -> Self {
        Self {
            success: false,
            reason: Some(reason),
            fee: 0.0,
            detail: None,
        }
    }
}

/// Immutable record of an attempted action and its outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Sequential id, `evt_########`
    pub event_id: String,
    /// World time at which the action was resolved
    pub time: u64,
    /// The action as submitted
    pub action: Action,
    /// How resolution went
    pub outcome: Outcome,
}

impl Event {
    /// Returns the id of the agent that issued the recorded action.
    pub fn agent_id(&self) -> &str {
        &self.action.agent_id
    }

    /// Serializes this event as a single JSONL line.
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parses an event from a JSONL line.
    pub fn from_jsonl(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}
