//! Action Types
//!
//! Everything an agent can submit to the world, expressed as a tagged
//! variant. Payloads are validated semantically at the resolver boundary;
//! this module only fixes their shape.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeDirection {
    Buy,
    Sell,
}

impl fmt::Display for TradeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeDirection::Buy => write!(f, "buy"),
            TradeDirection::Sell => write!(f, "sell"),
        }
    }
}

/// Predicted direction of the market price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceDirection {
    Up,
    Down,
    Stable,
}

/// Recipient of a communicate action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MessageTarget {
    /// Broadcast to every registered agent
    #[default]
    All,
    /// A single agent, by id
    Agent { id: String },
}

/// Per-kind action payload.
///
/// The `kind` tag mirrors the wire format consumed by the dashboard layers.
/// Payloads arriving with a tag this enum does not know deserialize into
/// [`ActionPayload::Unknown`] so the resolver can reject them explicitly
/// instead of dropping them at the parse boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionPayload {
    /// Look at the public world state; always valid
    Observe,
    /// Buy or sell at the current market price
    Trade {
        direction: TradeDirection,
        amount: f64,
    },
    /// Record a price forecast
    Predict {
        direction: PriceDirection,
        confidence: f64,
    },
    /// Send a message to one agent or to everyone
    Communicate {
        message: String,
        #[serde(default)]
        target: MessageTarget,
    },
    /// Catch-all for unrecognized kind tags
    #[serde(other)]
    Unknown,
}

impl ActionPayload {
    /// Returns the kind of this payload.
    pub fn kind(&self) -> ActionKind {
        match self {
            ActionPayload::Observe => ActionKind::Observe,
            ActionPayload::Trade { .. } => ActionKind::Trade,
            ActionPayload::Predict { .. } => ActionKind::Predict,
            ActionPayload::Communicate { .. } => ActionKind::Communicate,
            ActionPayload::Unknown => ActionKind::Unknown,
        }
    }

    /// Convenience constructor for a buy or sell order.
    pub fn trade(direction: TradeDirection, amount: f64) -> Self {
        ActionPayload::Trade { direction, amount }
    }

    /// Convenience constructor for a broadcast message.
    pub fn broadcast(message: impl Into<String>) -> Self {
        ActionPayload::Communicate {
            message: message.into(),
            target: MessageTarget::All,
        }
    }
}

/// Action kind, without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Observe,
    Trade,
    Predict,
    Communicate,
    Unknown,
}

impl ActionKind {
    /// Returns the kinds the resolver accepts.
    pub fn known() -> &'static [ActionKind] {
        &[
            ActionKind::Observe,
            ActionKind::Trade,
            ActionKind::Predict,
            ActionKind::Communicate,
        ]
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::Observe => write!(f, "observe"),
            ActionKind::Trade => write!(f, "trade"),
            ActionKind::Predict => write!(f, "predict"),
            ActionKind::Communicate => write!(f, "communicate"),
            ActionKind::Unknown => write!(f, "unknown"),
        }
    }
}

/// An action as submitted by an agent, immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Id of the agent that produced the action
    pub agent_id: String,
    /// What the agent wants to do
    #[serde(flatten)]
    pub payload: ActionPayload,
    /// World time at which the action was issued
    pub time_issued: u64,
}

impl Action {
    /// Creates a new action stamped with the issuing tick.
    pub fn new(agent_id: impl Into<String>, payload: ActionPayload, time_issued: u64) -> Self {
        Self {
            agent_id: agent_id.into(),
            payload,
            time_issued,
        }
    }

    /// Returns the kind of the underlying payload.
    pub fn kind(&self) -> ActionKind {
        self.payload.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_kind_tag_round_trip() {
        let payload = ActionPayload::trade(TradeDirection::Buy, 5.0);
        let json = serde_json::to_string(&payload).unwrap();
        assert!(json.contains(r#""kind":"trade""#));
        assert!(json.contains(r#""direction":"buy""#));

        let back: ActionPayload = serde_json::from_str(&json).unwrap();
        assert_eq!(back, payload);
    }

    #[test]
    fn test_unknown_kind_deserializes_to_unknown() {
        let json = r#"{"kind":"teleport","destination":"mars"}"#;
        let payload: ActionPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload, ActionPayload::Unknown);
        assert_eq!(payload.kind(), ActionKind::Unknown);
    }

    #[test]
    fn test_communicate_target_defaults_to_all() {
        let json = r#"{"kind":"communicate","message":"hello"}"#;
        let payload: ActionPayload = serde_json::from_str(json).unwrap();
        match payload {
            ActionPayload::Communicate { target, .. } => assert_eq!(target, MessageTarget::All),
            other => panic!("expected communicate, got {:?}", other),
        }
    }

    #[test]
    fn test_action_flattens_payload() {
        let action = Action::new("agent_0001", ActionPayload::Observe, 7);
        let json = serde_json::to_string(&action).unwrap();
        assert!(json.contains(r#""kind":"observe""#));
        assert!(json.contains(r#""time_issued":7"#));

        let back: Action = serde_json::from_str(&json).unwrap();
        assert_eq!(back, action);
    }

    #[test]
    fn test_known_kinds_exclude_unknown() {
        assert!(!ActionKind::known().contains(&ActionKind::Unknown));
        assert_eq!(ActionKind::known().len(), 4);
    }
}
