//! Sample data fixtures for testing.
//!
//! Ready-made actions and events for other crates' tests. Enable the
//! `test-fixtures` feature to access these helpers.
//!
//! # Example
//!
//! ```ignore
//! // In your Cargo.toml:
//! // [dev-dependencies]
//! // agora-events = { path = "../agora-events", features = ["test-fixtures"] }
//!
//! use agora_events::fixtures;
//!
//! let events = fixtures::sample_events();
//! ```

use crate::action::{Action, ActionPayload, TradeDirection};
use crate::event::{generate_event_id, Event, FailureReason, Outcome, OutcomeDetail};

/// A buy action from the given agent at the given tick.
pub fn buy_action(agent_id: &str, amount: f64, time: u64) -> Action {
    Action::new(agent_id, ActionPayload::trade(TradeDirection::Buy, amount), time)
}

/// An observe action from the given agent at the given tick.
pub fn observe_action(agent_id: &str, time: u64) -> Action {
    Action::new(agent_id, ActionPayload::Observe, time)
}

/// A successfully resolved buy event.
pub fn filled_buy_event(sequence: u64, agent_id: &str, amount: f64, time: u64) -> Event {
    let price = 100.0;
    Event {
        event_id: generate_event_id(sequence),
        time,
        action: buy_action(agent_id, amount, time),
        outcome: Outcome::success(
            1.0,
            OutcomeDetail::TradeFill {
                direction: TradeDirection::Buy,
                requested: amount,
                executed: amount,
                price,
                balance_after: 100.0 - 1.0 - amount,
                holdings_after: amount / price,
            },
        ),
    }
}

/// A failed event carrying an unknown action kind.
pub fn unknown_kind_event(sequence: u64, agent_id: &str, time: u64) -> Event {
    Event {
        event_id: generate_event_id(sequence),
        time,
        action: Action::new(agent_id, ActionPayload::Unknown, time),
        outcome: Outcome::failure(FailureReason::UnknownActionKind),
    }
}

/// A short mixed event log: two filled buys and one rejected unknown kind.
pub fn sample_events() -> Vec<Event> {
    vec![
        filled_buy_event(1, "agent_0001", 5.0, 1),
        filled_buy_event(2, "agent_0002", 2.0, 1),
        unknown_kind_event(3, "agent_0001", 2),
    ]
}
