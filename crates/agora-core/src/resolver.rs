//! Action resolution.
//!
//! The resolver is the only component allowed to judge an action. It
//! validates the payload against current state, applies the mutation in
//! full or not at all, and always returns an event — rejected actions are
//! logged as failures, never dropped, so the event log accounts for every
//! action ever submitted.

use agora_events::{
    Action, ActionPayload, Event, FailureReason, MessageTarget, Outcome, OutcomeDetail,
    PriceDirection, TradeDirection,
};

use crate::world::WorldState;

/// Resolves market actions against world state.
///
/// Charges a flat fee per successful action. Failed actions charge
/// nothing: validation runs to completion before any mutation.
#[derive(Debug, Clone)]
pub struct MarketResolver {
    fee: f64,
}

impl MarketResolver {
    pub fn new(fee: f64) -> Self {
        Self { fee }
    }

    /// Resolves one action into an event. Never panics, never skips.
    pub fn resolve(&self, action: &Action, state: &mut WorldState) -> Event {
        let outcome = self.resolve_outcome(action, state);
        if let Some(reason) = &outcome.reason {
            tracing::debug!(
                agent = %action.agent_id,
                kind = %action.kind(),
                %reason,
                "action rejected"
            );
        }
        Event {
            event_id: state.alloc_event_id(),
            time: state.time,
            action: action.clone(),
            outcome,
        }
    }

    fn resolve_outcome(&self, action: &Action, state: &mut WorldState) -> Outcome {
        let Some(account) = state.account(&action.agent_id).copied() else {
            return Outcome::failure(FailureReason::AgentNotRegistered);
        };

        match &action.payload {
            ActionPayload::Unknown => Outcome::failure(FailureReason::UnknownActionKind),
            ActionPayload::Observe => {
                if account.balance < self.fee {
                    return Outcome::failure(FailureReason::InsufficientBalance);
                }
                let detail = OutcomeDetail::Observation {
                    market_price: state.market_price,
                    volatility: state.volatility,
                    resources: state.resources,
                };
                self.charge_fee(&action.agent_id, state);
                Outcome::success(self.fee, detail)
            }
            ActionPayload::Trade { direction, amount } => {
                self.resolve_trade(&action.agent_id, *direction, *amount, &account, state)
            }
            ActionPayload::Predict {
                direction,
                confidence,
            } => self.resolve_predict(&action.agent_id, *direction, *confidence, &account, state),
            ActionPayload::Communicate { message, target } => {
                self.resolve_communicate(&action.agent_id, message, target, &account, state)
            }
        }
    }

    fn resolve_trade(
        &self,
        agent_id: &str,
        direction: TradeDirection,
        amount: f64,
        account: &crate::world::Account,
        state: &mut WorldState,
    ) -> Outcome {
        if !amount.is_finite() || amount <= 0.0 {
            return Outcome::failure(FailureReason::InvalidAction {
                detail: format!("trade amount must be positive, got {}", amount),
            });
        }
        if account.balance < self.fee {
            return Outcome::failure(FailureReason::InsufficientBalance);
        }

        let price = state.market_price;
        match direction {
            TradeDirection::Buy => {
                if account.balance < self.fee + amount {
                    return Outcome::failure(FailureReason::InsufficientBalance);
                }
                let executed = amount;
                let balance_after = account.balance - self.fee - executed;
                let holdings_after = account.holdings + executed / price;
                if let Some(acct) = state.account_mut(agent_id) {
                    acct.balance = balance_after;
                    acct.holdings = holdings_after;
                }
                state.total_volume += executed;
                Outcome::success(
                    self.fee,
                    OutcomeDetail::TradeFill {
                        direction,
                        requested: amount,
                        executed,
                        price,
                        balance_after,
                        holdings_after,
                    },
                )
            }
            TradeDirection::Sell => {
                if account.holdings <= 0.0 {
                    return Outcome::failure(FailureReason::NothingToSell);
                }
                let executed = amount.min(account.holdings);
                let balance_after = account.balance - self.fee + executed * price;
                let holdings_after = account.holdings - executed;
                if let Some(acct) = state.account_mut(agent_id) {
                    acct.balance = balance_after;
                    acct.holdings = holdings_after;
                }
                state.total_volume += executed;
                Outcome::success(
                    self.fee,
                    OutcomeDetail::TradeFill {
                        direction,
                        requested: amount,
                        executed,
                        price,
                        balance_after,
                        holdings_after,
                    },
                )
            }
        }
    }

    fn resolve_predict(
        &self,
        agent_id: &str,
        direction: PriceDirection,
        confidence: f64,
        account: &crate::world::Account,
        state: &mut WorldState,
    ) -> Outcome {
        if !confidence.is_finite() || !(0.0..=1.0).contains(&confidence) {
            return Outcome::failure(FailureReason::InvalidAction {
                detail: format!("confidence must be in [0, 1], got {}", confidence),
            });
        }
        if account.balance < self.fee {
            return Outcome::failure(FailureReason::InsufficientBalance);
        }
        self.charge_fee(agent_id, state);
        Outcome::success(
            self.fee,
            OutcomeDetail::Prediction {
                direction,
                confidence,
            },
        )
    }

    fn resolve_communicate(
        &self,
        agent_id: &str,
        message: &str,
        target: &MessageTarget,
        account: &crate::world::Account,
        state: &mut WorldState,
    ) -> Outcome {
        if message.trim().is_empty() {
            return Outcome::failure(FailureReason::InvalidAction {
                detail: "message must not be empty".to_string(),
            });
        }
        if account.balance < self.fee {
            return Outcome::failure(FailureReason::InsufficientBalance);
        }
        self.charge_fee(agent_id, state);
        Outcome::success(
            self.fee,
            OutcomeDetail::Delivery {
                target: target.clone(),
                message: message.to_string(),
            },
        )
    }

    fn charge_fee(&self, agent_id: &str, state: &mut WorldState) {
        if let Some(acct) = state.account_mut(agent_id) {
            acct.balance -= self.fee;
        }
    }
}
