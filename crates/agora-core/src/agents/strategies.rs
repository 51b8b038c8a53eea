//! Decision strategies.
//!
//! A strategy turns an observation into one action payload per tick.
//! Decisions must be deterministic given the observation, the strategy's
//! own accumulated state, and its seed; randomness is allowed only through
//! the seeded rng a strategy was constructed with. A strategy that fetches
//! external data must bound the wait and return [`DecideError::Timeout`]
//! when exceeded — the world substitutes an observe no-op so the tick
//! completes regardless.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;

use agora_events::{
    ActionPayload, MessageTarget, Observation, PriceDirection, TradeDirection,
};

use crate::error::DecideError;
use crate::world::Account;

/// A per-agent decision policy.
pub trait Strategy: Send {
    /// Stable name, used in snapshots and logs.
    fn name(&self) -> &'static str;

    /// Produces the next action given the public state and own account.
    fn decide(
        &mut self,
        observation: &Observation,
        account: &Account,
    ) -> Result<ActionPayload, DecideError>;

    /// Restores the strategy to its freshly-constructed state.
    fn reset(&mut self);
}

/// Built-in strategy selector, used by the config roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Random,
    Cautious,
    Momentum,
    TrendFollower,
}

impl StrategyKind {
    /// Constructs the strategy, seeding any internal rng.
    pub fn build(self, seed: u64) -> Box<dyn Strategy> {
        match self {
            StrategyKind::Random => Box::new(RandomStrategy::new(seed)),
            StrategyKind::Cautious => Box::new(CautiousStrategy::new()),
            StrategyKind::Momentum => Box::new(MomentumStrategy::new()),
            StrategyKind::TrendFollower => Box::new(TrendFollowerStrategy::new()),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Random => write!(f, "random"),
            StrategyKind::Cautious => write!(f, "cautious"),
            StrategyKind::Momentum => write!(f, "momentum"),
            StrategyKind::TrendFollower => write!(f, "trend_follower"),
        }
    }
}

/// Picks a uniformly random action each tick. Baseline for testing.
pub struct RandomStrategy {
    seed: u64,
    rng: SmallRng,
}

impl RandomStrategy {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl Strategy for RandomStrategy {
    fn name(&self) -> &'static str {
        "random"
    }

    fn decide(
        &mut self,
        observation: &Observation,
        _account: &Account,
    ) -> Result<ActionPayload, DecideError> {
        let payload = match self.rng.gen_range(0..4u8) {
            0 => ActionPayload::Observe,
            1 => {
                let direction = if self.rng.gen_bool(0.5) {
                    TradeDirection::Buy
                } else {
                    TradeDirection::Sell
                };
                ActionPayload::Trade {
                    direction,
                    amount: self.rng.gen_range(1.0..10.0),
                }
            }
            2 => {
                let direction = match self.rng.gen_range(0..3u8) {
                    0 => PriceDirection::Up,
                    1 => PriceDirection::Down,
                    _ => PriceDirection::Stable,
                };
                ActionPayload::Predict {
                    direction,
                    confidence: self.rng.gen::<f64>(),
                }
            }
            _ => ActionPayload::Communicate {
                message: format!("observed price: {:.2}", observation.market_price),
                target: MessageTarget::All,
            },
        };
        Ok(payload)
    }

    fn reset(&mut self) {
        self.rng = SmallRng::seed_from_u64(self.seed);
    }
}

/// Acts only when its rolling price window looks stable.
pub struct CautiousStrategy {
    price_history: Vec<f64>,
    confidence_threshold: f64,
}

impl CautiousStrategy {
    const HISTORY_LIMIT: usize = 10;
    const STABLE_DEVIATION: f64 = 5.0;
    const TRADE_SIZE: f64 = 2.0;

    pub fn new() -> Self {
        Self {
            price_history: Vec::new(),
            confidence_threshold: 0.7,
        }
    }

    /// Mean absolute deviation of the window, and confidence derived from it.
    fn assess(&self) -> (f64, f64) {
        if self.price_history.len() < 3 {
            return (0.0, 0.5);
        }
        let avg = self.price_history.iter().sum::<f64>() / self.price_history.len() as f64;
        let deviation = self
            .price_history
            .iter()
            .map(|p| (p - avg).abs())
            .sum::<f64>()
            / self.price_history.len() as f64;
        let confidence = (1.0 - deviation / avg).max(0.0);
        (deviation, confidence)
    }
}

impl Default for CautiousStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for CautiousStrategy {
    fn name(&self) -> &'static str {
        "cautious"
    }

    fn decide(
        &mut self,
        observation: &Observation,
        account: &Account,
    ) -> Result<ActionPayload, DecideError> {
        self.price_history.push(observation.market_price);
        if self.price_history.len() > Self::HISTORY_LIMIT {
            self.price_history.remove(0);
        }

        let (deviation, confidence) = self.assess();
        if confidence < self.confidence_threshold {
            return Ok(ActionPayload::Observe);
        }

        if deviation < Self::STABLE_DEVIATION {
            let direction = if account.holdings == 0.0 {
                TradeDirection::Buy
            } else {
                TradeDirection::Sell
            };
            return Ok(ActionPayload::trade(direction, Self::TRADE_SIZE));
        }

        Ok(ActionPayload::Observe)
    }

    fn reset(&mut self) {
        self.price_history.clear();
    }
}

/// Trades on last-two-tick price momentum; chatty when it cannot trade.
pub struct MomentumStrategy {
    price_history: Vec<f64>,
}

impl MomentumStrategy {
    const HISTORY_LIMIT: usize = 5;

    pub fn new() -> Self {
        Self {
            price_history: Vec::new(),
        }
    }

    fn momentum(&self) -> PriceDirection {
        match self.price_history.as_slice() {
            [.., prev, last] if last > prev => PriceDirection::Up,
            [.., _, _] => PriceDirection::Down,
            _ => PriceDirection::Stable,
        }
    }
}

impl Default for MomentumStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for MomentumStrategy {
    fn name(&self) -> &'static str {
        "momentum"
    }

    fn decide(
        &mut self,
        observation: &Observation,
        account: &Account,
    ) -> Result<ActionPayload, DecideError> {
        self.price_history.push(observation.market_price);
        if self.price_history.len() > Self::HISTORY_LIMIT {
            self.price_history.remove(0);
        }

        let momentum = self.momentum();
        match momentum {
            PriceDirection::Up if account.balance > 10.0 => Ok(ActionPayload::trade(
                TradeDirection::Buy,
                (account.balance * 0.3).min(20.0),
            )),
            PriceDirection::Down if account.holdings > 0.0 => Ok(ActionPayload::trade(
                TradeDirection::Sell,
                account.holdings * 0.5,
            )),
            _ => Ok(ActionPayload::Communicate {
                message: format!("looking for trades, momentum {:?}", momentum),
                target: MessageTarget::All,
            }),
        }
    }

    fn reset(&mut self) {
        self.price_history.clear();
    }
}

/// Follows the crowd: counts buys vs sells in the recent event window.
pub struct TrendFollowerStrategy;

impl TrendFollowerStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TrendFollowerStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for TrendFollowerStrategy {
    fn name(&self) -> &'static str {
        "trend_follower"
    }

    fn decide(
        &mut self,
        observation: &Observation,
        account: &Account,
    ) -> Result<ActionPayload, DecideError> {
        let mut buys = 0usize;
        let mut sells = 0usize;
        for event in &observation.recent_events {
            if let ActionPayload::Trade { direction, .. } = &event.action.payload {
                match direction {
                    TradeDirection::Buy => buys += 1,
                    TradeDirection::Sell => sells += 1,
                }
            }
        }

        if buys > sells && account.balance > 5.0 {
            Ok(ActionPayload::trade(
                TradeDirection::Buy,
                (account.balance * 0.2).min(10.0),
            ))
        } else if sells > buys && account.holdings > 0.0 {
            Ok(ActionPayload::trade(
                TradeDirection::Sell,
                account.holdings * 0.3,
            ))
        } else {
            Ok(ActionPayload::Observe)
        }
    }

    fn reset(&mut self) {}
}
