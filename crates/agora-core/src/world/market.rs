//! Market dynamics.
//!
//! Price and volatility evolve once per tick, before any agent acts.
//! The policy is pluggable so alternative pricing models can be swapped in
//! without touching the step loop.

use rand::rngs::SmallRng;
use rand_distr::{Distribution, Normal};

use crate::config::MarketSettings;
use crate::world::WorldState;

/// Advances market price and volatility at the start of each tick.
pub trait PricingPolicy: Send {
    /// Mutates the market fields of the state in place.
    fn advance(&mut self, state: &mut WorldState, rng: &mut SmallRng);

    /// Restores any internal state; the default policy carries none.
    fn reset(&mut self) {}
}

/// Gaussian random walk with activity-coupled volatility.
///
/// Each tick the price moves by a normally distributed fraction of itself
/// (sigma = current volatility) and is clamped to a floor. Volatility is
/// then recomputed from recent log activity: a busy market is a twitchy
/// market.
#[derive(Debug, Clone)]
pub struct GaussianWalk {
    price_floor: f64,
    base_volatility: f64,
    volatility_per_event: f64,
    activity_window: usize,
}

impl GaussianWalk {
    pub fn new(market: &MarketSettings) -> Self {
        Self {
            price_floor: market.price_floor,
            base_volatility: market.base_volatility,
            volatility_per_event: market.volatility_per_event,
            activity_window: market.activity_window,
        }
    }
}

impl PricingPolicy for GaussianWalk {
    fn advance(&mut self, state: &mut WorldState, rng: &mut SmallRng) {
        let noise = match Normal::new(0.0, state.volatility) {
            Ok(dist) => dist.sample(rng),
            Err(_) => 0.0,
        };
        state.market_price = (state.market_price * (1.0 + noise)).max(self.price_floor);

        let recent = state.event_count().min(self.activity_window);
        state.volatility = self.base_volatility + self.volatility_per_event * recent as f64;
    }
}
