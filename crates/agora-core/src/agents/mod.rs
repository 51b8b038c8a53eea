//! Agents
//!
//! An agent couples an identity with a decision strategy and a bounded
//! private memory of its own past actions. Agents never touch world state
//! directly: they see an [`Observation`] and answer with an
//! [`ActionPayload`]; the resolver decides what actually happens.

pub mod strategies;

pub use strategies::{
    CautiousStrategy, MomentumStrategy, RandomStrategy, Strategy, StrategyKind,
    TrendFollowerStrategy,
};

use std::collections::VecDeque;

use agora_events::{Action, ActionPayload, AgentSnapshot, Observation, Outcome};

use crate::error::DecideError;
use crate::world::Account;

/// How many past actions an agent remembers.
pub const MEMORY_LIMIT: usize = 50;

/// A registered participant in a world.
pub struct Agent {
    id: String,
    name: String,
    strategy: Box<dyn Strategy>,
    memory: VecDeque<Action>,
    action_count: u64,
    success_count: u64,
    initial_balance: f64,
}

impl Agent {
    /// Creates an agent with one of the built-in strategies.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: StrategyKind,
        seed: u64,
        initial_balance: f64,
    ) -> Self {
        Self::with_strategy(id, name, kind.build(seed), initial_balance)
    }

    /// Creates an agent with a caller-supplied strategy.
    pub fn with_strategy(
        id: impl Into<String>,
        name: impl Into<String>,
        strategy: Box<dyn Strategy>,
        initial_balance: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            strategy,
            memory: VecDeque::new(),
            action_count: 0,
            success_count: 0,
            initial_balance,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Balance the agent's account starts with, also restored on reset.
    pub fn initial_balance(&self) -> f64 {
        self.initial_balance
    }

    /// Asks the strategy for the next action.
    pub fn decide(
        &mut self,
        observation: &Observation,
        account: &Account,
    ) -> Result<ActionPayload, DecideError> {
        self.strategy.decide(observation, account)
    }

    /// Appends an issued action to memory, dropping the oldest past the cap.
    pub fn remember(&mut self, action: Action) {
        self.memory.push_back(action);
        while self.memory.len() > MEMORY_LIMIT {
            self.memory.pop_front();
        }
    }

    /// Updates success counters from a resolved outcome.
    pub fn record_outcome(&mut self, outcome: &Outcome) {
        self.action_count += 1;
        if outcome.success {
            self.success_count += 1;
        }
    }

    pub fn memory_len(&self) -> usize {
        self.memory.len()
    }

    /// Most recently issued action, if any.
    pub fn last_action(&self) -> Option<&Action> {
        self.memory.back()
    }

    pub fn action_count(&self) -> u64 {
        self.action_count
    }

    /// Fraction of resolved actions that succeeded.
    pub fn success_rate(&self) -> f64 {
        if self.action_count == 0 {
            0.0
        } else {
            self.success_count as f64 / self.action_count as f64
        }
    }

    /// Public summary of this agent given its current account.
    pub fn snapshot(&self, account: &Account) -> AgentSnapshot {
        AgentSnapshot {
            agent_id: self.id.clone(),
            name: self.name.clone(),
            strategy: self.strategy.name().to_string(),
            balance: account.balance,
            holdings: account.holdings,
            action_count: self.action_count,
            success_rate: self.success_rate(),
            memory_size: self.memory.len(),
        }
    }

    /// Clears memory, counters, and strategy state back to creation time.
    pub fn reset(&mut self) {
        self.memory.clear();
        self.action_count = 0;
        self.success_count = 0;
        self.strategy.reset();
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("strategy", &self.strategy.name())
            .field("memory", &self.memory.len())
            .field("action_count", &self.action_count)
            .finish()
    }
}
