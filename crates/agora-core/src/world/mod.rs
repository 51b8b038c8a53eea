//! World
//!
//! The world owns all shared mutable state and is the only writer of it.
//! A tick advances time exactly once, applies market dynamics, then lets
//! every registered agent act in registration order, resolving each action
//! and appending its event before the next agent decides. That strict
//! sequencing is what makes a run replayable from its seed.

pub mod market;

pub use market::{GaussianWalk, PricingPolicy};

use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use agora_events::{
    generate_event_id, generate_snapshot_id, generate_world_id, Action, ActionPayload, Event,
    MarketSnapshot, Observation, WorldSnapshot, RECENT_EVENTS_WINDOW,
};

use crate::agents::Agent;
use crate::config::MarketSettings;
use crate::error::RegisterError;
use crate::ledger::LedgerSink;
use crate::resolver::MarketResolver;

/// One agent's funds and holdings.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Account {
    pub balance: f64,
    pub holdings: f64,
}

impl Account {
    pub fn new(balance: f64) -> Self {
        Self {
            balance,
            holdings: 0.0,
        }
    }
}

/// Identity and limits of a world, fixed at construction.
#[derive(Debug, Clone)]
pub struct WorldConfig {
    /// Short unique id, eight hex characters
    pub world_id: String,
    /// Human-readable name
    pub name: String,
    /// Registration capacity
    pub max_agents: usize,
    /// Seed for the world rng; agent seeds are derived from it
    pub seed: u64,
    /// Soft budget for a single agent decision
    pub decision_budget_ms: u64,
    /// Market dynamics constants
    pub market: MarketSettings,
}

impl WorldConfig {
    pub fn new(name: impl Into<String>, seed: u64) -> Self {
        Self {
            world_id: generate_world_id(),
            name: name.into(),
            max_agents: 100,
            seed,
            decision_budget_ms: 250,
            market: MarketSettings::default(),
        }
    }

    pub fn with_max_agents(mut self, max_agents: usize) -> Self {
        self.max_agents = max_agents;
        self
    }

    pub fn with_market(mut self, market: MarketSettings) -> Self {
        self.market = market;
        self
    }
}

/// Shared mutable simulation state. Mutated only inside a tick.
#[derive(Debug)]
pub struct WorldState {
    pub time: u64,
    pub market_price: f64,
    pub volatility: f64,
    pub resources: u32,
    pub total_volume: f64,
    events: Vec<Event>,
    accounts: HashMap<String, Account>,
    next_event_seq: u64,
}

impl WorldState {
    pub(crate) fn initial(market: &MarketSettings) -> Self {
        Self {
            time: 0,
            market_price: market.initial_price,
            volatility: market.initial_volatility,
            resources: market.initial_resources,
            total_volume: 0.0,
            events: Vec::new(),
            accounts: HashMap::new(),
            next_event_seq: 1,
        }
    }

    /// The full event log, oldest first.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Clones the newest `n` events, oldest first.
    pub fn recent_events(&self, n: usize) -> Vec<Event> {
        let start = self.events.len().saturating_sub(n);
        self.events[start..].to_vec()
    }

    pub fn account(&self, agent_id: &str) -> Option<&Account> {
        self.accounts.get(agent_id)
    }

    pub(crate) fn account_mut(&mut self, agent_id: &str) -> Option<&mut Account> {
        self.accounts.get_mut(agent_id)
    }

    pub(crate) fn insert_account(&mut self, agent_id: &str, account: Account) {
        self.accounts.insert(agent_id.to_string(), account);
    }

    pub(crate) fn push_event(&mut self, event: Event) {
        self.events.push(event);
    }

    pub(crate) fn alloc_event_id(&mut self) -> String {
        let id = generate_event_id(self.next_event_seq);
        self.next_event_seq += 1;
        id
    }

    /// Builds the read-only view handed to agents and pollers.
    pub fn observation(&self, num_agents: usize) -> Observation {
        Observation {
            time: self.time,
            market_price: self.market_price,
            volatility: self.volatility,
            resources: self.resources,
            num_agents,
            recent_events: self.recent_events(RECENT_EVENTS_WINDOW),
        }
    }
}

/// A simulation world: state, roster, resolver, and pricing policy.
pub struct World {
    config: WorldConfig,
    state: WorldState,
    agents: Vec<Agent>,
    resolver: MarketResolver,
    pricing: Box<dyn PricingPolicy>,
    ledger: Option<Box<dyn LedgerSink>>,
    rng: SmallRng,
    in_step: bool,
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("agents", &self.agents)
            .field("resolver", &self.resolver)
            .field("pricing", &"<dyn PricingPolicy>")
            .field("ledger", &self.ledger.as_ref().map(|_| "<dyn LedgerSink>"))
            .field("rng", &"<SmallRng>")
            .field("in_step", &self.in_step)
            .finish()
    }
}

impl World {
    /// Creates a world with the default gaussian-walk pricing policy.
    pub fn new(config: WorldConfig) -> Self {
        let pricing = Box::new(GaussianWalk::new(&config.market));
        Self::with_pricing(config, pricing)
    }

    /// Creates a world with a caller-supplied pricing policy.
    pub fn with_pricing(config: WorldConfig, pricing: Box<dyn PricingPolicy>) -> Self {
        let state = WorldState::initial(&config.market);
        let resolver = MarketResolver::new(config.market.action_fee);
        let rng = SmallRng::seed_from_u64(config.seed);
        tracing::info!(
            world = %config.world_id,
            name = %config.name,
            seed = config.seed,
            "world created"
        );
        Self {
            config,
            state,
            agents: Vec::new(),
            resolver,
            pricing,
            ledger: None,
            rng,
            in_step: false,
        }
    }

    /// Attaches a best-effort ledger sink notified after each event.
    pub fn set_ledger(&mut self, ledger: Box<dyn LedgerSink>) {
        self.ledger = Some(ledger);
    }

    /// Adds an agent to the roster and opens its account.
    ///
    /// The roster is append-only; iteration order is registration order.
    pub fn register_agent(&mut self, agent: Agent) -> Result<(), RegisterError> {
        if self.agents.iter().any(|a| a.id() == agent.id()) {
            return Err(RegisterError::DuplicateAgent(agent.id().to_string()));
        }
        if self.agents.len() >= self.config.max_agents {
            return Err(RegisterError::WorldFull {
                max_agents: self.config.max_agents,
            });
        }
        self.state
            .insert_account(agent.id(), Account::new(agent.initial_balance()));
        tracing::info!(
            agent = agent.id(),
            name = agent.name(),
            strategy = agent.strategy_name(),
            "agent registered"
        );
        self.agents.push(agent);
        Ok(())
    }

    /// Advances the simulation by one tick.
    ///
    /// Later agents in the same tick observe the events of earlier ones;
    /// that is part of the sequential-resolution contract, not an accident.
    pub fn step(&mut self) {
        if self.in_step {
            panic!(
                "World::step re-entered while tick {} is in flight; \
                 serialize step callers instead",
                self.state.time
            );
        }
        self.in_step = true;

        self.state.time += 1;
        self.pricing.advance(&mut self.state, &mut self.rng);
        tracing::debug!(
            time = self.state.time,
            price = self.state.market_price,
            volatility = self.state.volatility,
            "tick started"
        );

        let num_agents = self.agents.len();
        let budget = Duration::from_millis(self.config.decision_budget_ms);
        for i in 0..num_agents {
            let observation = self.state.observation(num_agents);
            let account = self
                .state
                .account(self.agents[i].id())
                .copied()
                .unwrap_or_default();

            let started = Instant::now();
            let payload = match self.agents[i].decide(&observation, &account) {
                Ok(payload) => payload,
                Err(err) => {
                    tracing::warn!(
                        agent = self.agents[i].id(),
                        error = %err,
                        "decide failed, falling back to observe"
                    );
                    ActionPayload::Observe
                }
            };
            if started.elapsed() > budget {
                tracing::warn!(
                    agent = self.agents[i].id(),
                    budget_ms = self.config.decision_budget_ms,
                    "decision exceeded its budget"
                );
            }

            let action = Action::new(self.agents[i].id(), payload, self.state.time);
            self.agents[i].remember(action.clone());

            let event = self.resolver.resolve(&action, &mut self.state);
            self.agents[i].record_outcome(&event.outcome);
            if let Some(ledger) = self.ledger.as_deref_mut() {
                ledger.record(&event);
            }
            self.state.push_event(event);
        }

        self.in_step = false;
    }

    /// Runs `ticks` steps back to back.
    pub fn run_for(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.step();
        }
    }

    /// Clears all state back to initial values and reseeds every rng.
    ///
    /// A reset world replays identically to a freshly built one with the
    /// same configuration and roster.
    pub fn reset(&mut self) {
        self.state = WorldState::initial(&self.config.market);
        for agent in &mut self.agents {
            agent.reset();
            self.state
                .insert_account(agent.id(), Account::new(agent.initial_balance()));
        }
        self.rng = SmallRng::seed_from_u64(self.config.seed);
        self.pricing.reset();
        tracing::info!(world = %self.config.world_id, "world reset");
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn state(&self) -> &WorldState {
        &self.state
    }

    pub fn time(&self) -> u64 {
        self.state.time
    }

    pub fn market_price(&self) -> f64 {
        self.state.market_price
    }

    pub fn events(&self) -> &[Event] {
        self.state.events()
    }

    pub fn event_count(&self) -> usize {
        self.state.event_count()
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    /// Agent ids in registration order.
    pub fn agent_ids(&self) -> Vec<&str> {
        self.agents.iter().map(|a| a.id()).collect()
    }

    pub fn account(&self, agent_id: &str) -> Option<&Account> {
        self.state.account(agent_id)
    }

    /// The public view an external poller sees.
    pub fn observation(&self) -> Observation {
        self.state.observation(self.agents.len())
    }

    /// Full snapshot of the world, safe to hand across threads.
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            snapshot_id: generate_snapshot_id(self.state.time),
            world_id: self.config.world_id.clone(),
            world_name: self.config.name.clone(),
            time: self.state.time,
            market: MarketSnapshot {
                market_price: self.state.market_price,
                volatility: self.state.volatility,
                resources: self.state.resources,
                total_volume: self.state.total_volume,
            },
            agents: self
                .agents
                .iter()
                .map(|a| {
                    let account = self.state.account(a.id()).copied().unwrap_or_default();
                    a.snapshot(&account)
                })
                .collect(),
            event_count: self.state.event_count(),
            recent_events: self.state.recent_events(RECENT_EVENTS_WINDOW),
        }
    }
}
