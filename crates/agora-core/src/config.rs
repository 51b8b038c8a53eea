//! Configuration loading for the simulation.
//!
//! All engine settings are loaded from a TOML configuration file. Every
//! section is optional; missing values fall back to the defaults below.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::agents::StrategyKind;
use crate::error::ConfigError;

/// Complete simulation configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimConfig {
    /// World identity and capacity
    #[serde(default)]
    pub world: WorldSettings,
    /// Market dynamics constants
    #[serde(default)]
    pub market: MarketSettings,
    /// Tick pacing and decision budget
    #[serde(default)]
    pub scheduler: SchedulerSettings,
    /// Agent roster; empty means the default roster
    #[serde(default)]
    pub agents: Vec<AgentSettings>,
}

impl SimConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Returns the configured roster, or the default one when none is set.
    pub fn roster(&self) -> Vec<AgentSettings> {
        if self.agents.is_empty() {
            AgentSettings::default_roster()
        } else {
            self.agents.clone()
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.world.max_agents == 0 {
            return Err(ConfigError::Invalid("max_agents must be at least 1".into()));
        }
        if !self.market.initial_price.is_finite() || self.market.initial_price <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "initial_price must be positive, got {}",
                self.market.initial_price
            )));
        }
        if !self.market.initial_volatility.is_finite() || self.market.initial_volatility < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "initial_volatility must be non-negative, got {}",
                self.market.initial_volatility
            )));
        }
        let mut seen = HashSet::new();
        for agent in &self.agents {
            if !seen.insert(agent.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate agent name `{}`",
                    agent.name
                )));
            }
        }
        Ok(())
    }
}

/// World identity and capacity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldSettings {
    /// Human-readable world name
    pub name: String,
    /// Maximum number of registered agents
    pub max_agents: usize,
    /// Random seed for the world and its agents
    pub seed: u64,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            name: "agora".to_string(),
            max_agents: 100,
            seed: 42,
        }
    }
}

/// Market dynamics constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketSettings {
    /// Starting market price
    pub initial_price: f64,
    /// Starting volatility
    pub initial_volatility: f64,
    /// Starting shared resource pool
    pub initial_resources: u32,
    /// Lowest price the walk can reach
    pub price_floor: f64,
    /// Volatility when the log is quiet
    pub base_volatility: f64,
    /// Volatility added per recent event
    pub volatility_per_event: f64,
    /// How many trailing events count as recent activity
    pub activity_window: usize,
    /// Flat fee charged per successful action
    pub action_fee: f64,
}

impl Default for MarketSettings {
    fn default() -> Self {
        Self {
            initial_price: 100.0,
            initial_volatility: 0.1,
            initial_resources: 1000,
            price_floor: 10.0,
            base_volatility: 0.05,
            volatility_per_event: 0.01,
            activity_window: 10,
            action_fee: 1.0,
        }
    }
}

/// Tick pacing and decision budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerSettings {
    /// Milliseconds between ticks when running on the interval clock
    pub tick_interval_ms: u64,
    /// Bounded wait for a single agent decision
    pub decision_timeout_ms: u64,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            decision_timeout_ms: 250,
        }
    }
}

/// One agent roster entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSettings {
    /// Display name, unique within the roster
    pub name: String,
    /// Decision strategy
    pub strategy: StrategyKind,
    /// Starting account balance
    #[serde(default = "default_balance")]
    pub initial_balance: f64,
}

fn default_balance() -> f64 {
    100.0
}

impl AgentSettings {
    /// The demo roster used when the config lists no agents.
    pub fn default_roster() -> Vec<AgentSettings> {
        vec![
            AgentSettings {
                name: "Observer-1".to_string(),
                strategy: StrategyKind::Random,
                initial_balance: 100.0,
            },
            AgentSettings {
                name: "Cautious-Carl".to_string(),
                strategy: StrategyKind::Cautious,
                initial_balance: 100.0,
            },
            AgentSettings {
                name: "Aggressive-Alice".to_string(),
                strategy: StrategyKind::Momentum,
                initial_balance: 100.0,
            },
            AgentSettings {
                name: "Trend-Tom".to_string(),
                strategy: StrategyKind::TrendFollower,
                initial_balance: 100.0,
            },
        ]
    }
}

/// Returns a default configuration as a TOML string.
pub fn default_config_toml() -> String {
    let config = SimConfig {
        agents: AgentSettings::default_roster(),
        ..SimConfig::default()
    };
    toml::to_string_pretty(&config).unwrap_or_default()
}
