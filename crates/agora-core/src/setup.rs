//! World construction from configuration.
//!
//! Turns a [`SimConfig`] into a populated [`World`]: one agent per roster
//! entry, registered in roster order, each with a seed derived from the
//! world seed so runs replay exactly.

use agora_events::generate_world_id;

use crate::agents::Agent;
use crate::config::{AgentSettings, SimConfig};
use crate::error::ConfigError;
use crate::world::{World, WorldConfig};

/// Builds a world and registers the configured roster.
pub fn build_world(config: &SimConfig) -> Result<World, ConfigError> {
    let world_config = WorldConfig {
        world_id: generate_world_id(),
        name: config.world.name.clone(),
        max_agents: config.world.max_agents,
        seed: config.world.seed,
        decision_budget_ms: config.scheduler.decision_timeout_ms,
        market: config.market.clone(),
    };

    let mut world = World::new(world_config);
    for (index, settings) in config.roster().iter().enumerate() {
        let agent = build_agent(index, settings, config.world.seed);
        world
            .register_agent(agent)
            .map_err(|err| ConfigError::Invalid(err.to_string()))?;
    }
    Ok(world)
}

/// Builds one roster agent. Ids are positional (`agent_0001`, ...); the
/// per-agent seed offsets the world seed by roster position.
pub fn build_agent(index: usize, settings: &AgentSettings, world_seed: u64) -> Agent {
    let id = format!("agent_{:04}", index + 1);
    let seed = world_seed.wrapping_add(index as u64 + 1);
    Agent::new(
        id,
        settings.name.clone(),
        settings.strategy,
        seed,
        settings.initial_balance,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::StrategyKind;

    #[test]
    fn test_build_world_uses_default_roster() {
        let world = build_world(&SimConfig::default()).unwrap();
        assert_eq!(world.agent_count(), 4);
        assert_eq!(
            world.agent_ids(),
            vec!["agent_0001", "agent_0002", "agent_0003", "agent_0004"]
        );
    }

    #[test]
    fn test_build_world_respects_configured_roster() {
        let mut config = SimConfig::default();
        config.agents = vec![AgentSettings {
            name: "solo".to_string(),
            strategy: StrategyKind::Momentum,
            initial_balance: 250.0,
        }];

        let world = build_world(&config).unwrap();
        assert_eq!(world.agent_count(), 1);
        assert_eq!(world.account("agent_0001").unwrap().balance, 250.0);
    }

    #[test]
    fn test_build_world_enforces_capacity() {
        let mut config = SimConfig::default();
        config.world.max_agents = 2;

        let err = build_world(&config).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_agent_seeds_differ_by_position() {
        let settings = AgentSettings {
            name: "a".to_string(),
            strategy: StrategyKind::Random,
            initial_balance: 100.0,
        };
        let a = build_agent(0, &settings, 42);
        let b = build_agent(1, &settings, 42);
        assert_ne!(a.id(), b.id());
    }
}
