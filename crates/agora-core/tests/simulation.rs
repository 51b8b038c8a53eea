//! End-to-end tick loop tests.
//!
//! Exercises the full world/resolver/scheduler stack: event accounting,
//! per-tick ordering, registration failures, malformed actions, and
//! concurrent stepping.

use std::thread;
use std::time::Duration;

use agora_core::{
    Account, Agent, DecideError, RegisterError, Scheduler, Strategy, StrategyKind, World,
    WorldConfig,
};
use agora_events::{ActionKind, ActionPayload, FailureReason, Observation};

fn world_with_agents(ids: &[&str]) -> World {
    let mut world = World::new(WorldConfig::new("loop-test", 42));
    for (i, id) in ids.iter().enumerate() {
        world
            .register_agent(Agent::new(*id, *id, StrategyKind::Random, i as u64 + 1, 100.0))
            .unwrap();
    }
    world
}

/// A strategy that always submits an unrecognized kind.
struct UnknownKindStrategy;

impl Strategy for UnknownKindStrategy {
    fn name(&self) -> &'static str {
        "unknown_kind"
    }

    fn decide(
        &mut self,
        _observation: &Observation,
        _account: &Account,
    ) -> Result<ActionPayload, DecideError> {
        Ok(ActionPayload::Unknown)
    }

    fn reset(&mut self) {}
}

/// A strategy whose backend is permanently down.
struct BrokenStrategy;

impl Strategy for BrokenStrategy {
    fn name(&self) -> &'static str {
        "broken"
    }

    fn decide(
        &mut self,
        _observation: &Observation,
        _account: &Account,
    ) -> Result<ActionPayload, DecideError> {
        Err(DecideError::Unavailable("feed offline".to_string()))
    }

    fn reset(&mut self) {}
}

#[test]
fn test_run_for_accounting() {
    let mut world = world_with_agents(&["a1", "a2"]);
    world.run_for(3);

    assert_eq!(world.time(), 3);
    assert_eq!(world.event_count(), 6);

    let events = world.events();
    for (index, event) in events.iter().enumerate() {
        let expected_tick = index as u64 / 2 + 1;
        let expected_agent = if index % 2 == 0 { "a1" } else { "a2" };
        assert_eq!(event.time, expected_tick);
        assert_eq!(event.action.time_issued, expected_tick);
        assert_eq!(event.agent_id(), expected_agent);
    }
}

#[test]
fn test_run_for_zero_is_a_no_op() {
    let mut world = world_with_agents(&["a1"]);
    world.run_for(0);
    assert_eq!(world.time(), 0);
    assert_eq!(world.event_count(), 0);
}

#[test]
fn test_stepping_an_empty_world_still_advances_time() {
    let mut world = World::new(WorldConfig::new("empty", 1));
    world.run_for(4);
    assert_eq!(world.time(), 4);
    assert_eq!(world.event_count(), 0);
}

#[test]
fn test_duplicate_registration_leaves_roster_unchanged() {
    let mut world = world_with_agents(&["a1", "a2"]);

    let err = world
        .register_agent(Agent::new("a1", "Imposter", StrategyKind::Cautious, 9, 100.0))
        .unwrap_err();

    assert!(matches!(err, RegisterError::DuplicateAgent(id) if id == "a1"));
    assert_eq!(world.agent_count(), 2);
    assert_eq!(world.agent_ids(), vec!["a1", "a2"]);
}

#[test]
fn test_registration_mid_run_extends_later_ticks_only() {
    let mut world = world_with_agents(&["a1"]);
    world.run_for(2);
    assert_eq!(world.event_count(), 2);

    world
        .register_agent(Agent::new("a2", "a2", StrategyKind::Cautious, 5, 100.0))
        .unwrap();
    world.run_for(1);

    assert_eq!(world.event_count(), 4);
    let events = world.events();
    assert_eq!(events[2].agent_id(), "a1");
    assert_eq!(events[3].agent_id(), "a2");
    assert_eq!(events[3].time, 3);
}

#[test]
fn test_unknown_kind_is_logged_as_failed_event() {
    let mut world = World::new(WorldConfig::new("unknown", 7));
    world
        .register_agent(Agent::with_strategy(
            "rogue",
            "Rogue",
            Box::new(UnknownKindStrategy),
            100.0,
        ))
        .unwrap();
    world
        .register_agent(Agent::new("a2", "a2", StrategyKind::Cautious, 2, 100.0))
        .unwrap();

    world.run_for(1);

    // Both agents produced an event: the bad action did not abort the tick.
    assert_eq!(world.event_count(), 2);

    let rogue_event = &world.events()[0];
    assert!(!rogue_event.outcome.success);
    assert_eq!(
        rogue_event.outcome.reason,
        Some(FailureReason::UnknownActionKind)
    );
    assert_eq!(rogue_event.action.kind(), ActionKind::Unknown);
    // Rejected actions cost nothing
    assert_eq!(world.account("rogue").unwrap().balance, 100.0);
}

#[test]
fn test_broken_decide_falls_back_to_observe() {
    let mut world = World::new(WorldConfig::new("broken", 7));
    world
        .register_agent(Agent::with_strategy(
            "flaky",
            "Flaky",
            Box::new(BrokenStrategy),
            100.0,
        ))
        .unwrap();

    world.run_for(3);

    assert_eq!(world.time(), 3);
    assert_eq!(world.event_count(), 3);
    for event in world.events() {
        assert_eq!(event.action.kind(), ActionKind::Observe);
        assert!(event.outcome.success);
    }
}

#[test]
fn test_reset_then_run_replays_identically() {
    let mut world = world_with_agents(&["a1", "a2"]);

    world.run_for(4);
    let first_log = serde_json::to_string(world.events()).unwrap();
    let first_price = world.market_price();

    world.reset();
    assert_eq!(world.time(), 0);
    world.run_for(4);

    assert_eq!(serde_json::to_string(world.events()).unwrap(), first_log);
    assert_eq!(world.market_price(), first_price);
}

#[test]
fn test_concurrent_manual_steps_and_timer_never_collide() {
    let world = world_with_agents(&["a1", "a2"]);
    let mut scheduler = Scheduler::new(world, Duration::from_millis(1));
    scheduler.start();

    thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..10 {
                    scheduler.step_now();
                }
            });
        }
    });

    scheduler.stop();

    scheduler.with_world(|world| {
        let time = world.time();
        assert!(time >= 40);
        // One event per agent per tick: no gaps, no duplicated ticks.
        assert_eq!(world.event_count() as u64, time * 2);

        for (index, event) in world.events().iter().enumerate() {
            let expected_tick = index as u64 / 2 + 1;
            let expected_agent = if index % 2 == 0 { "a1" } else { "a2" };
            assert_eq!(event.time, expected_tick);
            assert_eq!(event.agent_id(), expected_agent);
        }
    });
}

#[test]
fn test_start_and_stop_are_idempotent() {
    let world = world_with_agents(&["a1"]);
    let mut scheduler = Scheduler::new(world, Duration::from_millis(5));

    scheduler.start();
    scheduler.start();
    assert!(scheduler.is_running());

    scheduler.stop();
    scheduler.stop();
    assert!(!scheduler.is_running());
}

#[test]
fn test_reader_sees_consistent_snapshots_while_stepping() {
    let world = world_with_agents(&["a1", "a2", "a3"]);
    let mut scheduler = Scheduler::new(world, Duration::from_millis(1));
    scheduler.start();

    for _ in 0..50 {
        let snapshot = scheduler.snapshot();
        // A snapshot is only ever taken between ticks, so the log length
        // always matches the tick counter exactly.
        assert_eq!(snapshot.event_count as u64, snapshot.time * 3);
    }

    scheduler.stop();
}
