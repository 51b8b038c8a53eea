//! Tick scheduling.
//!
//! Drives a world either synchronously (`run_for`) or continuously on a
//! worker thread (`start`/`stop`). Every path to `World::step` goes through
//! one mutex, so a timer tick and a manual step can never interleave: the
//! loser of the race queues and runs after, with its own tick number.
//! `stop` takes effect at a tick boundary — the worker is never killed
//! mid-step.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use agora_events::WorldSnapshot;

use crate::world::World;

enum Control {
    Stop,
}

struct Worker {
    /// Sender for control messages (wrapped so the scheduler stays Sync).
    control: Mutex<Sender<Control>>,
    handle: JoinHandle<()>,
}

impl Worker {
    fn signal_stop(&self) {
        if let Ok(control) = self.control.lock() {
            let _ = control.send(Control::Stop);
        }
    }
}

/// Serializes and paces `World::step` invocations.
pub struct Scheduler {
    shared: Arc<Mutex<World>>,
    tick_interval: Duration,
    worker: Option<Worker>,
}

impl Scheduler {
    /// Wraps a world for scheduled stepping at the given interval.
    pub fn new(world: World, tick_interval: Duration) -> Self {
        Self {
            shared: Arc::new(Mutex::new(world)),
            tick_interval,
            worker: None,
        }
    }

    fn lock(&self) -> MutexGuard<'_, World> {
        self.shared
            .lock()
            .unwrap_or_else(|_| panic!("world mutex poisoned by a panicked tick"))
    }

    /// Runs one step immediately, queuing behind any step in flight.
    pub fn step_now(&self) {
        self.lock().step();
    }

    /// Runs `ticks` steps synchronously, releasing the lock between steps
    /// so readers can observe intermediate states.
    pub fn run_for(&self, ticks: u64) {
        for _ in 0..ticks {
            self.lock().step();
        }
    }

    /// Resets the wrapped world to its initial state.
    pub fn reset(&self) {
        self.lock().reset();
    }

    /// Clones a consistent snapshot; sees pre- or post-tick state only.
    pub fn snapshot(&self) -> WorldSnapshot {
        self.lock().snapshot()
    }

    /// Runs a closure against the locked world.
    pub fn with_world<R>(&self, f: impl FnOnce(&mut World) -> R) -> R {
        f(&mut self.lock())
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Begins ticking on a worker thread. Idempotent: calling `start`
    /// while running is a no-op.
    pub fn start(&mut self) {
        if self.worker.is_some() {
            tracing::debug!("scheduler already running, start ignored");
            return;
        }

        let (control, inbox) = mpsc::channel();
        let shared = Arc::clone(&self.shared);
        let interval = self.tick_interval;
        let handle = thread::Builder::new()
            .name("agora-tick".to_string())
            .spawn(move || loop {
                match inbox.recv_timeout(interval) {
                    Ok(Control::Stop) | Err(RecvTimeoutError::Disconnected) => break,
                    Err(RecvTimeoutError::Timeout) => {
                        let mut world = shared
                            .lock()
                            .unwrap_or_else(|_| panic!("world mutex poisoned by a panicked tick"));
                        world.step();
                    }
                }
            })
            .expect("failed to spawn scheduler worker thread");

        tracing::info!(interval_ms = interval.as_millis() as u64, "scheduler started");
        self.worker = Some(Worker {
            control: Mutex::new(control),
            handle,
        });
    }

    /// Stops the worker before its next tick and waits for it to exit.
    /// Idempotent: stopping a stopped scheduler is a no-op.
    pub fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            tracing::debug!("scheduler not running, stop ignored");
            return;
        };
        worker.signal_stop();
        if worker.handle.join().is_err() {
            panic!("scheduler worker panicked mid-run");
        }
        tracing::info!("scheduler stopped");
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.signal_stop();
            if worker.handle.join().is_err() {
                tracing::error!("scheduler worker panicked before shutdown");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::{Agent, StrategyKind};
    use crate::world::WorldConfig;

    fn scheduler_with_agents(n: usize, interval: Duration) -> Scheduler {
        let mut world = World::new(WorldConfig::new("sched-test", 42));
        for i in 0..n {
            let id = format!("agent_{:04}", i + 1);
            world
                .register_agent(Agent::new(
                    id.clone(),
                    id,
                    StrategyKind::Random,
                    i as u64,
                    100.0,
                ))
                .unwrap();
        }
        Scheduler::new(world, interval)
    }

    #[test]
    fn test_step_now_advances_one_tick() {
        let scheduler = scheduler_with_agents(2, Duration::from_secs(60));
        scheduler.step_now();

        let snapshot = scheduler.snapshot();
        assert_eq!(snapshot.time, 1);
        assert_eq!(snapshot.event_count, 2);
    }

    #[test]
    fn test_run_for_is_synchronous() {
        let scheduler = scheduler_with_agents(1, Duration::from_secs(60));
        scheduler.run_for(5);
        assert_eq!(scheduler.snapshot().time, 5);
    }

    #[test]
    fn test_start_is_idempotent_and_stop_halts() {
        let mut scheduler = scheduler_with_agents(1, Duration::from_millis(5));
        scheduler.start();
        scheduler.start();
        assert!(scheduler.is_running());

        thread::sleep(Duration::from_millis(50));
        scheduler.stop();
        assert!(!scheduler.is_running());

        let time_after_stop = scheduler.snapshot().time;
        assert!(time_after_stop > 0);

        thread::sleep(Duration::from_millis(30));
        assert_eq!(scheduler.snapshot().time, time_after_stop);
    }

    #[test]
    fn test_stop_without_start_is_a_no_op() {
        let mut scheduler = scheduler_with_agents(1, Duration::from_millis(5));
        scheduler.stop();
        assert_eq!(scheduler.snapshot().time, 0);
    }

    #[test]
    fn test_immediate_stop_prevents_first_tick() {
        let mut scheduler = scheduler_with_agents(1, Duration::from_secs(60));
        scheduler.start();
        scheduler.stop();
        assert_eq!(scheduler.snapshot().time, 0);
    }

    #[test]
    fn test_manual_steps_queue_against_timer_ticks() {
        let mut scheduler = scheduler_with_agents(2, Duration::from_millis(2));
        scheduler.start();
        for _ in 0..20 {
            scheduler.step_now();
        }
        scheduler.stop();

        let snapshot = scheduler.snapshot();
        // Every tick resolved both agents exactly once, whatever the
        // interleaving of timer and manual steps.
        assert_eq!(snapshot.event_count as u64, snapshot.time * 2);
        assert!(snapshot.time >= 20);

        scheduler.with_world(|world| {
            let mut last_time = 0;
            for event in world.events() {
                assert!(event.time >= last_time);
                last_time = event.time;
            }
        });
    }
}
