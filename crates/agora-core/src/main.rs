//! Agora market simulation binary.
//!
//! Runs a configured world for a fixed number of ticks, writing the event
//! log and periodic snapshots under the output directory. With
//! `--realtime` the scheduler paces ticks on its interval clock instead of
//! running them back to back.

use clap::Parser;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use agora_core::{
    default_config_toml, setup, EventLogger, JsonlLedger, Scheduler, SimConfig, SnapshotWriter,
    World,
};
use agora_events::WorldSnapshot;

/// Command line arguments for the simulation
#[derive(Parser, Debug)]
#[command(name = "agora_sim")]
#[command(about = "A discrete-time multi-agent market simulation")]
struct Args {
    /// Random seed, overrides the config file
    #[arg(long)]
    seed: Option<u64>,

    /// Number of ticks to simulate
    #[arg(long, default_value_t = 1000)]
    ticks: u64,

    /// Interval between world snapshots (in ticks)
    #[arg(long, default_value_t = 100)]
    snapshot_interval: u64,

    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output directory for events and snapshots
    #[arg(long, default_value = "output")]
    output: PathBuf,

    /// Also write a ledger receipt per event to this JSONL file
    #[arg(long)]
    ledger: Option<PathBuf>,

    /// Pace ticks on the configured interval clock instead of running flat out
    #[arg(long)]
    realtime: bool,

    /// Print the default configuration as TOML and exit
    #[arg(long)]
    print_default_config: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    if let Err(err) = run(args) {
        tracing::error!(%err, "simulation failed");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    if args.print_default_config {
        println!("{}", default_config_toml());
        return Ok(());
    }

    let mut config = match &args.config {
        Some(path) => SimConfig::from_file(path)?,
        None => SimConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.world.seed = seed;
    }

    let mut world = setup::build_world(&config)?;
    if let Some(path) = &args.ledger {
        world.set_ledger(Box::new(JsonlLedger::create(path)?));
    }

    std::fs::create_dir_all(&args.output)?;
    let mut event_logger = EventLogger::new(args.output.join("events.jsonl"))?;
    let snapshot_writer =
        SnapshotWriter::new(args.output.join("snapshots"), args.snapshot_interval)?;

    tracing::info!(
        world = %world.config().world_id,
        agents = world.agent_count(),
        ticks = args.ticks,
        seed = config.world.seed,
        "starting simulation"
    );
    snapshot_writer.write(&world.snapshot())?;

    let final_snapshot = if args.realtime {
        run_realtime(world, &config, &args, &mut event_logger, &snapshot_writer)?
    } else {
        run_flat_out(world, &args, &mut event_logger, &snapshot_writer)?
    };
    event_logger.flush()?;

    print_summary(&final_snapshot, config.market.initial_price);
    Ok(())
}

/// Steps the world directly, as fast as it will go.
fn run_flat_out(
    mut world: World,
    args: &Args,
    event_logger: &mut EventLogger,
    snapshot_writer: &SnapshotWriter,
) -> Result<WorldSnapshot, Box<dyn std::error::Error>> {
    let mut written = 0usize;
    for _ in 0..args.ticks {
        world.step();

        let events = world.events();
        event_logger.log_batch(&events[written..])?;
        written = events.len();

        if snapshot_writer.should_snapshot(world.time()) {
            snapshot_writer.write(&world.snapshot())?;
        }
    }
    Ok(world.snapshot())
}

/// Lets the scheduler pace ticks while this thread drains output.
fn run_realtime(
    world: World,
    config: &SimConfig,
    args: &Args,
    event_logger: &mut EventLogger,
    snapshot_writer: &SnapshotWriter,
) -> Result<WorldSnapshot, Box<dyn std::error::Error>> {
    let interval = Duration::from_millis(config.scheduler.tick_interval_ms);
    let mut scheduler = Scheduler::new(world, interval);
    scheduler.start();

    let mut written = 0usize;
    let mut last_snapshotted = 0u64;
    loop {
        thread::sleep(interval.min(Duration::from_millis(50)));

        let (time, done) = scheduler.with_world(|world| {
            let events = world.events();
            let result = event_logger.log_batch(&events[written..]);
            written = events.len();
            result.map(|_| (world.time(), world.time() >= args.ticks))
        })?;

        if snapshot_writer.should_snapshot(time) && time != last_snapshotted {
            snapshot_writer.write(&scheduler.snapshot())?;
            last_snapshotted = time;
        }
        if done {
            break;
        }
    }
    scheduler.stop();

    // Drain anything resolved between the last poll and the stop.
    scheduler.with_world(|world| {
        let events = world.events();
        event_logger.log_batch(&events[written..])
    })?;
    Ok(scheduler.snapshot())
}

fn print_summary(snapshot: &WorldSnapshot, initial_price: f64) {
    println!("Simulation complete");
    println!("==================");
    println!("Ticks: {}", snapshot.time);
    println!("Events: {}", snapshot.event_count);
    println!("Final price: ${:.2}", snapshot.market.market_price);
    println!(
        "Price change: {:+.2}%",
        (snapshot.market.market_price / initial_price - 1.0) * 100.0
    );
    println!("Total volume: {:.2}", snapshot.market.total_volume);
    println!();
    println!("Agents:");
    for agent in &snapshot.agents {
        println!(
            "  {} ({}): balance {:.2}, holdings {:.4}, portfolio {:.2}, success {:.0}%",
            agent.name,
            agent.strategy,
            agent.balance,
            agent.holdings,
            agent.portfolio_value(snapshot.market.market_price),
            agent.success_rate * 100.0
        );
    }
}
