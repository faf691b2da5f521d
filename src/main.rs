//! Praxis Engine - command line harness
//!
//! Loads a world and a configuration, runs a number of ticks and writes the
//! final state as JSON.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use praxis_engine::core::error::Result;
use praxis_engine::observers::TopologyMonitor;
use praxis_engine::scenario;
use praxis_engine::state::ingest::ingest_scenario;
use praxis_engine::{Simulation, SimulationConfig, WorldState};

#[derive(Parser, Debug)]
#[command(name = "praxis-engine")]
#[command(about = "Deterministic simulation of class dynamics on a solidarity graph")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the simulation for a number of ticks
    Run(RunArgs),
    /// Check a TOML configuration and print it with defaults filled in
    Config {
        path: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Builtin {
    TwoNode,
    ImperialCircuit,
    Ring,
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// Serialized WorldState (JSON)
    #[arg(long, conflicts_with_all = ["scenario", "builtin"])]
    state: Option<PathBuf>,

    /// Flattened scenario records (JSON); legacy keys are accepted
    #[arg(long, conflicts_with = "builtin")]
    scenario: Option<PathBuf>,

    /// One of the built-in worlds
    #[arg(long, value_enum, default_value = "two-node")]
    builtin: Builtin,

    /// TOML configuration; missing values take their defaults
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    #[arg(long, short = 't', default_value_t = 10)]
    ticks: u64,

    /// Where to write the final state; stdout when absent
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Attach the topology monitor
    #[arg(long)]
    topology: bool,

    /// Print a run summary instead of the final state
    #[arg(long)]
    summary: bool,
}

/// Printed with `--summary`
#[derive(Serialize)]
struct RunSummary {
    final_tick: u64,
    entities: usize,
    active_entities: usize,
    total_wealth: f64,
    total_population: u64,
    events_per_tick: Vec<usize>,
}

fn load_world(args: &RunArgs, config: &SimulationConfig) -> Result<WorldState> {
    if let Some(path) = &args.state {
        return WorldState::load(path);
    }
    if let Some(path) = &args.scenario {
        let raw = std::fs::read_to_string(path)?;
        let document: serde_json::Value = serde_json::from_str(&raw)?;
        return Ok(ingest_scenario(&document, config.precision)?);
    }
    Ok(match args.builtin {
        Builtin::TwoNode => scenario::two_node_scenario(),
        Builtin::ImperialCircuit => scenario::imperial_circuit(),
        Builtin::Ring => scenario::solidarity_ring(24),
    })
}

fn run(args: RunArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    let world = load_world(&args, &config)?;

    let mut sim = Simulation::new(world, config)?;
    if args.topology {
        let monitor = TopologyMonitor::new(sim.config());
        sim.add_observer(Box::new(monitor));
    }
    sim.run(args.ticks)?;
    sim.finish();

    let last = sim.current();
    let output = if args.summary {
        let summary = RunSummary {
            final_tick: last.tick,
            entities: last.entities.len(),
            active_entities: last.active_entities().count(),
            total_wealth: last.total_wealth(),
            total_population: last.total_population(),
            events_per_tick: sim.history().iter().skip(1).map(|s| s.events.len()).collect(),
        };
        serde_json::to_string_pretty(&summary)?
    } else {
        last.to_json()?
    };

    match &args.output {
        Some(path) => {
            std::fs::write(path, output)?;
            tracing::info!(path = %path.display(), "final state written");
        }
        None => println!("{}", output),
    }
    Ok(())
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("praxis_engine=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Run(args) => run(args),
        Command::Config { path } => {
            let config = SimulationConfig::load(&path)?;
            let rendered = toml::to_string_pretty(&config)
                .map_err(|e| praxis_engine::core::error::ConfigError(e.to_string()))?;
            println!("{}", rendered);
            Ok(())
        }
    }
}
