use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use seed_spread_core::world::{RunSummary, WorldSnapshot};
use seed_spread_core::{RefillPolicy, Scenario, SimConfig, StockFloor};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// World summary after every tick
    Text,
    /// One JSON document with run metrics and the final state
    Json,
}

/// Headless driver for the plant dispersal model
#[derive(Parser, Debug)]
#[command(name = "seed-spread")]
struct Args {
    /// Starting population: demo or garden
    #[arg(long, default_value_t = Scenario::Demo)]
    scenario: Scenario,

    /// Number of ticks to simulate
    #[arg(long, default_value_t = 5)]
    ticks: usize,

    /// Random seed (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// JSON file with a SimConfig; missing fields use defaults
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Metric sampling interval for JSON output
    #[arg(long, default_value_t = 1)]
    sample_every: usize,

    /// Drop births beyond this population
    #[arg(long)]
    max_population: Option<usize>,

    /// Let resource nodes refill past their starting amount
    #[arg(long)]
    unclamped_refill: bool,

    /// Never let resource stock go below zero
    #[arg(long)]
    floor_at_zero: bool,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    scenario: Scenario,
    config: &'a SimConfig,
    summary: RunSummary,
    final_state: WorldSnapshot,
}

fn build_config(args: &Args) -> Result<SimConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            SimConfig::from_json(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => SimConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if args.max_population.is_some() {
        config.max_population = args.max_population;
    }
    if args.unclamped_refill {
        config.refill_policy = RefillPolicy::Unclamped;
    }
    if args.floor_at_zero {
        config.stock_floor = StockFloor::Zero;
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = build_config(&args)?;
    tracing::info!(scenario = %args.scenario, ticks = args.ticks, seed = config.seed, "starting run");

    let mut world = args
        .scenario
        .build(config.clone())
        .context("building initial world")?;

    match args.format {
        OutputFormat::Text => {
            for i in 1..=args.ticks {
                world.step();
                println!("\nSimulation step {i}:");
                print!("{world}");
            }
        }
        OutputFormat::Json => {
            let summary = world
                .try_run_experiment(args.ticks, args.sample_every)
                .context("running experiment")?;
            let report = JsonReport {
                scenario: args.scenario,
                config: &config,
                summary,
                final_state: world.snapshot(),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    let stats = world.population_stats();
    tracing::info!(
        population = stats.population,
        births = stats.total_births,
        deaths = stats.total_deaths,
        "run finished"
    );
    Ok(())
}
