//! dicepool - Monte Carlo dice pool simulator
//!
//! Usage:
//!   dicepool analyze <SCENARIO> [OPTIONS]
//!   dicepool combat <SCENARIO> [OPTIONS]
//!
//! Scenarios are YAML or JSON (by extension). Command-line options override
//! the trial count and seed a scenario carries.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dicepool::build_info;
use dicepool::simulator::{AnalysisScenario, CombatScenario};
use dicepool::{FaceTable, SimConfig, SimulationService};

#[derive(Parser, Debug)]
#[command(name = "dicepool", version = build_info::version_string(), about = "Dice pool outcome simulator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Outcome distributions for a single pool
    Analyze(RunArgs),
    /// Attacker versus defender
    Combat(RunArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Scenario file (.yaml, .yml or .json)
    scenario: PathBuf,

    /// Number of trials (overrides the scenario)
    #[arg(short, long)]
    trials: Option<u32>,

    /// RNG seed (overrides the scenario)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Face table JSON (default: built-in standard table)
    #[arg(long)]
    faces: Option<PathBuf>,

    /// Print the report as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Run the simulation on a worker thread
    #[arg(long)]
    offload: bool,
}

impl RunArgs {
    fn service(&self) -> Result<SimulationService> {
        let faces = match &self.faces {
            Some(path) => {
                FaceTable::load(path).with_context(|| format!("loading face table {}", path.display()))?
            }
            None => FaceTable::standard(),
        };
        Ok(if self.offload {
            SimulationService::offloaded(faces)
        } else {
            SimulationService::in_process(faces)
        })
    }

    /// Scenario values first, then command-line overrides.
    fn config(&self, scenario: SimConfig) -> SimConfig {
        SimConfig {
            trials: self.trials.unwrap_or(scenario.trials),
            seed: self.seed.or(scenario.seed),
            ..scenario
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so JSON output stays clean
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "dicepool=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Analyze(args) => {
            let scenario = AnalysisScenario::from_file(&args.scenario)
                .with_context(|| format!("reading scenario {}", args.scenario.display()))?;
            let service = args.service()?;
            let config = args.config(scenario.config(&SimConfig::default()));
            info!(trials = config.trials, seed = ?config.seed, offload = service.is_offloaded(), "running analysis");

            let report = service.run_analysis(&scenario.side, &config).await;
            if args.json {
                println!("{}", report.to_json());
            } else {
                print!("{}", report.to_text());
            }
        }
        Command::Combat(args) => {
            let scenario = CombatScenario::from_file(&args.scenario)
                .with_context(|| format!("reading scenario {}", args.scenario.display()))?;
            let service = args.service()?;
            let config = args.config(scenario.config(&SimConfig::default()));
            info!(trials = config.trials, seed = ?config.seed, offload = service.is_offloaded(), "running combat");

            let report = service.run_combat(&scenario.setup, &config).await;
            if args.json {
                println!("{}", report.to_json());
            } else {
                print!("{}", report.to_text());
            }
        }
    }

    Ok(())
}
