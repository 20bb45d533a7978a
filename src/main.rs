use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use isocity::{
    engine::{EngineBuilder, EngineSettings},
    scenario::{Scenario, ScenarioLoader},
    systems::{AutoplayConfig, AutoplaySystem},
    web::{self, WebServerConfig},
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Headless isometric city simulation")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run a scenario for a fixed number of ticks and print the result
    Run(RunArgs),
    /// Serve the live simulation over HTTP
    Serve(ServeArgs),
}

#[derive(Debug, Args)]
struct ScenarioArgs {
    /// Path to the scenario YAML file
    #[arg(long, default_value = "scenarios/starter_town.yaml")]
    scenario: PathBuf,

    /// Directory for snapshots
    #[arg(long)]
    snapshot_dir: Option<PathBuf>,

    /// Override snapshot interval in ticks
    #[arg(long)]
    snapshot_interval: Option<u64>,
}

#[derive(Debug, Args)]
struct RunArgs {
    #[command(flatten)]
    scenario: ScenarioArgs,

    /// Override tick count (uses scenario default when omitted)
    #[arg(long)]
    ticks: Option<u64>,

    /// Let a seeded bot attempt this many placements per tick
    #[arg(long)]
    autoplay: Option<u32>,
}

#[derive(Debug, Args)]
struct ServeArgs {
    #[command(flatten)]
    scenario: ScenarioArgs,

    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    #[arg(long, default_value_t = 8080)]
    port: u16,
}

impl ScenarioArgs {
    fn load(&self) -> Result<(Scenario, PathBuf)> {
        let loader = ScenarioLoader::new(".");
        let mut scenario = loader.load(&self.scenario)?;
        if let Some(interval) = self.snapshot_interval {
            scenario.snapshot_interval_ticks = interval;
        }
        let snapshot_dir = self
            .snapshot_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("snapshots"));
        Ok((scenario, snapshot_dir))
    }
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn run(args: RunArgs) -> Result<()> {
    let (mut scenario, snapshot_dir) = args.scenario.load()?;
    init_tracing(&scenario.config.logging.level);
    if let Some(attempts_per_tick) = args.autoplay {
        scenario.autoplay = Some(AutoplayConfig { attempts_per_tick });
    }

    let mut state = scenario.build_state()?;
    let ticks = scenario.ticks(args.ticks);
    let mut builder = EngineBuilder::new(EngineSettings {
        scenario_name: scenario.name.clone(),
        seed: scenario.seed,
        snapshot_interval_ticks: scenario.snapshot_interval_ticks,
        snapshot_dir,
    });
    if let Some(autoplay) = scenario.autoplay {
        builder.push_system(AutoplaySystem::new(autoplay));
    }
    let mut engine = builder.with_core_systems().build();

    if let Some(description) = &scenario.description {
        println!("{}: {}", scenario.name, description);
    }
    engine.run(&mut state, ticks)?;
    println!(
        "Scenario '{}' completed for {} ticks. Treasury: {}, population: {}",
        engine.scenario_name(),
        ticks,
        state.treasury(),
        state.population()
    );
    Ok(())
}

fn serve(args: ServeArgs) -> Result<()> {
    let (scenario, snapshot_dir) = args.scenario.load()?;
    init_tracing(&scenario.config.logging.level);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(web::run(WebServerConfig {
        scenario,
        snapshot_dir,
        host: args.host,
        port: args.port,
    }))
}

fn main() -> Result<()> {
    match Cli::parse().command {
        Command::Run(args) => run(args),
        Command::Serve(args) => serve(args),
    }
}
