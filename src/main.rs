use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use farmstead::{
    engine::SimulatedClock,
    scenario::ScenarioLoader,
    snapshot::SnapshotWriter,
    web::{self, WebServerConfig},
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Farmstead simulation runner")]
struct Cli {
    /// Path to the scenario YAML file
    #[arg(long, default_value = "scenarios/starter_farm.yaml")]
    scenario: PathBuf,

    /// Override tick count (uses scenario default when omitted)
    #[arg(long)]
    ticks: Option<u64>,

    /// Override simulated milliseconds per tick
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Persist the farm to `<dir>/<user>.json` after every change
    #[arg(long)]
    snapshot_dir: Option<PathBuf>,

    /// Serve the run over HTTP instead of printing a summary
    #[arg(long)]
    serve: bool,

    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    #[arg(long, default_value_t = 8080)]
    port: u16,
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let loader = ScenarioLoader::new(".");
    let scenario = loader.load(&cli.scenario)?;
    init_tracing(&scenario.config.logging.level);

    let ticks = scenario.ticks(cli.ticks);
    let tick_ms = cli.tick_ms.unwrap_or(scenario.tick_ms);

    if cli.serve {
        let runtime = tokio::runtime::Runtime::new()?;
        return runtime.block_on(web::run(WebServerConfig {
            scenario,
            ticks,
            tick_ms,
            snapshot_dir: cli.snapshot_dir,
            host: cli.host,
            port: cli.port,
        }));
    }

    let mut farm = scenario.build_farm()?;
    if let Some(dir) = &cli.snapshot_dir {
        farm.set_persistence(SnapshotWriter::new(dir)?);
    }
    let mut clock = SimulatedClock::default();
    let summaries = farm.run_for(&mut clock, ticks, tick_ms, |_, _| {});
    let events: usize = summaries.iter().map(|s| s.events.len()).sum();

    let view = farm.view();
    println!(
        "Scenario '{}' completed for {} ticks ({} events). Coins: {}, stock: {}/{}, power: {}/{}",
        scenario.name,
        ticks,
        events,
        view.coins,
        view.inventory_total,
        view.capacity,
        view.power.produced,
        view.power.consumed
    );
    for (resource, amount) in &view.inventory {
        println!("  {:<12} {amount}", resource.as_str());
    }
    Ok(())
}
