//! Field Simulation Engine
//!
//! Runs one of the three models headless, writing periodic views, the
//! per-tick metrics and a run summary.

use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use sim_core::output::{prepare_output_dir, write_metrics, write_summary, write_view, ViewScheduler};
use sim_core::{Config, ModelKind, Simulation};

/// Command line arguments for the simulation
#[derive(Parser, Debug)]
#[command(name = "fieldsim")]
#[command(about = "Agent-based field simulations: village, robots, barn")]
struct Args {
    /// Which model to run (village, robots, barn)
    #[arg(long, default_value = "village")]
    model: ModelKind,

    /// TOML configuration file; defaults apply when absent
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed for reproducibility (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// Maximum number of ticks (overrides the config file)
    #[arg(long)]
    ticks: Option<u64>,

    /// Interval between view snapshots in ticks; 0 keeps only the first and last
    #[arg(long)]
    snapshot_interval: Option<u64>,

    /// Directory for views, metrics and summary
    #[arg(long, default_value = "output")]
    output: PathBuf,
}

fn load_config(args: &Args) -> Result<Config, sim_core::ConfigError> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(),
    };
    if let Some(seed) = args.seed {
        config.simulation.seed = seed;
    }
    if let Some(ticks) = args.ticks {
        config.simulation.max_ticks = ticks;
    }
    if let Some(interval) = args.snapshot_interval {
        config.simulation.snapshot_interval = interval;
    }
    Ok(config)
}

fn write_snapshot(sim: &mut Simulation, scheduler: &mut ViewScheduler, dir: &Path) {
    let view = sim.view();
    match write_view(dir, &view) {
        Ok(_) => scheduler.mark_written(),
        Err(e) => eprintln!("Warning: Could not write view at tick {}: {}", view.tick, e),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();
    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("Field Simulation Engine");
    println!("=======================");
    println!("Model: {}", args.model);
    println!("Seed: {}", config.simulation.seed);
    println!("Ticks: {}", config.simulation.max_ticks);
    println!("Snapshot interval: {}", config.simulation.snapshot_interval);
    println!();

    if let Err(e) = prepare_output_dir(&args.output) {
        eprintln!("Warning: Could not create output directories: {}", e);
    }

    println!("Building {} world...", args.model);
    let mut sim = match Simulation::new(&config, args.model) {
        Ok(sim) => sim,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let summary = sim.spawn_summary();
    println!("  Spawned {} agents", summary.total_agents);
    for (kind, count) in &summary.by_kind {
        println!("    {}: {}", kind, count);
    }

    let mut scheduler = ViewScheduler::new(config.simulation.snapshot_interval);
    write_snapshot(&mut sim, &mut scheduler, &args.output);

    println!();
    println!("Starting simulation...");
    println!();

    while sim.step() {
        let tick = sim.tick();
        if scheduler.should_snapshot(tick) {
            write_snapshot(&mut sim, &mut scheduler, &args.output);
        }

        if tick % 100 == 0 {
            let counters = sim
                .latest_metrics()
                .map(|sample| {
                    sample
                        .counters
                        .iter()
                        .map(|(name, value)| format!("{}: {}", name, value))
                        .collect::<Vec<_>>()
                        .join(", ")
                })
                .unwrap_or_default();
            println!("Tick {} / {} ({})", tick, config.simulation.max_ticks, counters);
        }
    }

    // Final view, unless the last tick already produced one
    if !scheduler.should_snapshot(sim.tick()) {
        write_snapshot(&mut sim, &mut scheduler, &args.output);
    }

    if let Err(e) = write_metrics(&args.output, sim.metrics()) {
        eprintln!("Warning: Could not write metrics: {}", e);
    }
    let summary = sim.summary();
    if let Err(e) = write_summary(&args.output, &summary) {
        eprintln!("Warning: Could not write summary: {}", e);
    }

    println!();
    println!("Simulation complete. Ran {} ticks.", summary.ticks_run);
    for (name, value) in &summary.final_counters {
        println!("  {}: {}", name, value);
    }
    println!("Generated {} views in {}.", scheduler.snapshot_count(), args.output.display());
    ExitCode::SUCCESS
}
