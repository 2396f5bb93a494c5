/*
 * Boid Flocking Simulation - Headless Runner
 *
 * Runs the flocking core for a fixed number of ticks without rendering and
 * logs progress. Settings come from an optional TOML file; command-line
 * flags override individual values.
 */

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};

use boid_flock::{DebugInfo, Settings, Simulation, UpdateMode, Vec3};

// How often progress is logged, in ticks
const REPORT_INTERVAL: u64 = 60;

#[derive(Parser)]
#[command(name = "boid-flock")]
#[command(author, version, about = "Headless boid flocking simulation", long_about = None)]
struct Cli {
    /// TOML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of fixed steps to run
    #[arg(short, long)]
    ticks: Option<u64>,

    /// Total number of agents
    #[arg(short = 'n', long)]
    count: Option<usize>,

    /// Number of independent flocks the agents are split into
    #[arg(short, long)]
    groups: Option<usize>,

    /// Disable the copy-nearby-force optimisation
    #[arg(long)]
    no_copy: bool,

    /// Disable the neighbour cap
    #[arg(long)]
    no_cap: bool,

    /// Update the whole population every tick
    #[arg(long)]
    no_half_update: bool,

    /// Compute every force of a tick from a snapshot, in parallel
    #[arg(long)]
    synchronized: bool,

    /// Seed for start positions
    #[arg(long)]
    seed: Option<u64>,

    /// Target point as x,y,z
    #[arg(long, value_parser = parse_target)]
    target: Option<Vec3>,

    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_target(value: &str) -> Result<Vec3, String> {
    let parts: Vec<f32> = value
        .split(',')
        .map(|part| part.trim().parse::<f32>())
        .collect::<Result<_, _>>()
        .map_err(|e| format!("invalid coordinate: {e}"))?;
    match parts.as_slice() {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => Err(format!("expected three comma separated values, got {}", parts.len())),
    }
}

impl Cli {
    fn settings(&self) -> Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::load(path)
                .with_context(|| format!("Failed to load settings from {}", path.display()))?,
            None => Settings::default(),
        };

        if let Some(ticks) = self.ticks {
            settings.run.ticks = ticks;
        }
        if let Some(count) = self.count {
            settings.population.count = count;
        }
        if let Some(groups) = self.groups {
            settings.population.groups = groups;
        }
        if let Some(seed) = self.seed {
            settings.population.seed = Some(seed);
        }
        if let Some(target) = self.target {
            settings.run.target = Some(target.to_array());
        }
        let optimizations = &mut settings.optimizations;
        optimizations.copy &= !self.no_copy;
        optimizations.neighbor_cap &= !self.no_cap;
        optimizations.half_update &= !self.no_half_update;
        if self.synchronized {
            optimizations.mode = UpdateMode::Synchronized;
        }

        settings.validate().context("Invalid settings")?;
        Ok(settings)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let settings = cli.settings()?;
    run(&settings)?;
    Ok(())
}

// Run the configured number of ticks, logging progress and a final summary
fn run(settings: &Settings) -> Result<DebugInfo> {
    let mut simulation = Simulation::from_settings(settings).context("Failed to build the flock")?;

    let started = std::time::Instant::now();
    for tick in 1..=settings.run.ticks {
        let stats = simulation.step().with_context(|| format!("Tick {tick} failed"))?;
        if tick % REPORT_INTERVAL == 0 {
            let mean_speed = simulation.debug_info().mean_speed;
            info!(
                tick,
                processed = stats.processed,
                copied = stats.copied,
                without_cohesion = stats.without_cohesion,
                mean_speed,
                "progress"
            );
        }
    }

    let summary = simulation.debug_info();
    let elapsed = started.elapsed();
    info!(
        ticks = summary.ticks,
        agents = simulation.group().len(),
        processed = summary.totals.processed,
        copy_ratio = summary.copy_ratio(),
        speed_clamped = summary.totals.speed_clamped,
        pinned = summary.totals.pinned,
        mean_speed = summary.mean_speed,
        elapsed_ms = elapsed.as_secs_f64() * 1000.0,
        "run complete"
    );
    Ok(summary.clone())
}
