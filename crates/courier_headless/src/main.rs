//! Headless courier runner.
//!
//! Runs the delivery simulation without graphics, printing JSON lines on
//! stdout. Logs go to stderr.
//!
//! # Usage
//!
//! ```bash
//! # Generate a map and run a delivery to completion
//! cargo run -p courier_headless -- run --seed 7 --model extended16 --frames
//!
//! # Use an ASCII map with fixed endpoints
//! cargo run -p courier_headless -- run --map maps/maze.txt --start 0,0 --pickup 5,3 --goal 9,9
//!
//! # Drive the courier from stdin
//! cargo run -p courier_headless -- interactive --config engine.ron
//!
//! # Verify determinism by running same seed multiple times
//! cargo run -p courier_headless -- verify --seed 12345 --runs 5
//! ```

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use courier_core::grid::Cell;
use courier_core::movement::{Heuristic, MovementModel};
use courier_headless::{parse_cell, HeadlessConfig, HeadlessError, HeadlessRunner};

#[derive(Parser)]
#[command(name = "courier_headless")]
#[command(about = "Headless courier runner for CI and scripted control")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one delivery to completion
    Run {
        #[command(flatten)]
        setup: SetupArgs,

        /// Maximum ticks before giving up
        #[arg(long, default_value_t = HeadlessConfig::DEFAULT_MAX_TICKS)]
        max_ticks: u64,

        /// Print a frame per tick
        #[arg(long)]
        frames: bool,
    },

    /// Read JSON commands from stdin
    Interactive {
        #[command(flatten)]
        setup: SetupArgs,
    },

    /// Verify determinism by running same seed multiple times
    Verify {
        #[command(flatten)]
        setup: SetupArgs,

        /// Number of verification runs
        #[arg(short, long, default_value = "5")]
        runs: u32,
    },
}

/// World setup shared by all subcommands.
#[derive(Args)]
struct SetupArgs {
    /// Engine configuration file (RON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// ASCII map file ('#'/'1' obstacle, '.'/'0' free)
    #[arg(short, long)]
    map: Option<PathBuf>,

    /// Seed for map generation and random placement
    #[arg(long)]
    seed: Option<u64>,

    /// Generated map width
    #[arg(long)]
    width: Option<u32>,

    /// Generated map height
    #[arg(long)]
    height: Option<u32>,

    /// Movement model: cardinal4, octile8 or extended16
    #[arg(long)]
    model: Option<MovementModel>,

    /// Heuristic override: manhattan, octile, euclidean or zero
    #[arg(long, value_parser = parse_heuristic)]
    heuristic: Option<Heuristic>,

    /// Speed level (1-10)
    #[arg(long)]
    speed: Option<u8>,

    /// Courier start cell as x,y
    #[arg(long, value_parser = parse_cell_arg)]
    start: Option<Cell>,

    /// Pickup cell as x,y
    #[arg(long, value_parser = parse_cell_arg, requires = "goal")]
    pickup: Option<Cell>,

    /// Goal cell as x,y
    #[arg(long, value_parser = parse_cell_arg, requires = "pickup")]
    goal: Option<Cell>,
}

impl SetupArgs {
    fn into_config(self) -> Result<HeadlessConfig, HeadlessError> {
        let mut config = HeadlessConfig::default();
        if let Some(path) = &self.config {
            config = config.with_engine_file(path)?;
        }

        let engine = &mut config.engine;
        if let Some(seed) = self.seed {
            engine.map.seed = seed;
        }
        if let Some(width) = self.width {
            engine.map.width = width;
        }
        if let Some(height) = self.height {
            engine.map.height = height;
        }
        if let Some(model) = self.model {
            engine.movement = model;
        }
        if self.heuristic.is_some() {
            engine.heuristic = self.heuristic;
        }

        config.map_path = self.map;
        config.start = self.start;
        config.pickup = self.pickup;
        config.goal = self.goal;
        config.speed_level = self.speed;
        Ok(config)
    }
}

fn parse_cell_arg(text: &str) -> Result<Cell, String> {
    parse_cell(text).map_err(|e| e.to_string())
}

fn parse_heuristic(text: &str) -> Result<Heuristic, String> {
    match text.to_ascii_lowercase().as_str() {
        "manhattan" => Ok(Heuristic::Manhattan),
        "octile" => Ok(Heuristic::Octile),
        "euclidean" => Ok(Heuristic::Euclidean),
        "zero" | "none" => Ok(Heuristic::Zero),
        other => Err(format!("unknown heuristic '{other}'")),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging to stderr (stdout is for protocol)
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let result = match cli.command {
        Commands::Run {
            setup,
            max_ticks,
            frames,
        } => cmd_run(setup, max_ticks, frames),
        Commands::Interactive { setup } => cmd_interactive(setup),
        Commands::Verify { setup, runs } => cmd_verify(setup, runs),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Run one delivery to completion
fn cmd_run(setup: SetupArgs, max_ticks: u64, frames: bool) -> Result<ExitCode, HeadlessError> {
    let mut config = setup.into_config()?;
    config.max_ticks = max_ticks;
    config.emit_frames = frames;

    let mut runner = HeadlessRunner::new(config)?;
    let summary = runner.run_to_completion(io::stdout().lock())?;
    Ok(if summary.delivered {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    })
}

/// Drive the simulation from stdin
fn cmd_interactive(setup: SetupArgs) -> Result<ExitCode, HeadlessError> {
    let mut runner = HeadlessRunner::new(setup.into_config()?)?;
    runner.run_interactive(io::stdin().lock(), io::stdout().lock())?;
    Ok(ExitCode::SUCCESS)
}

/// Verify determinism by running same setup multiple times
fn cmd_verify(setup: SetupArgs, runs: u32) -> Result<ExitCode, HeadlessError> {
    let config = setup.into_config()?;
    tracing::info!(runs, seed = config.engine.map.seed, "Verifying determinism");

    let mut hashes = Vec::with_capacity(runs as usize);
    for run in 0..runs {
        let mut runner = HeadlessRunner::new(config.clone())?;
        let summary = runner.run_to_completion(io::sink())?;
        tracing::debug!(run, hash = summary.hash, ticks = summary.ticks, "Run complete");
        hashes.push(summary.hash);
    }

    let deterministic = hashes.windows(2).all(|w| w[0] == w[1]);
    println!(
        "{}",
        serde_json::json!({
            "type": "verify",
            "runs": runs,
            "deterministic": deterministic,
            "hashes": hashes,
        })
    );

    if deterministic {
        tracing::info!("All runs produced identical state hashes");
        Ok(ExitCode::SUCCESS)
    } else {
        tracing::error!(?hashes, "Runs diverged");
        Ok(ExitCode::FAILURE)
    }
}
