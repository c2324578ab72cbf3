//! Headless runner implementation.
//!
//! Builds a [`Simulation`] from configuration and drives it either to
//! completion (batch mode) or from JSON commands (interactive mode).

use std::fs;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use courier_core::config::{speed_from_level, EngineConfig};
use courier_core::error::CourierError;
use courier_core::grid::{Cell, Grid};
use courier_core::map_generation::{random_walkable_cell, MapRng};
use courier_core::simulation::Simulation;
use thiserror::Error;

use crate::protocol::{Command, Response, RunSummary};

/// Errors raised by the headless runner.
#[derive(Debug, Error)]
pub enum HeadlessError {
    /// Reading input or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The engine rejected the setup.
    #[error(transparent)]
    Engine(#[from] CourierError),

    /// A cell argument could not be parsed.
    #[error("Invalid cell '{0}', expected 'x,y'")]
    InvalidCell(String),
}

/// Result type alias using [`HeadlessError`].
pub type Result<T> = std::result::Result<T, HeadlessError>;

/// Parse a cell written as `x,y`.
pub fn parse_cell(text: &str) -> Result<Cell> {
    let invalid = || HeadlessError::InvalidCell(text.to_string());
    let (x, y) = text.split_once(',').ok_or_else(invalid)?;
    let x = x.trim().parse().map_err(|_| invalid())?;
    let y = y.trim().parse().map_err(|_| invalid())?;
    Ok(Cell::new(x, y))
}

/// Headless runner configuration.
#[derive(Debug, Clone)]
pub struct HeadlessConfig {
    /// Engine settings (model, speed, generated map).
    pub engine: EngineConfig,
    /// ASCII map file; a map is generated from `engine.map` when absent.
    pub map_path: Option<PathBuf>,
    /// Courier start; random walkable cell when absent.
    pub start: Option<Cell>,
    /// Pickup cell; random with `goal` when either is absent.
    pub pickup: Option<Cell>,
    /// Goal cell.
    pub goal: Option<Cell>,
    /// Speed level override (1..=10).
    pub speed_level: Option<u8>,
    /// Tick limit for batch runs.
    pub max_ticks: u64,
    /// Emit a frame per tick in batch runs.
    pub emit_frames: bool,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            map_path: None,
            start: None,
            pickup: None,
            goal: None,
            speed_level: None,
            max_ticks: Self::DEFAULT_MAX_TICKS,
            emit_frames: false,
        }
    }
}

impl HeadlessConfig {
    /// Default tick limit for batch runs.
    pub const DEFAULT_MAX_TICKS: u64 = 10_000;

    /// Load the engine settings from a RON file.
    pub fn with_engine_file(mut self, path: &std::path::Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        self.engine = EngineConfig::from_ron(&text)?;
        Ok(self)
    }
}

/// Headless runner driving one simulation.
pub struct HeadlessRunner {
    sim: Simulation,
    config: HeadlessConfig,
}

impl HeadlessRunner {
    /// Largest `count` a single `tick` command may ask for.
    pub const MAX_TICKS_PER_COMMAND: u32 = 100_000;

    /// Build the simulation described by `config`.
    pub fn new(config: HeadlessConfig) -> Result<Self> {
        let sim = build_simulation(&config)?;
        Ok(Self { sim, config })
    }

    /// The simulation being driven.
    pub const fn simulation(&self) -> &Simulation {
        &self.sim
    }

    /// Play the delivery to completion or the tick limit, writing JSON lines
    /// to `out`.
    ///
    /// Planning failures end up in the summary rather than as an error;
    /// only I/O fails the run.
    pub fn run_to_completion<W: Write>(&mut self, mut out: W) -> Result<RunSummary> {
        out.write_all(Response::ready(&self.sim).to_json_line().as_bytes())?;

        let mut failure = self.sim.play().err();
        if failure.is_none() {
            let max_ticks = self.config.max_ticks;
            while self.sim.is_playing() && self.sim.tick_count() < max_ticks {
                match self.sim.tick() {
                    Ok(frame) => {
                        if self.config.emit_frames {
                            out.write_all(Response::Frame(frame).to_json_line().as_bytes())?;
                        }
                    }
                    Err(err) => {
                        failure = Some(err);
                        break;
                    }
                }
            }
        }

        if let Some(err) = &failure {
            tracing::warn!(error = %err, "Delivery failed");
        }
        let summary = RunSummary::from_simulation(&self.sim, failure.map(|e| e.to_string()));
        tracing::info!(
            phase = ?summary.phase,
            ticks = summary.ticks,
            delivered = summary.delivered,
            "Run finished"
        );
        out.write_all(Response::Summary(summary.clone()).to_json_line().as_bytes())?;
        out.flush()?;
        Ok(summary)
    }

    /// Read JSON commands from `input` until `quit` or end of input, writing
    /// responses to `out`.
    pub fn run_interactive<R: BufRead, W: Write>(&mut self, input: R, mut out: W) -> Result<()> {
        tracing::info!("Starting interactive session");
        out.write_all(Response::ready(&self.sim).to_json_line().as_bytes())?;
        out.flush()?;

        for line in input.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let (responses, quit) = match Command::from_json(&line) {
                Ok(cmd) => {
                    let quit = cmd == Command::Quit;
                    (self.handle_command(&cmd), quit)
                }
                Err(e) => (vec![Response::error(format!("Invalid command: {e}"), None)], false),
            };
            for response in responses {
                out.write_all(response.to_json_line().as_bytes())?;
            }
            out.flush()?;
            if quit {
                break;
            }
        }
        Ok(())
    }

    /// Apply one command and collect the responses.
    pub fn handle_command(&mut self, cmd: &Command) -> Vec<Response> {
        let name = cmd.name();
        tracing::debug!(cmd = name, "Handling command");

        let result: std::result::Result<Vec<Response>, CourierError> = match *cmd {
            Command::Tick { count } if count > Self::MAX_TICKS_PER_COMMAND => {
                Err(CourierError::InvalidConfiguration(format!(
                    "tick count {count} exceeds the limit of {}",
                    Self::MAX_TICKS_PER_COMMAND
                )))
            }
            Command::Tick { count } => {
                let mut frames = Vec::new();
                for _ in 0..count {
                    match self.sim.tick() {
                        Ok(frame) => frames.push(Response::Frame(frame)),
                        Err(err) => {
                            frames.push(Response::error(err.to_string(), Some(name)));
                            break;
                        }
                    }
                }
                Ok(frames)
            }
            Command::Query => Ok(vec![Response::Frame(self.sim.snapshot())]),
            Command::Play => self.sim.play().map(|()| vec![Response::ack(name)]),
            Command::Reset => {
                self.sim.reset_position();
                Ok(vec![Response::ack(name)])
            }
            Command::MoveCourier { x, y } => self
                .sim
                .relocate_courier(Cell::new(x, y))
                .map(|()| vec![Response::ack(name)]),
            Command::SetDestinations {
                pickup_x,
                pickup_y,
                goal_x,
                goal_y,
            } => self
                .sim
                .set_destinations(Cell::new(pickup_x, pickup_y), Cell::new(goal_x, goal_y))
                .map(|()| vec![Response::ack(name)]),
            Command::RandomCourier => self
                .sim
                .randomize_courier()
                .map(|_| vec![Response::ready(&self.sim)]),
            Command::RandomDestinations => self
                .sim
                .randomize_destinations()
                .map(|_| vec![Response::ready(&self.sim)]),
            Command::Speed { level } => self
                .sim
                .set_speed_level(level)
                .map(|()| vec![Response::ack(name)]),
            Command::Hash => Ok(vec![Response::Hash {
                tick: self.sim.tick_count(),
                hash: self.sim.state_hash(),
            }]),
            Command::Quit => Ok(vec![Response::ack(name)]),
        };

        result.unwrap_or_else(|err| vec![Response::error(err.to_string(), Some(name))])
    }
}

fn build_simulation(config: &HeadlessConfig) -> Result<Simulation> {
    let mut sim = match &config.map_path {
        Some(path) => {
            let grid = Grid::parse(&fs::read_to_string(path)?)?;
            let start = match config.start {
                Some(cell) => cell,
                None => {
                    let mut rng = MapRng::placement(config.engine.map.seed);
                    random_walkable_cell(&grid, &mut rng).ok_or_else(|| {
                        CourierError::InvalidConfiguration("map has no walkable cell".into())
                    })?
                }
            };
            let mut sim = Simulation::new(grid, start, &config.engine)?;
            if config.pickup.is_none() || config.goal.is_none() {
                sim.randomize_destinations()?;
            }
            sim
        }
        None => {
            let mut sim = Simulation::from_config(&config.engine)?;
            if let Some(start) = config.start {
                sim.relocate_courier(start)?;
            }
            sim
        }
    };

    if let (Some(pickup), Some(goal)) = (config.pickup, config.goal) {
        sim.set_destinations(pickup, goal)?;
    }
    if let Some(level) = config.speed_level {
        sim.set_speed(speed_from_level(level)?)?;
    }

    tracing::debug!(
        width = sim.grid().width(),
        height = sim.grid().height(),
        start = %sim.courier().origin(),
        destinations = ?sim.destinations(),
        "Simulation ready"
    );
    Ok(sim)
}
