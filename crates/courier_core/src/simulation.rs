//! Simulation facade bundling grid, courier and delivery task.
//!
//! The simulation advances in discrete ticks. Each tick moves the courier
//! one step along its path and lets the delivery orchestrator react to the
//! result. A [`Frame`] snapshot is produced per tick for renderers.
//!
//! # Determinism
//!
//! - Motion and planning use fixed-point math only
//! - Random placement uses a seeded [`MapRng`]
//! - Same inputs always produce the same frames and state hashes
//!
//! # Example
//!
//! ```
//! use courier_core::config::EngineConfig;
//! use courier_core::grid::{Cell, Grid};
//! use courier_core::simulation::Simulation;
//!
//! let grid = Grid::open(6, 4).unwrap();
//! let mut sim = Simulation::new(grid, Cell::new(0, 0), &EngineConfig::default()).unwrap();
//! sim.set_destinations(Cell::new(5, 0), Cell::new(5, 3)).unwrap();
//! sim.play().unwrap();
//!
//! let phase = sim.run(1_000).unwrap();
//! assert!(phase.is_finished());
//! assert_eq!(sim.courier().cell(), Cell::new(5, 3));
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::config::{speed_from_level, EngineConfig};
use crate::courier::{Courier, CourierState};
use crate::delivery::{DeliveryEvent, DeliveryOrchestrator, DeliveryPhase, DeliveryTask};
use crate::error::{CourierError, Result};
use crate::grid::{Cell, Grid};
use crate::map_generation::{generate_map, random_destinations, random_walkable_cell, MapRng};
use crate::math::Fixed;

/// Presentation snapshot of one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Tick number, starting at 1 for the first tick.
    pub tick: u64,
    /// Continuous x position in cells.
    pub x: f64,
    /// Continuous y position in cells.
    pub y: f64,
    /// Rounded cell under the courier.
    pub cell: Cell,
    /// Facing angle in radians, screen-space.
    pub angle: f64,
    /// Courier motion state.
    pub state: CourierState,
    /// Whether the payload has been collected.
    pub carrying: bool,
    /// Delivery progress.
    pub phase: DeliveryPhase,
    /// Waypoints not yet reached.
    pub remaining: Vec<Cell>,
    /// Delivery event raised this tick.
    pub event: Option<DeliveryEvent>,
}

/// A courier delivering on a single grid.
#[derive(Debug, Clone)]
pub struct Simulation {
    grid: Grid,
    courier: Courier,
    orchestrator: DeliveryOrchestrator,
    destinations: Option<DeliveryTask>,
    rng: MapRng,
    tick: u64,
    playing: bool,
}

impl Simulation {
    /// Create a simulation with the courier standing on `start`.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` if `config` is invalid or `start` is not a
    /// walkable cell.
    pub fn new(grid: Grid, start: Cell, config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        require_walkable(&grid, start, "courier start")?;

        Ok(Self {
            courier: Courier::new(start, config.speed)?,
            orchestrator: DeliveryOrchestrator::with_heuristic(
                config.movement,
                config.effective_heuristic(),
            ),
            destinations: None,
            rng: MapRng::placement(config.map.seed),
            tick: 0,
            playing: false,
            grid,
        })
    }

    /// Generate a map from `config.map` and place courier and destinations
    /// at random.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` if the map has fewer than two walkable cells.
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        let grid = generate_map(&config.map)?;
        let mut rng = MapRng::placement(config.map.seed);
        let start = random_walkable_cell(&grid, &mut rng).ok_or_else(|| {
            CourierError::InvalidConfiguration("generated map has no walkable cell".into())
        })?;

        let mut sim = Self::new(grid, start, config)?;
        sim.rng = rng;
        sim.randomize_destinations()?;
        Ok(sim)
    }

    /// The walkability grid.
    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The courier.
    #[must_use]
    pub const fn courier(&self) -> &Courier {
        &self.courier
    }

    /// The delivery orchestrator.
    #[must_use]
    pub const fn orchestrator(&self) -> &DeliveryOrchestrator {
        &self.orchestrator
    }

    /// Pickup and goal, once set.
    #[must_use]
    pub const fn destinations(&self) -> Option<DeliveryTask> {
        self.destinations
    }

    /// Ticks run so far.
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.tick
    }

    /// True between [`Simulation::play`] and the end of the delivery.
    #[must_use]
    pub const fn is_playing(&self) -> bool {
        self.playing
    }

    /// Set pickup and goal cells. Stops any running delivery.
    pub fn set_destinations(&mut self, pickup: Cell, goal: Cell) -> Result<()> {
        self.grid.require_contains(pickup, "pickup")?;
        self.grid.require_contains(goal, "goal")?;
        if pickup == goal {
            return Err(CourierError::InvalidConfiguration(format!(
                "pickup and goal must differ, both are {pickup}"
            )));
        }
        self.stop();
        self.destinations = Some(DeliveryTask { pickup, goal });
        Ok(())
    }

    /// Move the courier to a random walkable cell, which becomes its new
    /// reset position.
    pub fn randomize_courier(&mut self) -> Result<Cell> {
        let cell = random_walkable_cell(&self.grid, &mut self.rng).ok_or_else(|| {
            CourierError::InvalidConfiguration("grid has no walkable cell".into())
        })?;
        self.relocate_courier(cell)?;
        Ok(cell)
    }

    /// Place the courier on `cell`, which becomes its new reset position.
    pub fn relocate_courier(&mut self, cell: Cell) -> Result<()> {
        require_walkable(&self.grid, cell, "courier start")?;
        self.stop();
        self.courier.relocate(cell);
        tracing::debug!(%cell, "Courier relocated");
        Ok(())
    }

    /// Pick a random distinct pickup and goal on walkable cells.
    pub fn randomize_destinations(&mut self) -> Result<(Cell, Cell)> {
        let (pickup, goal) = random_destinations(&self.grid, &mut self.rng).ok_or_else(|| {
            CourierError::InvalidConfiguration(
                "grid needs two walkable cells for pickup and goal".into(),
            )
        })?;
        self.set_destinations(pickup, goal)?;
        Ok((pickup, goal))
    }

    /// Start the delivery from the courier's current cell.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` when no destinations are set, otherwise the
    /// planning errors of [`DeliveryOrchestrator::start`].
    pub fn play(&mut self) -> Result<()> {
        let Some(DeliveryTask { pickup, goal }) = self.destinations else {
            return Err(CourierError::InvalidConfiguration(
                "pickup and goal must be set before playing".into(),
            ));
        };
        let result = self
            .orchestrator
            .start(&self.grid, &mut self.courier, pickup, goal);
        self.playing = result.is_ok() && !self.orchestrator.phase().is_finished();
        result
    }

    /// Return the courier to its reset position and stop the delivery.
    pub fn reset_position(&mut self) {
        self.stop();
        self.courier.reset();
    }

    /// Change the courier speed (cells per tick).
    pub fn set_speed(&mut self, speed: Fixed) -> Result<()> {
        self.courier.set_speed(speed)
    }

    /// Change the courier speed by level (1..=10).
    pub fn set_speed_level(&mut self, level: u8) -> Result<()> {
        self.courier.set_speed(speed_from_level(level)?)
    }

    fn stop(&mut self) {
        self.playing = false;
        self.orchestrator.cancel();
    }

    /// Advance one tick.
    ///
    /// # Errors
    ///
    /// `NoRouteToGoal` on the tick the courier collects the payload but the
    /// goal is unreachable. Playing stops; the courier stays on the pickup.
    pub fn tick(&mut self) -> Result<Frame> {
        self.tick += 1;
        let outcome = self.courier.tick();
        let event = match self
            .orchestrator
            .update(&self.grid, &mut self.courier, outcome)
        {
            Ok(event) => event,
            Err(err) => {
                self.playing = false;
                return Err(err);
            }
        };
        if self.orchestrator.phase().is_finished() {
            self.playing = false;
        }

        #[cfg(debug_assertions)]
        {
            let hash = self.state_hash();
            tracing::trace!(tick = self.tick, state_hash = hash, "Simulation state hash");
        }

        Ok(self.frame(event))
    }

    /// Tick until the delivery finishes or `max_ticks` ticks have run.
    ///
    /// Returns the delivery phase at the end; a phase that is not finished
    /// means the tick limit was hit.
    pub fn run(&mut self, max_ticks: u64) -> Result<DeliveryPhase> {
        for _ in 0..max_ticks {
            if !self.playing {
                break;
            }
            self.tick()?;
        }
        Ok(self.orchestrator.phase())
    }

    /// Snapshot of the current state without advancing.
    #[must_use]
    pub fn snapshot(&self) -> Frame {
        self.frame(None)
    }

    fn frame(&self, event: Option<DeliveryEvent>) -> Frame {
        let position = self.courier.position();
        Frame {
            tick: self.tick,
            x: position.x.to_num(),
            y: position.y.to_num(),
            cell: self.courier.cell(),
            angle: self.courier.angle(),
            state: self.courier.state(),
            carrying: self.courier.is_carrying(),
            phase: self.orchestrator.phase(),
            remaining: self.courier.remaining_path().to_vec(),
            event,
        }
    }

    /// Compute a hash of the simulation state for determinism checks.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.tick.hash(&mut hasher);
        self.courier.hash(&mut hasher);
        self.orchestrator.hash(&mut hasher);
        self.destinations.hash(&mut hasher);
        self.rng.hash(&mut hasher);
        hasher.finish()
    }
}

fn require_walkable(grid: &Grid, cell: Cell, what: &str) -> Result<()> {
    grid.require_contains(cell, what)?;
    if grid.is_cell_walkable(cell) {
        Ok(())
    } else {
        Err(CourierError::InvalidConfiguration(format!(
            "{what} {cell} is an obstacle"
        )))
    }
}
