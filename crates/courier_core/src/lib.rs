//! # Courier Core
//!
//! Deterministic grid pathfinding and motion engine for a delivery courier.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO
//! - No system randomness
//! - No floating-point math in motion or planning (uses fixed-point)
//!
//! ## Crate Structure
//!
//! - [`grid`] - Walkability grid and cell coordinates
//! - [`movement`] - Movement models, step costs and heuristics
//! - [`pathfinding`] - A* search
//! - [`line_of_sight`] - Bresenham visibility queries
//! - [`courier`] - Courier motion along a path
//! - [`delivery`] - Two-leg pickup and delivery
//! - [`simulation`] - Tick loop facade
//! - [`map_generation`] - Seeded random maps and placement
//! - [`config`] - RON engine configuration
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod config;
pub mod courier;
pub mod delivery;
pub mod error;
pub mod grid;
pub mod line_of_sight;
pub mod map_generation;
pub mod math;
pub mod movement;
pub mod pathfinding;
pub mod simulation;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::EngineConfig;
    pub use crate::courier::{Courier, CourierState, Leg, TickOutcome};
    pub use crate::delivery::{DeliveryEvent, DeliveryOrchestrator, DeliveryPhase, DeliveryTask};
    pub use crate::error::{CourierError, Result};
    pub use crate::grid::{Cell, Grid};
    pub use crate::line_of_sight::{line_cells, visible};
    pub use crate::math::{Fixed, Vec2Fixed};
    pub use crate::movement::{Heuristic, MovementModel};
    pub use crate::pathfinding::{find_path, find_path_with, find_route, Path};
    pub use crate::simulation::{Frame, Simulation};
}
