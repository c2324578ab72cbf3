//! Error types for the courier engine.

use thiserror::Error;

use crate::grid::Cell;

/// Result type alias using [`CourierError`].
pub type Result<T> = std::result::Result<T, CourierError>;

/// Top-level error type for all courier engine errors.
///
/// An empty [`Path`](crate::pathfinding::Path) is the ordinary "no route"
/// answer of the pathfinder. The route variants here exist for callers that
/// want that outcome surfaced as an error, such as the delivery orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CourierError {
    /// Malformed walkability grid.
    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    /// Rejected configuration value (speed, time step, cell outside the grid).
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The pathfinder found no route between two cells.
    #[error("No route from {from} to {to}")]
    NoRouteFound {
        /// Start cell of the search.
        from: Cell,
        /// Target cell of the search.
        to: Cell,
    },

    /// The first delivery leg could not be planned.
    #[error("No route from {from} to pickup {pickup}")]
    NoRouteToPickup {
        /// Courier cell when the task was started.
        from: Cell,
        /// Requested pickup cell.
        pickup: Cell,
    },

    /// The second delivery leg could not be planned.
    #[error("No route from pickup {pickup} to goal {goal}")]
    NoRouteToGoal {
        /// Pickup cell the courier is standing on.
        pickup: Cell,
        /// Requested goal cell.
        goal: Cell,
    },

    /// Configuration text failed to parse.
    #[error("Failed to parse configuration: {message}")]
    DataParseError {
        /// Error message.
        message: String,
    },
}
