//! Test fixtures and helpers.
//!
//! Pre-built grids for consistent testing. Maps are written as ASCII art
//! with `#` for obstacles and `.` for free cells.

use courier_core::grid::{Cell, Grid};
use fixed::types::I32F32;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Shorthand for [`Cell::new`].
#[must_use]
pub const fn cell(x: i32, y: i32) -> Cell {
    Cell::new(x, y)
}

/// Parse an ASCII map.
///
/// # Panics
///
/// Panics if the map is malformed.
#[must_use]
pub fn grid(text: &str) -> Grid {
    Grid::parse(text).unwrap_or_else(|e| panic!("bad fixture map: {e}"))
}

/// A vertical wall with a single gap at the bottom.
#[must_use]
pub fn walled_gap() -> Grid {
    grid(
        "
        ....#....
        ....#....
        ....#....
        ....#....
        .........
        ",
    )
}

/// A wall with no gap splitting the grid in two.
#[must_use]
pub fn split_grid() -> Grid {
    grid(
        "
        ...#...
        ...#...
        ...#...
        ",
    )
}

/// Winding corridors; the only route from top-left to bottom-right
/// snakes through every row.
#[must_use]
pub fn serpentine() -> Grid {
    grid(
        "
        .......
        ######.
        .......
        .######
        .......
        ",
    )
}

/// A diagonal gap only reachable by cutting a corner.
#[must_use]
pub fn corner_gap() -> Grid {
    grid(
        "
        .#
        #.
        ",
    )
}
