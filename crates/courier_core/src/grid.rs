//! Walkability grid and cell coordinates.
//!
//! The grid is produced once by a map loader (or the generator in
//! [`crate::map_generation`]) and is read-only afterwards. Every query on
//! a cell outside the grid answers "not walkable" instead of failing.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CourierError, Result};
use crate::math::{Fixed, Vec2Fixed};

/// Integer grid coordinate.
///
/// Components are signed so neighbor offsets can step outside the grid;
/// such cells are never walkable.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Cell {
    /// Column, 0-indexed from the left.
    pub x: i32,
    /// Row, 0-indexed from the top.
    pub y: i32,
}

impl Cell {
    /// Create a new cell coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Cell displaced by `(dx, dy)`.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Center of this cell in continuous grid space.
    #[must_use]
    pub fn to_position(self) -> Vec2Fixed {
        Vec2Fixed::from_ints(self.x, self.y)
    }

    /// Nearest cell to a continuous position (the rounded projection).
    #[must_use]
    pub fn from_position(pos: Vec2Fixed) -> Self {
        Self::new(pos.x.round().to_num(), pos.y.round().to_num())
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for Cell {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

/// Rectangular walkability matrix.
///
/// A `true` flag marks an obstacle, matching the map convention where
/// `1` means blocked.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "GridRecord")]
pub struct Grid {
    /// Grid width in cells.
    width: u32,
    /// Grid height in cells.
    height: u32,
    /// Obstacle flags stored in row-major order.
    blocked: Vec<bool>,
}

/// Serialized form of a [`Grid`], validated on the way in.
#[derive(Deserialize)]
struct GridRecord {
    width: u32,
    height: u32,
    blocked: Vec<bool>,
}

impl TryFrom<GridRecord> for Grid {
    type Error = CourierError;

    fn try_from(record: GridRecord) -> Result<Self> {
        Self::from_flags(record.width, record.height, record.blocked)
    }
}

impl Grid {
    /// Create a grid from row-major obstacle flags.
    pub fn from_flags(width: u32, height: u32, blocked: Vec<bool>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(CourierError::InvalidGrid(format!(
                "grid must be at least 1x1, got {width}x{height}"
            )));
        }
        let expected = (width as usize) * (height as usize);
        if blocked.len() != expected {
            return Err(CourierError::InvalidGrid(format!(
                "expected {expected} cells for {width}x{height}, got {}",
                blocked.len()
            )));
        }

        Ok(Self {
            width,
            height,
            blocked,
        })
    }

    /// Create a grid from rows of obstacle flags.
    ///
    /// Fails if there are no rows, the rows are empty, or the rows have
    /// unequal length.
    pub fn from_rows<R: AsRef<[bool]>>(rows: &[R]) -> Result<Self> {
        let Some(first) = rows.first() else {
            return Err(CourierError::InvalidGrid("grid has no rows".into()));
        };
        let width = first.as_ref().len();
        if width == 0 {
            return Err(CourierError::InvalidGrid("grid rows are empty".into()));
        }

        let mut blocked = Vec::with_capacity(width * rows.len());
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != width {
                return Err(CourierError::InvalidGrid(format!(
                    "row {y} has {} cells, expected {width}",
                    row.len()
                )));
            }
            blocked.extend_from_slice(row);
        }

        let width = u32::try_from(width)
            .map_err(|_| CourierError::InvalidGrid("grid is too wide".into()))?;
        let height = u32::try_from(rows.len())
            .map_err(|_| CourierError::InvalidGrid("grid is too tall".into()))?;
        Self::from_flags(width, height, blocked)
    }

    /// Create a grid with every cell free.
    pub fn open(width: u32, height: u32) -> Result<Self> {
        let cells = (width as usize) * (height as usize);
        Self::from_flags(width, height, vec![false; cells])
    }

    /// Parse a text map, one line per row.
    ///
    /// `#` and `1` are obstacles, `.` and `0` are free. Blank lines and
    /// surrounding whitespace are ignored.
    pub fn parse(text: &str) -> Result<Self> {
        let mut rows = Vec::new();
        for (y, line) in text.lines().map(str::trim).filter(|l| !l.is_empty()).enumerate() {
            let row = line
                .chars()
                .enumerate()
                .map(|(x, ch)| match ch {
                    '#' | '1' => Ok(true),
                    '.' | '0' => Ok(false),
                    other => Err(CourierError::InvalidGrid(format!(
                        "unexpected character {other:?} at ({x}, {y})"
                    ))),
                })
                .collect::<Result<Vec<bool>>>()?;
            rows.push(row);
        }
        Self::from_rows(&rows)
    }

    /// Grid width in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Convert (x, y) coordinates to a cell index, `None` when outside.
    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if self.in_bounds(x, y) {
            Some((y as usize) * (self.width as usize) + (x as usize))
        } else {
            None
        }
    }

    /// Check if coordinates are within grid bounds.
    #[must_use]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    /// Check if a cell is within grid bounds.
    #[must_use]
    pub fn contains(&self, cell: Cell) -> bool {
        self.in_bounds(cell.x, cell.y)
    }

    /// Check if a cell is walkable.
    ///
    /// Out-of-bounds coordinates are not walkable.
    #[must_use]
    pub fn is_walkable(&self, x: i32, y: i32) -> bool {
        self.index(x, y).is_some_and(|i| !self.blocked[i])
    }

    /// Check if a cell is walkable.
    #[must_use]
    pub fn is_cell_walkable(&self, cell: Cell) -> bool {
        self.is_walkable(cell.x, cell.y)
    }

    /// Iterate over all walkable cells in row-major order.
    pub fn walkable_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.blocked.iter().enumerate().filter_map(|(i, &blocked)| {
            if blocked {
                None
            } else {
                let w = self.width as usize;
                Some(Cell::new((i % w) as i32, (i / w) as i32))
            }
        })
    }

    /// Number of walkable cells.
    #[must_use]
    pub fn walkable_count(&self) -> usize {
        self.blocked.iter().filter(|&&b| !b).count()
    }

    /// Fraction of cells that are obstacles.
    #[must_use]
    pub fn obstacle_ratio(&self) -> Fixed {
        let total = self.blocked.len();
        let blocked = total - self.walkable_count();
        Fixed::from_num(blocked) / Fixed::from_num(total)
    }

    /// Check a cell is inside the grid, for configuration inputs.
    pub fn require_contains(&self, cell: Cell, what: &str) -> Result<()> {
        if self.contains(cell) {
            Ok(())
        } else {
            Err(CourierError::InvalidConfiguration(format!(
                "{what} {cell} is outside the {}x{} grid",
                self.width, self.height
            )))
        }
    }
}

impl fmt::Display for Grid {
    /// Renders the grid in the same text format [`Grid::parse`] reads.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                let ch = if self.is_walkable(x, y) { '.' } else { '#' };
                write!(f, "{ch}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
