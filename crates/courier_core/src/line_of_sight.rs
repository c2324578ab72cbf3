//! Bresenham line-of-sight queries.
//!
//! Independent of any movement model and never called by the search
//! itself; renderers and higher-level AI use it to ask whether a straight
//! line between two cells is unobstructed.
//!
//! Plain Bresenham is not symmetric: tracing a→b and b→a can visit
//! different cells when the error term ties. Lines are therefore always
//! traced from the smaller endpoint (by `Cell` ordering), so both
//! directions visit the same cells.

use crate::grid::{Cell, Grid};

/// Iterator over the cells of a Bresenham line, endpoints included.
#[derive(Debug, Clone)]
pub struct BresenhamLine {
    current: Cell,
    end: Cell,
    dx: i32,
    dy: i32,
    sx: i32,
    sy: i32,
    err: i32,
    done: bool,
}

impl BresenhamLine {
    /// Trace from `start` to `end` exactly as given.
    #[must_use]
    pub fn new(start: Cell, end: Cell) -> Self {
        let dx = (end.x - start.x).abs();
        let dy = (end.y - start.y).abs();
        Self {
            current: start,
            end,
            dx,
            dy,
            sx: if start.x < end.x { 1 } else { -1 },
            sy: if start.y < end.y { 1 } else { -1 },
            err: dx - dy,
            done: false,
        }
    }
}

impl Iterator for BresenhamLine {
    type Item = Cell;

    fn next(&mut self) -> Option<Cell> {
        if self.done {
            return None;
        }
        let cell = self.current;
        if cell == self.end {
            self.done = true;
            return Some(cell);
        }

        let e2 = 2 * self.err;
        if e2 > -self.dy {
            self.err -= self.dy;
            self.current.x += self.sx;
        }
        if e2 < self.dx {
            self.err += self.dx;
            self.current.y += self.sy;
        }
        Some(cell)
    }
}

/// Cells on the line from `a` to `b`, in `a`→`b` order.
///
/// The cell set does not depend on argument order.
#[must_use]
pub fn line_cells(a: Cell, b: Cell) -> Vec<Cell> {
    if a <= b {
        BresenhamLine::new(a, b).collect()
    } else {
        let mut cells: Vec<Cell> = BresenhamLine::new(b, a).collect();
        cells.reverse();
        cells
    }
}

/// Whether every cell on the line between `a` and `b` is walkable.
///
/// Endpoints are included, so a blocked or out-of-bounds endpoint is never
/// visible. Stops at the first blocked cell.
#[must_use]
pub fn visible(grid: &Grid, a: Cell, b: Cell) -> bool {
    let (from, to) = if a <= b { (a, b) } else { (b, a) };
    BresenhamLine::new(from, to).all(|cell| grid.is_cell_walkable(cell))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_includes_endpoints() {
        let cells = line_cells(Cell::new(0, 0), Cell::new(3, 0));
        assert_eq!(
            cells,
            vec![
                Cell::new(0, 0),
                Cell::new(1, 0),
                Cell::new(2, 0),
                Cell::new(3, 0)
            ]
        );
    }

    #[test]
    fn test_single_cell_line() {
        assert_eq!(line_cells(Cell::new(2, 2), Cell::new(2, 2)), vec![Cell::new(2, 2)]);
    }

    #[test]
    fn test_diagonal_line() {
        let cells = line_cells(Cell::new(3, 3), Cell::new(0, 0));
        assert_eq!(
            cells,
            vec![
                Cell::new(3, 3),
                Cell::new(2, 2),
                Cell::new(1, 1),
                Cell::new(0, 0)
            ]
        );
    }

    #[test]
    fn test_line_is_connected() {
        let cells = line_cells(Cell::new(0, 0), Cell::new(7, 3));
        for pair in cells.windows(2) {
            assert!((pair[1].x - pair[0].x).abs() <= 1);
            assert!((pair[1].y - pair[0].y).abs() <= 1);
        }
        assert_eq!(cells.len(), 8);
    }

    #[test]
    fn test_line_cells_symmetric() {
        let a = Cell::new(0, 0);
        let b = Cell::new(5, 2);
        let mut forward = line_cells(a, b);
        let backward = line_cells(b, a);
        forward.reverse();
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_visible_open_grid() {
        let grid = Grid::open(8, 8).unwrap();
        assert!(visible(&grid, Cell::new(0, 0), Cell::new(7, 5)));
    }

    #[test]
    fn test_blocked_line() {
        let grid = Grid::parse(
            "
            .....
            ..#..
            .....
            ",
        )
        .unwrap();
        assert!(!visible(&grid, Cell::new(0, 1), Cell::new(4, 1)));
        assert!(!visible(&grid, Cell::new(4, 1), Cell::new(0, 1)));
        assert!(visible(&grid, Cell::new(0, 0), Cell::new(4, 0)));
    }

    #[test]
    fn test_blocked_or_outside_endpoint() {
        let grid = Grid::parse("..#").unwrap();
        assert!(!visible(&grid, Cell::new(0, 0), Cell::new(2, 0)));
        assert!(!visible(&grid, Cell::new(0, 0), Cell::new(-1, 0)));
        assert!(visible(&grid, Cell::new(1, 0), Cell::new(1, 0)));
    }
}
