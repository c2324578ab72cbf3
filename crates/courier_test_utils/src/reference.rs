//! Reference shortest-path oracle.
//!
//! A plain Dijkstra over the same neighbor relation the engine uses,
//! without heuristics or tie-breaking. Tests compare A* path costs
//! against it.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use courier_core::grid::{Cell, Grid};
use courier_core::math::Fixed;
use courier_core::movement::MovementModel;

/// Cheapest cost from `start` to `goal`, `None` if unreachable.
///
/// `start == goal` costs zero when the cell is walkable.
#[must_use]
pub fn shortest_cost(grid: &Grid, model: MovementModel, start: Cell, goal: Cell) -> Option<Fixed> {
    if !grid.is_cell_walkable(start) || !grid.is_cell_walkable(goal) {
        return None;
    }
    distances(grid, model, start).get(&goal).copied()
}

/// Cheapest cost from `start` to every reachable cell.
#[must_use]
pub fn distances(grid: &Grid, model: MovementModel, start: Cell) -> HashMap<Cell, Fixed> {
    let mut dist: HashMap<Cell, Fixed> = HashMap::new();
    if !grid.is_cell_walkable(start) {
        return dist;
    }

    let mut heap = BinaryHeap::new();
    dist.insert(start, Fixed::ZERO);
    heap.push(Reverse((Fixed::ZERO, start)));

    while let Some(Reverse((cost, cell))) = heap.pop() {
        if dist.get(&cell).is_some_and(|&best| cost > best) {
            continue;
        }
        for (next, step) in model.neighbors(grid, cell) {
            let candidate = cost + step;
            let improved = dist.get(&next).map_or(true, |&best| candidate < best);
            if improved {
                dist.insert(next, candidate);
                heap.push(Reverse((candidate, next)));
            }
        }
    }
    dist
}

/// Whether `goal` is reachable from `start` at all.
#[must_use]
pub fn reachable(grid: &Grid, model: MovementModel, start: Cell, goal: Cell) -> bool {
    shortest_cost(grid, model, start, goal).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{cell, fixed, split_grid, walled_gap};

    #[test]
    fn test_open_row() {
        let grid = Grid::open(5, 1).unwrap();
        assert_eq!(
            shortest_cost(&grid, MovementModel::Cardinal4, cell(0, 0), cell(4, 0)),
            Some(fixed(4))
        );
    }

    #[test]
    fn test_split_grid_unreachable() {
        let grid = split_grid();
        for model in MovementModel::ALL {
            let reach = reachable(&grid, model, cell(0, 0), cell(6, 0));
            // Knight jumps clear a one-cell wall.
            assert_eq!(reach, model == MovementModel::Extended16);
        }
    }

    #[test]
    fn test_detour_cost() {
        let grid = walled_gap();
        // Down 4, across 2 through the gap, up 4.
        assert_eq!(
            shortest_cost(&grid, MovementModel::Cardinal4, cell(3, 0), cell(5, 0)),
            Some(fixed(10))
        );
    }
}
