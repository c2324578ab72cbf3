//! Grid-based pathfinding using A* algorithm.
//!
//! All costs use fixed-point math for deterministic results across
//! platforms. Frontier ties on `f = g + h` are broken by discovery order:
//! every push gets a monotonically increasing sequence number and the
//! earliest entry wins. Neighbors are discovered in the fixed order of
//! [`MovementModel::steps`], so identical inputs always yield identical
//! paths.

use std::cmp::Ordering;
use std::collections::hash_map::Entry;
use std::collections::{BinaryHeap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{CourierError, Result};
use crate::grid::{Cell, Grid};
use crate::math::{fixed_serde, Fixed};
use crate::movement::{Heuristic, MovementModel};

/// Ordered cells from (exclusive) start to (inclusive) goal.
///
/// An empty path means there is nothing to follow: either no route
/// exists or start and goal coincide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Path {
    cells: Vec<Cell>,
    /// Sum of step costs along the path.
    #[serde(with = "fixed_serde")]
    cost: Fixed,
}

impl Path {
    /// The empty path.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            cells: Vec::new(),
            cost: Fixed::ZERO,
        }
    }

    /// Build a path from explicit cells, checking every step is legal.
    ///
    /// Returns `None` if any consecutive pair (starting from `start`) is not
    /// a legal single step under `model`.
    #[must_use]
    pub fn from_cells(grid: &Grid, model: MovementModel, start: Cell, cells: Vec<Cell>) -> Option<Self> {
        let cost = path_cost(grid, model, start, &cells)?;
        Some(Self { cells, cost })
    }

    /// Number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True when there is nothing to follow.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cells in traversal order.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Total movement cost.
    #[must_use]
    pub const fn cost(&self) -> Fixed {
        self.cost
    }

    /// Final cell, if any.
    #[must_use]
    pub fn goal(&self) -> Option<Cell> {
        self.cells.last().copied()
    }

    /// Iterate over the cells.
    pub fn iter(&self) -> std::slice::Iter<'_, Cell> {
        self.cells.iter()
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a Cell;
    type IntoIter = std::slice::Iter<'a, Cell>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.iter()
    }
}

/// Total cost of walking `cells` from `start`, `None` if any step is
/// illegal under `model`.
#[must_use]
pub fn path_cost(grid: &Grid, model: MovementModel, start: Cell, cells: &[Cell]) -> Option<Fixed> {
    let mut from = start;
    let mut total = Fixed::ZERO;
    for &to in cells {
        total += model.step_cost(grid, from, to)?;
        from = to;
    }
    Some(total)
}

/// A node in the A* open set priority queue.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
struct AStarNode {
    cell: Cell,
    /// Cost from start when this entry was pushed.
    g_score: Fixed,
    /// f_score = g_score + heuristic
    f_score: Fixed,
    /// Discovery order; lower values were pushed earlier.
    sequence: u64,
}

impl Ord for AStarNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap, so we reverse the comparison for min-heap behavior.
        match other.f_score.cmp(&self.f_score) {
            Ordering::Equal => other.sequence.cmp(&self.sequence),
            ord => ord,
        }
    }
}

impl PartialOrd for AStarNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Counters from a single search, for logging and benchmarks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchStats {
    /// Frontier entries pushed.
    pub pushed: u64,
    /// Nodes popped and expanded.
    pub expanded: u64,
}

/// Find a path with the model's default heuristic.
///
/// Returns an empty path when `start == goal`, when either endpoint is
/// blocked or outside the grid, or when no route exists.
#[must_use]
pub fn find_path(grid: &Grid, model: MovementModel, start: Cell, goal: Cell) -> Path {
    find_path_with(grid, model, model.default_heuristic(), start, goal)
}

/// Find a path using an explicit heuristic.
///
/// An inadmissible heuristic (see [`Heuristic::is_admissible_for`]) still
/// yields a legal path but not necessarily a cheapest one.
#[must_use]
pub fn find_path_with(
    grid: &Grid,
    model: MovementModel,
    heuristic: Heuristic,
    start: Cell,
    goal: Cell,
) -> Path {
    search(grid, model, heuristic, start, goal).0
}

/// Like [`find_path`], but reports a missing route as an error.
///
/// `start == goal` is not an error and yields `Ok` with an empty path.
pub fn find_route(grid: &Grid, model: MovementModel, start: Cell, goal: Cell) -> Result<Path> {
    let path = find_path(grid, model, start, goal);
    if path.is_empty() && start != goal {
        return Err(CourierError::NoRouteFound {
            from: start,
            to: goal,
        });
    }
    Ok(path)
}

/// Run A* and return the path together with search counters.
#[must_use]
pub fn search(
    grid: &Grid,
    model: MovementModel,
    heuristic: Heuristic,
    start: Cell,
    goal: Cell,
) -> (Path, SearchStats) {
    let mut stats = SearchStats::default();

    if start == goal {
        return (Path::empty(), stats);
    }
    if !grid.is_cell_walkable(start) || !grid.is_cell_walkable(goal) {
        tracing::debug!(%start, %goal, "Path endpoint blocked or outside grid");
        return (Path::empty(), stats);
    }

    let mut open_set: BinaryHeap<AStarNode> = BinaryHeap::new();
    let mut came_from: HashMap<Cell, Cell> = HashMap::new();
    let mut g_score: HashMap<Cell, Fixed> = HashMap::new();
    let mut sequence = 0u64;

    g_score.insert(start, Fixed::ZERO);
    open_set.push(AStarNode {
        cell: start,
        g_score: Fixed::ZERO,
        f_score: heuristic.estimate(start, goal),
        sequence,
    });
    stats.pushed += 1;

    while let Some(current) = open_set.pop() {
        // Skip stale entries superseded by a cheaper push.
        if g_score
            .get(&current.cell)
            .is_some_and(|&best| current.g_score > best)
        {
            continue;
        }

        if current.cell == goal {
            let path = reconstruct_path(&came_from, goal, current.g_score);
            tracing::debug!(
                model = %model,
                %start,
                %goal,
                steps = path.len(),
                cost = %path.cost(),
                expanded = stats.expanded,
                "Path found"
            );
            #[cfg(feature = "debug-validation")]
            debug_assert_eq!(
                path_cost(grid, model, start, path.cells()),
                Some(path.cost()),
                "A* produced an illegal path"
            );
            return (path, stats);
        }
        stats.expanded += 1;

        for (neighbor, step_cost) in model.neighbors(grid, current.cell) {
            let tentative_g = current.g_score + step_cost;

            let better = match g_score.entry(neighbor) {
                Entry::Occupied(mut known) => {
                    if tentative_g < *known.get() {
                        known.insert(tentative_g);
                        true
                    } else {
                        false
                    }
                }
                Entry::Vacant(slot) => {
                    slot.insert(tentative_g);
                    true
                }
            };

            if better {
                came_from.insert(neighbor, current.cell);
                sequence += 1;
                open_set.push(AStarNode {
                    cell: neighbor,
                    g_score: tentative_g,
                    f_score: tentative_g + heuristic.estimate(neighbor, goal),
                    sequence,
                });
                stats.pushed += 1;
            }
        }
    }

    tracing::debug!(
        model = %model,
        %start,
        %goal,
        expanded = stats.expanded,
        "No path"
    );
    (Path::empty(), stats)
}

/// Walk the predecessor chain back from the goal. The start cell has no
/// predecessor and is left out.
fn reconstruct_path(came_from: &HashMap<Cell, Cell>, goal: Cell, cost: Fixed) -> Path {
    let mut cells = vec![goal];
    let mut current = goal;

    while let Some(&prev) = came_from.get(&current) {
        cells.push(prev);
        current = prev;
    }
    // Drop the start cell.
    cells.pop();
    cells.reverse();

    Path { cells, cost }
}
