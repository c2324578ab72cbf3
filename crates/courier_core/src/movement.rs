//! Movement models: neighbor offsets, step costs and heuristics.
//!
//! One engine serves every connectivity class. A [`MovementModel`] picks
//! the set of legal steps and their costs, and a [`Heuristic`] estimates
//! the remaining cost to a target.
//!
//! | Model        | Steps                     | Costs        | Default heuristic |
//! |--------------|---------------------------|--------------|-------------------|
//! | `Cardinal4`  | 4 orthogonal              | 1            | Manhattan         |
//! | `Octile8`    | + 4 diagonal              | 1, √2        | Octile            |
//! | `Extended16` | + 8 knight jumps          | 1, √2, √5    | Euclidean         |
//!
//! Diagonal steps are corner-gated: both orthogonal cells flanking the
//! step must be walkable. Knight jumps skip their intermediate cells and
//! are only checked at the landing cell.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CourierError;
use crate::grid::{Cell, Grid};
use crate::math::{fixed_sqrt, Fixed, SQRT_2, SQRT_5};

/// Shape of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    /// One cell along an axis.
    Cardinal,
    /// One cell along both axes.
    Diagonal,
    /// Chess knight jump (1, 2) or (2, 1).
    Knight,
}

impl StepKind {
    /// Movement cost of a step of this kind.
    #[must_use]
    pub const fn cost(self) -> Fixed {
        match self {
            Self::Cardinal => Fixed::ONE,
            Self::Diagonal => SQRT_2,
            Self::Knight => SQRT_5,
        }
    }

    /// Classify an offset, `None` if it is not a single step of any model.
    #[must_use]
    pub fn classify(dx: i32, dy: i32) -> Option<Self> {
        match (dx.abs(), dy.abs()) {
            (1, 0) | (0, 1) => Some(Self::Cardinal),
            (1, 1) => Some(Self::Diagonal),
            (1, 2) | (2, 1) => Some(Self::Knight),
            _ => None,
        }
    }
}

/// A neighbor offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Step {
    /// Column offset.
    pub dx: i32,
    /// Row offset.
    pub dy: i32,
    /// Step shape, which fixes the cost.
    pub kind: StepKind,
}

impl Step {
    const fn new(dx: i32, dy: i32, kind: StepKind) -> Self {
        Self { dx, dy, kind }
    }

    /// Movement cost of this step.
    #[must_use]
    pub const fn cost(self) -> Fixed {
        self.kind.cost()
    }
}

// Expansion order is part of the deterministic tie-break: cardinals
// first (N, E, S, W), then diagonals, then knight jumps.
const STEPS: [Step; 16] = [
    Step::new(0, -1, StepKind::Cardinal),
    Step::new(1, 0, StepKind::Cardinal),
    Step::new(0, 1, StepKind::Cardinal),
    Step::new(-1, 0, StepKind::Cardinal),
    Step::new(-1, -1, StepKind::Diagonal),
    Step::new(-1, 1, StepKind::Diagonal),
    Step::new(1, -1, StepKind::Diagonal),
    Step::new(1, 1, StepKind::Diagonal),
    Step::new(-2, -1, StepKind::Knight),
    Step::new(-2, 1, StepKind::Knight),
    Step::new(-1, -2, StepKind::Knight),
    Step::new(-1, 2, StepKind::Knight),
    Step::new(1, -2, StepKind::Knight),
    Step::new(1, 2, StepKind::Knight),
    Step::new(2, -1, StepKind::Knight),
    Step::new(2, 1, StepKind::Knight),
];

/// Remaining-cost estimate used by the pathfinder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Heuristic {
    /// `|dx| + |dy|`. Exact for 4-connectivity; overestimates diagonal
    /// travel, so with 8 or 16 directions paths may be suboptimal.
    Manhattan,
    /// `max + (√2 - 1) * min`. Exact on an open 8-connected grid.
    Octile,
    /// Straight-line distance. Admissible for every model.
    Euclidean,
    /// No estimate; the search degrades to Dijkstra.
    Zero,
}

impl Heuristic {
    /// Estimated cost from `a` to `b`.
    #[must_use]
    pub fn estimate(self, a: Cell, b: Cell) -> Fixed {
        let dx = a.x.abs_diff(b.x);
        let dy = a.y.abs_diff(b.y);
        match self {
            Self::Manhattan => Fixed::from_num(dx + dy),
            Self::Octile => {
                let (min, max) = if dx < dy { (dx, dy) } else { (dy, dx) };
                Fixed::from_num(max) + Fixed::from_num(min) * (SQRT_2 - Fixed::ONE)
            }
            Self::Euclidean => {
                let dx = Fixed::from_num(dx);
                let dy = Fixed::from_num(dy);
                fixed_sqrt(dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy)))
            }
            Self::Zero => Fixed::ZERO,
        }
    }

    /// Whether this heuristic never overestimates under `model`.
    #[must_use]
    pub const fn is_admissible_for(self, model: MovementModel) -> bool {
        match (self, model) {
            (Self::Zero | Self::Euclidean, _) => true,
            (Self::Manhattan, MovementModel::Cardinal4) => true,
            (Self::Octile, MovementModel::Cardinal4 | MovementModel::Octile8) => true,
            _ => false,
        }
    }
}

/// Connectivity class of the grid graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MovementModel {
    /// Four orthogonal neighbors.
    Cardinal4,
    /// Orthogonal and diagonal neighbors.
    #[default]
    Octile8,
    /// Orthogonal, diagonal and knight-jump neighbors.
    Extended16,
}

impl MovementModel {
    /// All supported models.
    pub const ALL: [Self; 3] = [Self::Cardinal4, Self::Octile8, Self::Extended16];

    /// The offsets this model may step along, in expansion order.
    #[must_use]
    pub fn steps(self) -> &'static [Step] {
        match self {
            Self::Cardinal4 => &STEPS[..4],
            Self::Octile8 => &STEPS[..8],
            Self::Extended16 => &STEPS,
        }
    }

    /// Admissible heuristic paired with this model.
    #[must_use]
    pub const fn default_heuristic(self) -> Heuristic {
        match self {
            Self::Cardinal4 => Heuristic::Manhattan,
            Self::Octile8 => Heuristic::Octile,
            Self::Extended16 => Heuristic::Euclidean,
        }
    }

    /// Estimated cost from `a` to `b` with the default heuristic.
    #[must_use]
    pub fn heuristic(self, a: Cell, b: Cell) -> Fixed {
        self.default_heuristic().estimate(a, b)
    }

    /// Check whether `step` from `from` is legal on `grid`.
    ///
    /// The landing cell must be walkable; diagonal steps additionally need
    /// both flanking orthogonal cells walkable (no corner cutting).
    #[must_use]
    pub fn allows(grid: &Grid, from: Cell, step: Step) -> bool {
        let to = from.offset(step.dx, step.dy);
        if !grid.is_cell_walkable(to) {
            return false;
        }
        match step.kind {
            StepKind::Diagonal => {
                grid.is_walkable(from.x + step.dx, from.y) && grid.is_walkable(from.x, from.y + step.dy)
            }
            StepKind::Cardinal | StepKind::Knight => true,
        }
    }

    /// Legal neighbors of `cell` with their step costs.
    pub fn neighbors<'a>(
        self,
        grid: &'a Grid,
        cell: Cell,
    ) -> impl Iterator<Item = (Cell, Fixed)> + 'a {
        self.steps()
            .iter()
            .filter(move |step| Self::allows(grid, cell, **step))
            .map(move |step| (cell.offset(step.dx, step.dy), step.cost()))
    }

    /// Cost of moving directly from `from` to `to`, `None` if that is not a
    /// legal single step under this model.
    #[must_use]
    pub fn step_cost(self, grid: &Grid, from: Cell, to: Cell) -> Option<Fixed> {
        let (dx, dy) = (to.x - from.x, to.y - from.y);
        let step = self
            .steps()
            .iter()
            .find(|step| step.dx == dx && step.dy == dy)?;
        Self::allows(grid, from, *step).then(|| step.cost())
    }

    /// Stable lowercase name, as accepted by [`FromStr`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Cardinal4 => "cardinal4",
            Self::Octile8 => "octile8",
            Self::Extended16 => "extended16",
        }
    }
}

impl fmt::Display for MovementModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MovementModel {
    type Err = CourierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cardinal4" | "4" => Ok(Self::Cardinal4),
            "octile8" | "8" => Ok(Self::Octile8),
            "extended16" | "16" => Ok(Self::Extended16),
            other => Err(CourierError::InvalidConfiguration(format!(
                "unknown movement model '{other}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(model: MovementModel, grid: &Grid, at: Cell) -> Vec<Cell> {
        model.neighbors(grid, at).map(|(c, _)| c).collect()
    }

    #[test]
    fn test_step_counts() {
        assert_eq!(MovementModel::Cardinal4.steps().len(), 4);
        assert_eq!(MovementModel::Octile8.steps().len(), 8);
        assert_eq!(MovementModel::Extended16.steps().len(), 16);
    }

    #[test]
    fn test_step_costs() {
        let grid = Grid::open(5, 5).unwrap();
        let center = Cell::new(2, 2);
        let model = MovementModel::Extended16;
        assert_eq!(model.step_cost(&grid, center, Cell::new(2, 1)), Some(Fixed::ONE));
        assert_eq!(model.step_cost(&grid, center, Cell::new(3, 3)), Some(SQRT_2));
        assert_eq!(model.step_cost(&grid, center, Cell::new(4, 3)), Some(SQRT_5));
        assert_eq!(model.step_cost(&grid, center, Cell::new(4, 4)), None);
        assert_eq!(
            MovementModel::Cardinal4.step_cost(&grid, center, Cell::new(3, 3)),
            None
        );
    }

    #[test]
    fn test_neighbors_open_center() {
        let grid = Grid::open(5, 5).unwrap();
        let center = Cell::new(2, 2);
        assert_eq!(cells(MovementModel::Cardinal4, &grid, center).len(), 4);
        assert_eq!(cells(MovementModel::Octile8, &grid, center).len(), 8);
        assert_eq!(cells(MovementModel::Extended16, &grid, center).len(), 16);
    }

    #[test]
    fn test_neighbors_filtered_at_border() {
        let grid = Grid::open(3, 3).unwrap();
        let corner = Cell::new(0, 0);
        let mut found = cells(MovementModel::Extended16, &grid, corner);
        found.sort();
        assert_eq!(
            found,
            vec![
                Cell::new(0, 1),
                Cell::new(1, 0),
                Cell::new(1, 1),
                Cell::new(1, 2),
                Cell::new(2, 1),
            ]
        );
    }

    #[test]
    fn test_diagonal_corner_gating() {
        // One flanking cell blocked forbids the diagonal.
        let grid = Grid::parse(
            "
            ..
            #.
            ",
        )
        .unwrap();
        let model = MovementModel::Octile8;
        assert_eq!(model.step_cost(&grid, Cell::new(0, 0), Cell::new(1, 1)), None);
        assert_eq!(cells(model, &grid, Cell::new(0, 0)), vec![Cell::new(1, 0)]);
        assert_eq!(
            model.step_cost(&grid, Cell::new(1, 0), Cell::new(1, 1)),
            Some(Fixed::ONE)
        );
    }

    #[test]
    fn test_knight_not_corner_gated() {
        let grid = Grid::parse(
            "
            .##
            ##.
            ",
        )
        .unwrap();
        let model = MovementModel::Extended16;
        assert_eq!(
            model.step_cost(&grid, Cell::new(0, 0), Cell::new(2, 1)),
            Some(SQRT_5)
        );
    }

    #[test]
    fn test_heuristics() {
        let a = Cell::new(0, 0);
        let b = Cell::new(3, 4);
        assert_eq!(Heuristic::Manhattan.estimate(a, b), Fixed::from_num(7));
        assert_eq!(Heuristic::Euclidean.estimate(a, b), Fixed::from_num(5));
        assert_eq!(
            Heuristic::Octile.estimate(a, b),
            Fixed::from_num(1) + SQRT_2 * Fixed::from_num(3)
        );
        assert_eq!(Heuristic::Zero.estimate(a, b), Fixed::ZERO);
        assert_eq!(Heuristic::Euclidean.estimate(b, b), Fixed::ZERO);
    }

    #[test]
    fn test_default_heuristics_are_admissible() {
        for model in MovementModel::ALL {
            assert!(model.default_heuristic().is_admissible_for(model));
        }
        assert!(!Heuristic::Manhattan.is_admissible_for(MovementModel::Octile8));
        assert!(!Heuristic::Octile.is_admissible_for(MovementModel::Extended16));
    }

    #[test]
    fn test_knight_heuristic_never_exceeds_step_cost() {
        let origin = Cell::new(0, 0);
        for step in MovementModel::Extended16.steps() {
            let h = Heuristic::Euclidean.estimate(origin, origin.offset(step.dx, step.dy));
            assert!(h <= step.cost(), "{step:?}: h={h}");
        }
    }

    #[test]
    fn test_model_parsing() {
        assert_eq!("octile8".parse::<MovementModel>().unwrap(), MovementModel::Octile8);
        assert_eq!("16".parse::<MovementModel>().unwrap(), MovementModel::Extended16);
        assert_eq!(
            "Cardinal4".parse::<MovementModel>().unwrap(),
            MovementModel::Cardinal4
        );
        assert!("hex6".parse::<MovementModel>().is_err());
        assert_eq!(MovementModel::Extended16.to_string(), "extended16");
    }
}
