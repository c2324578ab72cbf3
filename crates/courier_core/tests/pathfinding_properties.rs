//! Property tests for search, line of sight and courier motion.
//!
//! Grids, endpoints and models are random; every found path is checked
//! against the movement rules and a reference Dijkstra.

use courier_core::courier::{Courier, CourierState, Leg, TickOutcome};
use courier_core::line_of_sight::{line_cells, visible};
use courier_core::math::Fixed;
use courier_core::movement::{Heuristic, MovementModel};
use courier_core::pathfinding::{find_path, find_path_with, path_cost};
use courier_test_utils::determinism::strategies::{
    arb_grid_with_endpoints, arb_heuristic, arb_model,
};
use courier_test_utils::reference::shortest_cost;
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    // =========================================================================
    // Legality
    // =========================================================================

    /// Every returned path is a chain of legal steps ending on the goal.
    #[test]
    fn prop_paths_are_legal(
        (grid, start, goal) in arb_grid_with_endpoints(12),
        model in arb_model(),
        heuristic in arb_heuristic(),
    ) {
        let path = find_path_with(&grid, model, heuristic, start, goal);
        if path.is_empty() {
            return Ok(());
        }

        prop_assert_eq!(path.goal(), Some(goal));
        prop_assert!(!path.cells().contains(&start));
        for cell in &path {
            prop_assert!(grid.is_cell_walkable(*cell));
        }
        prop_assert_eq!(path_cost(&grid, model, start, path.cells()), Some(path.cost()));
    }

    // =========================================================================
    // Optimality
    // =========================================================================

    /// With the default heuristic the path cost matches the cheapest route.
    #[test]
    fn prop_default_heuristic_is_optimal(
        (grid, start, goal) in arb_grid_with_endpoints(12),
        model in arb_model(),
    ) {
        let path = find_path(&grid, model, start, goal);
        let best = shortest_cost(&grid, model, start, goal);

        if start == goal {
            prop_assert!(path.is_empty());
        } else {
            match best {
                Some(cost) => prop_assert_eq!(path.cost(), cost),
                None => prop_assert!(path.is_empty()),
            }
        }
    }

    /// Without an estimate the search is plain Dijkstra.
    #[test]
    fn prop_zero_heuristic_is_optimal(
        (grid, start, goal) in arb_grid_with_endpoints(10),
        model in arb_model(),
    ) {
        prop_assume!(start != goal);
        let path = find_path_with(&grid, model, Heuristic::Zero, start, goal);
        let best = shortest_cost(&grid, model, start, goal);
        prop_assert_eq!(best.is_some(), !path.is_empty());
        if let Some(cost) = best {
            prop_assert_eq!(path.cost(), cost);
        }
    }

    /// An inadmissible estimate still finds a route whenever one exists,
    /// never cheaper than the optimum.
    #[test]
    fn prop_manhattan_on_octile_is_complete(
        (grid, start, goal) in arb_grid_with_endpoints(12),
    ) {
        prop_assume!(start != goal);
        let model = MovementModel::Octile8;
        let path = find_path_with(&grid, model, Heuristic::Manhattan, start, goal);
        match shortest_cost(&grid, model, start, goal) {
            Some(best) => {
                prop_assert!(!path.is_empty());
                prop_assert!(path.cost() >= best);
            }
            None => prop_assert!(path.is_empty()),
        }
    }

    /// Identical inputs yield identical paths.
    #[test]
    fn prop_search_is_deterministic(
        (grid, start, goal) in arb_grid_with_endpoints(12),
        model in arb_model(),
    ) {
        prop_assert_eq!(
            find_path(&grid, model, start, goal),
            find_path(&grid, model, start, goal)
        );
    }

    // =========================================================================
    // Line of sight
    // =========================================================================

    /// Visibility does not depend on which end looks.
    #[test]
    fn prop_line_of_sight_is_symmetric(
        (grid, a, b) in arb_grid_with_endpoints(16),
    ) {
        prop_assert_eq!(visible(&grid, a, b), visible(&grid, b, a));

        let forward = line_cells(a, b);
        let mut backward = line_cells(b, a);
        backward.reverse();
        prop_assert_eq!(forward.first().copied(), Some(a));
        prop_assert_eq!(forward.last().copied(), Some(b));
        prop_assert_eq!(forward, backward);
    }

    // =========================================================================
    // Motion
    // =========================================================================

    /// A courier following a found path ends exactly on the goal and stays
    /// there.
    #[test]
    fn prop_courier_arrives_and_stays(
        (grid, start, goal) in arb_grid_with_endpoints(10),
        model in arb_model(),
        speed_level in 1i32..=10,
    ) {
        let path = find_path(&grid, model, start, goal);
        prop_assume!(!path.is_empty());

        let speed = Fixed::from_num(speed_level) / Fixed::from_num(20);
        let mut courier = Courier::new(start, speed).unwrap();
        prop_assert!(courier.assign_path(path, Leg::Goal));

        let mut arrived = false;
        for _ in 0..20_000 {
            if let TickOutcome::Arrived(cell) = courier.tick() {
                prop_assert_eq!(cell, goal);
                arrived = true;
                break;
            }
        }
        prop_assert!(arrived);
        prop_assert_eq!(courier.position(), goal.to_position());

        let angle = courier.angle();
        for _ in 0..5 {
            prop_assert_eq!(courier.tick(), TickOutcome::Stationary);
        }
        prop_assert_eq!(courier.state(), CourierState::Arrived);
        prop_assert_eq!(courier.position(), goal.to_position());
        prop_assert_eq!(courier.angle(), angle);
    }
}
