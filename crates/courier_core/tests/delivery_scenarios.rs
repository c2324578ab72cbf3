//! End-to-end delivery scenarios on hand-drawn maps.

use courier_core::config::EngineConfig;
use courier_core::courier::{Courier, CourierState};
use courier_core::delivery::{DeliveryEvent, DeliveryOrchestrator, DeliveryPhase};
use courier_core::error::CourierError;
use courier_core::movement::MovementModel;
use courier_core::pathfinding::{find_path, find_route};
use courier_core::simulation::Simulation;
use courier_test_utils::determinism::verify_simulation_determinism;
use courier_test_utils::fixtures::{cell, corner_gap, grid, serpentine, split_grid, walled_gap};
use courier_test_utils::reference::shortest_cost;

fn config(model: MovementModel) -> EngineConfig {
    EngineConfig {
        movement: model,
        ..EngineConfig::default()
    }
}

// =============================================================================
// Path scenarios
// =============================================================================

#[test]
fn test_serpentine_route_visits_every_row() {
    let grid = serpentine();
    let path = find_path(&grid, MovementModel::Cardinal4, cell(0, 0), cell(6, 4));
    assert!(!path.is_empty());
    for y in 0..5 {
        assert!(path.iter().any(|c| c.y == y), "row {y} skipped");
    }
    assert_eq!(
        Some(path.cost()),
        shortest_cost(&grid, MovementModel::Cardinal4, cell(0, 0), cell(6, 4))
    );
}

#[test]
fn test_corner_gap_is_closed_to_diagonals() {
    let grid = corner_gap();
    assert!(find_path(&grid, MovementModel::Octile8, cell(0, 0), cell(1, 1)).is_empty());
    assert!(find_path(&grid, MovementModel::Cardinal4, cell(0, 0), cell(1, 1)).is_empty());
}

#[test]
fn test_knight_jumps_split_grid() {
    let grid = split_grid();
    assert!(matches!(
        find_route(&grid, MovementModel::Octile8, cell(2, 1), cell(4, 1)),
        Err(CourierError::NoRouteFound { .. })
    ));
    let path = find_route(&grid, MovementModel::Extended16, cell(2, 1), cell(4, 0)).unwrap();
    assert_eq!(path.cells(), &[cell(4, 0)]);
}

#[test]
fn test_wall_gap_detour() {
    let grid = walled_gap();
    let path = find_path(&grid, MovementModel::Octile8, cell(0, 0), cell(8, 0));
    assert!(path.cells().contains(&cell(4, 4)));
}

// =============================================================================
// Delivery scenarios
// =============================================================================

#[test]
fn test_delivery_through_gap() {
    let grid = walled_gap();
    let mut courier = Courier::with_default_speed(cell(0, 0));
    let mut orchestrator = DeliveryOrchestrator::new(MovementModel::Octile8);
    orchestrator
        .start(&grid, &mut courier, cell(2, 4), cell(8, 0))
        .unwrap();

    let mut events = Vec::new();
    for _ in 0..5_000 {
        let outcome = courier.tick();
        if let Some(event) = orchestrator.update(&grid, &mut courier, outcome).unwrap() {
            events.push(event);
        }
        if orchestrator.phase().is_finished() {
            break;
        }
    }

    assert_eq!(orchestrator.phase(), DeliveryPhase::Completed);
    assert_eq!(events.len(), 2);
    assert_eq!(events[1], DeliveryEvent::Delivered { goal: cell(8, 0) });
    assert_eq!(courier.cell(), cell(8, 0));
    assert_eq!(courier.state(), CourierState::Arrived);
    assert!(courier.is_carrying());
}

#[test]
fn test_pickup_behind_wall() {
    let mut sim = Simulation::new(split_grid(), cell(0, 0), &config(MovementModel::Octile8)).unwrap();
    sim.set_destinations(cell(5, 1), cell(1, 1)).unwrap();
    assert_eq!(
        sim.play(),
        Err(CourierError::NoRouteToPickup {
            from: cell(0, 0),
            pickup: cell(5, 1)
        })
    );
    assert!(!sim.is_playing());
    assert_eq!(sim.courier().state(), CourierState::Idle);
}

#[test]
fn test_pickup_on_blocked_cell() {
    let map = grid(
        "
        ...
        .#.
        ...
        ",
    );
    let mut sim = Simulation::new(map, cell(0, 0), &config(MovementModel::Octile8)).unwrap();
    sim.set_destinations(cell(1, 1), cell(2, 2)).unwrap();
    assert!(matches!(sim.play(), Err(CourierError::NoRouteToPickup { .. })));
}

#[test]
fn test_replay_after_reset() {
    let mut sim = Simulation::new(walled_gap(), cell(0, 0), &config(MovementModel::Cardinal4)).unwrap();
    sim.set_destinations(cell(3, 3), cell(6, 0)).unwrap();
    sim.play().unwrap();
    assert_eq!(sim.run(10_000).unwrap(), DeliveryPhase::Completed);
    let first_ticks = sim.tick_count();

    sim.reset_position();
    sim.play().unwrap();
    assert_eq!(sim.run(10_000).unwrap(), DeliveryPhase::Completed);
    assert_eq!(sim.tick_count(), first_ticks * 2);
    assert_eq!(sim.courier().cell(), cell(6, 0));
}

#[test]
fn test_every_model_delivers_on_open_map() {
    for model in MovementModel::ALL {
        let mut sim =
            Simulation::new(grid("........\n........\n........\n........"), cell(0, 3), &config(model))
                .unwrap();
        sim.set_destinations(cell(7, 0), cell(0, 0)).unwrap();
        sim.play().unwrap();
        assert_eq!(sim.run(10_000).unwrap(), DeliveryPhase::Completed, "{model}");
    }
}

#[test]
fn test_generated_simulation_is_deterministic() {
    for model in MovementModel::ALL {
        let config = config(model);
        assert!(verify_simulation_determinism(
            || {
                let mut sim = Simulation::from_config(&config).unwrap();
                let _ = sim.play();
                sim
            },
            500,
        ));
    }
}
