//! Two-leg pickup-and-delivery task.
//!
//! The orchestrator plans the courier's route to the pickup cell, waits
//! for the courier to arrive there, collects the payload, plans the route
//! on to the goal and finally marks the delivery complete.
//!
//! ```text
//! Idle --start--> SeekingPickup --arrive at pickup--> Delivering --arrive at goal--> Completed
//!   ^                                    |
//!   |  no route to pickup                +-- no route to goal --> Aborted
//! ```
//!
//! Failures are reported once and never retried; re-planning is up to the
//! caller (call [`DeliveryOrchestrator::start`] again).

use serde::{Deserialize, Serialize};

use crate::courier::{Courier, Leg, TickOutcome};
use crate::error::{CourierError, Result};
use crate::grid::{Cell, Grid};
use crate::movement::{Heuristic, MovementModel};
use crate::pathfinding::{find_path_with, Path};

/// Progress of the delivery task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DeliveryPhase {
    /// No task running.
    #[default]
    Idle,
    /// Courier is heading to the pickup cell.
    SeekingPickup,
    /// Payload collected, courier is heading to the goal.
    Delivering,
    /// Payload delivered.
    Completed,
    /// Payload collected but the goal could not be reached.
    Aborted,
}

impl DeliveryPhase {
    /// True once the task can make no further progress.
    #[must_use]
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Completed | Self::Aborted)
    }
}

/// Pickup and goal cells of a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeliveryTask {
    /// Where the payload is collected.
    pub pickup: Cell,
    /// Where the payload is delivered.
    pub goal: Cell,
}

/// Significant task transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeliveryEvent {
    /// The courier collected the payload and is heading to the goal.
    PickedUp {
        /// Pickup cell.
        pickup: Cell,
        /// Steps planned for the second leg.
        steps: usize,
    },
    /// The courier reached the goal with the payload.
    Delivered {
        /// Goal cell.
        goal: Cell,
    },
}

/// Sequences the two pathfinder legs of a delivery and drives the courier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeliveryOrchestrator {
    model: MovementModel,
    heuristic: Heuristic,
    task: Option<DeliveryTask>,
    phase: DeliveryPhase,
}

impl DeliveryOrchestrator {
    /// Create an idle orchestrator planning with `model`'s default heuristic.
    #[must_use]
    pub const fn new(model: MovementModel) -> Self {
        Self::with_heuristic(model, model.default_heuristic())
    }

    /// Create an idle orchestrator with an explicit heuristic.
    #[must_use]
    pub const fn with_heuristic(model: MovementModel, heuristic: Heuristic) -> Self {
        Self {
            model,
            heuristic,
            task: None,
            phase: DeliveryPhase::Idle,
        }
    }

    /// Movement model used for planning.
    #[must_use]
    pub const fn model(&self) -> MovementModel {
        self.model
    }

    /// Heuristic used for planning.
    #[must_use]
    pub const fn heuristic(&self) -> Heuristic {
        self.heuristic
    }

    /// Current task, if one was started.
    #[must_use]
    pub const fn task(&self) -> Option<DeliveryTask> {
        self.task
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> DeliveryPhase {
        self.phase
    }

    fn plan(&self, grid: &Grid, from: Cell, to: Cell) -> Path {
        find_path_with(grid, self.model, self.heuristic, from, to)
    }

    /// Start (or re-arm) a delivery from the courier's current cell.
    ///
    /// Always clears the courier's payload first. If the courier already
    /// stands on the pickup cell the payload is collected immediately and
    /// the goal leg is planned.
    ///
    /// # Errors
    ///
    /// - `InvalidConfiguration` if pickup or goal lies outside the grid, or
    ///   they are the same cell.
    /// - `NoRouteToPickup` if the first leg cannot be planned; the phase is
    ///   left `Idle`.
    /// - `NoRouteToGoal` if the courier starts on the pickup and the second
    ///   leg cannot be planned; the phase becomes `Aborted`.
    pub fn start(
        &mut self,
        grid: &Grid,
        courier: &mut Courier,
        pickup: Cell,
        goal: Cell,
    ) -> Result<()> {
        grid.require_contains(pickup, "pickup")?;
        grid.require_contains(goal, "goal")?;
        if pickup == goal {
            return Err(CourierError::InvalidConfiguration(format!(
                "pickup and goal must differ, both are {pickup}"
            )));
        }

        courier.set_carrying(false);
        self.task = Some(DeliveryTask { pickup, goal });
        self.phase = DeliveryPhase::Idle;

        let from = courier.cell();
        if from == pickup {
            self.phase = DeliveryPhase::SeekingPickup;
            return self.collect(grid, courier).map(|_| ());
        }

        let path = self.plan(grid, from, pickup);
        if path.is_empty() {
            tracing::warn!(%from, %pickup, "No route to pickup");
            return Err(CourierError::NoRouteToPickup { from, pickup });
        }

        tracing::debug!(%from, %pickup, %goal, steps = path.len(), "Delivery started");
        courier.assign_path(path, Leg::Pickup);
        self.phase = DeliveryPhase::SeekingPickup;
        Ok(())
    }

    /// React to a courier tick.
    ///
    /// Only `Arrived` outcomes matter: arriving on the pickup collects the
    /// payload and plans the goal leg, arriving on the goal while carrying
    /// completes the task.
    ///
    /// # Errors
    ///
    /// `NoRouteToGoal` when the goal leg cannot be planned; the courier is
    /// left `Arrived` on the pickup with the payload and the phase becomes
    /// `Aborted`.
    pub fn update(
        &mut self,
        grid: &Grid,
        courier: &mut Courier,
        outcome: TickOutcome,
    ) -> Result<Option<DeliveryEvent>> {
        let TickOutcome::Arrived(_) = outcome else {
            return Ok(None);
        };
        let Some(task) = self.task else {
            return Ok(None);
        };

        let here = courier.cell();
        match self.phase {
            DeliveryPhase::SeekingPickup if here == task.pickup => {
                self.collect(grid, courier).map(Some)
            }
            DeliveryPhase::Delivering if here == task.goal && courier.is_carrying() => {
                self.phase = DeliveryPhase::Completed;
                tracing::debug!(goal = %task.goal, "Delivery completed");
                Ok(Some(DeliveryEvent::Delivered { goal: task.goal }))
            }
            _ => Ok(None),
        }
    }

    /// Drop the current task without touching the courier.
    pub fn cancel(&mut self) {
        self.task = None;
        self.phase = DeliveryPhase::Idle;
    }

    fn collect(&mut self, grid: &Grid, courier: &mut Courier) -> Result<DeliveryEvent> {
        let Some(DeliveryTask { pickup, goal }) = self.task else {
            return Err(CourierError::InvalidConfiguration(
                "no delivery task to collect for".into(),
            ));
        };
        courier.set_carrying(true);

        let path = self.plan(grid, pickup, goal);
        if path.is_empty() {
            self.phase = DeliveryPhase::Aborted;
            tracing::warn!(%pickup, %goal, "No route from pickup to goal");
            return Err(CourierError::NoRouteToGoal { pickup, goal });
        }

        let steps = path.len();
        tracing::debug!(%pickup, %goal, steps, "Payload collected");
        courier.assign_path(path, Leg::Goal);
        self.phase = DeliveryPhase::Delivering;
        Ok(DeliveryEvent::PickedUp { pickup, steps })
    }
}
