//! Courier agent: continuous motion along a discrete path.
//!
//! The courier keeps a fixed-point position and steps toward the next
//! waypoint of its [`Path`] each tick. When the remaining distance is
//! shorter than one step it snaps exactly onto the waypoint, so it never
//! overshoots and always lands on cell centers.
//!
//! Position updates ([`Courier::tick`]) and the discrete projection
//! ([`Courier::cell`]) are separate; the projection is read-only output
//! and never feeds back into motion or planning.

use serde::{Deserialize, Serialize};

use crate::error::{CourierError, Result};
use crate::grid::Cell;
use crate::math::{Fixed, Vec2Fixed};
use crate::pathfinding::Path;

/// Default speed in cells per tick (0.15).
pub const DEFAULT_SPEED: Fixed = Fixed::from_bits(644_245_094);

/// Motion state of a courier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CourierState {
    /// No path assigned since the last reset.
    #[default]
    Idle,
    /// Following a path toward a pickup cell.
    MovingToPickup,
    /// Following a path toward a goal cell.
    MovingToGoal,
    /// Consumed every waypoint of the last path.
    Arrived,
}

impl CourierState {
    /// True while following a path.
    #[must_use]
    pub const fn is_moving(self) -> bool {
        matches!(self, Self::MovingToPickup | Self::MovingToGoal)
    }
}

/// Which kind of target an assigned path leads to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Leg {
    /// Path ends at a pickup cell.
    Pickup,
    /// Path ends at a goal (or any plain destination).
    Goal,
}

/// What a single motion step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TickOutcome {
    /// Not moving; nothing changed.
    Stationary,
    /// Moved toward the current waypoint without reaching it.
    Moved,
    /// Snapped onto an intermediate waypoint.
    ReachedWaypoint(Cell),
    /// Snapped onto the final waypoint.
    Arrived(Cell),
}

/// A courier following grid paths with sub-cell motion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "CourierRecord")]
pub struct Courier {
    /// Reset position.
    origin: Cell,
    /// Continuous position in grid space.
    position: Vec2Fixed,
    /// Unit direction of the last movement.
    heading: Vec2Fixed,
    /// Current path.
    path: Path,
    /// Index of the next waypoint in `path`.
    next_waypoint: usize,
    /// Cells per tick.
    #[serde(with = "crate::math::fixed_serde")]
    speed: Fixed,
    state: CourierState,
    /// Whether the pickup payload has been collected.
    carrying: bool,
}

/// Serialized form of a [`Courier`], checked before use.
#[derive(Deserialize)]
struct CourierRecord {
    origin: Cell,
    position: Vec2Fixed,
    heading: Vec2Fixed,
    path: Path,
    next_waypoint: usize,
    #[serde(with = "crate::math::fixed_serde")]
    speed: Fixed,
    state: CourierState,
    carrying: bool,
}

impl TryFrom<CourierRecord> for Courier {
    type Error = CourierError;

    fn try_from(record: CourierRecord) -> Result<Self> {
        validate_speed(record.speed)?;
        if record.next_waypoint > record.path.len() {
            return Err(CourierError::InvalidConfiguration(format!(
                "waypoint index {} is past the end of a {}-cell path",
                record.next_waypoint,
                record.path.len()
            )));
        }
        Ok(Self {
            origin: record.origin,
            position: record.position,
            heading: record.heading,
            path: record.path,
            next_waypoint: record.next_waypoint,
            speed: record.speed,
            state: record.state,
            carrying: record.carrying,
        })
    }
}

impl Courier {
    /// Create an idle courier at `origin`.
    pub fn new(origin: Cell, speed: Fixed) -> Result<Self> {
        validate_speed(speed)?;
        Ok(Self {
            origin,
            position: origin.to_position(),
            heading: Vec2Fixed::UNIT_X,
            path: Path::empty(),
            next_waypoint: 0,
            speed,
            state: CourierState::Idle,
            carrying: false,
        })
    }

    /// Create an idle courier at `origin` with [`DEFAULT_SPEED`].
    #[must_use]
    pub fn with_default_speed(origin: Cell) -> Self {
        Self {
            origin,
            position: origin.to_position(),
            heading: Vec2Fixed::UNIT_X,
            path: Path::empty(),
            next_waypoint: 0,
            speed: DEFAULT_SPEED,
            state: CourierState::Idle,
            carrying: false,
        }
    }

    /// Cell the courier returns to on [`Courier::reset`].
    #[must_use]
    pub const fn origin(&self) -> Cell {
        self.origin
    }

    /// Continuous position.
    #[must_use]
    pub const fn position(&self) -> Vec2Fixed {
        self.position
    }

    /// Rounded projection of the position onto the grid.
    #[must_use]
    pub fn cell(&self) -> Cell {
        Cell::from_position(self.position)
    }

    /// Unit direction of the last movement.
    #[must_use]
    pub const fn heading(&self) -> Vec2Fixed {
        self.heading
    }

    /// Facing angle in radians, screen-space (`atan2(-dy, dx)`).
    #[must_use]
    pub fn angle(&self) -> f64 {
        self.heading.screen_angle()
    }

    /// Current motion state.
    #[must_use]
    pub const fn state(&self) -> CourierState {
        self.state
    }

    /// Whether the pickup payload has been collected.
    #[must_use]
    pub const fn is_carrying(&self) -> bool {
        self.carrying
    }

    /// Cells per tick.
    #[must_use]
    pub const fn speed(&self) -> Fixed {
        self.speed
    }

    /// The whole current path, including consumed waypoints.
    #[must_use]
    pub const fn path(&self) -> &Path {
        &self.path
    }

    /// Waypoints not yet reached.
    #[must_use]
    pub fn remaining_path(&self) -> &[Cell] {
        self.path.cells().get(self.next_waypoint..).unwrap_or(&[])
    }

    /// The waypoint currently being approached.
    #[must_use]
    pub fn next_waypoint(&self) -> Option<Cell> {
        self.remaining_path().first().copied()
    }

    /// Change the speed. Non-positive speeds are rejected.
    pub fn set_speed(&mut self, speed: Fixed) -> Result<()> {
        validate_speed(speed)?;
        self.speed = speed;
        Ok(())
    }

    /// Start following `path`.
    ///
    /// An empty path gives nothing to follow and leaves the courier
    /// untouched; returns whether the courier started moving.
    pub fn assign_path(&mut self, path: Path, leg: Leg) -> bool {
        if path.is_empty() {
            return false;
        }
        tracing::trace!(
            from = %self.cell(),
            to = ?path.goal(),
            steps = path.len(),
            ?leg,
            "Courier assigned path"
        );
        self.path = path;
        self.next_waypoint = 0;
        self.state = match leg {
            Leg::Pickup => CourierState::MovingToPickup,
            Leg::Goal => CourierState::MovingToGoal,
        };
        true
    }

    /// Advance one fixed step of `speed` cells.
    pub fn tick(&mut self) -> TickOutcome {
        self.step(self.speed)
    }

    /// Advance by a time step of `dt` ticks, moving up to `speed * dt`.
    pub fn advance(&mut self, dt: Fixed) -> Result<TickOutcome> {
        if dt <= Fixed::ZERO {
            return Err(CourierError::InvalidConfiguration(format!(
                "time step must be positive, got {dt}"
            )));
        }
        Ok(self.step(self.speed.saturating_mul(dt)))
    }

    fn step(&mut self, max_distance: Fixed) -> TickOutcome {
        if !self.state.is_moving() {
            return TickOutcome::Stationary;
        }
        let Some(target) = self.next_waypoint() else {
            self.state = CourierState::Arrived;
            return TickOutcome::Stationary;
        };

        let target_pos = target.to_position();
        let delta = target_pos - self.position;
        let distance = delta.length();

        if distance < max_distance {
            self.position = target_pos;
            self.next_waypoint += 1;
            if self.next_waypoint >= self.path.len() {
                self.state = CourierState::Arrived;
                tracing::trace!(cell = %target, "Courier arrived");
                return TickOutcome::Arrived(target);
            }
            return TickOutcome::ReachedWaypoint(target);
        }

        let direction = delta.normalize();
        self.position = self.position + direction.scale(max_distance);
        if direction != Vec2Fixed::ZERO {
            self.heading = direction;
        }
        TickOutcome::Moved
    }

    /// Return to the origin, drop the path and the payload, go idle.
    pub fn reset(&mut self) {
        self.position = self.origin.to_position();
        self.heading = Vec2Fixed::UNIT_X;
        self.path = Path::empty();
        self.next_waypoint = 0;
        self.state = CourierState::Idle;
        self.carrying = false;
    }

    /// Move the origin to `origin` and reset there.
    pub fn relocate(&mut self, origin: Cell) {
        self.origin = origin;
        self.reset();
    }

    pub(crate) fn set_carrying(&mut self, carrying: bool) {
        self.carrying = carrying;
    }
}

fn validate_speed(speed: Fixed) -> Result<()> {
    if speed <= Fixed::ZERO {
        return Err(CourierError::InvalidConfiguration(format!(
            "speed must be positive, got {speed}"
        )));
    }
    Ok(())
}
