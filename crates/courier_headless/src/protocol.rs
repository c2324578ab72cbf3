//! JSON protocol for headless courier runs.
//!
//! The runner communicates via JSON lines (one JSON object per line):
//!
//! **Input (stdin, interactive mode):** Commands from a controller
//! **Output (stdout):** Frames, responses and the final summary
//!
//! # Example Session
//!
//! ```text
//! <- {"type":"ready","version":"1.0","width":32,"height":24,"model":"octile8",...}
//! -> {"cmd":"play"}
//! <- {"type":"ack","cmd":"play"}
//! -> {"cmd":"tick","count":2}
//! <- {"type":"frame","tick":1,"x":3.15,"y":4.0,...}
//! <- {"type":"frame","tick":2,"x":3.3,"y":4.0,...}
//! -> {"cmd":"hash"}
//! <- {"type":"hash","tick":2,"hash":1234567890}
//! ```

use serde::{Deserialize, Serialize};

use courier_core::delivery::DeliveryPhase;
use courier_core::grid::Cell;
use courier_core::simulation::{Frame, Simulation};

// ============================================================================
// Input Commands (Controller -> Runner)
// ============================================================================

/// Commands accepted by the interactive runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    /// Advance by N ticks (default: 1).
    Tick {
        #[serde(default = "default_tick_count")]
        count: u32,
    },

    /// Emit the current frame without advancing.
    Query,

    /// Start the delivery from the courier's current cell.
    Play,

    /// Return the courier to its start cell.
    Reset,

    /// Place the courier on a given cell.
    MoveCourier { x: i32, y: i32 },

    /// Set pickup and goal cells.
    SetDestinations {
        pickup_x: i32,
        pickup_y: i32,
        goal_x: i32,
        goal_y: i32,
    },

    /// Place the courier on a random walkable cell.
    RandomCourier,

    /// Pick random pickup and goal cells.
    RandomDestinations,

    /// Set the speed level (1..=10).
    Speed { level: u8 },

    /// Report the state hash (for determinism verification).
    Hash,

    /// Stop the session.
    Quit,
}

fn default_tick_count() -> u32 {
    1
}

// ============================================================================
// Output Responses (Runner -> Controller)
// ============================================================================

/// Responses sent from the headless runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Runner is ready; describes the loaded world.
    Ready {
        version: String,
        width: u32,
        height: u32,
        model: String,
        start: Cell,
        pickup: Option<Cell>,
        goal: Option<Cell>,
    },

    /// Acknowledgment of a command.
    Ack { cmd: String },

    /// Error processing a command.
    Error {
        message: String,
        cmd: Option<String>,
    },

    /// Per-tick snapshot.
    Frame(Frame),

    /// State hash at a tick.
    Hash { tick: u64, hash: u64 },

    /// Final result of a run.
    Summary(RunSummary),
}

/// Outcome of a run to completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Final delivery phase.
    pub phase: DeliveryPhase,
    /// Ticks run.
    pub ticks: u64,
    /// Whether the payload reached the goal.
    pub delivered: bool,
    /// Cell the courier ended on.
    pub final_cell: Cell,
    /// Final state hash.
    pub hash: u64,
    /// Planning failure, if any.
    pub error: Option<String>,
}

impl RunSummary {
    /// Summarize the current state of `sim`.
    pub fn from_simulation(sim: &Simulation, error: Option<String>) -> Self {
        let phase = sim.orchestrator().phase();
        Self {
            phase,
            ticks: sim.tick_count(),
            delivered: phase == DeliveryPhase::Completed,
            final_cell: sim.courier().cell(),
            hash: sim.state_hash(),
            error,
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Protocol version reported in [`Response::Ready`].
pub const PROTOCOL_VERSION: &str = "1.0";

impl Response {
    /// Create a ready response describing `sim`.
    pub fn ready(sim: &Simulation) -> Self {
        let task = sim.destinations();
        Self::Ready {
            version: PROTOCOL_VERSION.to_string(),
            width: sim.grid().width(),
            height: sim.grid().height(),
            model: sim.orchestrator().model().name().to_string(),
            start: sim.courier().origin(),
            pickup: task.map(|t| t.pickup),
            goal: task.map(|t| t.goal),
        }
    }

    /// Create an acknowledgment.
    pub fn ack(cmd: &str) -> Self {
        Self::Ack {
            cmd: cmd.to_string(),
        }
    }

    /// Create an error response.
    pub fn error(message: impl Into<String>, cmd: Option<&str>) -> Self {
        Self::Error {
            message: message.into(),
            cmd: cmd.map(String::from),
        }
    }

    /// Serialize to JSON line (with newline).
    pub fn to_json_line(&self) -> String {
        let mut json = serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"type":"error","message":"Serialization failed: {e}"}}"#)
        });
        json.push('\n');
        json
    }
}

impl Command {
    /// Parse from a JSON line.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Get command name for acknowledgment.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Tick { .. } => "tick",
            Self::Query => "query",
            Self::Play => "play",
            Self::Reset => "reset",
            Self::MoveCourier { .. } => "move_courier",
            Self::SetDestinations { .. } => "set_destinations",
            Self::RandomCourier => "random_courier",
            Self::RandomDestinations => "random_destinations",
            Self::Speed { .. } => "speed",
            Self::Hash => "hash",
            Self::Quit => "quit",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::config::EngineConfig;
    use courier_core::grid::Grid;

    #[test]
    fn test_parse_tick_command() {
        let json = r#"{"cmd":"tick","count":60}"#;
        let cmd = Command::from_json(json).unwrap();
        assert_eq!(cmd, Command::Tick { count: 60 });
    }

    #[test]
    fn test_default_tick_count() {
        let cmd = Command::from_json(r#"{"cmd":"tick"}"#).unwrap();
        assert_eq!(cmd, Command::Tick { count: 1 });
    }

    #[test]
    fn test_parse_destinations_command() {
        let json = r#"{"cmd":"set_destinations","pickup_x":1,"pickup_y":2,"goal_x":3,"goal_y":4}"#;
        let cmd = Command::from_json(json).unwrap();
        assert_eq!(cmd.name(), "set_destinations");
        assert!(matches!(
            cmd,
            Command::SetDestinations {
                pickup_x: 1,
                pickup_y: 2,
                goal_x: 3,
                goal_y: 4
            }
        ));
    }

    #[test]
    fn test_unknown_command_rejected() {
        assert!(Command::from_json(r#"{"cmd":"spawn"}"#).is_err());
    }

    #[test]
    fn test_serialize_frame_response() {
        let sim = Simulation::new(
            Grid::open(4, 4).unwrap(),
            Cell::new(1, 2),
            &EngineConfig::default(),
        )
        .unwrap();
        let json = Response::Frame(sim.snapshot()).to_json_line();
        assert!(json.ends_with('\n'));
        assert!(json.contains(r#""type":"frame""#));
        assert!(json.contains(r#""cell":{"x":1,"y":2}"#));
        assert!(json.contains(r#""state":"Idle""#));
    }

    #[test]
    fn test_ready_describes_world() {
        let mut sim = Simulation::new(
            Grid::open(5, 3).unwrap(),
            Cell::new(0, 0),
            &EngineConfig::default(),
        )
        .unwrap();
        sim.set_destinations(Cell::new(4, 0), Cell::new(4, 2)).unwrap();
        let json = Response::ready(&sim).to_json_line();
        assert!(json.contains(r#""type":"ready""#));
        assert!(json.contains(r#""width":5"#));
        assert!(json.contains(r#""model":"octile8""#));
        assert!(json.contains(r#""pickup":{"x":4,"y":0}"#));
    }

    #[test]
    fn test_summary_round_trip() {
        let summary = RunSummary {
            phase: DeliveryPhase::Completed,
            ticks: 42,
            delivered: true,
            final_cell: Cell::new(2, 3),
            hash: 7,
            error: None,
        };
        let line = Response::Summary(summary.clone()).to_json_line();
        let parsed: Response = serde_json::from_str(line.trim_end()).unwrap();
        assert_eq!(parsed, Response::Summary(summary));
    }
}
