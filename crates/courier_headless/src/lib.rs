//! Headless courier runner for CI verification and scripted control.
//!
//! Runs the delivery simulation without graphics. This enables:
//!
//! - **CI verification**: Automated runs of the engine on generated maps
//! - **Scripted control**: A controller drives the courier via JSON commands
//! - **Determinism checks**: Same seed, same frames, same hash
//!
//! # Protocol
//!
//! Communication uses JSON lines (one JSON object per line):
//!
//! - **stdin**: Commands from controller (interactive mode only)
//! - **stdout**: Frames, responses and the run summary (JSON)
//! - **stderr**: Debug logs (human-readable)
//!
//! See [`protocol`] module for the full command/response format.

pub mod protocol;
pub mod runner;

pub use protocol::{Command, Response, RunSummary};
pub use runner::{parse_cell, HeadlessConfig, HeadlessError, HeadlessRunner};
