//! # Courier Test Utilities
//!
//! Shared testing utilities for all crates:
//! - Determinism test harness
//! - Grid fixtures from ASCII art
//! - Reference shortest-path oracle
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod determinism;
pub mod fixtures;
pub mod reference;

/// Re-export proptest for convenience.
pub use proptest;
