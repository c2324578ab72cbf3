//! Determinism testing utilities.
//!
//! Provides a harness for verifying that searches and simulations
//! produce identical results given identical inputs.
//!
//! # Testing Strategy
//!
//! Sources of non-determinism include:
//!
//! - **Floating-point math**: Different CPUs can produce different results.
//!   We use fixed-point arithmetic via [`courier_core::math::Fixed`] throughout.
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   The search never iterates its maps; frontier order comes from the heap.
//!
//! - **System randomness**: All "random" placement uses a seeded generator.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use courier_core::simulation::Simulation;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated.
    pub ticks: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for deterministic simulation).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the runs were deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Simulation is non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a stateful process multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `ticks` - Number of steps per run
/// * `setup` - Function to create initial state
/// * `step` - Function to advance by one step
/// * `hash` - Function to compute state hash
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..ticks {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

/// Advance a simulation one tick, ignoring planning failures.
///
/// A failed goal leg is itself deterministic; the resulting state is what
/// gets hashed.
fn step_simulation(sim: &mut Simulation) {
    let _ = sim.tick();
}

/// Run a simulation twice with identical setup and compare final hashes.
pub fn verify_simulation_determinism<F>(setup_fn: F, num_ticks: u64) -> bool
where
    F: Fn() -> Simulation,
{
    let result = verify_determinism(2, num_ticks, &setup_fn, step_simulation, |sim| {
        sim.state_hash()
    });
    result.is_deterministic
}

/// Run N simulations on scoped threads and collect final hashes.
///
/// Catches non-determinism that only shows up under thread scheduling
/// or memory layout differences.
///
/// # Panics
///
/// Panics if a simulation thread panics.
pub fn run_parallel_simulations<F>(setup_fn: F, num_sims: usize, num_ticks: u64) -> DeterminismResult
where
    F: Fn() -> Simulation + Sync,
{
    let hashes: Vec<u64> = thread::scope(|s| {
        let handles: Vec<_> = (0..num_sims)
            .map(|_| {
                s.spawn(|| {
                    let mut sim = setup_fn();
                    for _ in 0..num_ticks {
                        step_simulation(&mut sim);
                    }
                    sim.state_hash()
                })
            })
            .collect();

        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    DeterminismResult {
        is_deterministic: hashes.windows(2).all(|w| w[0] == w[1]),
        hashes,
        ticks: num_ticks,
    }
}

/// Compare two simulation runs tick-by-tick, finding first divergence.
///
/// # Returns
///
/// `None` if the runs match, `Some(tick)` if they diverge at that tick.
pub fn find_first_divergence<F>(setup_fn: F, num_ticks: u64) -> Option<u64>
where
    F: Fn() -> Simulation,
{
    let mut sim1 = setup_fn();
    let mut sim2 = setup_fn();

    if sim1.state_hash() != sim2.state_hash() {
        return Some(0);
    }

    for tick in 1..=num_ticks {
        step_simulation(&mut sim1);
        step_simulation(&mut sim2);

        if sim1.state_hash() != sim2.state_hash() {
            tracing::warn!(tick, "Simulations diverged");
            return Some(tick);
        }
    }

    None
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for grids, cells and models.
pub mod strategies {
    use courier_core::grid::{Cell, Grid};
    use courier_core::movement::{Heuristic, MovementModel};
    use proptest::prelude::*;

    /// Any supported movement model.
    pub fn arb_model() -> impl Strategy<Value = MovementModel> {
        prop::sample::select(MovementModel::ALL.to_vec())
    }

    /// Any heuristic.
    pub fn arb_heuristic() -> impl Strategy<Value = Heuristic> {
        prop::sample::select(vec![
            Heuristic::Manhattan,
            Heuristic::Octile,
            Heuristic::Euclidean,
            Heuristic::Zero,
        ])
    }

    /// A grid of 1..=`max_side` cells per side with roughly 25% obstacles.
    pub fn arb_grid(max_side: u32) -> impl Strategy<Value = Grid> {
        (1..=max_side, 1..=max_side).prop_flat_map(|(width, height)| {
            let cells = (width * height) as usize;
            prop::collection::vec(prop::bool::weighted(0.25), cells).prop_map(move |blocked| {
                Grid::from_flags(width, height, blocked).expect("dimensions match flag count")
            })
        })
    }

    /// A cell inside `grid` (walkable or not).
    pub fn arb_cell(grid: &Grid) -> impl Strategy<Value = Cell> {
        let width = grid.width() as i32;
        let height = grid.height() as i32;
        (0..width, 0..height).prop_map(|(x, y)| Cell::new(x, y))
    }

    /// A grid together with two cells inside it.
    pub fn arb_grid_with_endpoints(max_side: u32) -> impl Strategy<Value = (Grid, Cell, Cell)> {
        arb_grid(max_side).prop_flat_map(|grid| {
            let start = arb_cell(&grid);
            let goal = arb_cell(&grid);
            (Just(grid), start, goal)
        })
    }
}
