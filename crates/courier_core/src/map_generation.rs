//! Seeded random maps and random placement of courier and destinations.
//!
//! Generation is fully deterministic: the same [`MapConfig`] always yields
//! the same grid, and the same [`MapRng`] state always yields the same
//! placements.

use serde::{Deserialize, Serialize};

use crate::error::{CourierError, Result};
use crate::grid::{Cell, Grid};

/// Map configuration for random generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    /// Map width in cells.
    pub width: u32,
    /// Map height in cells.
    pub height: u32,
    /// Chance of each cell being an obstacle (0.0 = open, 1.0 = solid).
    pub obstacle_density: f32,
    /// Random seed for deterministic generation.
    pub seed: u64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: 32,
            height: 24,
            obstacle_density: 0.15,
            seed: 12345,
        }
    }
}

impl MapConfig {
    /// Create a config with the default density and seed.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Set the random seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set obstacle density, clamped to [0, 1].
    #[must_use]
    pub fn with_obstacle_density(mut self, density: f32) -> Self {
        self.obstacle_density = density.clamp(0.0, 1.0);
        self
    }

    /// Reject empty dimensions and densities outside [0, 1].
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(CourierError::InvalidConfiguration(format!(
                "map must be at least 1x1, got {}x{}",
                self.width, self.height
            )));
        }
        if !(0.0..=1.0).contains(&self.obstacle_density) {
            return Err(CourierError::InvalidConfiguration(format!(
                "obstacle density must be within [0, 1], got {}",
                self.obstacle_density
            )));
        }
        Ok(())
    }
}

/// Seed offset separating placement draws from obstacle draws.
const PLACEMENT_STREAM: u64 = 0xD1B5_4A32_D192_ED03;

/// Simple deterministic RNG (LCG).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MapRng {
    state: u64,
}

impl MapRng {
    /// Create an RNG from a seed.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_add(0x9E37_79B9_7F4A_7C15),
        }
    }

    /// Generator for placing couriers and destinations on a map built from
    /// `seed`. Its stream is independent of the one that laid out obstacles.
    #[must_use]
    pub const fn placement(seed: u64) -> Self {
        Self::new(seed ^ PLACEMENT_STREAM)
    }

    fn next(&mut self) -> u64 {
        self.state = self.state.wrapping_mul(0x5_DEEC_E66D).wrapping_add(11);
        self.state
    }

    /// Uniform value in [0, 1) with four decimal digits.
    pub fn next_f32(&mut self) -> f32 {
        (self.next() % 10000) as f32 / 10000.0
    }

    /// Uniform index in `0..len`; `len` must be non-zero.
    pub fn next_index(&mut self, len: usize) -> usize {
        // High bits of an LCG are far better distributed than low ones.
        ((self.next() >> 33) % len as u64) as usize
    }
}

/// Generate a grid where each cell is an obstacle with probability
/// `obstacle_density`.
pub fn generate_map(config: &MapConfig) -> Result<Grid> {
    config.validate()?;
    let mut rng = MapRng::new(config.seed);
    let total_cells = (config.width as usize) * (config.height as usize);

    let blocked: Vec<bool> = (0..total_cells)
        .map(|_| rng.next_f32() < config.obstacle_density)
        .collect();

    let grid = Grid::from_flags(config.width, config.height, blocked)?;
    tracing::debug!(
        width = config.width,
        height = config.height,
        seed = config.seed,
        walkable = grid.walkable_count(),
        "Generated map"
    );
    Ok(grid)
}

/// Pick a random walkable cell, `None` if the grid has none.
pub fn random_walkable_cell(grid: &Grid, rng: &mut MapRng) -> Option<Cell> {
    let count = grid.walkable_count();
    if count == 0 {
        return None;
    }
    grid.walkable_cells().nth(rng.next_index(count))
}

/// Pick two distinct random walkable cells as (pickup, goal).
///
/// `None` if the grid has fewer than two walkable cells.
pub fn random_destinations(grid: &Grid, rng: &mut MapRng) -> Option<(Cell, Cell)> {
    let count = grid.walkable_count();
    if count < 2 {
        return None;
    }
    let pickup_index = rng.next_index(count);
    // Draw from the remaining cells, skipping over the pickup.
    let mut goal_index = rng.next_index(count - 1);
    if goal_index >= pickup_index {
        goal_index += 1;
    }

    let pickup = grid.walkable_cells().nth(pickup_index)?;
    let goal = grid.walkable_cells().nth(goal_index)?;
    Some((pickup, goal))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MapConfig::default();
        assert!((config.obstacle_density - 0.15).abs() < f32::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_generate_map_dimensions() {
        let grid = generate_map(&MapConfig::new(20, 10)).unwrap();
        assert_eq!(grid.width(), 20);
        assert_eq!(grid.height(), 10);
    }

    #[test]
    fn test_obstacle_density() {
        let config = MapConfig::new(100, 100).with_seed(7);
        let grid = generate_map(&config).unwrap();
        let ratio: f64 = grid.obstacle_ratio().to_num();
        assert!(
            (0.08..0.22).contains(&ratio),
            "obstacle ratio {ratio} too far from 0.15"
        );
    }

    #[test]
    fn test_density_extremes() {
        let open = generate_map(&MapConfig::new(10, 10).with_obstacle_density(0.0)).unwrap();
        assert_eq!(open.walkable_count(), 100);
        let solid = generate_map(&MapConfig::new(10, 10).with_obstacle_density(1.0)).unwrap();
        assert_eq!(solid.walkable_count(), 0);
    }

    #[test]
    fn test_invalid_config() {
        assert!(generate_map(&MapConfig::new(0, 10)).is_err());
        let config = MapConfig {
            obstacle_density: 1.5,
            ..MapConfig::default()
        };
        assert!(matches!(
            generate_map(&config),
            Err(CourierError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_determinism() {
        let config = MapConfig::new(40, 30).with_seed(99);
        assert_eq!(generate_map(&config).unwrap(), generate_map(&config).unwrap());
    }

    #[test]
    fn test_different_seeds() {
        let a = generate_map(&MapConfig::new(40, 30).with_seed(1)).unwrap();
        let b = generate_map(&MapConfig::new(40, 30).with_seed(2)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_placement_stream_differs_from_obstacles() {
        for seed in [0, 1, 12345, u64::MAX] {
            let mut obstacles = MapRng::new(seed);
            let mut placement = MapRng::placement(seed);
            let a: Vec<f32> = (0..8).map(|_| obstacles.next_f32()).collect();
            let b: Vec<f32> = (0..8).map(|_| placement.next_f32()).collect();
            assert_ne!(a, b, "seed {seed}");
        }
        assert_eq!(MapRng::placement(7), MapRng::placement(7));
    }

    #[test]
    fn test_random_walkable_cell() {
        let grid = Grid::parse(
            "
            ###
            #.#
            ###
            ",
        )
        .unwrap();
        let mut rng = MapRng::new(3);
        for _ in 0..10 {
            assert_eq!(random_walkable_cell(&grid, &mut rng), Some(Cell::new(1, 1)));
        }

        let solid = Grid::parse("##").unwrap();
        assert_eq!(random_walkable_cell(&solid, &mut rng), None);
    }

    #[test]
    fn test_random_destinations_distinct_and_walkable() {
        let grid = generate_map(&MapConfig::new(12, 12).with_seed(5)).unwrap();
        let mut rng = MapRng::new(5);
        for _ in 0..100 {
            let (pickup, goal) = random_destinations(&grid, &mut rng).unwrap();
            assert_ne!(pickup, goal);
            assert!(grid.is_cell_walkable(pickup));
            assert!(grid.is_cell_walkable(goal));
        }
    }

    #[test]
    fn test_random_destinations_needs_two_cells() {
        let one = Grid::parse("#.#").unwrap();
        assert_eq!(random_destinations(&one, &mut MapRng::new(0)), None);

        let two = Grid::parse(".#.").unwrap();
        let (pickup, goal) = random_destinations(&two, &mut MapRng::new(0)).unwrap();
        assert_ne!(pickup, goal);
    }
}
