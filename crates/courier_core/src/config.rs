//! Engine configuration loaded from RON text.
//!
//! ```ron
//! (
//!     movement: Octile8,
//!     heuristic: None,
//!     speed: 644245094,
//!     map: (width: 32, height: 24, obstacle_density: 0.15, seed: 12345),
//! )
//! ```
//!
//! `speed` is the raw bit pattern of the fixed-point value, like every
//! other serialized [`Fixed`].

use serde::{Deserialize, Serialize};

use crate::courier::DEFAULT_SPEED;
use crate::error::{CourierError, Result};
use crate::map_generation::MapConfig;
use crate::math::{fixed_serde, Fixed};
use crate::movement::{Heuristic, MovementModel};

/// Lowest speed level.
pub const MIN_SPEED_LEVEL: u8 = 1;
/// Highest speed level.
pub const MAX_SPEED_LEVEL: u8 = 10;
/// Speed level matching [`DEFAULT_SPEED`].
pub const DEFAULT_SPEED_LEVEL: u8 = 3;

/// Convert a speed level (1..=10) to cells per tick (`level / 20`).
pub fn speed_from_level(level: u8) -> Result<Fixed> {
    if !(MIN_SPEED_LEVEL..=MAX_SPEED_LEVEL).contains(&level) {
        return Err(CourierError::InvalidConfiguration(format!(
            "speed level must be within {MIN_SPEED_LEVEL}..={MAX_SPEED_LEVEL}, got {level}"
        )));
    }
    Ok(Fixed::from_num(level) / Fixed::from_num(20))
}

/// Engine-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Movement model used for planning.
    #[serde(default)]
    pub movement: MovementModel,
    /// Heuristic override; `None` uses the model's default.
    #[serde(default)]
    pub heuristic: Option<Heuristic>,
    /// Courier speed in cells per tick.
    #[serde(with = "fixed_serde", default = "default_speed")]
    pub speed: Fixed,
    /// Settings for generated maps.
    #[serde(default)]
    pub map: MapConfig,
}

const fn default_speed() -> Fixed {
    DEFAULT_SPEED
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            movement: MovementModel::default(),
            heuristic: None,
            speed: DEFAULT_SPEED,
            map: MapConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a RON document.
    pub fn from_ron(text: &str) -> Result<Self> {
        let config: Self = ron::from_str(text).map_err(|e| CourierError::DataParseError {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty RON.
    pub fn to_ron(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()).map_err(|e| {
            CourierError::DataParseError {
                message: e.to_string(),
            }
        })
    }

    /// Reject non-positive speed and invalid map settings.
    pub fn validate(&self) -> Result<()> {
        if self.speed <= Fixed::ZERO {
            return Err(CourierError::InvalidConfiguration(format!(
                "speed must be positive, got {}",
                self.speed
            )));
        }
        self.map.validate()
    }

    /// Heuristic actually used for planning.
    #[must_use]
    pub fn effective_heuristic(&self) -> Heuristic {
        self.heuristic
            .unwrap_or_else(|| self.movement.default_heuristic())
    }
}
