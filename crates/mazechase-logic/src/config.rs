//! Tuning configuration for grid, pathfinding, motor and agent behaviour.
//!
//! Every section has sensible defaults (see [`constants`](crate::constants))
//! and is `#[serde(default)]`, so a JSON file only needs the fields it
//! changes:
//!
//! ```
//! use mazechase_logic::config::ChaseConfig;
//!
//! let config = ChaseConfig::from_json_str(r#"{ "speed": { "base_speed": 6.0 } }"#).unwrap();
//! assert_eq!(config.speed.base_speed, 6.0);
//! assert_eq!(config.motor.repath_interval, 0.5);
//! assert!(config.pathfinding.smoothing.is_none());
//! ```

use std::io::Read;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::*;
use crate::geometry::Vec3;
use crate::grid::{GridError, GridModel};

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error(transparent)]
    Grid(#[from] GridError),
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

fn require_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must be positive, got {}", value)))
    }
}

fn require_unit_ratio(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must be in (0, 1], got {}", value)))
    }
}

/// Grid dimensions and world placement.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub width: usize,
    pub height: usize,
    pub cell_size: f32,
    /// World-space centre of the grid.
    pub origin: Vec3,
    /// Occupancy probe radius as a fraction of `cell_size`.
    pub wall_check_ratio: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 28,
            height: 31,
            cell_size: 1.0,
            origin: Vec3::ZERO,
            wall_check_ratio: WALL_CHECK_RATIO,
        }
    }
}

impl GridConfig {
    /// Fully walkable grid with these dimensions, ready to be scanned.
    pub fn build_grid(&self) -> Result<GridModel, GridError> {
        GridModel::new(self.width, self.height, self.cell_size, self.origin)
    }

    /// Probe radius in world units.
    pub fn probe_radius(&self) -> f32 {
        self.cell_size * self.wall_check_ratio
    }
}

/// Line-of-sight smoothing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Sampling step as a fraction of cell size.
    pub sample_ratio: f32,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            sample_ratio: SMOOTHING_SAMPLE_RATIO,
        }
    }
}

/// A* and endpoint repair settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathfindingConfig {
    /// BFS repair visits at most `repair_radius²` cells.
    pub repair_radius: u32,
    /// `None` keeps raw cell paths.
    pub smoothing: Option<SmoothingConfig>,
}

impl Default for PathfindingConfig {
    fn default() -> Self {
        Self {
            repair_radius: REPAIR_RADIUS,
            smoothing: None,
        }
    }
}

/// Path follower settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MotorConfig {
    pub snap_threshold: f32,
    /// Seconds between recomputations while following.
    pub repath_interval: f32,
}

impl Default for MotorConfig {
    fn default() -> Self {
        Self {
            snap_threshold: SNAP_THRESHOLD,
            repath_interval: REPATH_INTERVAL,
        }
    }
}

/// Per-state speed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedConfig {
    pub base_speed: f32,
    pub frightened_factor: f32,
    pub eaten_factor: f32,
}

impl Default for SpeedConfig {
    fn default() -> Self {
        Self {
            base_speed: BASE_SPEED,
            frightened_factor: FRIGHTENED_FACTOR,
            eaten_factor: EATEN_FACTOR,
        }
    }
}

/// Target-selection distances (in cells) and odds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    pub ambush_lookahead: f32,
    pub patrol_threshold: f32,
    pub random_threshold: f32,
    pub frightened_random_chance: f64,
    pub flee_distance: f32,
    /// World units, not cells.
    pub home_arrival_threshold: f32,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            ambush_lookahead: AMBUSH_LOOKAHEAD_CELLS,
            patrol_threshold: PATROL_THRESHOLD_CELLS,
            random_threshold: RANDOM_THRESHOLD_CELLS,
            frightened_random_chance: FRIGHTENED_RANDOM_CHANCE,
            flee_distance: FLEE_DISTANCE_CELLS,
            home_arrival_threshold: HOME_ARRIVAL_THRESHOLD,
        }
    }
}

/// Session-level switches.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Auto-end power mode after this many seconds; `None` waits for an explicit end.
    pub power_mode_duration: Option<f32>,
    /// Detect protagonist contact by distance; `None` relies on explicit reports.
    pub contact_radius: Option<f32>,
    /// RNG seed for target selection.
    pub seed: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            power_mode_duration: Some(POWER_MODE_DURATION),
            contact_radius: Some(CONTACT_RADIUS),
            seed: 0,
        }
    }
}

/// Complete configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChaseConfig {
    pub grid: GridConfig,
    pub pathfinding: PathfindingConfig,
    pub motor: MotorConfig,
    pub speed: SpeedConfig,
    pub behavior: BehaviorConfig,
    pub session: SessionConfig,
}

impl ChaseConfig {
    /// Parse and validate.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse from a reader and validate.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field is in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.width == 0 || self.grid.height == 0 {
            return Err(GridError::ZeroDimensions {
                width: self.grid.width,
                height: self.grid.height,
            }
            .into());
        }
        require_positive("grid.cell_size", self.grid.cell_size)?;
        require_unit_ratio("grid.wall_check_ratio", self.grid.wall_check_ratio)?;

        if self.pathfinding.repair_radius == 0 {
            return Err(invalid("pathfinding.repair_radius", "must be at least 1"));
        }
        if let Some(smoothing) = &self.pathfinding.smoothing {
            require_unit_ratio("pathfinding.smoothing.sample_ratio", smoothing.sample_ratio)?;
        }

        require_positive("motor.snap_threshold", self.motor.snap_threshold)?;
        require_positive("motor.repath_interval", self.motor.repath_interval)?;

        require_positive("speed.base_speed", self.speed.base_speed)?;
        require_positive("speed.frightened_factor", self.speed.frightened_factor)?;
        require_positive("speed.eaten_factor", self.speed.eaten_factor)?;

        let chance = self.behavior.frightened_random_chance;
        if !(0.0..=1.0).contains(&chance) {
            return Err(invalid(
                "behavior.frightened_random_chance",
                format!("must be in [0, 1], got {}", chance),
            ));
        }
        require_positive("behavior.home_arrival_threshold", self.behavior.home_arrival_threshold)?;
        for (field, value) in [
            ("behavior.ambush_lookahead", self.behavior.ambush_lookahead),
            ("behavior.patrol_threshold", self.behavior.patrol_threshold),
            ("behavior.random_threshold", self.behavior.random_threshold),
            ("behavior.flee_distance", self.behavior.flee_distance),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(invalid(field, format!("must be non-negative, got {}", value)));
            }
        }

        if let Some(duration) = self.session.power_mode_duration {
            require_positive("session.power_mode_duration", duration)?;
        }
        if let Some(radius) = self.session.contact_radius {
            require_positive("session.contact_radius", radius)?;
        }
        Ok(())
    }
}
