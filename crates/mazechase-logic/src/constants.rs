//! Tuning defaults shared by config, pathfinding and the agent runtime.
//!
//! Distances suffixed `_CELLS` are multiplied by the grid's cell size at use.

/// Probe radius for the occupancy scan, as a fraction of cell size.
pub const WALL_CHECK_RATIO: f32 = 0.45;

/// BFS repair radius; the search visits at most `radius²` nodes.
pub const REPAIR_RADIUS: u32 = 10;

/// Line-of-sight sampling step of the legacy smoother, as a fraction of cell size.
pub const LEGACY_SMOOTHING_SAMPLE_RATIO: f32 = 0.3;

/// Default sampling step when smoothing is switched on.
pub const SMOOTHING_SAMPLE_RATIO: f32 = 0.1;

/// Distance at which the motor snaps onto a waypoint.
pub const SNAP_THRESHOLD: f32 = 0.05;

/// Seconds between path recomputations while following a path.
pub const REPATH_INTERVAL: f32 = 0.5;

/// Agent speed in world units per second while Normal.
pub const BASE_SPEED: f32 = 4.0;

/// Speed multiplier while Frightened.
pub const FRIGHTENED_FACTOR: f32 = 0.5;

/// Speed multiplier while Eaten (returning home).
pub const EATEN_FACTOR: f32 = 2.0;

/// How far ahead of the protagonist an Ambusher aims.
pub const AMBUSH_LOOKAHEAD_CELLS: f32 = 4.0;

/// Patrollers chase beyond this distance and scatter within it.
pub const PATROL_THRESHOLD_CELLS: f32 = 8.0;

/// Random-personality agents chase within this distance and roam beyond it.
pub const RANDOM_THRESHOLD_CELLS: f32 = 6.0;

/// Probability that a Frightened agent picks a random cell instead of fleeing.
pub const FRIGHTENED_RANDOM_CHANCE: f64 = 0.3;

/// How far a fleeing agent extrapolates away from the protagonist.
pub const FLEE_DISTANCE_CELLS: f32 = 6.0;

/// Distance to the home cell that counts as arrived for an Eaten agent.
pub const HOME_ARRIVAL_THRESHOLD: f32 = 0.5;

/// Seconds of power mode before it expires on its own.
pub const POWER_MODE_DURATION: f32 = 8.0;

/// Agent/protagonist distance that counts as contact.
pub const CONTACT_RADIUS: f32 = 0.5;
