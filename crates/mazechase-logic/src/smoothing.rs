//! Optional line-of-sight thinning of raw cell paths.
//!
//! From the current point, jump to the farthest remaining waypoint whose
//! straight segment is clear, then repeat. "Clear" is decided by sampling the
//! segment every `cell_size × sample_ratio` and checking the cell under each
//! sample, so it is only as reliable as the sampling density: a coarse ratio
//! can cut across the corner of a thin wall. Smoothing is off unless
//! configured, and the configured default samples three times denser than
//! [`LEGACY_SMOOTHING_SAMPLE_RATIO`](crate::constants::LEGACY_SMOOTHING_SAMPLE_RATIO).

use crate::geometry::Vec3;
use crate::grid::GridModel;

/// True when every sample along `from → to` lands on a walkable cell.
pub fn line_of_sight(grid: &GridModel, from: Vec3, to: Vec3, sample_ratio: f32) -> bool {
    let step = (grid.cell_size() * sample_ratio).max(f32::EPSILON);
    let distance = from.planar_distance(&to);
    let samples = (distance / step).ceil().max(1.0) as usize;
    let delta = to - from;

    (0..=samples).all(|k| {
        let t = k as f32 / samples as f32;
        grid.is_walkable_at(grid.world_to_grid(from + delta * t))
    })
}

/// Thin `raw` (which starts after `from`) to the waypoints where direction must change.
///
/// The final waypoint is always kept. Adjacent waypoints are taken as-is even
/// if sampling says otherwise, so the result never stalls.
pub fn smooth_path(grid: &GridModel, from: Vec3, raw: &[Vec3], sample_ratio: f32) -> Vec<Vec3> {
    let mut result = Vec::new();
    let mut current = from;
    let mut next = 0;

    while next < raw.len() {
        let farthest = (next..raw.len())
            .rev()
            .find(|&j| line_of_sight(grid, current, raw[j], sample_ratio))
            .unwrap_or(next);
        result.push(raw[farthest]);
        current = raw[farthest];
        next = farthest + 1;
    }

    result
}
