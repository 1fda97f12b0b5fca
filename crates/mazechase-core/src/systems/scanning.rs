//! Grid scanning - classifies each cell by probing an occupancy oracle
//!
//! The scan asks the oracle what overlaps a sphere of radius
//! `cell_size × wall_check_ratio` at every cell centre. Only `Obstacle` hits
//! block a cell; agents and collectibles standing in a corridor do not.

use mazechase_logic::geometry::Vec3;
use mazechase_logic::grid::GridModel;
use serde::{Deserialize, Serialize};

/// What an overlapping object is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    /// Static wall or scenery - blocks movement
    Obstacle,
    /// Another moving agent
    Agent,
    /// Pellet, fruit, power-up
    Collectible,
}

/// One object overlapping a probe
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbeHit {
    pub position: Vec3,
    pub classification: Classification,
}

/// Spatial query supplied by the physics layer
pub trait OccupancyOracle {
    /// Everything overlapping the sphere at `center` with `radius`
    fn query(&self, center: Vec3, radius: f32) -> Vec<ProbeHit>;
}

/// Scan result flagged as a likely integration mistake
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanWarning {
    /// Nothing is walkable - probe radius too large or wrong filter?
    NoWalkableCells,
    /// Nothing is blocked - obstacles missing or mis-classified?
    NoBlockedCells,
}

/// Diagnostics from a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    pub walkable: usize,
    pub blocked: usize,
    pub warning: Option<ScanWarning>,
}

/// Populate every cell of `grid` from the oracle
pub fn scan_grid(grid: &mut GridModel, oracle: &dyn OccupancyOracle, wall_check_ratio: f32) -> ScanReport {
    let radius = grid.cell_size() * wall_check_ratio;
    let mut walkable = 0;
    let mut blocked = 0;

    for z in 0..grid.height() as i32 {
        for x in 0..grid.width() as i32 {
            let center = grid.grid_to_world(x, z);
            let is_blocked = oracle
                .query(center, radius)
                .iter()
                .any(|hit| hit.classification == Classification::Obstacle);
            grid.set_cell(x, z, !is_blocked);
            if is_blocked {
                blocked += 1;
            } else {
                walkable += 1;
            }
        }
    }

    let warning = if walkable == 0 {
        Some(ScanWarning::NoWalkableCells)
    } else if blocked == 0 {
        Some(ScanWarning::NoBlockedCells)
    } else {
        None
    };

    log::info!(
        "Grid scan {}x{}: {} walkable, {} blocked",
        grid.width(),
        grid.height(),
        walkable,
        blocked
    );
    match warning {
        Some(ScanWarning::NoWalkableCells) => log::warn!(
            "Grid scan found no walkable cells (probe radius {:.3}); check the obstacle filter",
            radius
        ),
        Some(ScanWarning::NoBlockedCells) => log::warn!(
            "Grid scan found no blocked cells (probe radius {:.3}); are obstacles classified?",
            radius
        ),
        None => {}
    }

    ScanReport {
        walkable,
        blocked,
        warning,
    }
}

/// Axis-aligned box in the oracle's world
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Collider {
    pub center: Vec3,
    pub half_extents: Vec3,
    pub classification: Classification,
}

impl Collider {
    /// Sphere/box overlap test
    pub fn overlaps_sphere(&self, center: Vec3, radius: f32) -> bool {
        let closest = Vec3::new(
            center.x.clamp(self.center.x - self.half_extents.x, self.center.x + self.half_extents.x),
            center.y.clamp(self.center.y - self.half_extents.y, self.center.y + self.half_extents.y),
            center.z.clamp(self.center.z - self.half_extents.z, self.center.z + self.half_extents.z),
        );
        closest.distance_squared(&center) <= radius * radius
    }
}

/// In-process occupancy oracle backed by a flat list of boxes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColliderSet {
    pub colliders: Vec<Collider>,
}

impl ColliderSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, center: Vec3, half_extents: Vec3, classification: Classification) {
        self.colliders.push(Collider {
            center,
            half_extents,
            classification,
        });
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    /// Build a world from a top-down layout, north up like `GridModel::from_ascii`.
    ///
    /// `#` is a full-cell wall, `o` a pellet, `G` a parked agent, `.` empty floor.
    /// Unknown characters are treated as floor.
    pub fn from_layout(layout: &str, cell_size: f32, origin: Vec3) -> Self {
        let rows: Vec<&str> = layout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        let height = rows.len() as i32;
        let width = rows.first().map_or(0, |r| r.chars().count()) as i32;
        let half = cell_size / 2.0;
        let mut set = Self::new();

        for (row, line) in rows.iter().enumerate() {
            let z = height - 1 - row as i32;
            for (col, ch) in line.chars().enumerate() {
                let center = Vec3::new(
                    origin.x + (col as i32 - width / 2) as f32 * cell_size,
                    origin.y,
                    origin.z + (z - height / 2) as f32 * cell_size,
                );
                match ch {
                    '#' => set.add(center, Vec3::new(half, half, half), Classification::Obstacle),
                    'o' => set.add(center, Vec3::new(0.1, 0.1, 0.1) * cell_size, Classification::Collectible),
                    'G' => set.add(center, Vec3::new(0.3, 0.3, 0.3) * cell_size, Classification::Agent),
                    _ => {}
                }
            }
        }
        set
    }
}

impl OccupancyOracle for ColliderSet {
    fn query(&self, center: Vec3, radius: f32) -> Vec<ProbeHit> {
        self.colliders
            .iter()
            .filter(|c| c.overlaps_sphere(center, radius))
            .map(|c| ProbeHit {
                position: c.center,
                classification: c.classification,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mazechase_logic::constants::WALL_CHECK_RATIO;

    const LAYOUT: &str = "\
        #####\n\
        #.oG#\n\
        #.#.#\n\
        #####";

    #[test]
    fn test_scan_matches_layout() {
        let oracle = ColliderSet::from_layout(LAYOUT, 1.0, Vec3::ZERO);
        let mut grid = GridModel::new(5, 4, 1.0, Vec3::ZERO).unwrap();
        let report = scan_grid(&mut grid, &oracle, WALL_CHECK_RATIO);

        assert_eq!(report.walkable, 5);
        assert_eq!(report.blocked, 15);
        assert_eq!(report.warning, None);
        // Pellet and parked agent don't block.
        assert!(grid.is_walkable(2, 2));
        assert!(grid.is_walkable(3, 2));
        assert!(!grid.is_walkable(2, 1));
        assert_eq!(grid.to_ascii(), "#####\n#...#\n#.#.#\n#####\n");
    }

    #[test]
    fn test_scan_respects_cell_size_and_origin() {
        let origin = Vec3::new(10.0, 2.0, -4.0);
        let oracle = ColliderSet::from_layout(LAYOUT, 2.5, origin);
        let mut grid = GridModel::new(5, 4, 2.5, origin).unwrap();
        let report = scan_grid(&mut grid, &oracle, WALL_CHECK_RATIO);
        assert_eq!(report.walkable, 5);
    }

    #[test]
    fn test_oversized_probe_blocks_everything() {
        let oracle = ColliderSet::from_layout(LAYOUT, 1.0, Vec3::ZERO);
        let mut grid = GridModel::new(5, 4, 1.0, Vec3::ZERO).unwrap();
        let report = scan_grid(&mut grid, &oracle, 1.2);
        assert_eq!(report.walkable, 0);
        assert_eq!(report.warning, Some(ScanWarning::NoWalkableCells));
    }

    #[test]
    fn test_empty_world_warns() {
        let oracle = ColliderSet::new();
        let mut grid = GridModel::new(3, 3, 1.0, Vec3::ZERO).unwrap();
        grid.fill(false);
        let report = scan_grid(&mut grid, &oracle, WALL_CHECK_RATIO);
        assert_eq!(report.blocked, 0);
        assert_eq!(report.warning, Some(ScanWarning::NoBlockedCells));
        assert_eq!(grid.walkable_count(), 9);
    }

    #[test]
    fn test_sphere_box_overlap() {
        let wall = Collider {
            center: Vec3::ZERO,
            half_extents: Vec3::new(0.5, 0.5, 0.5),
            classification: Classification::Obstacle,
        };
        assert!(wall.overlaps_sphere(Vec3::new(0.9, 0.0, 0.0), 0.45));
        assert!(!wall.overlaps_sphere(Vec3::new(1.0, 0.0, 0.0), 0.45));
        assert!(!wall.overlaps_sphere(Vec3::new(0.9, 0.0, 0.9), 0.45));
    }
}
