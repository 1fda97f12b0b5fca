//! A* pathfinding over the occupancy grid, four-connected.
//!
//! `Pathfinder` is stateless apart from its tuning; every call takes the grid
//! explicitly. Blocked or off-grid endpoints are first moved to the nearest
//! walkable cell by a bounded BFS ([`repair_to_walkable`]). The search itself
//! is capped at `width × height` expansions so a single call has bounded cost
//! on the tick thread.
//!
//! Failure is never an error: an unreachable goal yields an empty path.
//!
//! ```
//! use mazechase_logic::geometry::Vec3;
//! use mazechase_logic::grid::{GridCoord, GridModel};
//! use mazechase_logic::pathfinding::Pathfinder;
//!
//! let grid = GridModel::from_ascii(
//!     "...\n\
//!      .#.\n\
//!      ...",
//!     1.0,
//!     Vec3::ZERO,
//! ).unwrap();
//! let path = Pathfinder::default().find_cell_path(&grid, GridCoord::new(0, 0), GridCoord::new(2, 2));
//! assert_eq!(path.len(), 4);
//! assert!(!path.contains(&GridCoord::new(1, 1)));
//! ```

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::config::PathfindingConfig;
use crate::geometry::Vec3;
use crate::grid::{GridCoord, GridModel};
use crate::smoothing::smooth_path;

/// Node on the A* open list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PathNode {
    position: GridCoord,
    g_cost: u32,
    h_cost: u32,
}

impl PathNode {
    fn f_cost(&self) -> u32 {
        self.g_cost + self.h_cost
    }
}

impl Ord for PathNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for a min-heap: lowest f, then lowest h, then position for determinism.
        other
            .f_cost()
            .cmp(&self.f_cost())
            .then_with(|| other.h_cost.cmp(&self.h_cost))
            .then_with(|| other.position.cmp(&self.position))
    }
}

impl PartialOrd for PathNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// How a search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathOutcome {
    /// Goal reached; the path is non-empty.
    Found,
    /// Start and goal resolve to the same cell; the path is empty.
    AlreadyThere,
    /// Every reachable cell was expanded without meeting the goal.
    Unreachable,
    /// The expansion budget ran out first.
    BudgetExceeded,
}

/// Diagnostics for a single search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathStats {
    /// Start cell after clamping and repair.
    pub start: GridCoord,
    /// Goal cell after clamping and repair.
    pub goal: GridCoord,
    pub start_repaired: bool,
    pub goal_repaired: bool,
    /// Nodes expanded by A*.
    pub expansions: usize,
    pub outcome: PathOutcome,
}

/// Breadth-first search for the nearest walkable cell by hop count.
///
/// Visits at most `radius²` cells (walkable or not, in-range only). Returns
/// `coord` itself when it is already walkable, and `None` when nothing
/// walkable lies within the bound.
pub fn repair_to_walkable(grid: &GridModel, coord: GridCoord, radius: u32) -> Option<GridCoord> {
    if grid.is_walkable_at(coord) {
        return Some(coord);
    }

    let cap = (radius as usize) * (radius as usize);
    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();
    visited.insert(coord);
    queue.push_back(coord);
    let mut visits = 0;

    while let Some(current) = queue.pop_front() {
        if visits >= cap {
            break;
        }
        visits += 1;
        if grid.is_walkable_at(current) {
            return Some(current);
        }
        for next in grid.neighbors4(current) {
            if visited.insert(next) {
                queue.push_back(next);
            }
        }
    }

    None
}

/// [`repair_to_walkable`], falling back to the original coordinate with a warning.
pub fn nearest_walkable(grid: &GridModel, coord: GridCoord, radius: u32) -> GridCoord {
    match repair_to_walkable(grid, coord, radius) {
        Some(found) => found,
        None => {
            log::warn!(
                "No walkable cell within {} BFS visits of {}; keeping original",
                radius * radius,
                coord
            );
            coord
        }
    }
}

/// Four-connected A* with uniform step cost and a Manhattan heuristic.
///
/// The returned path excludes `start` and ends at `goal`. Callers ensure
/// `start` is walkable.
fn a_star(grid: &GridModel, start: GridCoord, goal: GridCoord) -> (Vec<GridCoord>, usize, PathOutcome) {
    let budget = grid.len();
    let mut open = BinaryHeap::new();
    let mut closed: HashSet<GridCoord> = HashSet::new();
    let mut g_scores: HashMap<GridCoord, u32> = HashMap::new();
    let mut came_from: HashMap<GridCoord, GridCoord> = HashMap::new();
    let mut expansions = 0;

    g_scores.insert(start, 0);
    open.push(PathNode {
        position: start,
        g_cost: 0,
        h_cost: start.manhattan(&goal),
    });

    while let Some(node) = open.pop() {
        if closed.contains(&node.position) {
            continue;
        }
        if expansions >= budget {
            return (Vec::new(), expansions, PathOutcome::BudgetExceeded);
        }
        expansions += 1;

        if node.position == goal {
            let mut path = vec![goal];
            let mut current = goal;
            while let Some(&prev) = came_from.get(&current) {
                path.push(prev);
                current = prev;
            }
            path.reverse();
            path.remove(0);
            return (path, expansions, PathOutcome::Found);
        }
        closed.insert(node.position);

        for next in grid.neighbors4(node.position) {
            if !grid.is_walkable_at(next) || closed.contains(&next) {
                continue;
            }
            let tentative = node.g_cost + 1;
            let better = g_scores.get(&next).map_or(true, |&g| tentative < g);
            if better {
                g_scores.insert(next, tentative);
                came_from.insert(next, node.position);
                open.push(PathNode {
                    position: next,
                    g_cost: tentative,
                    h_cost: next.manhattan(&goal),
                });
            }
        }
    }

    (Vec::new(), expansions, PathOutcome::Unreachable)
}

/// Grid path planner.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pathfinder {
    pub config: PathfindingConfig,
}

impl Pathfinder {
    pub fn new(config: PathfindingConfig) -> Self {
        Self { config }
    }

    /// World-space path from `start` to `goal`, excluding the start cell.
    ///
    /// Waypoints are cell centres. When smoothing is configured the raw path
    /// is thinned by line-of-sight; otherwise consecutive waypoints are always
    /// one axis-aligned cell apart.
    pub fn find_path(&self, grid: &GridModel, start: Vec3, goal: Vec3) -> Vec<Vec3> {
        let start_cell = grid.world_to_grid(start);
        let goal_cell = grid.world_to_grid(goal);
        let (cells, stats) = self.find_cell_path_with_stats(grid, start_cell, goal_cell);
        let raw: Vec<Vec3> = cells.iter().map(|&c| grid.cell_center(c)).collect();

        match &self.config.smoothing {
            Some(smoothing) if raw.len() > 2 => {
                let from = grid.cell_center(stats.start);
                smooth_path(grid, from, &raw, smoothing.sample_ratio)
            }
            _ => raw,
        }
    }

    /// Cell path from `start` to `goal`, excluding `start`. Empty when unreachable.
    pub fn find_cell_path(&self, grid: &GridModel, start: GridCoord, goal: GridCoord) -> Vec<GridCoord> {
        self.find_cell_path_with_stats(grid, start, goal).0
    }

    /// As [`find_cell_path`](Self::find_cell_path), also reporting how the search went.
    pub fn find_cell_path_with_stats(
        &self,
        grid: &GridModel,
        start: GridCoord,
        goal: GridCoord,
    ) -> (Vec<GridCoord>, PathStats) {
        let radius = self.config.repair_radius;
        let clamped_start = grid.clamp(start);
        let clamped_goal = grid.clamp(goal);
        let resolved_start = nearest_walkable(grid, clamped_start, radius);
        let resolved_goal = nearest_walkable(grid, clamped_goal, radius);

        let mut stats = PathStats {
            start: resolved_start,
            goal: resolved_goal,
            start_repaired: resolved_start != start,
            goal_repaired: resolved_goal != goal,
            expansions: 0,
            outcome: PathOutcome::AlreadyThere,
        };

        if resolved_start == resolved_goal {
            return (Vec::new(), stats);
        }

        if !grid.is_walkable_at(resolved_start) {
            log::debug!("No path {} -> {}: start is still blocked", resolved_start, resolved_goal);
            stats.outcome = PathOutcome::Unreachable;
            return (Vec::new(), stats);
        }

        let (path, expansions, outcome) = a_star(grid, resolved_start, resolved_goal);
        stats.expansions = expansions;
        stats.outcome = outcome;
        if path.is_empty() {
            log::debug!(
                "No path {} -> {} ({:?} after {} expansions)",
                resolved_start,
                resolved_goal,
                outcome,
                expansions
            );
        }
        (path, stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SmoothingConfig;

    fn open_grid(width: usize, height: usize) -> GridModel {
        GridModel::new(width, height, 1.0, Vec3::ZERO).unwrap()
    }

    fn assert_no_diagonals(start: GridCoord, path: &[GridCoord]) {
        let mut prev = start;
        for &step in path {
            assert_eq!(prev.manhattan(&step), 1, "{} -> {} is not a single axis step", prev, step);
            prev = step;
        }
    }

    #[test]
    fn test_straight_corridor() {
        let grid = open_grid(10, 1);
        let start = grid.grid_to_world(0, 0);
        let goal = grid.grid_to_world(9, 0);
        let path = Pathfinder::default().find_path(&grid, start, goal);

        assert_eq!(path.len(), 9);
        for (i, w) in path.iter().enumerate() {
            assert_eq!(*w, grid.grid_to_world(i as i32 + 1, 0));
        }
        assert_eq!(*path.last().unwrap(), grid.grid_to_world(9, 0));
    }

    #[test]
    fn test_single_obstacle_detour() {
        let mut grid = open_grid(3, 3);
        grid.set_cell(1, 1, false);
        let start = GridCoord::new(0, 0);
        let path = Pathfinder::default().find_cell_path(&grid, start, GridCoord::new(2, 2));

        assert_eq!(path.len(), 4);
        assert!(!path.contains(&GridCoord::new(1, 1)));
        assert_eq!(*path.last().unwrap(), GridCoord::new(2, 2));
        assert_no_diagonals(start, &path);
    }

    #[test]
    fn test_open_rectangle_is_manhattan_optimal() {
        let grid = open_grid(12, 9);
        let start = GridCoord::new(1, 7);
        let goal = GridCoord::new(10, 2);
        let path = Pathfinder::default().find_cell_path(&grid, start, goal);
        assert_eq!(path.len() as u32, start.manhattan(&goal));
        assert_no_diagonals(start, &path);
    }

    #[test]
    fn test_walled_in_goal_returns_empty() {
        let grid = GridModel::from_ascii(
            ".......\n\
             ...#...\n\
             ..#.#..\n\
             ...#...\n\
             .......",
            1.0,
            Vec3::ZERO,
        )
        .unwrap();
        let (path, stats) = Pathfinder::default().find_cell_path_with_stats(
            &grid,
            GridCoord::new(0, 0),
            GridCoord::new(3, 2),
        );
        assert!(path.is_empty());
        assert_eq!(stats.outcome, PathOutcome::Unreachable);
        assert!(!stats.goal_repaired);
    }

    #[test]
    fn test_same_cell_is_empty() {
        let grid = open_grid(4, 4);
        let (path, stats) = Pathfinder::default().find_cell_path_with_stats(
            &grid,
            GridCoord::new(2, 2),
            GridCoord::new(2, 2),
        );
        assert!(path.is_empty());
        assert_eq!(stats.outcome, PathOutcome::AlreadyThere);
    }

    #[test]
    fn test_blocked_goal_is_repaired() {
        let grid = GridModel::from_ascii(
            "....\n\
             .##.\n\
             .##.\n\
             ....",
            1.0,
            Vec3::ZERO,
        )
        .unwrap();
        let (path, stats) = Pathfinder::default().find_cell_path_with_stats(
            &grid,
            GridCoord::new(0, 0),
            GridCoord::new(2, 2),
        );
        assert!(stats.goal_repaired);
        assert!(grid.is_walkable_at(stats.goal));
        assert_eq!(stats.goal.manhattan(&GridCoord::new(2, 2)), 1);
        assert_eq!(*path.last().unwrap(), stats.goal);
    }

    #[test]
    fn test_off_grid_goal_is_clamped() {
        let grid = open_grid(5, 5);
        let path = Pathfinder::default().find_cell_path(&grid, GridCoord::new(0, 0), GridCoord::new(40, -7));
        assert_eq!(*path.last().unwrap(), GridCoord::new(4, 0));
    }

    #[test]
    fn test_repair_returns_walkable_start_unchanged() {
        let grid = open_grid(3, 3);
        assert_eq!(
            repair_to_walkable(&grid, GridCoord::new(1, 1), 10),
            Some(GridCoord::new(1, 1))
        );
    }

    #[test]
    fn test_repair_finds_nearest_by_hops() {
        let grid = GridModel::from_ascii(
            "#####.\n\
             ######\n\
             ##.###",
            1.0,
            Vec3::ZERO,
        )
        .unwrap();
        // (2,0) is 2 hops from (1,1); (5,2) is 5 hops away.
        assert_eq!(
            repair_to_walkable(&grid, GridCoord::new(1, 1), 10),
            Some(GridCoord::new(2, 0))
        );
    }

    #[test]
    fn test_repair_respects_visit_cap() {
        let mut grid = GridModel::new(30, 1, 1.0, Vec3::ZERO).unwrap();
        grid.fill(false);
        grid.set_cell(29, 0, true);
        // 29 hops away but a radius of 3 allows only 9 visits.
        assert_eq!(repair_to_walkable(&grid, GridCoord::new(0, 0), 3), None);
        assert_eq!(nearest_walkable(&grid, GridCoord::new(0, 0), 3), GridCoord::new(0, 0));
        assert_eq!(
            repair_to_walkable(&grid, GridCoord::new(0, 0), 6),
            Some(GridCoord::new(29, 0))
        );
    }

    #[test]
    fn test_unrepaired_blocked_start_fails() {
        let mut grid = open_grid(5, 5);
        grid.set_cell(2, 2, false);
        // A radius of 1 visits only the start itself, so the repair gives up.
        let pathfinder = Pathfinder::new(PathfindingConfig {
            repair_radius: 1,
            ..PathfindingConfig::default()
        });
        let (path, stats) = pathfinder.find_cell_path_with_stats(&grid, GridCoord::new(2, 2), GridCoord::new(4, 4));
        assert!(path.is_empty());
        assert_eq!(stats.start, GridCoord::new(2, 2));
        assert_eq!(stats.outcome, PathOutcome::Unreachable);
        assert_eq!(stats.expansions, 0);

        // The default radius repairs the same start and finds a way out.
        let (path, stats) =
            Pathfinder::default().find_cell_path_with_stats(&grid, GridCoord::new(2, 2), GridCoord::new(4, 4));
        assert_eq!(stats.outcome, PathOutcome::Found);
        assert!(stats.start_repaired);
        assert!(!path.contains(&GridCoord::new(2, 2)));
    }

    #[test]
    fn test_budget_caps_expansions() {
        let grid = open_grid(20, 20);
        let (_, stats) = Pathfinder::default().find_cell_path_with_stats(
            &grid,
            GridCoord::new(0, 0),
            GridCoord::new(19, 19),
        );
        assert_eq!(stats.outcome, PathOutcome::Found);
        assert!(stats.expansions <= grid.len());
    }

    #[test]
    fn test_smoothing_is_opt_in() {
        let grid = open_grid(6, 6);
        let raw = Pathfinder::default().find_path(&grid, grid.grid_to_world(0, 0), grid.grid_to_world(5, 5));
        assert_eq!(raw.len(), 10);

        let smoothed = Pathfinder::new(PathfindingConfig {
            smoothing: Some(SmoothingConfig::default()),
            ..PathfindingConfig::default()
        })
        .find_path(&grid, grid.grid_to_world(0, 0), grid.grid_to_world(5, 5));
        assert!(smoothed.len() < raw.len());
        assert_eq!(smoothed.last(), raw.last());
    }

    #[test]
    fn test_smoothing_starts_from_repaired_start() {
        let mut grid = open_grid(6, 1);
        grid.set_cell(0, 0, false);
        let pathfinder = Pathfinder::new(PathfindingConfig {
            smoothing: Some(SmoothingConfig::default()),
            ..PathfindingConfig::default()
        });
        // The blocked start repairs to (1,0), which sees straight down the corridor.
        let path = pathfinder.find_path(&grid, grid.grid_to_world(0, 0), grid.grid_to_world(5, 0));
        assert_eq!(path, vec![grid.grid_to_world(5, 0)]);
    }
}
