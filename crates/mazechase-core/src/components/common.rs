//! Spatial components shared by every moving entity.

use mazechase_logic::grid::{GridCoord, GridModel};
use serde::{Deserialize, Serialize};

pub use mazechase_logic::geometry::Vec3;

/// Where an entity is: continuous world position plus the cell it rounds to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// World-space position
    pub world: Vec3,
    /// Nearest grid cell (may be off-grid if the entity strayed outside)
    pub cell: GridCoord,
}

impl Position {
    /// Place an entity on the centre of a cell
    pub fn at_cell(grid: &GridModel, cell: GridCoord) -> Self {
        Self {
            world: grid.cell_center(cell),
            cell,
        }
    }

    /// Move to a new world position and refresh the cell
    pub fn set_world(&mut self, grid: &GridModel, world: Vec3) {
        self.world = world;
        self.cell = grid.world_to_grid(world);
    }

    /// Report `fallback` instead of a rounded cell that is blocked
    pub fn settle(&mut self, grid: &GridModel, fallback: Option<GridCoord>) {
        if grid.is_walkable_at(self.cell) {
            return;
        }
        if let Some(cell) = fallback {
            self.cell = cell;
        }
    }
}
