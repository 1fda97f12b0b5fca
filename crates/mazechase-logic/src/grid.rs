//! Static occupancy grid and the world ↔ grid affine mapping.
//!
//! The grid is `width × height` booleans (true = walkable) laid over the XZ
//! plane and centred on `origin`:
//!
//! ```text
//! wx = origin.x + (x - width/2)  * cell_size
//! wz = origin.z + (z - height/2) * cell_size
//! wy = origin.y
//! ```
//!
//! `width/2` and `height/2` use integer division. Grid → world is exact;
//! world → grid rounds to the nearest cell and may produce coordinates outside
//! the grid. Every query on an out-of-range coordinate answers "not walkable".
//!
//! ```
//! use mazechase_logic::grid::{GridCoord, GridModel};
//! use mazechase_logic::geometry::Vec3;
//!
//! let grid = GridModel::from_ascii(
//!     "#####\n\
//!      #...#\n\
//!      ######",
//!     1.0,
//!     Vec3::ZERO,
//! ).unwrap();
//! assert!(grid.is_walkable(1, 1));
//! assert!(!grid.is_walkable(0, 1));
//! assert!(!grid.is_walkable(-3, 40));
//! let center = grid.grid_to_world(3, 1);
//! assert_eq!(grid.world_to_grid(center), GridCoord::new(3, 1));
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::Vec3;

/// Integer cell coordinate. May lie outside the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoord {
    pub x: i32,
    pub z: i32,
}

impl GridCoord {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Manhattan distance `|Δx| + |Δz|`.
    pub fn manhattan(&self, other: &Self) -> u32 {
        self.x.abs_diff(other.x) + self.z.abs_diff(other.z)
    }

    pub fn offset(&self, dx: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.z + dz)
    }
}

impl std::fmt::Display for GridCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// The four axis-aligned neighbour offsets, in expansion order.
pub const DIRECTIONS: [(i32, i32); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

/// Errors raised while constructing a grid.
#[derive(Debug, Error, PartialEq)]
pub enum GridError {
    #[error("grid dimensions must be non-zero, got {width}x{height}")]
    ZeroDimensions { width: usize, height: usize },
    #[error("cell size must be positive and finite, got {0}")]
    InvalidCellSize(f32),
    #[error("expected {expected} cells, found {found}")]
    CellCountMismatch { expected: usize, found: usize },
    #[error("layout has no rows")]
    EmptyLayout,
    #[error("row {row} has {found} columns, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown tile {ch:?} at row {row}, column {col}")]
    InvalidTile { ch: char, row: usize, col: usize },
}

/// Occupancy grid with its world mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridModel {
    width: usize,
    height: usize,
    cell_size: f32,
    origin: Vec3,
    cells: Vec<bool>,
}

impl GridModel {
    /// Create a fully walkable grid.
    pub fn new(width: usize, height: usize, cell_size: f32, origin: Vec3) -> Result<Self, GridError> {
        Self::from_cells(width, height, cell_size, origin, vec![true; width * height])
    }

    /// Create a grid from a row-major (`z * width + x`) cell vector.
    pub fn from_cells(
        width: usize,
        height: usize,
        cell_size: f32,
        origin: Vec3,
        cells: Vec<bool>,
    ) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::ZeroDimensions { width, height });
        }
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(GridError::InvalidCellSize(cell_size));
        }
        if cells.len() != width * height {
            return Err(GridError::CellCountMismatch {
                expected: width * height,
                found: cells.len(),
            });
        }
        Ok(Self {
            width,
            height,
            cell_size,
            origin,
            cells,
        })
    }

    /// Parse a top-down layout: `#` is blocked, `.` is walkable.
    ///
    /// The first text row is the highest `z` (north up). Blank lines and
    /// surrounding whitespace are ignored.
    pub fn from_ascii(layout: &str, cell_size: f32, origin: Vec3) -> Result<Self, GridError> {
        let rows: Vec<&str> = layout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        if rows.is_empty() {
            return Err(GridError::EmptyLayout);
        }
        let width = rows[0].chars().count();
        let height = rows.len();
        let mut cells = vec![false; width * height];

        for (row, line) in rows.iter().enumerate() {
            let found = line.chars().count();
            if found != width {
                return Err(GridError::RaggedRow {
                    row,
                    expected: width,
                    found,
                });
            }
            let z = height - 1 - row;
            for (col, ch) in line.chars().enumerate() {
                cells[z * width + col] = match ch {
                    '.' => true,
                    '#' => false,
                    _ => return Err(GridError::InvalidTile { ch, row, col }),
                };
            }
        }

        Self::from_cells(width, height, cell_size, origin, cells)
    }

    /// Render the grid in the same format `from_ascii` reads.
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for z in (0..self.height).rev() {
            for x in 0..self.width {
                out.push(if self.cells[z * self.width + x] { '.' } else { '#' });
            }
            out.push('\n');
        }
        out
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn is_valid(&self, x: i32, z: i32) -> bool {
        x >= 0 && z >= 0 && (x as usize) < self.width && (z as usize) < self.height
    }

    /// False for blocked cells and for anything outside the grid.
    pub fn is_walkable(&self, x: i32, z: i32) -> bool {
        self.index(x, z).map(|i| self.cells[i]).unwrap_or(false)
    }

    pub fn is_walkable_at(&self, coord: GridCoord) -> bool {
        self.is_walkable(coord.x, coord.z)
    }

    /// Set a single cell. Returns false (and changes nothing) when out of range.
    ///
    /// Paths computed earlier are not touched; callers own that invalidation.
    pub fn set_cell(&mut self, x: i32, z: i32, walkable: bool) -> bool {
        match self.index(x, z) {
            Some(i) => {
                self.cells[i] = walkable;
                true
            }
            None => false,
        }
    }

    /// Mark every cell walkable or blocked.
    pub fn fill(&mut self, walkable: bool) {
        self.cells.iter_mut().for_each(|c| *c = walkable);
    }

    /// Nearest cell by rounding. The result may be out of range.
    pub fn world_to_grid(&self, world: Vec3) -> GridCoord {
        let half_w = (self.width / 2) as i32;
        let half_h = (self.height / 2) as i32;
        let gx = ((world.x - self.origin.x) / self.cell_size).round() as i32 + half_w;
        let gz = ((world.z - self.origin.z) / self.cell_size).round() as i32 + half_h;
        GridCoord::new(gx, gz)
    }

    /// World-space centre of a cell. Defined for out-of-range cells too.
    pub fn grid_to_world(&self, x: i32, z: i32) -> Vec3 {
        let half_w = (self.width / 2) as i32;
        let half_h = (self.height / 2) as i32;
        Vec3::new(
            self.origin.x + (x - half_w) as f32 * self.cell_size,
            self.origin.y,
            self.origin.z + (z - half_h) as f32 * self.cell_size,
        )
    }

    pub fn cell_center(&self, coord: GridCoord) -> Vec3 {
        self.grid_to_world(coord.x, coord.z)
    }

    /// Nearest in-range coordinate.
    pub fn clamp(&self, coord: GridCoord) -> GridCoord {
        GridCoord::new(
            coord.x.clamp(0, self.width as i32 - 1),
            coord.z.clamp(0, self.height as i32 - 1),
        )
    }

    /// In-range four-connected neighbours, walkable or not.
    pub fn neighbors4(&self, coord: GridCoord) -> impl Iterator<Item = GridCoord> + '_ {
        DIRECTIONS
            .iter()
            .map(move |&(dx, dz)| coord.offset(dx, dz))
            .filter(move |c| self.is_valid(c.x, c.z))
    }

    /// All walkable cells in row-major order.
    pub fn walkable_cells(&self) -> Vec<GridCoord> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, &walkable)| walkable)
            .map(|(i, _)| GridCoord::new((i % self.width) as i32, (i / self.width) as i32))
            .collect()
    }

    pub fn walkable_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    pub fn blocked_count(&self) -> usize {
        self.cells.len() - self.walkable_count()
    }

    /// The four extreme cells: (0,0), (w-1,0), (0,h-1), (w-1,h-1).
    pub fn corners(&self) -> [GridCoord; 4] {
        let max_x = self.width as i32 - 1;
        let max_z = self.height as i32 - 1;
        [
            GridCoord::new(0, 0),
            GridCoord::new(max_x, 0),
            GridCoord::new(0, max_z),
            GridCoord::new(max_x, max_z),
        ]
    }

    fn index(&self, x: i32, z: i32) -> Option<usize> {
        if self.is_valid(x, z) {
            Some(z as usize * self.width + x as usize)
        } else {
            None
        }
    }
}
