//! Fixed-size 2D cell store
//!
//! Cells are stored row-major (`y * width + x`). Coordinates are signed so that
//! neighbour offsets can step off the edge: out-of-bounds reads return a solid
//! boundary cell and out-of-bounds writes are ignored, which lets the material
//! rules and the displacement search treat the outside world as impenetrable
//! without special cases.

use crate::core_types::{Cell, CellPos, Material, MaterialCounts};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Largest accepted grid dimension (cells per side)
pub const MAX_DIMENSION: usize = 4096;

/// Cell returned for every out-of-bounds read
pub const BOUNDARY_CELL: Cell = Cell::new(Material::Sand, 0);

/// 2D grid of material cells
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SandGrid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl SandGrid {
    /// Create an empty grid
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidDimension`] if either dimension is zero or
    /// larger than [`MAX_DIMENSION`].
    pub fn new(width: usize, height: usize) -> Result<Self, ConfigError> {
        validate_dimensions(width, height)?;
        info!("Creating {}x{} sand grid", width, height);
        Ok(Self {
            width,
            height,
            cells: vec![Cell::EMPTY; width * height],
        })
    }

    /// Reallocate to new dimensions; every cell is cleared
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidDimension`] for invalid dimensions, in
    /// which case the grid is left untouched.
    pub fn resize(&mut self, width: usize, height: usize) -> Result<(), ConfigError> {
        validate_dimensions(width, height)?;
        info!(
            "Resizing sand grid {}x{} -> {}x{}",
            self.width, self.height, width, height
        );
        self.width = width;
        self.height = height;
        self.cells.clear();
        self.cells.resize(width * height, Cell::EMPTY);
        Ok(())
    }

    /// Reset every cell to Empty
    pub fn clear(&mut self) {
        self.cells.fill(Cell::EMPTY);
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if self.in_bounds(x, y) {
            Some(y as usize * self.width + x as usize)
        } else {
            None
        }
    }

    /// Read a cell; out-of-bounds coordinates yield [`BOUNDARY_CELL`]
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Cell {
        match self.index(x, y) {
            Some(i) => self.cells[i],
            None => BOUNDARY_CELL,
        }
    }

    /// Material at a coordinate (boundary material when out of bounds)
    #[inline]
    pub fn material(&self, x: i32, y: i32) -> Material {
        self.get(x, y).material()
    }

    /// True only for in-bounds Empty cells
    #[inline]
    pub fn is_vacant(&self, x: i32, y: i32) -> bool {
        self.index(x, y).is_some_and(|i| self.cells[i].is_empty())
    }

    /// Overwrite a cell. Out-of-bounds writes are ignored.
    ///
    /// `soak` is dropped for every material except wet sand. No material
    /// transition side effects are triggered.
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, material: Material, soak: u8) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = Cell::new(material, soak);
        }
    }

    /// Move the cell at `(x1, y1)` into `(x2, y2)` if the destination is Empty
    ///
    /// Returns `false` without touching the grid when either coordinate is out
    /// of bounds or the destination is occupied. On success the source becomes
    /// Empty.
    pub fn try_move(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) -> bool {
        let (Some(src), Some(dst)) = (self.index(x1, y1), self.index(x2, y2)) else {
            return false;
        };
        if !self.cells[dst].is_empty() {
            return false;
        }
        self.cells[dst] = self.cells[src];
        self.cells[src] = Cell::EMPTY;
        true
    }

    /// Exchange two cells unconditionally
    ///
    /// Returns `false` without touching the grid when either coordinate is out
    /// of bounds.
    pub fn swap(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) -> bool {
        let (Some(a), Some(b)) = (self.index(x1, y1), self.index(x2, y2)) else {
            return false;
        };
        self.cells.swap(a, b);
        true
    }

    /// Iterate over every non-Empty cell in row-major order
    pub fn occupied(&self) -> impl Iterator<Item = (CellPos, Cell)> + '_ {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| !cell.is_empty())
            .map(move |(i, cell)| (CellPos::new((i % width) as i32, (i / width) as i32), *cell))
    }

    /// Count occupied cells per material
    pub fn material_counts(&self) -> MaterialCounts {
        let mut counts = MaterialCounts::default();
        for cell in &self.cells {
            counts.record(cell.material());
        }
        counts
    }

    /// Row-major view of all cells
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }
}

pub(crate) fn validate_dimensions(width: usize, height: usize) -> Result<(), ConfigError> {
    for (name, value) in [("width", width), ("height", height)] {
        if value == 0 || value > MAX_DIMENSION {
            return Err(ConfigError::InvalidDimension {
                name,
                value,
                max: MAX_DIMENSION,
            });
        }
    }
    Ok(())
}
