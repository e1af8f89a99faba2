//! Grid store and the spatial queries built on it

pub mod resistance;
pub mod sand_grid;

// Re-export main types
pub use resistance::ResistanceWeights;
pub use sand_grid::{SandGrid, BOUNDARY_CELL, MAX_DIMENSION};
