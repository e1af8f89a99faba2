//! Render-ready view of a sandbox frame
//!
//! Front ends (terminal, GUI, remote viewer) draw from a [`FrameSnapshot`]
//! instead of borrowing the live grid, so rendering never holds the sandbox.

use crate::core_types::{Cell, Material, Newtons, Vec2};
use crate::haptics::{ControlMode, RailAxis};
use serde::Serialize;

/// RGBA colour, 8 bits per channel
pub type Rgba = [u8; 4];

pub const SAND_COLOR: Rgba = [235, 200, 100, 255];
pub const WET_SAND_COLOR: Rgba = [160, 130, 70, 255];
pub const SATURATED_SAND_COLOR: Rgba = [100, 80, 40, 255];
pub const WATER_COLOR: Rgba = [0, 120, 255, 200];
pub const EMPTY_COLOR: Rgba = [0, 0, 0, 0];

/// Display colour of a cell
///
/// Wet sand darkens once its soak reaches `soak_threshold`.
pub fn cell_color(cell: Cell, soak_threshold: u8) -> Rgba {
    match cell.material() {
        Material::Empty => EMPTY_COLOR,
        Material::Sand => SAND_COLOR,
        Material::WetSand if cell.soak() >= soak_threshold => SATURATED_SAND_COLOR,
        Material::WetSand => WET_SAND_COLOR,
        Material::Water => WATER_COLOR,
    }
}

/// One occupied cell
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CellSample {
    pub x: i32,
    pub y: i32,
    pub material: Material,
    pub soak: u8,
    pub color: Rgba,
}

/// Grid contents plus the haptic overlay for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameSnapshot {
    pub width: usize,
    pub height: usize,
    /// Non-Empty cells, row-major
    pub cells: Vec<CellSample>,
    pub proxy: Vec2,
    pub device: Vec2,
    pub anchor: Vec2,
    pub mode: ControlMode,
    pub axis: RailAxis,
    pub radius: f32,
    pub force: Vec2,
    pub force_1d: Newtons,
    pub smoothed_resistance: f32,
    pub simulation_ticks: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette() {
        assert_eq!(cell_color(Cell::EMPTY, 2), EMPTY_COLOR);
        assert_eq!(cell_color(Cell::new(Material::Sand, 0), 2), SAND_COLOR);
        assert_eq!(cell_color(Cell::new(Material::Water, 0), 2), WATER_COLOR);
        assert_eq!(cell_color(Cell::new(Material::WetSand, 1), 2), WET_SAND_COLOR);
        assert_eq!(cell_color(Cell::new(Material::WetSand, 2), 2), SATURATED_SAND_COLOR);
    }
}
