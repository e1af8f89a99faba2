//! Resistance field and vacancy search
//!
//! Both queries are read-only views over a [`SandGrid`]. Resistance is a
//! material-weighted cell count inside a disc; the vacancy search walks square
//! rings outward from a target cell and is what keeps displaced matter from
//! ever overlapping occupied cells.

use super::SandGrid;
use crate::core_types::{Cell, CellPos, Material};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Per-material contribution to the resistance sum
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResistanceWeights {
    /// Dry sand weight
    pub sand: f32,
    /// Wet sand weight before any soak
    pub wet_sand: f32,
    /// Extra wet sand weight per absorbed water increment
    pub wet_sand_per_soak: f32,
    /// Water weight
    pub water: f32,
}

impl Default for ResistanceWeights {
    fn default() -> Self {
        Self {
            sand: 0.1,
            wet_sand: 0.1,
            wet_sand_per_soak: 0.02,
            water: 0.02,
        }
    }
}

impl ResistanceWeights {
    /// Weight contributed by a single cell
    #[inline]
    pub fn weight(&self, cell: Cell) -> f32 {
        match cell.material() {
            Material::Empty => 0.0,
            Material::Sand => self.sand,
            Material::WetSand => self.wet_sand + f32::from(cell.soak()) * self.wet_sand_per_soak,
            Material::Water => self.water,
        }
    }

    /// Check every weight is finite and non-negative
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Negative`] naming the first offending weight.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::check_non_negative("resistance.sand", self.sand)?;
        ConfigError::check_non_negative("resistance.wet_sand", self.wet_sand)?;
        ConfigError::check_non_negative("resistance.wet_sand_per_soak", self.wet_sand_per_soak)?;
        ConfigError::check_non_negative("resistance.water", self.water)
    }
}

impl SandGrid {
    /// Sum of material weights over every in-bounds cell whose centre lies
    /// within `radius` of `(cx, cy)` (inclusive)
    ///
    /// Cells outside the grid are skipped rather than read as the solid
    /// boundary so that probing near an edge is not inflated.
    pub fn resistance(&self, cx: f32, cy: f32, radius: f32, weights: &ResistanceWeights) -> f32 {
        if !(cx.is_finite() && cy.is_finite() && radius.is_finite()) || radius < 0.0 {
            return 0.0;
        }
        let r2 = radius * radius;

        // Clip the bounding box to the grid before iterating
        let min_x = ((cx - radius).floor() as i64).max(0);
        let max_x = ((cx + radius).ceil() as i64).min(self.width() as i64 - 1);
        let min_y = ((cy - radius).floor() as i64).max(0);
        let max_y = ((cy + radius).ceil() as i64).min(self.height() as i64 - 1);

        let mut total = 0.0;
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let dx = x as f32 - cx;
                let dy = y as f32 - cy;
                if dx * dx + dy * dy <= r2 {
                    total += weights.weight(self.get(x as i32, y as i32));
                }
            }
        }
        total
    }

    /// Nearest in-bounds Empty cell to a target, searching square rings of
    /// Chebyshev radius `1..=max_radius`
    ///
    /// The target itself is returned when it is vacant. Each ring visits only
    /// its perimeter, row-major. Returns `None` when nothing within
    /// `max_radius` is vacant.
    pub fn find_nearest_empty(&self, target_x: i32, target_y: i32, max_radius: u32) -> Option<CellPos> {
        if self.is_vacant(target_x, target_y) {
            return Some(CellPos::new(target_x, target_y));
        }
        let max_radius = max_radius.min(i32::MAX as u32) as i32;
        for r in 1..=max_radius {
            for dy in -r..=r {
                let edge_row = dy.abs() == r;
                // Interior rows only contribute their two end cells
                let step = if edge_row { 1 } else { (2 * r) as usize };
                for dx in (-r..=r).step_by(step) {
                    let nx = target_x.saturating_add(dx);
                    let ny = target_y.saturating_add(dy);
                    if self.is_vacant(nx, ny) {
                        return Some(CellPos::new(nx, ny));
                    }
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn grid() -> SandGrid {
        SandGrid::new(20, 20).unwrap()
    }

    #[test]
    fn test_empty_neighbourhood_has_zero_resistance() {
        let g = grid();
        assert_eq!(g.resistance(10.0, 10.0, 4.0, &ResistanceWeights::default()), 0.0);
    }

    #[test]
    fn test_weights_per_material() {
        let w = ResistanceWeights::default();
        assert_relative_eq!(w.weight(Cell::EMPTY), 0.0);
        assert_relative_eq!(w.weight(Cell::new(Material::Sand, 0)), 0.1);
        assert_relative_eq!(w.weight(Cell::new(Material::WetSand, 0)), 0.1);
        assert_relative_eq!(w.weight(Cell::new(Material::WetSand, 2)), 0.14, epsilon = 1e-6);
        assert_relative_eq!(w.weight(Cell::new(Material::Water, 0)), 0.02);
    }

    #[test]
    fn test_resistance_sums_cells_inside_disc() {
        let mut g = grid();
        let w = ResistanceWeights::default();
        g.set(10, 10, Material::Sand, 0);
        g.set(12, 10, Material::WetSand, 1);
        g.set(10, 8, Material::Water, 0);
        // Outside radius 2 (distance sqrt(8))
        g.set(12, 12, Material::Sand, 0);
        assert_relative_eq!(g.resistance(10.0, 10.0, 2.0, &w), 0.1 + 0.12 + 0.02, epsilon = 1e-6);
    }

    #[test]
    fn test_resistance_boundary_inclusive() {
        let mut g = grid();
        g.set(13, 10, Material::Sand, 0);
        let w = ResistanceWeights::default();
        assert_relative_eq!(g.resistance(10.0, 10.0, 3.0, &w), 0.1);
        assert_eq!(g.resistance(10.0, 10.0, 2.99, &w), 0.0);
    }

    #[test]
    fn test_resistance_at_edge_skips_outside() {
        let g = grid();
        assert_eq!(g.resistance(0.0, 0.0, 5.0, &ResistanceWeights::default()), 0.0);
        assert_eq!(g.resistance(-50.0, -50.0, 5.0, &ResistanceWeights::default()), 0.0);
    }

    #[test]
    fn test_negative_weight_rejected() {
        let w = ResistanceWeights {
            water: -0.1,
            ..Default::default()
        };
        assert!(matches!(
            w.validate(),
            Err(ConfigError::Negative {
                name: "resistance.water",
                ..
            })
        ));
        assert!(ResistanceWeights::default().validate().is_ok());
    }

    #[test]
    fn test_nearest_empty_returns_target_when_vacant() {
        let g = grid();
        assert_eq!(g.find_nearest_empty(4, 5, 3), Some(CellPos::new(4, 5)));
    }

    #[test]
    fn test_nearest_empty_scans_ring_row_major() {
        let mut g = grid();
        g.set(5, 5, Material::Sand, 0);
        // First perimeter cell of ring 1 is the top-left corner
        assert_eq!(g.find_nearest_empty(5, 5, 3), Some(CellPos::new(4, 4)));

        g.set(4, 4, Material::Sand, 0);
        g.set(5, 4, Material::Sand, 0);
        assert_eq!(g.find_nearest_empty(5, 5, 3), Some(CellPos::new(6, 4)));
    }

    #[test]
    fn test_nearest_empty_prefers_smaller_ring() {
        let mut g = grid();
        for y in 3..=7 {
            for x in 3..=7 {
                g.set(x, y, Material::Sand, 0);
            }
        }
        // Ring 1 and ring 2 are full, ring 3 starts at (2, 2)
        assert_eq!(g.find_nearest_empty(5, 5, 1), None);
        assert_eq!(g.find_nearest_empty(5, 5, 2), None);
        assert_eq!(g.find_nearest_empty(5, 5, 3), Some(CellPos::new(2, 2)));
    }

    #[test]
    fn test_nearest_empty_ignores_out_of_bounds() {
        let mut g = SandGrid::new(3, 3).unwrap();
        for y in 0..3 {
            for x in 0..3 {
                g.set(x, y, Material::Water, 0);
            }
        }
        assert_eq!(g.find_nearest_empty(1, 1, 10), None);
        g.set(2, 2, Material::Empty, 0);
        assert_eq!(g.find_nearest_empty(-2, -2, 4), Some(CellPos::new(2, 2)));
    }

    #[test]
    fn test_ring_perimeter_visits_each_cell_once() {
        // Ring 2 around the centre of a full 5x5 grid holds 16 cells; vacate
        // only the last one in row-major order.
        let mut g = SandGrid::new(5, 5).unwrap();
        for y in 0..5 {
            for x in 0..5 {
                g.set(x, y, Material::Sand, 0);
            }
        }
        g.set(4, 4, Material::Empty, 0);
        assert_eq!(g.find_nearest_empty(2, 2, 1), None);
        assert_eq!(g.find_nearest_empty(2, 2, 2), Some(CellPos::new(4, 4)));
    }
}
