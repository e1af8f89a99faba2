//! Material rule engine
//!
//! One pass visits every cell bottom row first, left to right within a row,
//! and applies the rule for the material found there at visit time. The
//! visiting order is load-bearing: lower rows are settled before the cells
//! above them look down, so nothing falls more than one row per pass. Do not
//! reorder or parallelise the scan.
//!
//! Every mutation goes through [`SandGrid::try_move`], [`SandGrid::swap`] or,
//! for the wetting reaction only, [`SandGrid::set`].

mod tie_break;

pub use tie_break::{FixedTieBreak, RandomTieBreak, TieBreak};

use crate::core_types::Material;
use crate::error::ConfigError;
use crate::grid::SandGrid;

/// Neighbours inspected by the wetting reaction, in priority order:
/// below, right, left, above, the four diagonals, then two rows below.
const WETTING_OFFSETS: [(i32, i32); 9] = [
    (0, 1),
    (1, 0),
    (-1, 0),
    (0, -1),
    (1, 1),
    (-1, 1),
    (1, -1),
    (-1, -1),
    (0, 2),
];

/// Applies the Sand, `WetSand` and Water transition rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleEngine {
    soak_threshold: u8,
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self {
            soak_threshold: Self::DEFAULT_SOAK_THRESHOLD,
        }
    }
}

impl RuleEngine {
    /// Water increments a wet sand cell can absorb before saturating
    pub const DEFAULT_SOAK_THRESHOLD: u8 = 2;

    /// # Errors
    ///
    /// Returns [`ConfigError::Zero`] when `soak_threshold` is zero (freshly
    /// wetted sand already carries one increment).
    pub fn new(soak_threshold: u8) -> Result<Self, ConfigError> {
        if soak_threshold == 0 {
            return Err(ConfigError::Zero {
                name: "soak_threshold",
            });
        }
        Ok(Self { soak_threshold })
    }

    #[inline]
    pub fn soak_threshold(&self) -> u8 {
        self.soak_threshold
    }

    /// Run one full update pass over the grid
    pub fn step<T: TieBreak + ?Sized>(&self, grid: &mut SandGrid, tie: &mut T) {
        let width = grid.width() as i32;
        let height = grid.height() as i32;
        for y in (0..height).rev() {
            for x in 0..width {
                self.update_cell(grid, x, y, tie);
            }
        }
    }

    /// Apply the rule for whatever material currently occupies `(x, y)`
    pub fn update_cell<T: TieBreak + ?Sized>(
        &self,
        grid: &mut SandGrid,
        x: i32,
        y: i32,
        tie: &mut T,
    ) {
        if !grid.in_bounds(x, y) {
            return;
        }
        match grid.material(x, y) {
            Material::Empty => {}
            Material::Sand => update_sand(grid, x, y, tie),
            Material::WetSand => update_wet_sand(grid, x, y),
            Material::Water => self.update_water(grid, x, y, tie),
        }
    }

    fn update_water<T: TieBreak + ?Sized>(&self, grid: &mut SandGrid, x: i32, y: i32, tie: &mut T) {
        if self.try_wet_sand(grid, x, y) {
            return;
        }

        if grid.is_vacant(x, y + 1) {
            grid.try_move(x, y, x, y + 1);
        } else if let Some(tx) = pick_vacancy(grid, x, y + 1, tie) {
            grid.try_move(x, y, tx, y + 1);
        } else if let Some(tx) = pick_vacancy(grid, x, y, tie) {
            // Blocked below: spread sideways on the same row. Water resting on
            // the floor row spreads too instead of staying in place.
            grid.try_move(x, y, tx, y);
        }
    }

    /// Wetting reaction for the water cell at `(wx, wy)`
    ///
    /// The first neighbour (in [`WETTING_OFFSETS`] order) that is dry sand, or
    /// unsaturated wet sand, absorbs the water. Saturated wet sand directly or
    /// diagonally above the water trades places with it instead. Returns
    /// whether a reaction occurred.
    pub fn try_wet_sand(&self, grid: &mut SandGrid, wx: i32, wy: i32) -> bool {
        for (dx, dy) in WETTING_OFFSETS {
            let sx = wx + dx;
            let sy = wy + dy;
            if !grid.in_bounds(sx, sy) {
                continue;
            }

            let cell = grid.get(sx, sy);
            match cell.material() {
                Material::Sand => {
                    grid.set(sx, sy, Material::WetSand, 1);
                    grid.set(wx, wy, Material::Empty, 0);
                    return true;
                }
                Material::WetSand if cell.soak() < self.soak_threshold => {
                    grid.set(sx, sy, Material::WetSand, cell.soak() + 1);
                    grid.set(wx, wy, Material::Empty, 0);
                    return true;
                }
                Material::WetSand if sy < wy => {
                    grid.swap(wx, wy, sx, sy);
                    return true;
                }
                _ => {}
            }
        }
        false
    }
}

fn update_sand<T: TieBreak + ?Sized>(grid: &mut SandGrid, x: i32, y: i32, tie: &mut T) {
    match grid.material(x, y + 1) {
        Material::Water => {
            grid.swap(x, y, x, y + 1);
        }
        Material::Empty => {
            grid.try_move(x, y, x, y + 1);
        }
        _ => {
            if let Some(tx) = pick_vacancy(grid, x, y + 1, tie) {
                grid.try_move(x, y, tx, y + 1);
            }
        }
    }
}

/// Wet sand is cohesive: it only falls straight down or sinks through water
fn update_wet_sand(grid: &mut SandGrid, x: i32, y: i32) {
    match grid.material(x, y + 1) {
        Material::Empty => {
            grid.try_move(x, y, x, y + 1);
        }
        Material::Water => {
            grid.swap(x, y, x, y + 1);
        }
        _ => {}
    }
}

/// Column of the vacant cell beside `x` on row `row`, asking the tie-break
/// only when both sides are vacant
fn pick_vacancy<T: TieBreak + ?Sized>(grid: &SandGrid, x: i32, row: i32, tie: &mut T) -> Option<i32> {
    let left = grid.is_vacant(x - 1, row);
    let right = grid.is_vacant(x + 1, row);
    match (left, right) {
        (true, true) => Some(x + tie.pick_offset()),
        (true, false) => Some(x - 1),
        (false, true) => Some(x + 1),
        (false, false) => None,
    }
}
