//! Vector and coordinate types for grid-space positions.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// 2D vector type for proxy, device and anchor positions and for force vectors.
///
/// This is a simple alias for `nalgebra::Vector2<f32>`, measured in grid units
/// (one unit per cell, `y` growing downwards like the grid rows).
pub type Vec2 = Vector2<f32>;

/// Integer cell coordinate on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellPos {
    pub x: i32,
    pub y: i32,
}

impl CellPos {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Cell containing a real-valued grid position (truncating toward zero)
    #[inline]
    pub fn from_truncated(p: Vec2) -> Self {
        Self::new(p.x as i32, p.y as i32)
    }

    /// Cell centre as a real-valued position
    #[inline]
    pub fn as_vec2(self) -> Vec2 {
        Vec2::new(self.x as f32, self.y as f32)
    }
}
