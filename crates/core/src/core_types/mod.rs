//! Core types and utilities

pub mod material;
pub mod units;
pub mod vec2;

pub use material::*;
pub use units::*;
pub use vec2::{CellPos, Vec2};
