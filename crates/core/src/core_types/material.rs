//! Materials and grid cells
//!
//! The material set is closed: every rule, weight and colour is a `match` over
//! [`Material`], never a trait object.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Material occupying a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Material {
    /// Vacant cell, the only valid `Move` destination
    #[default]
    Empty,
    /// Dry granular material, cascades diagonally
    Sand,
    /// Sand that has absorbed water, falls straight down only
    WetSand,
    /// Fluid, spreads sideways when it cannot fall
    Water,
}

impl Material {
    /// All materials in declaration order
    pub const ALL: [Material; 4] = [
        Material::Empty,
        Material::Sand,
        Material::WetSand,
        Material::Water,
    ];

    #[inline]
    pub fn is_empty(self) -> bool {
        self == Material::Empty
    }

    /// Short lowercase name, also accepted by [`FromStr`]
    pub fn name(self) -> &'static str {
        match self {
            Material::Empty => "empty",
            Material::Sand => "sand",
            Material::WetSand => "wet",
            Material::Water => "water",
        }
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a material name is not recognised
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown material '{0}' (expected empty, sand, wet or water)")]
pub struct UnknownMaterial(pub String);

impl FromStr for Material {
    type Err = UnknownMaterial;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "empty" | "erase" | "none" => Ok(Material::Empty),
            "sand" | "dry" => Ok(Material::Sand),
            "wet" | "wetsand" | "wet_sand" => Ok(Material::WetSand),
            "water" | "h2o" => Ok(Material::Water),
            _ => Err(UnknownMaterial(s.to_string())),
        }
    }
}

/// A single grid cell
///
/// `soak` counts absorbed water increments and is only meaningful for
/// [`Material::WetSand`]; it is always zero for every other material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Cell {
    material: Material,
    soak: u8,
}

impl Cell {
    /// Vacant cell
    pub const EMPTY: Cell = Cell {
        material: Material::Empty,
        soak: 0,
    };

    /// Create a cell, dropping `soak` unless the material is wet sand
    #[inline]
    pub const fn new(material: Material, soak: u8) -> Self {
        let soak = match material {
            Material::WetSand => soak,
            _ => 0,
        };
        Cell { material, soak }
    }

    #[inline]
    pub const fn material(&self) -> Material {
        self.material
    }

    #[inline]
    pub const fn soak(&self) -> u8 {
        self.soak
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.material.is_empty()
    }
}

impl From<Material> for Cell {
    fn from(material: Material) -> Self {
        Cell::new(material, 0)
    }
}

/// Number of occupied cells per material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MaterialCounts {
    pub sand: usize,
    pub wet_sand: usize,
    pub water: usize,
}

impl MaterialCounts {
    /// Count one more cell of `material` (Empty is ignored)
    pub fn record(&mut self, material: Material) {
        match material {
            Material::Empty => {}
            Material::Sand => self.sand += 1,
            Material::WetSand => self.wet_sand += 1,
            Material::Water => self.water += 1,
        }
    }

    /// Total number of occupied cells
    pub fn total(&self) -> usize {
        self.sand + self.wet_sand + self.water
    }
}

impl fmt::Display for MaterialCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sand={} wet={} water={}",
            self.sand, self.wet_sand, self.water
        )
    }
}
