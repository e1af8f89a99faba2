//! Haptic coupling configuration
//!
//! Defaults reproduce the reference rig: a Hapkit-style 1-DOF handle on the X
//! rail, 500 grid units per meter of handle travel, ±8 cm of travel.

use crate::core_types::{Meters, Vec2};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Which input model drives the device position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ControlMode {
    /// Device constrained to a rail through the anchor
    #[default]
    OneDof,
    /// Device follows the 2D input target directly
    TwoDof,
}

/// Rail direction used in 1-DOF mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RailAxis {
    #[default]
    X,
    Y,
}

impl RailAxis {
    /// Component of `v` along this axis
    #[inline]
    pub fn component(self, v: Vec2) -> f32 {
        match self {
            RailAxis::X => v.x,
            RailAxis::Y => v.y,
        }
    }

    /// Unit vector along this axis
    #[inline]
    pub fn unit(self) -> Vec2 {
        match self {
            RailAxis::X => Vec2::new(1.0, 0.0),
            RailAxis::Y => Vec2::new(0.0, 1.0),
        }
    }
}

/// Tunable parameters of the haptic coupling engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HapticConfig {
    pub mode: ControlMode,
    pub axis: RailAxis,
    /// Proxy footprint radius (grid units); also the resistance probe radius
    pub radius: f32,
    /// Multiplies the filtered resistance when deriving viscosity
    pub friction_coefficient: f32,
    /// Grid units per meter of handle travel
    pub hapkit_scale: f32,
    /// Spring constant between proxy and device
    pub spring_stiffness: f32,
    /// Low-pass factor α for resistance (1.0 disables filtering)
    pub smoothing: f32,
    /// Force magnitudes below this are reported as zero
    pub dead_zone: f32,
    /// Symmetric clamp on the 1-DOF handle position
    pub input_limit: Meters,
    /// Chebyshev radius searched for a vacancy when displacing a cell
    pub displacement_search_radius: u32,
    /// Anchor, proxy and device position on creation (grid units)
    pub initial_anchor: Vec2,
}

impl Default for HapticConfig {
    fn default() -> Self {
        Self {
            mode: ControlMode::OneDof,
            axis: RailAxis::X,
            radius: 4.0,
            friction_coefficient: 5.0,
            hapkit_scale: 500.0,
            spring_stiffness: 0.5,
            smoothing: 0.2,
            dead_zone: 0.025,
            input_limit: Meters::new(0.08),
            displacement_search_radius: 3,
            initial_anchor: Vec2::new(30.0, 30.0),
        }
    }
}

impl HapticConfig {
    /// Check every precondition the coupling relies on
    ///
    /// # Errors
    ///
    /// Returns the first violated precondition: non-positive radius, friction,
    /// scale, stiffness or input limit; smoothing outside `(0, 1]`; negative
    /// dead-zone; zero search radius; non-finite anchor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::check_positive("radius", self.radius)?;
        ConfigError::check_positive("friction_coefficient", self.friction_coefficient)?;
        ConfigError::check_positive("hapkit_scale", self.hapkit_scale)?;
        ConfigError::check_positive("spring_stiffness", self.spring_stiffness)?;
        ConfigError::check_positive("input_limit", *self.input_limit)?;
        ConfigError::check_non_negative("dead_zone", self.dead_zone)?;
        if !(self.smoothing > 0.0 && self.smoothing <= 1.0) {
            return Err(ConfigError::OutOfRange {
                name: "smoothing",
                value: self.smoothing,
                min: 0.0,
                max: 1.0,
            });
        }
        if self.displacement_search_radius == 0 {
            return Err(ConfigError::Zero {
                name: "displacement_search_radius",
            });
        }
        if !(self.initial_anchor.x.is_finite() && self.initial_anchor.y.is_finite()) {
            return Err(ConfigError::NotFinite {
                name: "initial_anchor",
            });
        }
        Ok(())
    }

    /// Handle travel limit expressed in grid units
    pub fn travel_limit_grid_units(&self) -> f32 {
        *self.input_limit * self.hapkit_scale
    }
}
