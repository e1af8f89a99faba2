//! Proxy/device coupling through the granular medium
//!
//! Each haptic tick:
//! 1. maps the input onto a device position (rail projection in 1-DOF mode),
//! 2. low-pass filters the resistance measured around the *proxy*,
//! 3. moves the proxy toward the device, damped by `1 / (1 + R·μ)`,
//! 4. pushes grid matter out of the proxy footprint,
//! 5. derives a spring force pulling the device back toward the proxy.
//!
//! The update is explicit; for viscosity in `(0, 1]` it cannot overshoot.

use super::config::{ControlMode, HapticConfig, RailAxis};
use super::input::HapticInput;
use crate::core_types::{CellPos, Meters, Newtons, Vec2};
use crate::error::ConfigError;
use crate::grid::{ResistanceWeights, SandGrid};
use serde::{Deserialize, Serialize};
use tracing::{info, trace};

/// Offsets shorter than this push straight up instead of along the offset
const PUSH_EPSILON: f32 = 0.01;

/// Distance beyond the proxy surface at which displaced matter is re-seated
const PUSH_CLEARANCE: f32 = 1.5;

/// What happened during one haptic tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HapticTick {
    /// Unfiltered resistance around the proxy
    pub raw_resistance: f32,
    /// Resistance after the low-pass filter
    pub smoothed_resistance: f32,
    /// Fraction of the proxy-device gap closed this tick
    pub viscosity: f32,
    /// Cells moved out of the proxy footprint
    pub displaced: usize,
    /// Restoring force vector (grid axes)
    pub force: Vec2,
    /// Force along the rail (zero in 2-DOF mode)
    pub force_1d: Newtons,
}

/// Haptic coupling engine state
#[derive(Debug, Clone, PartialEq)]
pub struct HapticCoupling {
    config: HapticConfig,
    weights: ResistanceWeights,

    proxy: Vec2,
    device: Vec2,
    anchor: Vec2,

    raw_input: Meters,
    smoothed_resistance: f32,
    force: Vec2,
    force_1d: Newtons,
}

impl HapticCoupling {
    /// Create a coupling with proxy, device and anchor at
    /// `config.initial_anchor`
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `config` or `weights` fail validation.
    pub fn new(config: HapticConfig, weights: ResistanceWeights) -> Result<Self, ConfigError> {
        config.validate()?;
        weights.validate()?;
        let anchor = config.initial_anchor;
        info!(
            "Haptic coupling created: mode={:?}, axis={:?}, anchor=({:.1}, {:.1})",
            config.mode, config.axis, anchor.x, anchor.y
        );
        Ok(Self {
            config,
            weights,
            proxy: anchor,
            device: anchor,
            anchor,
            raw_input: Meters::ZERO,
            smoothed_resistance: 0.0,
            force: Vec2::zeros(),
            force_1d: Newtons::ZERO,
        })
    }

    /// Replace the tuning parameters, keeping positions and filter state
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] and keeps the previous configuration when
    /// `config` is invalid.
    pub fn reconfigure(&mut self, config: HapticConfig) -> Result<(), ConfigError> {
        config.validate()?;
        info!("Haptic coupling reconfigured: {:?}", config);
        self.config = config;
        Ok(())
    }

    /// Replace the resistance weights
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] and keeps the previous weights when a weight
    /// is negative or non-finite.
    pub fn set_weights(&mut self, weights: ResistanceWeights) -> Result<(), ConfigError> {
        weights.validate()?;
        self.weights = weights;
        Ok(())
    }

    pub fn set_mode(&mut self, mode: ControlMode) {
        if self.config.mode != mode {
            info!("Haptic control mode -> {:?}", mode);
            self.config.mode = mode;
        }
    }

    pub fn set_axis(&mut self, axis: RailAxis) {
        if self.config.axis != axis {
            info!("Haptic rail axis -> {:?}", axis);
            self.config.axis = axis;
        }
    }

    /// Move anchor, proxy and device to `center` and zero the handle input
    ///
    /// The output force drops to zero on the next tick; that discontinuity is
    /// expected. Non-finite centres are ignored.
    pub fn recenter(&mut self, center: Vec2) {
        if !(center.x.is_finite() && center.y.is_finite()) {
            return;
        }
        info!("Recentering haptic anchor at ({:.2}, {:.2})", center.x, center.y);
        self.anchor = center;
        self.proxy = center;
        self.device = center;
        self.raw_input = Meters::ZERO;
        self.force = Vec2::zeros();
        self.force_1d = Newtons::ZERO;
    }

    /// Run one haptic tick against `grid`
    pub fn update(&mut self, input: HapticInput, grid: &mut SandGrid) -> HapticTick {
        self.map_input(input.sanitized());

        let raw_resistance = grid.resistance(
            self.proxy.x,
            self.proxy.y,
            self.config.radius,
            &self.weights,
        );
        let alpha = self.config.smoothing;
        self.smoothed_resistance = self.smoothed_resistance * (1.0 - alpha) + raw_resistance * alpha;

        let viscosity = 1.0 / (1.0 + self.smoothed_resistance * self.config.friction_coefficient);
        if viscosity >= 1.0 {
            self.proxy = self.device;
        } else {
            self.proxy += (self.device - self.proxy) * viscosity;
        }

        let displaced = self.displace(grid);

        let mut force = (self.proxy - self.device) * -self.config.spring_stiffness;
        if force.norm() < self.config.dead_zone {
            force = Vec2::zeros();
        }
        self.force = force;
        self.force_1d = match self.config.mode {
            ControlMode::OneDof => Newtons::new(self.config.axis.component(force)),
            ControlMode::TwoDof => Newtons::ZERO,
        };

        let tick = HapticTick {
            raw_resistance,
            smoothed_resistance: self.smoothed_resistance,
            viscosity,
            displaced,
            force,
            force_1d: self.force_1d,
        };
        trace!(
            raw = raw_resistance,
            smoothed = self.smoothed_resistance,
            viscosity,
            displaced,
            force_x = force.x,
            force_y = force.y,
            "haptic tick"
        );
        tick
    }

    fn map_input(&mut self, input: HapticInput) {
        match self.config.mode {
            ControlMode::TwoDof => {
                match input {
                    HapticInput::Pointer(target) => self.device = target,
                    HapticInput::Device(meters) => {
                        self.device = self.rail_position(meters.clamp_symmetric(self.config.input_limit));
                    }
                    HapticInput::Hold => {}
                }
                self.raw_input = Meters::ZERO;
                self.force_1d = Newtons::ZERO;
            }
            ControlMode::OneDof => {
                let axis = self.config.axis;
                let raw = match input {
                    HapticInput::Pointer(target) => Meters::new(
                        (axis.component(target) - axis.component(self.anchor)) / self.config.hapkit_scale,
                    ),
                    HapticInput::Device(meters) => meters,
                    HapticInput::Hold => self.raw_input,
                };
                self.raw_input = raw.clamp_symmetric(self.config.input_limit);
                self.device = self.rail_position(self.raw_input);
            }
        }
    }

    /// Device position for a handle reading, on the rail through the anchor
    fn rail_position(&self, meters: Meters) -> Vec2 {
        self.anchor + self.config.axis.unit() * (*meters * self.config.hapkit_scale)
    }

    /// Push every occupied cell inside the proxy footprint outward
    ///
    /// Cells with no vacancy within the search radius of their push target
    /// stay where they are.
    fn displace(&self, grid: &mut SandGrid) -> usize {
        let radius = self.config.radius;
        let r2 = radius * radius;
        let reach = radius.ceil() as i32;
        let center = CellPos::from_truncated(self.proxy);
        let search = self.config.displacement_search_radius;

        // Footprint box clipped to the grid
        let min_x = center.x.saturating_sub(reach).max(0);
        let max_x = center.x.saturating_add(reach).min(grid.width() as i32 - 1);
        let min_y = center.y.saturating_sub(reach).max(0);
        let max_y = center.y.saturating_add(reach).min(grid.height() as i32 - 1);

        let mut moved = 0;
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                if grid.get(x, y).is_empty() {
                    continue;
                }
                let offset = Vec2::new(x as f32 - self.proxy.x, y as f32 - self.proxy.y);
                if offset.norm_squared() > r2 {
                    continue;
                }
                let dir = if offset.norm() < PUSH_EPSILON {
                    Vec2::new(0.0, -1.0)
                } else {
                    offset.normalize()
                };
                let target = self.proxy + dir * (radius + PUSH_CLEARANCE);
                let target = CellPos::from_truncated(target);
                if let Some(dest) = grid.find_nearest_empty(target.x, target.y, search) {
                    if grid.try_move(x, y, dest.x, dest.y) {
                        moved += 1;
                    }
                }
            }
        }
        moved
    }

    pub fn config(&self) -> &HapticConfig {
        &self.config
    }

    pub fn weights(&self) -> &ResistanceWeights {
        &self.weights
    }

    pub fn mode(&self) -> ControlMode {
        self.config.mode
    }

    pub fn axis(&self) -> RailAxis {
        self.config.axis
    }

    pub fn proxy(&self) -> Vec2 {
        self.proxy
    }

    pub fn device(&self) -> Vec2 {
        self.device
    }

    pub fn anchor(&self) -> Vec2 {
        self.anchor
    }

    /// Clamped handle position (1-DOF); zero in 2-DOF mode
    pub fn raw_input(&self) -> Meters {
        self.raw_input
    }

    pub fn smoothed_resistance(&self) -> f32 {
        self.smoothed_resistance
    }

    /// Restoring force vector from the last tick
    pub fn force(&self) -> Vec2 {
        self.force
    }

    /// Scalar force along the rail from the last tick
    pub fn force_1d(&self) -> Newtons {
        self.force_1d
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::Material;
    use approx::assert_relative_eq;

    fn coupling(config: HapticConfig) -> HapticCoupling {
        HapticCoupling::new(config, ResistanceWeights::default()).unwrap()
    }

    fn two_dof() -> HapticConfig {
        HapticConfig {
            mode: ControlMode::TwoDof,
            initial_anchor: Vec2::new(10.0, 10.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let cfg = HapticConfig {
            friction_coefficient: -1.0,
            ..Default::default()
        };
        assert!(HapticCoupling::new(cfg, ResistanceWeights::default()).is_err());
    }

    #[test]
    fn test_free_space_proxy_tracks_device() {
        let mut grid = SandGrid::new(40, 40).unwrap();
        let mut h = coupling(HapticConfig {
            friction_coefficient: 1.0,
            ..two_dof()
        });
        let tick = h.update(HapticInput::Pointer(Vec2::new(17.3, 12.9)), &mut grid);
        assert_eq!(tick.viscosity, 1.0);
        assert_eq!(h.proxy(), h.device());
        assert_eq!(h.device(), Vec2::new(17.3, 12.9));
        assert_eq!(tick.force, Vec2::zeros());
        assert_eq!(tick.displaced, 0);
    }

    #[test]
    fn test_dead_zone_zeroes_small_force() {
        let mut grid = SandGrid::new(40, 40).unwrap();
        // Water around the proxy gives a tiny lag
        grid.set(10, 10, Material::Water, 0);
        let mut h = coupling(HapticConfig {
            spring_stiffness: 0.001,
            ..two_dof()
        });
        let tick = h.update(HapticInput::Pointer(Vec2::new(10.5, 10.0)), &mut grid);
        assert_eq!(tick.force, Vec2::zeros());
        assert_eq!(h.force_1d(), Newtons::ZERO);
    }

    #[test]
    fn test_dense_medium_slows_proxy_and_pushes_back() {
        let mut grid = SandGrid::new(40, 40).unwrap();
        for y in 0..40 {
            for x in 12..40 {
                grid.set(x, y, Material::WetSand, 2);
            }
        }
        let mut h = coupling(HapticConfig {
            mode: ControlMode::OneDof,
            initial_anchor: Vec2::new(14.0, 20.0),
            ..Default::default()
        });
        // Pointer 10 units to the right along the rail
        let tick = h.update(HapticInput::Pointer(Vec2::new(24.0, 20.0)), &mut grid);
        assert!(tick.viscosity < 1.0);
        assert!(h.proxy().x < h.device().x);
        assert_relative_eq!(h.device().x, 24.0, epsilon = 1e-4);
        // Proxy lags behind the device; the spring term is (proxy - device) * -k
        assert!(h.force_1d().value() > 0.0);
        assert_relative_eq!(tick.force.x, (h.proxy().x - h.device().x) * -0.5, epsilon = 1e-5);
    }

    #[test]
    fn test_resistance_filter_converges() {
        let mut grid = SandGrid::new(20, 20).unwrap();
        grid.set(10, 10, Material::Sand, 0);
        let cfg = HapticConfig {
            radius: 0.5,
            initial_anchor: Vec2::new(10.0, 10.0),
            ..two_dof()
        };
        let mut h = coupling(cfg);
        // Proxy sits on the sand cell; displacement moves it out on the first
        // tick, so the raw reading is only non-zero once.
        let first = h.update(HapticInput::Hold, &mut grid);
        assert_relative_eq!(first.raw_resistance, 0.1, epsilon = 1e-6);
        assert_relative_eq!(first.smoothed_resistance, 0.02, epsilon = 1e-6);
        let second = h.update(HapticInput::Hold, &mut grid);
        assert_eq!(second.raw_resistance, 0.0);
        assert_relative_eq!(second.smoothed_resistance, 0.016, epsilon = 1e-6);
    }

    #[test]
    fn test_one_dof_pointer_projection_and_clamp() {
        let mut grid = SandGrid::new(100, 100).unwrap();
        let mut h = coupling(HapticConfig {
            initial_anchor: Vec2::new(50.0, 50.0),
            ..Default::default()
        });
        h.update(HapticInput::Pointer(Vec2::new(60.0, 75.0)), &mut grid);
        assert_relative_eq!(h.raw_input().value(), 0.02, epsilon = 1e-6);
        assert_relative_eq!(h.device().x, 60.0, epsilon = 1e-4);
        assert_eq!(h.device().y, 50.0);

        // 0.2 m requested, clamped to the 0.08 m travel limit (= 40 units)
        h.update(HapticInput::Pointer(Vec2::new(150.0, 50.0)), &mut grid);
        assert_relative_eq!(h.raw_input().value(), 0.08, epsilon = 1e-6);
        assert_relative_eq!(h.device().x, 90.0, epsilon = 1e-3);
    }

    #[test]
    fn test_one_dof_device_input_on_y_rail() {
        let mut grid = SandGrid::new(100, 100).unwrap();
        let mut h = coupling(HapticConfig {
            axis: RailAxis::Y,
            initial_anchor: Vec2::new(50.0, 50.0),
            ..Default::default()
        });
        h.update(HapticInput::Device(Meters::new(-0.01)), &mut grid);
        assert_relative_eq!(h.device().y, 45.0, epsilon = 1e-4);
        assert_eq!(h.device().x, 50.0);

        h.update(HapticInput::Device(Meters::new(-1.0)), &mut grid);
        assert_eq!(h.raw_input(), Meters::new(-0.08));
    }

    #[test]
    fn test_hold_keeps_device_position() {
        let mut grid = SandGrid::new(100, 100).unwrap();
        let mut h = coupling(HapticConfig {
            initial_anchor: Vec2::new(50.0, 50.0),
            ..Default::default()
        });
        h.update(HapticInput::Device(Meters::new(0.03)), &mut grid);
        let device = h.device();
        h.update(HapticInput::Hold, &mut grid);
        assert_eq!(h.device(), device);
        h.update(HapticInput::Pointer(Vec2::new(f32::NAN, 0.0)), &mut grid);
        assert_eq!(h.device(), device);
    }

    #[test]
    fn test_two_dof_clears_scalar_state() {
        let mut grid = SandGrid::new(40, 40).unwrap();
        let mut h = coupling(HapticConfig {
            initial_anchor: Vec2::new(20.0, 20.0),
            ..Default::default()
        });
        h.update(HapticInput::Device(Meters::new(0.01)), &mut grid);
        assert_ne!(h.raw_input(), Meters::ZERO);

        h.set_mode(ControlMode::TwoDof);
        h.update(HapticInput::Pointer(Vec2::new(5.0, 6.0)), &mut grid);
        assert_eq!(h.raw_input(), Meters::ZERO);
        assert_eq!(h.force_1d(), Newtons::ZERO);
        assert_eq!(h.device(), Vec2::new(5.0, 6.0));
    }

    #[test]
    fn test_displacement_clears_footprint() {
        let mut grid = SandGrid::new(40, 40).unwrap();
        grid.set(20, 20, Material::Sand, 0);
        grid.set(21, 20, Material::Water, 0);
        grid.set(20, 22, Material::WetSand, 1);
        let before = grid.material_counts();

        let mut h = coupling(HapticConfig {
            initial_anchor: Vec2::new(20.0, 20.0),
            ..two_dof()
        });
        let tick = h.update(HapticInput::Hold, &mut grid);
        assert_eq!(tick.displaced, 3);
        assert_eq!(grid.material_counts(), before);
        for (pos, _) in grid.occupied() {
            let d = pos.as_vec2() - h.proxy();
            assert!(d.norm() > 4.0, "cell {pos:?} still inside footprint");
        }
        // Cell under the proxy centre is pushed straight up
        assert!(grid.occupied().any(|(p, c)| p.x == 20 && p.y < 20 && c.material() == Material::Sand));
    }

    #[test]
    fn test_displacement_without_vacancy_leaves_cells() {
        let mut grid = SandGrid::new(12, 12).unwrap();
        for y in 0..12 {
            for x in 0..12 {
                grid.set(x, y, Material::Sand, 0);
            }
        }
        let before = grid.clone();
        let mut h = coupling(HapticConfig {
            initial_anchor: Vec2::new(6.0, 6.0),
            ..two_dof()
        });
        let tick = h.update(HapticInput::Hold, &mut grid);
        assert_eq!(tick.displaced, 0);
        assert_eq!(grid, before);
    }

    #[test]
    fn test_huge_radius_stays_within_grid() {
        let mut grid = SandGrid::new(10, 10).unwrap();
        grid.set(2, 2, Material::Sand, 0);
        grid.set(7, 8, Material::Water, 0);
        let before = grid.clone();
        let mut h = coupling(HapticConfig {
            radius: 1e9,
            initial_anchor: Vec2::new(5.0, 5.0),
            ..two_dof()
        });
        // Every push target lies far outside the grid, so nothing moves
        let tick = h.update(HapticInput::Pointer(Vec2::new(6.0, 5.0)), &mut grid);
        assert_eq!(tick.displaced, 0);
        assert_eq!(grid, before);
        assert!(tick.raw_resistance > 0.0);
    }

    #[test]
    fn test_recenter_resets_positions() {
        let mut grid = SandGrid::new(60, 60).unwrap();
        let mut h = coupling(HapticConfig::default());
        h.update(HapticInput::Device(Meters::new(0.05)), &mut grid);
        h.recenter(Vec2::new(12.0, 8.0));
        assert_eq!(h.anchor(), Vec2::new(12.0, 8.0));
        assert_eq!(h.proxy(), h.anchor());
        assert_eq!(h.device(), h.anchor());
        assert_eq!(h.raw_input(), Meters::ZERO);
        assert_eq!(h.force(), Vec2::zeros());

        h.recenter(Vec2::new(f32::NAN, 1.0));
        assert_eq!(h.anchor(), Vec2::new(12.0, 8.0));
    }

    #[test]
    fn test_reconfigure_validates() {
        let mut h = coupling(HapticConfig::default());
        let bad = HapticConfig {
            smoothing: 2.0,
            ..Default::default()
        };
        assert!(h.reconfigure(bad).is_err());
        assert_eq!(h.config().smoothing, 0.2);

        let good = HapticConfig {
            smoothing: 1.0,
            ..Default::default()
        };
        assert!(h.reconfigure(good).is_ok());
        assert_eq!(h.config().smoothing, 1.0);
    }
}
