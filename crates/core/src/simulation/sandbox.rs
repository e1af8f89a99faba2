//! The sandbox owns the grid and drives both update loops
//!
//! Every mutation of the grid goes through `&mut Sandbox`: rule passes,
//! haptic displacement and painting can never interleave.

use super::config::SandboxConfig;
use super::schedule::{FrameTicks, TickClock};
use super::snapshot::{cell_color, CellSample, FrameSnapshot};
use crate::core_types::{CellPos, Material, MaterialCounts, Newtons, Vec2};
use crate::device::HapticLink;
use crate::error::ConfigError;
use crate::grid::SandGrid;
use crate::haptics::{ControlMode, HapticConfig, HapticCoupling, HapticInput, HapticTick, RailAxis};
use crate::rules::{RandomTieBreak, RuleEngine, TieBreak};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// What a call to [`Sandbox::frame`] did
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FrameReport {
    pub simulation_ticks: u32,
    pub haptic_ticks: u32,
    /// Result of the last haptic tick run this frame
    pub last_haptic: Option<HapticTick>,
}

/// Sand grid, material rules and haptic coupling behind one handle
pub struct Sandbox<T: TieBreak = RandomTieBreak> {
    grid: SandGrid,
    rules: RuleEngine,
    haptics: HapticCoupling,
    tie_break: T,
    clock: TickClock,
    ticks: u64,
}

impl Sandbox<RandomTieBreak> {
    /// Build a sandbox with a random tie-break seeded from `config.seed`
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `config` fails validation.
    pub fn new(config: SandboxConfig) -> Result<Self, ConfigError> {
        let tie_break = RandomTieBreak::new(config.seed);
        Self::with_tie_break(config, tie_break)
    }
}

impl<T: TieBreak> Sandbox<T> {
    /// Build a sandbox with an explicit tie-break source
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `config` fails validation.
    pub fn with_tie_break(config: SandboxConfig, tie_break: T) -> Result<Self, ConfigError> {
        config.validate()?;
        let grid = SandGrid::new(config.width, config.height)?;
        let rules = RuleEngine::new(config.soak_threshold)?;
        let haptics = HapticCoupling::new(config.haptics, config.resistance)?;
        info!(
            "Sandbox ready: {}x{}, tick delay {} ms, haptic period {:?}",
            config.width, config.height, config.tick_delay_ms, config.haptic_period_ms
        );
        Ok(Self {
            grid,
            rules,
            haptics,
            tie_break,
            clock: TickClock::new(config.tick_delay_ms, config.haptic_period_ms),
            ticks: 0,
        })
    }

    /// Advance both clocks by `dt` and run whatever ticks fell due
    ///
    /// Rule passes run before haptic ticks. The same `input` is used for every
    /// haptic tick of the frame.
    pub fn frame(&mut self, dt: Duration, input: HapticInput) -> FrameReport {
        let due = self.clock.advance((dt.as_secs_f64() * 1000.0) as f32);
        self.run_due(due, input)
    }

    /// Like [`frame`](Self::frame) but exchanges data with a handle first
    ///
    /// The link receives the force from the previous tick, then its position
    /// (or `fallback` while disconnected) drives this frame's haptic ticks.
    pub fn frame_with_link<L: HapticLink + ?Sized>(
        &mut self,
        dt: Duration,
        link: &mut L,
        now: Instant,
        fallback: HapticInput,
    ) -> FrameReport {
        link.sync(self.haptics.force_1d(), now);
        let input = if link.is_connected() {
            link.haptic_input()
        } else {
            fallback
        };
        self.frame(dt, input)
    }

    fn run_due(&mut self, due: FrameTicks, input: HapticInput) -> FrameReport {
        let mut report = FrameReport::default();
        for _ in 0..due.simulation {
            self.step_simulation();
            report.simulation_ticks += 1;
        }
        for _ in 0..due.haptic {
            report.last_haptic = Some(self.step_haptics(input));
            report.haptic_ticks += 1;
        }
        debug!(
            simulation = report.simulation_ticks,
            haptic = report.haptic_ticks,
            "frame scheduled"
        );
        report
    }

    /// Run one rule pass over the grid
    pub fn step_simulation(&mut self) {
        self.rules.step(&mut self.grid, &mut self.tie_break);
        self.ticks += 1;
        debug!("Simulation tick {}: {}", self.ticks, self.grid.material_counts());
    }

    /// Run one haptic tick
    pub fn step_haptics(&mut self, input: HapticInput) -> HapticTick {
        self.haptics.update(input, &mut self.grid)
    }

    /// Place `material` at a cell, replacing whatever was there
    ///
    /// Painted wet sand starts saturated. Out-of-bounds paints are ignored.
    pub fn paint(&mut self, x: i32, y: i32, material: Material) {
        let soak = if material == Material::WetSand {
            self.rules.soak_threshold()
        } else {
            0
        };
        self.grid.set(x, y, material, soak);
    }

    /// Paint every in-bounds cell whose centre lies within `radius` of
    /// `center`; returns the number of cells painted
    pub fn paint_disc(&mut self, center: Vec2, radius: f32, material: Material) -> usize {
        if !(center.x.is_finite() && center.y.is_finite() && radius.is_finite()) || radius < 0.0 {
            return 0;
        }
        let r2 = radius * radius;
        let min = CellPos::from_truncated(Vec2::new((center.x - radius).floor(), (center.y - radius).floor()));
        let max = CellPos::from_truncated(Vec2::new((center.x + radius).ceil(), (center.y + radius).ceil()));
        let mut painted = 0;
        let max_x = max.x.min(self.grid.width() as i32 - 1);
        let max_y = max.y.min(self.grid.height() as i32 - 1);
        for y in min.y.max(0)..=max_y {
            for x in min.x.max(0)..=max_x {
                let offset = Vec2::new(x as f32, y as f32) - center;
                if offset.norm_squared() <= r2 {
                    self.paint(x, y, material);
                    painted += 1;
                }
            }
        }
        painted
    }

    /// Empty a single cell
    pub fn erase(&mut self, x: i32, y: i32) {
        self.paint(x, y, Material::Empty);
    }

    /// Empty every cell within `radius` of `center`
    pub fn erase_disc(&mut self, center: Vec2, radius: f32) -> usize {
        self.paint_disc(center, radius, Material::Empty)
    }

    /// Empty the whole grid
    pub fn clear(&mut self) {
        info!("Clearing sand grid");
        self.grid.clear();
    }

    /// Reallocate the grid (all cells cleared)
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidDimension`] and leaves the grid as it was
    /// for zero or oversized dimensions.
    pub fn resize(&mut self, width: usize, height: usize) -> Result<(), ConfigError> {
        self.grid.resize(width, height)
    }

    /// Move the haptic anchor, proxy and device to `center`
    pub fn recenter(&mut self, center: Vec2) {
        self.haptics.recenter(center);
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::NotPositive`] and keeps the old delay unless
    /// `ms` is finite and positive.
    pub fn set_tick_delay(&mut self, ms: f32) -> Result<(), ConfigError> {
        ConfigError::check_positive("tick_delay_ms", ms)?;
        info!("Tick delay -> {} ms", ms);
        self.clock.set_tick_delay_ms(ms);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::NotPositive`] for a non-positive period.
    pub fn set_haptic_period(&mut self, period_ms: Option<f32>) -> Result<(), ConfigError> {
        if let Some(period) = period_ms {
            ConfigError::check_positive("haptic_period_ms", period)?;
        }
        info!("Haptic period -> {:?} ms", period_ms);
        self.clock.set_haptic_period_ms(period_ms);
        Ok(())
    }

    /// Replace the haptic tuning
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] and keeps the previous tuning when `config`
    /// is invalid.
    pub fn reconfigure_haptics(&mut self, config: HapticConfig) -> Result<(), ConfigError> {
        self.haptics.reconfigure(config)
    }

    pub fn set_mode(&mut self, mode: ControlMode) {
        self.haptics.set_mode(mode);
    }

    pub fn set_axis(&mut self, axis: RailAxis) {
        self.haptics.set_axis(axis);
    }

    /// Capture the grid and haptic overlay for rendering
    pub fn snapshot(&self) -> FrameSnapshot {
        let threshold = self.rules.soak_threshold();
        let cells = self
            .grid
            .occupied()
            .map(|(pos, cell)| CellSample {
                x: pos.x,
                y: pos.y,
                material: cell.material(),
                soak: cell.soak(),
                color: cell_color(cell, threshold),
            })
            .collect();
        FrameSnapshot {
            width: self.grid.width(),
            height: self.grid.height(),
            cells,
            proxy: self.haptics.proxy(),
            device: self.haptics.device(),
            anchor: self.haptics.anchor(),
            mode: self.haptics.mode(),
            axis: self.haptics.axis(),
            radius: self.haptics.config().radius,
            force: self.haptics.force(),
            force_1d: self.haptics.force_1d(),
            smoothed_resistance: self.haptics.smoothed_resistance(),
            simulation_ticks: self.ticks,
        }
    }

    pub fn grid(&self) -> &SandGrid {
        &self.grid
    }

    pub fn haptics(&self) -> &HapticCoupling {
        &self.haptics
    }

    pub fn rules(&self) -> &RuleEngine {
        &self.rules
    }

    pub fn tie_break_mut(&mut self) -> &mut T {
        &mut self.tie_break
    }

    pub fn material_counts(&self) -> MaterialCounts {
        self.grid.material_counts()
    }

    /// Scalar force for the handle
    pub fn force_1d(&self) -> Newtons {
        self.haptics.force_1d()
    }

    pub fn tick_delay_ms(&self) -> f32 {
        self.clock.tick_delay_ms()
    }

    /// Rule passes run so far
    pub fn simulation_ticks(&self) -> u64 {
        self.ticks
    }
}
