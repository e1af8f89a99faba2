//! Frame-time driven clocks for the two update rates
//!
//! The rule engine runs slowly (every `tick_delay_ms`, at most once per frame)
//! while the haptic loop either runs once per frame or at a fixed period with
//! bounded catch-up.

use serde::{Deserialize, Serialize};

/// Upper bound on haptic ticks run in a single frame
pub const MAX_HAPTIC_TICKS_PER_FRAME: u32 = 32;

/// Ticks due in one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FrameTicks {
    pub simulation: u32,
    pub haptic: u32,
}

/// Accumulates frame time and hands out ticks for both clocks
#[derive(Debug, Clone, PartialEq)]
pub struct TickClock {
    tick_delay_ms: f32,
    haptic_period_ms: Option<f32>,
    sim_acc: f32,
    haptic_acc: f32,
}

impl TickClock {
    /// Callers validate both periods beforehand
    pub fn new(tick_delay_ms: f32, haptic_period_ms: Option<f32>) -> Self {
        Self {
            tick_delay_ms,
            haptic_period_ms,
            sim_acc: 0.0,
            haptic_acc: 0.0,
        }
    }

    /// Advance both clocks by `dt_ms`
    ///
    /// The simulation accumulator resets to zero (not the remainder) once it
    /// reaches the tick delay. Haptic backlog beyond
    /// [`MAX_HAPTIC_TICKS_PER_FRAME`] is dropped; only the fractional period
    /// carries over. Negative or non-finite `dt_ms` counts as zero.
    pub fn advance(&mut self, dt_ms: f32) -> FrameTicks {
        let dt_ms = if dt_ms.is_finite() { dt_ms.max(0.0) } else { 0.0 };

        self.sim_acc += dt_ms;
        let simulation = if self.sim_acc >= self.tick_delay_ms {
            self.sim_acc = 0.0;
            1
        } else {
            0
        };

        let haptic = match self.haptic_period_ms {
            None => 1,
            Some(period) => {
                self.haptic_acc += dt_ms;
                let due = (self.haptic_acc / period).floor();
                self.haptic_acc -= due * period;
                if due > MAX_HAPTIC_TICKS_PER_FRAME as f32 {
                    MAX_HAPTIC_TICKS_PER_FRAME
                } else {
                    due as u32
                }
            }
        };

        FrameTicks { simulation, haptic }
    }

    pub fn tick_delay_ms(&self) -> f32 {
        self.tick_delay_ms
    }

    pub fn set_tick_delay_ms(&mut self, ms: f32) {
        self.tick_delay_ms = ms;
    }

    pub fn haptic_period_ms(&self) -> Option<f32> {
        self.haptic_period_ms
    }

    pub fn set_haptic_period_ms(&mut self, period: Option<f32>) {
        self.haptic_period_ms = period;
        self.haptic_acc = 0.0;
    }

    /// Zero both accumulators
    pub fn reset(&mut self) {
        self.sim_acc = 0.0;
        self.haptic_acc = 0.0;
    }
}
