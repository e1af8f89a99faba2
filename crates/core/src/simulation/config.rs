//! Top-level sandbox configuration

use crate::error::ConfigError;
use crate::grid::sand_grid::validate_dimensions;
use crate::grid::ResistanceWeights;
use crate::haptics::HapticConfig;
use crate::rules::RuleEngine;
use serde::{Deserialize, Serialize};

/// Everything needed to build a [`Sandbox`](super::Sandbox)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SandboxConfig {
    /// Grid width in cells
    pub width: usize,
    /// Grid height in cells
    pub height: usize,
    /// Water increments wet sand absorbs before it saturates
    pub soak_threshold: u8,
    /// Milliseconds of frame time between rule passes
    pub tick_delay_ms: f32,
    /// Fixed haptic period in milliseconds; `None` runs one haptic tick per
    /// frame
    pub haptic_period_ms: Option<f32>,
    /// Tie-break seed; `None` seeds from OS entropy
    pub seed: Option<u64>,
    pub resistance: ResistanceWeights,
    pub haptics: HapticConfig,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            width: 60,
            height: 60,
            soak_threshold: RuleEngine::DEFAULT_SOAK_THRESHOLD,
            tick_delay_ms: 16.0,
            haptic_period_ms: None,
            seed: None,
            resistance: ResistanceWeights::default(),
            haptics: HapticConfig::default(),
        }
    }
}

impl SandboxConfig {
    /// Check every nested setting
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found, checking grid dimensions,
    /// soak threshold, clock periods, resistance weights and haptic tuning in
    /// that order.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_dimensions(self.width, self.height)?;
        if self.soak_threshold == 0 {
            return Err(ConfigError::Zero {
                name: "soak_threshold",
            });
        }
        ConfigError::check_positive("tick_delay_ms", self.tick_delay_ms)?;
        if let Some(period) = self.haptic_period_ms {
            ConfigError::check_positive("haptic_period_ms", period)?;
        }
        self.resistance.validate()?;
        self.haptics.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let cfg = SandboxConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!((cfg.width, cfg.height), (60, 60));
        assert_eq!(cfg.soak_threshold, 2);
    }

    #[test]
    fn test_rejects_each_section() {
        let cases = [
            SandboxConfig {
                width: 0,
                ..Default::default()
            },
            SandboxConfig {
                soak_threshold: 0,
                ..Default::default()
            },
            SandboxConfig {
                tick_delay_ms: 0.0,
                ..Default::default()
            },
            SandboxConfig {
                haptic_period_ms: Some(-1.0),
                ..Default::default()
            },
            SandboxConfig {
                resistance: ResistanceWeights {
                    sand: f32::NAN,
                    ..Default::default()
                },
                ..Default::default()
            },
            SandboxConfig {
                haptics: HapticConfig {
                    radius: 0.0,
                    ..Default::default()
                },
                ..Default::default()
            },
        ];
        for cfg in cases {
            assert!(cfg.validate().is_err(), "{cfg:?}");
        }
    }
}
