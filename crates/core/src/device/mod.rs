//! Physical handle transport
//!
//! The haptic loop only needs two scalars from the outside world: the handle
//! position in meters going in and the force in Newtons going out. Anything
//! that can exchange those implements [`HapticLink`]; [`LineDevice`] does so
//! over any byte stream speaking the [`protocol`] line format.

pub mod line_device;
pub mod protocol;
pub mod rate_limit;
#[cfg(feature = "serial")]
pub mod serial;

pub use line_device::LineDevice;
pub use rate_limit::ForceRateLimiter;
#[cfg(feature = "serial")]
pub use serial::{available_ports, open_serial, SerialDevice};

use crate::core_types::{Meters, Newtons};
use crate::error::ConfigError;
use crate::haptics::HapticInput;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Transport settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Serial port path, e.g. `/dev/ttyUSB0` or `COM3`
    pub port: String,
    pub baud_rate: u32,
    /// Resend when the force changed by more than this
    pub force_threshold: Newtons,
    /// Resend at least this often even when the force is unchanged
    pub resend_interval: Duration,
    /// Upper bound on stream reads per [`HapticLink::sync`]
    pub max_reads_per_sync: usize,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            port: "/dev/ttyUSB0".to_string(),
            baud_rate: 115_200,
            force_threshold: Newtons::new(0.005),
            resend_interval: Duration::from_millis(50),
            max_reads_per_sync: 50,
        }
    }
}

impl DeviceConfig {
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for a zero baud rate, a zero read budget or a
    /// negative force threshold.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.baud_rate == 0 {
            return Err(ConfigError::Zero { name: "baud_rate" });
        }
        if self.max_reads_per_sync == 0 {
            return Err(ConfigError::Zero {
                name: "max_reads_per_sync",
            });
        }
        ConfigError::check_non_negative("force_threshold", *self.force_threshold)
    }
}

/// Bidirectional position/force link to a haptic handle
pub trait HapticLink {
    fn is_connected(&self) -> bool;

    /// Last valid handle position (zero until the first report)
    fn position(&self) -> Meters;

    /// Whether the most recent [`sync`](HapticLink::sync) received a position
    fn has_fresh_position(&self) -> bool;

    /// Drain pending position reports, then send `force` if the rate limiter
    /// allows it. A no-op when disconnected.
    fn sync(&mut self, force: Newtons, now: Instant);

    /// Send a final zero-force command and release the transport
    fn disconnect(&mut self);

    /// Haptic input for this frame: the handle position while connected
    fn haptic_input(&self) -> HapticInput {
        if self.is_connected() {
            HapticInput::Device(self.position())
        } else {
            HapticInput::Hold
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = DeviceConfig::default();
        assert_eq!(cfg.port, "/dev/ttyUSB0");
        assert_eq!(cfg.baud_rate, 115_200);
        assert_eq!(cfg.resend_interval, Duration::from_millis(50));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_invalid_config() {
        let cfg = DeviceConfig {
            max_reads_per_sync: 0,
            ..Default::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::Zero {
                name: "max_reads_per_sync"
            })
        );
        let cfg = DeviceConfig {
            force_threshold: Newtons::new(-1.0),
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }
}
