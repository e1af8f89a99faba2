//! Error types
//!
//! Simulation and haptic operations are total and never fail. Errors only
//! surface when a configuration is validated (construction, resize,
//! reconfiguration) and when a device transport is opened.

use thiserror::Error;

/// A configuration precondition was violated
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Grid dimension is zero or does not fit in an `i32` coordinate
    #[error("grid {name} must be between 1 and {max}, got {value}")]
    InvalidDimension {
        name: &'static str,
        value: usize,
        max: usize,
    },

    /// Value must be finite and strictly positive
    #[error("{name} must be finite and positive, got {value}")]
    NotPositive { name: &'static str, value: f32 },

    /// Value must be finite and not negative
    #[error("{name} must be finite and non-negative, got {value}")]
    Negative { name: &'static str, value: f32 },

    /// Value must lie in the half-open interval `(min, max]`
    #[error("{name} must be in ({min}, {max}], got {value}")]
    OutOfRange {
        name: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },

    /// Position must have finite coordinates
    #[error("{name} must be a finite position")]
    NotFinite { name: &'static str },

    /// Integer setting must be at least one
    #[error("{name} must be at least 1")]
    Zero { name: &'static str },
}

impl ConfigError {
    /// Check that `value` is finite and `> 0`
    pub(crate) fn check_positive(name: &'static str, value: f32) -> Result<(), Self> {
        if value.is_finite() && value > 0.0 {
            Ok(())
        } else {
            Err(ConfigError::NotPositive { name, value })
        }
    }

    /// Check that `value` is finite and `>= 0`
    pub(crate) fn check_non_negative(name: &'static str, value: f32) -> Result<(), Self> {
        if value.is_finite() && value >= 0.0 {
            Ok(())
        } else {
            Err(ConfigError::Negative { name, value })
        }
    }
}

/// A device transport could not be opened or driven
#[derive(Debug, Error)]
pub enum DeviceError {
    /// Underlying stream failed
    #[error("device I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serial port could not be opened or configured
    #[cfg(feature = "serial")]
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_positive() {
        assert!(ConfigError::check_positive("k", 0.5).is_ok());
        assert_eq!(
            ConfigError::check_positive("k", 0.0),
            Err(ConfigError::NotPositive {
                name: "k",
                value: 0.0
            })
        );
        assert!(ConfigError::check_positive("k", f32::NAN).is_err());
        assert!(ConfigError::check_positive("k", f32::INFINITY).is_err());
    }

    #[test]
    fn test_check_non_negative() {
        assert!(ConfigError::check_non_negative("dead_zone", 0.0).is_ok());
        assert!(ConfigError::check_non_negative("dead_zone", -0.1).is_err());
    }

    #[test]
    fn test_messages_name_the_setting() {
        let err = ConfigError::InvalidDimension {
            name: "width",
            value: 0,
            max: 4096,
        };
        assert_eq!(err.to_string(), "grid width must be between 1 and 4096, got 0");
    }
}
