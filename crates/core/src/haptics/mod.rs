//! Haptic proxy loop
//!
//! A virtual proxy follows the device (pointer or physical handle) through the
//! sand grid. Dense material slows the proxy down, the proxy shoves grid matter
//! out of its footprint, and the spring between proxy and device is the force
//! fed back to the handle.

pub mod config;
pub mod coupling;
pub mod input;

pub use config::{ControlMode, HapticConfig, RailAxis};
pub use coupling::{HapticCoupling, HapticTick};
pub use input::HapticInput;
