//! Serial-port transport (`serial` feature)

use super::{DeviceConfig, LineDevice};
use crate::error::DeviceError;
use serialport::{ClearBuffer, SerialPort};
use std::time::Duration;
use tracing::info;

/// Line device backed by an OS serial port
pub type SerialDevice = LineDevice<Box<dyn SerialPort>>;

/// Open the configured serial port
///
/// The port is opened with a zero timeout so reads never stall the frame, and
/// any bytes queued before the connection are discarded.
///
/// # Arguments
///
/// * `config` - Port path, baud rate and rate-limit settings
///
/// # Errors
///
/// Returns [`DeviceError::Serial`] if the port cannot be opened or its input
/// buffer cannot be cleared.
pub fn open_serial(config: &DeviceConfig) -> Result<SerialDevice, DeviceError> {
    info!("Opening {} at {} baud", config.port, config.baud_rate);
    let port = serialport::new(&config.port, config.baud_rate)
        .timeout(Duration::ZERO)
        .open()?;
    port.clear(ClearBuffer::Input)?;
    Ok(LineDevice::new(port, config))
}

/// Names of the serial ports present on this machine
pub fn available_ports() -> Vec<String> {
    serialport::available_ports()
        .map(|ports| ports.into_iter().map(|p| p.port_name).collect())
        .unwrap_or_default()
}
