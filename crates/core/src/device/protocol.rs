//! ASCII line protocol spoken by the handle firmware
//!
//! Device → host: `P <meters>\n`, the current handle position.
//! Host → device: `F <newtons>\n`, the force to render, five decimals.

use crate::core_types::{Meters, Newtons};

/// Longest inbound line accepted before it is discarded
pub const MAX_LINE_LEN: usize = 256;

/// Parse a position report
///
/// Trailing `\r`/`\n` are ignored. Returns `None` for any line that is not a
/// `P` report carrying a finite number.
///
/// # Examples
/// ```
/// use sand_haptics_core::device::protocol::parse_position_line;
/// use sand_haptics_core::core_types::Meters;
///
/// assert_eq!(parse_position_line("P 0.0125\n"), Some(Meters::new(0.0125)));
/// assert_eq!(parse_position_line("debug: boot ok\n"), None);
/// ```
pub fn parse_position_line(line: &str) -> Option<Meters> {
    let line = line.trim_end_matches(['\r', '\n']);
    let value = line.strip_prefix('P')?.trim();
    let meters: f32 = value.parse().ok()?;
    meters.is_finite().then_some(Meters::new(meters))
}

/// Encode a force command
///
/// Non-finite forces are sent as zero, and negative zero is normalised so the
/// firmware never sees `-0.00000`.
pub fn format_force_command(force: Newtons) -> String {
    let value = if force.is_finite() && *force != 0.0 { *force } else { 0.0 };
    format!("F {value:.5}\n")
}
