//! Per-tick input to the haptic coupling

use crate::core_types::{Meters, Vec2};
use serde::{Deserialize, Serialize};

/// Where the device position comes from on this haptic tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HapticInput {
    /// Free pointer position in grid units
    Pointer(Vec2),
    /// Handle position reported by a physical device
    Device(Meters),
    /// No fresh input; keep the current device position
    Hold,
}

impl HapticInput {
    /// Non-finite readings are treated as [`HapticInput::Hold`]
    pub(crate) fn sanitized(self) -> Self {
        match self {
            HapticInput::Pointer(p) if !(p.x.is_finite() && p.y.is_finite()) => HapticInput::Hold,
            HapticInput::Device(m) if !m.is_finite() => HapticInput::Hold,
            other => other,
        }
    }
}
