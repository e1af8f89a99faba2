//! Frame-driven sandbox
//!
//! [`Sandbox`] ties the grid, the material rules and the haptic coupling
//! together and runs them on two independent clocks:
//! - the simulation clock, one rule pass every `tick_delay_ms` of frame time
//! - the haptic clock, once per frame or at a fixed period with capped
//!   catch-up

pub mod config;
pub mod sandbox;
pub mod schedule;
pub mod snapshot;

pub use config::SandboxConfig;
pub use sandbox::{FrameReport, Sandbox};
pub use schedule::{FrameTicks, TickClock, MAX_HAPTIC_TICKS_PER_FRAME};
pub use snapshot::{cell_color, CellSample, FrameSnapshot, Rgba};
