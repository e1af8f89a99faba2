//! Falling-sand sandbox with a haptic proxy
//!
//! A cellular automaton of sand, water and wet sand, coupled to a
//! force-feedback loop: a handle (mouse pointer or a physical 1-DOF device)
//! drags a virtual proxy through the grid, the local material density slows
//! the proxy down, and the spring between proxy and handle is rendered back as
//! a force.
//!
//! ## Layout
//!
//! - [`grid`]: cell storage, boundary semantics, resistance and vacancy search
//! - [`rules`]: per-tick material transitions (falling, flowing, soaking)
//! - [`haptics`]: proxy/device coupling, displacement and force output
//! - [`device`]: position/force exchange with a physical handle
//! - [`simulation`]: the [`Sandbox`] that schedules all of the above
//!
//! ## Example
//!
//! ```
//! use sand_haptics_core::{HapticInput, Material, Sandbox, SandboxConfig, Vec2};
//! use std::time::Duration;
//!
//! let mut sandbox = Sandbox::new(SandboxConfig {
//!     seed: Some(7),
//!     ..Default::default()
//! })?;
//! sandbox.paint_disc(Vec2::new(30.0, 10.0), 3.0, Material::Sand);
//! let report = sandbox.frame(Duration::from_millis(16), HapticInput::Pointer(Vec2::new(32.0, 30.0)));
//! assert_eq!(report.simulation_ticks, 1);
//! # Ok::<(), sand_haptics_core::ConfigError>(())
//! ```

pub mod core_types;
pub mod device;
pub mod error;
pub mod grid;
pub mod haptics;
pub mod rules;
pub mod simulation;

pub use core_types::{Cell, CellPos, Material, MaterialCounts, Meters, Newtons, Vec2};
pub use device::{DeviceConfig, HapticLink, LineDevice};
pub use error::{ConfigError, DeviceError};
pub use grid::{ResistanceWeights, SandGrid};
pub use haptics::{ControlMode, HapticConfig, HapticCoupling, HapticInput, HapticTick, RailAxis};
pub use rules::{FixedTieBreak, RandomTieBreak, RuleEngine, TieBreak};
pub use simulation::{FrameReport, FrameSnapshot, Sandbox, SandboxConfig};
