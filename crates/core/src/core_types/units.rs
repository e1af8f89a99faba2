//! Semantic unit types for the physical side of the haptic loop
//!
//! Grid-space quantities are plain `f32` grid units. Anything that crosses the
//! device boundary is wrapped so a position in meters can never be mixed up
//! with a force in Newtons or with a grid coordinate.
//!
//! # Usage
//! ```
//! use sand_haptics_core::core_types::units::{Meters, Newtons};
//!
//! let travel = Meters::new(0.05);
//! assert!((*travel - 0.05).abs() < f32::EPSILON);
//!
//! let f = Newtons::new(-1.5);
//! assert_eq!(f.abs(), Newtons::new(1.5));
//! ```

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Deref, Mul, Neg, Sub};

/// Compare f32 values with total ordering (NaN sorts above everything)
#[inline]
fn f32_total_cmp(a: f32, b: f32) -> Ordering {
    a.total_cmp(&b)
}

/// Implements the shared arithmetic, ordering and conversion surface for an
/// `f32` newtype.
macro_rules! scalar_unit {
    ($name:ident, $suffix:literal) => {
        impl Eq for $name {}

        impl PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $name {
            fn cmp(&self, other: &Self) -> Ordering {
                f32_total_cmp(self.0, other.0)
            }
        }

        impl Deref for $name {
            type Target = f32;
            #[inline]
            fn deref(&self) -> &f32 {
                &self.0
            }
        }

        impl $name {
            /// Zero value
            pub const ZERO: $name = $name(0.0);

            /// Wrap a raw value
            #[inline]
            #[must_use]
            pub const fn new(value: f32) -> Self {
                $name(value)
            }

            /// Raw value
            #[inline]
            #[must_use]
            pub const fn value(self) -> f32 {
                self.0
            }

            /// Absolute value
            #[inline]
            #[must_use]
            pub fn abs(self) -> Self {
                $name(self.0.abs())
            }

            /// Clamp into `[-limit, limit]`
            #[inline]
            #[must_use]
            pub fn clamp_symmetric(self, limit: Self) -> Self {
                let limit = limit.0.abs();
                $name(self.0.clamp(-limit, limit))
            }
        }

        impl Add for $name {
            type Output = Self;
            fn add(self, rhs: Self) -> Self {
                $name(self.0 + rhs.0)
            }
        }

        impl Sub for $name {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self {
                $name(self.0 - rhs.0)
            }
        }

        impl Mul<f32> for $name {
            type Output = Self;
            fn mul(self, rhs: f32) -> Self {
                $name(self.0 * rhs)
            }
        }

        impl Neg for $name {
            type Output = Self;
            fn neg(self) -> Self {
                $name(-self.0)
            }
        }

        impl From<f32> for $name {
            fn from(v: f32) -> Self {
                $name(v)
            }
        }

        impl From<$name> for f32 {
            fn from(v: $name) -> f32 {
                v.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if let Some(precision) = f.precision() {
                    write!(f, "{:.*} {}", precision, self.0, $suffix)
                } else {
                    write!(f, "{} {}", self.0, $suffix)
                }
            }
        }
    };
}

/// Length in meters, as reported by a physical device
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Meters(f32);

scalar_unit!(Meters, "m");

/// Force in Newtons, as sent to a physical device
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Newtons(f32);

scalar_unit!(Newtons, "N");
