//! Canonical occupancy fraction.
//!
//! # Invariants
//! - The wrapped decimal is always within `[0, 1]`.
//! - The only way in is through clamping constructors; deserialization
//!   clamps as well.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Fraction of a person's full-time capacity committed in one slot.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(from = "Decimal", into = "Decimal")]
pub struct OccupancyValue(Decimal);

impl OccupancyValue {
    pub const ZERO: Self = Self(Decimal::ZERO);
    pub const FULL: Self = Self(Decimal::ONE);

    /// Clamps any decimal into the canonical range.
    pub fn clamped(value: Decimal) -> Self {
        Self(value.clamp(Decimal::ZERO, Decimal::ONE).normalize())
    }

    pub fn as_decimal(self) -> Decimal {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }
}

impl From<Decimal> for OccupancyValue {
    fn from(value: Decimal) -> Self {
        Self::clamped(value)
    }
}

impl From<OccupancyValue> for Decimal {
    fn from(value: OccupancyValue) -> Self {
        value.0
    }
}

impl Display for OccupancyValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
