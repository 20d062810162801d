//! Domain model for staffing capacity reconciliation.
//!
//! # Responsibility
//! - Define canonical value types shared by normalization, reconciliation
//!   and commit gating.
//! - Keep occupancy in one canonical fraction type so no downstream code
//!   inspects raw encodings.
//!
//! # Invariants
//! - `OccupancyValue` is always within `[0, 1]`.
//! - `TimeSlot` ordering is `(year, month)`.
//! - `SlotWindow` is contiguous, inclusive and never empty.

pub mod allocation;
pub mod lifecycle;
pub mod occupancy;
pub mod person;
pub mod slot;
