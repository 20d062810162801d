//! Allocation records and per-slot totals.
//!
//! # Invariants
//! - `BaselineTotals` buckets are never negative; they may exceed 1 when
//!   previously recorded data is already inconsistent.
//! - `ProjectedTotals` buckets are never negative.

use crate::model::occupancy::OccupancyValue;
use crate::model::person::PersonId;
use crate::model::slot::TimeSlot;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Stable identifier for the work item owning allocations.
pub type WorkItemId = Uuid;

/// Already-recorded occupancy for one person in one slot, excluding the
/// allocation under edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BaselineTotals {
    pub approved: Decimal,
    pub pending: Decimal,
}

impl BaselineTotals {
    pub const EMPTY: Self = Self {
        approved: Decimal::ZERO,
        pending: Decimal::ZERO,
    };

    /// Builds totals, flooring negative inputs at zero.
    pub fn new(approved: Decimal, pending: Decimal) -> Self {
        Self {
            approved: approved.max(Decimal::ZERO),
            pending: pending.max(Decimal::ZERO),
        }
    }

    /// Re-applies the non-negative floor to externally supplied values.
    pub fn floored(self) -> Self {
        Self::new(self.approved, self.pending)
    }
}

/// Baseline totals keyed by slot.
pub type BaselineMap = BTreeMap<TimeSlot, BaselineTotals>;

/// Previously persisted values of the allocation being edited.
pub type BaselineAllocation = BTreeMap<TimeSlot, OccupancyValue>;

/// One normalized allocation record handed to persistence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub person_id: PersonId,
    pub work_item_id: WorkItemId,
    pub slot: TimeSlot,
    pub value: OccupancyValue,
}

/// Per-slot totals after folding the in-progress edit into the baseline.
///
/// Derived on every recompute and never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProjectedTotals {
    pub slot: TimeSlot,
    pub approved: Decimal,
    pub pending: Decimal,
}

impl ProjectedTotals {
    /// Sum of both buckets, used for the combined advisory.
    pub fn combined(&self) -> Decimal {
        self.approved.saturating_add(self.pending)
    }
}
