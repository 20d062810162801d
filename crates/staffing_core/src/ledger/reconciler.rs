//! Per-slot projection of an edit onto the recorded baseline.

use crate::capacity::source::BaselineSnapshot;
use crate::model::allocation::{BaselineAllocation, BaselineTotals, ProjectedTotals};
use crate::model::lifecycle::{Bucket, LifecycleState};
use crate::model::occupancy::OccupancyValue;
use crate::model::slot::{SlotWindow, TimeSlot};
use crate::session::edit_session::EditSession;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Everything a projection depends on, borrowed from the caller.
#[derive(Debug, Clone, Copy)]
pub struct ReconcileInput<'a> {
    pub window: &'a SlotWindow,
    /// Current lifecycle; picks the bucket for both the subtraction of the
    /// replaced allocation and the new input.
    pub lifecycle: LifecycleState,
    pub baseline: Option<&'a BaselineSnapshot>,
    pub existing: Option<&'a BaselineAllocation>,
    pub values: &'a BTreeMap<TimeSlot, OccupancyValue>,
}

impl<'a> ReconcileInput<'a> {
    pub fn from_session(session: &'a EditSession) -> Self {
        Self {
            window: session.window(),
            lifecycle: session.lifecycle(),
            baseline: session.baseline(),
            existing: session.existing_values(),
            values: session.derived_values(),
        }
    }
}

/// Projects every slot of the window. Pure: equal input, equal output.
pub fn reconcile(input: &ReconcileInput<'_>) -> Vec<ProjectedTotals> {
    let target = input.lifecycle.target_bucket();
    input
        .window
        .slots()
        .iter()
        .map(|slot| {
            let baseline = input
                .baseline
                .map(|snapshot| snapshot.totals_for(*slot))
                .unwrap_or(BaselineTotals::EMPTY);
            let replaced = input
                .existing
                .and_then(|existing| existing.get(slot))
                .copied()
                .unwrap_or(OccupancyValue::ZERO);
            let value = input
                .values
                .get(slot)
                .copied()
                .unwrap_or(OccupancyValue::ZERO);
            project_slot(*slot, baseline, target, replaced, value)
        })
        .collect()
}

fn project_slot(
    slot: TimeSlot,
    baseline: BaselineTotals,
    target: Bucket,
    replaced: OccupancyValue,
    value: OccupancyValue,
) -> ProjectedTotals {
    let mut approved = baseline.approved.max(Decimal::ZERO);
    let mut pending = baseline.pending.max(Decimal::ZERO);
    let bucket = match target {
        Bucket::Approved => &mut approved,
        Bucket::Pending => &mut pending,
    };
    *bucket = bucket
        .saturating_sub(replaced.as_decimal())
        .max(Decimal::ZERO)
        .saturating_add(value.as_decimal());

    ProjectedTotals {
        slot,
        approved: approved.normalize(),
        pending: pending.normalize(),
    }
}

/// What triggered a recompute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecomputeCause {
    /// User changed slot input.
    Edit,
    /// Baseline arrived or the selected person changed.
    BaselineChanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossingDirection {
    /// Approved total reached the over-allocation threshold.
    Up,
    /// Approved total dropped back below the threshold.
    Down,
}

/// One-shot advisory: an edit moved a slot across the over-allocation line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThresholdCrossing {
    pub slot: TimeSlot,
    pub direction: CrossingDirection,
    pub before: Decimal,
    pub after: Decimal,
}

/// Projections of one recompute plus the crossings it caused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub projections: Vec<ProjectedTotals>,
    pub crossings: Vec<ThresholdCrossing>,
}

/// Stateful wrapper around `reconcile` that tracks crossings between
/// consecutive recomputes.
#[derive(Debug, Clone)]
pub struct LedgerReconciler {
    over_allocated: Decimal,
    last_approved: BTreeMap<TimeSlot, Decimal>,
}

impl LedgerReconciler {
    pub fn new(over_allocated: Decimal) -> Self {
        Self {
            over_allocated,
            last_approved: BTreeMap::new(),
        }
    }

    /// Recomputes projections; crossings are only reported for edits.
    pub fn recompute(
        &mut self,
        input: &ReconcileInput<'_>,
        cause: RecomputeCause,
    ) -> Reconciliation {
        let projections = reconcile(input);
        let crossings = match cause {
            RecomputeCause::Edit => self.crossings(&projections),
            RecomputeCause::BaselineChanged => Vec::new(),
        };
        self.last_approved = projections
            .iter()
            .map(|projection| (projection.slot, projection.approved))
            .collect();
        Reconciliation {
            projections,
            crossings,
        }
    }

    /// Drops tracked totals, e.g. after a reset.
    pub fn forget(&mut self) {
        self.last_approved.clear();
    }

    fn crossings(&self, projections: &[ProjectedTotals]) -> Vec<ThresholdCrossing> {
        projections
            .iter()
            .filter_map(|projection| {
                let before = *self.last_approved.get(&projection.slot)?;
                let was_over = before >= self.over_allocated;
                let is_over = projection.approved >= self.over_allocated;
                let direction = match (was_over, is_over) {
                    (false, true) => CrossingDirection::Up,
                    (true, false) => CrossingDirection::Down,
                    _ => return None,
                };
                Some(ThresholdCrossing {
                    slot: projection.slot,
                    direction,
                    before,
                    after: projection.approved,
                })
            })
            .collect()
    }
}
