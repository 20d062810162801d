//! Commit decision and allocation plan.

use crate::ledger::constraint::{ConstraintChecker, ConstraintStatus};
use crate::ledger::reconciler::{reconcile, ReconcileInput};
use crate::model::allocation::{Allocation, ProjectedTotals, WorkItemId};
use crate::model::occupancy::OccupancyValue;
use crate::model::person::PersonId;
use crate::model::slot::TimeSlot;
use crate::session::edit_session::{EditSession, SessionState};
use rust_decimal::Decimal;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Slot that blocks a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OffendingSlot {
    pub slot: TimeSlot,
    /// Projected approved occupancy in percent, e.g. `110`.
    pub approved_percent: Decimal,
}

/// Over-allocation refusal naming every offending slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitRefusal {
    pub offending: Vec<OffendingSlot>,
}

impl Display for CommitRefusal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "person would be over-allocated in ")?;
        for (index, offending) in self.offending.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} ({}%)", offending.slot, offending.approved_percent)?;
        }
        Ok(())
    }
}

impl Error for CommitRefusal {}

/// Commit precondition and validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitError {
    /// Session is closed.
    NoActiveSession,
    NoPersonSelected,
    /// Baseline fetch still in flight; projections would be incomplete.
    BaselinePending,
    OverAllocated(CommitRefusal),
}

impl Display for CommitError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoActiveSession => write!(f, "invalid state: no active edit session"),
            Self::NoPersonSelected => write!(f, "invalid state: no person selected"),
            Self::BaselinePending => write!(f, "invalid state: baseline still loading"),
            Self::OverAllocated(refusal) => write!(f, "{refusal}"),
        }
    }
}

impl Error for CommitError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::OverAllocated(refusal) => Some(refusal),
            _ => None,
        }
    }
}

impl From<CommitRefusal> for CommitError {
    fn from(value: CommitRefusal) -> Self {
        Self::OverAllocated(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitMode {
    /// Editing an existing assignment: every slot, zeros included, so
    /// persistence can delete slots that were zeroed out.
    Replace,
    /// New assignment: zero-valued slots are dropped.
    InsertNonZero,
}

/// Allocations to hand to persistence after a successful commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitPlan {
    pub person_id: PersonId,
    pub work_item_id: WorkItemId,
    pub mode: CommitMode,
    pub allocations: Vec<Allocation>,
}

/// Hard gate on approved-bucket over-allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommitGate {
    checker: ConstraintChecker,
}

impl CommitGate {
    pub fn new(checker: ConstraintChecker) -> Self {
        Self { checker }
    }

    /// True iff no slot is over-allocated in the approved bucket.
    pub fn can_commit(&self, projections: &[ProjectedTotals]) -> bool {
        self.check(projections).is_ok()
    }

    /// Refuses with every over-allocated slot, in window order.
    pub fn check(&self, projections: &[ProjectedTotals]) -> Result<(), CommitRefusal> {
        let offending: Vec<OffendingSlot> = projections
            .iter()
            .filter(|projection| {
                self.checker.classify(projection.approved) == ConstraintStatus::OverAllocated
            })
            .map(|projection| OffendingSlot {
                slot: projection.slot,
                approved_percent: projection
                    .approved
                    .saturating_mul(Decimal::ONE_HUNDRED)
                    .normalize(),
            })
            .collect();
        if offending.is_empty() {
            Ok(())
        } else {
            Err(CommitRefusal { offending })
        }
    }

    /// Validates the session and builds its allocation plan.
    ///
    /// Projections are recomputed from the session itself so a stale preview
    /// can never authorize a commit. Nothing is produced on refusal.
    pub fn commit(&self, session: &EditSession) -> Result<CommitPlan, CommitError> {
        match session.state() {
            SessionState::Closed => return Err(CommitError::NoActiveSession),
            SessionState::Populating => return Err(CommitError::BaselinePending),
            SessionState::New | SessionState::Ready => {}
        }
        let person_id = session
            .person()
            .map(|person| person.id)
            .ok_or(CommitError::NoPersonSelected)?;

        let projections = reconcile(&ReconcileInput::from_session(session));
        self.check(&projections)?;

        let work_item_id = session.context().work_item_id;
        let allocation = |slot: TimeSlot, value: OccupancyValue| Allocation {
            person_id,
            work_item_id,
            slot,
            value,
        };
        let in_window = session
            .window()
            .slots()
            .iter()
            .map(|slot| allocation(*slot, session.derived_value(*slot)));

        let (mode, allocations) = match session.existing_values() {
            Some(existing) => {
                let mut allocations: Vec<Allocation> = in_window.collect();
                // Committed slots outside the current period are zeroed too.
                allocations.extend(
                    existing
                        .keys()
                        .filter(|slot| !session.window().contains(**slot))
                        .map(|slot| allocation(*slot, OccupancyValue::ZERO)),
                );
                allocations.sort_by_key(|allocation| allocation.slot);
                (CommitMode::Replace, allocations)
            }
            None => (
                CommitMode::InsertNonZero,
                in_window.filter(|allocation| !allocation.value.is_zero()).collect(),
            ),
        };

        Ok(CommitPlan {
            person_id,
            work_item_id,
            mode,
            allocations,
        })
    }
}
