//! Staffing edit use-case service.
//!
//! # Responsibility
//! - Drive one `EditSession` through selection, baseline loading, editing
//!   and commit.
//! - Recompute the ledger eagerly after every mutation.
//! - Hand committed plans to an `AllocationSink`.
//!
//! # Invariants
//! - A commit only reaches the sink after the gate accepted it.
//! - The sink is fire-and-forget; rollback is not this service's concern.

use crate::capacity::source::{BaselineRequest, CapacitySource, CapacitySourceError};
use crate::config::StaffingConfig;
use crate::ledger::commit_gate::{CommitError, CommitGate, CommitPlan};
use crate::ledger::constraint::{ConstraintChecker, SlotAssessment};
use crate::ledger::reconciler::{
    reconcile, LedgerReconciler, ReconcileInput, RecomputeCause, ThresholdCrossing,
};
use crate::model::allocation::BaselineMap;
use crate::model::occupancy::OccupancyValue;
use crate::model::person::Person;
use crate::model::slot::TimeSlot;
use crate::normalize::value_normalizer::ValueNormalizer;
use crate::session::edit_session::{
    BaselineOutcome, EditSession, ExistingAllocation, SessionError, WorkItemContext,
};
use log::{info, warn};
use serde::Serialize;

/// Persistence collaborator receiving accepted commit plans.
pub trait AllocationSink {
    fn submit(&self, plan: &CommitPlan);
}

/// One row of the ledger preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerRow {
    pub input: OccupancyValue,
    /// Input formatted for display with the configured separator.
    pub input_text: String,
    #[serde(flatten)]
    pub assessment: SlotAssessment,
}

/// Full ledger state after the latest recompute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerPreview {
    pub rows: Vec<LedgerRow>,
    pub can_commit: bool,
    pub baseline_unavailable: bool,
    pub degraded_slots: Vec<TimeSlot>,
}

/// Preview plus the one-shot crossings the mutation caused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerUpdate {
    pub preview: LedgerPreview,
    pub crossings: Vec<ThresholdCrossing>,
}

/// Interactive staffing service for one work item edit.
pub struct StaffingService<S: CapacitySource, K: AllocationSink> {
    source: S,
    sink: K,
    session: EditSession,
    reconciler: LedgerReconciler,
    checker: ConstraintChecker,
    gate: CommitGate,
    normalizer: ValueNormalizer,
}

impl<S: CapacitySource, K: AllocationSink> StaffingService<S, K> {
    /// Starts a service editing a new assignment.
    pub fn new(config: &StaffingConfig, context: WorkItemContext, source: S, sink: K) -> Self {
        let normalizer = ValueNormalizer::new(config.decimal_separator);
        let session = EditSession::new(context, normalizer);
        Self::with_session(config, session, source, sink)
    }

    /// Starts a service editing an existing assignment.
    pub fn for_existing(
        config: &StaffingConfig,
        context: WorkItemContext,
        existing: ExistingAllocation,
        source: S,
        sink: K,
    ) -> Self {
        let normalizer = ValueNormalizer::new(config.decimal_separator);
        let session = EditSession::for_existing(context, normalizer, existing);
        Self::with_session(config, session, source, sink)
    }

    fn with_session(config: &StaffingConfig, session: EditSession, source: S, sink: K) -> Self {
        let checker = ConstraintChecker::new(config.thresholds);
        Self {
            source,
            sink,
            normalizer: session.normalizer(),
            session,
            reconciler: LedgerReconciler::new(config.thresholds.over_allocated),
            checker,
            gate: CommitGate::new(checker),
        }
    }

    pub fn session(&self) -> &EditSession {
        &self.session
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Selects a person and returns the baseline request to resolve.
    pub fn select_person(&mut self, person: Person) -> Result<BaselineRequest, SessionError> {
        let request = self.session.select_person(person)?;
        self.reconciler.forget();
        Ok(request)
    }

    /// Delivers a baseline fetched by the caller.
    pub fn apply_baseline(
        &mut self,
        request: &BaselineRequest,
        result: Result<BaselineMap, CapacitySourceError>,
    ) -> BaselineOutcome {
        let outcome = self.session.apply_baseline(request, result);
        if outcome != BaselineOutcome::Discarded {
            self.recompute(RecomputeCause::BaselineChanged);
        }
        outcome
    }

    /// Fetches `request` from the capacity source and applies it.
    pub async fn load_baseline(&mut self, request: &BaselineRequest) -> BaselineOutcome {
        let result = self.source.fetch_baseline(request).await;
        self.apply_baseline(request, result)
    }

    /// Selects a person and loads their baseline in one step.
    pub async fn select_and_load(
        &mut self,
        person: Person,
    ) -> Result<BaselineOutcome, SessionError> {
        let request = self.select_person(person)?;
        Ok(self.load_baseline(&request).await)
    }

    pub fn set_slot_value(
        &mut self,
        slot: TimeSlot,
        raw: &str,
    ) -> Result<LedgerUpdate, SessionError> {
        self.session.set_slot_value(slot, raw)?;
        Ok(self.recompute(RecomputeCause::Edit))
    }

    pub fn fill_all(&mut self, raw: &str) -> Result<LedgerUpdate, SessionError> {
        self.session.fill_all(raw)?;
        Ok(self.recompute(RecomputeCause::Edit))
    }

    /// Current ledger without touching crossing state.
    pub fn preview(&self) -> LedgerPreview {
        let projections = reconcile(&ReconcileInput::from_session(&self.session));
        self.build_preview(&self.checker.assess_all(&projections))
    }

    /// Runs the commit gate, submits the plan and closes the session.
    pub fn commit(&mut self) -> Result<CommitPlan, CommitError> {
        let plan = match self.gate.commit(&self.session) {
            Ok(plan) => plan,
            Err(err) => {
                warn!(
                    "event=commit_refused module=service status=error work_item={} reason={}",
                    self.session.context().work_item_id,
                    commit_error_code(&err)
                );
                return Err(err);
            }
        };

        self.sink.submit(&plan);
        self.session.close();
        info!(
            "event=commit_accepted module=service status=ok work_item={} mode={:?} allocations={}",
            plan.work_item_id,
            plan.mode,
            plan.allocations.len()
        );
        Ok(plan)
    }

    pub fn cancel(&mut self) {
        self.session.cancel();
        self.reconciler.forget();
    }

    pub fn reset(&mut self) {
        self.session.reset();
        self.reconciler.forget();
    }

    fn recompute(&mut self, cause: RecomputeCause) -> LedgerUpdate {
        let reconciliation = self
            .reconciler
            .recompute(&ReconcileInput::from_session(&self.session), cause);
        for crossing in &reconciliation.crossings {
            info!(
                "event=threshold_crossed module=service status=ok slot={} direction={:?}",
                crossing.slot, crossing.direction
            );
        }
        let assessments = self.checker.assess_all(&reconciliation.projections);
        LedgerUpdate {
            preview: self.build_preview(&assessments),
            crossings: reconciliation.crossings,
        }
    }

    fn build_preview(&self, assessments: &[SlotAssessment]) -> LedgerPreview {
        let rows = assessments
            .iter()
            .map(|assessment| {
                let input = self.session.derived_value(assessment.slot);
                LedgerRow {
                    input,
                    input_text: self.normalizer.format(input),
                    assessment: assessment.clone(),
                }
            })
            .collect();
        LedgerPreview {
            rows,
            can_commit: !assessments.iter().any(SlotAssessment::is_blocking),
            baseline_unavailable: self.session.baseline_unavailable(),
            degraded_slots: self.session.degraded_slots(),
        }
    }
}

fn commit_error_code(err: &CommitError) -> &'static str {
    match err {
        CommitError::NoActiveSession => "no_active_session",
        CommitError::NoPersonSelected => "no_person_selected",
        CommitError::BaselinePending => "baseline_pending",
        CommitError::OverAllocated(_) => "over_allocated",
    }
}
