//! Core staffing capacity ledger.
//! This crate is the single source of truth for occupancy invariants: it
//! normalizes input, reconciles edits against recorded commitments and gates
//! commits that would over-allocate a person.

pub mod capacity;
pub mod config;
pub mod ledger;
pub mod logging;
pub mod model;
pub mod normalize;
pub mod service;
pub mod session;

pub use capacity::in_memory::InMemoryCapacitySource;
pub use capacity::source::{
    BaselineRequest, BaselineSnapshot, CapacitySource, CapacitySourceError, Generation,
};
pub use config::{CapacityThresholds, ConfigError, DecimalSeparator, StaffingConfig};
pub use ledger::commit_gate::{
    CommitError, CommitGate, CommitMode, CommitPlan, CommitRefusal, OffendingSlot,
};
pub use ledger::constraint::{
    ConstraintChecker, ConstraintStatus, Finding, Severity, SlotAssessment,
};
pub use ledger::reconciler::{
    reconcile, CrossingDirection, LedgerReconciler, ReconcileInput, Reconciliation,
    RecomputeCause, ThresholdCrossing,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::allocation::{
    Allocation, BaselineAllocation, BaselineMap, BaselineTotals, ProjectedTotals, WorkItemId,
};
pub use model::lifecycle::{Bucket, LifecycleState};
pub use model::occupancy::OccupancyValue;
pub use model::person::{ContractRegime, Person, PersonId};
pub use model::slot::{SlotError, SlotWindow, TimeSlot};
pub use normalize::value_normalizer::{
    Degradation, NormalizedInput, RawOccupancy, ValueNormalizer, ValueOrigin,
};
pub use service::staffing_service::{
    AllocationSink, LedgerPreview, LedgerRow, LedgerUpdate, StaffingService,
};
pub use session::edit_session::{
    BaselineOutcome, EditSession, ExistingAllocation, SessionError, SessionState,
    WorkItemContext,
};

/// Minimal health-check API for integration probes.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
