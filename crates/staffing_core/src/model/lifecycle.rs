//! Project lifecycle and occupancy buckets.
//!
//! # Invariants
//! - `Draft` and `Submitted` target the pending bucket; every later state
//!   targets the approved bucket.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Lifecycle state of the project owning a work item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Draft,
    Submitted,
    Approved,
    InProgress,
    Completed,
}

impl LifecycleState {
    /// Bucket that new or edited occupancy lands in for this state.
    ///
    /// Always evaluated against the state at edit time; allocations created
    /// under an earlier state are only moved when they are re-edited.
    pub fn target_bucket(self) -> Bucket {
        match self {
            Self::Draft | Self::Submitted => Bucket::Pending,
            Self::Approved | Self::InProgress | Self::Completed => Bucket::Approved,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Submitted => "submitted",
            Self::Approved => "approved",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

/// Disjoint partition of recorded occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    Approved,
    Pending,
}

impl Bucket {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Pending => "pending",
        }
    }
}

impl Display for Bucket {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::{Bucket, LifecycleState};

    #[test]
    fn early_states_target_pending_bucket() {
        assert_eq!(LifecycleState::Draft.target_bucket(), Bucket::Pending);
        assert_eq!(LifecycleState::Submitted.target_bucket(), Bucket::Pending);
    }

    #[test]
    fn committed_states_target_approved_bucket() {
        for state in [
            LifecycleState::Approved,
            LifecycleState::InProgress,
            LifecycleState::Completed,
        ] {
            assert_eq!(state.target_bucket(), Bucket::Approved);
        }
    }
}
