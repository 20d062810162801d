//! Occupancy classification and severity tiers.

use crate::config::CapacityThresholds;
use crate::model::allocation::ProjectedTotals;
use crate::model::slot::TimeSlot;
use rust_decimal::Decimal;
use serde::Serialize;

/// Classification of a projected approved total. Ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintStatus {
    Normal,
    NearLimit,
    OverAllocated,
}

impl ConstraintStatus {
    pub fn ordinal(self) -> u8 {
        match self {
            Self::Normal => 0,
            Self::NearLimit => 1,
            Self::OverAllocated => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::NearLimit => "near_limit",
            Self::OverAllocated => "over_allocated",
        }
    }
}

/// Whether a finding only warns or also refuses the commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Advisory,
    Blocking,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Finding {
    ApprovedOverAllocated,
    ApprovedNearLimit,
    PendingOverCommitted,
    /// Approved alone is fine but approved + pending reaches the limit.
    CombinedOverCommitted,
}

impl Finding {
    pub fn severity(self) -> Severity {
        match self {
            Self::ApprovedOverAllocated => Severity::Blocking,
            Self::ApprovedNearLimit | Self::PendingOverCommitted | Self::CombinedOverCommitted => {
                Severity::Advisory
            }
        }
    }
}

/// Classification of one projected slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotAssessment {
    pub slot: TimeSlot,
    pub approved: Decimal,
    pub pending: Decimal,
    pub status: ConstraintStatus,
    pub findings: Vec<Finding>,
}

impl SlotAssessment {
    pub fn is_blocking(&self) -> bool {
        self.findings
            .iter()
            .any(|finding| finding.severity() == Severity::Blocking)
    }

    /// Highest severity among findings, `None` when the slot is clean.
    pub fn max_severity(&self) -> Option<Severity> {
        self.findings.iter().map(|finding| finding.severity()).max()
    }
}

/// Pure classifier over configured thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConstraintChecker {
    thresholds: CapacityThresholds,
}

impl ConstraintChecker {
    pub fn new(thresholds: CapacityThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> CapacityThresholds {
        self.thresholds
    }

    /// Monotonic in `approved`; total over every decimal.
    pub fn classify(&self, approved: Decimal) -> ConstraintStatus {
        if approved >= self.thresholds.over_allocated {
            ConstraintStatus::OverAllocated
        } else if approved >= self.thresholds.near_limit {
            ConstraintStatus::NearLimit
        } else {
            ConstraintStatus::Normal
        }
    }

    pub fn assess(&self, projection: &ProjectedTotals) -> SlotAssessment {
        let status = self.classify(projection.approved);
        let over = self.thresholds.over_allocated;
        let mut findings = Vec::new();
        match status {
            ConstraintStatus::OverAllocated => findings.push(Finding::ApprovedOverAllocated),
            ConstraintStatus::NearLimit => findings.push(Finding::ApprovedNearLimit),
            ConstraintStatus::Normal => {}
        }
        if projection.pending >= over {
            findings.push(Finding::PendingOverCommitted);
        }
        if projection.approved < over && projection.combined() >= over {
            findings.push(Finding::CombinedOverCommitted);
        }

        SlotAssessment {
            slot: projection.slot,
            approved: projection.approved,
            pending: projection.pending,
            status,
            findings,
        }
    }

    pub fn assess_all(&self, projections: &[ProjectedTotals]) -> Vec<SlotAssessment> {
        projections
            .iter()
            .map(|projection| self.assess(projection))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{ConstraintChecker, ConstraintStatus, Finding, Severity};
    use crate::model::allocation::ProjectedTotals;
    use crate::model::slot::TimeSlot;
    use rust_decimal::Decimal;

    fn projection(approved: Decimal, pending: Decimal) -> ProjectedTotals {
        ProjectedTotals {
            slot: TimeSlot::new(5, 2025).expect("valid slot"),
            approved,
            pending,
        }
    }

    #[test]
    fn classifies_threshold_boundaries_inclusively() {
        let checker = ConstraintChecker::default();
        assert_eq!(checker.classify(Decimal::new(79, 2)), ConstraintStatus::Normal);
        assert_eq!(checker.classify(Decimal::new(8, 1)), ConstraintStatus::NearLimit);
        assert_eq!(checker.classify(Decimal::new(999, 3)), ConstraintStatus::NearLimit);
        assert_eq!(checker.classify(Decimal::ONE), ConstraintStatus::OverAllocated);
        assert_eq!(checker.classify(Decimal::new(25, 1)), ConstraintStatus::OverAllocated);
    }

    #[test]
    fn classification_is_monotonic() {
        let checker = ConstraintChecker::default();
        let samples: Vec<Decimal> = (0..=150).map(|step| Decimal::new(step, 2)).collect();
        for pair in samples.windows(2) {
            assert!(
                checker.classify(pair[0]).ordinal() <= checker.classify(pair[1]).ordinal(),
                "classification decreased between {} and {}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn pending_overcommitment_is_advisory_only() {
        let checker = ConstraintChecker::default();
        let assessment = checker.assess(&projection(Decimal::new(2, 1), Decimal::new(13, 1)));
        assert_eq!(assessment.status, ConstraintStatus::Normal);
        assert_eq!(assessment.findings, vec![Finding::PendingOverCommitted]);
        assert!(!assessment.is_blocking());
        assert_eq!(assessment.max_severity(), Some(Severity::Advisory));
    }

    #[test]
    fn combined_overcommitment_is_flagged_below_approved_limit() {
        let checker = ConstraintChecker::default();
        let assessment = checker.assess(&projection(Decimal::new(9, 1), Decimal::new(7, 1)));
        assert_eq!(
            assessment.findings,
            vec![Finding::ApprovedNearLimit, Finding::CombinedOverCommitted]
        );
        assert!(!assessment.is_blocking());
    }

    #[test]
    fn approved_overallocation_blocks() {
        let checker = ConstraintChecker::default();
        let assessment = checker.assess(&projection(Decimal::new(11, 1), Decimal::ZERO));
        assert_eq!(assessment.findings, vec![Finding::ApprovedOverAllocated]);
        assert!(assessment.is_blocking());
    }
}
