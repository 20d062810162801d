//! Capacity ledger: projection, classification and commit gating.
//!
//! # Responsibility
//! - Fold an edit session into per-slot projected approved/pending totals.
//! - Classify projected approved occupancy into severity tiers.
//! - Decide whether an edit may be persisted.
//!
//! # Invariants
//! - Projected buckets are never negative.
//! - Only the approved bucket can block a commit; pending overcommitment is
//!   advisory.
//! - A refused commit produces no allocations at all.

pub mod commit_gate;
pub mod constraint;
pub mod reconciler;
