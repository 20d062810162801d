//! Baseline capacity contract.
//!
//! # Responsibility
//! - Define the asynchronous collaborator that supplies already-recorded
//!   approved/pending totals for one person.
//! - Tag every request with a selection generation so stale answers can be
//!   recognized and dropped.
//!
//! # Invariants
//! - Supplied totals exclude the allocation under edit.
//! - A failed fetch never blocks editing: it degrades to zero totals with a
//!   `degraded` flag.

pub mod in_memory;
pub mod source;
