//! In-progress staffing edits.
//!
//! # Responsibility
//! - Hold the selected person, the work item's slot window and the raw and
//!   derived per-slot input of one edit.
//! - Own the per-session baseline cache, keyed by selection generation.
//!
//! # Invariants
//! - Only the baseline of the current generation is ever accepted.
//! - Raw text is preserved for display even when it derives to zero.
//! - A closed session accepts no further mutations.

pub mod edit_session;
