//! Occupancy value normalization.
//!
//! # Responsibility
//! - Turn every occupancy encoding (typed text, legacy percentages, JSON
//!   numbers, decimals) into one canonical `OccupancyValue`.
//! - Format canonical values back into display text.
//!
//! # Invariants
//! - Normalization is total: it never fails and never panics.
//! - Degraded input collapses to a clamped or zero value and is reported,
//!   never raised.

pub mod value_normalizer;
