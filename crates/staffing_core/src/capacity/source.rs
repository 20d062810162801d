//! Capacity source SPI and per-session baseline snapshots.

use crate::model::allocation::{BaselineMap, BaselineTotals, WorkItemId};
use crate::model::person::PersonId;
use crate::model::slot::TimeSlot;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Person-selection counter used to tag baseline requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Generation(u64);

impl Generation {
    pub const INITIAL: Self = Self(0);

    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl Display for Generation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Baseline fetch errors reported by a capacity source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapacitySourceError {
    /// Transport or backend failure; `retryable` hints whether retrying helps.
    Unavailable { message: String, retryable: bool },
}

impl Display for CapacitySourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable { message, .. } => write!(f, "baseline unavailable: {message}"),
        }
    }
}

impl Error for CapacitySourceError {}

/// One baseline fetch, tagged with the generation it was issued for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BaselineRequest {
    pub generation: Generation,
    pub person_id: PersonId,
    /// Work item whose allocations must be excluded from the totals.
    pub work_item_id: WorkItemId,
    pub slots: Vec<TimeSlot>,
}

/// Asynchronous supplier of already-committed totals.
#[async_trait]
pub trait CapacitySource: Send + Sync {
    /// Returns totals per requested slot. Missing slots count as zero.
    async fn fetch_baseline(
        &self,
        request: &BaselineRequest,
    ) -> Result<BaselineMap, CapacitySourceError>;
}

/// Baseline cached by one edit session for one generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaselineSnapshot {
    pub generation: Generation,
    pub person_id: PersonId,
    pub totals: BaselineMap,
    /// Set when the fetch failed and totals were defaulted to zero.
    pub degraded: bool,
}

impl BaselineSnapshot {
    /// Builds the snapshot for `request` from a fetch result.
    ///
    /// Every requested slot gets an entry; totals outside the request are
    /// ignored and negatives are floored at zero.
    pub fn from_result(
        request: &BaselineRequest,
        result: Result<BaselineMap, CapacitySourceError>,
    ) -> Self {
        let (fetched, degraded) = match result {
            Ok(map) => (map, false),
            Err(_) => (BaselineMap::new(), true),
        };
        let totals = request
            .slots
            .iter()
            .map(|slot| {
                let totals = fetched
                    .get(slot)
                    .copied()
                    .map(BaselineTotals::floored)
                    .unwrap_or(BaselineTotals::EMPTY);
                (*slot, totals)
            })
            .collect();
        Self {
            generation: request.generation,
            person_id: request.person_id,
            totals,
            degraded,
        }
    }

    pub fn totals_for(&self, slot: TimeSlot) -> BaselineTotals {
        self.totals
            .get(&slot)
            .copied()
            .unwrap_or(BaselineTotals::EMPTY)
    }
}
