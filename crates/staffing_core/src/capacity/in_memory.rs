//! Map-backed capacity source.

use crate::capacity::source::{BaselineRequest, CapacitySource, CapacitySourceError};
use crate::model::allocation::{BaselineMap, BaselineTotals};
use crate::model::person::PersonId;
use crate::model::slot::TimeSlot;
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};

/// In-process capacity source over pre-aggregated totals.
///
/// Unknown people resolve to an empty map (all zero), matching a backend
/// that simply has no recorded allocations for them.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCapacitySource {
    baselines: BTreeMap<PersonId, BaselineMap>,
    unavailable: BTreeSet<PersonId>,
}

impl InMemoryCapacitySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records totals for one person/slot, replacing earlier values.
    pub fn insert(&mut self, person_id: PersonId, slot: TimeSlot, totals: BaselineTotals) {
        self.baselines
            .entry(person_id)
            .or_default()
            .insert(slot, totals);
    }

    /// Makes every fetch for `person_id` fail.
    pub fn mark_unavailable(&mut self, person_id: PersonId) {
        self.unavailable.insert(person_id);
    }
}

#[async_trait]
impl CapacitySource for InMemoryCapacitySource {
    async fn fetch_baseline(
        &self,
        request: &BaselineRequest,
    ) -> Result<BaselineMap, CapacitySourceError> {
        if self.unavailable.contains(&request.person_id) {
            return Err(CapacitySourceError::Unavailable {
                message: "in-memory source marked unavailable".to_string(),
                retryable: false,
            });
        }
        let Some(known) = self.baselines.get(&request.person_id) else {
            return Ok(BaselineMap::new());
        };
        Ok(request
            .slots
            .iter()
            .filter_map(|slot| known.get(slot).map(|totals| (*slot, *totals)))
            .collect())
    }
}
