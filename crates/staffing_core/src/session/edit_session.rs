//! Edit session state machine.
//!
//! `New -> Populating -> Ready -> Closed`. A failed baseline fetch moves
//! `Populating -> Ready` with the degraded flag set.

use crate::capacity::source::{
    BaselineRequest, BaselineSnapshot, CapacitySourceError, Generation,
};
use crate::model::allocation::{BaselineAllocation, BaselineMap, WorkItemId};
use crate::model::lifecycle::LifecycleState;
use crate::model::occupancy::OccupancyValue;
use crate::model::person::{Person, PersonId};
use crate::model::slot::{SlotWindow, TimeSlot};
use crate::normalize::value_normalizer::ValueNormalizer;
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Session mutation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    Closed,
    SlotOutOfWindow(TimeSlot),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed => write!(f, "edit session is closed"),
            Self::SlotOutOfWindow(slot) => {
                write!(f, "slot {slot} is outside the work item period")
            }
        }
    }
}

impl Error for SessionError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    New,
    /// Baseline fetch in flight.
    Populating,
    Ready,
    Closed,
}

/// Result of delivering a baseline to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaselineOutcome {
    Applied,
    /// Fetch failed; zero baseline installed and flagged.
    Degraded,
    /// Stale generation or session not waiting for a baseline.
    Discarded,
}

/// Work item the edit belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkItemContext {
    pub work_item_id: WorkItemId,
    /// Lifecycle of the owning project at edit time.
    pub lifecycle: LifecycleState,
    pub window: SlotWindow,
}

/// Previously committed allocation being replaced by this edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingAllocation {
    pub person_id: PersonId,
    pub values: BaselineAllocation,
}

/// One interactive staffing edit.
#[derive(Debug, Clone)]
pub struct EditSession {
    context: WorkItemContext,
    normalizer: ValueNormalizer,
    state: SessionState,
    person: Option<Person>,
    generation: Generation,
    raw: BTreeMap<TimeSlot, String>,
    derived: BTreeMap<TimeSlot, OccupancyValue>,
    degraded: BTreeSet<TimeSlot>,
    existing: Option<ExistingAllocation>,
    baseline: Option<BaselineSnapshot>,
}

impl EditSession {
    /// Starts a session for a new assignment on `context`.
    pub fn new(context: WorkItemContext, normalizer: ValueNormalizer) -> Self {
        Self {
            context,
            normalizer,
            state: SessionState::New,
            person: None,
            generation: Generation::INITIAL,
            raw: BTreeMap::new(),
            derived: BTreeMap::new(),
            degraded: BTreeSet::new(),
            existing: None,
            baseline: None,
        }
    }

    /// Starts a session editing an existing assignment.
    ///
    /// In-window slots are pre-filled with the committed values. The person
    /// still has to be selected to fetch the baseline.
    pub fn for_existing(
        context: WorkItemContext,
        normalizer: ValueNormalizer,
        existing: ExistingAllocation,
    ) -> Self {
        let mut session = Self::new(context, normalizer);
        for (slot, value) in &existing.values {
            if session.context.window.contains(*slot) {
                session.raw.insert(*slot, normalizer.format(*value));
                session.derived.insert(*slot, *value);
            }
        }
        session.existing = Some(existing);
        session
    }

    pub fn context(&self) -> &WorkItemContext {
        &self.context
    }

    pub fn window(&self) -> &SlotWindow {
        &self.context.window
    }

    pub fn lifecycle(&self) -> LifecycleState {
        self.context.lifecycle
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn person(&self) -> Option<&Person> {
        self.person.as_ref()
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn normalizer(&self) -> ValueNormalizer {
        self.normalizer
    }

    pub fn baseline(&self) -> Option<&BaselineSnapshot> {
        self.baseline.as_ref()
    }

    /// True when the current baseline was defaulted after a failed fetch.
    pub fn baseline_unavailable(&self) -> bool {
        self.baseline.as_ref().is_some_and(|snapshot| snapshot.degraded)
    }

    /// Committed values being replaced, when editing an existing assignment.
    ///
    /// Only present while the selected person owns the existing assignment.
    pub fn existing_values(&self) -> Option<&BaselineAllocation> {
        self.active_existing().map(|existing| &existing.values)
    }

    pub fn is_editing_existing(&self) -> bool {
        self.active_existing().is_some()
    }

    fn active_existing(&self) -> Option<&ExistingAllocation> {
        let person = self.person.as_ref()?;
        self.existing
            .as_ref()
            .filter(|existing| existing.person_id == person.id)
    }

    pub fn raw_value(&self, slot: TimeSlot) -> Option<&str> {
        self.raw.get(&slot).map(String::as_str)
    }

    /// Derived occupancy for `slot`; unset slots count as zero.
    pub fn derived_value(&self, slot: TimeSlot) -> OccupancyValue {
        self.derived
            .get(&slot)
            .copied()
            .unwrap_or(OccupancyValue::ZERO)
    }

    pub fn derived_values(&self) -> &BTreeMap<TimeSlot, OccupancyValue> {
        &self.derived
    }

    /// Slots whose raw text did not normalize cleanly.
    pub fn degraded_slots(&self) -> Vec<TimeSlot> {
        self.degraded.iter().copied().collect()
    }

    /// Selects the person to staff and issues a fresh baseline request.
    ///
    /// Invalidates any cached baseline. The existing assignment is kept for
    /// the whole session and only applies while its owner is selected.
    pub fn select_person(&mut self, person: Person) -> Result<BaselineRequest, SessionError> {
        self.ensure_open()?;

        self.generation = self.generation.next();
        self.baseline = None;
        if self
            .existing
            .as_ref()
            .is_some_and(|existing| existing.person_id != person.id)
        {
            info!(
                "event=existing_allocation_inactive module=session status=ok work_item={}",
                self.context.work_item_id
            );
        }

        let request = BaselineRequest {
            generation: self.generation,
            person_id: person.id,
            work_item_id: self.context.work_item_id,
            slots: self.context.window.slots().to_vec(),
        };
        self.person = Some(person);
        self.state = SessionState::Populating;

        debug!(
            "event=person_selected module=session status=ok generation={} slots={}",
            self.generation,
            request.slots.len()
        );
        Ok(request)
    }

    /// Delivers the result of `request`.
    ///
    /// Results for any generation but the current one are discarded, so the
    /// last selected person always wins regardless of arrival order.
    pub fn apply_baseline(
        &mut self,
        request: &BaselineRequest,
        result: Result<BaselineMap, CapacitySourceError>,
    ) -> BaselineOutcome {
        if self.state != SessionState::Populating || request.generation != self.generation {
            debug!(
                "event=baseline_discarded module=session status=stale generation={} current={}",
                request.generation, self.generation
            );
            return BaselineOutcome::Discarded;
        }

        if let Err(err) = &result {
            warn!(
                "event=baseline_fetch module=session status=degraded generation={} error={}",
                request.generation, err
            );
        }
        let snapshot = BaselineSnapshot::from_result(request, result);
        let outcome = if snapshot.degraded {
            BaselineOutcome::Degraded
        } else {
            BaselineOutcome::Applied
        };
        self.baseline = Some(snapshot);
        self.state = SessionState::Ready;
        outcome
    }

    /// Stores raw input for one slot and its derived occupancy.
    ///
    /// Unparsable text is kept verbatim and derives to zero.
    pub fn set_slot_value(&mut self, slot: TimeSlot, raw: &str) -> Result<(), SessionError> {
        self.ensure_open()?;
        if !self.context.window.contains(slot) {
            return Err(SessionError::SlotOutOfWindow(slot));
        }

        let normalized = self.normalizer.normalize(raw);
        self.raw.insert(slot, raw.to_string());
        self.derived.insert(slot, normalized.value);
        if normalized.is_degraded() {
            self.degraded.insert(slot);
        } else {
            self.degraded.remove(&slot);
        }
        Ok(())
    }

    /// Applies one raw value to every slot of the window.
    pub fn fill_all(&mut self, raw: &str) -> Result<(), SessionError> {
        self.ensure_open()?;

        let filled = fill_window(&self.context.window, self.normalizer, raw);
        self.raw = filled.raw;
        self.derived = filled.derived;
        self.degraded = filled.degraded;
        Ok(())
    }

    /// Clears person, input, existing assignment and baseline.
    ///
    /// Advances the generation so in-flight fetches are discarded. A closed
    /// session stays closed.
    pub fn reset(&mut self) {
        self.generation = self.generation.next();
        self.person = None;
        self.raw.clear();
        self.derived.clear();
        self.degraded.clear();
        self.existing = None;
        self.baseline = None;
        if self.state != SessionState::Closed {
            self.state = SessionState::New;
        }
    }

    /// Ends the session after a successful commit.
    pub fn close(&mut self) {
        self.generation = self.generation.next();
        self.state = SessionState::Closed;
    }

    /// Ends the session without committing.
    pub fn cancel(&mut self) {
        debug!(
            "event=session_cancelled module=session status=ok work_item={}",
            self.context.work_item_id
        );
        self.close();
    }

    fn ensure_open(&self) -> Result<(), SessionError> {
        if self.state == SessionState::Closed {
            return Err(SessionError::Closed);
        }
        Ok(())
    }
}

struct FilledWindow {
    raw: BTreeMap<TimeSlot, String>,
    derived: BTreeMap<TimeSlot, OccupancyValue>,
    degraded: BTreeSet<TimeSlot>,
}

fn fill_window(window: &SlotWindow, normalizer: ValueNormalizer, raw: &str) -> FilledWindow {
    let normalized = normalizer.normalize(raw);
    let slots = window.slots();
    FilledWindow {
        raw: slots.iter().map(|slot| (*slot, raw.to_string())).collect(),
        derived: slots.iter().map(|slot| (*slot, normalized.value)).collect(),
        degraded: if normalized.is_degraded() {
            slots.iter().copied().collect()
        } else {
            BTreeSet::new()
        },
    }
}
