//! Monthly allocation slots and work item slot windows.
//!
//! # Responsibility
//! - Represent one `(month, year)` capacity unit.
//! - Derive the inclusive, contiguous slot window of a work item period.
//!
//! # Invariants
//! - `month` is always within `1..=12`.
//! - A `SlotWindow` holds at least one slot, in ascending order, no gaps.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Slot validation and window derivation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotError {
    InvalidMonth(u32),
    ReversedPeriod { start: NaiveDate, end: NaiveDate },
    WindowTooLarge { slots: usize, max: usize },
}

impl Display for SlotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidMonth(month) => write!(f, "month must be within 1..=12, got {month}"),
            Self::ReversedPeriod { start, end } => {
                write!(f, "work item period ends ({end}) before it starts ({start})")
            }
            Self::WindowTooLarge { slots, max } => {
                write!(f, "slot window spans {slots} months; at most {max} allowed")
            }
        }
    }
}

impl Error for SlotError {}

/// One month of allocation capacity.
///
/// Field order matters: the derived `Ord` compares `year` first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawTimeSlot")]
pub struct TimeSlot {
    year: i32,
    month: u32,
}

#[derive(Deserialize)]
struct RawTimeSlot {
    month: u32,
    year: i32,
}

impl TryFrom<RawTimeSlot> for TimeSlot {
    type Error = SlotError;

    fn try_from(value: RawTimeSlot) -> Result<Self, Self::Error> {
        TimeSlot::new(value.month, value.year)
    }
}

impl TimeSlot {
    /// Creates a slot, rejecting months outside `1..=12`.
    pub fn new(month: u32, year: i32) -> Result<Self, SlotError> {
        if !(1..=12).contains(&month) {
            return Err(SlotError::InvalidMonth(month));
        }
        Ok(Self { year, month })
    }

    /// Slot containing the given calendar date.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn month(self) -> u32 {
        self.month
    }

    pub fn year(self) -> i32 {
        self.year
    }

    /// The following month, rolling over the year boundary.
    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    fn ordinal(self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month) - 1
    }
}

impl Display for TimeSlot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}/{}", self.month, self.year)
    }
}

/// Inclusive, contiguous run of slots covered by one work item.
///
/// Only serializable: windows are always derived, never read back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotWindow {
    slots: Vec<TimeSlot>,
}

impl SlotWindow {
    /// Derives the window from a work item's start/end dates.
    ///
    /// # Errors
    /// - `ReversedPeriod` when `end` precedes `start`.
    /// - `WindowTooLarge` when the period spans more than `max_slots` months.
    pub fn from_period(
        start: NaiveDate,
        end: NaiveDate,
        max_slots: usize,
    ) -> Result<Self, SlotError> {
        if end < start {
            return Err(SlotError::ReversedPeriod { start, end });
        }
        Self::between(TimeSlot::from_date(start), TimeSlot::from_date(end), max_slots)
    }

    /// Builds the window from its first and last slot, both inclusive.
    pub fn between(first: TimeSlot, last: TimeSlot, max_slots: usize) -> Result<Self, SlotError> {
        let span = last.ordinal() - first.ordinal() + 1;
        if span <= 0 {
            // Reported against the first day of each month; only ordering matters here.
            return Err(SlotError::ReversedPeriod {
                start: first_day(first),
                end: first_day(last),
            });
        }
        let span = span as usize;
        if span > max_slots {
            return Err(SlotError::WindowTooLarge {
                slots: span,
                max: max_slots,
            });
        }

        let mut slots = Vec::with_capacity(span);
        let mut cursor = first;
        slots.push(cursor);
        while cursor < last {
            cursor = cursor.next();
            slots.push(cursor);
        }
        Ok(Self { slots })
    }

    pub fn slots(&self) -> &[TimeSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains(&self, slot: TimeSlot) -> bool {
        self.slots.binary_search(&slot).is_ok()
    }

    pub fn first(&self) -> Option<TimeSlot> {
        self.slots.first().copied()
    }

    pub fn last(&self) -> Option<TimeSlot> {
        self.slots.last().copied()
    }
}

fn first_day(slot: TimeSlot) -> NaiveDate {
    NaiveDate::from_ymd_opt(slot.year, slot.month, 1).unwrap_or(NaiveDate::MIN)
}
