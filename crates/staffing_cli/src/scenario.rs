//! JSON scenario format for the smoke CLI.
//!
//! # Invariants
//! - Every slot referenced by baseline, existing or input rows must be a
//!   valid `(month, year)` pair; out-of-window inputs fail the run.
//! - Existing allocation values are legacy encodings and go through the
//!   percentage heuristic.

use chrono::NaiveDate;
use serde::Deserialize;
use staffing_core::{
    BaselineAllocation, BaselineTotals, ConfigError, ContractRegime, LifecycleState,
    RawOccupancy, SessionError, SlotError, StaffingConfig, TimeSlot, ValueNormalizer,
    ValueOrigin,
};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use uuid::Uuid;

#[derive(Debug)]
pub enum ScenarioError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Slot(SlotError),
    Config(ConfigError),
    Session(SessionError),
}

impl Display for ScenarioError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read scenario: {err}"),
            Self::Parse(err) => write!(f, "invalid scenario json: {err}"),
            Self::Slot(err) => write!(f, "invalid scenario slot: {err}"),
            Self::Config(err) => write!(f, "invalid scenario config: {err}"),
            Self::Session(err) => write!(f, "scenario edit rejected: {err}"),
        }
    }
}

impl Error for ScenarioError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Slot(err) => Some(err),
            Self::Config(err) => Some(err),
            Self::Session(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ScenarioError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ScenarioError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

impl From<SlotError> for ScenarioError {
    fn from(value: SlotError) -> Self {
        Self::Slot(value)
    }
}

impl From<ConfigError> for ScenarioError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<SessionError> for ScenarioError {
    fn from(value: SessionError) -> Self {
        Self::Session(value)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default)]
    pub config: StaffingConfig,
    pub work_item: WorkItemSpec,
    pub person: PersonSpec,
    #[serde(default)]
    pub baseline: Vec<BaselineRow>,
    #[serde(default)]
    pub existing: Vec<ExistingRow>,
    pub fill_all: Option<String>,
    #[serde(default)]
    pub inputs: Vec<InputRow>,
}

#[derive(Debug, Deserialize)]
pub struct WorkItemSpec {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub lifecycle: LifecycleState,
}

#[derive(Debug, Deserialize)]
pub struct PersonSpec {
    pub display_name: String,
    pub contract: ContractRegime,
}

#[derive(Debug, Deserialize)]
pub struct BaselineRow {
    pub slot: TimeSlot,
    #[serde(flatten)]
    pub totals: BaselineTotals,
}

#[derive(Debug, Deserialize)]
pub struct ExistingRow {
    pub slot: TimeSlot,
    pub value: RawOccupancy,
}

#[derive(Debug, Deserialize)]
pub struct InputRow {
    pub slot: TimeSlot,
    pub raw: String,
}

impl Scenario {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ScenarioError> {
        let scenario: Self = serde_json::from_str(raw)?;
        scenario.config.validate()?;
        Ok(scenario)
    }

    /// Existing allocation values normalized from their legacy encodings.
    pub fn existing_values(&self, normalizer: ValueNormalizer) -> BaselineAllocation {
        self.existing
            .iter()
            .map(|row| {
                let normalized = normalizer.normalize_raw(&row.value, ValueOrigin::Legacy);
                (row.slot, normalized.value)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{Scenario, ScenarioError};
    use rust_decimal::Decimal;
    use staffing_core::{LifecycleState, TimeSlot, ValueNormalizer};

    const SAMPLE: &str = r#"{
        "work_item": {"start": "2025-01-10", "end": "2025-03-20", "lifecycle": "approved"},
        "person": {"display_name": "Ada", "contract": "full_time"},
        "baseline": [{"slot": {"month": 1, "year": 2025}, "approved": "0.6", "pending": "0"}],
        "existing": [{"slot": {"month": 2, "year": 2025}, "value": 40}],
        "inputs": [{"slot": {"month": 1, "year": 2025}, "raw": "0,3"}]
    }"#;

    #[test]
    fn parses_sample_scenario() {
        let scenario = Scenario::from_json_str(SAMPLE).expect("sample should parse");
        assert_eq!(scenario.work_item.lifecycle, LifecycleState::Approved);
        assert_eq!(scenario.baseline.len(), 1);
        assert_eq!(scenario.inputs[0].raw, "0,3");

        let existing = scenario.existing_values(ValueNormalizer::default());
        let feb = TimeSlot::new(2, 2025).expect("valid slot");
        assert_eq!(existing[&feb].as_decimal(), Decimal::new(4, 1));
    }

    #[test]
    fn rejects_invalid_slot_month() {
        let broken = SAMPLE.replace(r#""month": 2"#, r#""month": 13"#);
        let err = Scenario::from_json_str(&broken).expect_err("month 13 must fail");
        assert!(matches!(err, ScenarioError::Parse(_)));
    }
}
