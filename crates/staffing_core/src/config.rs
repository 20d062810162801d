//! Runtime configuration for the staffing core.
//!
//! # Responsibility
//! - Load tunable thresholds and display conventions from JSON.
//! - Validate loaded values before any component sees them.
//!
//! # Invariants
//! - `0 < near_limit <= over_allocated`.
//! - `max_window_slots >= 1`.
//! - Missing fields fall back to defaults; unknown fields are rejected.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

/// Default upper bound on the number of months one work item may span.
pub const DEFAULT_MAX_WINDOW_SLOTS: usize = 120;

/// Configuration load/validation errors.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    InvalidThresholds {
        near_limit: Decimal,
        over_allocated: Decimal,
    },
    InvalidWindowLimit(usize),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read config: {err}"),
            Self::Parse(err) => write!(f, "invalid config json: {err}"),
            Self::InvalidThresholds {
                near_limit,
                over_allocated,
            } => write!(
                f,
                "thresholds must satisfy 0 < near_limit <= over_allocated, got {near_limit} and {over_allocated}"
            ),
            Self::InvalidWindowLimit(value) => {
                write!(f, "max_window_slots must be at least 1, got {value}")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Approved-bucket classification boundaries.
///
/// Both boundaries are inclusive lower bounds of their tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CapacityThresholds {
    pub near_limit: Decimal,
    pub over_allocated: Decimal,
}

impl Default for CapacityThresholds {
    fn default() -> Self {
        Self {
            near_limit: Decimal::new(8, 1),
            over_allocated: Decimal::ONE,
        }
    }
}

impl CapacityThresholds {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.near_limit <= Decimal::ZERO || self.near_limit > self.over_allocated {
            return Err(ConfigError::InvalidThresholds {
                near_limit: self.near_limit,
                over_allocated: self.over_allocated,
            });
        }
        Ok(())
    }
}

/// Decimal separator used when formatting occupancy for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecimalSeparator {
    #[default]
    Comma,
    Dot,
}

/// Top-level staffing core configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StaffingConfig {
    pub thresholds: CapacityThresholds,
    pub decimal_separator: DecimalSeparator,
    pub max_window_slots: usize,
}

impl Default for StaffingConfig {
    fn default() -> Self {
        Self {
            thresholds: CapacityThresholds::default(),
            decimal_separator: DecimalSeparator::default(),
            max_window_slots: DEFAULT_MAX_WINDOW_SLOTS,
        }
    }
}

impl StaffingConfig {
    /// Parses and validates configuration from a JSON document.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates configuration from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.thresholds.validate()?;
        if self.max_window_slots == 0 {
            return Err(ConfigError::InvalidWindowLimit(self.max_window_slots));
        }
        Ok(())
    }
}
