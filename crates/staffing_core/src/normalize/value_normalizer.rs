//! Occupancy parser/formatter.

use crate::config::DecimalSeparator;
use crate::model::occupancy::OccupancyValue;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

static DECIMAL_INPUT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d*(?:[.,]\d*)?$").expect("valid decimal input regex"));

/// Where a raw occupancy value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueOrigin {
    /// Typed by the user in the current edit; already fraction-scaled.
    UserInput,
    /// Imported from older records that may be percentage-scaled (0..100).
    Legacy,
}

/// Heterogeneous encodings accepted at the import boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawOccupancy {
    Number(f64),
    Text(String),
}

/// Reason why a raw input did not map cleanly onto the canonical range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Degradation {
    /// Not a decimal number; collapsed to zero.
    Unparsable,
    /// Parsed but outside `[0, 1]`; clamped.
    Clamped,
}

/// Canonical value plus degradation report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedInput {
    pub value: OccupancyValue,
    pub degradation: Option<Degradation>,
}

impl NormalizedInput {
    fn clean(value: OccupancyValue) -> Self {
        Self {
            value,
            degradation: None,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.degradation.is_some()
    }
}

/// Converts raw occupancy encodings to and from the canonical fraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValueNormalizer {
    separator: DecimalSeparator,
}

impl ValueNormalizer {
    pub fn new(separator: DecimalSeparator) -> Self {
        Self { separator }
    }

    pub fn separator(&self) -> DecimalSeparator {
        self.separator
    }

    /// Parses direct user input; never fails.
    pub fn parse(&self, raw: &str) -> OccupancyValue {
        self.normalize(raw).value
    }

    /// Parses direct user input and reports how it degraded, if at all.
    ///
    /// Empty input is a deliberate zero, not a degradation.
    pub fn normalize(&self, raw: &str) -> NormalizedInput {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return NormalizedInput::clean(OccupancyValue::ZERO);
        }
        match parse_decimal_text(trimmed) {
            Some(value) => clamp_reporting(value),
            None => NormalizedInput {
                value: OccupancyValue::ZERO,
                degradation: Some(Degradation::Unparsable),
            },
        }
    }

    /// Normalizes a legacy value that may be percentage-scaled.
    ///
    /// Values above 1 are read as percentages and divided by 100 before
    /// clamping; values within `[0, 1]` are already fractions.
    pub fn from_legacy_percentage(&self, value: Decimal) -> OccupancyValue {
        OccupancyValue::clamped(rescale_legacy(value))
    }

    /// Textual form of `from_legacy_percentage`; unparsable text yields 0.
    pub fn parse_legacy(&self, raw: &str) -> OccupancyValue {
        parse_decimal_text(raw.trim())
            .map(|value| self.from_legacy_percentage(value))
            .unwrap_or(OccupancyValue::ZERO)
    }

    /// Normalizes any import-boundary encoding according to its origin.
    pub fn normalize_raw(&self, raw: &RawOccupancy, origin: ValueOrigin) -> NormalizedInput {
        let parsed = match raw {
            RawOccupancy::Number(number) => Decimal::from_f64(*number),
            RawOccupancy::Text(text) if text.trim().is_empty() => {
                return NormalizedInput::clean(OccupancyValue::ZERO)
            }
            RawOccupancy::Text(text) => parse_decimal_text(text.trim()),
        };
        let Some(value) = parsed else {
            return NormalizedInput {
                value: OccupancyValue::ZERO,
                degradation: Some(Degradation::Unparsable),
            };
        };
        match origin {
            ValueOrigin::UserInput => clamp_reporting(value),
            ValueOrigin::Legacy => clamp_reporting(rescale_legacy(value)),
        }
    }

    /// Two-decimal display text using the configured separator.
    pub fn format(&self, value: OccupancyValue) -> String {
        let mut rounded = value
            .as_decimal()
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(2);
        let text = rounded.to_string();
        match self.separator {
            DecimalSeparator::Dot => text,
            DecimalSeparator::Comma => text.replace('.', ","),
        }
    }
}

fn rescale_legacy(value: Decimal) -> Decimal {
    if value > Decimal::ONE {
        value / Decimal::ONE_HUNDRED
    } else {
        value
    }
}

fn clamp_reporting(value: Decimal) -> NormalizedInput {
    let clamped = OccupancyValue::clamped(value);
    let degradation = (clamped.as_decimal() != value.normalize()).then_some(Degradation::Clamped);
    NormalizedInput {
        value: clamped,
        degradation,
    }
}

fn parse_decimal_text(trimmed: &str) -> Option<Decimal> {
    if !DECIMAL_INPUT_RE.is_match(trimmed) || !trimmed.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    let mut canonical = trimmed.replace(',', ".");
    if canonical.starts_with('.') {
        canonical.insert(0, '0');
    }
    if canonical.ends_with('.') {
        canonical.pop();
    }
    Decimal::from_str(&canonical).ok()
}

#[cfg(test)]
mod tests {
    use super::{Degradation, RawOccupancy, ValueNormalizer, ValueOrigin};
    use crate::config::DecimalSeparator;
    use crate::model::occupancy::OccupancyValue;
    use rust_decimal::Decimal;

    fn comma() -> ValueNormalizer {
        ValueNormalizer::new(DecimalSeparator::Comma)
    }

    #[test]
    fn accepts_comma_and_dot_separators() {
        let normalizer = comma();
        assert_eq!(normalizer.parse("0,5").as_decimal(), Decimal::new(5, 1));
        assert_eq!(normalizer.parse("0.33").as_decimal(), Decimal::new(33, 2));
        assert_eq!(normalizer.parse(",25").as_decimal(), Decimal::new(25, 2));
        assert_eq!(normalizer.parse("1,").as_decimal(), Decimal::ONE);
    }

    #[test]
    fn empty_input_is_zero_without_degradation() {
        let normalized = comma().normalize("   ");
        assert_eq!(normalized.value, OccupancyValue::ZERO);
        assert!(!normalized.is_degraded());
    }

    #[test]
    fn garbage_degrades_to_zero() {
        for raw in ["abc", "-0.5", "1.2.3", ".", "0,5%"] {
            let normalized = comma().normalize(raw);
            assert_eq!(normalized.value, OccupancyValue::ZERO, "input {raw}");
            assert_eq!(normalized.degradation, Some(Degradation::Unparsable), "input {raw}");
        }
    }

    #[test]
    fn direct_input_is_clamped_without_percentage_heuristic() {
        let normalized = comma().normalize("50");
        assert_eq!(normalized.value, OccupancyValue::FULL);
        assert_eq!(normalized.degradation, Some(Degradation::Clamped));
    }

    #[test]
    fn legacy_percentages_are_rescaled() {
        let normalizer = comma();
        assert_eq!(
            normalizer.from_legacy_percentage(Decimal::new(40, 0)).as_decimal(),
            Decimal::new(4, 1)
        );
        assert_eq!(
            normalizer.from_legacy_percentage(Decimal::new(5, 1)).as_decimal(),
            Decimal::new(5, 1)
        );
        assert_eq!(normalizer.from_legacy_percentage(Decimal::new(250, 0)), OccupancyValue::FULL);
        assert_eq!(normalizer.parse_legacy("75,0").as_decimal(), Decimal::new(75, 2));
        assert_eq!(normalizer.parse_legacy("n/a"), OccupancyValue::ZERO);
    }

    #[test]
    fn raw_encodings_follow_origin() {
        let normalizer = comma();
        let legacy = normalizer.normalize_raw(&RawOccupancy::Number(60.0), ValueOrigin::Legacy);
        assert_eq!(legacy.value.as_decimal(), Decimal::new(6, 1));
        assert!(!legacy.is_degraded());

        let typed = normalizer.normalize_raw(&RawOccupancy::Number(60.0), ValueOrigin::UserInput);
        assert_eq!(typed.value, OccupancyValue::FULL);
        assert_eq!(typed.degradation, Some(Degradation::Clamped));

        let text = normalizer
            .normalize_raw(&RawOccupancy::Text("0,25".to_string()), ValueOrigin::UserInput);
        assert_eq!(text.value.as_decimal(), Decimal::new(25, 2));

        let nan = normalizer.normalize_raw(&RawOccupancy::Number(f64::NAN), ValueOrigin::Legacy);
        assert_eq!(nan.degradation, Some(Degradation::Unparsable));
    }

    #[test]
    fn formats_two_decimals_with_configured_separator() {
        let value = comma().parse("0.5");
        assert_eq!(comma().format(value), "0,50");
        assert_eq!(ValueNormalizer::new(DecimalSeparator::Dot).format(value), "0.50");
        assert_eq!(comma().format(comma().parse("0.125")), "0,13");
        assert_eq!(comma().format(OccupancyValue::FULL), "1,00");
        assert_eq!(comma().format(OccupancyValue::ZERO), "0,00");
    }

    #[test]
    fn format_parse_round_trip_is_stable() {
        let normalizer = comma();
        for raw in ["0,00", "0,33", "0,50", "0,99", "1,00"] {
            let once = normalizer.format(normalizer.parse(raw));
            let twice = normalizer.format(normalizer.parse(&once));
            assert_eq!(once, raw);
            assert_eq!(twice, once);
        }
    }
}
