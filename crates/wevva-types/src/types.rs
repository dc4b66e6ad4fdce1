//! Report types for the fetcher/collector JSON contract.

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Offset between Kelvin and Celsius.
pub const KELVIN_OFFSET: f64 = 273.15;

/// Day category a report belongs to.
///
/// Only these two labels are stored; any other label on the wire is carried
/// through as a plain string on [`DailyReport::day`] and ignored by the
/// collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DayLabel {
    /// Readings for the current day.
    Today,
    /// Readings for the same window 24 hours earlier.
    Yesterday,
}

impl DayLabel {
    /// The label as it appears in the JSON `day` field.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            DayLabel::Today => "today",
            DayLabel::Yesterday => "yesterday",
        }
    }
}

impl FromStr for DayLabel {
    type Err = ParseError;

    /// Parse a day label. Matching is exact: `"Today"` is not `"today"`.
    ///
    /// # Examples
    ///
    /// ```
    /// use wevva_types::DayLabel;
    ///
    /// assert_eq!("today".parse::<DayLabel>(), Ok(DayLabel::Today));
    /// assert_eq!("yesterday".parse::<DayLabel>(), Ok(DayLabel::Yesterday));
    /// assert!("tomorrow".parse::<DayLabel>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "today" => Ok(DayLabel::Today),
            "yesterday" => Ok(DayLabel::Yesterday),
            other => Err(ParseError::UnknownDay(other.to_string())),
        }
    }
}

impl fmt::Display for DayLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single temperature sample as produced by the fetcher.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TemperatureRecord {
    /// Unix timestamp in seconds.
    pub timestamp: i64,
    /// "Feels like" temperature in degrees Celsius.
    pub feels_like_celsius: f64,
}

impl TemperatureRecord {
    /// Create a record from a timestamp and a Celsius value.
    #[must_use]
    pub fn new(timestamp: i64, feels_like_celsius: f64) -> Self {
        Self {
            timestamp,
            feels_like_celsius,
        }
    }

    /// Create a record from a Kelvin value, as returned by OpenWeatherMap.
    ///
    /// ```
    /// use wevva_types::TemperatureRecord;
    ///
    /// let record = TemperatureRecord::from_kelvin(0, 273.15);
    /// assert!(record.feels_like_celsius.abs() < 1e-9);
    /// ```
    #[must_use]
    pub fn from_kelvin(timestamp: i64, kelvin: f64) -> Self {
        Self::new(timestamp, kelvin - KELVIN_OFFSET)
    }
}

/// All temperature samples for one day label.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DailyReport {
    /// Day label, normally `"today"` or `"yesterday"`.
    pub day: String,
    /// Samples in the order the source produced them.
    pub temperatures: Vec<TemperatureRecord>,
}

impl DailyReport {
    /// Create a report for a known day label.
    #[must_use]
    pub fn new(day: DayLabel, temperatures: Vec<TemperatureRecord>) -> Self {
        Self {
            day: day.as_str().to_string(),
            temperatures,
        }
    }

    /// Interpret the `day` field.
    pub fn label(&self) -> Result<DayLabel, ParseError> {
        self.day.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_label_roundtrip() {
        for label in [DayLabel::Today, DayLabel::Yesterday] {
            assert_eq!(label.as_str().parse::<DayLabel>(), Ok(label));
            assert_eq!(label.to_string(), label.as_str());
        }
    }

    #[test]
    fn test_day_label_is_case_sensitive() {
        let err = "Today".parse::<DayLabel>().unwrap_err();
        assert_eq!(err, ParseError::UnknownDay("Today".to_string()));
        assert_eq!(err.to_string(), "Unknown day label: \"Today\"");
    }

    #[test]
    fn test_report_label_unknown() {
        let report = DailyReport {
            day: "tomorrow".to_string(),
            temperatures: vec![],
        };
        assert!(report.label().is_err());
    }

    #[test]
    fn test_from_kelvin() {
        let record = TemperatureRecord::from_kelvin(1_700_000_000, 283.15);
        assert_eq!(record.timestamp, 1_700_000_000);
        assert!((record.feels_like_celsius - 10.0).abs() < 1e-9);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_report_wire_format() {
        let json = r#"[
            {"day":"today","temperatures":[{"timestamp":100,"feels_like_celsius":10.5}]},
            {"day":"yesterday","temperatures":[]}
        ]"#;

        let reports: Vec<DailyReport> = serde_json::from_str(json).unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].label(), Ok(DayLabel::Today));
        assert_eq!(reports[0].temperatures, vec![TemperatureRecord::new(100, 10.5)]);
        assert_eq!(reports[1].label(), Ok(DayLabel::Yesterday));
        assert!(reports[1].temperatures.is_empty());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_report_serialization_field_names() {
        let report = DailyReport::new(DayLabel::Yesterday, vec![TemperatureRecord::new(7, -1.25)]);
        let json = serde_json::to_string(&report).unwrap();
        assert_eq!(
            json,
            r#"{"day":"yesterday","temperatures":[{"timestamp":7,"feels_like_celsius":-1.25}]}"#
        );
    }
}
