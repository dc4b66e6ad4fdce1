//! Shared report types for the wevva temperature collector.
//!
//! The fetcher (`wevva-fetch`) prints a JSON array of [`DailyReport`]s on
//! stdout and the collector (`wevva-service`) parses that same shape back.
//! Keeping both ends on these types pins the wire contract in one place:
//!
//! ```json
//! [
//!   { "day": "today", "temperatures": [ { "timestamp": 1700000000, "feels_like_celsius": 4.2 } ] },
//!   { "day": "yesterday", "temperatures": [] }
//! ]
//! ```
//!
//! # Example
//!
//! ```
//! use wevva_types::{DailyReport, DayLabel, TemperatureRecord};
//!
//! let report = DailyReport::new(DayLabel::Today, vec![TemperatureRecord::new(100, 10.0)]);
//! assert_eq!(report.label(), Ok(DayLabel::Today));
//! ```

pub mod error;
pub mod types;

pub use error::{ParseError, ParseResult};
pub use types::{DailyReport, DayLabel, KELVIN_OFFSET, TemperatureRecord};
