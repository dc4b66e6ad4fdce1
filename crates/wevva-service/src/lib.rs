//! Periodic temperature collector for the wevva time-series store.
//!
//! This crate provides a service that:
//! - Runs an external data source on a schedule (15 minutes by default)
//! - Sorts the returned readings into today / yesterday buckets
//! - Writes each refresh cycle into the store in a single transaction
//! - Dumps bucket contents for inspection
//!
//! # Configuration
//!
//! The service reads `wevva.toml` from the working directory when present:
//!
//! ```toml
//! [storage]
//! path = "weather.db"
//! lock_timeout_ms = 1000
//!
//! [collector]
//! interval_secs = 900
//!
//! [source]
//! program = "wevva-fetch"
//! args = ["--lat", "51.5074", "--lon", "0.1278"]
//! api_key_env = "WEATHER_API_KEY"
//! ```

pub mod collector;
pub mod config;
pub mod error;
pub mod inspect;
pub mod pipeline;
pub mod source;

pub use collector::{Collector, CollectorHandle};
pub use config::{CollectorConfig, Config, ConfigError, SourceConfig, StorageConfig};
pub use error::{IngestError, Result};
pub use pipeline::{CycleSummary, categorize, parse_reports, run_cycle};
pub use source::{CommandSource, DataSource};
