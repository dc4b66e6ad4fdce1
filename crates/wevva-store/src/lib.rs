//! Embedded time-series storage for wevva temperature readings.
//!
//! Readings live in a single redb file split into four buckets, one per
//! (source, day) category: `otemp_today`, `otemp_yday`, `itemp_today` and
//! `itemp_yday`. Keys are big-endian Unix seconds and values are big-endian
//! IEEE-754 doubles, so every bucket iterates in chronological order.
//!
//! # Features
//!
//! - Exclusive file lock with a bounded wait on open
//! - Atomic multi-bucket upserts (last write wins per timestamp)
//! - Snapshot reads over any set of bucket names
//!
//! # Example
//!
//! ```no_run
//! use wevva_store::{Bucket, Reading, ReadingBatch, SeriesBatch, Store};
//!
//! let store = Store::open_default()?;
//!
//! let today: SeriesBatch = [Reading::from_unix(1_700_000_000, 4.5)?].into_iter().collect();
//! store.update_readings(&ReadingBatch::new().with(Bucket::OutdoorToday, today))?;
//!
//! for view in store.enumerate(&["otemp_today"])? {
//!     for reading in view.iter()? {
//!         println!("{:?}", reading?);
//!     }
//! }
//! # Ok::<(), wevva_store::Error>(())
//! ```

pub mod encoding;
mod error;
mod models;
mod schema;
mod store;

pub use error::{Error, Result};
pub use models::{Reading, ReadingBatch, SeriesBatch};
pub use schema::Bucket;
pub use store::{BucketView, DEFAULT_LOCK_TIMEOUT, Store};

/// Default store file name.
pub const DEFAULT_DB_FILE: &str = "weather.db";

/// Default store path: `weather.db` in the working directory.
pub fn default_db_path() -> std::path::PathBuf {
    std::path::PathBuf::from(DEFAULT_DB_FILE)
}
