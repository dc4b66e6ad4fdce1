//! Data models for stored and pending readings.

use time::OffsetDateTime;

use crate::error::{Error, Result};
use crate::schema::Bucket;

/// A single timestamped temperature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// When the temperature applies, at second resolution.
    pub timestamp: OffsetDateTime,
    /// Temperature in degrees Celsius.
    pub value: f64,
}

impl Reading {
    /// Create a reading.
    pub fn new(timestamp: OffsetDateTime, value: f64) -> Self {
        Self { timestamp, value }
    }

    /// Create a reading from a Unix timestamp in seconds.
    pub fn from_unix(timestamp: i64, value: f64) -> Result<Self> {
        let timestamp = OffsetDateTime::from_unix_timestamp(timestamp)
            .map_err(|e| Error::InvalidInput(format!("timestamp {timestamp}: {e}")))?;
        Ok(Self::new(timestamp, value))
    }
}

/// Pending writes for one bucket: parallel timestamp and value slices.
///
/// The two slices must have the same length; [`Store::update_readings`]
/// rejects the whole batch otherwise.
///
/// [`Store::update_readings`]: crate::Store::update_readings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesBatch {
    /// Timestamps, one per value.
    pub timestamps: Vec<OffsetDateTime>,
    /// Temperatures in degrees Celsius.
    pub values: Vec<f64>,
}

impl SeriesBatch {
    /// Build a batch from separately collected timestamps and values.
    pub fn from_parts(timestamps: Vec<OffsetDateTime>, values: Vec<f64>) -> Self {
        Self { timestamps, values }
    }

    /// Append one reading, keeping both slices aligned.
    pub fn push(&mut self, reading: Reading) {
        self.timestamps.push(reading.timestamp);
        self.values.push(reading.value);
    }

    /// Number of values in the batch.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the series holds no readings.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.timestamps.is_empty()
    }

    /// Iterate the batch as readings. Only meaningful once validated.
    pub fn readings(&self) -> impl Iterator<Item = Reading> + '_ {
        self.timestamps
            .iter()
            .zip(&self.values)
            .map(|(timestamp, value)| Reading::new(*timestamp, *value))
    }

    pub(crate) fn validate(&self, bucket: Bucket) -> Result<()> {
        if self.timestamps.len() != self.values.len() {
            return Err(Error::InvalidInput(format!(
                "bucket {}: {} timestamps for {} values",
                bucket,
                self.timestamps.len(),
                self.values.len()
            )));
        }
        Ok(())
    }
}

impl FromIterator<Reading> for SeriesBatch {
    fn from_iter<I: IntoIterator<Item = Reading>>(iter: I) -> Self {
        let mut batch = SeriesBatch::default();
        for reading in iter {
            batch.push(reading);
        }
        batch
    }
}

/// Pending writes for every bucket, applied together by one transaction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadingBatch {
    series: [SeriesBatch; 4],
}

impl ReadingBatch {
    /// An empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the pending writes for a bucket.
    pub fn with(mut self, bucket: Bucket, series: SeriesBatch) -> Self {
        self.series[bucket.index()] = series;
        self
    }

    /// Pending writes for a bucket.
    pub fn get(&self, bucket: Bucket) -> &SeriesBatch {
        &self.series[bucket.index()]
    }

    /// Mutable access to the pending writes for a bucket.
    pub fn get_mut(&mut self, bucket: Bucket) -> &mut SeriesBatch {
        &mut self.series[bucket.index()]
    }

    /// Iterate buckets with their pending writes, in [`Bucket::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Bucket, &SeriesBatch)> {
        Bucket::ALL.into_iter().zip(self.series.iter())
    }

    /// Total number of values across all buckets.
    pub fn len(&self) -> usize {
        self.series.iter().map(SeriesBatch::len).sum()
    }

    /// Whether every bucket's series is empty.
    pub fn is_empty(&self) -> bool {
        self.series.iter().all(SeriesBatch::is_empty)
    }

    /// Check every bucket's slices line up.
    pub fn validate(&self) -> Result<()> {
        self.iter().try_for_each(|(bucket, series)| series.validate(bucket))
    }
}
