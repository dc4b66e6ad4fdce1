//! One refresh cycle: fetch, parse, categorize, store.

use std::fmt;

use tracing::{debug, info, warn};

use wevva_store::{Bucket, Reading, ReadingBatch, Store};
use wevva_types::{DailyReport, DayLabel};

use crate::error::{IngestError, Result};
use crate::source::DataSource;

/// Outcome of a successful refresh cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleSummary {
    /// Reports received from the source.
    pub reports: usize,
    /// Readings written to `otemp_today`.
    pub today: usize,
    /// Readings written to `otemp_yday`.
    pub yesterday: usize,
    /// Readings discarded because their report had an unknown day label.
    pub dropped: usize,
}

impl CycleSummary {
    /// Total readings written.
    pub fn written(&self) -> usize {
        self.today + self.yesterday
    }
}

impl fmt::Display for CycleSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} reports, {} today, {} yesterday, {} dropped",
            self.reports, self.today, self.yesterday, self.dropped
        )
    }
}

/// Parse raw data source output into daily reports.
pub fn parse_reports(output: &[u8]) -> Result<Vec<DailyReport>> {
    Ok(serde_json::from_slice(output)?)
}

/// Split reports into per-bucket batches by day label.
///
/// `today` readings go to [`Bucket::OutdoorToday`], `yesterday` readings to
/// [`Bucket::OutdoorYesterday`]. Reports with any other label are skipped
/// with a warning. Indoor buckets stay empty: no source provides them yet.
pub fn categorize(reports: &[DailyReport]) -> Result<ReadingBatch> {
    let mut batch = ReadingBatch::new();

    for report in reports {
        let bucket = match report.label() {
            Ok(DayLabel::Today) => Bucket::OutdoorToday,
            Ok(DayLabel::Yesterday) => Bucket::OutdoorYesterday,
            Err(e) => {
                warn!(
                    "Dropping {} readings: {}",
                    report.temperatures.len(),
                    e
                );
                continue;
            }
        };

        let series = batch.get_mut(bucket);
        for record in &report.temperatures {
            let reading = Reading::from_unix(record.timestamp, record.feels_like_celsius)
                .map_err(|e| IngestError::store(format!("{} report", report.day), e))?;
            series.push(reading);
        }
    }

    Ok(batch)
}

/// Run one refresh cycle against `store`.
///
/// Nothing is written unless every step succeeds; the store update itself
/// is a single transaction.
pub async fn run_cycle<S>(source: &S, store: &Store) -> Result<CycleSummary>
where
    S: DataSource + ?Sized,
{
    let output = source.fetch().await?;
    let reports = parse_reports(&output)?;
    let batch = categorize(&reports)?;

    let received: usize = reports.iter().map(|r| r.temperatures.len()).sum();
    let summary = CycleSummary {
        reports: reports.len(),
        today: batch.get(Bucket::OutdoorToday).len(),
        yesterday: batch.get(Bucket::OutdoorYesterday).len(),
        dropped: received - batch.len(),
    };
    debug!("Categorized cycle: {}", summary);

    let written = store
        .update_readings(&batch)
        .map_err(|e| IngestError::store(format!("updating {} readings", batch.len()), e))?;
    info!("Stored {} readings from {}", written, source.name());

    Ok(summary)
}
