//! Dumping bucket contents for inspection.

use std::io::{self, Write};

use time::format_description::well_known::Rfc3339;
use tracing::{info, warn};

use wevva_store::{Bucket, BucketView, Store};

/// Names of every bucket, in display order.
pub fn all_bucket_names() -> Vec<String> {
    Bucket::ALL.iter().map(|b| b.name().to_string()).collect()
}

/// Write every reading of every view to `out`.
///
/// Missing buckets are written to `missing` and skipped. Returns the number
/// of readings written.
pub fn write_views<W, E>(views: &[BucketView], out: &mut W, missing: &mut E) -> anyhow::Result<usize>
where
    W: Write,
    E: Write,
{
    let mut total = 0;
    for view in views {
        if !view.exists() {
            writeln!(missing, "Bucket {} not found", view.name())?;
            continue;
        }
        writeln!(out, "Contents of bucket '{}':", view.name())?;
        for reading in view.iter()? {
            let reading = reading?;
            let when = reading
                .timestamp
                .format(&Rfc3339)
                .unwrap_or_else(|_| reading.timestamp.unix_timestamp().to_string());
            writeln!(
                out,
                "  {} ({})  {:.2}",
                reading.timestamp.unix_timestamp(),
                when,
                reading.value
            )?;
            total += 1;
        }
    }
    Ok(total)
}

/// Log a one-line summary per bucket, as done at startup.
pub fn log_summary(store: &Store) -> wevva_store::Result<()> {
    for view in store.enumerate(&all_bucket_names())? {
        if !view.exists() {
            warn!("Bucket {} not found", view.name());
            continue;
        }
        let readings = view.readings()?;
        match (readings.first(), readings.last()) {
            (Some(first), Some(last)) => info!(
                "Bucket {}: {} readings from {} to {}",
                view.name(),
                readings.len(),
                first.timestamp.unix_timestamp(),
                last.timestamp.unix_timestamp()
            ),
            _ => info!("Bucket {}: empty", view.name()),
        }
    }
    Ok(())
}

/// Print the named buckets to stdout, reporting missing ones on stderr.
pub fn print_buckets(store: &Store, names: &[String]) -> anyhow::Result<usize> {
    let views = store.enumerate(names)?;
    let stdout = io::stdout();
    let stderr = io::stderr();
    write_views(&views, &mut stdout.lock(), &mut stderr.lock())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wevva_store::{Reading, ReadingBatch, SeriesBatch};

    #[test]
    fn test_write_views() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path().join("weather.db")).unwrap();
        let series: SeriesBatch = [
            Reading::from_unix(300, 3.0).unwrap(),
            Reading::from_unix(100, 1.5).unwrap(),
        ]
        .into_iter()
        .collect();
        store
            .update_readings(&ReadingBatch::new().with(Bucket::OutdoorToday, series))
            .unwrap();

        let views = store.enumerate(&["otemp_today", "bogus", "itemp_today"]).unwrap();
        let mut out = Vec::new();
        let mut err = Vec::new();
        let total = write_views(&views, &mut out, &mut err).unwrap();

        let out = String::from_utf8(out).unwrap();
        let err = String::from_utf8(err).unwrap();
        assert_eq!(total, 2);
        assert_eq!(
            out,
            "Contents of bucket 'otemp_today':\n\
             \x20 100 (1970-01-01T00:01:40Z)  1.50\n\
             \x20 300 (1970-01-01T00:05:00Z)  3.00\n\
             Contents of bucket 'itemp_today':\n"
        );
        assert_eq!(err, "Bucket bogus not found\n");

        assert!(log_summary(&store).is_ok());
    }

    #[test]
    fn test_all_bucket_names() {
        assert_eq!(
            all_bucket_names(),
            vec!["otemp_today", "otemp_yday", "itemp_today", "itemp_yday"]
        );
    }
}
