//! End-to-end refresh cycles against a real store file.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, watch};

use wevva_service::{Collector, DataSource, IngestError, run_cycle};
use wevva_store::{Bucket, Store};

/// Returns canned output and counts how often it was asked.
struct StubSource {
    output: Result<Vec<u8>, String>,
    calls: AtomicUsize,
}

impl StubSource {
    fn ok(json: &str) -> Self {
        Self {
            output: Ok(json.as_bytes().to_vec()),
            calls: AtomicUsize::new(0),
        }
    }

    fn failing(reason: &str) -> Self {
        Self {
            output: Err(reason.to_string()),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl DataSource for StubSource {
    fn name(&self) -> &str {
        "stub"
    }

    async fn fetch(&self) -> Result<Vec<u8>, IngestError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.output.clone().map_err(|reason| IngestError::DataSource {
            name: "stub".to_string(),
            reason,
        })
    }
}

/// Never finishes a fetch.
struct HangingSource;

#[async_trait]
impl DataSource for HangingSource {
    fn name(&self) -> &str {
        "hanging"
    }

    async fn fetch(&self) -> Result<Vec<u8>, IngestError> {
        std::future::pending().await
    }
}

const CYCLE_JSON: &str = r#"[
    {"day":"today","temperatures":[
        {"timestamp":500,"feels_like_celsius":5.0},
        {"timestamp":100,"feels_like_celsius":1.0},
        {"timestamp":300,"feels_like_celsius":3.0}
    ]},
    {"day":"yesterday","temperatures":[{"timestamp":200,"feels_like_celsius":-2.5}]},
    {"day":"unknown","temperatures":[{"timestamp":900,"feels_like_celsius":9.0}]}
]"#;

fn temp_store() -> (tempfile::TempDir, Store) {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(dir.path().join("weather.db")).unwrap();
    (dir, store)
}

fn stamps(store: &Store, bucket: Bucket) -> Vec<i64> {
    store
        .readings(bucket)
        .unwrap()
        .iter()
        .map(|r| r.timestamp.unix_timestamp())
        .collect()
}

#[tokio::test]
async fn test_cycle_writes_categorized_readings() {
    let (_dir, store) = temp_store();
    let source = StubSource::ok(CYCLE_JSON);

    let summary = run_cycle(&source, &store).await.unwrap();
    assert_eq!(summary.reports, 3);
    assert_eq!(summary.today, 3);
    assert_eq!(summary.yesterday, 1);
    assert_eq!(summary.dropped, 1);

    assert_eq!(stamps(&store, Bucket::OutdoorToday), vec![100, 300, 500]);
    assert_eq!(stamps(&store, Bucket::OutdoorYesterday), vec![200]);
    assert_eq!(store.count(Bucket::IndoorToday).unwrap(), 0);
    assert_eq!(store.count(Bucket::IndoorYesterday).unwrap(), 0);

    let yday = store.readings(Bucket::OutdoorYesterday).unwrap();
    assert_eq!(yday[0].value, -2.5);
}

#[tokio::test]
async fn test_repeated_cycles_overwrite() {
    let (_dir, store) = temp_store();
    run_cycle(&StubSource::ok(CYCLE_JSON), &store).await.unwrap();

    let update = r#"[{"day":"today","temperatures":[{"timestamp":100,"feels_like_celsius":7.0}]}]"#;
    run_cycle(&StubSource::ok(update), &store).await.unwrap();

    let today = store.readings(Bucket::OutdoorToday).unwrap();
    assert_eq!(today.len(), 3);
    assert_eq!(today[0].timestamp.unix_timestamp(), 100);
    assert_eq!(today[0].value, 7.0);
}

#[tokio::test]
async fn test_malformed_output_writes_nothing() {
    let (_dir, store) = temp_store();
    let source = StubSource::ok(r#"[{"day":"today","temperatures":[{"timestamp":1}]}]"#);

    let err = run_cycle(&source, &store).await.unwrap_err();
    assert!(matches!(err, IngestError::Parse(_)));
    assert_eq!(store.count(Bucket::OutdoorToday).unwrap(), 0);
}

#[tokio::test]
async fn test_source_failure_is_returned() {
    let (_dir, store) = temp_store();
    let source = StubSource::failing("exit status: 1");

    let err = run_cycle(&source, &store).await.unwrap_err();
    assert!(matches!(err, IngestError::DataSource { .. }));
    assert!(err.to_string().contains("exit status: 1"));
}

#[tokio::test]
async fn test_closed_store_is_reported_with_context() {
    let (_dir, mut store) = temp_store();
    store.close();

    let err = run_cycle(&StubSource::ok(CYCLE_JSON), &store)
        .await
        .unwrap_err();
    match err {
        IngestError::Store { context, source } => {
            assert!(context.contains("4 readings"), "context: {context}");
            assert!(matches!(source, wevva_store::Error::Closed));
        }
        other => panic!("expected Store error, got {other}"),
    }
}

#[tokio::test]
async fn test_empty_reports_are_noop() {
    let (_dir, store) = temp_store();
    let summary = run_cycle(&StubSource::ok("[]"), &store).await.unwrap();
    assert_eq!(summary.written(), 0);
    for bucket in Bucket::ALL {
        assert_eq!(store.count(bucket).unwrap(), 0);
    }
}

#[tokio::test(start_paused = true)]
async fn test_collector_keeps_running_after_failures() {
    let (_dir, store) = temp_store();
    let store = Arc::new(Mutex::new(store));
    let collector = Arc::new(Collector::new(
        Arc::clone(&store),
        StubSource::failing("offline"),
        Duration::from_secs(60),
    ));

    let (stop_tx, stop_rx) = watch::channel(false);
    let task = {
        let collector = Arc::clone(&collector);
        tokio::spawn(async move { collector.run_until(stop_rx).await })
    };

    // Immediate first tick plus three more intervals.
    tokio::time::sleep(Duration::from_secs(190)).await;
    stop_tx.send(true).unwrap();
    task.await.unwrap();

    let calls = collector_calls(&collector);
    assert_eq!(calls, 4);
    assert_eq!(store.lock().await.count(Bucket::OutdoorToday).unwrap(), 0);
}

#[tokio::test]
async fn test_collector_run_once() {
    let (_dir, store) = temp_store();
    let store = Arc::new(Mutex::new(store));
    let collector = Collector::new(
        Arc::clone(&store),
        StubSource::ok(CYCLE_JSON),
        Duration::from_secs(900),
    );

    let summary = collector.run_once().await.unwrap();
    assert_eq!(summary.written(), 4);
    assert_eq!(store.lock().await.count(Bucket::OutdoorToday).unwrap(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_aborts_hung_cycle() {
    let (_dir, store) = temp_store();
    let store = Arc::new(Mutex::new(store));
    let handle = Collector::new(Arc::clone(&store), HangingSource, Duration::from_secs(60)).spawn();

    // Let the first cycle start and take the store lock.
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(store.try_lock().is_err());

    assert!(!handle.shutdown(Duration::from_secs(30)).await);

    let mut guard = tokio::time::timeout(Duration::from_secs(1), store.lock())
        .await
        .expect("store still locked after shutdown");
    guard.close();
    assert!(guard.is_closed());
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_between_cycles_is_clean() {
    let (_dir, store) = temp_store();
    let store = Arc::new(Mutex::new(store));
    let handle = Collector::new(
        Arc::clone(&store),
        StubSource::ok(CYCLE_JSON),
        Duration::from_secs(60),
    )
    .spawn();

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(handle.shutdown(Duration::from_secs(30)).await);
    assert_eq!(store.lock().await.count(Bucket::OutdoorToday).unwrap(), 3);
}

fn collector_calls(collector: &Collector<StubSource>) -> usize {
    collector.source().calls.load(Ordering::SeqCst)
}
