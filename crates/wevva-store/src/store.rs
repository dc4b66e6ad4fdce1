//! Main store implementation.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use redb::{
    Database, DatabaseError, ReadOnlyTable, ReadTransaction, ReadableTable, ReadableTableMetadata,
    TableError, WriteTransaction,
};
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::encoding::{encode_key, encode_value, key_from_slice, value_from_slice};
use crate::error::{Error, Result};
use crate::models::{Reading, ReadingBatch};
use crate::schema::{self, Bucket, BucketDefinition};

/// How long [`Store::open`] waits for the exclusive file lock.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(1);

/// Pause between attempts to take the file lock.
const LOCK_RETRY_INTERVAL: Duration = Duration::from_millis(50);

/// Embedded time-series store holding one bucket per (source, day) category.
///
/// A store is opened once per process and shared by reference. Writes are
/// serialized by the engine; readers see a consistent snapshot taken when
/// their read transaction starts.
pub struct Store {
    path: PathBuf,
    db: Option<Database>,
}

impl Store {
    /// Open or create a store at the given path, waiting up to
    /// [`DEFAULT_LOCK_TIMEOUT`] for the file lock.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_timeout(path, DEFAULT_LOCK_TIMEOUT)
    }

    /// Open the default store location.
    pub fn open_default() -> Result<Self> {
        Self::open(crate::default_db_path())
    }

    /// Open or create a store, waiting up to `timeout` for the file lock.
    ///
    /// Missing buckets are created; existing ones keep their contents.
    pub fn open_with_timeout<P: AsRef<Path>>(path: P, timeout: Duration) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| Error::Unavailable {
                path: path.to_path_buf(),
                reason: format!("failed to create directory {}: {}", parent.display(), e),
            })?;
        }

        info!("Opening store at {}", path.display());
        let db = acquire(path, timeout)?;

        let txn = db.begin_write()?;
        schema::initialize(&txn)?;
        txn.commit()?;
        debug!("Buckets ready: {:?}", Bucket::ALL.map(Bucket::name));

        Ok(Self {
            path: path.to_path_buf(),
            db: Some(db),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.db.is_none()
    }

    /// Release the file lock. Later operations fail with [`Error::Closed`].
    ///
    /// Committed writes are already durable; closing twice is a no-op.
    pub fn close(&mut self) {
        if self.db.take().is_some() {
            info!("Closed store at {}", self.path.display());
        }
    }

    fn db(&self) -> Result<&Database> {
        self.db.as_ref().ok_or(Error::Closed)
    }
}

/// Open the database file, retrying while another handle holds the lock.
fn acquire(path: &Path, timeout: Duration) -> Result<Database> {
    let deadline = Instant::now() + timeout;
    loop {
        match Database::create(path) {
            Ok(db) => return Ok(db),
            Err(DatabaseError::DatabaseAlreadyOpen) => {
                let now = Instant::now();
                if now >= deadline {
                    return Err(Error::Unavailable {
                        path: path.to_path_buf(),
                        reason: format!("lock not acquired within {:?}", timeout),
                    });
                }
                debug!("Store {} is locked, retrying", path.display());
                std::thread::sleep(LOCK_RETRY_INTERVAL.min(deadline - now));
            }
            Err(err) => return Err(open_error(path, err)),
        }
    }
}

fn open_error(path: &Path, err: DatabaseError) -> Error {
    match err {
        DatabaseError::Storage(redb::StorageError::Corrupted(msg)) => {
            Error::Corrupt(format!("{}: {}", path.display(), msg))
        }
        DatabaseError::Storage(redb::StorageError::Io(io))
            if matches!(
                io.kind(),
                std::io::ErrorKind::InvalidData | std::io::ErrorKind::UnexpectedEof
            ) =>
        {
            Error::Corrupt(format!("{}: {}", path.display(), io))
        }
        err @ (DatabaseError::RepairAborted | DatabaseError::UpgradeRequired(_)) => {
            Error::Corrupt(format!("{}: {}", path.display(), err))
        }
        other => Error::Unavailable {
            path: path.to_path_buf(),
            reason: other.to_string(),
        },
    }
}

// Write operations
impl Store {
    /// Write every reading in `batch` inside a single transaction.
    ///
    /// Either all readings across all buckets are committed or none are.
    /// An existing reading at the same timestamp is overwritten. Returns the
    /// number of readings written.
    pub fn update_readings(&self, batch: &ReadingBatch) -> Result<usize> {
        self.write_batch(batch, |_, _| Ok(()))
    }

    /// Transaction body of [`update_readings`](Self::update_readings).
    ///
    /// `before_put` runs ahead of every insert with the bucket and position
    /// of the reading; an error from it aborts the whole transaction.
    pub(crate) fn write_batch<F>(&self, batch: &ReadingBatch, mut before_put: F) -> Result<usize>
    where
        F: FnMut(Bucket, usize) -> Result<()>,
    {
        let db = self.db()?;
        batch.validate()?;

        if batch.is_empty() {
            debug!("Empty batch, nothing to write");
            return Ok(0);
        }

        let txn = db.begin_write()?;
        match put_all(&txn, batch, &mut before_put) {
            Ok(written) => {
                txn.commit()?;
                debug!("Committed {} readings", written);
                Ok(written)
            }
            Err(err) => {
                if let Err(abort_err) = txn.abort() {
                    warn!("Failed to abort write transaction: {}", abort_err);
                }
                Err(err)
            }
        }
    }
}

fn put_all<F>(txn: &WriteTransaction, batch: &ReadingBatch, before_put: &mut F) -> Result<usize>
where
    F: FnMut(Bucket, usize) -> Result<()>,
{
    let mut written = 0;
    for (bucket, series) in batch.iter() {
        if series.is_empty() {
            continue;
        }
        let mut table = txn.open_table(bucket.definition())?;
        for (i, reading) in series.readings().enumerate() {
            before_put(bucket, i)?;
            let key = encode_key(reading.timestamp.unix_timestamp());
            let value = encode_value(reading.value);
            table.insert(key.as_slice(), value.as_slice())?;
            written += 1;
        }
        debug!("Staged {} readings for {}", series.len(), bucket);
    }
    Ok(written)
}

// Read operations
impl Store {
    /// Open a read snapshot over the named buckets.
    ///
    /// One entry is returned per requested name, in request order. Names with
    /// no matching bucket yield a [`BucketView`] that reports itself missing
    /// and iterates as empty; the remaining names are still served.
    pub fn enumerate<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<BucketView>> {
        let txn = Arc::new(self.db()?.begin_read()?);

        let mut views = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let table = match txn.open_table(BucketDefinition::new(name)) {
                Ok(table) => Some(table),
                Err(TableError::TableDoesNotExist(_)) => {
                    warn!("Bucket {} not found", name);
                    None
                }
                Err(err) => return Err(err.into()),
            };
            views.push(BucketView {
                name: name.to_string(),
                table,
                _txn: Arc::clone(&txn),
            });
        }
        Ok(views)
    }

    /// Read a single bucket in ascending timestamp order.
    pub fn readings(&self, bucket: Bucket) -> Result<Vec<Reading>> {
        let mut views = self.enumerate(&[bucket.name()])?;
        match views.pop() {
            Some(view) => view.readings(),
            None => Ok(Vec::new()),
        }
    }

    /// Number of readings held in a bucket.
    pub fn count(&self, bucket: Bucket) -> Result<u64> {
        let txn = self.db()?.begin_read()?;
        let table = txn.open_table(bucket.definition())?;
        Ok(table.len()?)
    }
}

/// One bucket inside a read snapshot.
///
/// Iteration is lazy and can be restarted with another call to
/// [`iter`](Self::iter); every pass sees the same snapshot.
pub struct BucketView {
    name: String,
    table: Option<ReadOnlyTable<&'static [u8], &'static [u8]>>,
    _txn: Arc<ReadTransaction>,
}

impl BucketView {
    /// Requested bucket name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the bucket exists in the store.
    pub fn exists(&self) -> bool {
        self.table.is_some()
    }

    /// Number of readings in the bucket; zero when missing.
    pub fn len(&self) -> Result<u64> {
        match &self.table {
            Some(table) => Ok(table.len()?),
            None => Ok(0),
        }
    }

    /// Whether the bucket holds no readings; missing buckets count as empty.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Iterate readings in ascending timestamp order.
    pub fn iter(&self) -> Result<impl Iterator<Item = Result<Reading>> + '_> {
        let range = match &self.table {
            Some(table) => Some(table.iter()?),
            None => None,
        };
        Ok(range.into_iter().flatten().map(|entry| {
            let (key, value) = entry?;
            decode_entry(key.value(), value.value())
        }))
    }

    /// Collect every reading in the bucket.
    pub fn readings(&self) -> Result<Vec<Reading>> {
        self.iter()?.collect()
    }
}

impl std::fmt::Debug for BucketView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BucketView")
            .field("name", &self.name)
            .field("exists", &self.exists())
            .finish()
    }
}

fn decode_entry(key: &[u8], value: &[u8]) -> Result<Reading> {
    let timestamp = key_from_slice(key)
        .ok_or_else(|| Error::Corrupt(format!("key has {} bytes, expected 8", key.len())))?;
    let value = value_from_slice(value)
        .ok_or_else(|| Error::Corrupt(format!("value has {} bytes, expected 8", value.len())))?;
    let timestamp = OffsetDateTime::from_unix_timestamp(timestamp)
        .map_err(|e| Error::Corrupt(format!("stored timestamp {}: {}", timestamp, e)))?;
    Ok(Reading::new(timestamp, value))
}
