//! Bucket taxonomy and creation.

use core::fmt;

use redb::{TableDefinition, WriteTransaction};

use crate::error::Result;

/// Table layout shared by every bucket: encoded timestamp -> encoded reading.
pub(crate) type BucketDefinition<'a> = TableDefinition<'a, &'static [u8], &'static [u8]>;

/// One of the four time series kept in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Bucket {
    /// Outdoor temperatures for today.
    OutdoorToday,
    /// Outdoor temperatures for yesterday.
    OutdoorYesterday,
    /// Indoor temperatures for today. No source feeds this yet.
    IndoorToday,
    /// Indoor temperatures for yesterday. No source feeds this yet.
    IndoorYesterday,
}

impl Bucket {
    /// Every bucket, in creation order.
    pub const ALL: [Bucket; 4] = [
        Bucket::OutdoorToday,
        Bucket::OutdoorYesterday,
        Bucket::IndoorToday,
        Bucket::IndoorYesterday,
    ];

    /// Name of the bucket inside the store file.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Bucket::OutdoorToday => "otemp_today",
            Bucket::OutdoorYesterday => "otemp_yday",
            Bucket::IndoorToday => "itemp_today",
            Bucket::IndoorYesterday => "itemp_yday",
        }
    }

    /// Look a bucket up by its storage name.
    ///
    /// ```
    /// use wevva_store::Bucket;
    ///
    /// assert_eq!(Bucket::from_name("otemp_yday"), Some(Bucket::OutdoorYesterday));
    /// assert_eq!(Bucket::from_name("otemp"), None);
    /// ```
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|bucket| bucket.name() == name)
    }

    pub(crate) const fn index(self) -> usize {
        self as usize
    }

    pub(crate) const fn definition(self) -> BucketDefinition<'static> {
        TableDefinition::new(self.name())
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Create any missing bucket. Existing buckets and their contents are left alone.
pub(crate) fn initialize(txn: &WriteTransaction) -> Result<()> {
    for bucket in Bucket::ALL {
        // Opening a table in a write transaction creates it if absent.
        txn.open_table(bucket.definition())?;
    }
    Ok(())
}
