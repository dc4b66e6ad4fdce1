//! Errors raised by a refresh cycle.

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

/// Why a refresh cycle failed.
///
/// None of these are fatal to the collector; the next cycle runs as usual.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// The data source could not be run or reported failure.
    #[error("Data source {name} failed: {reason}")]
    DataSource { name: String, reason: String },

    /// The data source output is not a valid report array.
    #[error("Failed to parse data source output: {0}")]
    Parse(#[from] serde_json::Error),

    /// The store refused or failed to apply the cycle's readings.
    #[error("Failed to store readings ({context}): {source}")]
    Store {
        context: String,
        source: wevva_store::Error,
    },
}

impl IngestError {
    pub(crate) fn store(context: impl Into<String>, source: wevva_store::Error) -> Self {
        IngestError::Store {
            context: context.into(),
            source,
        }
    }
}
