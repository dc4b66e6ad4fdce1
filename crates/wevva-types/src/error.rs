//! Error types for wevva-types.

use thiserror::Error;

/// Errors that can occur when interpreting report data.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The report carried a day label that is neither `today` nor `yesterday`.
    #[error("Unknown day label: {0:?}")]
    UnknownDay(String),
}

/// Result type alias using wevva-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
