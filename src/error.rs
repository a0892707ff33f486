//! Application error types.

use thiserror::Error;

/// Errors surfaced by the aggregation layer.
///
/// There is no partial-success mode: any repository failure aborts the whole
/// operation. Absent optional data (metadata keys, translations, attachment
/// sizes) is never an error; it resolves to documented defaults instead.
#[derive(Debug, Error)]
pub enum Error {
    /// A repository query failed. Carries the engine diagnostic verbatim.
    #[error("backing store error: {0}")]
    BackingStore(#[from] sqlx::Error),

    /// A structural precondition was violated by the caller (e.g. an unknown
    /// facet name). Fatal, never retried.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
