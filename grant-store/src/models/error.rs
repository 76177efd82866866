//! Errors of the token store.
//!
//! A clean miss is not a read failure: `StorageRead` means the query itself failed while
//! `NotFound` means it succeeded with zero results.

use std::error::Error as StdError;

use thiserror::Error;

/// Boxed backend error.
pub type BoxError = Box<dyn StdError + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
    /// Insert or delete failed (connectivity, duplicate key, ...).
    #[error("storage write error: {0}")]
    StorageWrite(#[source] BoxError),
    /// Query failed.
    #[error("storage read error: {0}")]
    StorageRead(#[source] BoxError),
    /// Query succeeded with zero results.
    #[error("no documents in result")]
    NotFound,
    /// The stored document is malformed.
    #[error("decode error: {0}")]
    Decode(String),
    /// The operation was aborted by its cancellation token or the request timeout.
    #[error("operation cancelled")]
    Cancelled,
    /// The record cannot be stored.
    #[error("invalid record: {0}")]
    InvalidRecord(&'static str),
    /// Connecting or preparing collections failed.
    #[error("connection error: {0}")]
    Connection(#[source] BoxError),
}

impl Error {
    pub(crate) fn write<E: Into<BoxError>>(e: E) -> Self {
        Error::StorageWrite(e.into())
    }

    pub(crate) fn read<E: Into<BoxError>>(e: E) -> Self {
        Error::StorageRead(e.into())
    }

    pub(crate) fn conn<E: Into<BoxError>>(e: E) -> Self {
        Error::Connection(e.into())
    }
}
