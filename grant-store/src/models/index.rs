//! Traits and structs for the token collections.
//!
//! Each [`IndexKind`](super::token::IndexKind) has its own physical collection (table) that holds
//! full copies of [`TokenRecord`]s keyed by one token string. The collections are independent:
//! nothing in the storage engine keeps them consistent with each other.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{Error, token::TokenRecord};

/// The query condition to delete or count items.
#[derive(Default)]
pub struct QueryCond<'a> {
    pub code: Option<&'a str>,
    pub access: Option<&'a str>,
    pub refresh: Option<&'a str>,
    pub client_id: Option<&'a str>,
    pub user_id: Option<&'a str>,
}

/// The field that stores the absolute expiry instant of a document.
pub const EXPIRES_AT_FIELD: &'static str = "expires_at";

/// The expiry instant as milliseconds from Epoch for backends that store milliseconds.
///
/// Rounds up so that a document is never purged before its exact expiry instant.
pub fn expires_at_millis(expires_at: &DateTime<Utc>) -> i64 {
    let millis = expires_at.timestamp_millis();
    match expires_at.timestamp_subsec_nanos() % 1_000_000 {
        0 => millis,
        _ => millis.saturating_add(1),
    }
}

/// Collection operations.
#[async_trait]
pub trait TokenIndex: Send + Sync {
    /// The collection (table) name.
    fn name(&self) -> &str;

    /// To create and initialize the collection with its key index and expiry index.
    async fn init(&self) -> Result<(), Error>;

    /// To ensure the expiry index on [`EXPIRES_AT_FIELD`].
    ///
    /// A document expires at the instant stored in the field. A null instant means the document
    /// never expires.
    async fn ensure_ttl_index(&self) -> Result<(), Error>;

    /// To get an item by its key. Expired items that are not swept yet are returned too.
    async fn get(&self, key: &str) -> Result<Option<TokenRecord>, Error>;

    /// To add an item. The key must be unique.
    async fn add(&self, record: &TokenRecord) -> Result<(), Error>;

    /// To delete the item with the key. Deleting a missing item is not an error.
    async fn del_one(&self, key: &str) -> Result<(), Error>;

    /// To delete all items that match the condition. Returns the number of deleted items.
    async fn del(&self, cond: &QueryCond) -> Result<u64, Error>;

    /// To count items that match the condition. An empty condition counts all items.
    async fn count(&self, cond: &QueryCond) -> Result<u64, Error>;

    /// To delete items that expired at or before `now`. Returns the number of deleted items.
    async fn purge(&self, now: &DateTime<Utc>) -> Result<u64, Error>;
}
