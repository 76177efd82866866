//! Record codec between [`TokenRecord`] and the persisted document.
//!
//! The persisted document has the same shape in every backend:
//!
//! ```text
//! {client_id, user_id, redirect_uri, scope,
//!  code, code_created_at, code_expires_in,
//!  access, access_created_at, access_expires_in,
//!  refresh, refresh_created_at, refresh_expires_in}
//! ```
//!
//! Timestamps (seconds from the UNIX epoch) and durations are stored as `{secs, nanos}` pairs, so
//! every value `chrono` can represent survives a round trip unchanged, zero values included.
//!
//! Encoding and decoding are pure. Decoding fails with [`Error::Decode`] only when the stored
//! document is structurally malformed.

use bson::Document;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use super::{Error, token::TokenRecord};

/// The persisted document.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct TokenDoc {
    pub client_id: String,
    pub user_id: String,
    pub redirect_uri: String,
    pub scope: String,
    pub code: String,
    pub code_created_at: SecsNanos,
    pub code_expires_in: SecsNanos,
    pub access: String,
    pub access_created_at: SecsNanos,
    pub access_expires_in: SecsNanos,
    pub refresh: String,
    pub refresh_created_at: SecsNanos,
    pub refresh_expires_in: SecsNanos,
}

/// A timestamp or a duration split into whole seconds and the nanosecond remainder.
///
/// `nanos` is always in `0..1_000_000_000` except for leap seconds of timestamps.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct SecsNanos {
    pub secs: i64,
    pub nanos: u32,
}

/// To encode a record into the persisted document.
pub fn encode(record: &TokenRecord) -> TokenDoc {
    TokenDoc {
        client_id: record.client_id.clone(),
        user_id: record.user_id.clone(),
        redirect_uri: record.redirect_uri.clone(),
        scope: record.scope.clone(),
        code: record.code.clone(),
        code_created_at: encode_time(&record.code_created_at),
        code_expires_in: encode_duration(&record.code_expires_in),
        access: record.access.clone(),
        access_created_at: encode_time(&record.access_created_at),
        access_expires_in: encode_duration(&record.access_expires_in),
        refresh: record.refresh.clone(),
        refresh_created_at: encode_time(&record.refresh_created_at),
        refresh_expires_in: encode_duration(&record.refresh_expires_in),
    }
}

/// To decode the persisted document into a record.
pub fn decode(doc: TokenDoc) -> Result<TokenRecord, Error> {
    Ok(TokenRecord {
        code_created_at: decode_time("code_created_at", &doc.code_created_at)?,
        code_expires_in: decode_duration("code_expires_in", &doc.code_expires_in)?,
        access_created_at: decode_time("access_created_at", &doc.access_created_at)?,
        access_expires_in: decode_duration("access_expires_in", &doc.access_expires_in)?,
        refresh_created_at: decode_time("refresh_created_at", &doc.refresh_created_at)?,
        refresh_expires_in: decode_duration("refresh_expires_in", &doc.refresh_expires_in)?,
        client_id: doc.client_id,
        user_id: doc.user_id,
        redirect_uri: doc.redirect_uri,
        scope: doc.scope,
        code: doc.code,
        access: doc.access,
        refresh: doc.refresh,
    })
}

/// To serialize a record as a BSON document for MongoDB.
pub fn to_bson(record: &TokenRecord) -> Result<Document, Error> {
    bson::to_document(&encode(record)).map_err(Error::write)
}

/// To deserialize a BSON document from MongoDB. Unknown fields (`_id`, `expires_at`) are
/// ignored.
pub fn from_bson(doc: Document) -> Result<TokenRecord, Error> {
    match bson::from_document::<TokenDoc>(doc) {
        Err(e) => Err(Error::Decode(e.to_string())),
        Ok(doc) => decode(doc),
    }
}

/// To serialize a record as a JSON string for SQLite.
pub fn to_json(record: &TokenRecord) -> Result<String, Error> {
    serde_json::to_string(&encode(record)).map_err(Error::write)
}

/// To deserialize a JSON string from SQLite.
pub fn from_json(value: &str) -> Result<TokenRecord, Error> {
    match serde_json::from_str::<TokenDoc>(value) {
        Err(e) => Err(Error::Decode(e.to_string())),
        Ok(doc) => decode(doc),
    }
}

fn encode_time(time: &DateTime<Utc>) -> SecsNanos {
    SecsNanos {
        secs: time.timestamp(),
        nanos: time.timestamp_subsec_nanos(),
    }
}

fn encode_duration(duration: &TimeDelta) -> SecsNanos {
    // `num_seconds()` rounds toward zero. Borrow one second so that `nanos` stays positive.
    let secs = duration.num_seconds();
    let nanos = duration.subsec_nanos();
    match nanos < 0 {
        false => SecsNanos {
            secs,
            nanos: nanos as u32,
        },
        true => SecsNanos {
            secs: secs - 1,
            nanos: (nanos + 1_000_000_000) as u32,
        },
    }
}

fn decode_time(field: &str, value: &SecsNanos) -> Result<DateTime<Utc>, Error> {
    match DateTime::<Utc>::from_timestamp(value.secs, value.nanos) {
        None => Err(Error::Decode(format!(
            "{}: timestamp {}.{:09} out of range",
            field, value.secs, value.nanos
        ))),
        Some(time) => Ok(time),
    }
}

fn decode_duration(field: &str, value: &SecsNanos) -> Result<TimeDelta, Error> {
    if value.secs < 0 {
        return Err(Error::Decode(format!(
            "{}: negative duration {}s",
            field, value.secs
        )));
    }
    match TimeDelta::new(value.secs, value.nanos) {
        None => Err(Error::Decode(format!(
            "{}: duration {}.{:09} out of range",
            field, value.secs, value.nanos
        ))),
        Some(duration) => Ok(duration),
    }
}
