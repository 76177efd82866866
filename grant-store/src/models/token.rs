//! The logical token record and the collections that index it.

use chrono::{DateTime, TimeDelta, Utc};

/// One logical grant.
///
/// A record carries any non-empty subset of `code`, `access` and `refresh`. Empty strings, the
/// UNIX epoch and a zero duration are the "not issued" values.
#[derive(Clone, Debug, PartialEq)]
pub struct TokenRecord {
    pub client_id: String,
    pub user_id: String,
    pub redirect_uri: String,
    pub scope: String,
    pub code: String,
    pub code_created_at: DateTime<Utc>,
    pub code_expires_in: TimeDelta,
    pub access: String,
    pub access_created_at: DateTime<Utc>,
    pub access_expires_in: TimeDelta,
    pub refresh: String,
    pub refresh_created_at: DateTime<Utc>,
    pub refresh_expires_in: TimeDelta,
}

/// The three physical collections of the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexKind {
    /// Keyed by the authorization code.
    Basic,
    /// Keyed by the access token.
    Access,
    /// Keyed by the refresh token.
    Refresh,
}

impl Default for TokenRecord {
    fn default() -> Self {
        TokenRecord {
            client_id: String::new(),
            user_id: String::new(),
            redirect_uri: String::new(),
            scope: String::new(),
            code: String::new(),
            code_created_at: DateTime::<Utc>::UNIX_EPOCH,
            code_expires_in: TimeDelta::zero(),
            access: String::new(),
            access_created_at: DateTime::<Utc>::UNIX_EPOCH,
            access_expires_in: TimeDelta::zero(),
            refresh: String::new(),
            refresh_created_at: DateTime::<Utc>::UNIX_EPOCH,
            refresh_expires_in: TimeDelta::zero(),
        }
    }
}

impl TokenRecord {
    /// Returns `true` if at least one of code, access token or refresh token is set.
    pub fn has_key(&self) -> bool {
        !self.code.is_empty() || !self.access.is_empty() || !self.refresh.is_empty()
    }
}

impl IndexKind {
    pub const ALL: [IndexKind; 3] = [IndexKind::Basic, IndexKind::Access, IndexKind::Refresh];

    /// The document field used as the primary key of the collection.
    pub fn key_field(&self) -> &'static str {
        match self {
            IndexKind::Basic => "code",
            IndexKind::Access => "access",
            IndexKind::Refresh => "refresh",
        }
    }

    /// The primary key value of the record in this collection.
    pub fn key<'a>(&self, record: &'a TokenRecord) -> &'a str {
        match self {
            IndexKind::Basic => record.code.as_str(),
            IndexKind::Access => record.access.as_str(),
            IndexKind::Refresh => record.refresh.as_str(),
        }
    }

    /// The absolute expiry instant of the record in this collection.
    ///
    /// `None` means the document never expires (zero `expires_in`). An instant past the range of
    /// `DateTime` is clamped to [`DateTime::MAX_UTC`].
    pub fn expires_at(&self, record: &TokenRecord) -> Option<DateTime<Utc>> {
        let (created_at, expires_in) = match self {
            IndexKind::Basic => (record.code_created_at, record.code_expires_in),
            IndexKind::Access => (record.access_created_at, record.access_expires_in),
            IndexKind::Refresh => (record.refresh_created_at, record.refresh_expires_in),
        };
        if expires_in.is_zero() {
            return None;
        }
        match created_at.checked_add_signed(expires_in) {
            None => Some(DateTime::<Utc>::MAX_UTC),
            Some(expires_at) => Some(expires_at),
        }
    }

    /// Returns `true` if the record is no longer readable through this collection at `now`.
    pub fn is_expired(&self, record: &TokenRecord, now: &DateTime<Utc>) -> bool {
        match self.expires_at(record) {
            None => false,
            Some(expires_at) => expires_at <= *now,
        }
    }
}
