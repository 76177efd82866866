//! String libraries.

use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;

/// To check if the collection (table) name is valid.
///
/// SQLite table names are interpolated into statements, so only identifiers are accepted.
pub fn is_collection_name(name: &str) -> bool {
    let regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
    regex.is_match(name)
}

/// To convert time to ISO8601 format with milliseconds precision (`YYYY-MM-DDThh:mm:ss.SSSZ`).
pub fn time_str(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}
