use bson::doc;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use laboratory::{SpecContext, expect};

use grant_store::models::{
    Error,
    codec::{self, SecsNanos},
    token::TokenRecord,
};

use super::common::new_record;
use crate::TestState;

/// Test [`codec::encode`] and [`codec::decode`].
pub fn encode_decode(_context: &mut SpecContext<TestState>) -> Result<(), String> {
    let now = Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap();
    let record = new_record("codec", now);

    let doc = codec::encode(&record);
    expect(doc.code.as_str()).to_equal("code_codec")?;
    expect(doc.code_created_at).to_equal(SecsNanos {
        secs: 1_700_000_000,
        nanos: 123_456_789,
    })?;
    expect(doc.code_expires_in).to_equal(SecsNanos {
        secs: 3600,
        nanos: 0,
    })?;
    expect(doc.scope.as_str()).to_equal("scope1 scope2")?;

    match codec::decode(doc) {
        Err(e) => Err(format!("decode() error: {}", e)),
        Ok(decoded) => expect(decoded).to_equal(record),
    }
}

/// Test that a record with only zero values survives a round trip.
pub fn zero_values(_context: &mut SpecContext<TestState>) -> Result<(), String> {
    let record = TokenRecord {
        ..Default::default()
    };

    let doc = codec::encode(&record);
    expect(doc.code.as_str()).to_equal("")?;
    expect(doc.access_created_at).to_equal(SecsNanos { secs: 0, nanos: 0 })?;
    expect(doc.refresh_expires_in).to_equal(SecsNanos { secs: 0, nanos: 0 })?;

    let decoded = match codec::decode(doc) {
        Err(e) => return Err(format!("decode() error: {}", e)),
        Ok(decoded) => decoded,
    };
    expect(decoded.access_created_at).to_equal(DateTime::<Utc>::UNIX_EPOCH)?;
    expect(decoded.refresh_expires_in).to_equal(TimeDelta::zero())?;
    expect(decoded).to_equal(record)
}

/// Test [`codec::to_bson`] and [`codec::from_bson`].
pub fn bson(_context: &mut SpecContext<TestState>) -> Result<(), String> {
    let record = new_record("bson", Utc::now());

    let mut item = match codec::to_bson(&record) {
        Err(e) => return Err(format!("to_bson() error: {}", e)),
        Ok(item) => item,
    };
    expect(item.get_str("access").ok()).to_equal(Some("access_bson"))?;
    let expires_in = item
        .get_document("access_expires_in")
        .ok()
        .and_then(|d| d.get_i64("secs").ok());
    expect(expires_in).to_equal(Some(3600))?;

    // Fields added by the backend are ignored.
    item.insert("_id", "object_id");
    item.insert("expires_at", bson::DateTime::now());
    match codec::from_bson(item) {
        Err(e) => Err(format!("from_bson() error: {}", e)),
        Ok(decoded) => expect(decoded).to_equal(record),
    }
}

/// Test [`codec::to_json`] and [`codec::from_json`].
pub fn json(_context: &mut SpecContext<TestState>) -> Result<(), String> {
    let mut record = new_record("json", Utc::now());
    record.code = "".to_string();
    record.code_created_at = DateTime::<Utc>::UNIX_EPOCH;
    record.code_expires_in = TimeDelta::zero();
    record.scope = "quote ' and \" and \\".to_string();

    let value = match codec::to_json(&record) {
        Err(e) => return Err(format!("to_json() error: {}", e)),
        Ok(value) => value,
    };
    match codec::from_json(value.as_str()) {
        Err(e) => Err(format!("from_json() error: {}", e)),
        Ok(decoded) => expect(decoded).to_equal(record),
    }
}

/// Test decoding documents with missing fields or wrong types.
pub fn decode_malformed(_context: &mut SpecContext<TestState>) -> Result<(), String> {
    match codec::from_json("{}") {
        Err(Error::Decode(_)) => (),
        Err(e) => return Err(format!("empty JSON should be Decode error: {}", e)),
        Ok(_) => return Err("empty JSON should fail".to_string()),
    }
    match codec::from_json("not json") {
        Err(Error::Decode(_)) => (),
        Err(e) => return Err(format!("invalid JSON should be Decode error: {}", e)),
        Ok(_) => return Err("invalid JSON should fail".to_string()),
    }

    let mut doc = codec::encode(&new_record("malformed", Utc::now()));
    doc.access_created_at = SecsNanos {
        secs: i64::MAX,
        nanos: 0,
    };
    match codec::decode(doc) {
        Err(Error::Decode(_)) => (),
        Err(e) => return Err(format!("invalid time should be Decode error: {}", e)),
        Ok(_) => return Err("invalid time should fail".to_string()),
    }

    let mut doc = codec::encode(&new_record("malformed", Utc::now()));
    doc.code_expires_in = SecsNanos {
        secs: 1,
        nanos: 1_000_000_000,
    };
    match codec::decode(doc) {
        Err(Error::Decode(_)) => (),
        Err(e) => return Err(format!("invalid nanos should be Decode error: {}", e)),
        Ok(_) => return Err("invalid nanos should fail".to_string()),
    }

    match codec::from_json(r#"{"code_created_at":"2023-11-14T22:13:20Z"}"#) {
        Err(Error::Decode(_)) => (),
        Err(e) => return Err(format!("string time should be Decode error: {}", e)),
        Ok(_) => return Err("string time should fail".to_string()),
    }

    let item = doc! {"client_id": 1, "code": "code"};
    match codec::from_bson(item) {
        Err(Error::Decode(_)) => Ok(()),
        Err(e) => Err(format!("invalid BSON should be Decode error: {}", e)),
        Ok(_) => Err("invalid BSON should fail".to_string()),
    }
}

/// Test decoding a negative duration.
pub fn decode_negative(_context: &mut SpecContext<TestState>) -> Result<(), String> {
    let mut doc = codec::encode(&new_record("negative", Utc::now()));
    doc.refresh_expires_in = SecsNanos {
        secs: -1,
        nanos: 999_999_999,
    };
    match codec::decode(doc) {
        Err(Error::Decode(msg)) => expect(msg.contains("refresh_expires_in")).to_equal(true),
        Err(e) => Err(format!("should be Decode error: {}", e)),
        Ok(_) => Err("negative duration should fail".to_string()),
    }
}

/// Test round trips of the earliest and the latest timestamps and of very long durations.
pub fn extreme_values(_context: &mut SpecContext<TestState>) -> Result<(), String> {
    let mut record = new_record("extreme", Utc::now());
    record.code_created_at = DateTime::<Utc>::MIN_UTC;
    record.access_created_at = DateTime::<Utc>::MAX_UTC;
    record.refresh_created_at = Utc.timestamp_opt(-1, 1).unwrap();
    record.code_expires_in = TimeDelta::MAX;
    record.access_expires_in = TimeDelta::days(365 * 300);
    record.refresh_expires_in = TimeDelta::nanoseconds(1);

    let value = match codec::to_json(&record) {
        Err(e) => return Err(format!("to_json() error: {}", e)),
        Ok(value) => value,
    };
    match codec::from_json(value.as_str()) {
        Err(e) => return Err(format!("from_json() error: {}", e)),
        Ok(decoded) => expect(decoded).to_equal(record.clone())?,
    }

    let item = match codec::to_bson(&record) {
        Err(e) => return Err(format!("to_bson() error: {}", e)),
        Ok(item) => item,
    };
    match codec::from_bson(item) {
        Err(e) => Err(format!("from_bson() error: {}", e)),
        Ok(decoded) => expect(decoded).to_equal(record),
    }
}
