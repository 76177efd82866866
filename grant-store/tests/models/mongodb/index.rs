use std::collections::HashMap;

use laboratory::{SpecContext, expect};
use mongodb::bson::{Document, doc};

use grant_store::models::{DEF_ACCESS_NAME, DEF_REFRESH_NAME, Error, Model};

use super::{STATE, TestState};
use crate::models::common::index as common_test;

pub fn after_each_fn(state: &mut HashMap<&'static str, TestState>) -> () {
    let state = state.get_mut(STATE).unwrap();
    let runtime = state.runtime.as_ref().unwrap();
    let model = state.mongodb.as_ref().unwrap();
    common_test::clear(runtime, model);
}

/// Test collection initialization.
pub fn init(context: &mut SpecContext<TestState>) -> Result<(), String> {
    let state = context.state.borrow();
    let state = state.get(STATE).unwrap();
    let runtime = state.runtime.as_ref().unwrap();
    let model = state.mongodb.as_ref().unwrap();

    common_test::init(runtime, model)
}

/// Test that the key index and the TTL index exist.
pub fn init_indexes(context: &mut SpecContext<TestState>) -> Result<(), String> {
    let state = context.state.borrow();
    let state = state.get(STATE).unwrap();
    let runtime = state.runtime.as_ref().unwrap();
    let conn = state.mongodb.as_ref().unwrap().get_connection();

    let names = match runtime.block_on(async {
        conn.collection::<Document>(DEF_REFRESH_NAME)
            .list_index_names()
            .await
    }) {
        Err(e) => return Err(format!("list_index_names() error: {}", e)),
        Ok(names) => names,
    };
    expect(names.contains(&"refresh_1".to_string())).to_equal(true)?;
    expect(names.contains(&"client_id_1".to_string())).to_equal(true)?;
    expect(names.contains(&"user_id_1".to_string())).to_equal(true)?;
    expect(names.contains(&"expires_at_1".to_string())).to_equal(true)
}

/// Test `add()` and `get()`.
pub fn add_get(context: &mut SpecContext<TestState>) -> Result<(), String> {
    let state = context.state.borrow();
    let state = state.get(STATE).unwrap();
    let runtime = state.runtime.as_ref().unwrap();
    let model = state.mongodb.as_ref().unwrap();

    common_test::add_get(runtime, model)
}

/// Test `add()` with duplicate key.
pub fn add_dup(context: &mut SpecContext<TestState>) -> Result<(), String> {
    let state = context.state.borrow();
    let state = state.get(STATE).unwrap();
    let runtime = state.runtime.as_ref().unwrap();
    let model = state.mongodb.as_ref().unwrap();

    common_test::add_dup(runtime, model)
}

/// Test `add()` without key.
pub fn add_no_key(context: &mut SpecContext<TestState>) -> Result<(), String> {
    let state = context.state.borrow();
    let state = state.get(STATE).unwrap();
    let runtime = state.runtime.as_ref().unwrap();
    let model = state.mongodb.as_ref().unwrap();

    common_test::add_no_key(runtime, model)
}

/// Test `get()` with a malformed stored document.
pub fn get_malformed(context: &mut SpecContext<TestState>) -> Result<(), String> {
    let state = context.state.borrow();
    let state = state.get(STATE).unwrap();
    let runtime = state.runtime.as_ref().unwrap();
    let conn = state.mongodb.as_ref().unwrap().get_connection();
    let model = state.mongodb.as_ref().unwrap();

    let item = doc! {
        "access": "access_malformed",
        "access_expires_in": "one hour",
    };
    if let Err(e) = runtime.block_on(async {
        conn.collection::<Document>(DEF_ACCESS_NAME)
            .insert_one(item)
            .await
    }) {
        return Err(format!("insert_one() error: {}", e));
    }

    match runtime.block_on(async { model.access().get("access_malformed").await }) {
        Err(Error::Decode(_)) => Ok(()),
        Err(e) => Err(format!("should be Decode error: {}", e)),
        Ok(_) => Err("malformed document should fail".to_string()),
    }
}

/// Test `del_one()`.
pub fn del_one(context: &mut SpecContext<TestState>) -> Result<(), String> {
    let state = context.state.borrow();
    let state = state.get(STATE).unwrap();
    let runtime = state.runtime.as_ref().unwrap();
    let model = state.mongodb.as_ref().unwrap();

    common_test::del_one(runtime, model)
}

/// Test `del_one()` twice.
pub fn del_one_twice(context: &mut SpecContext<TestState>) -> Result<(), String> {
    let state = context.state.borrow();
    let state = state.get(STATE).unwrap();
    let runtime = state.runtime.as_ref().unwrap();
    let model = state.mongodb.as_ref().unwrap();

    common_test::del_one_twice(runtime, model)
}

/// Test `del()` and `count()`.
pub fn del_count(context: &mut SpecContext<TestState>) -> Result<(), String> {
    let state = context.state.borrow();
    let state = state.get(STATE).unwrap();
    let runtime = state.runtime.as_ref().unwrap();
    let model = state.mongodb.as_ref().unwrap();

    common_test::del_count(runtime, model)
}

/// Test `purge()`.
pub fn purge(context: &mut SpecContext<TestState>) -> Result<(), String> {
    let state = context.state.borrow();
    let state = state.get(STATE).unwrap();
    let runtime = state.runtime.as_ref().unwrap();
    let model = state.mongodb.as_ref().unwrap();

    common_test::purge(runtime, model)
}

/// Test [`grant_store::models::expiry::sweep`].
pub fn sweep(context: &mut SpecContext<TestState>) -> Result<(), String> {
    let state = context.state.borrow();
    let state = state.get(STATE).unwrap();
    let runtime = state.runtime.as_ref().unwrap();
    let model = state.mongodb.as_ref().unwrap();

    common_test::sweep(runtime, model)
}
