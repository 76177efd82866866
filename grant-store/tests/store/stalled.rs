//! A model whose operations never complete, to interrupt operations that are in flight.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future;

use grant_store::models::{
    Error, Model,
    index::{QueryCond, TokenIndex},
    token::TokenRecord,
};

pub struct StalledModel {
    basic: StalledIndex,
    access: StalledIndex,
    refresh: StalledIndex,
}

pub struct StalledIndex {
    name: &'static str,
}

impl StalledModel {
    pub fn new() -> Self {
        StalledModel {
            basic: StalledIndex { name: "basic" },
            access: StalledIndex { name: "access" },
            refresh: StalledIndex { name: "refresh" },
        }
    }
}

#[async_trait]
impl Model for StalledModel {
    async fn close(&self) -> Result<(), Error> {
        Ok(())
    }

    fn basic(&self) -> &dyn TokenIndex {
        &self.basic
    }

    fn access(&self) -> &dyn TokenIndex {
        &self.access
    }

    fn refresh(&self) -> &dyn TokenIndex {
        &self.refresh
    }
}

#[async_trait]
impl TokenIndex for StalledIndex {
    fn name(&self) -> &str {
        self.name
    }

    async fn init(&self) -> Result<(), Error> {
        Ok(())
    }

    async fn ensure_ttl_index(&self) -> Result<(), Error> {
        Ok(())
    }

    async fn get(&self, _key: &str) -> Result<Option<TokenRecord>, Error> {
        future::pending().await
    }

    async fn add(&self, _record: &TokenRecord) -> Result<(), Error> {
        future::pending().await
    }

    async fn del_one(&self, _key: &str) -> Result<(), Error> {
        future::pending().await
    }

    async fn del(&self, _cond: &QueryCond) -> Result<u64, Error> {
        future::pending().await
    }

    async fn count(&self, _cond: &QueryCond) -> Result<u64, Error> {
        future::pending().await
    }

    async fn purge(&self, _now: &DateTime<Utc>) -> Result<u64, Error> {
        future::pending().await
    }
}
