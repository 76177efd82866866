use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use mongodb::{
    Database,
    bson::{Bson, DateTime, Document, doc},
};

use super::super::{
    Error, codec,
    index::{EXPIRES_AT_FIELD, QueryCond, TokenIndex, expires_at_millis},
    token::{IndexKind, TokenRecord},
};

/// Model instance of one token collection.
pub struct Index {
    /// The associated database connection.
    conn: Arc<Database>,
    kind: IndexKind,
    name: String,
}

impl Index {
    /// To create the model instance with a database connection.
    pub async fn new(conn: Arc<Database>, kind: IndexKind, name: &str) -> Result<Self, Error> {
        let index = Index {
            conn,
            kind,
            name: name.to_string(),
        };
        index.init().await?;
        Ok(index)
    }

    fn key_filter(&self, key: &str) -> Document {
        let mut filter = Document::new();
        filter.insert(self.kind.key_field(), key);
        filter
    }
}

#[async_trait]
impl TokenIndex for Index {
    fn name(&self) -> &str {
        self.name.as_str()
    }

    async fn init(&self) -> Result<(), Error> {
        let key_field = self.kind.key_field();
        let mut key = Document::new();
        key.insert(key_field, 1);
        let indexes = vec![
            doc! {"name": format!("{}_1", key_field), "key": key, "unique": true},
            doc! {"name": "client_id_1", "key": {"client_id": 1}},
            doc! {"name": "user_id_1", "key": {"user_id": 1}},
        ];
        let command = doc! {
            "createIndexes": self.name.as_str(),
            "indexes": indexes,
        };
        self.conn.run_command(command).await.map_err(Error::conn)?;
        self.ensure_ttl_index().await
    }

    async fn ensure_ttl_index(&self) -> Result<(), Error> {
        // Documents without a date in `expires_at` (null) are ignored by the TTL monitor.
        let command = doc! {
            "createIndexes": self.name.as_str(),
            "indexes": [
                {"name": "expires_at_1", "key": {EXPIRES_AT_FIELD: 1}, "expireAfterSeconds": 0},
            ],
        };
        self.conn.run_command(command).await.map_err(Error::conn)?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<TokenRecord>, Error> {
        let item = self
            .conn
            .collection::<Document>(self.name.as_str())
            .find_one(self.key_filter(key))
            .await
            .map_err(Error::read)?;
        match item {
            None => Ok(None),
            Some(item) => Ok(Some(codec::from_bson(item)?)),
        }
    }

    async fn add(&self, record: &TokenRecord) -> Result<(), Error> {
        if self.kind.key(record).is_empty() {
            return Err(Error::InvalidRecord("empty key"));
        }
        let mut item = codec::to_bson(record)?;
        let expires_at = match self.kind.expires_at(record) {
            None => Bson::Null,
            Some(time) => Bson::DateTime(DateTime::from_millis(expires_at_millis(&time))),
        };
        item.insert(EXPIRES_AT_FIELD, expires_at);
        self.conn
            .collection::<Document>(self.name.as_str())
            .insert_one(item)
            .await
            .map_err(Error::write)?;
        Ok(())
    }

    async fn del_one(&self, key: &str) -> Result<(), Error> {
        self.conn
            .collection::<Document>(self.name.as_str())
            .delete_one(self.key_filter(key))
            .await
            .map_err(Error::write)?;
        Ok(())
    }

    async fn del(&self, cond: &QueryCond) -> Result<u64, Error> {
        let filter = get_query_filter(cond);
        let result = self
            .conn
            .collection::<Document>(self.name.as_str())
            .delete_many(filter)
            .await
            .map_err(Error::write)?;
        Ok(result.deleted_count)
    }

    async fn count(&self, cond: &QueryCond) -> Result<u64, Error> {
        let filter = get_query_filter(cond);
        self.conn
            .collection::<Document>(self.name.as_str())
            .count_documents(filter)
            .await
            .map_err(Error::read)
    }

    async fn purge(&self, now: &chrono::DateTime<Utc>) -> Result<u64, Error> {
        // `$lte` on a date never matches null.
        let filter = doc! {EXPIRES_AT_FIELD: {"$lte": DateTime::from_chrono(*now)}};
        let result = self
            .conn
            .collection::<Document>(self.name.as_str())
            .delete_many(filter)
            .await
            .map_err(Error::write)?;
        Ok(result.deleted_count)
    }
}

/// Transforms query conditions to the MongoDB document.
fn get_query_filter(cond: &QueryCond) -> Document {
    let mut filter = Document::new();
    if let Some(value) = cond.code {
        filter.insert("code", value);
    }
    if let Some(value) = cond.access {
        filter.insert("access", value);
    }
    if let Some(value) = cond.refresh {
        filter.insert("refresh", value);
    }
    if let Some(value) = cond.client_id {
        filter.insert("client_id", value);
    }
    if let Some(value) = cond.user_id {
        filter.insert("user_id", value);
    }
    filter
}
