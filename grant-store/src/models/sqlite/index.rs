use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sql_builder::{SqlBuilder, quote};
use sqlx::SqlitePool;

use grant_store_corelib::strings;

use super::super::{
    Error, codec,
    index::{EXPIRES_AT_FIELD, QueryCond, TokenIndex, expires_at_millis},
    token::{IndexKind, TokenRecord},
};

/// Model instance of one token table.
pub struct Index {
    /// The associated database connection.
    conn: Arc<SqlitePool>,
    kind: IndexKind,
    name: String,
}

/// SQLite schema. Only the payload is read back, other columns exist for conditions.
#[derive(sqlx::FromRow)]
struct Schema {
    /// The JSON encoded document.
    doc: String,
}

/// Use "COUNT(*)" instead of "COUNT(fields...)" to simplify the implementation.
#[derive(sqlx::FromRow)]
struct CountSchema {
    #[sqlx(rename = "COUNT(*)")]
    count: i64,
}

const FIELDS: &'static [&'static str] = &[
    "code",
    "access",
    "refresh",
    "client_id",
    "user_id",
    EXPIRES_AT_FIELD,
    "doc",
];

impl Index {
    /// To create the model instance with a database connection.
    pub async fn new(conn: Arc<SqlitePool>, kind: IndexKind, name: &str) -> Result<Self, Error> {
        if !strings::is_collection_name(name) {
            return Err(Error::conn(format!("invalid table name {}", name)));
        }
        let index = Index {
            conn,
            kind,
            name: name.to_string(),
        };
        index.init().await?;
        Ok(index)
    }

    /// `expires_at` is stored as milliseconds from Epoch rounded up, `NULL` for never.
    fn table_init_sql(&self) -> String {
        format!(
            "\
            CREATE TABLE IF NOT EXISTS {} (\
            code TEXT NOT NULL,\
            access TEXT NOT NULL,\
            refresh TEXT NOT NULL,\
            client_id TEXT NOT NULL,\
            user_id TEXT NOT NULL,\
            expires_at INTEGER,\
            doc TEXT NOT NULL,\
            PRIMARY KEY ({}))",
            self.name,
            self.kind.key_field()
        )
    }

    async fn execute(&self, sql: &str) -> Result<u64, Error> {
        let result = sqlx::query(sql)
            .execute(self.conn.as_ref())
            .await
            .map_err(Error::write)?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl TokenIndex for Index {
    fn name(&self) -> &str {
        self.name.as_str()
    }

    async fn init(&self) -> Result<(), Error> {
        let _ = sqlx::query(self.table_init_sql().as_str())
            .execute(self.conn.as_ref())
            .await
            .map_err(Error::conn)?;
        for field in ["client_id", "user_id"] {
            let sql = format!(
                "CREATE INDEX IF NOT EXISTS {}_{} ON {} ({})",
                self.name, field, self.name, field
            );
            let _ = sqlx::query(sql.as_str())
                .execute(self.conn.as_ref())
                .await
                .map_err(Error::conn)?;
        }
        self.ensure_ttl_index().await
    }

    async fn ensure_ttl_index(&self) -> Result<(), Error> {
        let sql = format!(
            "CREATE INDEX IF NOT EXISTS {}_{} ON {} ({})",
            self.name, EXPIRES_AT_FIELD, self.name, EXPIRES_AT_FIELD
        );
        let _ = sqlx::query(sql.as_str())
            .execute(self.conn.as_ref())
            .await
            .map_err(Error::conn)?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<TokenRecord>, Error> {
        let sql = SqlBuilder::select_from(self.name.as_str())
            .field("doc")
            .and_where_eq(self.kind.key_field(), quote(key))
            .sql()
            .map_err(|e| Error::read(e.to_string()))?;

        let result: Result<Schema, sqlx::Error> = sqlx::query_as(sql.as_str())
            .fetch_one(self.conn.as_ref())
            .await;

        let row = match result {
            Err(e) => match e {
                sqlx::Error::RowNotFound => return Ok(None),
                _ => return Err(Error::read(e)),
            },
            Ok(row) => row,
        };
        Ok(Some(codec::from_json(row.doc.as_str())?))
    }

    async fn add(&self, record: &TokenRecord) -> Result<(), Error> {
        if self.kind.key(record).is_empty() {
            return Err(Error::InvalidRecord("empty key"));
        }
        let expires_at = match self.kind.expires_at(record) {
            None => "NULL".to_string(),
            Some(time) => expires_at_millis(&time).to_string(),
        };
        let values = vec![
            quote(record.code.as_str()),
            quote(record.access.as_str()),
            quote(record.refresh.as_str()),
            quote(record.client_id.as_str()),
            quote(record.user_id.as_str()),
            expires_at,
            quote(codec::to_json(record)?.as_str()),
        ];
        let sql = SqlBuilder::insert_into(self.name.as_str())
            .fields(FIELDS)
            .values(&values)
            .sql()
            .map_err(|e| Error::write(e.to_string()))?;
        let _ = self.execute(sql.as_str()).await?;
        Ok(())
    }

    async fn del_one(&self, key: &str) -> Result<(), Error> {
        let sql = SqlBuilder::delete_from(self.name.as_str())
            .and_where_eq(self.kind.key_field(), quote(key))
            .sql()
            .map_err(|e| Error::write(e.to_string()))?;
        let _ = self.execute(sql.as_str()).await?;
        Ok(())
    }

    async fn del(&self, cond: &QueryCond) -> Result<u64, Error> {
        let sql = get_query_sql(&mut SqlBuilder::delete_from(self.name.as_str()), cond)
            .sql()
            .map_err(|e| Error::write(e.to_string()))?;
        self.execute(sql.as_str()).await
    }

    async fn count(&self, cond: &QueryCond) -> Result<u64, Error> {
        let sql = get_query_sql(
            SqlBuilder::select_from(self.name.as_str()).count("*"),
            cond,
        )
        .sql()
        .map_err(|e| Error::read(e.to_string()))?;

        let result: Result<CountSchema, sqlx::Error> = sqlx::query_as(sql.as_str())
            .fetch_one(self.conn.as_ref())
            .await;

        let row = match result {
            Err(e) => return Err(Error::read(e)),
            Ok(row) => row,
        };
        Ok(row.count as u64)
    }

    async fn purge(&self, now: &DateTime<Utc>) -> Result<u64, Error> {
        // `NULL <= n` is never true so rows that never expire are kept.
        let sql = SqlBuilder::delete_from(self.name.as_str())
            .and_where_le(EXPIRES_AT_FIELD, now.timestamp_millis())
            .sql()
            .map_err(|e| Error::write(e.to_string()))?;
        self.execute(sql.as_str()).await
    }
}

/// Transforms query conditions to the SQL builder.
fn get_query_sql<'a>(builder: &'a mut SqlBuilder, cond: &QueryCond<'a>) -> &'a mut SqlBuilder {
    if let Some(value) = cond.code {
        builder.and_where_eq("code", quote(value));
    }
    if let Some(value) = cond.access {
        builder.and_where_eq("access", quote(value));
    }
    if let Some(value) = cond.refresh {
        builder.and_where_eq("refresh", quote(value));
    }
    if let Some(value) = cond.client_id {
        builder.and_where_eq("client_id", quote(value));
    }
    if let Some(value) = cond.user_id {
        builder.and_where_eq("user_id", quote(value));
    }
    builder
}
