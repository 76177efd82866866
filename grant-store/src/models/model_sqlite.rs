//! Pure SQLite model.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::SqlitePool;

use super::{
    CollectionNames, Error,
    index::TokenIndex,
    sqlite::{
        conn::{self, Options},
        index::Index,
    },
    token::IndexKind,
};

/// Pure SQLite model.
#[derive(Clone)]
pub struct Model {
    conn: Arc<SqlitePool>,
    basic: Arc<Index>,
    access: Arc<Index>,
    refresh: Arc<Index>,
}

impl Model {
    /// Create an instance.
    pub async fn new(opts: &Options, names: &CollectionNames) -> Result<Self, Error> {
        let conn = Arc::new(conn::connect(opts).await?);
        Ok(Model {
            conn: conn.clone(),
            basic: Arc::new(Index::new(conn.clone(), IndexKind::Basic, &names.basic).await?),
            access: Arc::new(Index::new(conn.clone(), IndexKind::Access, &names.access).await?),
            refresh: Arc::new(Index::new(conn.clone(), IndexKind::Refresh, &names.refresh).await?),
        })
    }

    /// Get the raw database connection ([`SqlitePool`]).
    pub fn get_connection(&self) -> &SqlitePool {
        &self.conn
    }
}

#[async_trait]
impl super::Model for Model {
    async fn close(&self) -> Result<(), Error> {
        self.conn.close().await;
        Ok(())
    }

    fn basic(&self) -> &dyn TokenIndex {
        self.basic.as_ref()
    }

    fn access(&self) -> &dyn TokenIndex {
        self.access.as_ref()
    }

    fn refresh(&self) -> &dyn TokenIndex {
        self.refresh.as_ref()
    }
}
