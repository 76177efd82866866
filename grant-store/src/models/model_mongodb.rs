//! Pure MongoDB model.

use std::sync::Arc;

use async_trait::async_trait;
use mongodb::Database;

use super::{
    CollectionNames, Error,
    index::TokenIndex,
    mongodb::{
        conn::{self, Options},
        index::Index,
    },
    token::IndexKind,
};

/// Pure MongoDB model.
#[derive(Clone)]
pub struct Model {
    conn: Arc<Database>,
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

    /// Get the raw database connection ([`Database`]).
    pub fn get_connection(&self) -> &Database {
        &self.conn
    }
}

#[async_trait]
impl super::Model for Model {
    async fn close(&self) -> Result<(), Error> {
        self.conn.client().clone().shutdown().await;
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
