//! Traits and implementations for accessing databases.
//!
//! One logical grant is stored as up to three documents, one per [`IndexKind`]. Each collection
//! owns its copy and its own expiry clock.

use std::sync::Arc;

use async_trait::async_trait;

pub mod codec;
pub mod error;
pub mod expiry;
pub mod index;
pub mod token;

mod model_mongodb;
mod model_sqlite;
mod mongodb;
mod sqlite;

pub use self::{
    error::Error,
    mongodb::conn::{self as mongodb_conn, Options as MongoDbOptions},
    sqlite::conn::{self as sqlite_conn, Options as SqliteOptions},
};
pub use model_mongodb::Model as MongoDbModel;
pub use model_sqlite::Model as SqliteModel;

use index::TokenIndex;
use token::IndexKind;

/// Database connection options for model implementation.
pub enum ConnOptions {
    /// Pure MongoDB model implementation.
    MongoDB(MongoDbOptions),
    /// Pure SQLite model implementation.
    Sqlite(SqliteOptions),
}

/// Collection (table) names of the three indices.
#[derive(Clone, Debug, PartialEq)]
pub struct CollectionNames {
    pub basic: String,
    pub access: String,
    pub refresh: String,
}

pub const DEF_BASIC_NAME: &'static str = "oauth2_basic";
pub const DEF_ACCESS_NAME: &'static str = "oauth2_access";
pub const DEF_REFRESH_NAME: &'static str = "oauth2_refresh";

/// The top level trait to get all collections.
#[async_trait]
pub trait Model: Send + Sync {
    /// Close database connection.
    async fn close(&self) -> Result<(), Error>;

    /// To get the collection keyed by authorization codes.
    fn basic(&self) -> &dyn TokenIndex;

    /// To get the collection keyed by access tokens.
    fn access(&self) -> &dyn TokenIndex;

    /// To get the collection keyed by refresh tokens.
    fn refresh(&self) -> &dyn TokenIndex;

    /// To get the collection of the specified kind.
    fn index(&self, kind: IndexKind) -> &dyn TokenIndex {
        match kind {
            IndexKind::Basic => self.basic(),
            IndexKind::Access => self.access(),
            IndexKind::Refresh => self.refresh(),
        }
    }
}

impl Default for CollectionNames {
    fn default() -> Self {
        CollectionNames {
            basic: DEF_BASIC_NAME.to_string(),
            access: DEF_ACCESS_NAME.to_string(),
            refresh: DEF_REFRESH_NAME.to_string(),
        }
    }
}

/// To create the database model with the specified database implementation.
///
/// Collections and their key/expiry indexes are created here, once.
pub async fn new(opts: &ConnOptions, names: &CollectionNames) -> Result<Arc<dyn Model>, Error> {
    let model: Arc<dyn Model> = match opts {
        ConnOptions::MongoDB(opts) => Arc::new(MongoDbModel::new(opts, names).await?),
        ConnOptions::Sqlite(opts) => Arc::new(SqliteModel::new(opts, names).await?),
    };
    Ok(model)
}
