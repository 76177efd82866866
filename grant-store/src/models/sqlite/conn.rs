use std::str::FromStr;

use log::LevelFilter;
use sqlx::{ConnectOptions, SqlitePool, sqlite::SqliteConnectOptions};

use super::super::Error;

/// SQLite connection options.
pub struct Options {
    /// SQLite database file path. Use absolute/relative path.
    pub path: String,
}

/// Connect to SQLite.
pub async fn connect(options: &Options) -> Result<SqlitePool, Error> {
    let opts = SqliteConnectOptions::from_str(&options.path)
        .map_err(Error::conn)?
        .create_if_missing(true)
        .log_statements(LevelFilter::Off);
    SqlitePool::connect_with(opts).await.map_err(Error::conn)
}
