//! The token store service.
//!
//! [`TokenStore`] fans a grant out to the collections keyed by its code, access token and refresh
//! token, and reads it back through any of them. Reads hide documents that have expired but are
//! not swept yet.

use std::{future::Future, sync::Arc, time::Duration};

use chrono::{TimeDelta, Utc};
use futures::future;
use log::{debug, error};
use tokio::time;
use tokio_util::sync::CancellationToken;

use grant_store_corelib::{constants::DbEngine, strings::time_str};

use crate::{
    libs::config::{self, Config},
    models::{
        self, CollectionNames, ConnOptions, Error, Model, MongoDbOptions, SqliteOptions,
        expiry::Sweeper,
        token::{IndexKind, TokenRecord},
    },
};

/// The persistence service of OAuth2 grants.
#[derive(Clone)]
pub struct TokenStore {
    model: Arc<dyn Model>,
    /// Per-operation timeout.
    timeout: Option<Duration>,
}

impl TokenStore {
    /// To create a store on an opened model. A zero `timeout` means no timeout.
    pub fn new(model: Arc<dyn Model>, timeout: Option<Duration>) -> Self {
        TokenStore {
            model,
            timeout: timeout.filter(|timeout| !timeout.is_zero()),
        }
    }

    /// The underlying model. Used to close the connection on shutdown.
    pub fn model(&self) -> &Arc<dyn Model> {
        &self.model
    }

    /// To persist a grant into every collection whose key is set, in the order Basic, Access,
    /// Refresh.
    ///
    /// The first failure is returned and earlier writes are kept.
    pub async fn create(
        &self,
        cancel: &CancellationToken,
        record: &TokenRecord,
    ) -> Result<(), Error> {
        const FN_NAME: &'static str = "create";

        if !record.has_key() {
            return Err(Error::InvalidRecord("no code, access token or refresh token"));
        }
        let zero = TimeDelta::zero();
        if record.code_expires_in < zero
            || record.access_expires_in < zero
            || record.refresh_expires_in < zero
        {
            return Err(Error::InvalidRecord("negative expires_in"));
        }

        self.run(FN_NAME, cancel, self.add_all(record)).await
    }

    /// To get a grant by its authorization code. Returns `None` if the code does not exist or has
    /// expired.
    pub async fn get_by_code(
        &self,
        cancel: &CancellationToken,
        code: &str,
    ) -> Result<Option<TokenRecord>, Error> {
        const FN_NAME: &'static str = "get_by_code";

        self.run(FN_NAME, cancel, self.get_live(IndexKind::Basic, code))
            .await
    }

    /// To get a grant by its access token. Returns [`Error::NotFound`] if the token does not exist
    /// or has expired.
    pub async fn get_by_access(
        &self,
        cancel: &CancellationToken,
        access: &str,
    ) -> Result<TokenRecord, Error> {
        const FN_NAME: &'static str = "get_by_access";

        match self
            .run(FN_NAME, cancel, self.get_live(IndexKind::Access, access))
            .await?
        {
            None => Err(Error::NotFound),
            Some(record) => Ok(record),
        }
    }

    /// To get a grant by its refresh token. Returns [`Error::NotFound`] if the token does not
    /// exist or has expired.
    pub async fn get_by_refresh(
        &self,
        cancel: &CancellationToken,
        refresh: &str,
    ) -> Result<TokenRecord, Error> {
        const FN_NAME: &'static str = "get_by_refresh";

        match self
            .run(FN_NAME, cancel, self.get_live(IndexKind::Refresh, refresh))
            .await?
        {
            None => Err(Error::NotFound),
            Some(record) => Ok(record),
        }
    }

    /// To delete the grant keyed by the authorization code.
    pub async fn remove_by_code(&self, cancel: &CancellationToken, code: &str) -> Result<(), Error> {
        const FN_NAME: &'static str = "remove_by_code";

        self.run(FN_NAME, cancel, self.model.basic().del_one(code))
            .await
    }

    /// To delete the grant keyed by the access token. The refresh token is kept.
    pub async fn remove_by_access(
        &self,
        cancel: &CancellationToken,
        access: &str,
    ) -> Result<(), Error> {
        const FN_NAME: &'static str = "remove_by_access";

        self.run(FN_NAME, cancel, self.model.access().del_one(access))
            .await
    }

    /// To delete the grant keyed by the refresh token. The access token is kept.
    pub async fn remove_by_refresh(
        &self,
        cancel: &CancellationToken,
        refresh: &str,
    ) -> Result<(), Error> {
        const FN_NAME: &'static str = "remove_by_refresh";

        self.run(FN_NAME, cancel, self.model.refresh().del_one(refresh))
            .await
    }

    /// To delete the access token and the refresh token issued with it.
    ///
    /// The authorization code is not touched.
    pub async fn remove_all_tokens_by_access(
        &self,
        cancel: &CancellationToken,
        access: &str,
    ) -> Result<(), Error> {
        const FN_NAME: &'static str = "remove_all_tokens_by_access";

        self.run(
            FN_NAME,
            cancel,
            self.remove_pair(IndexKind::Access, IndexKind::Refresh, access),
        )
        .await
    }

    /// To delete the refresh token and the access token issued with it.
    ///
    /// The authorization code is not touched.
    pub async fn remove_all_tokens_by_refresh(
        &self,
        cancel: &CancellationToken,
        refresh: &str,
    ) -> Result<(), Error> {
        const FN_NAME: &'static str = "remove_all_tokens_by_refresh";

        self.run(
            FN_NAME,
            cancel,
            self.remove_pair(IndexKind::Refresh, IndexKind::Access, refresh),
        )
        .await
    }

    async fn add_all(&self, record: &TokenRecord) -> Result<(), Error> {
        for kind in IndexKind::ALL {
            if kind.key(record).is_empty() {
                continue;
            }
            self.model.index(kind).add(record).await?;
        }
        Ok(())
    }

    async fn get_live(&self, kind: IndexKind, key: &str) -> Result<Option<TokenRecord>, Error> {
        const FN_NAME: &'static str = "get_live";

        let record = match self.model.index(kind).get(key).await? {
            None => return Ok(None),
            Some(record) => record,
        };
        if kind.is_expired(&record, &Utc::now()) {
            if let Some(expires_at) = kind.expires_at(&record) {
                debug!(
                    "[{}] {} expired at {}",
                    FN_NAME,
                    kind.key_field(),
                    time_str(&expires_at)
                );
            }
            return Ok(None);
        }
        Ok(Some(record))
    }

    /// Expired documents are read too so that a live sibling is still removed.
    async fn remove_pair(&self, by: IndexKind, sibling: IndexKind, key: &str) -> Result<(), Error> {
        let record = match self.model.index(by).get(key).await? {
            None => return Ok(()),
            Some(record) => record,
        };
        self.model.index(by).del_one(key).await?;
        let sibling_key = sibling.key(&record);
        if !sibling_key.is_empty() {
            self.model.index(sibling).del_one(sibling_key).await?;
        }
        Ok(())
    }

    /// To run the operation unless the cancellation token fires or the timeout elapses first.
    async fn run<T, F>(
        &self,
        fn_name: &'static str,
        cancel: &CancellationToken,
        fut: F,
    ) -> Result<T, Error>
    where
        F: Future<Output = Result<T, Error>>,
    {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let timeout = async {
            match self.timeout {
                None => future::pending::<()>().await,
                Some(timeout) => time::sleep(timeout).await,
            }
        };
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Error::Cancelled),
            _ = timeout => Err(Error::Cancelled),
            result = fut => result,
        };
        match result.as_ref() {
            Err(Error::NotFound) | Err(Error::Cancelled) | Err(Error::InvalidRecord(_)) => (),
            Err(e) => error!("[{}] error: {}", fn_name, e),
            Ok(_) => (),
        }
        result
    }
}

/// To connect the database described by the configuration, create the collections and start the
/// expiry sweep.
pub async fn new_store(conf: &Config) -> Result<(TokenStore, Sweeper), Error> {
    const FN_NAME: &'static str = "new_store";

    let conf = config::apply_default(conf);
    let db = conf.db.unwrap_or_default();
    let engine = db.engine.unwrap_or(config::DEF_ENGINE.to_string());
    let db_opts = match engine.as_str() {
        DbEngine::MONGODB => {
            let conf = db.mongodb.unwrap_or_default();
            ConnOptions::MongoDB(MongoDbOptions {
                url: conf.url.unwrap_or(config::DEF_MONGODB_URL.to_string()),
                db: conf.database.unwrap_or(config::DEF_MONGODB_DB.to_string()),
                pool_size: conf.pool_size,
            })
        }
        _ => {
            let conf = db.sqlite.unwrap_or_default();
            ConnOptions::Sqlite(SqliteOptions {
                path: conf.path.unwrap_or(config::DEF_SQLITE_PATH.to_string()),
            })
        }
    };
    let names = match conf.collections {
        None => CollectionNames::default(),
        Some(collections) => {
            let def = CollectionNames::default();
            CollectionNames {
                basic: collections.basic.unwrap_or(def.basic),
                access: collections.access.unwrap_or(def.access),
                refresh: collections.refresh.unwrap_or(def.refresh),
            }
        }
    };

    let model = match models::new(&db_opts, &names).await {
        Err(e) => {
            error!("[{}] connect {} error: {}", FN_NAME, engine, e);
            return Err(e);
        }
        Ok(model) => model,
    };
    let interval = Duration::from_secs(
        conf.ttl_cleanup_interval
            .unwrap_or(config::DEF_TTL_CLEANUP_INTERVAL),
    );
    let sweeper = Sweeper::spawn(model.clone(), interval);
    let timeout = conf.request_timeout.map(Duration::from_millis);
    Ok((TokenStore::new(model, timeout), sweeper))
}
