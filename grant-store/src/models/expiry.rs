//! Background expiry sweep.
//!
//! Expiry is eventual: the sweep deletes documents whose expiry instant has passed every
//! interval. MongoDB also removes them on its own through the TTL index, running both is
//! harmless because deleting a missing document is a no-op.

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use log::{debug, error, info};
use tokio::{task::JoinHandle, time};
use tokio_util::sync::CancellationToken;

use super::{Error, Model, token::IndexKind};

/// Handle of the sweep task.
pub struct Sweeper {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl Sweeper {
    /// To spawn the sweep task. The first pass runs after one interval. A zero interval gives a
    /// [`disabled()`](Self::disabled) sweeper.
    ///
    /// Must be called inside a tokio runtime.
    pub fn spawn(model: Arc<dyn Model>, interval: Duration) -> Self {
        const FN_NAME: &'static str = "spawn";

        if interval.is_zero() {
            return Sweeper::disabled();
        }

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = time::interval_at(time::Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        // Errors are logged per collection.
                        let _ = sweep(model.as_ref()).await;
                    }
                }
            }
            info!("[{}] sweeper stopped", FN_NAME);
        });
        Sweeper {
            cancel,
            handle: Some(handle),
        }
    }

    /// A sweeper that does nothing. Used when the cleanup interval is disabled.
    pub fn disabled() -> Self {
        Sweeper {
            cancel: CancellationToken::new(),
            handle: None,
        }
    }

    /// Returns `true` if the sweep task is running.
    pub fn is_running(&self) -> bool {
        match self.handle.as_ref() {
            None => false,
            Some(handle) => !handle.is_finished(),
        }
    }

    /// To stop the sweep task and wait for it.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// To run one sweep pass on all collections. Returns the number of deleted documents.
///
/// All collections are visited even if one fails; the first error is returned.
pub async fn sweep(model: &dyn Model) -> Result<u64, Error> {
    const FN_NAME: &'static str = "sweep";

    let now = Utc::now();
    let mut total = 0;
    let mut first_err = None;
    for kind in IndexKind::ALL {
        let index = model.index(kind);
        match index.purge(&now).await {
            Err(e) => {
                error!("[{}] purge {} error: {}", FN_NAME, index.name(), e);
                if first_err.is_none() {
                    first_err = Some(e);
                }
            }
            Ok(count) => {
                if count > 0 {
                    debug!("[{}] purged {} from {}", FN_NAME, count, index.name());
                }
                total += count;
            }
        }
    }
    match first_err {
        None => Ok(total),
        Some(e) => Err(e),
    }
}
