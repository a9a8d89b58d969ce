use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use marquee_core::{RefreshError, RefreshOutcome, Title};

use crate::ports::{RemoteTitlePort, TitleStorePort};

/// Coordinates one refresh: fetch, validate, persist. The caller awaits a
/// single `RefreshOutcome`; all blocking work happens off the caller's
/// execution context, and cancellation is honored cooperatively at each
/// suspension point.
pub struct RefreshOrchestrator<R, S> {
    remote: Arc<R>,
    store: Arc<S>,
}

impl<R, S> RefreshOrchestrator<R, S>
where
    R: RemoteTitlePort,
    S: TitleStorePort,
{
    pub fn new(remote: Arc<R>, store: Arc<S>) -> Self {
        Self { remote, store }
    }

    /// One orchestration attempt. Either the store ends up holding the
    /// fetched title (`Success`) or it is untouched (`Failure`); a
    /// cancelled attempt resolves to a `Failure` whose kind is
    /// `Cancelled`.
    pub async fn refresh(&self, cancel: &CancellationToken) -> RefreshOutcome {
        self.refresh_inner(cancel, None).await
    }

    /// Like `refresh`, but bounds the remote fetch with a time budget.
    /// The budget does not cover the local write: once the persist step
    /// has started it commits atomically or fails on its own terms.
    pub async fn refresh_with_deadline(
        &self,
        cancel: &CancellationToken,
        budget: Duration,
    ) -> RefreshOutcome {
        self.refresh_inner(cancel, Some(budget)).await
    }

    async fn refresh_inner(
        &self,
        cancel: &CancellationToken,
        budget: Option<Duration>,
    ) -> RefreshOutcome {
        let fetched = tokio::select! {
            _ = cancel.cancelled() => {
                debug!("refresh cancelled while fetching");
                return RefreshOutcome::Failure(RefreshError::cancelled());
            }
            res = Self::fetch_bounded(&self.remote, budget) => res,
        };

        let raw = match fetched {
            Ok(raw) => raw,
            Err(err) => {
                warn!(error = %err, "title fetch failed");
                return RefreshOutcome::Failure(err);
            }
        };

        let title = match Title::parse(&raw) {
            Ok(title) => title,
            Err(err) => {
                warn!(error = %err, "fetched title rejected");
                return RefreshOutcome::Failure(err);
            }
        };

        // Last cooperative checkpoint: never start the write once
        // cancellation has been observed.
        if cancel.is_cancelled() {
            debug!("refresh cancelled before persist");
            return RefreshOutcome::Failure(RefreshError::cancelled());
        }

        let store = self.store.clone();
        let write = tokio::task::spawn_blocking(move || store.upsert(&title));
        match write.await {
            Ok(Ok(())) => RefreshOutcome::Success,
            Ok(Err(err)) => {
                warn!(error = %err, "title persist failed");
                RefreshOutcome::Failure(RefreshError::storage(err))
            }
            Err(join_err) => {
                warn!(error = %join_err, "persist worker died");
                RefreshOutcome::Failure(RefreshError::storage(join_err))
            }
        }
    }

    async fn fetch_bounded(remote: &Arc<R>, budget: Option<Duration>) -> Result<String, RefreshError> {
        match budget {
            Some(budget) => match tokio::time::timeout(budget, remote.fetch_next_title()).await {
                Ok(res) => res.map_err(RefreshError::remote),
                Err(_) => Err(RefreshError::timed_out()),
            },
            None => remote.fetch_next_title().await.map_err(RefreshError::remote),
        }
    }
}
