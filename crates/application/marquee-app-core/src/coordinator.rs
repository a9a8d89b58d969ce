use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use marquee_core::RefreshOutcome;

use crate::app_core::{AppCommand, AppStore, AttemptId, DomainEvent};
use crate::feed::TitleFeed;
use crate::orchestrator::RefreshOrchestrator;
use crate::ports::{RemoteTitlePort, TitleStorePort};

/// Presentation coordinator: owns the UI state store and one cancellable
/// scope bound to the hosting UI's lifetime. Every unit of work it
/// launches holds a child token of that scope; `shutdown` cancels them
/// all, after which no further state changes are published.
pub struct Coordinator<R, S> {
    pub store: AppStore,
    orchestrator: Arc<RefreshOrchestrator<R, S>>,
    scope: CancellationToken,
    handle: Handle,

    tx: mpsc::Sender<DomainEvent>,
    rx: mpsc::Receiver<DomainEvent>,
}

impl<R, S> Coordinator<R, S>
where
    R: RemoteTitlePort,
    S: TitleStorePort,
{
    pub fn new(orchestrator: RefreshOrchestrator<R, S>, feed: TitleFeed, handle: Handle) -> Self {
        let (tx, rx) = mpsc::channel(marquee_config::EVENT_CHANNEL_CAPACITY);
        let scope = CancellationToken::new();

        // Pump store emissions into the event channel so `title_text`
        // always re-derives from the durable store.
        {
            let tx = tx.clone();
            let scope = scope.clone();
            let mut sub = feed.subscribe();
            handle.spawn(async move {
                loop {
                    tokio::select! {
                        _ = scope.cancelled() => break,
                        value = sub.recv() => match value {
                            Some(value) => {
                                if tx.send(DomainEvent::TitleChanged(value)).await.is_err() {
                                    break;
                                }
                            }
                            None => break,
                        },
                    }
                }
            });
        }

        Self {
            store: AppStore::default(),
            orchestrator: Arc::new(orchestrator),
            scope,
            handle,
            tx,
            rx,
        }
    }

    /// Builds a coordinator whose workers run on the shared background
    /// runtime, for hosts that are not async themselves.
    pub fn with_background_runtime(
        orchestrator: RefreshOrchestrator<R, S>,
        feed: TitleFeed,
    ) -> anyhow::Result<Self> {
        let handle = crate::async_runtime::runtime()?.handle().clone();
        Ok(Self::new(orchestrator, feed, handle))
    }

    pub fn dispatch(&self, cmd: AppCommand) {
        match cmd {
            AppCommand::UserAction => self.on_user_action(),
            AppCommand::AcknowledgeError => self.acknowledge_error(),
        }
    }

    /// One user interaction triggers two independent units of work: the
    /// deferred tap-count display update and a refresh attempt. Neither
    /// blocks or cancels the other.
    pub fn on_user_action(&self) {
        if self.scope.is_cancelled() {
            return;
        }

        self.spawn_tap_update();
        self.spawn_refresh();
    }

    fn spawn_tap_update(&self) {
        // Count immediately; display later. The count is captured at
        // trigger time, so rapid taps queue updates that each show their
        // own snapshot.
        self.store.apply(DomainEvent::TapRecorded);
        let count = self.store.state().tap_count;

        let tx = self.tx.clone();
        let cancel = self.scope.child_token();
        self.handle.spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(marquee_config::TAP_DISPLAY_DELAY) => {
                    let _ = tx
                        .send(DomainEvent::TapDisplayReady {
                            label: format!("{count} taps"),
                        })
                        .await;
                }
            }
        });
    }

    fn spawn_refresh(&self) {
        let attempt: AttemptId = uuid::Uuid::new_v4();
        let tx = self.tx.clone();
        let orchestrator = self.orchestrator.clone();
        let cancel = self.scope.child_token();

        self.handle.spawn(async move {
            let _ = tx.send(DomainEvent::RefreshStarted { attempt }).await;

            let outcome = orchestrator
                .refresh_with_deadline(&cancel, marquee_config::DEFAULT_REFRESH_TIMEOUT)
                .await;

            let ev = match outcome {
                RefreshOutcome::Success => DomainEvent::RefreshSucceeded { attempt },
                RefreshOutcome::Failure(err) if err.is_cancelled() => {
                    DomainEvent::RefreshCancelled { attempt }
                }
                RefreshOutcome::Failure(err) => {
                    warn!(error = %err, "refresh attempt failed");
                    DomainEvent::RefreshFailed {
                        attempt,
                        message: err.message().to_string(),
                    }
                }
            };
            let _ = tx.send(ev).await;
        });
    }

    /// Clears the pending one-shot error. Safe to call repeatedly.
    pub fn acknowledge_error(&self) {
        let _ = self.store.consume_error();
    }

    /// Call from the UI loop to fold worker events into the state store.
    /// After shutdown events are drained but discarded, so a dead scope
    /// never publishes state changes.
    pub fn tick(&mut self) {
        while let Ok(ev) = self.rx.try_recv() {
            if self.scope.is_cancelled() {
                continue;
            }
            self.store.apply(ev);
        }
    }

    /// Cancels the scope. All outstanding units of work stop at their
    /// next suspension point; repeated calls are harmless.
    pub fn shutdown(&self) {
        self.scope.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.scope.is_cancelled()
    }
}

impl<R, S> Drop for Coordinator<R, S> {
    fn drop(&mut self) {
        self.scope.cancel();
    }
}
