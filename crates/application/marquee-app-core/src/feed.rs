use std::sync::{Arc, Mutex};

use marquee_core::Title;
use tokio::sync::mpsc;

use crate::ports::TitleStorePort;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

struct Subscriber {
    id: SubscriptionId,
    tx: mpsc::UnboundedSender<Option<String>>,
}

struct FeedInner {
    current: Option<String>,
    next_id: u64,
    subscribers: Vec<Subscriber>,
}

/// In-process publish/subscribe channel for the current title. A new
/// subscriber receives the current value immediately, then every
/// subsequent published value in emission order.
#[derive(Clone)]
pub struct TitleFeed {
    inner: Arc<Mutex<FeedInner>>,
}

impl TitleFeed {
    pub fn new(current: Option<String>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(FeedInner {
                current,
                next_id: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    pub fn publish(&self, value: Option<String>) {
        let mut inner = self.inner.lock().unwrap();
        inner.current = value.clone();
        inner
            .subscribers
            .retain(|s| s.tx.send(value.clone()).is_ok());
    }

    pub fn subscribe(&self) -> TitleSubscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.inner.lock().unwrap();
        let id = SubscriptionId(inner.next_id);
        inner.next_id += 1;
        // Current value first, before any later emission.
        let _ = tx.send(inner.current.clone());
        inner.subscribers.push(Subscriber { id, tx });
        TitleSubscription { id, rx }
    }

    /// Idempotent: unsubscribing an unknown or already-removed id is a
    /// no-op.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        let mut inner = self.inner.lock().unwrap();
        inner.subscribers.retain(|s| s.id != id);
    }

    pub fn current(&self) -> Option<String> {
        self.inner.lock().unwrap().current.clone()
    }
}

pub struct TitleSubscription {
    id: SubscriptionId,
    rx: mpsc::UnboundedReceiver<Option<String>>,
}

impl TitleSubscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Next emitted value; `None` once the feed is gone or the
    /// subscription was removed.
    pub async fn recv(&mut self) -> Option<Option<String>> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<Option<String>> {
        self.rx.try_recv().ok()
    }
}

/// Store decorator that publishes to a `TitleFeed` after every successful
/// upsert, turning any blocking store into the push-based Local Store
/// Port.
pub struct WatchedTitleStore<S> {
    inner: Arc<S>,
    feed: TitleFeed,
}

impl<S: TitleStorePort> WatchedTitleStore<S> {
    pub fn new(inner: Arc<S>) -> anyhow::Result<Self> {
        let current = inner.load()?;
        Ok(Self {
            inner,
            feed: TitleFeed::new(current),
        })
    }

    pub fn feed(&self) -> TitleFeed {
        self.feed.clone()
    }
}

impl<S: TitleStorePort> TitleStorePort for WatchedTitleStore<S> {
    fn load(&self) -> anyhow::Result<Option<String>> {
        self.inner.load()
    }

    fn upsert(&self, title: &Title) -> anyhow::Result<()> {
        self.inner.upsert(title)?;
        // Only reached on success: a failed write must not emit.
        self.feed.publish(Some(title.as_str().to_string()));
        Ok(())
    }
}
