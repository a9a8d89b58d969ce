use async_trait::async_trait;
use marquee_core::Title;

/// Remote side of a refresh: fetch the next title string. Fails on any
/// transport or protocol error.
#[async_trait]
pub trait RemoteTitlePort: Send + Sync + 'static {
    async fn fetch_next_title(&self) -> anyhow::Result<String>;
}

/// Local cache of the single current title. Implementations block; the
/// orchestrator is responsible for keeping them off the async threads.
pub trait TitleStorePort: Send + Sync + 'static {
    fn load(&self) -> anyhow::Result<Option<String>>;

    /// Replace-on-conflict against the fixed key: after a successful call
    /// exactly one record exists, holding `title`.
    fn upsert(&self, title: &Title) -> anyhow::Result<()>;
}
