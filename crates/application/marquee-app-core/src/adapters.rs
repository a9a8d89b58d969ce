use async_trait::async_trait;
use camino::Utf8PathBuf;
use marquee_core::{Title, TitleRecord};
use marquee_infra::TitleEndpoint;
use marquee_persistence::{RedbTitleStore, TitleStore};

use crate::ports::{RemoteTitlePort, TitleStorePort};

#[async_trait]
impl RemoteTitlePort for TitleEndpoint {
    async fn fetch_next_title(&self) -> anyhow::Result<String> {
        Ok(self.next_title().await?)
    }
}

/// Binds the redb store to a concrete data root so the rest of the
/// application never handles paths.
pub struct RedbStoreAdapter {
    store: RedbTitleStore,
    root: Utf8PathBuf,
}

impl RedbStoreAdapter {
    pub fn new(root: Utf8PathBuf) -> Self {
        Self {
            store: RedbTitleStore::new(),
            root,
        }
    }
}

impl TitleStorePort for RedbStoreAdapter {
    fn load(&self) -> anyhow::Result<Option<String>> {
        Ok(self.store.load_title(&self.root)?.map(|rec| rec.text))
    }

    fn upsert(&self, title: &Title) -> anyhow::Result<()> {
        let record = TitleRecord::new(title.clone());
        self.store.upsert_title(&self.root, &record)?;
        Ok(())
    }
}
