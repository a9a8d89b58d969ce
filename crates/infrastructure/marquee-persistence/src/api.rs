use camino::Utf8Path;
use marquee_core::TitleRecord;

pub const MARQUEE_REDB_FILENAME: &str = "marquee.redb";
pub const CURRENT_SCHEMA: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbState {
    Missing,
    Valid,
    Busy,
    Corrupt,
    NewerSchema { found: u32, supported: u32 },
}

/// Durable store for the single current-title record.
///
/// `upsert_title` has replace-on-conflict semantics against one fixed key:
/// each successful call leaves exactly one record behind, and a write is
/// all-or-nothing (one committed transaction).
pub trait TitleStore: Send + Sync {
    fn validate(&self, root: &Utf8Path) -> Result<DbState, crate::StorageError>;

    /// Returns the current record, or `None` when nothing has been
    /// persisted yet (a missing database file is not an error).
    fn load_title(&self, root: &Utf8Path) -> Result<Option<TitleRecord>, crate::StorageError>;

    fn upsert_title(&self, root: &Utf8Path, record: &TitleRecord)
        -> Result<(), crate::StorageError>;
}
