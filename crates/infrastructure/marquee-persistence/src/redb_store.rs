use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use camino::{Utf8Path, Utf8PathBuf};
use chrono::Utc;
use marquee_core::{TitleRecord, CURRENT_TITLE_KEY};
use redb::{Database, ReadableTable, TableDefinition};

use crate::api::{DbState, CURRENT_SCHEMA, MARQUEE_REDB_FILENAME};
use crate::codec::{decode_record, encode_record};
use crate::maintenance::quarantine_corrupt_file;
use crate::{StorageError, TitleStore};

const META: TableDefinition<&str, &str> = TableDefinition::new("meta");
const TITLE: TableDefinition<&str, &[u8]> = TableDefinition::new("title");

const META_FORMAT_KEY: &str = "format";
const META_FORMAT_VALUE: &str = "marquee-redb";
const META_SCHEMA_VERSION: &str = "schema_version";
const META_CREATED_AT: &str = "created_at";

#[derive(Debug, Default, Clone)]
pub struct RedbTitleStore;

impl RedbTitleStore {
    pub fn new() -> Self {
        Self
    }

    pub fn path_for_root(root: &Utf8Path) -> Utf8PathBuf {
        root.join(MARQUEE_REDB_FILENAME)
    }

    fn is_corrupt_open_error(err: &redb::DatabaseError) -> bool {
        match err {
            redb::DatabaseError::Storage(storage) => match storage {
                redb::StorageError::Corrupted(_) => true,
                redb::StorageError::Io(ioe) => matches!(
                    ioe.kind(),
                    std::io::ErrorKind::InvalidData | std::io::ErrorKind::UnexpectedEof
                ),
                _ => false,
            },
            _ => false,
        }
    }

    // redb refuses a second open of the same file within one process, so
    // handles are shared through a process-wide cache keyed by path.
    fn db_cache() -> &'static Mutex<HashMap<Utf8PathBuf, Arc<Database>>> {
        static CACHE: OnceLock<Mutex<HashMap<Utf8PathBuf, Arc<Database>>>> = OnceLock::new();
        CACHE.get_or_init(|| Mutex::new(HashMap::new()))
    }

    fn open_or_create(&self, root: &Utf8Path) -> Result<Arc<Database>, StorageError> {
        let path = Self::path_for_root(root);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut cache = Self::db_cache().lock().expect("db cache lock poisoned");
        if let Some(existing) = cache.get(&path) {
            if !path.exists() {
                cache.remove(&path);
            } else {
                return Ok(existing.clone());
            }
        }

        let db = if path.exists() {
            match Database::open(path.as_std_path()) {
                Ok(db) => db,
                Err(redb::DatabaseError::DatabaseAlreadyOpen) => {
                    return Err(StorageError::DatabaseAlreadyOpen);
                }
                Err(e) if Self::is_corrupt_open_error(&e) => {
                    let _ = quarantine_corrupt_file(&path);
                    return Err(StorageError::Corrupt);
                }
                Err(e) => return Err(e.into()),
            }
        } else {
            Database::create(path.as_std_path())?
        };

        if let Err(e) = self.ensure_schema(&db) {
            drop(db);
            if matches!(e, StorageError::Corrupt) {
                let _ = quarantine_corrupt_file(&path);
            }
            return Err(e);
        }
        let db = Arc::new(db);
        cache.insert(path, db.clone());
        Ok(db)
    }

    fn open_existing(&self, root: &Utf8Path) -> Result<Arc<Database>, StorageError> {
        let path = Self::path_for_root(root);
        if !path.exists() {
            return Err(StorageError::Missing);
        }

        let mut cache = Self::db_cache().lock().expect("db cache lock poisoned");
        if let Some(existing) = cache.get(&path) {
            if !path.exists() {
                cache.remove(&path);
                return Err(StorageError::Missing);
            }
            return Ok(existing.clone());
        }

        let db = match Database::open(path.as_std_path()) {
            Ok(db) => db,
            Err(redb::DatabaseError::DatabaseAlreadyOpen) => {
                return Err(StorageError::DatabaseAlreadyOpen);
            }
            Err(e) if Self::is_corrupt_open_error(&e) => {
                let _ = quarantine_corrupt_file(&path);
                return Err(StorageError::Corrupt);
            }
            Err(e) => return Err(e.into()),
        };

        if let Err(e) = self.ensure_schema(&db) {
            drop(db);
            if matches!(e, StorageError::Corrupt) {
                let _ = quarantine_corrupt_file(&path);
            }
            return Err(e);
        }
        let db = Arc::new(db);
        cache.insert(path, db.clone());
        Ok(db)
    }

    fn ensure_schema(&self, db: &Database) -> Result<(), StorageError> {
        // Create tables and required meta keys on first open.
        let write_tx = db.begin_write()?;
        {
            let mut meta = write_tx.open_table(META)?;
            let format: Option<String> = meta.get(META_FORMAT_KEY)?.map(|g| g.value().to_string());
            if format.is_none() {
                let schema_version = CURRENT_SCHEMA.to_string();
                let created_at = Utc::now().to_rfc3339();
                meta.insert(META_FORMAT_KEY, META_FORMAT_VALUE)?;
                meta.insert(META_SCHEMA_VERSION, schema_version.as_str())?;
                meta.insert(META_CREATED_AT, created_at.as_str())?;
            } else if format.as_deref() != Some(META_FORMAT_VALUE) {
                return Err(StorageError::Corrupt);
            }
        }
        let _ = write_tx.open_table(TITLE)?;
        write_tx.commit()?;

        // Validate schema version.
        let read_tx = db.begin_read()?;
        let meta = read_tx.open_table(META)?;
        let schema_version = meta
            .get(META_SCHEMA_VERSION)?
            .and_then(|g| g.value().parse::<u32>().ok())
            .unwrap_or(0);
        if schema_version == 0 {
            return Err(StorageError::Corrupt);
        }
        if schema_version > CURRENT_SCHEMA {
            return Err(StorageError::NewerSchema {
                found: schema_version,
                supported: CURRENT_SCHEMA,
            });
        }
        if schema_version != CURRENT_SCHEMA {
            return Err(StorageError::Corrupt);
        }
        Ok(())
    }
}

impl TitleStore for RedbTitleStore {
    fn validate(&self, root: &Utf8Path) -> Result<DbState, StorageError> {
        let path = Self::path_for_root(root);
        if !path.exists() {
            return Ok(DbState::Missing);
        }
        {
            let mut cache = Self::db_cache().lock().expect("db cache lock poisoned");
            if cache.contains_key(&path) {
                if !path.exists() {
                    cache.remove(&path);
                    return Ok(DbState::Missing);
                }
                return Ok(DbState::Valid);
            }
        }

        match Database::open(path.as_std_path()) {
            Ok(db) => match self.ensure_schema(&db) {
                Ok(()) => Ok(DbState::Valid),
                Err(StorageError::NewerSchema { found, supported }) => {
                    Ok(DbState::NewerSchema { found, supported })
                }
                Err(StorageError::DatabaseAlreadyOpen) => Ok(DbState::Busy),
                Err(StorageError::Corrupt) => {
                    drop(db);
                    let _ = quarantine_corrupt_file(&path);
                    Ok(DbState::Corrupt)
                }
                Err(e) => Err(e),
            },
            Err(redb::DatabaseError::DatabaseAlreadyOpen) => Ok(DbState::Busy),
            Err(e) if Self::is_corrupt_open_error(&e) => {
                let _ = quarantine_corrupt_file(&path);
                Ok(DbState::Corrupt)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn load_title(&self, root: &Utf8Path) -> Result<Option<TitleRecord>, StorageError> {
        let db = match self.open_existing(root) {
            Ok(db) => db,
            Err(StorageError::Missing) => return Ok(None),
            Err(e) => return Err(e),
        };
        let read_tx = db.begin_read()?;
        let table = read_tx.open_table(TITLE)?;
        match table.get(CURRENT_TITLE_KEY)? {
            Some(guard) => Ok(Some(decode_record(guard.value())?)),
            None => Ok(None),
        }
    }

    fn upsert_title(&self, root: &Utf8Path, record: &TitleRecord) -> Result<(), StorageError> {
        let db = self.open_or_create(root)?;
        let value = encode_record(record)?;
        let write_tx = db.begin_write()?;
        {
            let mut table = write_tx.open_table(TITLE)?;
            table.insert(CURRENT_TITLE_KEY, value.as_slice())?;
        }
        write_tx.commit()?;
        Ok(())
    }
}
