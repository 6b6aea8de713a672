use std::path::{Path, PathBuf};

use redb::{
    Database,
    DatabaseError,
    ReadableDatabase,
    StorageError,
    TableDefinition,
};
use serde::{Serialize, de::DeserializeOwned};

use crate::error::{Error, Result};

const SLOTS: TableDefinition<&str, &[u8]> = TableDefinition::new("slots");

/// Independent entries of the cache container.
///
/// Each slot is written and invalidated on its own; a missing or broken
/// slot never affects the other one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSlot {
    TagCache,
    ShaderIndex,
}

impl CacheSlot {
    pub fn key(self) -> &'static str {
        match self {
            CacheSlot::TagCache => "tag_cache",
            CacheSlot::ShaderIndex => "shader_index",
        }
    }
}

/// Best-effort persistent cache for the tag mapping and the shader index.
///
/// Nothing here is fatal. A corrupt container is discarded and recreated;
/// a container that is locked by another process or otherwise unavailable
/// is left alone and the store keeps working without persistence. Slots
/// that cannot be decoded read as absent.
pub struct CacheStore {
    db: Option<Database>,
    path: PathBuf,
}

impl CacheStore {
    pub fn open(path: &Path) -> Self {
        let db = match open_db(path) {
            Ok(db) => Some(db),
            Err(e) if !is_corruption(&e) => {
                tracing::warn!(
                    "cache at {} is not available ({e}); \
                     continuing without one",
                    path.display()
                );
                None
            }
            Err(e) => {
                tracing::warn!(
                    "cache at {} is corrupt ({e}), recreating it",
                    path.display()
                );
                let _ = std::fs::remove_file(path);
                match open_db(path) {
                    Ok(db) => Some(db),
                    Err(e) => {
                        tracing::warn!(
                            "could not create cache at {}: {e}; \
                             continuing without one",
                            path.display()
                        );
                        None
                    }
                }
            }
        };

        Self {
            db,
            path: path.to_path_buf(),
        }
    }

    /// A store that never persists anything.
    pub fn disabled() -> Self {
        Self {
            db: None,
            path: PathBuf::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_persistent(&self) -> bool {
        self.db.is_some()
    }

    /// Decode a slot, treating every failure as a cache miss.
    pub fn load<T: DeserializeOwned>(&self, slot: CacheSlot) -> Option<T> {
        let bytes = match self.read_slot(slot) {
            Ok(bytes) => bytes?,
            Err(e) => {
                tracing::warn!("could not read cache slot {}: {e}", slot.key());
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!(
                    "discarding undecodable cache slot {}: {e}",
                    slot.key()
                );
                None
            }
        }
    }

    /// Replace a slot's content. Succeeds trivially on a disabled store.
    pub fn store<T: Serialize>(&self, slot: CacheSlot, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec(value)?;
        self.write_slot(slot, &bytes)
    }

    pub fn contains(&self, slot: CacheSlot) -> bool {
        matches!(self.read_slot(slot), Ok(Some(_)))
    }

    /// Drop a slot. Returns whether it was present.
    pub fn clear(&self, slot: CacheSlot) -> Result<bool> {
        let Some(db) = &self.db else {
            return Ok(false);
        };
        let txn = db.begin_write()?;
        let removed = {
            let mut table = txn.open_table(SLOTS)?;
            table.remove(slot.key())?.is_some()
        };
        txn.commit()?;
        Ok(removed)
    }

    fn read_slot(&self, slot: CacheSlot) -> Result<Option<Vec<u8>>> {
        let Some(db) = &self.db else {
            return Ok(None);
        };
        let txn = db.begin_read()?;
        let table = txn.open_table(SLOTS)?;
        Ok(table.get(slot.key())?.map(|v| v.value().to_vec()))
    }

    fn write_slot(&self, slot: CacheSlot, bytes: &[u8]) -> Result<()> {
        let Some(db) = &self.db else {
            return Ok(());
        };
        let txn = db.begin_write()?;
        {
            let mut table = txn.open_table(SLOTS)?;
            table.insert(slot.key(), bytes)?;
        }
        txn.commit()?;
        Ok(())
    }
}

fn open_db(path: &Path) -> Result<Database> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let db = Database::create(path)?;

    let txn = db.begin_write()?;
    txn.open_table(SLOTS)?;
    txn.commit()?;

    Ok(db)
}

/// Whether an open failure means the file itself is bad. Locks and
/// environmental I/O failures never qualify.
fn is_corruption(error: &Error) -> bool {
    match error {
        Error::RedbDatabase(DatabaseError::DatabaseAlreadyOpen) => false,
        Error::RedbDatabase(DatabaseError::Storage(StorageError::Io(e)))
        | Error::RedbStorage(StorageError::Io(e))
        | Error::Io(e) => matches!(
            e.kind(),
            std::io::ErrorKind::UnexpectedEof | std::io::ErrorKind::InvalidData
        ),
        _ => true,
    }
}

impl std::fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore")
            .field("path", &self.path)
            .field("persistent", &self.db.is_some())
            .finish_non_exhaustive()
    }
}
