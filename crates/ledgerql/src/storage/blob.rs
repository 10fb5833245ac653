//! The blob-store contract.
//!
//! A blob store maps table names to serialized table payloads. It is
//! the engine's only persistence surface: `load` on first table touch,
//! `save` with the whole re-serialized table after each mutation. An
//! absent blob is not an error; it reads as an empty table.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::error::LedgerResult;

/// Key→string persistence for table blobs.
pub trait BlobStore: fmt::Debug {
    /// Loads the blob for a table, or `None` if it was never saved.
    fn load(&self, table: &str) -> LedgerResult<Option<String>>;

    /// Saves the blob for a table, replacing any previous payload.
    fn save(&mut self, table: &str, payload: &str) -> LedgerResult<()>;
}

/// In-memory blob store. Contents die with the process.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: HashMap<String, String>,
}

impl MemoryBlobStore {
    /// Creates an empty in-memory blob store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryBlobStore {
    fn load(&self, table: &str) -> LedgerResult<Option<String>> {
        Ok(self.blobs.get(table).cloned())
    }

    fn save(&mut self, table: &str, payload: &str) -> LedgerResult<()> {
        self.blobs.insert(table.to_string(), payload.to_string());
        Ok(())
    }
}

/// Directory-backed blob store: one `<table>.json` file per table.
#[derive(Debug)]
pub struct DirBlobStore {
    dir: PathBuf,
}

impl DirBlobStore {
    /// Opens a blob store rooted at `dir`, creating the directory if
    /// needed.
    pub fn open(dir: impl Into<PathBuf>) -> LedgerResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, table: &str) -> PathBuf {
        self.dir.join(format!("{}.json", table))
    }
}

impl BlobStore for DirBlobStore {
    fn load(&self, table: &str) -> LedgerResult<Option<String>> {
        match fs::read_to_string(self.path_for(table)) {
            Ok(payload) => Ok(Some(payload)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, table: &str, payload: &str) -> LedgerResult<()> {
        fs::write(self.path_for(table), payload)?;
        Ok(())
    }
}
