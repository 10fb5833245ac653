//! The in-memory row store.
//!
//! Tables enter the store lazily: the first query that references a
//! table pulls its blob (or starts it empty) and it stays resident for
//! the process lifetime. Each table keeps a monotonic key counter,
//! seeded from the highest key present at load time; the counter never
//! decreases and never reissues a key, so deleted ids stay retired.
//!
//! The store is process-local state for a single logical caller. If it
//! were ever shared between writers it would need a single-writer queue
//! or per-row version stamps; neither exists here and the `&mut self`
//! mutation methods make that boundary explicit.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::error::{LedgerError, LedgerResult};
use crate::executor::Row;

use super::blob::BlobStore;

/// One table: rows keyed by primary key, plus the key counter.
#[derive(Debug, Default)]
struct Table {
    /// Ascending key order doubles as insertion order, because keys are
    /// monotonic and never reused.
    rows: BTreeMap<u64, Row>,
    next_key: u64,
}

impl Table {
    fn from_rows(rows: BTreeMap<u64, Row>) -> Self {
        let next_key = rows.keys().next_back().copied().unwrap_or(0);
        Self { rows, next_key }
    }
}

/// All resident tables, backed by a blob store.
#[derive(Debug)]
pub struct RowStore {
    tables: HashMap<String, Table>,
    blobs: Box<dyn BlobStore>,
}

impl RowStore {
    /// Creates a row store over the given blob store.
    pub fn new(blobs: Box<dyn BlobStore>) -> Self {
        Self {
            tables: HashMap::new(),
            blobs,
        }
    }

    /// Loads a table from the blob store if it is not already resident.
    /// An absent blob reads as an empty table.
    pub fn ensure_loaded(&mut self, table: &str) -> LedgerResult<()> {
        if self.tables.contains_key(table) {
            return Ok(());
        }
        let rows: BTreeMap<u64, Row> = match self.blobs.load(table)? {
            Some(payload) => {
                serde_json::from_str(&payload).map_err(|source| LedgerError::Codec {
                    table: table.to_string(),
                    source,
                })?
            }
            None => BTreeMap::new(),
        };
        debug!(table, rows = rows.len(), "table loaded");
        self.tables.insert(table.to_string(), Table::from_rows(rows));
        Ok(())
    }

    /// Returns true if the table is resident.
    pub fn is_loaded(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    /// Names of the resident tables, sorted.
    pub fn loaded_tables(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Iterates a table's rows in key order. An unloaded table iterates
    /// as empty.
    pub fn rows_of<'a>(&'a self, table: &str) -> impl Iterator<Item = (u64, &'a Row)> {
        self.tables
            .get(table)
            .into_iter()
            .flat_map(|t| t.rows.iter().map(|(key, row)| (*key, row)))
    }

    /// Claims the next primary key for a table.
    pub fn reserve_key(&mut self, table: &str) -> u64 {
        let table = self.tables.entry(table.to_string()).or_default();
        table.next_key += 1;
        table.next_key
    }

    /// Inserts a row under the given key.
    ///
    /// The auto-assigned path never collides; the duplicate guard is
    /// what a future custom-key path will hit.
    pub fn insert_row(&mut self, table: &str, key: u64, row: Row) -> LedgerResult<()> {
        let entry = self.tables.entry(table.to_string()).or_default();
        if entry.rows.contains_key(&key) {
            return Err(LedgerError::DuplicateKey {
                table: table.to_string(),
                key,
            });
        }
        if key > entry.next_key {
            entry.next_key = key;
        }
        entry.rows.insert(key, row);
        Ok(())
    }

    /// Mutable access to a row.
    pub fn row_mut(&mut self, table: &str, key: u64) -> Option<&mut Row> {
        self.tables.get_mut(table)?.rows.get_mut(&key)
    }

    /// Removes a row. The key stays retired.
    pub fn remove_row(&mut self, table: &str, key: u64) -> Option<Row> {
        self.tables.get_mut(table)?.rows.remove(&key)
    }

    /// Replaces a table's rows wholesale, reseeding the key counter.
    /// Used to restore a table from an externally supplied payload.
    pub fn install_rows(&mut self, table: &str, rows: BTreeMap<u64, Row>) {
        self.tables.insert(table.to_string(), Table::from_rows(rows));
    }

    /// Serializes a table to its blob form. An unloaded table
    /// serializes as empty.
    pub fn serialize_table(&self, table: &str) -> LedgerResult<String> {
        let empty = BTreeMap::new();
        let rows = self.tables.get(table).map(|t| &t.rows).unwrap_or(&empty);
        serde_json::to_string(rows).map_err(|source| LedgerError::Codec {
            table: table.to_string(),
            source,
        })
    }

    /// Writes a table's current state back to the blob store, whole.
    pub fn persist(&mut self, table: &str) -> LedgerResult<()> {
        let payload = self.serialize_table(table)?;
        self.blobs.save(table, &payload)?;
        debug!(table, bytes = payload.len(), "table persisted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::Value;
    use crate::storage::MemoryBlobStore;

    fn row(id: i64, balance: f64) -> Row {
        let mut row = Row::new();
        row.set("id", Value::Int(id));
        row.set("balance", Value::Float(balance));
        row
    }

    #[test]
    fn test_absent_blob_is_empty_table() {
        let mut store = RowStore::new(Box::new(MemoryBlobStore::new()));
        store.ensure_loaded("accounts").unwrap();
        assert!(store.is_loaded("accounts"));
        assert_eq!(store.rows_of("accounts").count(), 0);
    }

    #[test]
    fn test_counter_seeded_from_max_key() {
        let mut blobs = MemoryBlobStore::new();
        blobs
            .save(
                "accounts",
                r#"{"1001":{"id":1001},"1005":{"id":1005}}"#,
            )
            .unwrap();
        let mut store = RowStore::new(Box::new(blobs));
        store.ensure_loaded("accounts").unwrap();
        assert_eq!(store.reserve_key("accounts"), 1006);
        assert_eq!(store.reserve_key("accounts"), 1007);
    }

    #[test]
    fn test_counter_survives_delete() {
        let mut store = RowStore::new(Box::new(MemoryBlobStore::new()));
        store.ensure_loaded("t").unwrap();
        let key = store.reserve_key("t");
        store.insert_row("t", key, row(key as i64, 1.0)).unwrap();
        store.remove_row("t", key);
        assert_eq!(store.reserve_key("t"), 2);
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let mut store = RowStore::new(Box::new(MemoryBlobStore::new()));
        store.ensure_loaded("t").unwrap();
        store.insert_row("t", 5, row(5, 1.0)).unwrap();
        let result = store.insert_row("t", 5, row(5, 2.0));
        assert!(matches!(
            result,
            Err(LedgerError::DuplicateKey { key: 5, .. })
        ));
    }

    #[test]
    fn test_explicit_key_bumps_counter() {
        let mut store = RowStore::new(Box::new(MemoryBlobStore::new()));
        store.ensure_loaded("t").unwrap();
        store.insert_row("t", 100, row(100, 1.0)).unwrap();
        assert_eq!(store.reserve_key("t"), 101);
    }

    #[test]
    fn test_persist_round_trip() {
        let mut store = RowStore::new(Box::new(MemoryBlobStore::new()));
        store.ensure_loaded("accounts").unwrap();
        let key = store.reserve_key("accounts");
        store
            .insert_row("accounts", key, row(key as i64, 500.5))
            .unwrap();
        store.persist("accounts").unwrap();

        let payload = store.serialize_table("accounts").unwrap();
        assert_eq!(payload, r#"{"1":{"balance":500.5,"id":1}}"#);
    }

    #[test]
    fn test_corrupt_blob_is_a_codec_error() {
        let mut blobs = MemoryBlobStore::new();
        blobs.save("t", "not json").unwrap();
        let mut store = RowStore::new(Box::new(blobs));
        let result = store.ensure_loaded("t");
        assert!(matches!(result, Err(LedgerError::Codec { .. })));
    }

    #[test]
    fn test_install_rows_reseeds_counter() {
        let mut store = RowStore::new(Box::new(MemoryBlobStore::new()));
        let mut rows = BTreeMap::new();
        rows.insert(1001, row(1001, 500.5));
        store.install_rows("accounts", rows);
        assert_eq!(store.reserve_key("accounts"), 1002);
    }
}
