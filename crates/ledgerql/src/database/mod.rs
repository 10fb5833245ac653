//! The gateway façade.
//!
//! `Database` is what applications hold: it substitutes positional
//! parameters, parses the query, lazily loads every table the statement
//! references, runs the executor, persists the mutated table, and then
//! notifies mutation listeners. Construct one per process at startup
//! and pass it to whatever needs it; there is deliberately no global
//! instance.

use std::path::PathBuf;

use tracing::{debug, info};

use crate::error::{LedgerError, LedgerResult};
use crate::events::{EventDispatcher, MutationEvent, MutationKind};
use crate::executor::{self, MutationResult, Row, Value};
use crate::parser::Statement;
use crate::storage::{BlobStore, DirBlobStore, MemoryBlobStore, RowStore};

/// Database configuration.
#[derive(Debug, Clone, Default)]
pub struct DatabaseConfig {
    /// Directory for table blobs (`None` for in-memory).
    pub data_dir: Option<PathBuf>,
}

impl DatabaseConfig {
    /// Creates an in-memory configuration.
    pub fn in_memory() -> Self {
        Self { data_dir: None }
    }

    /// Creates a configuration persisting blobs under `path`.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: Some(path.into()),
        }
    }
}

/// The gateway consumed by applications.
#[derive(Debug)]
pub struct Database {
    store: RowStore,
    events: EventDispatcher,
}

impl Database {
    /// Opens a database with the given configuration.
    pub fn open(config: DatabaseConfig) -> LedgerResult<Self> {
        let blobs: Box<dyn BlobStore> = match &config.data_dir {
            Some(dir) => {
                info!(dir = %dir.display(), "opening directory-backed database");
                Box::new(DirBlobStore::open(dir)?)
            }
            None => {
                info!("opening in-memory database");
                Box::new(MemoryBlobStore::new())
            }
        };
        Ok(Self {
            store: RowStore::new(blobs),
            events: EventDispatcher::new(),
        })
    }

    /// The mutation-event dispatcher, for registering listeners.
    pub fn events_mut(&mut self) -> &mut EventDispatcher {
        &mut self.events
    }

    /// Names of the tables loaded so far, sorted.
    pub fn tables(&self) -> Vec<&str> {
        self.store.loaded_tables()
    }

    /// The tables a query would touch: one name for writes, one or two
    /// for reads. Parameters are irrelevant to table resolution, so `?`
    /// placeholders may remain in `query`.
    pub fn tables_referenced_by(&self, query: &str) -> LedgerResult<Vec<String>> {
        let stmt = Statement::parse(query)?;
        Ok(stmt.tables().into_iter().map(str::to_string).collect())
    }

    /// Executes a read query and returns the projected rows.
    pub fn read(&mut self, query: &str, params: &[Value]) -> LedgerResult<Vec<Row>> {
        let stmt = self.prepare(query, params)?;
        match &stmt {
            Statement::Select(select) => executor::select(select, &self.store),
            _ => Err(LedgerError::malformed(
                "read expects a select query; use write for mutations",
            )),
        }
    }

    /// Executes a write query, persists the mutated table, and notifies
    /// listeners. On error the table is left exactly as it was.
    pub fn write(&mut self, query: &str, params: &[Value]) -> LedgerResult<MutationResult> {
        let stmt = self.prepare(query, params)?;
        if stmt.is_read() {
            return Err(LedgerError::malformed(
                "write expects an insert, update, or delete query; use read for selects",
            ));
        }

        let table = stmt.tables()[0].to_string();
        let result = executor::mutate(&stmt, &mut self.store)?;
        self.store.persist(&table)?;

        let kind = match result {
            MutationResult::Inserted { .. } => MutationKind::Insert,
            MutationResult::Updated { .. } => MutationKind::Update,
            MutationResult::Deleted { .. } => MutationKind::Delete,
        };
        self.events.emit(&MutationEvent {
            table,
            kind,
            affected: result.affected(),
        });
        Ok(result)
    }

    /// Restores a table from a serialized payload, persisting it, but
    /// only when the table is currently empty. Returns whether the
    /// payload was applied. Intended for seeding demo or fixture data.
    pub fn seed_table(&mut self, table: &str, payload: &str) -> LedgerResult<bool> {
        self.store.ensure_loaded(table)?;
        if self.store.rows_of(table).next().is_some() {
            return Ok(false);
        }
        let rows = serde_json::from_str(payload).map_err(|source| LedgerError::Codec {
            table: table.to_string(),
            source,
        })?;
        self.store.install_rows(table, rows);
        self.store.persist(table)?;
        info!(table, "table seeded");
        Ok(true)
    }

    /// Substitutes parameters, parses, and lazily loads every table the
    /// statement references.
    fn prepare(&mut self, query: &str, params: &[Value]) -> LedgerResult<Statement> {
        let query = substitute(query, params)?;
        debug!(query = %query, "prepared query");
        let stmt = Statement::parse(&query)?;
        for table in stmt.tables() {
            self.store.ensure_loaded(table)?;
        }
        Ok(stmt)
    }
}

/// Replaces each `?` with the next parameter, textually and in
/// occurrence order. The substitution is not bound or escaped — this is
/// the documented trust boundary of the wire grammar, so callers must
/// not pass untrusted strings containing clause keywords.
fn substitute(query: &str, params: &[Value]) -> LedgerResult<String> {
    let mut out = String::with_capacity(query.len());
    let mut next = params.iter();
    for c in query.chars() {
        if c == '?' {
            let value = next.next().ok_or_else(|| {
                LedgerError::malformed("more `?` placeholders than parameters")
            })?;
            out.push_str(&value.to_string());
        } else {
            out.push(c);
        }
    }
    Ok(out)
}
