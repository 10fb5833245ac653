//! # ledgerql
//!
//! A miniature query-language engine over in-memory JSON document tables.
//!
//! Queries are restricted SQL-like strings (`select`/`from`/`join`/`on`/
//! `where` for reads, `insert`/`update`/`delete`/`from`/`set`/`where` for
//! writes). A query is split into clauses, its condition fragments are
//! compiled into an expression tree evaluated once per row, and the
//! `from → join → where → select` pipeline runs against tables that are
//! loaded lazily from a key→string blob store and written back as whole
//! JSON blobs after every mutation.
//!
//! The engine is an in-process library: single-threaded, fully
//! synchronous, with no network surface and no durability guarantees
//! beyond what the blob store provides.
//!
//! # Usage
//!
//! ```
//! use ledgerql::{Database, DatabaseConfig, Value};
//!
//! let mut db = Database::open(DatabaseConfig::in_memory()).unwrap();
//! let key = db
//!     .write(
//!         "insert ?, ? from accounts set accounts.iban, accounts.balance",
//!         &[Value::from("IT60X054281110"), Value::from(250.75)],
//!     )
//!     .unwrap()
//!     .key()
//!     .unwrap();
//!
//! let rows = db
//!     .read(
//!         "select accounts.iban from accounts where accounts.id = ?",
//!         &[Value::from(key as i64)],
//!     )
//!     .unwrap();
//! assert_eq!(rows.len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Query string parsing: clause extraction, condition grammar, statements.
pub mod parser;

/// Query execution: values, rows, predicates, the select/mutate pipeline.
pub mod executor;

/// Table persistence: blob-store contract and the lazily loaded row store.
pub mod storage;

/// The gateway façade consumed by applications.
pub mod database;

/// Typed mutation-event dispatch.
pub mod events;

mod error;

pub use database::{Database, DatabaseConfig};
pub use error::{ErrorCode, LedgerError, LedgerResult};
pub use events::{EventDispatcher, MutationEvent, MutationKind};
pub use executor::{MutationResult, Row, Value};
