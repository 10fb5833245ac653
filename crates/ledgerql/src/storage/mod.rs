//! Table persistence.
//!
//! The engine sees persistence as an opaque key→string blob store: one
//! JSON blob per table, loaded lazily on first reference and rewritten
//! whole after every mutation. [`blob`] defines that contract and two
//! implementations; [`store`] holds the in-memory tables and the
//! primary-key counters.

mod blob;
mod store;

pub use blob::{BlobStore, DirBlobStore, MemoryBlobStore};
pub use store::RowStore;

/// The field every row carries as its primary key.
pub const PRIMARY_KEY: &str = "id";
