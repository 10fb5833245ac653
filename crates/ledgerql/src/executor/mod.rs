//! Query execution.
//!
//! The executor drives the `from → join → where → select` pipeline for
//! reads and the insert/update/delete paths for writes, against tables
//! already resident in the row store. It never touches the blob store;
//! persistence ordering is the gateway's job.

mod engine;
mod evaluator;
mod row;
mod value;

pub use engine::{mutate, select, MutationResult};
pub use evaluator::{FieldScope, Predicate};
pub use row::Row;
pub use value::Value;
