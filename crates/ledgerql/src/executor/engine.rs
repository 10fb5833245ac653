//! The select and mutate pipelines.
//!
//! Reads run `from → join → where → select` in that order, mirroring
//! relational evaluation order. The join is a nested loop over the two
//! tables — fine at the row counts this engine is built for, and kept
//! behind this module's contract so a hash join could replace it without
//! changing callers.
//!
//! Writes validate everything (arity, reserved columns, the predicate,
//! the set of matching keys) before touching the first row, so a failed
//! mutation leaves the table exactly as it was.

use tracing::debug;

use crate::error::{LedgerError, LedgerResult};
use crate::parser::{
    DeleteStatement, InsertStatement, SelectStatement, Statement, UpdateStatement,
};
use crate::storage::{RowStore, PRIMARY_KEY};

use super::{FieldScope, Predicate, Row, Value};

/// Outcome of a write query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationResult {
    /// An insert happened; carries the engine-assigned primary key.
    Inserted {
        /// The generated key.
        key: u64,
    },
    /// An update happened; carries the number of rows rewritten.
    Updated {
        /// Rows updated (never zero; zero matches is an error).
        rows: u64,
    },
    /// A delete happened; carries the number of rows removed.
    Deleted {
        /// Rows removed (zero is a valid outcome).
        rows: u64,
    },
}

impl MutationResult {
    /// The generated primary key, for inserts.
    pub fn key(&self) -> Option<u64> {
        match self {
            MutationResult::Inserted { key } => Some(*key),
            _ => None,
        }
    }

    /// Number of rows the mutation touched.
    pub fn affected(&self) -> u64 {
        match self {
            MutationResult::Inserted { .. } => 1,
            MutationResult::Updated { rows } | MutationResult::Deleted { rows } => *rows,
        }
    }
}

/// Executes a read query against the store. Never mutates it.
pub fn select(stmt: &SelectStatement, store: &RowStore) -> LedgerResult<Vec<Row>> {
    let joined = stmt.join.is_some();

    // from / join
    let mut rows: Vec<Row> = match &stmt.join {
        Some(join) => {
            let on = Predicate::compile(
                join.on.clone(),
                FieldScope::Dual {
                    left: stmt.from.clone(),
                    right: join.table.clone(),
                },
            )?;
            let mut out = Vec::new();
            for (_, left) in store.rows_of(&stmt.from) {
                for (_, right) in store.rows_of(&join.table) {
                    if on.matches_pair(left, right) {
                        out.push(
                            left.prefixed(&stmt.from)
                                .merged(right.prefixed(&join.table)),
                        );
                    }
                }
            }
            out
        }
        None => store.rows_of(&stmt.from).map(|(_, row)| row.clone()).collect(),
    };

    // where
    if let Some(condition) = &stmt.where_clause {
        let scope = if joined {
            FieldScope::SinglePrefixed
        } else {
            FieldScope::SingleBare
        };
        let filter = Predicate::compile(condition.clone(), scope)?;
        rows.retain(|row| filter.matches(row));
    }

    // select
    let fields: Vec<String> = stmt
        .columns
        .iter()
        .map(|col| {
            if joined {
                col.prefixed_name()
            } else {
                col.column.clone()
            }
        })
        .collect();
    let projected: Vec<Row> = rows
        .iter()
        .map(|row| row.project(fields.iter().map(String::as_str)))
        .collect();

    debug!(
        table = %stmt.from,
        joined,
        rows = projected.len(),
        "select executed"
    );
    Ok(projected)
}

/// Executes a write statement against the store. Persistence is the
/// caller's responsibility.
pub fn mutate(stmt: &Statement, store: &mut RowStore) -> LedgerResult<MutationResult> {
    match stmt {
        Statement::Insert(insert) => execute_insert(insert, store),
        Statement::Update(update) => execute_update(update, store),
        Statement::Delete(delete) => execute_delete(delete, store),
        Statement::Select(_) => Err(LedgerError::malformed(
            "select queries go through the read path",
        )),
    }
}

fn check_arity(columns: usize, values: usize) -> LedgerResult<()> {
    if columns != values {
        return Err(LedgerError::ArityMismatch { columns, values });
    }
    Ok(())
}

fn reject_primary_key(
    columns: &[crate::parser::ColumnRef],
    operation: &str,
) -> LedgerResult<()> {
    if columns.iter().any(|col| col.column == PRIMARY_KEY) {
        return Err(LedgerError::unsupported(operation));
    }
    Ok(())
}

fn execute_insert(stmt: &InsertStatement, store: &mut RowStore) -> LedgerResult<MutationResult> {
    check_arity(stmt.columns.len(), stmt.values.len())?;
    // keys are always engine-assigned on this path
    reject_primary_key(&stmt.columns, "custom primary key on insert")?;

    let key = store.reserve_key(&stmt.table);
    let mut row = Row::new();
    for (col, value) in stmt.columns.iter().zip(&stmt.values) {
        row.set(col.column.clone(), value.clone());
    }
    row.set(PRIMARY_KEY, Value::Int(key as i64));
    store.insert_row(&stmt.table, key, row)?;

    debug!(table = %stmt.table, key, "insert executed");
    Ok(MutationResult::Inserted { key })
}

fn execute_update(stmt: &UpdateStatement, store: &mut RowStore) -> LedgerResult<MutationResult> {
    check_arity(stmt.columns.len(), stmt.values.len())?;
    reject_primary_key(&stmt.columns, "assigning the primary key in update")?;

    let filter = Predicate::compile(stmt.where_clause.clone(), FieldScope::SingleBare)?;
    let keys: Vec<u64> = store
        .rows_of(&stmt.table)
        .filter(|(_, row)| filter.matches(row))
        .map(|(key, _)| key)
        .collect();
    if keys.is_empty() {
        return Err(LedgerError::NoMatchingRow {
            table: stmt.table.clone(),
        });
    }

    for &key in &keys {
        if let Some(row) = store.row_mut(&stmt.table, key) {
            for (col, value) in stmt.columns.iter().zip(&stmt.values) {
                row.set(col.column.clone(), value.clone());
            }
        }
    }

    debug!(table = %stmt.table, rows = keys.len(), "update executed");
    Ok(MutationResult::Updated {
        rows: keys.len() as u64,
    })
}

fn execute_delete(stmt: &DeleteStatement, store: &mut RowStore) -> LedgerResult<MutationResult> {
    let filter = Predicate::compile(stmt.where_clause.clone(), FieldScope::SingleBare)?;
    let keys: Vec<u64> = store
        .rows_of(&stmt.table)
        .filter(|(_, row)| filter.matches(row))
        .map(|(key, _)| key)
        .collect();

    for &key in &keys {
        store.remove_row(&stmt.table, key);
    }

    debug!(table = %stmt.table, rows = keys.len(), "delete executed");
    Ok(MutationResult::Deleted {
        rows: keys.len() as u64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBlobStore;

    fn store_with_accounts() -> RowStore {
        let mut store = RowStore::new(Box::new(MemoryBlobStore::new()));
        store.ensure_loaded("accounts").unwrap();
        for (holder, balance, status) in [
            (1, 500.5, "active"),
            (1, 12000.0, "active"),
            (2, 150.25, "suspended"),
        ] {
            let key = store.reserve_key("accounts");
            let mut row = Row::new();
            row.set("id", Value::Int(key as i64));
            row.set("account_holder", Value::Int(holder));
            row.set("balance", Value::Float(balance));
            row.set("status", Value::Str(status.to_string()));
            store.insert_row("accounts", key, row).unwrap();
        }
        store
    }

    fn parse_select(query: &str) -> SelectStatement {
        match Statement::parse(query).unwrap() {
            Statement::Select(stmt) => stmt,
            other => panic!("expected select, got {:?}", other),
        }
    }

    #[test]
    fn test_select_all_rows_in_key_order() {
        let store = store_with_accounts();
        let stmt = parse_select("select accounts.id from accounts");
        let rows = select(&stmt, &store).unwrap();
        let ids: Vec<_> = rows.iter().map(|r| r.get_or_null("id")).collect();
        assert_eq!(ids, vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
    }

    #[test]
    fn test_select_where_filters() {
        let store = store_with_accounts();
        let stmt =
            parse_select("select accounts.id from accounts where accounts.status = active");
        let rows = select(&stmt, &store).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_select_missing_column_is_omitted() {
        let store = store_with_accounts();
        let stmt = parse_select("select accounts.id, accounts.nickname from accounts");
        let rows = select(&stmt, &store).unwrap();
        assert_eq!(rows[0].len(), 1);
        assert!(!rows[0].contains("nickname"));
    }

    #[test]
    fn test_select_never_mutates() {
        let store = store_with_accounts();
        let before: Vec<Row> = store.rows_of("accounts").map(|(_, r)| r.clone()).collect();
        let stmt =
            parse_select("select accounts.id from accounts where accounts.balance > 100");
        select(&stmt, &store).unwrap();
        let after: Vec<Row> = store.rows_of("accounts").map(|(_, r)| r.clone()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_insert_assigns_next_key() {
        let mut store = store_with_accounts();
        let stmt = Statement::parse(
            "insert 3, 75.0, active from accounts \
             set accounts.account_holder, accounts.balance, accounts.status",
        )
        .unwrap();
        let result = mutate(&stmt, &mut store).unwrap();
        assert_eq!(result.key(), Some(4));
        let row = store.rows_of("accounts").last().unwrap().1;
        assert_eq!(row.get_or_null("id"), Value::Int(4));
        assert_eq!(row.get_or_null("balance"), Value::Float(75.0));
    }

    #[test]
    fn test_insert_arity_mismatch() {
        let mut store = store_with_accounts();
        let stmt =
            Statement::parse("insert 1, 2 from accounts set accounts.balance").unwrap();
        let result = mutate(&stmt, &mut store);
        assert!(matches!(
            result,
            Err(LedgerError::ArityMismatch {
                columns: 1,
                values: 2
            })
        ));
    }

    #[test]
    fn test_insert_custom_key_unsupported() {
        let mut store = store_with_accounts();
        let stmt = Statement::parse(
            "insert 9999, 10.0 from accounts set accounts.id, accounts.balance",
        )
        .unwrap();
        let result = mutate(&stmt, &mut store);
        assert!(matches!(result, Err(LedgerError::Unsupported { .. })));
        // nothing was applied
        assert_eq!(store.rows_of("accounts").count(), 3);
    }

    #[test]
    fn test_update_rewrites_matches_only() {
        let mut store = store_with_accounts();
        let stmt = Statement::parse(
            "update 600 from accounts set accounts.balance where accounts.id = 1",
        )
        .unwrap();
        let result = mutate(&stmt, &mut store).unwrap();
        assert_eq!(result, MutationResult::Updated { rows: 1 });

        let rows: Vec<Row> = store.rows_of("accounts").map(|(_, r)| r.clone()).collect();
        assert_eq!(rows[0].get_or_null("balance"), Value::Int(600));
        assert_eq!(rows[1].get_or_null("balance"), Value::Float(12000.0));
    }

    #[test]
    fn test_update_zero_matches_is_an_error() {
        let mut store = store_with_accounts();
        let stmt = Statement::parse(
            "update 600 from accounts set accounts.balance where accounts.id = 9999",
        )
        .unwrap();
        let result = mutate(&stmt, &mut store);
        assert!(matches!(result, Err(LedgerError::NoMatchingRow { .. })));
    }

    #[test]
    fn test_delete_zero_matches_is_fine() {
        let mut store = store_with_accounts();
        let stmt =
            Statement::parse("delete from accounts where accounts.id = 9999").unwrap();
        let result = mutate(&stmt, &mut store).unwrap();
        assert_eq!(result, MutationResult::Deleted { rows: 0 });
        assert_eq!(store.rows_of("accounts").count(), 3);
    }

    #[test]
    fn test_delete_removes_matches() {
        let mut store = store_with_accounts();
        let stmt =
            Statement::parse("delete from accounts where accounts.status = active").unwrap();
        let result = mutate(&stmt, &mut store).unwrap();
        assert_eq!(result, MutationResult::Deleted { rows: 2 });
        assert_eq!(store.rows_of("accounts").count(), 1);
    }

    #[test]
    fn test_deleted_key_is_not_reissued() {
        let mut store = store_with_accounts();
        let delete =
            Statement::parse("delete from accounts where accounts.id = 3").unwrap();
        mutate(&delete, &mut store).unwrap();

        let insert = Statement::parse(
            "insert 42.0 from accounts set accounts.balance",
        )
        .unwrap();
        let result = mutate(&insert, &mut store).unwrap();
        assert_eq!(result.key(), Some(4));
    }
}
