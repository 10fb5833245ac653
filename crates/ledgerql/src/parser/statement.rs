//! Typed statements.
//!
//! Turns the clause pairs produced by [`super::clauses`] into one of the
//! four statement kinds, parsing column lists, value lists, and
//! condition clauses along the way. This is also where the per-kind
//! required-clause rules live.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};
use crate::executor::Value;

use super::clauses::{extract_clauses, ClauseKeyword, READ_CLAUSES, WRITE_CLAUSES};
use super::condition::{parse_condition, Expr};
use super::ColumnRef;

/// A parsed read query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectStatement {
    /// Projection list.
    pub columns: Vec<ColumnRef>,
    /// Base table.
    pub from: String,
    /// Optional join (at most one).
    pub join: Option<JoinClause>,
    /// Optional filter.
    pub where_clause: Option<Expr>,
}

/// The `join ... on ...` part of a read query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinClause {
    /// Joined table.
    pub table: String,
    /// Join condition, evaluated over a (left, right) row pair.
    pub on: Expr,
}

/// A parsed insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertStatement {
    /// Target table.
    pub table: String,
    /// Columns named in the `set` clause.
    pub columns: Vec<ColumnRef>,
    /// Positional values from the `insert` clause.
    pub values: Vec<Value>,
}

/// A parsed update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateStatement {
    /// Target table.
    pub table: String,
    /// Columns named in the `set` clause.
    pub columns: Vec<ColumnRef>,
    /// Positional values from the `update` clause.
    pub values: Vec<Value>,
    /// Row filter; an update without `where` is malformed.
    pub where_clause: Expr,
}

/// A parsed delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteStatement {
    /// Target table.
    pub table: String,
    /// Row filter; a delete without `where` is malformed.
    pub where_clause: Expr,
}

/// A parsed statement of any kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    /// A read query.
    Select(SelectStatement),
    /// An insert.
    Insert(InsertStatement),
    /// An update.
    Update(UpdateStatement),
    /// A delete.
    Delete(DeleteStatement),
}

impl Statement {
    /// Parses a query string into a typed statement.
    pub fn parse(query: &str) -> LedgerResult<Statement> {
        match detect_kind(query)? {
            ClauseKeyword::Select => parse_select(query).map(Statement::Select),
            ClauseKeyword::Insert => parse_insert(query).map(Statement::Insert),
            ClauseKeyword::Update => parse_update(query).map(Statement::Update),
            ClauseKeyword::Delete => parse_delete(query).map(Statement::Delete),
            _ => unreachable!("detect_kind only returns statement verbs"),
        }
    }

    /// The tables this statement touches, base table first. Used to
    /// drive lazy table loading before execution.
    pub fn tables(&self) -> Vec<&str> {
        match self {
            Statement::Select(stmt) => {
                let mut tables = vec![stmt.from.as_str()];
                if let Some(join) = &stmt.join {
                    tables.push(join.table.as_str());
                }
                tables
            }
            Statement::Insert(stmt) => vec![stmt.table.as_str()],
            Statement::Update(stmt) => vec![stmt.table.as_str()],
            Statement::Delete(stmt) => vec![stmt.table.as_str()],
        }
    }

    /// Returns true for the read kind.
    pub fn is_read(&self) -> bool {
        matches!(self, Statement::Select(_))
    }
}

/// Finds the statement verb: the first word that is one of
/// `select`/`insert`/`update`/`delete`.
fn detect_kind(query: &str) -> LedgerResult<ClauseKeyword> {
    const VERBS: &[ClauseKeyword] = &[
        ClauseKeyword::Select,
        ClauseKeyword::Insert,
        ClauseKeyword::Update,
        ClauseKeyword::Delete,
    ];
    query
        .split_whitespace()
        .find_map(|word| {
            VERBS
                .iter()
                .copied()
                .find(|kw| word.eq_ignore_ascii_case(kw.as_str()))
        })
        .ok_or_else(|| {
            LedgerError::malformed("expected a select, insert, update, or delete query")
        })
}

/// Collects clause pairs into a map, rejecting duplicates. A repeated
/// `join` is the one duplicate with its own meaning: multi-table joins
/// are an explicit extension point, reported as unsupported rather than
/// malformed.
fn clause_map(
    query: &str,
    keywords: &[ClauseKeyword],
) -> LedgerResult<HashMap<ClauseKeyword, String>> {
    let mut map = HashMap::new();
    for (keyword, body) in extract_clauses(query, keywords)? {
        if map.insert(keyword, body).is_some() {
            if keyword == ClauseKeyword::Join {
                return Err(LedgerError::unsupported("multiple joins in one query"));
            }
            return Err(LedgerError::malformed(format!(
                "duplicate `{}` clause",
                keyword.as_str()
            )));
        }
    }
    Ok(map)
}

fn require(
    map: &HashMap<ClauseKeyword, String>,
    keyword: ClauseKeyword,
) -> LedgerResult<String> {
    match map.get(&keyword) {
        Some(body) if !body.is_empty() => Ok(body.clone()),
        _ => Err(LedgerError::malformed(format!(
            "missing `{}` clause",
            keyword.as_str()
        ))),
    }
}

fn parse_table_name(body: &str) -> LedgerResult<String> {
    if body.split_whitespace().count() != 1 {
        return Err(LedgerError::malformed(format!(
            "expected a single table name, got `{}`",
            body
        )));
    }
    Ok(body.to_string())
}

fn parse_column_list(body: &str) -> LedgerResult<Vec<ColumnRef>> {
    body.split(',').map(ColumnRef::parse).collect()
}

fn parse_value_list(body: &str) -> LedgerResult<Vec<Value>> {
    if body.trim().is_empty() {
        return Err(LedgerError::malformed("empty value list"));
    }
    Ok(body.split(',').map(Value::parse_literal).collect())
}

fn parse_select(query: &str) -> LedgerResult<SelectStatement> {
    let map = clause_map(query, READ_CLAUSES)?;
    let columns = parse_column_list(&require(&map, ClauseKeyword::Select)?)?;
    let from = parse_table_name(&require(&map, ClauseKeyword::From)?)?;

    let join = match map.get(&ClauseKeyword::Join) {
        Some(body) => Some(JoinClause {
            table: parse_table_name(body)?,
            on: parse_condition(&require(&map, ClauseKeyword::On)?)?,
        }),
        None => None,
    };

    let where_clause = map
        .get(&ClauseKeyword::Where)
        .map(|body| parse_condition(body))
        .transpose()?;

    Ok(SelectStatement {
        columns,
        from,
        join,
        where_clause,
    })
}

fn parse_insert(query: &str) -> LedgerResult<InsertStatement> {
    let map = clause_map(query, WRITE_CLAUSES)?;
    Ok(InsertStatement {
        values: parse_value_list(&require(&map, ClauseKeyword::Insert)?)?,
        table: parse_table_name(&require(&map, ClauseKeyword::From)?)?,
        columns: parse_column_list(&require(&map, ClauseKeyword::Set)?)?,
    })
}

fn parse_update(query: &str) -> LedgerResult<UpdateStatement> {
    let map = clause_map(query, WRITE_CLAUSES)?;
    Ok(UpdateStatement {
        values: parse_value_list(&require(&map, ClauseKeyword::Update)?)?,
        table: parse_table_name(&require(&map, ClauseKeyword::From)?)?,
        columns: parse_column_list(&require(&map, ClauseKeyword::Set)?)?,
        where_clause: parse_condition(&require(&map, ClauseKeyword::Where)?)?,
    })
}

fn parse_delete(query: &str) -> LedgerResult<DeleteStatement> {
    let map = clause_map(query, WRITE_CLAUSES)?;
    Ok(DeleteStatement {
        table: parse_table_name(&require(&map, ClauseKeyword::From)?)?,
        where_clause: parse_condition(&require(&map, ClauseKeyword::Where)?)?,
    })
}
