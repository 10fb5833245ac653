//! Query string parsing.
//!
//! The wire grammar is a restricted SQL-like language:
//!
//! ```text
//! select <t.c>(, <t.c>)* from <table> [join <table> on <cond>] [where <cond>]
//! insert <v>(, <v>)*   from <table> set <t.c>(, <t.c>)*
//! update <v>(, <v>)*   from <table> set <t.c>(, <t.c>)* where <cond>
//! delete               from <table> where <cond>
//! ```
//!
//! Parsing happens in two stages: [`clauses`] splits the raw string on
//! word-boundary keyword occurrences into keyword→body pairs, then
//! [`statement`] turns the bodies into typed statements, handing
//! `on`/`where` fragments to the [`condition`] grammar.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};

pub mod clauses;
pub mod condition;
pub mod statement;

pub use clauses::{extract_clauses, ClauseKeyword};
pub use condition::{parse_condition, CmpOp, Expr, Operand};
pub use statement::{
    DeleteStatement, InsertStatement, JoinClause, SelectStatement, Statement, UpdateStatement,
};

/// A column reference (`table.column`, or a bare `column`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRef {
    /// Optional table qualifier.
    pub table: Option<String>,
    /// Column name.
    pub column: String,
}

impl ColumnRef {
    /// Creates an unqualified column reference.
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            table: None,
            column: column.into(),
        }
    }

    /// Creates a column reference with a table qualifier.
    pub fn qualified(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: Some(table.into()),
            column: column.into(),
        }
    }

    /// Parses a `table.column` or bare `column` token.
    pub fn parse(token: &str) -> LedgerResult<Self> {
        let token = token.trim();
        if token.is_empty() {
            return Err(LedgerError::malformed("empty column reference"));
        }
        match token.split_once('.') {
            Some((table, column)) if !table.is_empty() && !column.is_empty() => {
                Ok(Self::qualified(table, column))
            }
            Some(_) => Err(LedgerError::malformed(format!(
                "invalid column reference `{}`",
                token
            ))),
            None => Ok(Self::new(token)),
        }
    }

    /// Returns true if this column has a table qualifier.
    pub fn is_qualified(&self) -> bool {
        self.table.is_some()
    }

    /// The field name this reference resolves to in a joined row:
    /// `<table>_<column>` when qualified, the bare column otherwise.
    pub fn prefixed_name(&self) -> String {
        match &self.table {
            Some(table) => format!("{}_{}", table, self.column),
            None => self.column.clone(),
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref table) = self.table {
            write!(f, "{}.{}", table, self.column)
        } else {
            write!(f, "{}", self.column)
        }
    }
}
