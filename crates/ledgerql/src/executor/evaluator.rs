//! Compiled predicates.
//!
//! A predicate is a condition expression bound to a field scope. The
//! scope decides how `table.column` references resolve against row
//! contexts, and it is an explicit parameter because the answer differs
//! between plain rows, post-join composite rows, and the two-row context
//! of a join condition.
//!
//! Compilation happens once per query; evaluation is a pure function of
//! the row argument(s) and captures nothing but the expression and the
//! scope.

use crate::error::{LedgerError, LedgerResult};
use crate::parser::{CmpOp, ColumnRef, Expr, Operand};

use super::{Row, Value};

/// How column references bind to row fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldScope {
    /// One plain table row: `t.c` reads field `c`.
    SingleBare,
    /// One post-join composite row: `t.c` reads field `t_c`.
    SinglePrefixed,
    /// A (left, right) row pair for a join condition: the qualifier
    /// picks the row, and the bare column name reads its field.
    Dual {
        /// Alias of the left row (the base table name).
        left: String,
        /// Alias of the right row (the joined table name).
        right: String,
    },
}

/// A condition compiled against a field scope.
#[derive(Debug, Clone)]
pub struct Predicate {
    expr: Expr,
    scope: FieldScope,
}

impl Predicate {
    /// Binds an expression to a field scope.
    ///
    /// For the dual scope every column reference must carry one of the
    /// two table aliases; anything else would silently read nothing, so
    /// it is rejected here rather than at evaluation time.
    pub fn compile(expr: Expr, scope: FieldScope) -> LedgerResult<Self> {
        if let FieldScope::Dual { left, right } = &scope {
            let mut bad: Option<ColumnRef> = None;
            expr.for_each_column(&mut |col| {
                let known = col
                    .table
                    .as_deref()
                    .is_some_and(|t| t == left || t == right);
                if !known && bad.is_none() {
                    bad = Some(col.clone());
                }
            });
            if let Some(col) = bad {
                return Err(LedgerError::PredicateCompile {
                    clause: expr.to_string(),
                    message: format!("`{}` does not name a joined table", col),
                });
            }
        }
        Ok(Self { expr, scope })
    }

    /// Evaluates the predicate against one row. A reference to a field
    /// the row does not carry reads as null.
    pub fn matches(&self, row: &Row) -> bool {
        eval(&self.expr, &|col| match self.scope {
            FieldScope::SinglePrefixed => row.get_or_null(&col.prefixed_name()),
            _ => row.get_or_null(&col.column),
        })
    }

    /// Evaluates the predicate against a (left, right) row pair.
    pub fn matches_pair(&self, left_row: &Row, right_row: &Row) -> bool {
        eval(&self.expr, &|col| match (&self.scope, col.table.as_deref()) {
            (FieldScope::Dual { left, .. }, Some(t)) if t == left.as_str() => {
                left_row.get_or_null(&col.column)
            }
            (FieldScope::Dual { right, .. }, Some(t)) if t == right.as_str() => {
                right_row.get_or_null(&col.column)
            }
            _ => Value::Null,
        })
    }
}

fn eval(expr: &Expr, resolve: &dyn Fn(&ColumnRef) -> Value) -> bool {
    match expr {
        Expr::Compare { left, op, right } => {
            let left = operand_value(left, resolve);
            let right = operand_value(right, resolve);
            compare(&left, *op, &right)
        }
        Expr::And(a, b) => eval(a, resolve) && eval(b, resolve),
        Expr::Or(a, b) => eval(a, resolve) || eval(b, resolve),
        Expr::Not(inner) => !eval(inner, resolve),
    }
}

fn operand_value(operand: &Operand, resolve: &dyn Fn(&ColumnRef) -> Value) -> Value {
    match operand {
        Operand::Column(col) => resolve(col),
        Operand::Literal(value) => value.clone(),
    }
}

/// Comparison semantics follow [`Value`]: strict by type, Int↔Float
/// numeric, incomparable pairs are false.
fn compare(left: &Value, op: CmpOp, right: &Value) -> bool {
    match op {
        CmpOp::Eq => left == right,
        CmpOp::NotEq => left != right,
        CmpOp::Lt => left.partial_cmp(right) == Some(std::cmp::Ordering::Less),
        CmpOp::Gt => left.partial_cmp(right) == Some(std::cmp::Ordering::Greater),
        CmpOp::LtEq => matches!(
            left.partial_cmp(right),
            Some(std::cmp::Ordering::Less | std::cmp::Ordering::Equal)
        ),
        CmpOp::GtEq => matches!(
            left.partial_cmp(right),
            Some(std::cmp::Ordering::Greater | std::cmp::Ordering::Equal)
        ),
    }
}
