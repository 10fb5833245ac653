//! Condition grammar for `on` and `where` clauses.
//!
//! A condition is a comparison `<operand> <op> <operand>` where an
//! operand is a `table.column` reference or a literal, combined with
//! `and`/`or`, an optional `not`, and parentheses for grouping. The
//! comparison operators live in a data-driven table so new ones can be
//! added without touching the parser.
//!
//! `not` is meant to appear at the start of an expression or before a
//! parenthesized group; the parser does not police placement, so
//! misplaced negation yields a wrong answer rather than an error.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};
use crate::executor::Value;

use super::ColumnRef;

/// A comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CmpOp {
    /// Equal.
    Eq,
    /// Not equal.
    NotEq,
    /// Less than.
    Lt,
    /// Less than or equal.
    LtEq,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    GtEq,
}

/// Symbol table for comparison operators, longest symbols first so the
/// scanner can greedily match `>=` before `>`.
const OPERATORS: &[(&str, CmpOp)] = &[
    (">=", CmpOp::GtEq),
    ("<=", CmpOp::LtEq),
    ("!=", CmpOp::NotEq),
    (">", CmpOp::Gt),
    ("<", CmpOp::Lt),
    ("=", CmpOp::Eq),
];

impl CmpOp {
    /// The operator's symbol in query text.
    pub fn symbol(&self) -> &'static str {
        OPERATORS
            .iter()
            .find(|(_, op)| op == self)
            .map(|(sym, _)| *sym)
            .unwrap_or("=")
    }
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// One side of a comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operand {
    /// A `table.column` reference.
    Column(ColumnRef),
    /// A literal value.
    Literal(Value),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Column(col) => write!(f, "{}", col),
            Operand::Literal(value) => write!(f, "{}", value),
        }
    }
}

/// A condition expression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// A comparison between two operands.
    Compare {
        /// Left operand.
        left: Operand,
        /// Comparison operator.
        op: CmpOp,
        /// Right operand.
        right: Operand,
    },
    /// Logical conjunction.
    And(Box<Expr>, Box<Expr>),
    /// Logical disjunction.
    Or(Box<Expr>, Box<Expr>),
    /// Logical negation.
    Not(Box<Expr>),
}

impl Expr {
    /// Visits every column reference in the expression.
    pub fn for_each_column<F: FnMut(&ColumnRef)>(&self, f: &mut F) {
        match self {
            Expr::Compare { left, right, .. } => {
                if let Operand::Column(col) = left {
                    f(col);
                }
                if let Operand::Column(col) = right {
                    f(col);
                }
            }
            Expr::And(a, b) | Expr::Or(a, b) => {
                a.for_each_column(f);
                b.for_each_column(f);
            }
            Expr::Not(inner) => inner.for_each_column(f),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Compare { left, op, right } => write!(f, "{} {} {}", left, op, right),
            Expr::And(a, b) => write!(f, "({} and {})", a, b),
            Expr::Or(a, b) => write!(f, "({} or {})", a, b),
            Expr::Not(inner) => write!(f, "not ({})", inner),
        }
    }
}

/// Parses a condition clause into an expression tree.
///
/// Failures carry the full clause text so callers can surface which
/// fragment of the query was unparseable.
pub fn parse_condition(text: &str) -> LedgerResult<Expr> {
    let fail = |message: String| LedgerError::PredicateCompile {
        clause: text.trim().to_string(),
        message,
    };
    let tokens = tokenize(text).map_err(&fail)?;
    let mut parser = ConditionParser { tokens, pos: 0 };
    let expr = parser.expr().map_err(&fail)?;
    if parser.pos != parser.tokens.len() {
        return Err(fail(format!(
            "unexpected trailing token `{}`",
            parser.tokens[parser.pos]
        )));
    }
    Ok(expr)
}

/// A lexical token of the condition grammar.
#[derive(Debug, Clone, PartialEq)]
enum Token {
    Word(String),
    Quoted(String),
    Cmp(CmpOp),
    LParen,
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Word(w) => write!(f, "{}", w),
            Token::Quoted(s) => write!(f, "'{}'", s),
            Token::Cmp(op) => write!(f, "{}", op),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c == '(' {
            chars.next();
            tokens.push(Token::LParen);
        } else if c == ')' {
            chars.next();
            tokens.push(Token::RParen);
        } else if c == '\'' {
            chars.next();
            let mut literal = String::new();
            let mut closed = false;
            for (_, c) in chars.by_ref() {
                if c == '\'' {
                    closed = true;
                    break;
                }
                literal.push(c);
            }
            if !closed {
                return Err("unterminated string literal".to_string());
            }
            tokens.push(Token::Quoted(literal));
        } else if let Some((symbol, op)) = match_operator(&input[start..]) {
            for _ in 0..symbol.len() {
                chars.next();
            }
            tokens.push(Token::Cmp(op));
        } else if c == '!' {
            return Err("stray `!`, expected `!=`".to_string());
        } else {
            let mut word = String::new();
            while let Some(&(_, c)) = chars.peek() {
                if c.is_whitespace() || "()<>=!'".contains(c) {
                    break;
                }
                word.push(c);
                chars.next();
            }
            tokens.push(Token::Word(word));
        }
    }

    Ok(tokens)
}

/// Greedy longest-match lookup against the operator table.
fn match_operator(rest: &str) -> Option<(&'static str, CmpOp)> {
    OPERATORS
        .iter()
        .find(|(symbol, _)| rest.starts_with(symbol))
        .map(|(symbol, op)| (*symbol, *op))
}

/// Recursive-descent parser. Precedence, loosest first: or, and, not,
/// comparison.
struct ConditionParser {
    tokens: Vec<Token>,
    pos: usize,
}

impl ConditionParser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(Token::Word(w)) if w.eq_ignore_ascii_case(keyword))
    }

    fn expr(&mut self) -> Result<Expr, String> {
        let mut left = self.and_expr()?;
        while self.peek_keyword("or") {
            self.next();
            let right = self.and_expr()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<Expr, String> {
        let mut left = self.unary()?;
        while self.peek_keyword("and") {
            self.next();
            let right = self.unary()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Expr, String> {
        if self.peek_keyword("not") {
            self.next();
            let inner = self.unary()?;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, String> {
        if matches!(self.peek(), Some(Token::LParen)) {
            self.next();
            let inner = self.expr()?;
            match self.next() {
                Some(Token::RParen) => Ok(inner),
                _ => Err("expected `)`".to_string()),
            }
        } else {
            self.comparison()
        }
    }

    fn comparison(&mut self) -> Result<Expr, String> {
        let left = self.operand()?;
        let op = match self.next() {
            Some(Token::Cmp(op)) => op,
            Some(other) => return Err(format!("expected comparison operator, got `{}`", other)),
            None => return Err("expected comparison operator".to_string()),
        };
        let right = self.operand()?;
        Ok(Expr::Compare { left, op, right })
    }

    fn operand(&mut self) -> Result<Operand, String> {
        match self.next() {
            Some(Token::Word(word)) => Ok(classify_word(&word)),
            Some(Token::Quoted(literal)) => Ok(Operand::Literal(Value::Str(literal))),
            Some(other) => Err(format!("expected operand, got `{}`", other)),
            None => Err("expected operand".to_string()),
        }
    }
}

/// A dotted word is a column reference when both halves look like
/// identifiers; everything else (numbers, decimals, bare words) parses
/// as a literal.
fn classify_word(word: &str) -> Operand {
    if let Some((table, column)) = word.split_once('.') {
        if is_identifier(table) && is_identifier(column) {
            return Operand::Column(ColumnRef::qualified(table, column));
        }
    }
    Operand::Literal(Value::parse_literal(word))
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
