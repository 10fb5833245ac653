//! Clause extraction.
//!
//! Splits a raw query string into keyword→body pairs using the reserved
//! keyword set as delimiters. Keywords are matched case-insensitively as
//! whole whitespace-delimited words; text before the first keyword is
//! discarded; each body runs up to the next keyword and is edge-trimmed
//! but otherwise returned verbatim.

use crate::error::{LedgerError, LedgerResult};

/// A reserved clause keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClauseKeyword {
    /// `select` — projection list of a read query.
    Select,
    /// `insert` — value list of an insert.
    Insert,
    /// `update` — value list of an update.
    Update,
    /// `delete` — marks a delete query.
    Delete,
    /// `from` — the base table.
    From,
    /// `join` — the joined table of a read query.
    Join,
    /// `on` — the join condition.
    On,
    /// `where` — the filter condition.
    Where,
    /// `set` — the column list of a write query.
    Set,
}

impl ClauseKeyword {
    /// The keyword as it appears in query text.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ClauseKeyword::Select => "select",
            ClauseKeyword::Insert => "insert",
            ClauseKeyword::Update => "update",
            ClauseKeyword::Delete => "delete",
            ClauseKeyword::From => "from",
            ClauseKeyword::Join => "join",
            ClauseKeyword::On => "on",
            ClauseKeyword::Where => "where",
            ClauseKeyword::Set => "set",
        }
    }

    /// Matches a word against a keyword set, case-insensitively.
    fn from_word(word: &str, keywords: &[ClauseKeyword]) -> Option<ClauseKeyword> {
        keywords
            .iter()
            .copied()
            .find(|kw| word.eq_ignore_ascii_case(kw.as_str()))
    }
}

/// Keywords recognized in read queries.
pub const READ_CLAUSES: &[ClauseKeyword] = &[
    ClauseKeyword::Select,
    ClauseKeyword::Join,
    ClauseKeyword::On,
    ClauseKeyword::Where,
    ClauseKeyword::From,
];

/// Keywords recognized in write queries.
pub const WRITE_CLAUSES: &[ClauseKeyword] = &[
    ClauseKeyword::Insert,
    ClauseKeyword::Update,
    ClauseKeyword::Delete,
    ClauseKeyword::From,
    ClauseKeyword::Set,
    ClauseKeyword::Where,
];

/// Splits `query` into `(keyword, body)` pairs in occurrence order.
///
/// Fails with a malformed-query error when no keyword from the set
/// occurs at all. Duplicate keywords are reported as-is; callers decide
/// whether a repeat is malformed or merely unsupported.
pub fn extract_clauses(
    query: &str,
    keywords: &[ClauseKeyword],
) -> LedgerResult<Vec<(ClauseKeyword, String)>> {
    let mut clauses: Vec<(ClauseKeyword, String)> = Vec::new();
    // (keyword, byte offset where its body starts)
    let mut open: Option<(ClauseKeyword, usize)> = None;

    for (start, word) in word_spans(query) {
        if let Some(keyword) = ClauseKeyword::from_word(word, keywords) {
            if let Some((prev, body_start)) = open.take() {
                clauses.push((prev, query[body_start..start].trim().to_string()));
            }
            open = Some((keyword, start + word.len()));
        }
    }

    match open {
        Some((last, body_start)) => {
            clauses.push((last, query[body_start..].trim().to_string()));
            Ok(clauses)
        }
        None => Err(LedgerError::malformed(format!(
            "no recognized clause keyword in `{}`",
            query.trim()
        ))),
    }
}

/// Iterates over whitespace-delimited words with their byte offsets.
fn word_spans<'a>(input: &'a str) -> impl Iterator<Item = (usize, &'a str)> + 'a {
    input.split_whitespace().map(move |word| {
        // split_whitespace yields subslices of `input`, so offsets can
        // be recovered from pointer arithmetic
        let start = word.as_ptr() as usize - input.as_ptr() as usize;
        (start, word)
    })
}
