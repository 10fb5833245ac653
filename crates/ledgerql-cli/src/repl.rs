//! Interactive REPL.
//!
//! A line-oriented shell: each input line is either a backslash command
//! or one query. Queries have no parameter placeholders here; values go
//! inline in the query text.

use std::borrow::Cow;
use std::time::Instant;

use anyhow::Result;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{CompletionType, Config, EditMode, Editor, Helper};
use tracing::debug;

use ledgerql::parser::Statement;
use ledgerql::Database;

use crate::commands::Command;
use crate::formatter::{self, OutputFormat};
use crate::seed;

/// The REPL prompt.
const PROMPT: &str = "ledgerql> ";

/// Keywords offered by tab completion.
const KEYWORDS: &[&str] = &[
    "select", "insert", "update", "delete", "from", "join", "on", "where", "set", "and", "or",
    "not",
];

/// REPL helper for rustyline.
struct ReplHelper;

impl Completer for ReplHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let start = line[..pos]
            .rfind(|c: char| c.is_whitespace() || c == '(' || c == ',')
            .map(|i| i + 1)
            .unwrap_or(0);
        let word = line[start..pos].to_lowercase();

        let matches: Vec<Pair> = KEYWORDS
            .iter()
            .filter(|kw| kw.starts_with(&word))
            .map(|kw| Pair {
                display: kw.to_string(),
                replacement: kw.to_string(),
            })
            .collect();

        Ok((start, matches))
    }
}

impl Hinter for ReplHelper {
    type Hint = String;

    fn hint(&self, _line: &str, _pos: usize, _ctx: &rustyline::Context<'_>) -> Option<String> {
        None
    }
}

impl Highlighter for ReplHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        Cow::Borrowed(line)
    }
}

impl Validator for ReplHelper {
    fn validate(&self, _ctx: &mut ValidationContext) -> rustyline::Result<ValidationResult> {
        // queries are single-line; every input is complete
        Ok(ValidationResult::Valid(None))
    }
}

impl Helper for ReplHelper {}

/// Runs one query against the database and formats the outcome.
pub fn execute_query(db: &mut Database, query: &str, format: OutputFormat) -> Result<String> {
    if Statement::parse(query)?.is_read() {
        let rows = db.read(query, &[])?;
        Ok(formatter::format_rows(&rows, format))
    } else {
        let result = db.write(query, &[])?;
        Ok(formatter::format_mutation(&result))
    }
}

/// Interactive shell over a database.
pub struct Repl {
    db: Database,
    editor: Editor<ReplHelper, DefaultHistory>,
    format: OutputFormat,
    timing: bool,
}

impl Repl {
    /// Creates a new REPL.
    pub fn new(db: Database, format: OutputFormat) -> Result<Self> {
        let config = Config::builder()
            .history_ignore_space(true)
            .completion_type(CompletionType::List)
            .edit_mode(EditMode::Emacs)
            .max_history_size(1000)?
            .build();

        let mut editor = Editor::with_config(config)?;
        editor.set_helper(Some(ReplHelper));

        Ok(Self {
            db,
            editor,
            format,
            timing: false,
        })
    }

    /// Prints the welcome banner.
    pub fn print_banner(&self) {
        println!("LedgerQL v{}", env!("CARGO_PKG_VERSION"));
        println!("Type \\? for help, \\q to quit.\n");
    }

    /// Runs the main loop.
    pub fn run(&mut self) -> Result<()> {
        loop {
            match self.editor.readline(PROMPT) {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    let _ = self.editor.add_history_entry(line);

                    if self.process_line(line) {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => break,
                Err(e) => {
                    debug!("readline error: {e}");
                    break;
                }
            }
        }
        Ok(())
    }

    /// Handles one input line. Returns true when the REPL should exit.
    fn process_line(&mut self, line: &str) -> bool {
        if line.starts_with('\\') {
            return self.process_command(Command::parse(line));
        }

        let started = Instant::now();
        match execute_query(&mut self.db, line, self.format) {
            Ok(output) => {
                println!("{output}");
                if self.timing {
                    println!("Time: {:.3} ms", started.elapsed().as_secs_f64() * 1000.0);
                }
            }
            Err(e) => eprintln!("Error: {e}"),
        }
        false
    }

    fn process_command(&mut self, command: Command) -> bool {
        match command {
            Command::Quit => return true,
            Command::Help => println!("{}", Command::help_text()),
            Command::ListTables => {
                let tables = self.db.tables();
                if tables.is_empty() {
                    println!("(no tables loaded)");
                } else {
                    for table in tables {
                        println!("{table}");
                    }
                }
            }
            Command::Format(name) => match name.as_str() {
                "table" => self.format = OutputFormat::Table,
                "json" => self.format = OutputFormat::Json,
                "csv" => self.format = OutputFormat::Csv,
                other => eprintln!("unknown format `{other}` (table, json, csv)"),
            },
            Command::Timing => {
                self.timing = !self.timing;
                println!("Timing is {}", if self.timing { "on" } else { "off" });
            }
            Command::Seed => match seed::apply(&mut self.db) {
                Ok(()) => {}
                Err(e) => eprintln!("Error: {e}"),
            },
            Command::Unknown(name) => {
                eprintln!("unknown command `\\{name}`; try \\?");
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerql::DatabaseConfig;

    #[test]
    fn test_execute_query_dispatches_reads_and_writes() {
        let mut db = Database::open(DatabaseConfig::in_memory()).unwrap();

        let out = execute_query(
            &mut db,
            "insert 100.0 from accounts set accounts.balance",
            OutputFormat::Table,
        )
        .unwrap();
        assert_eq!(out, "inserted row 1");

        let out = execute_query(
            &mut db,
            "select accounts.id, accounts.balance from accounts",
            OutputFormat::Csv,
        )
        .unwrap();
        assert_eq!(out, "balance,id\n100,1");
    }
}
