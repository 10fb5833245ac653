//! LedgerQL command-line interface.
//!
//! An interactive shell over a LedgerQL database.
//!
//! # Usage
//!
//! ```bash
//! # In-memory session with the demo dataset
//! ledgerql --seed
//!
//! # Persist tables under a directory
//! ledgerql -D ./data
//!
//! # Execute a single query and exit
//! ledgerql -D ./data -c "select accounts.id, accounts.balance from accounts"
//!
//! # Run queries from a file, one per line
//! ledgerql -D ./data -f queries.lql -o json
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use ledgerql::{Database, DatabaseConfig};

mod commands;
mod formatter;
mod repl;
mod seed;

use formatter::OutputFormat;
use repl::Repl;

/// LedgerQL command-line interface
#[derive(Parser, Debug)]
#[command(
    name = "ledgerql",
    version,
    about = "Interactive shell for LedgerQL databases",
    long_about = "An interactive shell over a LedgerQL database.\n\n\
                  Without -D/--data-dir the database lives in memory and dies with the\n\
                  session; with it, every table persists as a JSON blob in the directory."
)]
struct Args {
    /// Directory for table blobs (omit for an in-memory database)
    #[arg(short = 'D', long, value_name = "DIR", env = "LEDGERQL_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Execute a single query and exit
    #[arg(short = 'c', long)]
    command: Option<String>,

    /// Execute queries from a file (one per line) and exit
    #[arg(short = 'f', long, value_name = "FILE")]
    file: Option<PathBuf>,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "table")]
    output: OutputFormatArg,

    /// Seed the demo banking dataset into empty tables
    #[arg(long)]
    seed: bool,

    /// Enable verbose output
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Suppress the banner (for scripting)
    #[arg(short = 'q', long)]
    quiet: bool,
}

/// Output format argument
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormatArg {
    /// Display results in a formatted table
    Table,
    /// Display results as JSON
    Json,
    /// Display results as CSV
    Csv,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Table => OutputFormat::Table,
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::Csv => OutputFormat::Csv,
        }
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = match &args.data_dir {
        Some(dir) => DatabaseConfig::with_path(dir),
        None => DatabaseConfig::in_memory(),
    };
    let mut db = Database::open(config)?;

    if args.seed {
        seed::apply(&mut db)?;
    }

    if let Some(query) = &args.command {
        execute_command(&mut db, query, args.output.into())
    } else if let Some(file) = &args.file {
        execute_file(&mut db, file, args.output.into())
    } else {
        let mut repl = Repl::new(db, args.output.into())?;
        if !args.quiet {
            repl.print_banner();
        }
        repl.run()
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("ledgerql=debug,ledgerql_cli=debug")
    } else {
        EnvFilter::new("ledgerql=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

fn execute_command(db: &mut Database, query: &str, format: OutputFormat) -> Result<()> {
    let output = repl::execute_query(db, query, format)?;
    println!("{output}");
    Ok(())
}

fn execute_file(db: &mut Database, path: &PathBuf, format: OutputFormat) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;

    for line in content.lines() {
        let query = line.trim();
        if query.is_empty() || query.starts_with("--") {
            continue;
        }
        let output = repl::execute_query(db, query, format)?;
        println!("{output}");
    }
    Ok(())
}
