//! Backslash commands for the REPL.

/// A parsed backslash command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Quit the REPL.
    Quit,
    /// Show help.
    Help,
    /// List loaded tables.
    ListTables,
    /// Set the output format.
    Format(String),
    /// Toggle query timing.
    Timing,
    /// Seed the demo dataset.
    Seed,
    /// Unrecognized command.
    Unknown(String),
}

impl Command {
    /// Parses a command line starting with `\`.
    pub fn parse(input: &str) -> Self {
        let cmd = input.trim().trim_start_matches('\\');
        let (name, arg) = match cmd.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (cmd, ""),
        };

        match name {
            "q" | "quit" | "exit" => Command::Quit,
            "?" | "h" | "help" => Command::Help,
            "dt" | "tables" => Command::ListTables,
            "f" | "format" => Command::Format(arg.to_string()),
            "timing" => Command::Timing,
            "seed" => Command::Seed,
            other => Command::Unknown(other.to_string()),
        }
    }

    /// The help text listing every command.
    pub fn help_text() -> &'static str {
        "Queries:\n\
         \x20 select <t.c>, ... from <t> [join <t> on <cond>] [where <cond>]\n\
         \x20 insert <v>, ... from <t> set <t.c>, ...\n\
         \x20 update <v>, ... from <t> set <t.c>, ... where <cond>\n\
         \x20 delete from <t> where <cond>\n\
         \n\
         Commands:\n\
         \x20 \\q            quit\n\
         \x20 \\?            show this help\n\
         \x20 \\dt           list loaded tables\n\
         \x20 \\f <fmt>      set output format (table, json, csv)\n\
         \x20 \\timing       toggle query timing\n\
         \x20 \\seed         seed the demo banking dataset"
    }
}
