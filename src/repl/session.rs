//! # REPL Loop
//!
//! Reads one line at a time, parses it, dispatches it against the database
//! and writes the rendered result. Each command runs to completion before the
//! next line is read.
//!
//! ```text
//!   read line ──► parse ──► dispatch ──► render ──► write
//!       ▲                                             │
//!       └─────────────────────────────────────────────┘
//! ```
//!
//! Command failures are written as `Error: ...` lines and never end the
//! loop. Only `exit` (or `quit`) and end of input do.

use std::io::{self, Write};

use tracing::debug;

use super::command::{Command, HELP_TEXT};
use super::dispatch::{self, Outcome};
use super::input::LineSource;
use super::render::{render_error, render_outcome};
use crate::db::Database;

pub const PROMPT: &str = "command> ";
pub const FAREWELL: &str = "Exiting REPL...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub struct Repl<S, W> {
    db: Database,
    source: S,
    out: W,
}

impl<S: LineSource, W: Write> Repl<S, W> {
    pub fn new(db: Database, source: S, out: W) -> Self {
        Self { db, source, out }
    }

    pub fn run(&mut self) -> io::Result<()> {
        writeln!(self.out, "{}", HELP_TEXT)?;

        loop {
            self.out.flush()?;
            let Some(line) = self.source.read_line(PROMPT)? else {
                debug!("end of input");
                break;
            };

            if !line.trim().is_empty() {
                self.source.add_history(line.trim());
            }

            if self.handle_line(&line)? == Flow::Exit {
                break;
            }
        }

        writeln!(self.out, "{}", FAREWELL)?;
        self.out.flush()?;
        self.source.close();
        Ok(())
    }

    /// Handles one input line and writes whatever it produces.
    pub fn handle_line(&mut self, line: &str) -> io::Result<Flow> {
        let command = match Command::parse(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Ok(Flow::Continue),
            Err(e) => {
                writeln!(self.out, "{}", render_error(&e))?;
                return Ok(Flow::Continue);
            }
        };

        match dispatch::execute(&self.db, command) {
            Ok(Outcome::Exit) => Ok(Flow::Exit),
            Ok(outcome) => {
                writeln!(self.out, "{}", render_outcome(&outcome))?;
                Ok(Flow::Continue)
            }
            Err(e) => {
                writeln!(self.out, "{}", render_error(&e))?;
                Ok(Flow::Continue)
            }
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn into_parts(self) -> (Database, S, W) {
        (self.db, self.source, self.out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{schema, PERSON_SCHEMA};
    use crate::repl::input::ScriptedInput;

    fn repl(lines: &[&str]) -> Repl<ScriptedInput, Vec<u8>> {
        let db = Database::open_in_memory().unwrap();
        schema::sync(&db, &PERSON_SCHEMA).unwrap();
        Repl::new(db, ScriptedInput::new(lines.iter().copied()), Vec::new())
    }

    fn output(repl: &Repl<ScriptedInput, Vec<u8>>) -> String {
        String::from_utf8(repl.output().clone()).unwrap()
    }

    #[test]
    fn test_blank_line_prints_nothing() {
        let mut repl = repl(&[]);
        assert_eq!(repl.handle_line("   ").unwrap(), Flow::Continue);
        assert!(output(&repl).is_empty());
    }

    #[test]
    fn test_exit_stops_before_remaining_lines() {
        let mut repl = repl(&["help", "exit", "add Doe John 30"]);
        repl.run().unwrap();

        let text = output(&repl);
        assert!(text.ends_with("Exiting REPL...\n"));
        assert!(!text.contains("Person added"));
        assert_eq!(repl.source().prompts, 2);
    }

    #[test]
    fn test_end_of_input_says_goodbye() {
        let mut repl = repl(&["list"]);
        repl.run().unwrap();

        let text = output(&repl);
        assert!(text.starts_with(HELP_TEXT));
        assert!(text.contains("No persons found"));
        assert!(text.ends_with("Exiting REPL...\n"));
    }

    #[test]
    fn test_errors_do_not_end_the_loop() {
        let mut repl = repl(&["bogus", "query SELEC 1", "add X Y", "list"]);
        repl.run().unwrap();

        let text = output(&repl);
        assert_eq!(text.lines().filter(|l| l.starts_with("Error: ")).count(), 3);
        assert!(text.contains("No persons found"));
    }

    #[test]
    fn test_interrupted_line_writes_nothing_and_continues() {
        let mut repl = repl(&["", "list"]);
        repl.run().unwrap();

        let text = output(&repl);
        assert!(!text.contains("^C"));
        assert_eq!(
            text,
            format!("{}\nNo persons found\n{}\n", HELP_TEXT, FAREWELL)
        );
        assert_eq!(repl.source().prompts, 3);
    }

    #[test]
    fn test_history_skips_blank_lines() {
        let mut repl = repl(&["  list  ", "", "help"]);
        repl.run().unwrap();
        assert_eq!(repl.source().history, vec!["list".to_string(), "help".to_string()]);
    }
}
