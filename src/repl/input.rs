//! # Line Input
//!
//! The loop reads through the [`LineSource`] trait so it can be driven either
//! by `rustyline` at a terminal or by a scripted list of lines.
//!
//! History is kept in `~/.roster_history`. Set `ROSTER_HISTORY` to move it,
//! or to an empty string to turn persistence off.

use std::collections::VecDeque;
use std::env;
use std::io;
use std::path::PathBuf;

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::warn;

const DEFAULT_HISTORY_FILE: &str = ".roster_history";
const HISTORY_ENV_VAR: &str = "ROSTER_HISTORY";

pub trait LineSource {
    /// Blocks for one line. `Ok(None)` means end of input.
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;

    fn add_history(&mut self, _line: &str) {}

    fn close(&mut self) {}
}

pub fn history_path() -> Option<PathBuf> {
    if let Ok(custom_path) = env::var(HISTORY_ENV_VAR) {
        if custom_path.is_empty() {
            return None;
        }
        return Some(PathBuf::from(custom_path));
    }

    env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(DEFAULT_HISTORY_FILE))
}

pub struct Editor {
    inner: DefaultEditor,
    history_file: Option<PathBuf>,
}

impl Editor {
    pub fn new() -> io::Result<Self> {
        let mut inner = DefaultEditor::new().map_err(into_io)?;
        let history_file = history_path();

        if let Some(path) = &history_file {
            let _ = inner.load_history(path);
        }

        Ok(Self {
            inner,
            history_file,
        })
    }
}

impl LineSource for Editor {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        match self.inner.readline(prompt) {
            Ok(line) => Ok(Some(line)),
            // Ctrl+C drops the current line only; the loop treats it as blank.
            Err(ReadlineError::Interrupted) => Ok(Some(String::new())),
            Err(ReadlineError::Eof) => Ok(None),
            Err(err) => Err(into_io(err)),
        }
    }

    fn add_history(&mut self, line: &str) {
        self.inner.add_history_entry(line).ok();
    }

    fn close(&mut self) {
        if let Some(path) = &self.history_file {
            if let Err(e) = self.inner.save_history(path) {
                warn!(error = %e, "could not save history");
            }
        }
    }
}

fn into_io(err: ReadlineError) -> io::Error {
    match err {
        ReadlineError::Io(e) => e,
        other => io::Error::new(io::ErrorKind::Other, other.to_string()),
    }
}

/// Feeds a fixed list of lines, then reports end of input.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    lines: VecDeque<String>,
    pub prompts: usize,
    pub history: Vec<String>,
}

impl ScriptedInput {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            prompts: 0,
            history: Vec::new(),
        }
    }
}

impl LineSource for ScriptedInput {
    fn read_line(&mut self, _prompt: &str) -> io::Result<Option<String>> {
        self.prompts += 1;
        Ok(self.lines.pop_front())
    }

    fn add_history(&mut self, line: &str) {
        self.history.push(line.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env mutation is confined to this one test.
    #[test]
    fn history_path_follows_env() {
        env::set_var(HISTORY_ENV_VAR, "/custom/path");
        assert_eq!(history_path(), Some(PathBuf::from("/custom/path")));

        env::set_var(HISTORY_ENV_VAR, "");
        assert_eq!(history_path(), None);

        env::remove_var(HISTORY_ENV_VAR);
        if let Some(path) = history_path() {
            assert!(path.to_string_lossy().ends_with(DEFAULT_HISTORY_FILE));
        }
    }

    #[test]
    fn scripted_input_ends_with_none() {
        let mut input = ScriptedInput::new(["list", "exit"]);
        assert_eq!(input.read_line("> ").unwrap().as_deref(), Some("list"));
        assert_eq!(input.read_line("> ").unwrap().as_deref(), Some("exit"));
        assert_eq!(input.read_line("> ").unwrap(), None);
        assert_eq!(input.prompts, 3);
    }
}
