//! # Interactive Command Line
//!
//! ## Module Organization
//!
//! - `command`: line tokenizing, arity and argument validation
//! - `dispatch`: maps a validated command onto one database operation
//! - `render`: ASCII tables and one-line messages for outcomes and errors
//! - `input`: line sources (rustyline editor, scripted input) and history
//! - `session`: the read-eval-print loop

pub mod command;
pub mod dispatch;
pub mod input;
pub mod render;
pub mod session;

pub use command::{Command, CommandError, CommandKind, HELP_TEXT};
pub use dispatch::{execute, Outcome};
pub use input::{Editor, LineSource, ScriptedInput};
pub use session::{Flow, Repl, FAREWELL, PROMPT};
