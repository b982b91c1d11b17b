//! # Command Parsing
//!
//! Turns one input line into a typed [`Command`]. Lines are split on
//! whitespace; the first token names the command (case-insensitive) and the
//! rest are positional arguments. Arity and numeric arguments are checked
//! here, before anything touches the database, so a rejected line never has
//! side effects.
//!
//! | Command                                   | Arguments |
//! |-------------------------------------------|-----------|
//! | `add <LastName> <FirstName> <Age>`        | 3         |
//! | `delete <PersonID>`                       | 1         |
//! | `update <PersonID> <LastName> <FirstName> <Age>` | 4  |
//! | `list`, `tables`, `help`, `exit`          | 0         |
//! | `info <table_name>`                       | 1         |
//! | `query <sql...>`                          | 1 or more |
//!
//! Names and SQL cannot contain quoted spaces: `query` re-joins its tokens
//! with single spaces.

use thiserror::Error;

use crate::db::NewPerson;

pub const HELP_TEXT: &str =
    "Available commands: add, delete, update, list, tables, info <table_name>, query <sql>, help, exit";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("Invalid {field}: '{value}' is not an integer")]
    InvalidNumber { field: &'static str, value: String },

    #[error("Unknown command '{0}'. {}", HELP_TEXT)]
    Unknown(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Arity {
    Exact(usize),
    AtLeast(usize),
}

impl Arity {
    fn accepts(self, n: usize) -> bool {
        match self {
            Arity::Exact(expected) => n == expected,
            Arity::AtLeast(min) => n >= min,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Add,
    Delete,
    Update,
    List,
    Tables,
    Info,
    Query,
    Help,
    Exit,
}

impl CommandKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "add" => Some(CommandKind::Add),
            "delete" => Some(CommandKind::Delete),
            "update" => Some(CommandKind::Update),
            "list" => Some(CommandKind::List),
            "tables" => Some(CommandKind::Tables),
            "info" => Some(CommandKind::Info),
            "query" => Some(CommandKind::Query),
            "help" => Some(CommandKind::Help),
            "exit" | "quit" => Some(CommandKind::Exit),
            _ => None,
        }
    }

    fn arity(self) -> Arity {
        match self {
            CommandKind::Add => Arity::Exact(3),
            CommandKind::Delete | CommandKind::Info => Arity::Exact(1),
            CommandKind::Update => Arity::Exact(4),
            CommandKind::Query => Arity::AtLeast(1),
            CommandKind::List | CommandKind::Tables | CommandKind::Help | CommandKind::Exit => {
                Arity::Exact(0)
            }
        }
    }

    pub fn usage(self) -> &'static str {
        match self {
            CommandKind::Add => "add <LastName> <FirstName> <Age>",
            CommandKind::Delete => "delete <PersonID>",
            CommandKind::Update => "update <PersonID> <LastName> <FirstName> <Age>",
            CommandKind::List => "list",
            CommandKind::Tables => "tables",
            CommandKind::Info => "info <table_name>",
            CommandKind::Query => "query <sql>",
            CommandKind::Help => "help",
            CommandKind::Exit => "exit",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add(NewPerson),
    Delete { id: i64 },
    Update { id: i64, person: NewPerson },
    List,
    Tables,
    Info { table: String },
    Query { sql: String },
    Help,
    Exit,
}

impl Command {
    /// Parses one line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some((name, args)) = tokens.split_first() else {
            return Ok(None);
        };

        let kind =
            CommandKind::from_name(name).ok_or_else(|| CommandError::Unknown(name.to_string()))?;
        if !kind.arity().accepts(args.len()) {
            return Err(CommandError::Usage(kind.usage()));
        }

        let command = match kind {
            CommandKind::Add => Command::Add(NewPerson::new(
                args[0],
                args[1],
                parse_number(args[2], "Age")?,
            )),
            CommandKind::Delete => Command::Delete {
                id: parse_number(args[0], "PersonID")?,
            },
            CommandKind::Update => Command::Update {
                id: parse_number(args[0], "PersonID")?,
                person: NewPerson::new(args[1], args[2], parse_number(args[3], "Age")?),
            },
            CommandKind::List => Command::List,
            CommandKind::Tables => Command::Tables,
            CommandKind::Info => Command::Info {
                table: args[0].to_string(),
            },
            CommandKind::Query => Command::Query {
                sql: args.join(" "),
            },
            CommandKind::Help => Command::Help,
            CommandKind::Exit => Command::Exit,
        };

        Ok(Some(command))
    }

    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Add(_) => CommandKind::Add,
            Command::Delete { .. } => CommandKind::Delete,
            Command::Update { .. } => CommandKind::Update,
            Command::List => CommandKind::List,
            Command::Tables => CommandKind::Tables,
            Command::Info { .. } => CommandKind::Info,
            Command::Query { .. } => CommandKind::Query,
            Command::Help => CommandKind::Help,
            Command::Exit => CommandKind::Exit,
        }
    }
}

fn parse_number<T: std::str::FromStr>(value: &str, field: &'static str) -> Result<T, CommandError> {
    value.parse().map_err(|_| CommandError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}
