pub mod cli;
pub mod db;
pub mod logging;
pub mod repl;
pub mod table;

pub use db::{Database, DbError, NewPerson, Person, Result as DbResult};
pub use table::{Row, Schema, Table, Value};
