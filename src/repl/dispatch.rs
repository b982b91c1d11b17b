use tracing::debug;

use super::command::Command;
use crate::db::introspect::{self, ColumnDescription};
use crate::db::{person, query, Database, DbError, Person, Result};
use crate::table::Table;

/// What a successfully dispatched command produced.
#[derive(Debug, Clone)]
pub enum Outcome {
    Added(Person),
    Updated(Person),
    Deleted { id: i64 },
    /// A referenced person or table is absent. Not an error.
    NotFound(String),
    People(Vec<Person>),
    Rows(Table),
    Tables(Vec<String>),
    Columns {
        table: String,
        columns: Vec<ColumnDescription>,
    },
    Help,
    Exit,
}

/// Runs `command` against `db`. Missing ids and tables become
/// [`Outcome::NotFound`]; every other failure is returned for reporting.
pub fn execute(db: &Database, command: Command) -> Result<Outcome> {
    debug!(kind = ?command.kind(), "dispatching command");

    let outcome = match command {
        Command::Add(new_person) => person::create(db, &new_person).map(Outcome::Added),
        Command::Delete { id } => person::delete(db, id).map(|removed| {
            if removed {
                Outcome::Deleted { id }
            } else {
                Outcome::NotFound(DbError::NotFound(format!("Person with id {}", id)).to_string())
            }
        }),
        Command::Update { id, person: fields } => {
            person::update(db, id, &fields).map(Outcome::Updated)
        }
        Command::List => person::find_all(db).map(Outcome::People),
        Command::Tables => introspect::list_tables(db).map(Outcome::Tables),
        Command::Info { table } => {
            introspect::describe_table(db, &table).map(|columns| Outcome::Columns { table, columns })
        }
        Command::Query { sql } => query::execute(db, &sql).map(Outcome::Rows),
        Command::Help => Ok(Outcome::Help),
        Command::Exit => Ok(Outcome::Exit),
    };

    match outcome {
        Err(e) if e.is_not_found() => Ok(Outcome::NotFound(e.to_string())),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{schema, NewPerson, PERSON_SCHEMA};

    fn setup() -> Database {
        let db = Database::open_in_memory().unwrap();
        schema::sync(&db, &PERSON_SCHEMA).unwrap();
        db
    }

    #[test]
    fn test_delete_missing_is_not_found() {
        let db = setup();
        match execute(&db, Command::Delete { id: 3 }).unwrap() {
            Outcome::NotFound(msg) => assert_eq!(msg, "Person with id 3 not found"),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let db = setup();
        let outcome = execute(
            &db,
            Command::Update {
                id: 8,
                person: NewPerson::new("A", "B", 1),
            },
        )
        .unwrap();
        assert!(matches!(outcome, Outcome::NotFound(_)));
    }

    #[test]
    fn test_info_missing_table_is_not_found() {
        let db = setup();
        match execute(&db, Command::Info { table: "nonexistent_table".to_string() }).unwrap() {
            Outcome::NotFound(msg) => assert_eq!(msg, "Table does not exist: nonexistent_table"),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_query_errors_propagate() {
        let db = setup();
        let err = execute(
            &db,
            Command::Query {
                sql: "SELECT * FROM nonexistent_table".to_string(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, DbError::Query(_)));
    }

    #[test]
    fn test_add_then_list() {
        let db = setup();
        execute(&db, Command::Add(NewPerson::new("Doe", "John", 30))).unwrap();

        match execute(&db, Command::List).unwrap() {
            Outcome::People(people) => {
                assert_eq!(people.len(), 1);
                assert_eq!(people[0].last_name, "Doe");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }
}
