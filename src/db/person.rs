//! CRUD over the `Persons` table.
//!
//! Nothing is cached: every call goes to the backend.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension, Row};
use serde::{Serialize, Serializer};
use tracing::debug;

use super::connection::Database;
use super::error::{DbError, Result};
use super::schema::{quote_ident, PERSON_SCHEMA};

const COLUMNS: &str = "\"id\", \"LastName\", \"FirstName\", \"Age\", \"createdAt\", \"updatedAt\"";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Person {
    pub id: i64,
    #[serde(rename = "LastName")]
    pub last_name: String,
    #[serde(rename = "FirstName")]
    pub first_name: String,
    #[serde(rename = "Age")]
    pub age: i32,
    #[serde(rename = "createdAt", serialize_with = "serialize_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt", serialize_with = "serialize_timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Person {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            last_name: row.get(1)?,
            first_name: row.get(2)?,
            age: row.get(3)?,
            created_at: parse_timestamp(row, 4)?,
            updated_at: parse_timestamp(row, 5)?,
        })
    }

    /// One-line JSON, keyed by column name.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{{\"id\":{}}}", self.id))
    }
}

/// The mutable fields of a person, as supplied by `add` and `update`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPerson {
    pub last_name: String,
    pub first_name: String,
    pub age: i32,
}

impl NewPerson {
    pub fn new(last_name: impl Into<String>, first_name: impl Into<String>, age: i32) -> Self {
        Self {
            last_name: last_name.into(),
            first_name: first_name.into(),
            age,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.last_name.trim().is_empty() {
            return Err(DbError::Validation("last name is required".to_string()));
        }
        if self.first_name.trim().is_empty() {
            return Err(DbError::Validation("first name is required".to_string()));
        }
        Ok(())
    }
}

fn table() -> String {
    quote_ident(PERSON_SCHEMA.name)
}

fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// RFC 3339 with milliseconds and a `Z` suffix, as stored and echoed.
pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn serialize_timestamp<S: Serializer>(
    ts: &DateTime<Utc>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_timestamp(ts))
}

fn parse_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&text)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub fn create(db: &Database, person: &NewPerson) -> Result<Person> {
    person.validate()?;

    let ts = now();
    let sql = format!(
        "INSERT INTO {} (\"LastName\", \"FirstName\", \"Age\", \"createdAt\", \"updatedAt\") VALUES (?1, ?2, ?3, ?4, ?4)",
        table()
    );
    db.connection().execute(
        &sql,
        params![
            person.last_name,
            person.first_name,
            person.age,
            format_timestamp(&ts)
        ],
    )?;
    let id = db.connection().last_insert_rowid();
    debug!(id, "person created");

    Ok(Person {
        id,
        last_name: person.last_name.clone(),
        first_name: person.first_name.clone(),
        age: person.age,
        created_at: ts,
        updated_at: ts,
    })
}

pub fn find_all(db: &Database) -> Result<Vec<Person>> {
    let sql = format!("SELECT {} FROM {} ORDER BY \"id\"", COLUMNS, table());
    let mut stmt = db.connection().prepare(&sql)?;
    let people = stmt
        .query_map([], Person::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    debug!(count = people.len(), "fetched persons");
    Ok(people)
}

pub fn find_by_id(db: &Database, id: i64) -> Result<Option<Person>> {
    let sql = format!("SELECT {} FROM {} WHERE \"id\" = ?1", COLUMNS, table());
    let person = db
        .connection()
        .query_row(&sql, [id], Person::from_row)
        .optional()?;
    Ok(person)
}

/// Overwrites all three mutable fields of person `id`; the id and
/// `createdAt` stay as they were.
pub fn update(db: &Database, id: i64, person: &NewPerson) -> Result<Person> {
    person.validate()?;

    let existing = find_by_id(db, id)?
        .ok_or_else(|| DbError::NotFound(format!("Person with id {}", id)))?;

    let ts = now();
    let sql = format!(
        "UPDATE {} SET \"LastName\" = ?1, \"FirstName\" = ?2, \"Age\" = ?3, \"updatedAt\" = ?4 WHERE \"id\" = ?5",
        table()
    );
    let changed = db.connection().execute(
        &sql,
        params![
            person.last_name,
            person.first_name,
            person.age,
            format_timestamp(&ts),
            id
        ],
    )?;
    if changed == 0 {
        return Err(DbError::NotFound(format!("Person with id {}", id)));
    }
    debug!(id, "person updated");

    Ok(Person {
        id,
        last_name: person.last_name.clone(),
        first_name: person.first_name.clone(),
        age: person.age,
        created_at: existing.created_at,
        updated_at: ts,
    })
}

/// Returns whether a row was removed.
pub fn delete(db: &Database, id: i64) -> Result<bool> {
    let sql = format!("DELETE FROM {} WHERE \"id\" = ?1", table());
    let removed = db.connection().execute(&sql, [id])?;
    debug!(id, removed, "person delete");
    Ok(removed > 0)
}

pub fn count(db: &Database) -> Result<usize> {
    let sql = format!("SELECT COUNT(*) FROM {}", table());
    let n: i64 = db.connection().query_row(&sql, [], |row| row.get(0))?;
    Ok(n as usize)
}
