use rusqlite::Batch;
use tracing::debug;

use super::connection::Database;
use super::error::{DbError, Result};
use crate::table::{Row, Schema, Table, Value};

/// Runs one read-only statement and collects its rows. Anything the backend
/// rejects, an empty line, more than one statement, and any statement that
/// would write all come back as [`DbError::Query`].
pub fn execute(db: &Database, sql: &str) -> Result<Table> {
    debug!(sql, "raw query");

    let mut batch = Batch::new(db.connection(), sql);
    let mut stmt = batch
        .next()
        .map_err(|e| DbError::Query(e.to_string()))?
        .ok_or_else(|| DbError::Query("empty statement".to_string()))?;
    if batch
        .next()
        .map_err(|e| DbError::Query(e.to_string()))?
        .is_some()
    {
        return Err(DbError::Query(
            "only one statement is allowed".to_string(),
        ));
    }

    if !stmt.readonly() {
        return Err(DbError::Query(
            "only read-only statements are allowed".to_string(),
        ));
    }

    let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let column_count = names.len();
    let mut table = Table::new(Schema::from_names(names));

    let mut rows = stmt.query([]).map_err(|e| DbError::Query(e.to_string()))?;
    while let Some(row) = rows.next().map_err(|e| DbError::Query(e.to_string()))? {
        let mut values = Vec::with_capacity(column_count);
        for i in 0..column_count {
            let value = row.get_ref(i).map_err(|e| DbError::Query(e.to_string()))?;
            values.push(Value::from(value));
        }
        table.add_row(Row::new(values));
    }

    debug!(rows = table.row_count(), "raw query finished");
    Ok(table)
}
