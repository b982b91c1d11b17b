use tracing::debug;

use super::connection::Database;
use super::error::{DbError, Result};

/// Column metadata as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescription {
    pub name: String,
    pub data_type: String,
    pub allow_null: bool,
    pub default_value: Option<String>,
    pub primary_key: bool,
}

pub fn list_tables(db: &Database) -> Result<Vec<String>> {
    let mut stmt = db.connection().prepare(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )?;

    let tables = stmt
        .query_map([], |row| row.get(0))?
        .collect::<std::result::Result<Vec<String>, _>>()?;

    debug!(count = tables.len(), "listed tables");
    Ok(tables)
}

/// Describes `table_name` column by column, in declaration order.
pub fn describe_table(db: &Database, table_name: &str) -> Result<Vec<ColumnDescription>> {
    let mut stmt = db.connection().prepare(
        "SELECT name, type, \"notnull\", dflt_value, pk FROM pragma_table_info(?1) ORDER BY cid",
    )?;

    let columns = stmt
        .query_map([table_name], |row| {
            let not_null: i64 = row.get(2)?;
            let pk: i64 = row.get(4)?;
            Ok(ColumnDescription {
                name: row.get(0)?,
                data_type: row.get(1)?,
                allow_null: not_null == 0,
                default_value: row.get(3)?,
                primary_key: pk > 0,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    if columns.is_empty() {
        return Err(DbError::TableNotFound(table_name.to_string()));
    }

    debug!(table = table_name, columns = columns.len(), "described table");
    Ok(columns)
}
