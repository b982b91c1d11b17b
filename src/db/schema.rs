//! Static record schemas and the startup synchronizer that reconciles them
//! with the live database.
//!
//! A missing table is created and missing columns are appended with
//! `ALTER TABLE ... ADD COLUMN`. SQLite cannot change a column's type or
//! nullability in place, so when a declared column differs the table is
//! rebuilt: rows are copied into a fresh table (NULLs in required columns get
//! the backfill value), the old table is dropped and the copy takes its name.
//! Columns the schema does not know about are carried over as they are.

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, warn};

use super::connection::Database;
use super::error::{DbError, Result};
use super::introspect::{self, ColumnDescription};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Integer,
    Text,
    /// RFC 3339 text.
    Timestamp,
}

impl FieldType {
    pub fn sql_type(self) -> &'static str {
        match self {
            FieldType::Integer => "INTEGER",
            FieldType::Text | FieldType::Timestamp => "TEXT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub field_type: FieldType,
    pub nullable: bool,
    pub primary_key: bool,
    /// SQL literal used for existing rows when the column is added later.
    pub backfill: Option<&'static str>,
}

impl FieldDef {
    const fn required(name: &'static str, field_type: FieldType, backfill: &'static str) -> Self {
        Self {
            name,
            field_type,
            nullable: false,
            primary_key: false,
            backfill: Some(backfill),
        }
    }

    fn create_sql(&self) -> String {
        let mut sql = format!("{} {}", quote_ident(self.name), self.field_type.sql_type());
        if self.primary_key {
            sql.push_str(" PRIMARY KEY AUTOINCREMENT");
        } else if !self.nullable {
            sql.push_str(" NOT NULL");
        }
        sql
    }

    fn add_column_sql(&self) -> Result<String> {
        if self.primary_key {
            return Err(DbError::Schema(format!(
                "primary key column '{}' cannot be added to an existing table",
                self.name
            )));
        }
        let mut sql = format!("{} {}", quote_ident(self.name), self.field_type.sql_type());
        if !self.nullable {
            let backfill = self.backfill.ok_or_else(|| {
                DbError::Schema(format!(
                    "required column '{}' has no backfill value",
                    self.name
                ))
            })?;
            sql.push_str(&format!(" NOT NULL DEFAULT {}", backfill));
        }
        Ok(sql)
    }

    fn diverges_from(&self, live: &ColumnDescription) -> bool {
        let type_differs = !live
            .data_type
            .eq_ignore_ascii_case(self.field_type.sql_type());
        let nullability_differs = !self.primary_key && live.allow_null != self.nullable;
        type_differs || nullability_differs
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    pub name: &'static str,
    pub fields: &'static [FieldDef],
}

impl TableSchema {
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name.eq_ignore_ascii_case(name))
    }

    pub fn create_table_sql(&self) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            quote_ident(self.name),
            self.column_defs().join(", ")
        )
    }

    fn column_defs(&self) -> Vec<String> {
        self.fields.iter().map(FieldDef::create_sql).collect()
    }
}

pub const PERSON_SCHEMA: TableSchema = TableSchema {
    name: "Persons",
    fields: &[
        FieldDef {
            name: "id",
            field_type: FieldType::Integer,
            nullable: false,
            primary_key: true,
            backfill: None,
        },
        FieldDef::required("LastName", FieldType::Text, "''"),
        FieldDef::required("FirstName", FieldType::Text, "''"),
        FieldDef::required("Age", FieldType::Integer, "0"),
        FieldDef::required("createdAt", FieldType::Timestamp, "'1970-01-01T00:00:00.000Z'"),
        FieldDef::required("updatedAt", FieldType::Timestamp, "'1970-01-01T00:00:00.000Z'"),
    ],
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub created: bool,
    pub added_columns: Vec<String>,
    /// Declared columns whose live type or nullability differed.
    pub divergent_columns: Vec<String>,
    pub rebuilt: bool,
}

impl SyncReport {
    /// True when the live table already matched and nothing was altered.
    pub fn is_noop(&self) -> bool {
        !self.created && !self.rebuilt && self.added_columns.is_empty()
    }
}

pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Makes the live table match `schema`. Runs in one transaction, so a failed
/// alteration leaves the table as it was.
pub fn sync(db: &Database, schema: &TableSchema) -> Result<SyncReport> {
    let tx = db
        .connection()
        .unchecked_transaction()
        .map_err(|e| DbError::Schema(e.to_string()))?;

    let mut report = SyncReport::default();

    match introspect::describe_table(db, schema.name) {
        Err(DbError::TableNotFound(_)) => {
            let sql = schema.create_table_sql();
            debug!(sql = %sql, "creating table");
            tx.execute(&sql, [])
                .map_err(|e| DbError::Schema(e.to_string()))?;
            report.created = true;
        }
        Err(e) => return Err(DbError::Schema(e.to_string())),
        Ok(live) => {
            for field in schema.fields {
                match live.iter().find(|c| c.name.eq_ignore_ascii_case(field.name)) {
                    Some(column) if field.diverges_from(column) => {
                        warn!(
                            table = schema.name,
                            column = field.name,
                            live_type = %column.data_type,
                            live_nullable = column.allow_null,
                            "column differs from declared schema"
                        );
                        report.divergent_columns.push(field.name.to_string());
                    }
                    Some(_) => {}
                    None => report.added_columns.push(field.name.to_string()),
                }
            }

            if report.divergent_columns.is_empty() {
                for name in &report.added_columns {
                    let field = schema.field(name).ok_or_else(|| {
                        DbError::Schema(format!("unknown column '{}'", name))
                    })?;
                    let sql = format!(
                        "ALTER TABLE {} ADD COLUMN {}",
                        quote_ident(schema.name),
                        field.add_column_sql()?
                    );
                    debug!(sql = %sql, "adding column");
                    tx.execute(&sql, [])
                        .map_err(|e| DbError::Schema(e.to_string()))?;
                }
            } else {
                rebuild(&tx, schema, &live)?;
                report.rebuilt = true;
            }
        }
    }

    tx.commit().map_err(|e| DbError::Schema(e.to_string()))?;

    info!(
        table = schema.name,
        created = report.created,
        added = report.added_columns.len(),
        rebuilt = report.rebuilt,
        "schema synchronized"
    );
    Ok(report)
}

/// Recreates `schema.name` with the declared column definitions and copies
/// every row across. The AUTOINCREMENT high-water mark is carried over so
/// deleted ids stay retired.
fn rebuild(conn: &Connection, schema: &TableSchema, live: &[ColumnDescription]) -> Result<()> {
    let table = quote_ident(schema.name);
    let backup = quote_ident(&format!("{}_backup", schema.name));

    let mut column_defs = schema.column_defs();
    let mut targets = Vec::new();
    let mut sources = Vec::new();

    for field in schema.fields {
        let present = live.iter().any(|c| c.name.eq_ignore_ascii_case(field.name));
        let source = match (present, field.backfill) {
            (true, Some(backfill)) if !field.nullable => {
                format!("COALESCE({}, {})", quote_ident(field.name), backfill)
            }
            (true, _) => quote_ident(field.name),
            (false, Some(backfill)) => backfill.to_string(),
            (false, None) => continue,
        };
        targets.push(quote_ident(field.name));
        sources.push(source);
    }

    for column in live.iter().filter(|c| schema.field(&c.name).is_none()) {
        let mut def = format!("{} {}", quote_ident(&column.name), column.data_type);
        if let Some(default) = &column.default_value {
            def.push_str(&format!(" DEFAULT {}", default));
        }
        column_defs.push(def);
        targets.push(quote_ident(&column.name));
        sources.push(quote_ident(&column.name));
    }

    let sequence = autoincrement_seq(conn, schema.name)?;

    let statements = [
        format!("DROP TABLE IF EXISTS {}", backup),
        format!("CREATE TABLE {} ({})", backup, column_defs.join(", ")),
        format!(
            "INSERT INTO {} ({}) SELECT {} FROM {}",
            backup,
            targets.join(", "),
            sources.join(", "),
            table
        ),
        format!("DROP TABLE {}", table),
        format!("ALTER TABLE {} RENAME TO {}", backup, table),
    ];
    for sql in &statements {
        debug!(sql = %sql, "rebuilding table");
        conn.execute(sql, [])
            .map_err(|e| DbError::Schema(e.to_string()))?;
    }

    if let Some(seq) = sequence {
        let updated = conn
            .execute(
                "UPDATE sqlite_sequence SET seq = MAX(seq, ?1) WHERE name = ?2",
                params![seq, schema.name],
            )
            .map_err(|e| DbError::Schema(e.to_string()))?;
        if updated == 0 {
            conn.execute(
                "INSERT INTO sqlite_sequence (name, seq) VALUES (?1, ?2)",
                params![schema.name, seq],
            )
            .map_err(|e| DbError::Schema(e.to_string()))?;
        }
    }

    Ok(())
}

fn autoincrement_seq(conn: &Connection, table: &str) -> Result<Option<i64>> {
    let has_sequences: bool = conn
        .query_row(
            "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'sqlite_sequence')",
            [],
            |row| row.get(0),
        )
        .map_err(|e| DbError::Schema(e.to_string()))?;
    if !has_sequences {
        return Ok(None);
    }

    conn.query_row(
        "SELECT seq FROM sqlite_sequence WHERE name = ?1",
        [table],
        |row| row.get(0),
    )
    .optional()
    .map_err(|e| DbError::Schema(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_table_sql() {
        let sql = PERSON_SCHEMA.create_table_sql();
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS \"Persons\""));
        assert!(sql.contains("\"id\" INTEGER PRIMARY KEY AUTOINCREMENT"));
        assert!(sql.contains("\"LastName\" TEXT NOT NULL"));
        assert!(sql.contains("\"Age\" INTEGER NOT NULL"));
    }

    #[test]
    fn test_quote_ident_escapes_quotes() {
        assert_eq!(quote_ident("odd\"name"), "\"odd\"\"name\"");
    }

    #[test]
    fn test_field_lookup_is_case_insensitive() {
        assert!(PERSON_SCHEMA.field("lastname").is_some());
        assert!(PERSON_SCHEMA.field("missing").is_none());
    }

    #[test]
    fn test_primary_key_cannot_be_added_later() {
        let id = PERSON_SCHEMA.field("id").unwrap();
        assert!(matches!(id.add_column_sql(), Err(DbError::Schema(_))));
    }

    #[test]
    fn test_sync_rebuilds_nullable_required_column() {
        let db = Database::open_in_memory().unwrap();
        db.connection()
            .execute_batch(
                r#"
                CREATE TABLE "Persons" (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    LastName TEXT,
                    FirstName TEXT NOT NULL
                );
                INSERT INTO "Persons" (LastName, FirstName) VALUES ('Doe', 'John');
                INSERT INTO "Persons" (LastName, FirstName) VALUES (NULL, 'Jane');
                "#,
            )
            .unwrap();

        let report = sync(&db, &PERSON_SCHEMA).unwrap();
        assert!(report.rebuilt);
        assert_eq!(report.divergent_columns, vec!["LastName"]);
        assert_eq!(report.added_columns, vec!["Age", "createdAt", "updatedAt"]);

        let columns = introspect::describe_table(&db, "Persons").unwrap();
        let last_name = columns.iter().find(|c| c.name == "LastName").unwrap();
        assert!(!last_name.allow_null);

        let second = sync(&db, &PERSON_SCHEMA).unwrap();
        assert!(second.is_noop());
        assert!(second.divergent_columns.is_empty());
    }

    #[test]
    fn test_sync_creates_then_is_idempotent() {
        let db = Database::open_in_memory().unwrap();

        let first = sync(&db, &PERSON_SCHEMA).unwrap();
        assert!(first.created);

        let second = sync(&db, &PERSON_SCHEMA).unwrap();
        assert!(second.is_noop());
        assert!(second.divergent_columns.is_empty());
    }
}
