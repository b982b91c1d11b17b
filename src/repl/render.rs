//! # Result Rendering
//!
//! Turns dispatch outcomes and errors into text. Row sets are drawn as ASCII
//! boxes:
//!
//! ```text
//! +----+----------+-----------+-----+
//! | id | LastName | FirstName | Age |
//! +----+----------+-----------+-----+
//! | 1  | Doe      | John      | 30  |
//! +----+----------+-----------+-----+
//! 1 row in set
//! ```
//!
//! Column widths are the widest of header and values, capped at
//! `MAX_COLUMN_WIDTH` (longer cells are cut and end in `...`). Rendering never
//! fails; the caller decides where the text goes.

use std::fmt::{self, Write};

use super::command::HELP_TEXT;
use super::dispatch::Outcome;
use crate::db::introspect::ColumnDescription;
use crate::db::person::format_timestamp;
use crate::db::Person;
use crate::table::Table;

const MAX_COLUMN_WIDTH: usize = 50;
const ERROR_PREFIX: &str = "Error: ";

pub struct TableFormatter {
    headers: Vec<String>,
    widths: Vec<usize>,
    rows: Vec<Vec<String>>,
}

impl TableFormatter {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let mut widths: Vec<usize> = headers.iter().map(|h| cell_width(h)).collect();

        for row in &rows {
            for (i, value) in row.iter().enumerate() {
                if i < widths.len() {
                    widths[i] = widths[i].max(cell_width(value));
                }
            }
        }

        Self {
            headers,
            widths,
            rows,
        }
    }

    pub fn from_table(table: &Table) -> Self {
        let headers = table
            .schema
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();
        let rows = table
            .iter()
            .map(|row| row.values.iter().map(|v| v.to_string()).collect())
            .collect();
        Self::new(headers, rows)
    }

    pub fn render(&self) -> String {
        let mut output = String::new();

        self.write_separator(&mut output);
        self.write_row(&mut output, &self.headers);
        self.write_separator(&mut output);

        for row in &self.rows {
            self.write_row(&mut output, row);
        }

        self.write_separator(&mut output);
        let _ = write!(output, "{}", rows_in_set(self.rows.len()));

        output
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn write_separator(&self, output: &mut String) {
        output.push('+');
        for width in &self.widths {
            output.push_str(&"-".repeat(width + 2));
            output.push('+');
        }
        output.push('\n');
    }

    fn write_row(&self, output: &mut String, row: &[String]) {
        output.push('|');
        for (i, width) in self.widths.iter().enumerate() {
            let value = row.get(i).map(String::as_str).unwrap_or("");
            let cell = truncate(value, *width);
            let pad = width.saturating_sub(cell.chars().count());
            let _ = write!(output, " {}{} |", cell, " ".repeat(pad));
        }
        output.push('\n');
    }
}

fn cell_width(value: &str) -> usize {
    value.chars().count().clamp(1, MAX_COLUMN_WIDTH)
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        value.to_string()
    } else if width <= 3 {
        value.chars().take(width).collect()
    } else {
        let mut cut: String = value.chars().take(width - 3).collect();
        cut.push_str("...");
        cut
    }
}

fn rows_in_set(n: usize) -> String {
    format!("{} row{} in set", n, if n == 1 { "" } else { "s" })
}

fn people_formatter(people: &[Person]) -> TableFormatter {
    let headers = ["id", "LastName", "FirstName", "Age", "createdAt", "updatedAt"]
        .iter()
        .map(|h| h.to_string())
        .collect();
    let rows = people
        .iter()
        .map(|p| {
            vec![
                p.id.to_string(),
                p.last_name.clone(),
                p.first_name.clone(),
                p.age.to_string(),
                format_timestamp(&p.created_at),
                format_timestamp(&p.updated_at),
            ]
        })
        .collect();
    TableFormatter::new(headers, rows)
}

fn columns_formatter(columns: &[ColumnDescription]) -> TableFormatter {
    let headers = ["column", "type", "allowNull", "defaultValue", "primaryKey"]
        .iter()
        .map(|h| h.to_string())
        .collect();
    let rows = columns
        .iter()
        .map(|c| {
            vec![
                c.name.clone(),
                c.data_type.clone(),
                c.allow_null.to_string(),
                c.default_value.clone().unwrap_or_else(|| "NULL".to_string()),
                c.primary_key.to_string(),
            ]
        })
        .collect();
    TableFormatter::new(headers, rows)
}

/// Text for a successful outcome. `Exit` renders as nothing; the loop
/// prints its own farewell.
pub fn render_outcome(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Added(person) => format!("Person added: {}", person.to_json()),
        Outcome::Updated(person) => format!("Person updated: {}", person.to_json()),
        Outcome::Deleted { id } => format!("Person deleted (id {})", id),
        Outcome::NotFound(what) => what.clone(),
        Outcome::People(people) if people.is_empty() => "No persons found".to_string(),
        Outcome::People(people) => people_formatter(people).render(),
        Outcome::Rows(table) if table.is_empty() => "No results".to_string(),
        Outcome::Rows(table) => TableFormatter::from_table(table).render(),
        Outcome::Tables(tables) if tables.is_empty() => "No tables found".to_string(),
        Outcome::Tables(tables) => {
            let rows = tables.iter().map(|t| vec![t.clone()]).collect();
            TableFormatter::new(vec!["table".to_string()], rows).render()
        }
        Outcome::Columns { columns, .. } => columns_formatter(columns).render(),
        Outcome::Help => HELP_TEXT.to_string(),
        Outcome::Exit => String::new(),
    }
}

/// One line, prefixed so it stands apart from normal output.
pub fn render_error(err: &dyn fmt::Display) -> String {
    let message = err.to_string();
    let first_line = message.lines().next().unwrap_or("");
    format!("{}{}", ERROR_PREFIX, first_line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    use crate::db::DbError;
    use crate::table::{Row, Schema, Value};

    #[test]
    fn test_box_layout() {
        let formatter = TableFormatter::new(
            vec!["id".to_string(), "name".to_string()],
            vec![
                vec!["1".to_string(), "Alice".to_string()],
                vec!["22".to_string(), "Bo".to_string()],
            ],
        );
        let expected = "\
+----+-------+
| id | name  |
+----+-------+
| 1  | Alice |
| 22 | Bo    |
+----+-------+
2 rows in set";
        assert_eq!(formatter.render(), expected);
        assert_eq!(formatter.row_count(), 2);
    }

    #[test]
    fn test_long_cells_are_truncated() {
        let long = "x".repeat(80);
        let formatter = TableFormatter::new(vec!["v".to_string()], vec![vec![long]]);
        let rendered = formatter.render();
        let data_line = rendered.lines().nth(3).unwrap();

        assert!(data_line.contains("..."));
        assert_eq!(data_line.chars().count(), MAX_COLUMN_WIDTH + 4);
    }

    #[test]
    fn test_empty_rows_report_no_results() {
        let table = Table::new(Schema::from_names(["x"]));
        assert_eq!(render_outcome(&Outcome::Rows(table)), "No results");
        assert_eq!(render_outcome(&Outcome::People(vec![])), "No persons found");
    }

    #[test]
    fn test_rows_render_nulls() {
        let mut table = Table::new(Schema::from_names(["a"]));
        table.add_row(Row::new(vec![Value::Null]));
        let rendered = render_outcome(&Outcome::Rows(table));
        assert!(rendered.contains("| NULL |"));
        assert!(rendered.ends_with("1 row in set"));
    }

    #[test]
    fn test_list_timestamps_match_json_echo() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let person = Person {
            id: 1,
            last_name: "Doe".to_string(),
            first_name: "John".to_string(),
            age: 30,
            created_at: ts,
            updated_at: ts,
        };

        let listed = render_outcome(&Outcome::People(vec![person.clone()]));
        let echoed = render_outcome(&Outcome::Added(person));
        assert!(listed.contains("| 2024-05-01T12:30:00.000Z |"));
        assert!(echoed.contains("\"createdAt\":\"2024-05-01T12:30:00.000Z\""));
        assert!(!listed.contains("+00:00"));
    }

    #[test]
    fn test_render_error_is_single_prefixed_line() {
        let rendered = render_error(&DbError::Query("near \"SELEC\": syntax error\nmore".to_string()));
        assert_eq!(rendered, "Error: Query error: near \"SELEC\": syntax error");
    }

    #[test]
    fn test_deleted_and_help() {
        assert_eq!(render_outcome(&Outcome::Deleted { id: 4 }), "Person deleted (id 4)");
        assert_eq!(render_outcome(&Outcome::Help), HELP_TEXT);
        assert_eq!(render_outcome(&Outcome::Exit), "");
    }
}
