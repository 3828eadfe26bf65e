//! SQL export
//!
//! Emits a `DROP TABLE` / `CREATE TABLE` pair for the form followed by one
//! `INSERT` per entry. Inserts are sparse: only fields with a value are
//! listed, so column and value lists always line up. Identifiers are
//! double-quoted so reserved words and leading digits stay valid.

use std::collections::HashSet;

use crate::domain::{Entry, FieldKind, Form, NumberType, Value};

/// Generated primary key column
const KEY_COLUMN: &str = "id";

/// Table or column name with spaces as underscores and other symbols dropped
pub fn sql_identifier(name: &str) -> String {
    name.chars()
        .map(|c| if c == ' ' { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

fn table_name(form: &Form) -> String {
    let name = sql_identifier(&form.name);
    if name.is_empty() {
        "entries".to_string()
    } else {
        name
    }
}

fn quoted(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

/// Column name of each field, in form order
///
/// Names are sanitized like the table name. An empty result becomes
/// `field`, and a name already taken by the key column or an earlier field
/// (compared without case, as SQLite does) gets a `_2`, `_3`, ... suffix.
fn column_names(form: &Form) -> Vec<String> {
    let mut taken = HashSet::from([KEY_COLUMN.to_string()]);

    form.fields()
        .iter()
        .map(|field| {
            let base = match sql_identifier(&field.name) {
                name if name.is_empty() => "field".to_string(),
                name => name,
            };
            let mut name = base.clone();
            let mut suffix = 2;
            while !taken.insert(name.to_ascii_lowercase()) {
                name = format!("{}_{}", base, suffix);
                suffix += 1;
            }
            name
        })
        .collect()
}

fn column_type(kind: &FieldKind) -> &'static str {
    match kind {
        FieldKind::Text | FieldKind::Choice(_) => "TEXT",
        FieldKind::Number(NumberType::Int) => "INTEGER",
        FieldKind::Number(NumberType::Float | NumberType::Double) => "REAL",
    }
}

fn literal(value: &Value) -> String {
    match value {
        Value::Text(text) => format!("'{}'", text.replace('\'', "''")),
        number if number.is_non_finite() => "NULL".to_string(),
        number => number.to_string(),
    }
}

pub fn render_sql(form: &Form, entries: &[Entry]) -> String {
    let table = quoted(&table_name(form));
    let column_names = column_names(form);
    let mut out = String::new();

    out.push_str(&format!("DROP TABLE IF EXISTS {};\n", table));
    out.push_str(&format!("CREATE TABLE {} (\n", table));
    out.push_str(&format!("    {} INTEGER PRIMARY KEY AUTOINCREMENT", quoted(KEY_COLUMN)));
    for (field, column) in form.fields().iter().zip(&column_names) {
        out.push_str(&format!(",\n    {} {}", quoted(column), column_type(&field.kind)));
    }
    out.push_str("\n);\n\n");

    for entry in entries {
        let (columns, values): (Vec<String>, Vec<String>) = form
            .fields()
            .iter()
            .zip(&column_names)
            .filter_map(|(field, column)| {
                entry
                    .value_for(field)
                    .map(|value| (quoted(column), literal(value)))
            })
            .unzip();

        if columns.is_empty() {
            out.push_str(&format!("INSERT INTO {} DEFAULT VALUES;\n", table));
        } else {
            out.push_str(&format!(
                "INSERT INTO {} ({}) VALUES ({});\n",
                table,
                columns.join(", "),
                values.join(", ")
            ));
        }
    }

    out
}
