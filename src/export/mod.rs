//! # Exports
//!
//! Renders a form and its entries to external formats. Every renderer is a
//! pure function of `(form, entries)`; [`write_export`] puts the result on
//! disk.
//!
//! | Format | Output file |
//! |--------|-------------|
//! | CSV | `Forms/{name}_entries.csv` |
//! | JSON | `Forms/{name}_entries.json` |
//! | SQL (DDL + inserts) | `Forms/{name}_entries.sql` |
//!
//! A stored value whose kind does not match its field is treated as absent
//! by every renderer.

mod csv;
mod json;
mod sql;

use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::{Entry, Form};

pub use csv::render_csv;
pub use json::render_json;
pub use sql::{render_sql, sql_identifier};

/// Export target format
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
    Sql,
}

impl ExportFormat {
    /// File extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Sql => "sql",
        }
    }

    /// Renders the form and entries in this format
    pub fn render(&self, form: &Form, entries: &[Entry]) -> Result<String> {
        match self {
            ExportFormat::Csv => Ok(render_csv(form, entries)),
            ExportFormat::Json => render_json(form, entries),
            ExportFormat::Sql => Ok(render_sql(form, entries)),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExportFormat::Csv => "CSV",
            ExportFormat::Json => "JSON",
            ExportFormat::Sql => "SQL",
        })
    }
}

/// Default export file name for a form (`people_entries.csv`)
pub fn export_file_name(form_name: &str, format: ExportFormat) -> String {
    format!("{}_entries.{}", form_name, format.extension())
}

/// Renders and writes an export, replacing any existing file
pub fn write_export(path: &Path, format: ExportFormat, form: &Form, entries: &[Entry]) -> Result<()> {
    let rendered = format.render(form, entries)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, rendered)
        .with_context(|| format!("Failed to write {} export: {}", format, path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Field, NumberType};
    use tempfile::TempDir;

    fn people() -> (Form, Vec<Entry>) {
        let form = Form::with_fields(
            "people",
            [Field::text("Name"), Field::number("Age", NumberType::Int)],
        )
        .unwrap();
        let entries = vec![Entry::new(1).with("Name", "A\"B").with("Age", 30)];
        (form, entries)
    }

    #[test]
    fn each_codec_escapes_its_own_way() {
        let (form, entries) = people();

        let csv = ExportFormat::Csv.render(&form, &entries).unwrap();
        assert!(csv.lines().any(|l| l == "1,\"A'B\",30"));

        let json = ExportFormat::Json.render(&form, &entries).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(
            doc["entries"][0]["data"],
            serde_json::json!({ "Name": "A\"B", "Age": 30 })
        );

        let sql = ExportFormat::Sql.render(&form, &entries).unwrap();
        assert!(sql.contains("INSERT INTO \"people\" (\"Name\", \"Age\") VALUES ('A\"B', 30);"));
    }

    #[test]
    fn writes_file_with_default_name() {
        let dir = TempDir::new().unwrap();
        let (form, entries) = people();
        let path = dir
            .path()
            .join("Forms")
            .join(export_file_name(&form.name, ExportFormat::Sql));

        write_export(&path, ExportFormat::Sql, &form, &entries).unwrap();

        assert!(path.ends_with("Forms/people_entries.sql"));
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("DROP TABLE IF EXISTS \"people\";"));
    }

    #[test]
    fn unwritable_destination_is_reported() {
        let dir = TempDir::new().unwrap();
        let (form, entries) = people();

        // A directory cannot be opened as a file
        let err = write_export(dir.path(), ExportFormat::Csv, &form, &entries).unwrap_err();
        assert!(err.to_string().contains("Failed to write CSV export"));
    }
}
