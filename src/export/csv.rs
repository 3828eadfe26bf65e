//! CSV export
//!
//! Header is `KEY` followed by the field names in form order. Text cells are
//! wrapped in double quotes with embedded double quotes turned into single
//! quotes; absent cells are left empty.

use crate::domain::{Entry, Form, Value};

pub fn render_csv(form: &Form, entries: &[Entry]) -> String {
    let mut out = String::from("KEY");
    for field in form.fields() {
        out.push(',');
        out.push_str(&field.name);
    }
    out.push('\n');

    for entry in entries {
        out.push_str(&entry.key.to_string());
        for field in form.fields() {
            out.push(',');
            if let Some(value) = entry.value_for(field) {
                out.push_str(&cell(value));
            }
        }
        out.push('\n');
    }

    out
}

fn cell(value: &Value) -> String {
    match value {
        Value::Text(text) => format!("\"{}\"", text.replace('"', "'")),
        number => number.to_string(),
    }
}
