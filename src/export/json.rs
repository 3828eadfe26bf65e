//! JSON export
//!
//! ```json
//! {
//!   "formName": "people",
//!   "fields": [{ "name": "Status", "type": "select", "options": { "1": "Open" } }],
//!   "entries": [{ "key": 1, "data": { "Status": "Open" } }]
//! }
//! ```
//!
//! Field and option order follow the form. Entry data lists the form's
//! fields that have a value; a value of the wrong kind becomes `null`.

use anyhow::{Context, Result};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::domain::{ChoiceOptions, Entry, Field, FieldKind, Form};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FormDocument<'a> {
    form_name: &'a str,
    fields: Vec<FieldDocument<'a>>,
    entries: Vec<EntryDocument<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FieldDocument<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    number_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OptionsDocument<'a>>,
}

impl<'a> From<&'a Field> for FieldDocument<'a> {
    fn from(field: &'a Field) -> Self {
        let (number_type, options) = match &field.kind {
            FieldKind::Text => (None, None),
            FieldKind::Number(number_type) => (Some(number_type.as_str()), None),
            FieldKind::Choice(options) => (None, Some(OptionsDocument(options))),
        };

        Self {
            name: &field.name,
            kind: field.kind.type_name(),
            number_type,
            options,
        }
    }
}

/// Options keyed by the string form of their id, in insertion order
struct OptionsDocument<'a>(&'a ChoiceOptions);

impl Serialize for OptionsDocument<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (id, text) in self.0.iter() {
            map.serialize_entry(&id.to_string(), text)?;
        }
        map.end()
    }
}

#[derive(Serialize)]
struct EntryDocument<'a> {
    key: i32,
    data: DataDocument<'a>,
}

struct DataDocument<'a> {
    form: &'a Form,
    entry: &'a Entry,
}

impl Serialize for DataDocument<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for field in self.form.fields() {
            if self.entry.data.contains_key(&field.name) {
                map.serialize_entry(&field.name, &self.entry.value_for(field))?;
            }
        }
        map.end()
    }
}

/// Renders the form and its entries as pretty-printed JSON
pub fn render_json(form: &Form, entries: &[Entry]) -> Result<String> {
    let document = FormDocument {
        form_name: &form.name,
        fields: form.fields().iter().map(FieldDocument::from).collect(),
        entries: entries
            .iter()
            .map(|entry| EntryDocument {
                key: entry.key,
                data: DataDocument { form, entry },
            })
            .collect(),
    };

    let mut out = serde_json::to_string_pretty(&document).context("Failed to serialize JSON export")?;
    out.push('\n');
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NumberType;
    use serde_json::{json, Value as Json};

    fn form() -> Form {
        let mut options = ChoiceOptions::new();
        options.insert(10, "Ten");
        options.insert(2, "Two");

        Form::with_fields(
            "people",
            [
                Field::text("Name"),
                Field::number("Age", NumberType::Int),
                Field::choice("Pick", options),
                Field::number("Ratio", NumberType::Float),
            ],
        )
        .unwrap()
    }

    #[test]
    fn describes_fields() {
        let out = render_json(&form(), &[]).unwrap();
        let doc: Json = serde_json::from_str(&out).unwrap();

        assert_eq!(doc["formName"], "people");
        assert_eq!(
            doc["fields"],
            json!([
                { "name": "Name", "type": "string" },
                { "name": "Age", "type": "number", "numberType": "int" },
                { "name": "Pick", "type": "select", "options": { "10": "Ten", "2": "Two" } },
                { "name": "Ratio", "type": "number", "numberType": "float" },
            ])
        );
        assert_eq!(doc["entries"], json!([]));
    }

    #[test]
    fn options_keep_insertion_order_in_text() {
        let out = render_json(&form(), &[]).unwrap();
        let ten = out.find("\"10\"").unwrap();
        let two = out.find("\"2\"").unwrap();
        assert!(ten < two);
    }

    #[test]
    fn escapes_text_and_leaves_numbers_bare() {
        let entries = vec![Entry::new(1).with("Name", "A\"B").with("Age", 30)];
        let out = render_json(&form(), &entries).unwrap();

        assert!(out.contains(r#""Name": "A\"B""#));
        assert!(out.contains(r#""Age": 30"#));

        let doc: Json = serde_json::from_str(&out).unwrap();
        assert_eq!(doc["entries"][0], json!({ "key": 1, "data": { "Name": "A\"B", "Age": 30 } }));
    }

    #[test]
    fn escapes_control_characters() {
        let entries = vec![Entry::new(1).with("Name", "tab\there\nnew\u{1}\\")];
        let out = render_json(&form(), &entries).unwrap();

        assert!(out.contains(r#""tab\there\nnew\u0001\\""#));
    }

    #[test]
    fn data_follows_form_order_and_marks_mismatches_null() {
        let entries = vec![Entry::new(3)
            .with("Ratio", 0.5f32)
            .with("Age", "old")
            .with("Stray", "ignored")];
        let out = render_json(&form(), &entries).unwrap();

        let age = out.find("\"Age\"").unwrap();
        let ratio = out.find("\"Ratio\"").unwrap();
        assert!(age < ratio);
        assert!(!out.contains("Stray"));

        let doc: Json = serde_json::from_str(&out).unwrap();
        assert_eq!(doc["entries"][0]["data"], json!({ "Age": null, "Ratio": 0.5 }));
    }
}
