//! Form definition files
//!
//! Forms are stored in `Forms/<name>.form`, one field per line:
//!
//! ```text
//! string:Name
//! number:Age:int
//! select:Status
//!   option:1:Open
//!   option:2:Closed
//! ```
//!
//! Lines that match none of these shapes are skipped so hand-edited files
//! keep loading. Option lines only attach to the select field directly
//! above them.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use thiserror::Error;

use super::entries::write_atomic;
use crate::domain::{Field, FieldError, FieldKind, Form, FormError};

/// Extension of form definition files
pub const FORM_EXTENSION: &str = "form";

const OPTION_PREFIX: &str = "  option";

#[derive(Debug, Error, PartialEq)]
pub enum FormParseError {
    #[error("line {line}: number field '{name}' has no number type")]
    MissingNumberType { line: usize, name: String },

    #[error("line {line}: {source}")]
    UnknownNumberType {
        line: usize,
        #[source]
        source: FieldError,
    },

    #[error("line {line}: duplicate field name '{name}'")]
    DuplicateField { line: usize, name: String },

    #[error("line {line}: {source}")]
    InvalidField {
        line: usize,
        #[source]
        source: FormError,
    },
}

/// Parses the text of a form definition file
pub fn parse_form(name: &str, text: &str) -> Result<Form, FormParseError> {
    let mut form = Form::new(name);
    let mut select_open = false;

    for (index, line) in text.lines().enumerate() {
        let line_num = index + 1;

        let Some((keyword, rest)) = line.split_once(':') else {
            continue;
        };

        let field = match keyword {
            "string" => Field::text(rest),
            "number" => {
                let (field_name, subtype) =
                    rest.rsplit_once(':')
                        .ok_or_else(|| FormParseError::MissingNumberType {
                            line: line_num,
                            name: rest.to_string(),
                        })?;
                let number_type = subtype
                    .parse()
                    .map_err(|source| FormParseError::UnknownNumberType {
                        line: line_num,
                        source,
                    })?;
                Field::number(field_name, number_type)
            }
            "select" => Field::choice(rest, Default::default()),
            OPTION_PREFIX => {
                if select_open {
                    attach_option(&mut form, rest);
                }
                continue;
            }
            _ => continue,
        };

        let is_select = matches!(field.kind, FieldKind::Choice(_));
        select_open = false;

        match form.push(field) {
            Ok(()) => select_open = is_select,
            // A field line without a name is not a recognized line
            Err(FormError::EmptyFieldName) => continue,
            Err(FormError::DuplicateField(name)) => {
                return Err(FormParseError::DuplicateField {
                    line: line_num,
                    name,
                })
            }
            Err(source) => {
                return Err(FormParseError::InvalidField {
                    line: line_num,
                    source,
                })
            }
        }
    }

    Ok(form)
}

/// Adds `<id>:<text>` to the select field at the end of the form
fn attach_option(form: &mut Form, rest: &str) {
    let Some((id, text)) = rest.split_once(':') else {
        return;
    };
    let Ok(id) = id.trim().parse::<u32>() else {
        return;
    };
    if id == 0 {
        return;
    }

    if let Some(Field {
        kind: FieldKind::Choice(options),
        ..
    }) = form.last_field_mut()
    {
        options.insert(id, text);
    }
}

/// Serializes a form to the definition file format
pub fn serialize_form(form: &Form) -> String {
    let mut out = String::new();

    for field in form.fields() {
        match &field.kind {
            FieldKind::Text => {
                out.push_str(&format!("string:{}\n", field.name));
            }
            FieldKind::Number(number_type) => {
                out.push_str(&format!("number:{}:{}\n", field.name, number_type));
            }
            FieldKind::Choice(options) => {
                out.push_str(&format!("select:{}\n", field.name));
                for (id, text) in options.iter() {
                    out.push_str(&format!("{}:{}:{}\n", OPTION_PREFIX, id, text));
                }
            }
        }
    }

    out
}

/// Derives a form name from its file path (`Forms/people.form` -> `people`)
pub fn form_name_from_path(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    match file_name.strip_suffix(".form") {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => file_name,
    }
}

/// Loads a form definition from disk
pub fn load_form(path: &Path) -> Result<Form> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to open form file: {}", path.display()))?;

    parse_form(&form_name_from_path(path), &text)
        .with_context(|| format!("Failed to parse form file: {}", path.display()))
}

/// Writes a form definition to disk (full rewrite)
pub fn save_form(path: &Path, form: &Form) -> Result<()> {
    write_atomic(path, &serialize_form(form))
}
