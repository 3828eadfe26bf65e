//! Form domain model
//!
//! A form is the named, ordered schema entries are recorded against. Field
//! order is significant: it is the column and prompt order everywhere.

use thiserror::Error;

use super::field::{Field, FieldKind};
use super::value::VALUE_TAGS;

/// Name that opens an entry block in the entries file
const KEY_NAME: &str = "KEY";

#[derive(Debug, Error, PartialEq)]
pub enum FormError {
    #[error("Field name cannot be empty")]
    EmptyFieldName,

    #[error("Duplicate field name: {0}")]
    DuplicateField(String),

    #[error("Field name '{0}' is reserved for entry keys")]
    ReservedName(String),

    #[error("Field name '{name}' cannot contain ':{tag}'")]
    AmbiguousName { name: String, tag: &'static str },

    #[error("Field name {0:?} cannot contain line breaks")]
    LineBreakInName(String),

    #[error("Option {id} of field '{field}' cannot contain line breaks")]
    LineBreakInOption { field: String, id: u32 },
}

/// Checks that a field can be written to form and entries files
///
/// Entry values are stored as `name:tag:value` lines inside blocks opened by
/// `KEY:<n>`, so a name must not start such a line or contain a tag between
/// colons where the reader would split it.
pub fn check_field(field: &Field) -> Result<(), FormError> {
    let name = field.name.as_str();
    if name.is_empty() {
        return Err(FormError::EmptyFieldName);
    }
    if name.contains(['\n', '\r']) {
        return Err(FormError::LineBreakInName(name.to_string()));
    }
    if name == KEY_NAME || name.starts_with("KEY:") {
        return Err(FormError::ReservedName(name.to_string()));
    }
    if let Some(tag) = VALUE_TAGS.iter().find(|tag| {
        name.ends_with(&format!(":{}", tag)) || name.contains(&format!(":{}:", tag))
    }) {
        return Err(FormError::AmbiguousName {
            name: name.to_string(),
            tag: *tag,
        });
    }

    if let FieldKind::Choice(options) = &field.kind {
        if let Some((id, _)) = options
            .iter()
            .find(|(_, text)| text.contains(['\n', '\r']))
        {
            return Err(FormError::LineBreakInOption {
                field: name.to_string(),
                id,
            });
        }
    }

    Ok(())
}

/// An ordered set of uniquely named fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    pub name: String,
    fields: Vec<Field>,
}

impl Form {
    /// Creates an empty form
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Creates a form from a list of fields, validating names
    pub fn with_fields(
        name: impl Into<String>,
        fields: impl IntoIterator<Item = Field>,
    ) -> Result<Self, FormError> {
        let mut form = Self::new(name);
        for field in fields {
            form.push(field)?;
        }
        Ok(form)
    }

    /// Appends a field
    pub fn push(&mut self, field: Field) -> Result<(), FormError> {
        check_field(&field)?;
        if self.field(&field.name).is_some() {
            return Err(FormError::DuplicateField(field.name));
        }
        self.fields.push(field);
        Ok(())
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Looks up a field by name
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub(crate) fn last_field_mut(&mut self) -> Option<&mut Field> {
        self.fields.last_mut()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Makes a form name safe to use as a file name
///
/// Every character that is not ASCII alphanumeric or `_` becomes `_`.
pub fn sanitize_form_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}
