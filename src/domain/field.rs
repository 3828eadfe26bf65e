//! Field schema
//!
//! A field is one named, typed column of a form. The set of kinds is closed:
//! free text, a number of a fixed subtype, or a choice among numbered options.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum FieldError {
    #[error("Unknown number type '{0}': expected int, float or double")]
    UnknownNumberType(String),
}

/// Storage type of a number field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberType {
    /// 32-bit signed integer
    Int,
    /// Single-precision float
    Float,
    /// Double-precision float
    Double,
}

impl NumberType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NumberType::Int => "int",
            NumberType::Float => "float",
            NumberType::Double => "double",
        }
    }
}

impl fmt::Display for NumberType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NumberType {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "int" => Ok(NumberType::Int),
            "float" => Ok(NumberType::Float),
            "double" => Ok(NumberType::Double),
            other => Err(FieldError::UnknownNumberType(other.to_string())),
        }
    }
}

/// Numbered options of a choice field, kept in insertion order
///
/// Ids are positive and unique but need not be contiguous. Inserting an id
/// that already exists replaces its text in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChoiceOptions(Vec<(u32, String)>);

impl ChoiceOptions {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Sets the text for an id, appending if the id is new
    pub fn insert(&mut self, id: u32, text: impl Into<String>) {
        let text = text.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == id) {
            Some(slot) => slot.1 = text,
            None => self.0.push((id, text)),
        }
    }

    /// Appends an option under the next free id and returns that id
    pub fn push(&mut self, text: impl Into<String>) -> u32 {
        let id = self.0.iter().map(|(id, _)| *id).max().unwrap_or(0) + 1;
        self.0.push((id, text.into()));
        id
    }

    /// Removes an option by id, returning its text
    pub fn remove(&mut self, id: u32) -> Option<String> {
        let index = self.0.iter().position(|(existing, _)| *existing == id)?;
        Some(self.0.remove(index).1)
    }

    /// Resolves an option id to its text
    pub fn get(&self, id: i64) -> Option<&str> {
        self.0
            .iter()
            .find(|(existing, _)| i64::from(*existing) == id)
            .map(|(_, text)| text.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.0.iter().map(|(id, text)| (*id, text.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for ChoiceOptions {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut options = ChoiceOptions::new();
        for text in iter {
            options.push(text);
        }
        options
    }
}

/// Kind of a field together with its kind-specific metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number(NumberType),
    Choice(ChoiceOptions),
}

impl FieldKind {
    /// Kind keyword used by the form file and the exports
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::Text => "string",
            FieldKind::Number(_) => "number",
            FieldKind::Choice(_) => "select",
        }
    }
}

/// A named, typed column of a form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub kind: FieldKind,
}

impl Field {
    pub fn text(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Text,
        }
    }

    pub fn number(name: impl Into<String>, number_type: NumberType) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Number(number_type),
        }
    }

    pub fn choice(name: impl Into<String>, options: ChoiceOptions) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Choice(options),
        }
    }

    /// Returns the numeric subtype for number fields
    pub fn number_type(&self) -> Option<NumberType> {
        match self.kind {
            FieldKind::Number(number_type) => Some(number_type),
            _ => None,
        }
    }

    /// Returns the options for choice fields
    pub fn options(&self) -> Option<&ChoiceOptions> {
        match &self.kind {
            FieldKind::Choice(options) => Some(options),
            _ => None,
        }
    }
}
