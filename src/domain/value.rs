//! Typed field values
//!
//! A [`Value`] holds one field's data for one entry. Text and choice fields
//! both store [`Value::Text`]; a selected choice is stored as its option text.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use super::field::{FieldKind, NumberType};

#[derive(Debug, Error, PartialEq)]
pub enum ValueError {
    #[error("'{input}' is not a valid {number_type} value")]
    InvalidNumber {
        number_type: NumberType,
        input: String,
    },
}

/// Tags a value line in an entries file can carry after the field name
pub const VALUE_TAGS: [&str; 4] = ["string", "int", "float", "double"];

/// Runtime value of a single field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Int(i32),
    Float(f32),
    Double(f64),
}

impl Value {
    /// Tag written to the entries file
    pub fn tag(&self) -> &'static str {
        match self {
            Value::Text(_) => "string",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
        }
    }

    /// Parses numeric text according to the field's subtype
    ///
    /// Surrounding whitespace is ignored; anything else that is not part of
    /// the number's grammar rejects the input.
    pub fn parse_number(number_type: NumberType, input: &str) -> Result<Value, ValueError> {
        let trimmed = input.trim();
        let invalid = || ValueError::InvalidNumber {
            number_type,
            input: input.to_string(),
        };

        match number_type {
            NumberType::Int => trimmed.parse().map(Value::Int).map_err(|_| invalid()),
            NumberType::Float => trimmed.parse().map(Value::Float).map_err(|_| invalid()),
            NumberType::Double => trimmed.parse().map(Value::Double).map_err(|_| invalid()),
        }
    }

    /// Returns true if this value has the tag the field kind stores
    pub fn conforms_to(&self, kind: &FieldKind) -> bool {
        matches!(
            (kind, self),
            (FieldKind::Text, Value::Text(_))
                | (FieldKind::Choice(_), Value::Text(_))
                | (FieldKind::Number(NumberType::Int), Value::Int(_))
                | (FieldKind::Number(NumberType::Float), Value::Float(_))
                | (FieldKind::Number(NumberType::Double), Value::Double(_))
        )
    }

    /// Returns true for non-finite floats (NaN, infinities)
    pub fn is_non_finite(&self) -> bool {
        match self {
            Value::Float(v) => !v.is_finite(),
            Value::Double(v) => !v.is_finite(),
            _ => false,
        }
    }

    /// Width in characters of the rendered value, used for column layout
    pub fn rendered_width(&self) -> usize {
        match self {
            Value::Text(text) => text.chars().count(),
            other => other.to_string().chars().count(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(text) => f.write_str(text),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ChoiceOptions;

    #[test]
    fn parse_number_by_subtype() {
        assert_eq!(
            Value::parse_number(NumberType::Int, " 42 ").unwrap(),
            Value::Int(42)
        );
        assert_eq!(
            Value::parse_number(NumberType::Float, "1.5").unwrap(),
            Value::Float(1.5)
        );
        assert_eq!(
            Value::parse_number(NumberType::Double, "-2.25e3").unwrap(),
            Value::Double(-2250.0)
        );
    }

    #[test]
    fn parse_number_rejects_bad_grammar() {
        assert!(Value::parse_number(NumberType::Int, "12abc").is_err());
        assert!(Value::parse_number(NumberType::Int, "1.5").is_err());
        assert!(Value::parse_number(NumberType::Int, "").is_err());
        assert!(Value::parse_number(NumberType::Double, "abc").is_err());

        let err = Value::parse_number(NumberType::Int, "3000000000").unwrap_err();
        assert_eq!(err.to_string(), "'3000000000' is not a valid int value");
    }

    #[test]
    fn conformance_follows_field_kind() {
        let choice = FieldKind::Choice(ChoiceOptions::new());
        assert!(Value::from("x").conforms_to(&FieldKind::Text));
        assert!(Value::from("x").conforms_to(&choice));
        assert!(Value::Int(1).conforms_to(&FieldKind::Number(NumberType::Int)));
        assert!(!Value::Int(1).conforms_to(&FieldKind::Number(NumberType::Double)));
        assert!(!Value::Double(1.0).conforms_to(&FieldKind::Number(NumberType::Float)));
        assert!(!Value::Float(1.0).conforms_to(&FieldKind::Text));
    }

    #[test]
    fn display_and_width() {
        assert_eq!(Value::Int(-30).to_string(), "-30");
        assert_eq!(Value::Double(2.5).to_string(), "2.5");
        assert_eq!(Value::Float(3.0).to_string(), "3");
        assert_eq!(Value::Int(-30).rendered_width(), 3);
        assert_eq!(Value::from("héllo").rendered_width(), 5);
    }

    #[test]
    fn tags() {
        assert_eq!(Value::from("a").tag(), "string");
        assert_eq!(Value::Int(1).tag(), "int");
        assert_eq!(Value::Float(1.0).tag(), "float");
        assert_eq!(Value::Double(1.0).tag(), "double");
    }
}
