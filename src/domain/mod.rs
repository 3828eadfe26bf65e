//! Domain models for formkeep
//!
//! Contains the field schema, forms, typed values and entries without any
//! I/O concerns.

mod entry;
mod field;
mod form;
mod value;

pub use entry::Entry;
pub use field::{ChoiceOptions, Field, FieldError, FieldKind, NumberType};
pub use form::{check_field, sanitize_form_name, Form, FormError};
pub use value::{Value, ValueError, VALUE_TAGS};
