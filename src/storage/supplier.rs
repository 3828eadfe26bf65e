//! Value suppliers
//!
//! The store asks a [`ValueSupplier`] for raw input while adding or editing
//! an entry and turns that input into typed values itself. Suppliers decide
//! where input comes from (command-line arguments, an interactive prompt);
//! the store decides what counts as valid.

use anyhow::Result;
use serde::Serialize;

use crate::domain::{ChoiceOptions, Field, NumberType, Value, ValueError};

/// What happens to a choice field when the supplied id matches no option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChoiceFallback {
    /// Store an empty text value (adding)
    Empty,
    /// Keep whatever was stored before (editing)
    Unchanged,
}

/// Source of raw field input for add and edit
pub trait ValueSupplier {
    /// Asked once per field while editing; `false` keeps the current value
    fn should_replace(&mut self, field: &Field, current: Option<&Value>) -> Result<bool> {
        let _ = (field, current);
        Ok(true)
    }

    /// Text for a text field
    fn text(&mut self, field: &Field) -> Result<String>;

    /// Raw numeric text; requested again after [`ValueSupplier::rejected`]
    fn number(&mut self, field: &Field, number_type: NumberType) -> Result<String>;

    /// Option id for a choice field
    fn choice(&mut self, field: &Field, options: &ChoiceOptions) -> Result<i64>;

    /// Called when numeric input failed to parse. Returning an error aborts
    /// the operation instead of asking again.
    fn rejected(&mut self, field: &Field, error: &ValueError) -> Result<()>;

    /// Called when a choice id matched no option
    fn invalid_choice(&mut self, field: &Field, id: i64, fallback: ChoiceFallback) {
        let _ = (field, id, fallback);
    }
}

/// Resolves one field's value from the supplier
///
/// Returns `None` only for an invalid choice under [`ChoiceFallback::Unchanged`].
pub(crate) fn resolve_value(
    field: &Field,
    supplier: &mut dyn ValueSupplier,
    fallback: ChoiceFallback,
) -> Result<Option<Value>> {
    use crate::domain::FieldKind;

    match &field.kind {
        FieldKind::Text => Ok(Some(Value::Text(supplier.text(field)?))),
        FieldKind::Number(number_type) => loop {
            let raw = supplier.number(field, *number_type)?;
            match Value::parse_number(*number_type, &raw) {
                Ok(value) => return Ok(Some(value)),
                Err(e) => supplier.rejected(field, &e)?,
            }
        },
        FieldKind::Choice(options) => {
            let id = supplier.choice(field, options)?;
            match options.get(id) {
                Some(text) => Ok(Some(Value::from(text))),
                None => {
                    supplier.invalid_choice(field, id, fallback);
                    match fallback {
                        ChoiceFallback::Empty => Ok(Some(Value::from(""))),
                        ChoiceFallback::Unchanged => Ok(None),
                    }
                }
            }
        }
    }
}
