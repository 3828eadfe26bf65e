//! Entry domain model

use std::collections::BTreeMap;

use super::field::Field;
use super::value::Value;

/// One record of a form: a key plus a value per field name
///
/// Not every field needs a value. The key is only stable until the next
/// delete, which renumbers the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub key: i32,
    pub data: BTreeMap<String, Value>,
}

impl Entry {
    pub fn new(key: i32) -> Self {
        Self {
            key,
            data: BTreeMap::new(),
        }
    }

    /// Builder-style setter
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(field.into(), value.into());
        self
    }

    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        self.data.insert(field.into(), value);
    }

    /// Returns the stored value for a field if it matches the field's kind
    ///
    /// A missing value and a value whose tag does not fit the field are both
    /// reported as absent.
    pub fn value_for(&self, field: &Field) -> Option<&Value> {
        self.data
            .get(&field.name)
            .filter(|value| value.conforms_to(&field.kind))
    }
}
