//! Value suppliers used by `entry add` and `entry edit`
//!
//! [`ArgsSupplier`] answers from `--set name=value` pairs and fails on bad
//! input. [`PromptSupplier`] asks on a terminal and keeps asking until the
//! input is usable.

use std::collections::HashMap;
use std::fmt;
use std::io::{BufRead, Write};

use anyhow::{bail, Context, Result};
use serde::Serialize;

use crate::domain::{ChoiceOptions, Field, Form, NumberType, Value, ValueError};
use crate::storage::{ChoiceFallback, ValueSupplier};

/// Splits `name=value` at the first `=`
pub fn parse_assignment(raw: &str) -> Result<(String, String)> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => bail!("Invalid assignment '{}': expected name=value", raw),
    }
}

/// A choice id that matched no option, with what was stored instead
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoiceWarning {
    pub field: String,
    pub option: i64,
    pub fallback: ChoiceFallback,
}

impl ChoiceWarning {
    fn new(field: &Field, option: i64, fallback: ChoiceFallback) -> Self {
        Self {
            field: field.name.clone(),
            option,
            fallback,
        }
    }
}

impl fmt::Display for ChoiceWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = match self.fallback {
            ChoiceFallback::Empty => "stored an empty value",
            ChoiceFallback::Unchanged => "kept the previous value",
        };
        write!(f, "'{}' has no option {}; {}", self.field, self.option, outcome)
    }
}

/// Supplies values from `--set` arguments
pub struct ArgsSupplier {
    values: HashMap<String, String>,
    warnings: Vec<ChoiceWarning>,
}

impl ArgsSupplier {
    /// Builds the supplier, rejecting names that are not fields of `form`
    pub fn new(form: &Form, assignments: &[String]) -> Result<Self> {
        let mut values = HashMap::new();
        for raw in assignments {
            let (name, value) = parse_assignment(raw)?;
            if form.field(&name).is_none() {
                bail!("Form '{}' has no field named '{}'", form.name, name);
            }
            if value.contains(['\n', '\r']) {
                bail!("Value for field '{}' cannot contain line breaks", name);
            }
            values.insert(name, value);
        }

        Ok(Self {
            values,
            warnings: Vec::new(),
        })
    }

    /// Problems that did not stop the operation
    pub fn warnings(&self) -> &[ChoiceWarning] {
        &self.warnings
    }

    fn value(&self, field: &Field) -> Result<&str> {
        self.values.get(&field.name).map(String::as_str).with_context(|| {
            format!(
                "No value for field '{}' (use --set \"{}=...\")",
                field.name, field.name
            )
        })
    }
}

impl ValueSupplier for ArgsSupplier {
    fn should_replace(&mut self, field: &Field, _current: Option<&Value>) -> Result<bool> {
        Ok(self.values.contains_key(&field.name))
    }

    fn text(&mut self, field: &Field) -> Result<String> {
        Ok(self.value(field)?.to_string())
    }

    fn number(&mut self, field: &Field, _number_type: NumberType) -> Result<String> {
        Ok(self.value(field)?.to_string())
    }

    fn choice(&mut self, field: &Field, _options: &ChoiceOptions) -> Result<i64> {
        let raw = self.value(field)?;
        raw.trim().parse().with_context(|| {
            format!(
                "Field '{}' takes an option number, got '{}'",
                field.name, raw
            )
        })
    }

    fn rejected(&mut self, field: &Field, error: &ValueError) -> Result<()> {
        bail!("Invalid value for field '{}': {}", field.name, error)
    }

    fn invalid_choice(&mut self, field: &Field, id: i64, fallback: ChoiceFallback) {
        self.warnings.push(ChoiceWarning::new(field, id, fallback));
    }
}

/// Supplies values by prompting on `output` and reading lines from `input`
pub struct PromptSupplier<R, W> {
    input: R,
    output: W,
    warnings: Vec<ChoiceWarning>,
}

impl<R: BufRead, W: Write> PromptSupplier<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            warnings: Vec::new(),
        }
    }

    /// Choice ids that matched no option, reported after the prompts
    pub fn warnings(&self) -> &[ChoiceWarning] {
        &self.warnings
    }

    fn ask(&mut self, prompt: &str) -> Result<String> {
        write!(self.output, "{}: ", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            bail!("Input ended while waiting for '{}'", prompt);
        }

        let trimmed = line.trim_end_matches(['\n', '\r']);
        Ok(trimmed.to_string())
    }
}

impl<R: BufRead, W: Write> ValueSupplier for PromptSupplier<R, W> {
    fn should_replace(&mut self, field: &Field, current: Option<&Value>) -> Result<bool> {
        let current = current.map_or_else(|| "N/A".to_string(), Value::to_string);
        let answer = self.ask(&format!("Change {} (currently {})? [y/N]", field.name, current))?;
        Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
    }

    fn text(&mut self, field: &Field) -> Result<String> {
        self.ask(&field.name)
    }

    fn number(&mut self, field: &Field, number_type: NumberType) -> Result<String> {
        self.ask(&format!("{} ({})", field.name, number_type))
    }

    fn choice(&mut self, field: &Field, options: &ChoiceOptions) -> Result<i64> {
        for (id, text) in options.iter() {
            writeln!(self.output, "  {}) {}", id, text)?;
        }

        loop {
            let answer = self.ask(&format!("{} (option number)", field.name))?;
            match answer.trim().parse() {
                Ok(id) => return Ok(id),
                Err(_) => writeln!(self.output, "Please enter one of the option numbers.")?,
            }
        }
    }

    fn rejected(&mut self, _field: &Field, error: &ValueError) -> Result<()> {
        writeln!(self.output, "{}. Please try again.", error)?;
        Ok(())
    }

    fn invalid_choice(&mut self, field: &Field, id: i64, fallback: ChoiceFallback) {
        self.warnings.push(ChoiceWarning::new(field, id, fallback));
    }
}
