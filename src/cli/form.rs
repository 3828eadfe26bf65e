//! Form CLI commands

use anyhow::{bail, Context, Result};
use clap::Subcommand;

use super::output::Output;
use crate::domain::{
    check_field, sanitize_form_name, ChoiceOptions, Field, FieldKind, Form, NumberType,
};
use crate::storage::Project;

#[derive(Subcommand)]
pub enum FormCommands {
    /// Create a form from field specs
    ///
    /// Specs are `string:NAME`, `number:NAME:int|float|double` or
    /// `select:NAME:OPTION|OPTION|...`.
    Create {
        /// Form name
        name: String,

        /// Field specs, in column order
        #[arg(required = true)]
        fields: Vec<String>,

        /// Overwrite an existing form with the same name
        #[arg(long)]
        force: bool,
    },

    /// List all forms
    List,

    /// Show a form's fields
    Show {
        /// Form name
        name: String,
    },

    /// Delete a form
    Delete {
        /// Form name
        name: String,

        /// Also delete the form's entries
        #[arg(long)]
        purge: bool,
    },
}

pub fn run(cmd: FormCommands, output: &Output, project: &Project) -> Result<()> {
    match cmd {
        FormCommands::Create {
            name,
            fields,
            force,
        } => create_form(output, project, &name, &fields, force),
        FormCommands::List => list_forms(output, project),
        FormCommands::Show { name } => show_form(output, project, &name),
        FormCommands::Delete { name, purge } => delete_form(output, project, &name, purge),
    }
}

/// Parses one `kind:name[:detail]` field spec
pub fn parse_field_spec(spec: &str) -> Result<Field> {
    let Some((kind, rest)) = spec.split_once(':') else {
        bail!("Invalid field spec '{}': expected kind:name", spec);
    };

    let field = match kind {
        "string" => Field::text(rest),
        "number" => {
            let Some((name, number_type)) = rest.rsplit_once(':') else {
                bail!(
                    "Invalid field spec '{}': number fields need a type (int, float or double)",
                    spec
                );
            };
            Field::number(name, number_type.parse::<NumberType>()?)
        }
        "select" => {
            let (name, options) = rest.rsplit_once(':').unwrap_or((rest, ""));
            let options: ChoiceOptions = options
                .split('|')
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .collect();
            Field::choice(name, options)
        }
        other => bail!(
            "Invalid field spec '{}': unknown kind '{}' (expected string, number or select)",
            spec,
            other
        ),
    };

    check_field(&field)
        .with_context(|| format!("Invalid field spec '{}'", spec.escape_debug()))?;
    Ok(field)
}

fn create_form(
    output: &Output,
    project: &Project,
    name: &str,
    specs: &[String],
    force: bool,
) -> Result<()> {
    let fields = specs
        .iter()
        .map(|spec| parse_field_spec(spec))
        .collect::<Result<Vec<_>>>()?;
    let form = Form::with_fields(sanitize_form_name(name), fields)?;

    output.verbose_ctx("form", &format!("Creating form '{}' from '{}'", form.name, name));
    let path = project.create_form(&form, force)?;
    output.verbose_ctx("form", &format!("Wrote {}", path.display()));

    if output.is_json() {
        output.data(&serde_json::json!({
            "name": form.name,
            "fields": form.fields().len(),
            "path": path.display().to_string(),
        }));
    } else {
        output.success(&format!(
            "Created form: {} ({} fields)",
            form.name,
            form.fields().len()
        ));
    }

    Ok(())
}

fn list_forms(output: &Output, project: &Project) -> Result<()> {
    let names = project.list_forms()?;
    output.verbose_ctx("form", &format!("Found {} forms", names.len()));

    if output.is_json() {
        output.data(&names);
    } else if names.is_empty() {
        println!("No forms found.");
    } else {
        for name in names {
            println!("{}", name);
        }
    }

    Ok(())
}

fn field_json(field: &Field) -> serde_json::Value {
    let mut value = serde_json::json!({
        "name": field.name,
        "type": field.kind.type_name(),
    });

    match &field.kind {
        FieldKind::Text => {}
        FieldKind::Number(number_type) => {
            value["numberType"] = number_type.as_str().into();
        }
        FieldKind::Choice(options) => {
            value["options"] = options
                .iter()
                .map(|(id, text)| serde_json::json!({ "id": id, "text": text }))
                .collect();
        }
    }

    value
}

fn show_form(output: &Output, project: &Project, name: &str) -> Result<()> {
    let form = project.load_form(name)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "name": form.name,
            "fields": form.fields().iter().map(field_json).collect::<Vec<_>>(),
        }));
        return Ok(());
    }

    println!("Form: {}", form.name);
    if form.is_empty() {
        println!("No fields.");
        return Ok(());
    }

    let width = form
        .fields()
        .iter()
        .map(|f| f.name.chars().count())
        .max()
        .unwrap_or(0);

    println!("\nFields:");
    for field in form.fields() {
        match &field.kind {
            FieldKind::Number(number_type) => {
                println!("  {:<width$}  number ({})", field.name, number_type);
            }
            kind => println!("  {:<width$}  {}", field.name, kind.type_name()),
        }

        if let FieldKind::Choice(options) = &field.kind {
            for (id, text) in options.iter() {
                println!("  {:<width$}    {}) {}", "", id, text);
            }
        }
    }

    Ok(())
}

fn delete_form(output: &Output, project: &Project, name: &str, purge: bool) -> Result<()> {
    if !project.delete_form(name, purge)? {
        bail!("Form not found: {}", name);
    }

    let message = if purge {
        format!("Deleted form: {} (entries purged)", sanitize_form_name(name))
    } else {
        format!("Deleted form: {}", sanitize_form_name(name))
    };
    output.success(&message);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_text_and_number_specs() {
        assert_eq!(parse_field_spec("string:Full name").unwrap(), Field::text("Full name"));
        assert_eq!(
            parse_field_spec("number:Ratio: a:b:double").unwrap(),
            Field::number("Ratio: a:b", NumberType::Double)
        );
    }

    #[test]
    fn parses_select_specs() {
        let field = parse_field_spec("select:Status:Open| Closed ||Done").unwrap();
        let options: Vec<_> = field.options().unwrap().iter().collect();
        assert_eq!(options, vec![(1, "Open"), (2, "Closed"), (3, "Done")]);

        let bare = parse_field_spec("select:Tags").unwrap();
        assert_eq!(bare.name, "Tags");
        assert!(bare.options().unwrap().is_empty());
    }

    #[test]
    fn rejects_bad_specs() {
        assert!(parse_field_spec("Name").is_err());
        assert!(parse_field_spec("date:When").is_err());
        assert!(parse_field_spec("number:Age").is_err());
        assert!(parse_field_spec("number:Age:long").is_err());
        assert!(parse_field_spec("string:").is_err());
    }

    #[test]
    fn rejects_specs_that_would_corrupt_files() {
        let err = parse_field_spec("string:KEY").unwrap_err();
        assert!(format!("{:#}", err).contains("reserved for entry keys"));

        let err = parse_field_spec("string:Note\nstring:Injected").unwrap_err();
        assert!(format!("{:#}", err).contains("cannot contain line breaks"));

        let err = parse_field_spec("select:Status:Open|Clo\nsed").unwrap_err();
        assert!(format!("{:#}", err).contains("Option 2 of field 'Status'"));

        assert!(parse_field_spec("number:Start:int:float").is_err());
        assert!(parse_field_spec("string:Time: start").is_ok());
    }
}
