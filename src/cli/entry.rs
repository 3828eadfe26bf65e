//! Entry CLI commands

use std::io::{self, IsTerminal};

use anyhow::{bail, Result};
use clap::Subcommand;

use super::output::Output;
use super::supply::{ArgsSupplier, ChoiceWarning, PromptSupplier};
use crate::domain::{Entry, Form};
use crate::storage::{Project, Session, ValueSupplier};

const ABSENT: &str = "N/A";

#[derive(Subcommand)]
pub enum EntryCommands {
    /// Add an entry to a form
    ///
    /// Without --set, each field is prompted for on the terminal.
    Add {
        /// Form name
        form: String,

        /// Field value as name=value (choice fields take the option number)
        #[arg(long = "set", short = 's', value_name = "NAME=VALUE")]
        set: Vec<String>,
    },

    /// Edit an entry
    ///
    /// With --set only the named fields change; otherwise each field is
    /// offered for change on the terminal.
    Edit {
        /// Form name
        form: String,

        /// Entry key
        key: i32,

        /// Field value as name=value (choice fields take the option number)
        #[arg(long = "set", short = 's', value_name = "NAME=VALUE")]
        set: Vec<String>,
    },

    /// Delete an entry (remaining entries are renumbered)
    Delete {
        /// Form name
        form: String,

        /// Entry key
        key: i32,
    },

    /// List entries page by page
    List {
        /// Form name
        form: String,

        /// Page number (out of range pages are clamped)
        #[arg(long, short, default_value = "1")]
        page: usize,

        /// Entries per page (defaults to the configured page size)
        #[arg(long)]
        page_size: Option<usize>,
    },

    /// Show a single entry
    Show {
        /// Form name
        form: String,

        /// Entry key
        key: i32,
    },
}

pub fn run(cmd: EntryCommands, output: &Output, project: &Project) -> Result<()> {
    match cmd {
        EntryCommands::Add { form, set } => add_entry(output, project, &form, &set),
        EntryCommands::Edit { form, key, set } => edit_entry(output, project, &form, key, &set),
        EntryCommands::Delete { form, key } => delete_entry(output, project, &form, key),
        EntryCommands::List {
            form,
            page,
            page_size,
        } => list_entries(output, project, &form, page, page_size),
        EntryCommands::Show { form, key } => show_entry(output, project, &form, key),
    }
}

/// Runs `action` with values from `--set`, or from a terminal prompt when
/// there are none, and returns the supplier's warnings with the result
fn with_supplier<T>(
    output: &Output,
    form: &Form,
    set: &[String],
    action: impl FnOnce(&mut dyn ValueSupplier) -> Result<T>,
) -> Result<(T, Vec<ChoiceWarning>)> {
    if !set.is_empty() {
        let mut supplier = ArgsSupplier::new(form, set)?;
        let result = action(&mut supplier)?;
        return Ok((result, supplier.warnings().to_vec()));
    }

    let stdin = io::stdin();
    if stdin.is_terminal() {
        output.verbose_ctx("entry", "Prompting on terminal");
    } else {
        output.verbose_ctx("entry", "Reading values from standard input");
    }

    let mut supplier = PromptSupplier::new(stdin.lock(), io::stderr());
    let result = action(&mut supplier)?;
    Ok((result, supplier.warnings().to_vec()))
}

fn entry_json(form: &Form, entry: &Entry) -> serde_json::Value {
    let data: serde_json::Map<String, serde_json::Value> = form
        .fields()
        .iter()
        .filter_map(|field| {
            let value = serde_json::to_value(entry.value_for(field)?).ok()?;
            Some((field.name.clone(), value))
        })
        .collect();

    serde_json::json!({ "key": entry.key, "data": data })
}

fn add_entry(output: &Output, project: &Project, form_name: &str, set: &[String]) -> Result<()> {
    let mut session = project.session(form_name)?;
    let form = session.form().clone();
    output.verbose_ctx("entry", &format!("Adding entry to '{}'", form.name));

    let (entry, warnings) = with_supplier(output, &form, set, |supplier| {
        session.add(supplier).cloned()
    })?;

    output.entry_saved(
        &format!("Added entry {} to {}", entry.key, form.name),
        entry_json(&form, &entry),
        &warnings,
    );

    Ok(())
}

fn edit_entry(
    output: &Output,
    project: &Project,
    form_name: &str,
    key: i32,
    set: &[String],
) -> Result<()> {
    let mut session = project.session(form_name)?;
    let form = session.form().clone();

    if session.get(key)?.is_none() {
        bail!("Entry not found: {} in {}", key, form.name);
    }

    output.verbose_ctx("entry", &format!("Editing entry {} of '{}'", key, form.name));
    let (_, warnings) =
        with_supplier(output, &form, set, |supplier| session.edit(key, supplier))?;

    if let Some(entry) = session.get(key)? {
        output.entry_saved(
            &format!("Updated entry {} in {}", key, form.name),
            entry_json(&form, entry),
            &warnings,
        );
    }

    Ok(())
}

fn delete_entry(output: &Output, project: &Project, form_name: &str, key: i32) -> Result<()> {
    let mut session = project.session(form_name)?;

    if !session.delete(key)? {
        bail!("Entry not found: {} in {}", key, session.form().name);
    }

    output.verbose_ctx("entry", "Renumbered remaining entries");
    let remaining = session.entries()?.len();
    output.success(&format!(
        "Deleted entry {} from {} ({} remaining)",
        key,
        session.form().name,
        remaining
    ));

    Ok(())
}

/// Renders entries as a padded table with `N/A` for absent values
pub fn render_table(form: &Form, entries: &[Entry]) -> String {
    let mut headers = vec!["KEY".to_string()];
    headers.extend(form.fields().iter().map(|f| f.name.clone()));

    let rows: Vec<Vec<(String, usize)>> = entries
        .iter()
        .map(|entry| {
            let key = entry.key.to_string();
            let key_width = key.chars().count();
            let mut row = vec![(key, key_width)];
            row.extend(form.fields().iter().map(|field| match entry.value_for(field) {
                Some(value) => (value.to_string(), value.rendered_width()),
                None => (ABSENT.to_string(), ABSENT.len()),
            }));
            row
        })
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (width, (_, cell_width)) in widths.iter_mut().zip(row) {
            *width = (*width).max(*cell_width);
        }
    }

    let mut out = String::new();
    let header_cells: Vec<(String, usize)> = headers
        .into_iter()
        .map(|h| {
            let width = h.chars().count();
            (h, width)
        })
        .collect();
    push_row(&mut out, &header_cells, &widths);

    let total: usize = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
    out.push_str(&"-".repeat(total));
    out.push('\n');

    for row in &rows {
        push_row(&mut out, row, &widths);
    }

    out
}

fn push_row(out: &mut String, cells: &[(String, usize)], widths: &[usize]) {
    let mut line = String::new();
    for (index, ((text, width), column)) in cells.iter().zip(widths).enumerate() {
        if index > 0 {
            line.push_str("  ");
        }
        line.push_str(text);
        line.push_str(&" ".repeat(column.saturating_sub(*width)));
    }
    out.push_str(line.trim_end());
    out.push('\n');
}

fn list_entries(
    output: &Output,
    project: &Project,
    form_name: &str,
    page: usize,
    page_size: Option<usize>,
) -> Result<()> {
    let mut session: Session = project.session(form_name)?;
    let page_size = page_size.unwrap_or_else(|| project.config().page_size());
    let form = session.form().clone();
    let page = session.page(page, page_size)?;

    output.verbose_ctx(
        "entry",
        &format!(
            "Page {} of {} with page size {}",
            page.number, page.total_pages, page_size
        ),
    );

    if output.is_json() {
        output.data(&serde_json::json!({
            "form": form.name,
            "page": page.number,
            "total_pages": page.total_pages,
            "entries": page.entries.iter().map(|e| entry_json(&form, e)).collect::<Vec<_>>(),
        }));
    } else if page.entries.is_empty() {
        println!("No entries found.");
    } else {
        print!("{}", render_table(&form, page.entries));
        println!();
        println!("Page {} of {}", page.number, page.total_pages);
    }

    Ok(())
}

fn show_entry(output: &Output, project: &Project, form_name: &str, key: i32) -> Result<()> {
    let mut session = project.session(form_name)?;
    let form = session.form().clone();

    let Some(entry) = session.get(key)? else {
        bail!("Entry not found: {} in {}", key, form.name);
    };

    if output.is_json() {
        output.data(&entry_json(&form, entry));
        return Ok(());
    }

    let width = form
        .fields()
        .iter()
        .map(|f| f.name.chars().count())
        .max()
        .unwrap_or(0);

    println!("Entry {} ({})", entry.key, form.name);
    for field in form.fields() {
        let value = entry
            .value_for(field)
            .map_or_else(|| ABSENT.to_string(), ToString::to_string);
        println!("  {:<width$}  {}", format!("{}:", field.name), value, width = width + 1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Field, NumberType};

    fn form() -> Form {
        Form::with_fields(
            "people",
            [Field::text("Name"), Field::number("Age", NumberType::Int)],
        )
        .unwrap()
    }

    #[test]
    fn table_pads_columns_and_marks_absent_values() {
        let entries = vec![
            Entry::new(1).with("Name", "Ann").with("Age", 30),
            Entry::new(2).with("Name", "Bartholomew"),
            Entry::new(10).with("Age", "old"),
        ];

        let table = render_table(&form(), &entries);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines[0], "KEY  Name         Age");
        assert_eq!(lines[1], "-".repeat(21));
        assert_eq!(lines[2], "1    Ann          30");
        assert_eq!(lines[3], "2    Bartholomew  N/A");
        assert_eq!(lines[4], "10   N/A          N/A");
    }

    #[test]
    fn table_measures_characters_not_bytes() {
        let entries = vec![Entry::new(1).with("Name", "Zoë").with("Age", 5)];

        let table = render_table(&form(), &entries);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "KEY  Name  Age");
        assert_eq!(lines[2], "1    Zoë   5");
    }

    #[test]
    fn entry_json_follows_form_order() {
        let entry = Entry::new(3).with("Age", 7).with("Name", "Al").with("Other", "x");
        let json = entry_json(&form(), &entry);

        assert_eq!(
            json,
            serde_json::json!({ "key": 3, "data": { "Name": "Al", "Age": 7 } })
        );
    }
}
