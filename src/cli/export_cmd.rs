//! Export command

use std::path::{Path, PathBuf};

use anyhow::Result;

use super::output::Output;
use crate::export::ExportFormat;
use crate::storage::Project;

pub fn run(
    output: &Output,
    project: &Project,
    form_name: &str,
    to: Option<ExportFormat>,
    destination: Option<&Path>,
) -> Result<()> {
    let format = to.unwrap_or(project.config().project.default_export);
    let mut session = project.session(form_name)?;
    let form_name = session.form().name.clone();

    output.verbose_ctx(
        "export",
        &format!("Exporting '{}' as {}", form_name, format),
    );

    let Some(path) = session.export(format, destination)? else {
        if output.is_json() {
            output.data(&serde_json::json!({
                "form": form_name,
                "format": format,
                "exported": 0,
                "path": null,
            }));
        } else {
            output.success(&format!("No entries to export in {}", form_name));
        }
        return Ok(());
    };

    let count = session.entries()?.len();
    let shown: PathBuf = project.relative_path(&path).unwrap_or_else(|| path.clone());

    if output.is_json() {
        output.data(&serde_json::json!({
            "form": form_name,
            "format": format,
            "exported": count,
            "path": path.display().to_string(),
        }));
    } else {
        output.success(&format!(
            "Exported {} entries from {} to {} ({})",
            count,
            form_name,
            shown.display(),
            format
        ));
    }

    Ok(())
}
