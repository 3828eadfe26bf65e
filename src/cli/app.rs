//! Main CLI application structure

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::{entry, export_cmd, form};
use crate::export::ExportFormat;
use crate::storage::{Config, Project};

#[derive(Parser)]
#[command(name = "formkeep")]
#[command(author, version, about = "Define forms and keep their entries in plain text files")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config, then text)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Project root (skips searching parent directories)
    #[arg(long, global = true, env = "FORMKEEP_ROOT")]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new formkeep project
    Init {
        /// Path to initialize (defaults to --root, then the current directory)
        path: Option<PathBuf>,
    },

    /// Manage forms
    #[command(subcommand)]
    Form(form::FormCommands),

    /// Manage entries of a form
    #[command(subcommand)]
    Entry(entry::EntryCommands),

    /// Export a form's entries to CSV, JSON or SQL
    Export {
        /// Form name
        form: String,

        /// Export format (defaults to the project's default_export)
        #[arg(long, short = 't', value_enum)]
        to: Option<ExportFormat>,

        /// Destination file (defaults to Forms/<form>_entries.<ext>)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
}

fn open_project(root: Option<&Path>, output: &Output) -> Result<Project> {
    let project = match root {
        Some(root) => Project::open(root)?,
        None => Project::open_current()?,
    };
    output.verbose_ctx(
        "project",
        &format!("Using project at: {}", project.root().display()),
    );
    Ok(project)
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let format = match cli.format {
        Some(format) => format,
        None => Config::load_global()?.default_format.into(),
    };
    let output = Output::new(format, cli.verbose);

    output.verbose("formkeep starting");

    match cli.command {
        Commands::Init { path } => {
            let path = path
                .or(cli.root)
                .unwrap_or_else(|| PathBuf::from("."));
            output.verbose_ctx("init", &format!("Initializing project at: {}", path.display()));
            let project = Project::init(&path)?;
            output.verbose_ctx(
                "init",
                &format!("Forms directory: {}", project.forms_dir().display()),
            );
            output.success(&format!(
                "Initialized formkeep project at {}",
                project.root().display()
            ));
        }

        Commands::Form(cmd) => {
            let project = open_project(cli.root.as_deref(), &output)?;
            form::run(cmd, &output, &project)?
        }

        Commands::Entry(cmd) => {
            let project = open_project(cli.root.as_deref(), &output)?;
            entry::run(cmd, &output, &project)?
        }

        Commands::Export {
            form,
            to,
            output: destination,
        } => {
            let project = open_project(cli.root.as_deref(), &output)?;
            export_cmd::run(&output, &project, &form, to, destination.as_deref())?
        }
    }

    output.verbose("Command completed successfully");
    Ok(())
}
