//! Project management
//!
//! A project is a directory holding `formkeep.toml` and the forms directory
//! (`Forms/` unless configured otherwise). Handles initialization and gives
//! access to forms and their sessions.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use super::config::{Config, PROJECT_CONFIG_FILE};
use super::entries::entries_file_name;
use super::form_file::{form_name_from_path, load_form, save_form, FORM_EXTENSION};
use super::session::Session;
use crate::domain::{sanitize_form_name, Form};
use crate::export::{export_file_name, ExportFormat};

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Not in a formkeep project. Run 'formkeep init' first.")]
    NotInProject,

    #[error("Form not found: {0}")]
    FormNotFound(String),

    #[error("Form already exists: {0} (use --force to overwrite)")]
    FormExists(String),
}

/// A formkeep project
pub struct Project {
    root: PathBuf,
    config: Config,
}

impl Project {
    /// Opens an existing project at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let config = Config::for_project(&root)?;

        let project = Self { root, config };
        if !project.root.join(PROJECT_CONFIG_FILE).is_file() && !project.forms_dir().is_dir() {
            return Err(ProjectError::NotInProject.into());
        }

        Ok(project)
    }

    /// Opens the project at the current directory or a parent
    pub fn open_current() -> Result<Self> {
        let root = Config::find_project_root().ok_or(ProjectError::NotInProject)?;

        Self::open(root)
    }

    /// Initializes a new project at the given path
    ///
    /// Existing configuration and forms are left alone.
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create directory: {}", root.display()))?;

        let config_path = root.join(PROJECT_CONFIG_FILE);
        if !config_path.exists() {
            let default_config = r#"# formkeep configuration

# Directory holding .form definitions and their entries
forms_dir = "Forms"

# Entries per page for 'formkeep entry list'
page_size = 5

# Format used by 'formkeep export' when --to is not given (csv, json, sql)
default_export = "csv"
"#;
            fs::write(&config_path, default_config)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        let config = Config::for_project(&root)?;
        let project = Self { root, config };

        let forms_dir = project.forms_dir();
        fs::create_dir_all(&forms_dir).with_context(|| {
            format!("Failed to create forms directory: {}", forms_dir.display())
        })?;

        Ok(project)
    }

    /// Returns the project root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the directory holding forms and entries
    pub fn forms_dir(&self) -> PathBuf {
        self.root.join(&self.config.project.forms_dir)
    }

    /// Path of a form definition; the name is sanitized first
    pub fn form_path(&self, name: &str) -> PathBuf {
        self.forms_dir()
            .join(format!("{}.{}", sanitize_form_name(name), FORM_EXTENSION))
    }

    /// Path of a form's entries file
    pub fn entries_path(&self, name: &str) -> PathBuf {
        self.forms_dir()
            .join(entries_file_name(&sanitize_form_name(name)))
    }

    /// Default path of a form's export in the given format
    pub fn export_path(&self, name: &str, format: ExportFormat) -> PathBuf {
        self.forms_dir()
            .join(export_file_name(&sanitize_form_name(name), format))
    }

    /// Names of all forms, sorted
    pub fn list_forms(&self) -> Result<Vec<String>> {
        let forms_dir = self.forms_dir();
        if !forms_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&forms_dir)
            .with_context(|| format!("Failed to read forms directory: {}", forms_dir.display()))?
        {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == FORM_EXTENSION) {
                names.push(form_name_from_path(&path));
            }
        }

        names.sort();
        Ok(names)
    }

    /// Loads a form by name
    pub fn load_form(&self, name: &str) -> Result<Form> {
        let path = self.form_path(name);
        if !path.is_file() {
            return Err(ProjectError::FormNotFound(name.to_string()).into());
        }
        load_form(&path)
    }

    /// Writes a new form definition
    ///
    /// The form's name is sanitized for the file name. Fails if the form
    /// already exists unless `overwrite` is set.
    pub fn create_form(&self, form: &Form, overwrite: bool) -> Result<PathBuf> {
        let path = self.form_path(&form.name);
        if path.exists() && !overwrite {
            return Err(ProjectError::FormExists(sanitize_form_name(&form.name)).into());
        }

        save_form(&path, form)?;
        Ok(path)
    }

    /// Deletes a form definition, and its entries when `purge` is set
    ///
    /// Returns `false` if the form did not exist.
    pub fn delete_form(&self, name: &str, purge: bool) -> Result<bool> {
        let path = self.form_path(name);
        if !path.is_file() {
            return Ok(false);
        }

        fs::remove_file(&path)
            .with_context(|| format!("Failed to delete form: {}", path.display()))?;

        if purge {
            let entries_path = self.entries_path(name);
            if entries_path.exists() {
                fs::remove_file(&entries_path).with_context(|| {
                    format!("Failed to delete entries: {}", entries_path.display())
                })?;
            }
        }

        Ok(true)
    }

    /// Starts a session on the named form
    pub fn session(&self, name: &str) -> Result<Session> {
        let form = self.load_form(name)?;
        Ok(Session::new(self.forms_dir(), form))
    }

    /// Returns a relative path from the project root
    pub fn relative_path(&self, path: &Path) -> Option<PathBuf> {
        path.strip_prefix(&self.root).ok().map(|p| p.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Field, NumberType};
    use tempfile::TempDir;

    fn people() -> Form {
        Form::with_fields(
            "people",
            [Field::text("Name"), Field::number("Age", NumberType::Int)],
        )
        .unwrap()
    }

    #[test]
    fn init_creates_structure() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();

        assert!(project.forms_dir().is_dir());
        assert!(project.root().join("formkeep.toml").is_file());
        assert_eq!(project.config().page_size(), 5);
    }

    #[test]
    fn init_is_idempotent() {
        let dir = TempDir::new().unwrap();

        Project::init(dir.path()).unwrap();
        fs::write(dir.path().join("formkeep.toml"), "page_size = 9\n").unwrap();
        let project = Project::init(dir.path()).unwrap();

        assert_eq!(project.config().page_size(), 9);
    }

    #[test]
    fn init_honours_configured_forms_dir() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("formkeep.toml"), "forms_dir = \"Records\"\n").unwrap();

        let project = Project::init(dir.path()).unwrap();
        assert!(dir.path().join("Records").is_dir());
        assert!(!dir.path().join("Forms").exists());
        assert_eq!(project.forms_dir(), dir.path().join("Records"));
    }

    #[test]
    fn open_existing_project() {
        let dir = TempDir::new().unwrap();
        Project::init(dir.path()).unwrap();

        let project = Project::open(dir.path()).unwrap();
        assert_eq!(project.root(), dir.path());
    }

    #[test]
    fn bare_forms_directory_is_a_project() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("Forms")).unwrap();

        assert!(Project::open(dir.path()).is_ok());
    }

    #[test]
    fn open_non_project_fails() {
        let dir = TempDir::new().unwrap();
        let err = Project::open(dir.path()).err().unwrap();

        assert!(err.to_string().contains("formkeep init"));
    }

    #[test]
    fn create_list_and_load_forms() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();

        project.create_form(&people(), false).unwrap();
        project
            .create_form(&Form::with_fields("books", [Field::text("Title")]).unwrap(), false)
            .unwrap();
        fs::write(project.forms_dir().join("notes.txt"), "not a form").unwrap();

        assert_eq!(project.list_forms().unwrap(), vec!["books", "people"]);
        assert_eq!(project.load_form("people").unwrap(), people());
    }

    #[test]
    fn create_sanitizes_file_name() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();

        let path = project
            .create_form(&Form::with_fields("My People", [Field::text("Name")]).unwrap(), false)
            .unwrap();

        assert!(path.ends_with("Forms/My_People.form"));
        assert_eq!(project.load_form("My People").unwrap().name, "My_People");
    }

    #[test]
    fn create_refuses_to_overwrite_without_force() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();
        project.create_form(&people(), false).unwrap();

        let err = project.create_form(&people(), false).unwrap_err();
        assert!(err.to_string().contains("already exists"));

        project.create_form(&people(), true).unwrap();
    }

    #[test]
    fn load_unknown_form_is_not_found() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();

        let err = project.load_form("ghost").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ProjectError>(),
            Some(ProjectError::FormNotFound(name)) if name == "ghost"
        ));
    }

    #[test]
    fn delete_keeps_entries_unless_purged() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();
        project.create_form(&people(), false).unwrap();
        fs::write(project.entries_path("people"), "KEY:1\n---\n").unwrap();

        assert!(project.delete_form("people", false).unwrap());
        assert!(!project.form_path("people").exists());
        assert!(project.entries_path("people").exists());

        project.create_form(&people(), false).unwrap();
        assert!(project.delete_form("people", true).unwrap());
        assert!(!project.entries_path("people").exists());

        assert!(!project.delete_form("people", false).unwrap());
    }

    #[test]
    fn session_binds_form_to_forms_dir() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();
        project.create_form(&people(), false).unwrap();

        let session = project.session("people").unwrap();
        assert_eq!(session.form(), &people());
        assert_eq!(
            session.export_path(ExportFormat::Json),
            project.export_path("people", ExportFormat::Json)
        );
    }

    #[test]
    fn relative_path() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();

        let rel = project.relative_path(&project.form_path("people"));
        assert_eq!(rel, Some(PathBuf::from("Forms/people.form")));
    }
}
