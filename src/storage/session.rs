//! Active form session
//!
//! A [`Session`] holds the selected form and, once first needed, the entry
//! store bound to it. Switching forms drops the store; the next operation
//! opens the new form's store from disk.

use std::path::{Path, PathBuf};

use anyhow::Result;

use super::entries::{EntryStore, Page};
use super::form_file::{load_form, FORM_EXTENSION};
use super::supplier::ValueSupplier;
use crate::domain::{Entry, Form};
use crate::export::{export_file_name, write_export, ExportFormat};

pub struct Session {
    forms_dir: PathBuf,
    form: Form,
    store: Option<EntryStore>,
}

impl Session {
    /// Starts a session on an already loaded form
    pub fn new(forms_dir: impl Into<PathBuf>, form: Form) -> Self {
        Self {
            forms_dir: forms_dir.into(),
            form,
            store: None,
        }
    }

    /// Loads `<forms_dir>/<name>.form` and starts a session on it
    pub fn open(forms_dir: impl Into<PathBuf>, name: &str) -> Result<Self> {
        let forms_dir = forms_dir.into();
        let form = load_form(&forms_dir.join(format!("{}.{}", name, FORM_EXTENSION)))?;
        Ok(Self::new(forms_dir, form))
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    /// Whether the entry store has been opened yet
    pub fn is_store_open(&self) -> bool {
        self.store.is_some()
    }

    /// Switches to another form, discarding the current store
    pub fn select(&mut self, form: Form) {
        self.form = form;
        self.store = None;
    }

    /// The active form and its store, opening the store on first use
    fn parts(&mut self) -> Result<(&Form, &mut EntryStore)> {
        let store = match self.store.take() {
            Some(store) => store,
            None => EntryStore::for_form(&self.forms_dir, &self.form.name)?,
        };
        let store = self.store.insert(store);
        Ok((&self.form, store))
    }

    pub fn store(&mut self) -> Result<&mut EntryStore> {
        Ok(self.parts()?.1)
    }

    pub fn entries(&mut self) -> Result<&[Entry]> {
        Ok(self.store()?.entries())
    }

    pub fn get(&mut self, key: i32) -> Result<Option<&Entry>> {
        Ok(self.store()?.get(key))
    }

    pub fn add(&mut self, supplier: &mut dyn ValueSupplier) -> Result<&Entry> {
        let (form, store) = self.parts()?;
        store.add(form, supplier)
    }

    pub fn edit(&mut self, key: i32, supplier: &mut dyn ValueSupplier) -> Result<bool> {
        let (form, store) = self.parts()?;
        store.edit(key, form, supplier)
    }

    pub fn delete(&mut self, key: i32) -> Result<bool> {
        self.store()?.delete(key)
    }

    pub fn page(&mut self, page: usize, page_size: usize) -> Result<Page<'_>> {
        Ok(self.store()?.page(page, page_size))
    }

    /// Default export location for the active form
    pub fn export_path(&self, format: ExportFormat) -> PathBuf {
        self.forms_dir.join(export_file_name(&self.form.name, format))
    }

    /// Exports the active form's entries
    ///
    /// Returns the written path, or `None` when there is nothing to export.
    pub fn export(&mut self, format: ExportFormat, path: Option<&Path>) -> Result<Option<PathBuf>> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.export_path(format));

        let (form, store) = self.parts()?;
        if store.is_empty() {
            return Ok(None);
        }

        write_export(&path, format, form, store.entries())?;
        Ok(Some(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChoiceOptions, Field, NumberType, Value, ValueError};
    use crate::storage::form_file::save_form;
    use std::collections::VecDeque;
    use std::fs;
    use tempfile::TempDir;

    struct Answers(VecDeque<&'static str>);

    impl Answers {
        fn new(answers: &[&'static str]) -> Self {
            Self(answers.iter().copied().collect())
        }

        fn next(&mut self) -> Result<String> {
            self.0
                .pop_front()
                .map(str::to_string)
                .ok_or_else(|| anyhow::anyhow!("no more answers"))
        }
    }

    impl ValueSupplier for Answers {
        fn text(&mut self, _field: &Field) -> Result<String> {
            self.next()
        }

        fn number(&mut self, _field: &Field, _number_type: NumberType) -> Result<String> {
            self.next()
        }

        fn choice(&mut self, _field: &Field, _options: &ChoiceOptions) -> Result<i64> {
            Ok(self.next()?.parse()?)
        }

        fn rejected(&mut self, _field: &Field, error: &ValueError) -> Result<()> {
            Err(anyhow::anyhow!("{}", error))
        }
    }

    fn people() -> Form {
        Form::with_fields(
            "people",
            [Field::text("Name"), Field::number("Age", NumberType::Int)],
        )
        .unwrap()
    }

    fn books() -> Form {
        Form::with_fields("books", [Field::text("Title")]).unwrap()
    }

    #[test]
    fn store_opens_lazily() {
        let dir = TempDir::new().unwrap();
        let mut session = Session::new(dir.path(), people());

        assert!(!session.is_store_open());
        assert!(session.entries().unwrap().is_empty());
        assert!(session.is_store_open());
    }

    #[test]
    fn open_loads_form_from_disk() {
        let dir = TempDir::new().unwrap();
        save_form(&dir.path().join("people.form"), &people()).unwrap();

        let session = Session::open(dir.path(), "people").unwrap();
        assert_eq!(session.form(), &people());
    }

    #[test]
    fn open_missing_form_fails() {
        let dir = TempDir::new().unwrap();
        assert!(Session::open(dir.path(), "ghost").is_err());
    }

    #[test]
    fn switching_forms_binds_a_new_store() {
        let dir = TempDir::new().unwrap();
        let mut session = Session::new(dir.path(), people());
        session.add(&mut Answers::new(&["Ann", "30"])).unwrap();

        session.select(books());
        assert!(!session.is_store_open());
        session.add(&mut Answers::new(&["Dune"])).unwrap();
        assert_eq!(session.entries().unwrap().len(), 1);

        session.select(people());
        let entries = session.entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].data["Name"], Value::from("Ann"));

        assert!(dir.path().join("people_entries.dat").exists());
        assert!(dir.path().join("books_entries.dat").exists());
    }

    #[test]
    fn edit_and_delete_go_through_store() {
        let dir = TempDir::new().unwrap();
        let mut session = Session::new(dir.path(), people());
        session.add(&mut Answers::new(&["Ann", "30"])).unwrap();
        session.add(&mut Answers::new(&["Bob", "40"])).unwrap();

        assert!(session.edit(2, &mut Answers::new(&["Rob", "41"])).unwrap());
        assert_eq!(
            session.get(2).unwrap().unwrap().data["Name"],
            Value::from("Rob")
        );

        assert!(session.delete(1).unwrap());
        assert!(!session.delete(7).unwrap());
        assert_eq!(session.get(1).unwrap().unwrap().data["Name"], Value::from("Rob"));
    }

    #[test]
    fn export_of_empty_store_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let mut session = Session::new(dir.path(), people());

        let written = session.export(ExportFormat::Csv, None).unwrap();
        assert_eq!(written, None);
        assert!(!dir.path().join("people_entries.csv").exists());
    }

    #[test]
    fn export_writes_default_path() {
        let dir = TempDir::new().unwrap();
        let mut session = Session::new(dir.path(), people());
        session.add(&mut Answers::new(&["Ann", "30"])).unwrap();

        let written = session.export(ExportFormat::Csv, None).unwrap().unwrap();
        assert_eq!(written, dir.path().join("people_entries.csv"));
        assert_eq!(
            fs::read_to_string(&written).unwrap(),
            "KEY,Name,Age\n1,\"Ann\",30\n"
        );
    }
}
