//! Entry storage
//!
//! Entries of a form are stored in `Forms/<name>_entries.dat` as blocks:
//!
//! ```text
//! KEY:1
//! Name:string:Ann
//! Age:int:30
//! ---
//! ```
//!
//! Every mutation rewrites the whole file (temp file + rename).

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use fs2::FileExt;
use thiserror::Error;

use super::supplier::{resolve_value, ChoiceFallback, ValueSupplier};
use crate::domain::{Entry, Form, NumberType, Value, ValueError, VALUE_TAGS};

const KEY_PREFIX: &str = "KEY:";
const END_OF_ENTRY: &str = "---";

#[derive(Debug, Error, PartialEq)]
pub enum EntryParseError {
    #[error("line {line}: invalid entry key '{value}'")]
    InvalidKey { line: usize, value: String },

    #[error("line {line}: field '{field}': {source}")]
    InvalidValue {
        line: usize,
        field: String,
        #[source]
        source: ValueError,
    },
}

/// Parses the text of an entries file
///
/// Lines outside a `KEY:` ... `---` block, value lines without a kind, and
/// unknown kinds are skipped. A bad key or bad numeric text fails the load.
pub fn parse_entries(text: &str) -> Result<Vec<Entry>, EntryParseError> {
    let mut entries: Vec<Entry> = Vec::new();
    let mut in_entry = false;

    for (index, raw) in text.lines().enumerate() {
        let line_num = index + 1;
        let line = raw.strip_suffix('\r').unwrap_or(raw);

        if let Some(key) = line.strip_prefix(KEY_PREFIX) {
            let key = key.trim().parse().map_err(|_| EntryParseError::InvalidKey {
                line: line_num,
                value: key.to_string(),
            })?;
            entries.push(Entry::new(key));
            in_entry = true;
            continue;
        }

        if line == END_OF_ENTRY {
            in_entry = false;
            continue;
        }

        let Some(entry) = entries.last_mut().filter(|_| in_entry) else {
            continue;
        };

        let Some((name, kind, raw_value)) = split_value_line(line) else {
            continue;
        };

        let number_type = match kind {
            "string" => {
                entry.set(name, Value::from(raw_value));
                continue;
            }
            "int" => NumberType::Int,
            "float" => NumberType::Float,
            "double" => NumberType::Double,
            _ => continue,
        };

        let value = Value::parse_number(number_type, raw_value).map_err(|source| {
            EntryParseError::InvalidValue {
                line: line_num,
                field: name.to_string(),
                source,
            }
        })?;
        entry.set(name, value);
    }

    Ok(entries)
}

/// Splits `name:kind:value` at the first colon followed by a known kind
///
/// Names may contain colons, values may contain anything. A line ending
/// right after the kind has an empty value.
fn split_value_line(line: &str) -> Option<(&str, &'static str, &str)> {
    line.match_indices(':').find_map(|(at, _)| {
        let rest = &line[at + 1..];
        VALUE_TAGS.iter().find_map(|&tag| {
            let after = rest.strip_prefix(tag)?;
            if after.is_empty() {
                Some((&line[..at], tag, ""))
            } else {
                after.strip_prefix(':').map(|value| (&line[..at], tag, value))
            }
        })
    })
}

/// Serializes entries in store order
pub fn serialize_entries(entries: &[Entry]) -> String {
    let mut out = String::new();

    for entry in entries {
        out.push_str(&format!("{}{}\n", KEY_PREFIX, entry.key));
        for (name, value) in &entry.data {
            out.push_str(&format!("{}:{}:{}\n", name, value.tag(), value));
        }
        out.push_str(END_OF_ENTRY);
        out.push('\n');
    }

    out
}

/// Key the next added entry receives: one past the highest key, at least 1
///
/// `None` once the highest key is `i32::MAX`.
pub fn next_key_after(entries: &[Entry]) -> Option<i32> {
    match entries.iter().map(|e| e.key).max() {
        Some(max) => max.checked_add(1).map(|key| key.max(1)),
        None => Some(1),
    }
}

/// File name of a form's entries file
pub fn entries_file_name(form_name: &str) -> String {
    format!("{}_entries.dat", form_name)
}

/// Writes `contents` to `path` through a temp file and rename
pub(crate) fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

        file.lock_exclusive()
            .with_context(|| format!("Failed to acquire write lock on {}", temp_path.display()))?;

        let mut writer = BufWriter::new(&file);
        writer
            .write_all(contents.as_bytes())
            .with_context(|| format!("Failed to write {}", temp_path.display()))?;
        writer
            .flush()
            .with_context(|| format!("Failed to flush {}", temp_path.display()))?;
    }

    fs::rename(&temp_path, path).with_context(|| {
        format!(
            "Failed to rename {} to {}",
            temp_path.display(),
            path.display()
        )
    })?;

    Ok(())
}

/// One page of entries
#[derive(Debug)]
pub struct Page<'a> {
    pub entries: &'a [Entry],
    /// 1-based page number after clamping
    pub number: usize,
    pub total_pages: usize,
}

/// Write-through store of a form's entries
pub struct EntryStore {
    path: PathBuf,
    entries: Vec<Entry>,
    next_key: Option<i32>,
}

impl EntryStore {
    /// Creates an empty store backed by the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: Vec::new(),
            next_key: Some(1),
        }
    }

    /// Opens the store at `path`; a missing file is an empty store
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let mut store = Self::new(path);
        store.load()?;
        Ok(store)
    }

    /// Opens the store of a form inside the forms directory
    pub fn for_form(forms_dir: &Path, form_name: &str) -> Result<Self> {
        Self::open(forms_dir.join(entries_file_name(form_name)))
    }

    /// Returns the path to the store file
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Key of the next added entry, `None` when no key is left
    pub fn next_key(&self) -> Option<i32> {
        self.next_key
    }

    /// Finds the first entry with the given key
    pub fn get(&self, key: i32) -> Option<&Entry> {
        self.entries.iter().find(|e| e.key == key)
    }

    /// Replaces in-memory state with the file's contents
    pub fn load(&mut self) -> Result<()> {
        if !self.path.exists() {
            self.entries.clear();
            self.next_key = Some(1);
            return Ok(());
        }

        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open entry store: {}", self.path.display()))?;

        file.lock_shared()
            .context("Failed to acquire read lock on entry store")?;

        let mut text = String::new();
        (&file)
            .read_to_string(&mut text)
            .with_context(|| format!("Failed to read entry store: {}", self.path.display()))?;

        let entries = parse_entries(&text)
            .with_context(|| format!("Failed to parse entry store: {}", self.path.display()))?;

        self.next_key = next_key_after(&entries);
        self.entries = entries;
        Ok(())
    }

    /// Writes all entries to the store file (full rewrite)
    pub fn save(&self) -> Result<()> {
        write_atomic(&self.path, &serialize_entries(&self.entries))
    }

    /// Adds an entry with one value per form field and persists it
    pub fn add(&mut self, form: &Form, supplier: &mut dyn ValueSupplier) -> Result<&Entry> {
        let Some(key) = self.next_key else {
            bail!(
                "No entry keys left in {}: the highest key is already {}",
                self.path.display(),
                i32::MAX
            );
        };
        let mut entry = Entry::new(key);

        for field in form.fields() {
            if let Some(value) = resolve_value(field, supplier, ChoiceFallback::Empty)? {
                entry.set(field.name.clone(), value);
            }
        }

        self.next_key = key.checked_add(1);
        let index = self.entries.len();
        self.entries.push(entry);
        self.save()?;

        Ok(&self.entries[index])
    }

    /// Edits the entry with `key`, letting the supplier skip fields
    ///
    /// Returns `false` if no entry has that key. The store is only rewritten
    /// when a value was replaced.
    pub fn edit(
        &mut self,
        key: i32,
        form: &Form,
        supplier: &mut dyn ValueSupplier,
    ) -> Result<bool> {
        let Some(index) = self.entries.iter().position(|e| e.key == key) else {
            return Ok(false);
        };

        let mut changed = false;
        for field in form.fields() {
            let current = self.entries[index].value_for(field);
            if !supplier.should_replace(field, current)? {
                continue;
            }

            if let Some(value) = resolve_value(field, supplier, ChoiceFallback::Unchanged)? {
                self.entries[index].set(field.name.clone(), value);
                changed = true;
            }
        }

        if changed {
            self.save()?;
        }
        Ok(true)
    }

    /// Removes every entry with `key`, renumbers the rest from 1 and persists
    pub fn delete(&mut self, key: i32) -> Result<bool> {
        let before = self.entries.len();
        self.entries.retain(|e| e.key != key);
        if self.entries.len() == before {
            return Ok(false);
        }

        self.renumber();
        self.save()?;
        Ok(true)
    }

    /// Reassigns keys 1..=N in store order
    fn renumber(&mut self) {
        let mut key = 1;
        for entry in &mut self.entries {
            entry.key = key;
            key += 1;
        }
        self.next_key = Some(key);
    }

    /// Returns a page of entries, clamping the page number into range
    pub fn page(&self, page: usize, page_size: usize) -> Page<'_> {
        let page_size = page_size.max(1);
        let total_pages = self.entries.len().div_ceil(page_size);
        let number = page.clamp(1, total_pages.max(1));

        let start = ((number - 1) * page_size).min(self.entries.len());
        let end = (start + page_size).min(self.entries.len());

        Page {
            entries: &self.entries[start..end],
            number,
            total_pages,
        }
    }
}
