//! # Storage Layer
//!
//! Persistence layer for formkeep with plain, hand-editable text files.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Forms | `kind:name[:subtype]` lines | `Forms/{name}.form` |
//! | Entries | `KEY:` / `name:kind:value` / `---` blocks | `Forms/{name}_entries.dat` |
//! | Config | TOML | `formkeep.toml` |
//!
//! ## Write Safety
//!
//! - Every mutation rewrites the whole file (temp file + rename)
//! - Writers hold an exclusive `fs2` lock; readers take a shared one
//!
//! ## Project Structure
//!
//! ```text
//! project/
//! ├── formkeep.toml         # Project configuration
//! └── Forms/
//!     ├── people.form       # Form definition
//!     ├── people_entries.dat
//!     └── people_entries.csv  # Export (also .json, .sql)
//! ```
//!
//! ## Key Types
//!
//! - [`Project`] - Entry point for accessing a formkeep project
//! - [`Session`] - The selected form and its lazily opened store
//! - [`EntryStore`] - Write-through store of a form's entries
//! - [`ValueSupplier`] - Where add/edit get their input from
//! - [`Config`] - Project and global configuration

mod config;
mod entries;
mod form_file;
mod project;
mod session;
mod supplier;

pub use config::{Config, ConfigError, GlobalConfig, OutputFormat, ProjectConfig};
pub use entries::{
    entries_file_name, next_key_after, parse_entries, serialize_entries, EntryParseError,
    EntryStore, Page,
};
pub use form_file::{
    form_name_from_path, load_form, parse_form, save_form, serialize_form, FormParseError,
    FORM_EXTENSION,
};
pub use project::{Project, ProjectError};
pub use session::Session;
pub use supplier::{ChoiceFallback, ValueSupplier};
