//! formkeep - user-defined forms with entries kept in plain text files
//!
//! A form is an ordered schema of text, number and choice fields stored in
//! `Forms/<name>.form`. Its entries live next to it in
//! `Forms/<name>_entries.dat` and can be exported to CSV, JSON or SQL.

pub mod cli;
pub mod domain;
pub mod export;
pub mod storage;

pub use domain::{Entry, Field, FieldKind, Form, NumberType, Value};
pub use storage::{EntryStore, Project, Session};
