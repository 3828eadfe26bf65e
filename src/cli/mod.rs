//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Core | Project setup | `init` |
//! | Form | Schema management | `form create`, `form list`, `form show` |
//! | Entry | Record management | `entry add`, `entry edit`, `entry list` |
//! | Export | External formats | `export people --to sql` |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output:
//! ```bash
//! formkeep --verbose entry list people
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod entry;
mod export_cmd;
mod form;
mod output;
mod supply;

pub use app::{run, Cli, Commands};
pub use output::{Output, OutputFormat};
pub use supply::{parse_assignment, ArgsSupplier, ChoiceWarning, PromptSupplier};
