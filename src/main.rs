//! formkeep - forms and their entries from the command line

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = formkeep::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
