//! Inspect command implementation
//!
//! Parses a semi-structured query response and prints the decoded tree as
//! pretty JSON. The `{}` sentinel and `null` both print as JSON null.

use crate::cli::{EXIT_ERROR, EXIT_INVALID, EXIT_SUCCESS};
use crate::response::parse_response;
use std::fs;
use std::path::Path;

/// Run the inspect command
///
/// Exit code 0 when the response parses, 1 when it does not, 2 on I/O errors.
pub fn run_inspect(responsefile: &Path) -> i32 {
    let text = match fs::read_to_string(responsefile) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error: cannot read {}: {}", responsefile.display(), e);
            return EXIT_ERROR;
        }
    };

    let value = match parse_response(&text) {
        Ok(value) => value,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_INVALID;
        }
    };

    match serde_json::to_string_pretty(&value.to_json()) {
        Ok(json) => {
            println!("{}", json);
            EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_ERROR
        }
    }
}
