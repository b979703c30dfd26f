//! Validate command implementation
//!
//! Parses a rule file and reports whether it is loadable: every line matches
//! the grammar and the whole-file completeness checks pass.

use crate::cli::args::{ColorChoice, OutputFormat};
use crate::cli::{EXIT_ERROR, EXIT_INVALID, EXIT_SUCCESS};
use crate::output::ValidationReport;
use crate::rules::RuleSet;
use std::fs;
use std::path::Path;
use termcolor::StandardStream;

/// Run the validate command
///
/// Exit code 0 when the rule file is valid, 1 when it is not, 2 on I/O or
/// output errors.
pub fn run_validate(rulefile: &Path, format: OutputFormat, color: ColorChoice) -> i32 {
    let text = match fs::read_to_string(rulefile) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error: cannot read {}: {}", rulefile.display(), e);
            return EXIT_ERROR;
        }
    };

    let (report, exit_code) = match RuleSet::parse(&text) {
        Ok(rules) => (ValidationReport::from_ruleset(&rules), EXIT_SUCCESS),
        Err(e) => (ValidationReport::from_error(&e), EXIT_INVALID),
    };

    match format {
        OutputFormat::Human => {
            let mut stdout = StandardStream::stdout(color.for_stdout());
            if let Err(e) = report.write_human(&mut stdout) {
                eprintln!("Error: {}", e);
                return EXIT_ERROR;
            }
        }
        OutputFormat::Json => match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {}", e);
                return EXIT_ERROR;
            }
        },
    }

    exit_code
}
