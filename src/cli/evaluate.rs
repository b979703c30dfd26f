//! Evaluate command implementation
//!
//! Loads a rule file plus a JSON array of per-image attribute records and
//! prints the trigger decision: the per-image boolean vector and the
//! consecutiveness and position-availability verdicts.
//!
//! The records file is a JSON array of objects keyed by `"GGGG,EEEE"` tag
//! strings, values either numbers or strings:
//!
//! ```json
//! [{"0008,0060": "MR", "0018,0050": 2.0, "0020,0032": "-120.5\\-89.2\\42.5"}]
//! ```

use crate::cli::args::{ColorChoice, OutputFormat};
use crate::cli::{EXIT_ERROR, EXIT_INVALID, EXIT_SUCCESS};
use crate::engine::evaluate_series;
use crate::output::EvaluationReport;
use crate::rules::RuleSet;
use crate::types::AttributeRecord;
use std::fs;
use std::path::Path;
use termcolor::StandardStream;

/// Run the evaluate command
///
/// Exit code 0 on a completed evaluation, 1 when the rule file is invalid,
/// 2 on I/O or records-format errors.
pub fn run_evaluate(
    rulefile: &Path,
    records_file: &Path,
    format: OutputFormat,
    color: ColorChoice,
) -> i32 {
    let rule_text = match fs::read_to_string(rulefile) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error: cannot read {}: {}", rulefile.display(), e);
            return EXIT_ERROR;
        }
    };
    let rules = match RuleSet::parse(&rule_text) {
        Ok(rules) => rules,
        Err(e) => {
            eprintln!("Error: invalid rule file {}: {}", rulefile.display(), e);
            return EXIT_INVALID;
        }
    };

    let records_text = match fs::read_to_string(records_file) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error: cannot read {}: {}", records_file.display(), e);
            return EXIT_ERROR;
        }
    };
    let records: Vec<AttributeRecord> = match serde_json::from_str(&records_text) {
        Ok(records) => records,
        Err(e) => {
            eprintln!(
                "Error: invalid records file {}: {}",
                records_file.display(),
                e
            );
            return EXIT_ERROR;
        }
    };

    let decision = evaluate_series(&rules, &records);
    let report = EvaluationReport::new(&rules, &decision);

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

    EXIT_SUCCESS
}
