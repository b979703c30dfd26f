//! CLI argument parsing and command dispatch

pub mod args;
pub mod evaluate;
pub mod inspect;
pub mod validate;

// Re-export types for convenient access
pub use args::{Cli, ColorChoice, Command, OutputFormat};

/// Command completed as requested
pub const EXIT_SUCCESS: i32 = 0;
/// Input was readable but failed validation or parsing
pub const EXIT_INVALID: i32 = 1;
/// I/O or usage error
pub const EXIT_ERROR: i32 = 2;
