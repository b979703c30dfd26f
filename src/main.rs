//! Seriesgate CLI entry point

use clap::Parser;
use seriesgate::cli::{Command, args::Cli};
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let exit_code = match cli.command {
        Command::Validate { rulefile, format } => {
            seriesgate::cli::validate::run_validate(&rulefile, format, cli.color)
        }
        Command::Evaluate {
            rulefile,
            records,
            format,
        } => seriesgate::cli::evaluate::run_evaluate(&rulefile, &records, format, cli.color),
        Command::Inspect { responsefile } => seriesgate::cli::inspect::run_inspect(&responsefile),
    };

    process::exit(exit_code);
}
