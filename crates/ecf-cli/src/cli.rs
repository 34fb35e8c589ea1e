//! CLI argument definitions for the e-CF batch driver.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "ecf",
    version,
    about = "DGII e-CF document builder - convert spreadsheet test cases to wire JSON",
    long_about = "Convert spreadsheet-described e-CF test cases to the DGII wire format.\n\n\
                  Reads a CSV whose headers are DGII column names (including\n\
                  bracket-indexed repeating groups like NumeroLinea[1]) and emits\n\
                  one JSON document per row. Rows fail independently."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build full e-CF documents from a CSV of test-case rows.
    Build(BuildArgs),

    /// Build commercial-approval (ACECF) documents from a CSV.
    Approve(ApproveArgs),
}

#[derive(Parser)]
pub struct BuildArgs {
    /// CSV file with one test case per record.
    #[arg(value_name = "CASES_CSV")]
    pub cases: PathBuf,

    /// Write NDJSON output to a file instead of stdout.
    #[arg(long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Route eligible consumer invoices (type 32 under 250,000) through
    /// the RFCE summary derivation, as the delivery service does.
    #[arg(long = "route-summary")]
    pub route_summary: bool,
}

#[derive(Parser)]
pub struct ApproveArgs {
    /// CSV file with one approval case per record.
    #[arg(value_name = "CASES_CSV")]
    pub cases: PathBuf,

    /// Write NDJSON output to a file instead of stdout.
    #[arg(long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
