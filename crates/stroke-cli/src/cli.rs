//! CLI argument definitions for the stroke registry normalizer.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "stroke-normalize",
    version,
    about = "Normalize stroke registry (SSNAP) exports into an analysis-ready table",
    long_about = "Recode a raw stroke registry CSV export into a clean, fully numeric table.\n\n\
                  Every clean field is declared in a schema catalog; the clean table is\n\
                  validated against the raw export before it is written."
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

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

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

    /// Allow raw cell values in log output.
    ///
    /// Registry values are patient data; by default they are redacted.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Normalize a raw export and validate the result.
    Run(RunArgs),

    /// Validate an existing clean table against its raw export.
    Check(CheckArgs),

    /// List the fields and implications declared by a catalog.
    Catalog(CatalogArgs),
}

#[derive(Parser)]
pub struct RunArgs {
    /// Raw registry export (CSV with header row).
    #[arg(value_name = "RAW_CSV")]
    pub raw: PathBuf,

    /// Where to write the clean CSV.
    #[arg(
        long = "output",
        short = 'o',
        value_name = "PATH",
        required_unless_present = "dry_run"
    )]
    pub output: Option<PathBuf>,

    /// Schema catalog TOML (default: the bundled SSNAP catalog).
    #[arg(long = "catalog", value_name = "PATH", env = "STROKE_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Write the run report as JSON.
    #[arg(long = "report", value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Expected number of data rows (overrides the catalog).
    #[arg(long = "expected-rows", value_name = "N")]
    pub expected_rows: Option<usize>,

    /// Expected number of raw columns (overrides the catalog).
    #[arg(long = "expected-columns", value_name = "N")]
    pub expected_columns: Option<usize>,

    /// Normalize and validate without writing the clean table.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Treat warning-level check failures as errors.
    #[arg(long = "strict")]
    pub strict: bool,

    /// Write the clean table even when the run has errors.
    ///
    /// The exit status still reports the failure.
    #[arg(long = "keep-going")]
    pub keep_going: bool,
}

#[derive(Parser)]
pub struct CheckArgs {
    /// Raw registry export the clean table was produced from.
    #[arg(value_name = "RAW_CSV")]
    pub raw: PathBuf,

    /// Clean CSV to validate.
    #[arg(value_name = "CLEAN_CSV")]
    pub clean: PathBuf,

    /// Schema catalog TOML (default: the bundled SSNAP catalog).
    #[arg(long = "catalog", value_name = "PATH", env = "STROKE_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Expected number of data rows (overrides the catalog).
    #[arg(long = "expected-rows", value_name = "N")]
    pub expected_rows: Option<usize>,

    /// Expected number of raw columns (overrides the catalog).
    #[arg(long = "expected-columns", value_name = "N")]
    pub expected_columns: Option<usize>,

    /// Treat warning-level check failures as errors.
    #[arg(long = "strict")]
    pub strict: bool,
}

#[derive(Parser)]
pub struct CatalogArgs {
    /// Schema catalog TOML (default: the bundled SSNAP catalog).
    #[arg(long = "catalog", value_name = "PATH", env = "STROKE_CATALOG")]
    pub catalog: Option<PathBuf>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
