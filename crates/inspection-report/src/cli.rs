//! Command-line interface for inspection-report.

use std::path::PathBuf;

use clap::Parser;

use crate::logging::Verbosity;

/// inspreport - Turn an inspection project export into a Typst report
///
/// Reads the JSON export of an inspection project, writes `report.typ` and
/// extracts every embedded photo into the `images` directory next to it.
#[derive(Debug, Parser)]
#[command(name = "inspreport")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Project JSON file (defaults to `[input] default_path` from the config)
    #[arg(value_name = "JSON")]
    pub input: Option<PathBuf>,

    /// Output directory (defaults to `typst_report`)
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Path to custom configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::Trace,
            }
        }
    }
}
