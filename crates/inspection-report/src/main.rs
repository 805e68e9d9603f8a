//! `inspreport` - CLI for inspection-report
//!
//! Generates `report.typ` and its images from an inspection project export.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::PathBuf;

use clap::Parser;

use inspection_report::cli::Cli;
use inspection_report::{init_logging, Config, ReportBuilder};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    let Some(input) = resolve_input(&cli, &config) else {
        println!("No project file given.");
        println!("Usage: inspreport [OPTIONS] <JSON>");
        println!(
            "Or set `[input] default_path` in {}",
            Config::default_config_path().display()
        );
        return Ok(());
    };

    let output_dir = cli
        .output_dir
        .clone()
        .unwrap_or_else(|| config.output.directory.clone());

    let builder = ReportBuilder::new(config);
    match builder.build(&input, &output_dir) {
        Ok(output) => {
            println!(
                "Typst report generated at {}",
                output.report_path.display()
            );
            println!("Images saved in {}", output.images_dir.display());
            if output.summary.photo_diagnostics > 0 {
                println!(
                    "{} photo(s) could not be extracted; see the comments in the report.",
                    output.summary.photo_diagnostics
                );
            }
            Ok(())
        }
        // Load failures are reported without a failing exit status
        Err(err) if err.is_load_error() => {
            println!("Error: {err}");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

/// The project file to use: the positional argument, else the configured default.
fn resolve_input(cli: &Cli, config: &Config) -> Option<PathBuf> {
    if let Some(path) = &cli.input {
        println!("Using project file from argument: {}", path.display());
        return Some(path.clone());
    }

    let path = config.input.default_path.clone()?;
    println!(
        "No argument given. Using configured default: {}",
        path.display()
    );
    Some(path)
}
