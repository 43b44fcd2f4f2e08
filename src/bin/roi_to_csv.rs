//! OCR the selected region of every page into a CSV table.
//!
//! Usage: `roi_to_csv [file.pdf]`; without an argument a file dialog opens.

use anyhow::Result;
use std::path::PathBuf;

use pdf_roi::cli::report;
use pdf_roi::logging::init_logging;
use pdf_roi::workflow::{run_extract, RunArgs};
use pdf_roi::RoiConfig;

fn main() -> Result<()> {
    let config = RoiConfig::load(None)?;
    let _logging = init_logging(&config.logging)?;

    let args = RunArgs {
        input: std::env::args_os().nth(1).map(PathBuf::from),
        ..RunArgs::default()
    };
    let outcome = run_extract(&config, &args)?;
    report(&outcome, "Results written to:");
    Ok(())
}
