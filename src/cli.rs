use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::workflow::{Outcome, RunArgs};

#[derive(Parser, Debug)]
#[command(name = "pdfroi")]
#[command(about = "Select a region on a PDF page, then OCR, crop or upscale every page")]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to ./pdfroi.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (overrides the config file)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// OCR the selected region on every page into a CSV table
    Extract {
        #[command(flatten)]
        input: InputArgs,

        /// CSV path (defaults to ocr.output_path)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Crop every page to the selected region
    Crop {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Enlarge every page by the configured factor plus margin
    Upscale {
        #[command(flatten)]
        input: InputArgs,
    },
}

#[derive(Args, Debug)]
pub struct InputArgs {
    /// PDF to process; a file dialog opens when omitted
    #[arg(short, long)]
    pub input: Option<PathBuf>,
}

impl Commands {
    pub fn run_args(&self) -> RunArgs {
        match self {
            Commands::Extract { input, output } => RunArgs {
                input: input.input.clone(),
                output: output.clone(),
            },
            Commands::Crop { input } | Commands::Upscale { input } => RunArgs {
                input: input.input.clone(),
                output: None,
            },
        }
    }
}

/// Print the end-of-run line. Cancellations are not failures.
pub fn report(outcome: &Outcome, done: &str) {
    match outcome {
        Outcome::Written(path) => println!("{} {}", done, path.display()),
        Outcome::Cancelled(reason) => println!("{}", reason),
    }
}
