use anyhow::Result;
use clap::Parser;
use tracing::error;

use pdf_roi::cli::{report, Cli, Commands};
use pdf_roi::logging::init_logging;
use pdf_roi::workflow::{run_crop, run_extract, run_upscale};
use pdf_roi::RoiConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = RoiConfig::load(cli.config.as_deref())?;
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    let _logging = init_logging(&config.logging)?;

    let args = cli.command.run_args();
    let (outcome, done) = match &cli.command {
        Commands::Extract { .. } => (run_extract(&config, &args), "Results written to:"),
        Commands::Crop { .. } => (run_crop(&config, &args), "PDF cropped and saved as:"),
        Commands::Upscale { .. } => (run_upscale(&config, &args), "Resized PDF saved as:"),
    };

    match outcome {
        Ok(outcome) => {
            report(&outcome, done);
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "{}", e.user_message());
            Err(e.into())
        }
    }
}
