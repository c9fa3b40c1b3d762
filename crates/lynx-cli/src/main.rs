mod cli;
mod commands;
mod config;
mod error;
mod logging;

use crate::cli::{Cli, Commands};
use crate::error::Result;
use clap::Parser;
use tracing::{debug, error, info};

fn main() {
    if let Err(e) = run_app() {
        eprintln!("\n❌ Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())?;

    info!("🚀 Lynx CLI v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    let file_config = config::load_file_config(cli.config.as_deref(), &cli.set_values)?;

    let command_result = match cli.command {
        Commands::Ff(args) => {
            info!("Dispatching to 'ff' command.");
            commands::ff::run(args, &file_config)
        }
        Commands::Morph(args) => {
            info!("Dispatching to 'morph' command.");
            commands::morph::run(args)
        }
        Commands::Generate(args) => {
            info!("Dispatching to 'generate' command.");
            commands::generate::run(args, &file_config)
        }
        Commands::Ci(args) => {
            info!("Dispatching to 'ci' command.");
            commands::ci::run(args, &file_config)
        }
    };

    match &command_result {
        Ok(_) => info!("✅ Command completed successfully."),
        Err(e) => error!("❌ Command failed: {}", e),
    }

    command_result
}
