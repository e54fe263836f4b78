//! field-filter: request field filter
//!
//! A CLI that evaluates request descriptions against the configured field
//! filters, and validates or generates the configuration used by the
//! middleware.

use anyhow::Result;
use clap::Parser;

use field_filter::cli::{Cli, Commands};
use field_filter::config::ConfigService;
use field_filter::domain::{self, FilterChain};
use field_filter::service::FilterService;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Commands that never read the configuration
    match &cli.command {
        Commands::Init { path, force } => {
            let config_path = path.clone().unwrap_or_else(ConfigService::default_path);
            ConfigService::generate_at(&config_path, *force)?;
            if !cli.quiet {
                eprintln!("Configuration file created at: {}", config_path.display());
            }
            return Ok(());
        }
        Commands::Version => {
            println!("field-filter {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Commands::Run { .. } | Commands::Check => {}
    }

    // Load configuration
    let config = ConfigService::load(cli.config.as_deref())?;

    // Initialize logging if debug mode
    if cli.debug || config.debug {
        domain::logger::init(&config)?;
    }

    match cli.command {
        Commands::Run { format } => {
            let service = FilterService::new(&config, format)?;
            service.run()?;
        }
        Commands::Check => {
            // Build the same chain the middleware would serve with
            let chain = FilterChain::new(&config)?;
            if !cli.quiet {
                eprintln!(
                    "Configuration is valid ({} filter{}).",
                    chain.len(),
                    if chain.len() == 1 { "" } else { "s" }
                );
            }
        }
        Commands::Init { .. } | Commands::Version => {}
    }

    Ok(())
}
