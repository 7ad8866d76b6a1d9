//! Flowguard CLI - security gap reports for data-flow models
//!
//! Loads a model document (YAML or TOML), runs every requirement through
//! the declared protections and reports what is left uncovered.
//!
//! # Examples
//!
//! ```bash
//! # Report unfilled requirements
//! flowguard check models/tenant.yaml
//!
//! # Fail the build when any requirement is unfilled
//! flowguard check --deny-gaps models/tenant.yaml
//!
//! # Expand a quantified model over concrete tenants
//! flowguard instantiate models/tenant.yaml --range tenant=acme,globex
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod check;
mod config;
mod instantiate;
mod model;
mod report;
mod show;

/// Flowguard CLI - requirement coverage for data-flow models
#[derive(Parser)]
#[command(name = "flowguard")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "FLOWGUARD_CONFIG")]
    #[arg(default_value = "~/.config/flowguard/config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report requirements no protection fills
    Check(check::CheckArgs),

    /// Print the elements of a model
    Show(show::ShowArgs),

    /// Expand a quantified model over concrete values
    Instantiate(instantiate::InstantiateArgs),

    /// Show current configuration
    Config,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("flowguard=debug,flow_guard=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = shellexpand::tilde(&cli.config).to_string();
    debug!(config_path = %config_path, "starting flowguard");

    match cli.command {
        Commands::Check(args) => check::execute(args, &config_path),
        Commands::Show(args) => show::execute(args),
        Commands::Instantiate(args) => instantiate::execute(args, &config_path),
        Commands::Config => config::show(&config_path),
    }
}
