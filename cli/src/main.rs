#![deny(missing_docs)]

//! # Opinfer CLI
//!
//! Command Line Interface for endpoint operation inference.
//!
//! Supported Commands:
//! - `describe`: Parses actix-web handlers and prints their OpenAPI operations.

use crate::error::CliResult;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod describe;
mod error;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Infers OpenAPI operations from handler sources")]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[clap(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Describe the handlers found in a source file or directory.
    Describe(describe::DescribeArgs),
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> CliResult<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Describe(args) => describe::execute(args)?,
    }

    Ok(())
}
