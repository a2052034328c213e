//! Rehash - rewrites asset references in a bundler's output to content-hashed filenames.

mod asset;
mod cli;
mod config;
mod logger;
mod rewrite;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands, run::BuildPhase};
use config::RehashConfig;
use logger::TermLogger;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let logger = TermLogger::new(cli.verbose());

    // Configuration errors are the only fatal ones
    let config = RehashConfig::load(&cli, &logger)?;

    match &cli.command {
        Commands::Run { args } => {
            let phase = BuildPhase::detect(args.ssr, &config);
            // Every outcome exits 0: the host build must not fail here
            cli::run::run_hook(&config, &phase, &logger, args.dry).map(|_| ())
        }
        Commands::Map { reconcile, pretty } => cli::query::run_map(&config, &logger, *reconcile, *pretty),
        Commands::Scan { pretty } => cli::query::run_scan(&config, &logger, *pretty),
    }
}
