//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Post-build asset reference rewriter
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Source directory path (relative to project root)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub src: Option<PathBuf>,

    /// Build output directory path (relative to project root)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Override the canonical site URL used to recognize absolute references.
    ///
    /// Useful when a preview deployment is served from a different origin
    /// than production.
    #[arg(short = 'U', long = "site-url", value_hint = clap::ValueHint::Url)]
    pub site_url: Option<String>,

    /// Config file path (default: rehash.toml)
    #[arg(short = 'C', long, default_value = "rehash.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Rewrite asset references in the client build (post-bundle hook)
    #[command(visible_alias = "r")]
    Run {
        #[command(flatten)]
        args: RunArgs,
    },

    /// Print the output mapping (original path -> hashed path) as JSON
    #[command(visible_alias = "m")]
    Map {
        /// Include entries the reconciler would add (nothing is copied)
        #[arg(short, long)]
        reconcile: bool,

        /// Pretty-print JSON output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Print the asset references found in the source tree as JSON
    #[command(visible_alias = "s")]
    Scan {
        /// Pretty-print JSON output
        #[arg(short, long)]
        pretty: bool,
    },
}

/// Arguments of the `run` hook.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// The host is running an SSR (client + worker) build
    #[arg(long)]
    pub ssr: bool,

    /// Report what would change without writing anything
    #[arg(short, long)]
    pub dry: bool,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,
}

impl Cli {
    /// Verbose logging is a `run` option; queries stay quiet.
    pub const fn verbose(&self) -> bool {
        matches!(self.command, Commands::Run { args: RunArgs { verbose: true, .. } })
    }
}
