//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// pageopt HTML response optimizer CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Print debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path (default: pageopt.toml, searched upward)
    #[arg(
        short = 'C',
        long,
        global = true,
        default_value = "pageopt.toml",
        value_hint = clap::ValueHint::FilePath
    )]
    pub config: PathBuf,

    /// Hash registry file
    #[arg(
        long,
        global = true,
        default_value = "pageopt-registry.json",
        value_hint = clap::ValueHint::FilePath
    )]
    pub store: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Optimize an HTML page and print its Link header
    #[command(visible_alias = "o")]
    Optimize {
        #[command(flatten)]
        args: OptimizeArgs,
    },

    /// Print a generated file, as the asset responder would serve it
    #[command(visible_alias = "a")]
    Asset {
        /// Request URI, e.g. /min/e41d7.css
        uri: String,
    },
}

/// Optimize command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct OptimizeArgs {
    /// HTML file to optimize (`-` for stdin)
    #[arg(value_name = "INPUT", value_hint = clap::ValueHint::FilePath)]
    pub input: PathBuf,

    /// Write the optimized page here instead of stdout
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Request URI of the page, matched against `site.exclude_uris`
    #[arg(short, long, default_value = "/")]
    pub uri: String,

    /// Override `html.minify`
    #[arg(
        short,
        long,
        action = clap::ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true",
        require_equals = false
    )]
    pub minify: Option<bool>,
}
