//! pageopt - HTML response optimizer.

mod cli;

use std::fs;
use std::io::{Read, Write, stdin, stdout};
use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands, OptimizeArgs};
use pageopt::classify::FsResolver;
use pageopt::config::{PageoptConfig, find_config_file};
use pageopt::minify::DefaultMinifier;
use pageopt::pipeline::Pipeline;
use pageopt::registry::FileStore;
use pageopt::serve::{AssetResponder, CachePolicy};
use pageopt::{debug, debug_do, log, logger};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = load_config(&cli.config)?;
    let store = FileStore::new(&cli.store);
    let resolver = FsResolver::new(&config.site.root, config.site.home());

    match &cli.command {
        Commands::Optimize { args } => optimize(config, args, &store, &resolver),
        Commands::Asset { uri } => asset(&config, uri, &store, &resolver),
    }
}

/// Load the nearest config file, or defaults when there is none.
fn load_config(name: &Path) -> Result<PageoptConfig> {
    let cwd = std::env::current_dir().context("cannot read current directory")?;
    match find_config_file(&cwd, name) {
        Some(path) => {
            debug!("config"; "using {}", path.display());
            PageoptConfig::from_path(&path)
                .with_context(|| format!("failed to load {}", path.display()))
        }
        None => {
            debug!("config"; "{} not found, using defaults", name.display());
            Ok(PageoptConfig::default())
        }
    }
}

fn optimize(
    mut config: PageoptConfig,
    args: &OptimizeArgs,
    store: &FileStore,
    resolver: &FsResolver,
) -> Result<()> {
    if let Some(minify) = args.minify {
        config.html.minify = minify;
    }

    let html = read_input(&args.input)?;
    let minifier = DefaultMinifier;
    let out = Pipeline::new(&config, store, resolver, &minifier).optimize_request(html, &args.uri);

    debug_do! {
        let stages: Vec<String> = out.stages.iter().map(ToString::to_string).collect();
        debug!("optm"; "stages: {}", stages.join(" -> "));
    }

    match &args.output {
        Some(path) => fs::write(path, &out.html)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => stdout().write_all(out.html.as_bytes())?,
    }

    match out.link_header() {
        Some(header) => log!("push"; "Link: {}", header),
        None => debug!("push"; "no push hints"),
    }
    Ok(())
}

fn asset(
    config: &PageoptConfig,
    uri: &str,
    store: &FileStore,
    resolver: &FsResolver,
) -> Result<()> {
    let minifier = DefaultMinifier;
    let responder = AssetResponder::new(config, store, resolver, &minifier);
    let mut cache = CachePolicy::default();

    let Some(response) = responder.respond(uri, &mut cache) else {
        bail!("`{uri}` is not a generated file");
    };
    debug!("serve"; "{} {:?}", response.content_type, cache);
    if response.is_empty() {
        bail!("`{uri}` has no content");
    }
    stdout().write_all(response.body.as_bytes())?;
    Ok(())
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut html = String::new();
        stdin().read_to_string(&mut html).context("failed to read stdin")?;
        return Ok(html);
    }
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}
