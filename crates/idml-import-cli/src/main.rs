//! idml-import CLI - Import a magazine page from an IDML package
//!
//! Prints the recovered headline, lead, records and image assignments as
//! JSON. Warnings go to stderr; the exit status is non-zero only when the
//! package itself cannot be read.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use idml_import::{ImportOptions, Importer, LayoutMode, ManifestResolver};
use log::{debug, info};

#[derive(Parser, Debug)]
#[command(
    name = "idml-import",
    about = "Import a magazine page from an IDML package",
    long_about = "Import a magazine page from an InDesign IDML package.\n\
                  \n\
                  Classifies stories into headline, lead, teasers, info teasers or parallax\n\
                  items by paragraph style, and assigns each record the nearest placed image.\n\
                  \n\
                  Defaults can be set via a TOML configuration file (--config).",
    version
)]
struct Args {
    /// IDML package to import
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Page layout: teaser-list or parallax-list (overrides the config file)
    #[arg(short, long, value_name = "LAYOUT")]
    layout: Option<LayoutMode>,

    /// TOML file with import options
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// JSON object mapping info story ids to sort keys
    #[arg(long, value_name = "ORDER")]
    order: Option<PathBuf>,

    /// JSON manifest mapping asset filenames to ids
    #[arg(short, long, value_name = "ASSETS")]
    assets: Option<PathBuf>,

    /// Write JSON to this file instead of stdout
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Show processing details (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "error",
        1 => "info",
        _ => "debug",
    };
    // Log to stderr so stdout stays clean JSON
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Stderr)
        .init();
}

fn load_order(path: &Path) -> Result<HashMap<String, i64>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read order file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Order file is not a JSON object of sort keys: {}", path.display()))
}

fn build_options(args: &Args) -> Result<ImportOptions> {
    let mut options = match &args.config {
        Some(path) => ImportOptions::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => ImportOptions::default(),
    };

    if let Some(layout) = args.layout {
        options.layout = layout;
    }
    if let Some(path) = &args.order {
        options.order_override.extend(load_order(path)?);
    }
    Ok(options)
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let options = build_options(&args)?;
    debug!("Import options: {options:?}");

    let assets = args
        .assets
        .as_deref()
        .map(|path| {
            ManifestResolver::load(path)
                .with_context(|| format!("Failed to load asset manifest: {}", path.display()))
        })
        .transpose()?;

    let mut importer = Importer::new(options);
    if let Some(assets) = &assets {
        info!("Resolving images against {} known asset(s)", assets.len());
        importer = importer.with_resolver(assets);
    }

    let result = importer
        .import_file(&args.input)
        .with_context(|| format!("Failed to import {}", args.input.display()))?;

    for warning in &result.warnings {
        eprintln!("warning: {warning}");
    }

    let json = serde_json::to_string_pretty(&result).context("Failed to serialize import result")?;
    match &args.output {
        Some(path) => {
            fs::write(path, json + "\n")
                .with_context(|| format!("Failed to write output: {}", path.display()))?;
            info!("Wrote {}", path.display());
        }
        None => println!("{json}"),
    }

    Ok(())
}
