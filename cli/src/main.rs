//! ZoneCodec CLI — the production command-line interface for ZoneCodec.
//!
//! # Commands
//! ```
//! zonecodec info    --shapefile <base>
//! zonecodec count   --shapefile <base>
//! zonecodec dump    --shapefile <base> --limit <N> [--json]
//! zonecodec import  --shapefile <base> --feed <path.dbx> [--batch-size N]
//!                   [--simplify] [--tolerance T] [--json]
//! ```
//!
//! `<base>` is the dataset base path with or without the `.shp`
//! extension; the `.dbf` sibling is found next to it.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod cmd_import;
mod cmd_inspect;

#[derive(Parser)]
#[command(
    name = "zonecodec",
    about = "NWS zone shapefile decoder and import pipeline — ZoneCodec CLI",
    long_about = "
ZoneCodec CLI: inspect and import NWS zone shapefiles.
Decodes the paired .shp/.dbf streams, links records to registered zone
codes, and drives the resumable batch import protocol to completion.

ENVIRONMENT VARIABLES:
  RUST_LOG    tracing filter, e.g. 'zonecodec_batch=debug'
",
    version
)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print both stream headers and the attribute field table
    Info {
        /// Dataset base path (with or without .shp)
        #[arg(short, long)]
        shapefile: PathBuf,
    },

    /// Drain the dataset and count paired entries
    Count {
        /// Dataset base path (with or without .shp)
        #[arg(short, long)]
        shapefile: PathBuf,
    },

    /// Print the first entries of the dataset
    Dump {
        /// Dataset base path (with or without .shp)
        #[arg(short, long)]
        shapefile: PathBuf,
        /// Entries to print
        #[arg(short, long, default_value_t = 10)]
        limit: u64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Load a zone feed and import geometry for every matched zone
    Import {
        /// Dataset base path (with or without .shp)
        #[arg(short, long)]
        shapefile: PathBuf,
        /// Pipe-delimited NWS county/zone feed file
        #[arg(short, long)]
        feed: PathBuf,
        /// Entries per batch call
        #[arg(long, default_value_t = 50)]
        batch_size: u32,
        /// Simplify rings over 100 points before applying
        #[arg(long)]
        simplify: bool,
        /// Simplification tolerance in decimal degrees
        #[arg(long, default_value_t = 0.01)]
        tolerance: f64,
        /// Attribute field carrying the zone key
        #[arg(long, default_value = "STATE_ZONE")]
        zone_field: String,
        /// Output the final summary as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Info { shapefile } => cmd_inspect::info(&shapefile),
        Commands::Count { shapefile } => cmd_inspect::count(&shapefile),
        Commands::Dump {
            shapefile,
            limit,
            json,
        } => cmd_inspect::dump(&shapefile, limit, json),
        Commands::Import {
            shapefile,
            feed,
            batch_size,
            simplify,
            tolerance,
            zone_field,
            json,
        } => cmd_import::run(
            &shapefile,
            &feed,
            batch_size,
            simplify,
            tolerance,
            &zone_field,
            json,
        ),
    }
}
