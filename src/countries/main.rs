//! Country outline compiler.
//!
//! Reads the country-info and simplified-shapes dumps and emits the
//! country-outline resource document.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use tamarisk::emit::write_country_resources;
use tamarisk::parser::{open_input, read_country_info, read_shapes};

#[derive(Parser, Debug)]
#[command(name = "countries")]
#[command(about = "Compile country outlines into a resource document")]
struct Args {
    /// Country-info dump (tab separated, .gz accepted)
    #[arg(long, default_value = "countryInfo.txt")]
    country_info: PathBuf,

    /// Simplified-shapes dump
    #[arg(long, default_value = "shapes_simplified_low.txt")]
    shapes: PathBuf,

    /// Resource output directory
    #[arg(long, default_value = "res")]
    out: PathBuf,
}

fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    info!("Tamarisk country compiler");

    let countries = read_country_info(
        open_input(&args.country_info).context("failed to open country-info dump")?,
    )?;
    let id_to_country: HashMap<i64, String> = countries
        .iter()
        .map(|c| (c.geoname_id, c.iso.clone()))
        .collect();

    let regions = read_shapes(
        open_input(&args.shapes).context("failed to open shapes dump")?,
        &id_to_country,
    )?;

    write_country_resources(&regions, &args.out)
        .context("failed to write country resources")?;

    info!("done: {} countries under {}", regions.len(), args.out.display());
    Ok(())
}
