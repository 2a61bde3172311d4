//! City resource compiler.
//!
//! Reads a places dump, selects a curated city set, optionally enriches
//! it over the network, and emits per-language resource documents.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use tamarisk::emit::{sort_places, write_city_resources, LANGUAGES};
use tamarisk::enrich::{EnrichConfig, Enricher};
use tamarisk::filter::{select_capitals, AcceptAll, AllowListFilter};
use tamarisk::parser::{open_input, read_places};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CitySet {
    /// Cities significant to the Bahá'í faith.
    Bahai,
    /// Cities with major Jewish communities.
    Jewish,
    /// National capitals, with a substitute for countries lacking one.
    Capitals,
}

#[derive(Parser, Debug)]
#[command(name = "cities")]
#[command(about = "Compile a places dump into city resource documents")]
struct Args {
    /// Places dump to read (tab separated, .gz accepted)
    #[arg(short, long, default_value = "cities1000.txt")]
    file: PathBuf,

    /// Curated city set to select
    #[arg(long, value_enum, default_value = "capitals")]
    set: CitySet,

    /// Resource output directory
    #[arg(long, default_value = "res")]
    out: PathBuf,

    /// Fetch missing elevations
    #[arg(long)]
    elevations: bool,

    /// Fetch alternate-language names
    #[arg(long)]
    names: bool,

    /// GeoNames account for the lookup services
    #[arg(long)]
    geonames_username: Option<String>,
}

fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    info!("Tamarisk city compiler");
    info!("File: {}", args.file.display());

    let input = open_input(&args.file).context("failed to open places dump")?;

    let mut records = match args.set {
        CitySet::Bahai => read_places(input, &AllowListFilter::bahai())?,
        CitySet::Jewish => read_places(input, &AllowListFilter::jewish())?,
        CitySet::Capitals => {
            // Capitals need the full set: countries without an explicit
            // capital get their best substitute in a second pass.
            let all = read_places(input, &AcceptAll)?;
            select_capitals(&all)
        }
    };
    info!("selected {} cities", records.len());

    if args.elevations || args.names {
        match args.geonames_username.as_deref() {
            Some(username) => {
                let enricher = Enricher::new(EnrichConfig::new(username));
                if args.elevations {
                    enricher.enrich_elevations(&mut records);
                }
                if args.names {
                    enricher.enrich_names(&mut records);
                }
            }
            None => warn!("no GeoNames username given, skipping enrichment"),
        }
    }

    sort_places(&mut records);
    write_city_resources(&records, &args.out, LANGUAGES)
        .context("failed to write city resources")?;

    info!("done: {} cities under {}", records.len(), args.out.display());
    Ok(())
}
