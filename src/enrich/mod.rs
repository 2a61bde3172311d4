//! Best-effort record enrichment over blocking HTTP.
//!
//! Two passes, each optional: elevation for records without one, alternate
//! names for records that only carry their own name. Every failure is
//! logged and leaves the record untouched; enrichment never fails a batch.

mod elevation;
mod names;

pub use elevation::{ElevationProvider, GeoNamesSrtm3, OpenElevation};
pub use names::{merge_names, Toponym, ToponymName};

use std::time::Duration;

use indicatif::ProgressBar;
use reqwest::blocking::Client;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::models::PlaceRecord;

/// Endpoints and credentials for the enrichment services, built once in
/// `main` and passed down.
#[derive(Debug, Clone)]
pub struct EnrichConfig {
    pub geonames_base: String,
    pub geonames_username: String,
    pub open_elevation_base: String,
}

impl EnrichConfig {
    pub fn new(geonames_username: &str) -> Self {
        Self {
            geonames_base: "http://api.geonames.org".to_string(),
            geonames_username: geonames_username.to_string(),
            open_elevation_base: "https://api.open-elevation.com".to_string(),
        }
    }
}

pub struct Enricher {
    client: Client,
    config: EnrichConfig,
}

impl Enricher {
    pub fn new(config: EnrichConfig) -> Self {
        Self {
            client: Client::builder()
                .user_agent("tamarisk/0.1 (gazetteer compiler)")
                .timeout(Duration::from_secs(30))
                .build()
                .expect("failed to create HTTP client"),
            config,
        }
    }

    /// Fill in elevations for records that lack one. Primary provider
    /// first, one fallback hop, then give up on that record.
    pub fn enrich_elevations(&self, records: &mut [PlaceRecord]) {
        let primary = GeoNamesSrtm3 {
            base: self.config.geonames_base.clone(),
            username: self.config.geonames_username.clone(),
        };
        let fallback = OpenElevation {
            base: self.config.open_elevation_base.clone(),
        };

        let pending = records.iter().filter(|r| r.elevation.is_none()).count();
        info!("fetching elevation for {} records", pending);
        let pb = ProgressBar::new(pending as u64);

        let mut enriched = 0usize;
        for record in records.iter_mut().filter(|r| r.elevation.is_none()) {
            pb.inc(1);
            match self.fetch_elevation(&primary, &fallback, record.latitude, record.longitude) {
                Some(meters) => {
                    record.elevation = Some(meters);
                    enriched += 1;
                }
                None => warn!(
                    "no elevation for {} ({},{})",
                    record.geoname_id, record.latitude, record.longitude
                ),
            }
        }
        pb.finish_and_clear();
        info!("elevation added to {}/{} records", enriched, pending);
    }

    fn fetch_elevation(
        &self,
        primary: &dyn ElevationProvider,
        fallback: &dyn ElevationProvider,
        lat: f64,
        lon: f64,
    ) -> Option<i32> {
        match self.lookup(primary, lat, lon) {
            Ok(meters) => Some(meters),
            Err(e) => {
                debug!("{} failed for {},{}: {}", primary.name(), lat, lon, e);
                self.lookup(fallback, lat, lon)
                    .map_err(|e| debug!("{} failed for {},{}: {}", fallback.name(), lat, lon, e))
                    .ok()
            }
        }
    }

    fn lookup(&self, provider: &dyn ElevationProvider, lat: f64, lon: f64) -> Result<i32> {
        let body = self
            .client
            .get(provider.url(lat, lon))
            .send()?
            .error_for_status()?
            .text()?;
        provider.parse(&body, lat, lon)
    }

    /// Fetch the full multilingual name set for records that only carry
    /// the auto-inserted default name.
    pub fn enrich_names(&self, records: &mut [PlaceRecord]) {
        let pending = records
            .iter()
            .filter(|r| r.alternate_names.len() <= 1)
            .count();
        info!("fetching alternate names for {} records", pending);
        let pb = ProgressBar::new(pending as u64);

        let mut enriched = 0usize;
        for record in records.iter_mut().filter(|r| r.alternate_names.len() <= 1) {
            pb.inc(1);
            match self.fetch_toponym(record.geoname_id) {
                Ok(toponym) => {
                    if merge_names(&toponym, record) > 0 {
                        enriched += 1;
                    }
                }
                Err(e) => warn!("name lookup failed for {}: {}", record.geoname_id, e),
            }
        }
        pb.finish_and_clear();
        info!("alternate names added to {}/{} records", enriched, pending);
    }

    fn fetch_toponym(&self, geoname_id: i64) -> Result<Toponym> {
        let url = format!(
            "{}/getJSON?geonameId={}&username={}&style=FULL",
            self.config.geonames_base, geoname_id, self.config.geonames_username
        );
        let toponym = self
            .client
            .get(url)
            .send()?
            .error_for_status()?
            .json::<Toponym>()?;
        Ok(toponym)
    }
}
