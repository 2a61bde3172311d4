//! Elevation lookup providers.
//!
//! A provider contributes only its request URL and response parsing; the
//! fetch-and-fallback loop lives once in the enricher.

use crate::error::{Error, Result};

/// GeoNames srtm3 "no data" sentinel.
const SRTM3_NO_DATA: i32 = -32768;

pub trait ElevationProvider {
    fn name(&self) -> &'static str;

    /// Request URL for one coordinate.
    fn url(&self, lat: f64, lon: f64) -> String;

    /// Extract the elevation in meters from a response body.
    fn parse(&self, body: &str, lat: f64, lon: f64) -> Result<i32>;
}

/// Primary provider: GeoNames srtm3, plain-text integer body.
pub struct GeoNamesSrtm3 {
    pub base: String,
    pub username: String,
}

impl ElevationProvider for GeoNamesSrtm3 {
    fn name(&self) -> &'static str {
        "geonames-srtm3"
    }

    fn url(&self, lat: f64, lon: f64) -> String {
        format!(
            "{}/srtm3?lat={}&lng={}&username={}",
            self.base, lat, lon, self.username
        )
    }

    fn parse(&self, body: &str, lat: f64, lon: f64) -> Result<i32> {
        let value: i32 = body.trim().parse().map_err(|_| Error::Provider {
            provider: self.name(),
            body: body.trim().to_string(),
        })?;
        if value == SRTM3_NO_DATA {
            return Err(Error::NoElevation { lat, lon });
        }
        Ok(value)
    }
}

/// Fallback provider: Open-Elevation JSON lookup.
pub struct OpenElevation {
    pub base: String,
}

#[derive(Debug, serde::Deserialize)]
struct LookupResponse {
    results: Vec<LookupResult>,
}

#[derive(Debug, serde::Deserialize)]
struct LookupResult {
    elevation: f64,
}

impl ElevationProvider for OpenElevation {
    fn name(&self) -> &'static str {
        "open-elevation"
    }

    fn url(&self, lat: f64, lon: f64) -> String {
        format!("{}/api/v1/lookup?locations={},{}", self.base, lat, lon)
    }

    fn parse(&self, body: &str, lat: f64, lon: f64) -> Result<i32> {
        let response: LookupResponse = serde_json::from_str(body)?;
        response
            .results
            .first()
            .map(|r| r.elevation.round() as i32)
            .ok_or(Error::NoElevation { lat, lon })
    }
}
