//! Country metadata and outline accumulation.

use serde::{Deserialize, Serialize};

/// Default cap on outline vertices kept per country.
pub const MAIN_VERTICES: usize = 16;

/// One row of the country-info dump.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryInfo {
    /// ISO-3166 alpha-2, the key used throughout the pipeline.
    pub iso: String,
    pub iso3: String,
    pub iso_numeric: String,
    pub name: String,
    /// Capital name as spelled by the dump (informational only).
    pub capital: String,
    pub area: f64,
    pub population: i64,
    pub continent: String,
    /// Comma-separated locale list, as in the dump.
    pub languages: String,
    pub geoname_id: i64,
    pub neighbours: Vec<String>,
}

/// A geographic point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Accumulates every outline coordinate seen for one country and reduces
/// them to a low-resolution polygon.
#[derive(Debug, Clone)]
pub struct CountryRegion {
    pub country_code: String,
    points: Vec<GeoPoint>,
}

impl CountryRegion {
    pub fn new(country_code: &str) -> Self {
        Self {
            country_code: country_code.to_string(),
            points: Vec::new(),
        }
    }

    pub fn add_point(&mut self, latitude: f64, longitude: f64) {
        self.points.push(GeoPoint {
            latitude,
            longitude,
        });
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    fn centroid(&self) -> GeoPoint {
        let n = self.points.len() as f64;
        let (lat, lon) = self
            .points
            .iter()
            .fold((0.0, 0.0), |(lat, lon), p| (lat + p.latitude, lon + p.longitude));
        GeoPoint {
            latitude: lat / n,
            longitude: lon / n,
        }
    }

    /// Down-sample the accumulated points to at most `cap` vertices.
    ///
    /// Points are bucketed into `cap` equal angular sectors around the
    /// centroid and the farthest point in each sector survives; the first
    /// point seen wins a distance tie. Survivors come back ordered by
    /// sector, so the result traces the outline counter-clockwise.
    pub fn main_vertices(&self, cap: usize) -> Vec<GeoPoint> {
        if self.points.is_empty() || cap == 0 {
            return Vec::new();
        }
        let center = self.centroid();

        let sector_of = |p: &GeoPoint| -> usize {
            let angle = (p.latitude - center.latitude)
                .atan2(p.longitude - center.longitude)
                .rem_euclid(std::f64::consts::TAU);
            let sector = (angle / (std::f64::consts::TAU / cap as f64)) as usize;
            sector.min(cap - 1)
        };
        let distance2 = |p: &GeoPoint| -> f64 {
            let dy = p.latitude - center.latitude;
            let dx = p.longitude - center.longitude;
            dy * dy + dx * dx
        };

        let mut best: Vec<Option<(f64, GeoPoint)>> = vec![None; cap];
        for point in &self.points {
            let sector = sector_of(point);
            let d = distance2(point);
            match &best[sector] {
                Some((max, _)) if *max >= d => {}
                _ => best[sector] = Some((d, *point)),
            }
        }

        best.into_iter().flatten().map(|(_, p)| p).collect()
    }
}
