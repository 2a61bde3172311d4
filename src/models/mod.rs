//! Core data models for the gazetteer pipeline.

pub mod country;
pub mod place;

pub use country::{CountryInfo, CountryRegion, GeoPoint, MAIN_VERTICES};
pub use place::{AlternateName, PlaceRecord, DEFAULT_LANGUAGE};
