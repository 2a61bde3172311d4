//! Tamarisk - an offline GeoNames gazetteer compiler
//!
//! This library provides the shared pipeline for the cities and countries
//! binaries: dump parsing, place selection, best-effort enrichment, and
//! resource document emission.

pub mod emit;
pub mod enrich;
pub mod error;
pub mod filter;
pub mod models;
pub mod parser;

pub use error::{Error, Result};
pub use models::{AlternateName, CountryInfo, CountryRegion, PlaceRecord};
