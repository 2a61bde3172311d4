//! Error type for the compile pipeline.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to read {path}: {source}")]
    Input {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("line {line}: expected {expected} columns, found {found}")]
    ColumnCount {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: malformed {field} field: {value:?}")]
    Field {
        line: u64,
        field: &'static str,
        value: String,
    },

    #[error("line {line}: {field} out of range: {value}")]
    Range {
        line: u64,
        field: &'static str,
        value: f64,
    },

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{provider} returned an unexpected body: {body:?}")]
    Provider {
        provider: &'static str,
        body: String,
    },

    #[error("elevation service returned no data for {lat},{lon}")]
    NoElevation { lat: f64, lon: f64 },
}
