//! Gazetteer place record and its multilingual name map.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Language key the primary name is stored under.
pub const DEFAULT_LANGUAGE: &str = "default";

/// A place name in one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlternateName {
    pub language: String,
    pub name: String,
    /// Marked preferred by the gazetteer for its language.
    pub preferred: bool,
}

/// One row of the places dump.
///
/// Built by the parser, optionally retargeted by a filter's coordinate
/// override, optionally enriched in place, immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceRecord {
    /// Gazetteer identifier, unique within a loaded set.
    pub geoname_id: i64,

    /// Primary name (UTF-8).
    pub name: String,

    /// Name transliterated to plain ASCII.
    pub ascii_name: String,

    /// Localized names keyed by language code. At most one entry per
    /// language; later writes win.
    pub alternate_names: HashMap<String, AlternateName>,

    /// Decimal degrees, [-90, 90].
    pub latitude: f64,

    /// Decimal degrees, [-180, 180].
    pub longitude: f64,

    /// Feature class (one letter, e.g. "P" for populated places).
    pub feature_class: String,

    /// Feature code, ranks settlement importance (e.g. "PPLC").
    pub feature_code: String,

    /// ISO-3166 alpha-2.
    pub country_code: String,

    /// Alternate country codes, comma separated in the dump.
    pub alternate_country_codes: Vec<String>,

    /// Administrative subdivision codes, up to 4 levels.
    pub admin_codes: [String; 4],

    pub population: i64,

    /// Meters. Empty column in the dump means unset, distinct from 0.
    pub elevation: Option<i32>,

    /// Digital elevation model value, meters.
    pub dem: Option<i32>,

    /// IANA time-zone identifier. Never empty in the working set; the
    /// parser drops rows without one.
    pub timezone: String,

    /// Last modification date of the row.
    pub modified: Option<NaiveDate>,
}

impl PlaceRecord {
    /// Add a name in a specific language. Later writes replace earlier
    /// ones for the same language.
    pub fn add_name(&mut self, language: &str, name: String, preferred: bool) {
        self.alternate_names.insert(
            language.to_string(),
            AlternateName {
                language: language.to_string(),
                name,
                preferred,
            },
        );
    }

    /// Localized name for `language`, falling back to the primary name.
    pub fn name_for(&self, language: &str) -> &str {
        self.alternate_names
            .get(language)
            .map_or(self.name.as_str(), |n| n.name.as_str())
    }

    /// Elevation used for output: explicit value if present, else the DEM.
    pub fn elevation_or_dem(&self) -> Option<i32> {
        self.elevation.or(self.dem)
    }
}
