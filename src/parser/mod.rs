//! Readers for the tab-separated gazetteer dumps.
//!
//! Three inputs: the places dump, the country-info dump, and the
//! simplified-shapes dump. All are UTF-8 TSV without quoting. A missing
//! time zone drops the row with a diagnostic; every other malformed field
//! aborts the load.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use chrono::NaiveDate;
use flate2::read::GzDecoder;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::filter::NameFilter;
use crate::models::{CountryInfo, CountryRegion, PlaceRecord, DEFAULT_LANGUAGE};

/// Column count of the places dump.
pub const PLACE_COLUMNS: usize = 19;

/// Column count of the country-info dump.
pub const COUNTRY_COLUMNS: usize = 19;

/// Open a dump file, decoding gzip transparently for `.gz` paths.
pub fn open_input(path: &Path) -> Result<Box<dyn Read>> {
    let file = File::open(path).map_err(|source| Error::Input {
        path: path.to_path_buf(),
        source,
    })?;
    if path.extension().is_some_and(|e| e == "gz") {
        Ok(Box::new(GzDecoder::new(file)))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

fn tsv_reader<R: Read>(reader: R, headers: bool, comment: Option<u8>) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(headers)
        .quoting(false)
        .flexible(true)
        .comment(comment)
        .from_reader(reader)
}

fn line_of(record: &csv::StringRecord) -> u64 {
    record.position().map_or(0, csv::Position::line)
}

fn parse_i64(line: u64, field: &'static str, value: &str) -> Result<i64> {
    value.parse().map_err(|_| Error::Field {
        line,
        field,
        value: value.to_string(),
    })
}

fn parse_f64(line: u64, field: &'static str, value: &str) -> Result<f64> {
    value.parse().map_err(|_| Error::Field {
        line,
        field,
        value: value.to_string(),
    })
}

fn parse_opt_i32(line: u64, field: &'static str, value: &str) -> Result<Option<i32>> {
    if value.is_empty() {
        return Ok(None);
    }
    value.parse().map(Some).map_err(|_| Error::Field {
        line,
        field,
        value: value.to_string(),
    })
}

fn parse_opt_date(line: u64, field: &'static str, value: &str) -> Result<Option<NaiveDate>> {
    if value.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| Error::Field {
            line,
            field,
            value: value.to_string(),
        })
}

fn split_codes(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read the places dump.
///
/// Only records accepted by the filter are retained, and each retained
/// record gets a `replace_location` call ([`AcceptAll`](crate::filter::AcceptAll)
/// expresses an unfiltered load). Output preserves input order.
pub fn read_places<R: Read, F: NameFilter>(reader: R, filter: &F) -> Result<Vec<PlaceRecord>> {
    let mut csv_reader = tsv_reader(reader, false, None);
    let mut places = Vec::new();
    let mut dropped = 0usize;

    for row in csv_reader.records() {
        let row = row?;
        let line = line_of(&row);
        if row.len() != PLACE_COLUMNS {
            return Err(Error::ColumnCount {
                line,
                expected: PLACE_COLUMNS,
                found: row.len(),
            });
        }

        let timezone = &row[17];
        if timezone.is_empty() {
            warn!("line {}: dropping {:?}: no time zone", line, &row[1]);
            dropped += 1;
            continue;
        }

        let latitude = parse_f64(line, "latitude", &row[4])?;
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(Error::Range {
                line,
                field: "latitude",
                value: latitude,
            });
        }
        let longitude = parse_f64(line, "longitude", &row[5])?;
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(Error::Range {
                line,
                field: "longitude",
                value: longitude,
            });
        }

        let mut record = PlaceRecord {
            geoname_id: parse_i64(line, "geoname_id", &row[0])?,
            name: row[1].to_string(),
            ascii_name: row[2].to_string(),
            alternate_names: HashMap::new(),
            latitude,
            longitude,
            feature_class: row[6].to_string(),
            feature_code: row[7].to_string(),
            country_code: row[8].to_string(),
            alternate_country_codes: split_codes(&row[9]),
            admin_codes: [
                row[10].to_string(),
                row[11].to_string(),
                row[12].to_string(),
                row[13].to_string(),
            ],
            population: parse_i64(line, "population", &row[14])?,
            elevation: parse_opt_i32(line, "elevation", &row[15])?,
            dem: parse_opt_i32(line, "dem", &row[16])?,
            timezone: timezone.to_string(),
            modified: parse_opt_date(line, "modification date", &row[18])?,
        };
        record.add_name(DEFAULT_LANGUAGE, record.name.clone(), false);

        if !filter.accept(&record) {
            continue;
        }
        filter.replace_location(&mut record);
        places.push(record);
    }

    info!("read {} places ({} dropped without time zone)", places.len(), dropped);
    Ok(places)
}

/// Read the country-info dump. Comment lines (`#`) are skipped.
pub fn read_country_info<R: Read>(reader: R) -> Result<Vec<CountryInfo>> {
    let mut csv_reader = tsv_reader(reader, false, Some(b'#'));
    let mut countries = Vec::new();

    for row in csv_reader.records() {
        let row = row?;
        let line = line_of(&row);
        if row.len() != COUNTRY_COLUMNS {
            return Err(Error::ColumnCount {
                line,
                expected: COUNTRY_COLUMNS,
                found: row.len(),
            });
        }

        countries.push(CountryInfo {
            iso: row[0].to_string(),
            iso3: row[1].to_string(),
            iso_numeric: row[2].to_string(),
            name: row[4].to_string(),
            capital: row[5].to_string(),
            area: if row[6].is_empty() {
                0.0
            } else {
                parse_f64(line, "area", &row[6])?
            },
            population: if row[7].is_empty() {
                0
            } else {
                parse_i64(line, "population", &row[7])?
            },
            continent: row[8].to_string(),
            languages: row[15].to_string(),
            geoname_id: parse_i64(line, "geoname_id", &row[16])?,
            neighbours: split_codes(&row[17]),
        });
    }

    info!("read {} countries", countries.len());
    Ok(countries)
}

/// GeoJSON geometry as found in the simplified-shapes dump.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    Polygon {
        coordinates: Vec<Vec<[f64; 2]>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<[f64; 2]>>>,
    },
}

impl Geometry {
    fn add_to(&self, region: &mut CountryRegion) {
        match self {
            Geometry::Polygon { coordinates } => {
                for ring in coordinates {
                    for [lon, lat] in ring {
                        region.add_point(*lat, *lon);
                    }
                }
            }
            Geometry::MultiPolygon { coordinates } => {
                for polygon in coordinates {
                    for ring in polygon {
                        for [lon, lat] in ring {
                            region.add_point(*lat, *lon);
                        }
                    }
                }
            }
        }
    }
}

/// Read the simplified-shapes dump (header line, then `geoname_id TAB
/// geojson` rows) into one region per country code.
///
/// `id_to_country` maps a country's gazetteer id to its ISO code; rows
/// whose id is unknown are logged and skipped. Regions come back sorted by
/// country code.
pub fn read_shapes<R: Read>(
    reader: R,
    id_to_country: &HashMap<i64, String>,
) -> Result<Vec<CountryRegion>> {
    let mut csv_reader = tsv_reader(reader, true, None);
    let mut regions: BTreeMap<String, CountryRegion> = BTreeMap::new();
    let mut skipped = 0usize;

    for row in csv_reader.records() {
        let row = row?;
        let line = line_of(&row);
        if row.len() != 2 {
            return Err(Error::ColumnCount {
                line,
                expected: 2,
                found: row.len(),
            });
        }

        let geoname_id = parse_i64(line, "geoname_id", &row[0])?;
        let Some(country) = id_to_country.get(&geoname_id) else {
            warn!("line {}: no country for geoname id {}", line, geoname_id);
            skipped += 1;
            continue;
        };

        let geometry: Geometry = serde_json::from_str(&row[1])?;
        let region = regions
            .entry(country.clone())
            .or_insert_with(|| CountryRegion::new(country));
        geometry.add_to(region);
    }

    info!("read {} country outlines ({} skipped)", regions.len(), skipped);
    Ok(regions.into_values().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{AcceptAll, AllowListFilter};
    use std::io::Cursor;

    const JERUSALEM: &str = "281184\tJerusalem\tJerusalem\tYerushalayim,al-Quds\t31.76904\t35.21633\tP\tPPLC\tIL\t\tJM\t\t\t\t801000\t754\t786\tAsia/Jerusalem\t2024-01-05";
    const TEL_AVIV: &str = "293397\tTel Aviv\tTel Aviv\t\t32.08088\t34.78057\tP\tPPL\tIL\t\tTA\t\t\t\t432892\t\t15\tAsia/Jerusalem\t2024-01-05";
    const NO_ZONE: &str = "999999\tNowhere\tNowhere\t\t0.0\t0.0\tP\tPPL\tXX\t\t\t\t\t\t0\t\t\t\t2024-01-05";

    fn dump(lines: &[&str]) -> Cursor<String> {
        Cursor::new(lines.join("\n"))
    }

    #[test]
    fn test_reads_one_record_per_valid_line() {
        let places = read_places(dump(&[JERUSALEM, TEL_AVIV]), &AcceptAll).unwrap();
        assert_eq!(places.len(), 2);

        let rec = &places[0];
        assert_eq!(rec.geoname_id, 281184);
        assert_eq!(rec.feature_code, "PPLC");
        assert_eq!(rec.admin_codes[0], "JM");
        assert_eq!(rec.population, 801_000);
        assert_eq!(rec.elevation, Some(754));
        assert_eq!(rec.dem, Some(786));
        assert_eq!(rec.timezone, "Asia/Jerusalem");
        // The primary name is auto-inserted under the default language.
        assert_eq!(rec.alternate_names.len(), 1);
        assert_eq!(rec.name_for(DEFAULT_LANGUAGE), "Jerusalem");

        // Empty elevation column stays unset, distinct from 0.
        assert_eq!(places[1].elevation, None);
        assert_eq!(places[1].dem, Some(15));
    }

    #[test]
    fn test_missing_time_zone_drops_row_only() {
        let places = read_places(dump(&[JERUSALEM, NO_ZONE, TEL_AVIV]), &AcceptAll).unwrap();
        assert_eq!(places.len(), 2);
        // Input order is preserved.
        assert_eq!(places[0].geoname_id, 281184);
        assert_eq!(places[1].geoname_id, 293397);
    }

    #[test]
    fn test_malformed_numeric_field_is_fatal() {
        let bad = JERUSALEM.replace("31.76904", "thirty-one");
        let err = read_places(dump(&[&bad, TEL_AVIV]), &AcceptAll).unwrap_err();
        assert!(matches!(
            err,
            Error::Field {
                field: "latitude",
                ..
            }
        ));
    }

    #[test]
    fn test_out_of_range_coordinate_is_fatal() {
        let bad = JERUSALEM.replace("35.21633", "235.2");
        let err = read_places(dump(&[&bad]), &AcceptAll).unwrap_err();
        assert!(matches!(
            err,
            Error::Range {
                field: "longitude",
                ..
            }
        ));
    }

    #[test]
    fn test_wrong_column_count_is_fatal() {
        let err = read_places(dump(&["281184\tJerusalem\t31.7"]), &AcceptAll).unwrap_err();
        assert!(matches!(err, Error::ColumnCount { found: 3, .. }));
    }

    #[test]
    fn test_filter_selects_and_retargets() {
        let filter = AllowListFilter::jewish();
        let places = read_places(dump(&[JERUSALEM, NO_ZONE, TEL_AVIV]), &filter).unwrap();
        assert_eq!(places.len(), 2);
        // The Jerusalem patch moved the record to the curated location.
        assert_eq!(places[0].latitude, 31.7767);
        assert_eq!(places[0].longitude, 35.2345);
        // Unpatched entries keep their dump coordinates.
        assert_eq!(places[1].latitude, 32.08088);
    }

    #[test]
    fn test_country_info_skips_comments() {
        let input = "#ISO\tISO3\tISO-Numeric\tfips\tCountry\tCapital\tArea\tPopulation\tContinent\ttld\tCurrencyCode\tCurrencyName\tPhone\tPostal\tRegex\tLanguages\tgeonameid\tneighbours\tfips2\n\
            IL\tISR\t376\tIS\tIsrael\tJerusalem\t20770\t9800000\tAS\t.il\tILS\tShekel\t972\t#####\t^(\\d{5})$\the,ar-IL,en-IL\t294640\tSY,JO,LB,EG,PS\t";
        let countries = read_country_info(Cursor::new(input)).unwrap();
        assert_eq!(countries.len(), 1);
        assert_eq!(countries[0].iso, "IL");
        assert_eq!(countries[0].geoname_id, 294640);
        assert_eq!(countries[0].neighbours.len(), 5);
    }

    #[test]
    fn test_shapes_accumulate_per_country() {
        let shape = r#"{"type":"Polygon","coordinates":[[[34.0,29.0],[36.0,29.0],[36.0,33.0],[34.0,33.0],[34.0,29.0]]]}"#;
        let input = format!("geoNameId\tgeoJSON\n294640\t{shape}\n42\t{shape}");
        let ids = HashMap::from([(294640_i64, "IL".to_string())]);

        let regions = read_shapes(Cursor::new(input), &ids).unwrap();
        // The unknown id 42 is skipped, not fatal.
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].country_code, "IL");
        assert_eq!(regions[0].len(), 5);
    }
}
