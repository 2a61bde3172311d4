//! Resource document emitter.
//!
//! Serializes the working set into Android-style `<resources>` array XML:
//! one language-neutral document with every parallel array, plus one
//! document per display language carrying only the translatable name
//! array. All arrays share index order, which is fixed by [`sort_places`].

use std::cmp::Ordering;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use tracing::{info, warn};

use crate::error::Result;
use crate::models::{CountryRegion, GeoPoint, PlaceRecord, DEFAULT_LANGUAGE, MAIN_VERTICES};

/// Display languages the application ships. A language document is only
/// written when at least one record carries a name in that language.
pub const LANGUAGES: &[&str] = &[
    "ar", "bg", "cs", "da", "de", "el", "es", "et", "fi", "fr", "he", "hu", "it", "lt", "nl",
    "no", "pl", "pt", "ro", "ru", "sv", "tr", "uk",
];

/// Total order over places: longitude ascending (west before east), then
/// latitude descending via sign negation (north before south), then
/// resolved elevation, then name, then id. Consumers index the parallel
/// output arrays by position, so this order is part of the format.
pub fn place_order(a: &PlaceRecord, b: &PlaceRecord) -> Ordering {
    a.longitude
        .total_cmp(&b.longitude)
        .then_with(|| (-a.latitude).total_cmp(&(-b.latitude)))
        .then_with(|| {
            a.elevation_or_dem()
                .unwrap_or(0)
                .cmp(&b.elevation_or_dem().unwrap_or(0))
        })
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.geoname_id.cmp(&b.geoname_id))
}

pub fn sort_places(records: &mut [PlaceRecord]) {
    records.sort_by(place_order);
}

/// Decimal degrees to microdegrees, the integer unit of the output arrays.
fn microdegrees(degrees: f64) -> i64 {
    (degrees * 1_000_000.0).round() as i64
}

/// Android resource folder qualifier for a language. A few codes keep
/// their legacy spelling in resource paths.
fn resource_qualifier(language: &str) -> &str {
    match language {
        "he" => "iw",
        "id" => "in",
        "yi" => "ji",
        other => other,
    }
}

fn write_array<W: Write>(
    writer: &mut Writer<W>,
    kind: &str,
    name: &str,
    items: impl Iterator<Item = String>,
) -> Result<()> {
    let mut start = BytesStart::new(kind);
    start.push_attribute(("name", name));
    writer.write_event(Event::Start(start))?;
    for item in items {
        writer.write_event(Event::Start(BytesStart::new("item")))?;
        writer.write_event(Event::Text(BytesText::new(&item)))?;
        writer.write_event(Event::End(BytesEnd::new("item")))?;
    }
    writer.write_event(Event::End(BytesEnd::new(kind)))?;
    Ok(())
}

fn open_document(dir: &Path, file_name: &str) -> Result<Writer<BufWriter<File>>> {
    fs::create_dir_all(dir)?;
    let file = File::create(dir.join(file_name))?;
    let mut writer = Writer::new_with_indent(BufWriter::new(file), b' ', 4);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new("resources")))?;
    Ok(writer)
}

fn close_document<W: Write>(mut writer: Writer<W>) -> Result<()> {
    writer.write_event(Event::End(BytesEnd::new("resources")))?;
    writer.into_inner().flush()?;
    Ok(())
}

fn write_default_cities(records: &[PlaceRecord], dir: &Path) -> Result<()> {
    let mut writer = open_document(dir, "cities.xml")?;
    write_array(
        &mut writer,
        "string-array",
        "cities",
        records.iter().map(|r| r.name_for(DEFAULT_LANGUAGE).to_string()),
    )?;
    write_array(
        &mut writer,
        "string-array",
        "countries",
        records.iter().map(|r| r.country_code.clone()),
    )?;
    write_array(
        &mut writer,
        "integer-array",
        "latitudes",
        records.iter().map(|r| microdegrees(r.latitude).to_string()),
    )?;
    write_array(
        &mut writer,
        "integer-array",
        "longitudes",
        records.iter().map(|r| microdegrees(r.longitude).to_string()),
    )?;
    write_array(
        &mut writer,
        "string-array",
        "time_zones",
        records.iter().map(|r| r.timezone.clone()),
    )?;
    write_array(
        &mut writer,
        "integer-array",
        "elevations",
        records
            .iter()
            .map(|r| r.elevation_or_dem().unwrap_or(0).to_string()),
    )?;
    close_document(writer)
}

fn write_language_cities(records: &[PlaceRecord], language: &str, dir: &Path) -> Result<()> {
    let mut writer = open_document(dir, "cities.xml")?;
    write_array(
        &mut writer,
        "string-array",
        "cities",
        records.iter().map(|r| r.name_for(language).to_string()),
    )?;
    close_document(writer)
}

/// Write the city resource documents under `out_dir`.
///
/// The records must already be in [`sort_places`] order. The default
/// document is fatal on failure; a language document failure aborts that
/// document only.
pub fn write_city_resources(
    records: &[PlaceRecord],
    out_dir: &Path,
    languages: &[&str],
) -> Result<()> {
    write_default_cities(records, &out_dir.join("values"))?;
    info!("wrote default city document ({} records)", records.len());

    for &language in languages {
        if !records
            .iter()
            .any(|r| r.alternate_names.contains_key(language))
        {
            continue;
        }
        let dir = out_dir.join(format!("values-{}", resource_qualifier(language)));
        if let Err(e) = write_language_cities(records, language, &dir) {
            warn!("skipping {} city document: {}", language, e);
        }
    }
    Ok(())
}

/// Write the country-outline document under `out_dir`.
///
/// One entry per country, sorted by ISO code: a vertex count plus the
/// flattened coordinate arrays, capped at [`MAIN_VERTICES`] per country.
pub fn write_country_resources(regions: &[CountryRegion], out_dir: &Path) -> Result<()> {
    let mut sorted: Vec<&CountryRegion> = regions.iter().collect();
    sorted.sort_by(|a, b| a.country_code.cmp(&b.country_code));

    let outlines: Vec<(&str, Vec<GeoPoint>)> = sorted
        .iter()
        .map(|r| (r.country_code.as_str(), r.main_vertices(MAIN_VERTICES)))
        .collect();

    let mut writer = open_document(&out_dir.join("values"), "countries.xml")?;
    write_array(
        &mut writer,
        "string-array",
        "countries",
        outlines.iter().map(|(code, _)| (*code).to_string()),
    )?;
    write_array(
        &mut writer,
        "integer-array",
        "vertices_count",
        outlines.iter().map(|(_, v)| v.len().to_string()),
    )?;
    write_array(
        &mut writer,
        "integer-array",
        "latitudes",
        outlines
            .iter()
            .flat_map(|(_, v)| v.iter().map(|p| microdegrees(p.latitude).to_string())),
    )?;
    write_array(
        &mut writer,
        "integer-array",
        "longitudes",
        outlines
            .iter()
            .flat_map(|(_, v)| v.iter().map(|p| microdegrees(p.longitude).to_string())),
    )?;
    close_document(writer)?;

    info!("wrote country document ({} countries)", outlines.len());
    Ok(())
}
