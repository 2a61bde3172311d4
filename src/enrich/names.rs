//! Alternate-name lookup against the gazetteer's by-id endpoint.

use serde::Deserialize;

use crate::models::PlaceRecord;

/// Pseudo-language tags the gazetteer uses for links, postal codes and
/// transliteration schemes. Not display names; never merged.
const NON_LANGUAGE_TAGS: &[&str] = &["link", "post", "iata", "icao", "faac", "abbr", "unlc", "wkdt", "phon", "piny"];

/// Toponym payload of the lookup-by-id endpoint (`getJSON`, full style).
#[derive(Debug, Deserialize)]
pub struct Toponym {
    #[serde(rename = "geonameId", default)]
    pub geoname_id: i64,
    #[serde(rename = "alternateNames", default)]
    pub alternate_names: Vec<ToponymName>,
}

#[derive(Debug, Deserialize)]
pub struct ToponymName {
    /// Absent for bare names with no language tag.
    pub lang: Option<String>,
    pub name: String,
    #[serde(rename = "isPreferredName", default)]
    pub preferred: bool,
}

/// Merge every language-tagged name into the record's map. Later entries
/// overwrite earlier ones for the same language.
pub fn merge_names(toponym: &Toponym, record: &mut PlaceRecord) -> usize {
    let mut merged = 0;
    for entry in &toponym.alternate_names {
        let Some(lang) = entry.lang.as_deref() else {
            continue;
        };
        if NON_LANGUAGE_TAGS.contains(&lang) {
            continue;
        }
        record.add_name(lang, entry.name.clone(), entry.preferred);
        merged += 1;
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use crate::models::DEFAULT_LANGUAGE;

    fn record() -> PlaceRecord {
        let mut rec = PlaceRecord {
            geoname_id: 293397,
            name: "Tel Aviv".to_string(),
            ascii_name: "Tel Aviv".to_string(),
            alternate_names: HashMap::new(),
            latitude: 32.08,
            longitude: 34.78,
            feature_class: "P".to_string(),
            feature_code: "PPL".to_string(),
            country_code: "IL".to_string(),
            alternate_country_codes: Vec::new(),
            admin_codes: Default::default(),
            population: 432_892,
            elevation: None,
            dem: Some(15),
            timezone: "Asia/Jerusalem".to_string(),
            modified: None,
        };
        rec.add_name(DEFAULT_LANGUAGE, rec.name.clone(), false);
        rec
    }

    #[test]
    fn test_merge_keeps_languages_and_skips_links() {
        let body = r#"{
            "geonameId": 293397,
            "alternateNames": [
                {"lang": "he", "name": "תל אביב", "isPreferredName": true},
                {"lang": "ru", "name": "Тель-Авив"},
                {"lang": "link", "name": "https://en.wikipedia.org/wiki/Tel_Aviv"},
                {"name": "TLV"}
            ]
        }"#;
        let toponym: Toponym = serde_json::from_str(body).unwrap();
        let mut rec = record();

        let merged = merge_names(&toponym, &mut rec);
        assert_eq!(merged, 2);
        // default + he + ru
        assert_eq!(rec.alternate_names.len(), 3);
        assert_eq!(rec.name_for("he"), "תל אביב");
        assert!(rec.alternate_names["he"].preferred);
        assert!(!rec.alternate_names.contains_key("link"));
    }

    #[test]
    fn test_later_entries_overwrite_same_language() {
        let body = r#"{
            "alternateNames": [
                {"lang": "fr", "name": "Tel-Aviv"},
                {"lang": "fr", "name": "Tel Aviv-Jaffa", "isPreferredName": true}
            ]
        }"#;
        let toponym: Toponym = serde_json::from_str(body).unwrap();
        let mut rec = record();

        merge_names(&toponym, &mut rec);
        assert_eq!(rec.name_for("fr"), "Tel Aviv-Jaffa");
    }
}
