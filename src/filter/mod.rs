//! Place selection filters.
//!
//! A [`NameFilter`] decides which parsed records enter the working set and
//! may override a record's coordinates with a curated value. The parser
//! calls `accept` on every record and `replace_location` on every record it
//! retains.

use std::collections::HashSet;

use tracing::debug;

use crate::models::PlaceRecord;

/// Feature code of a national capital.
pub const FEATURE_CODE_CAPITAL: &str = "PPLC";

/// Filter capability set: select records, optionally retarget them.
pub trait NameFilter {
    /// Keep this record?
    fn accept(&self, record: &PlaceRecord) -> bool;

    /// Override the record's coordinates with a curated location.
    fn replace_location(&self, _record: &mut PlaceRecord) {}
}

/// Keeps everything. Used when a dump is consumed whole.
pub struct AcceptAll;

impl NameFilter for AcceptAll {
    fn accept(&self, _record: &PlaceRecord) -> bool {
        true
    }
}

/// A curated coordinate correction for one place.
#[derive(Debug, Clone, Copy)]
pub struct LocationPatch {
    pub geoname_id: i64,
    pub latitude: f64,
    pub longitude: f64,
}

/// Fixed allow-list of gazetteer ids with optional coordinate patches.
///
/// The id list is kept sorted so membership is a binary search.
pub struct AllowListFilter {
    ids: Vec<i64>,
    patches: &'static [LocationPatch],
}

impl AllowListFilter {
    pub fn new(ids: &[i64], patches: &'static [LocationPatch]) -> Self {
        let mut ids = ids.to_vec();
        ids.sort_unstable();
        Self { ids, patches }
    }

    /// Cities holy to or historically significant for the Bahá'í faith.
    pub fn bahai() -> Self {
        Self::new(BAHAI_CITIES, BAHAI_PATCHES)
    }

    /// Cities with major Jewish communities.
    pub fn jewish() -> Self {
        Self::new(JEWISH_CITIES, JEWISH_PATCHES)
    }
}

impl NameFilter for AllowListFilter {
    fn accept(&self, record: &PlaceRecord) -> bool {
        self.ids.binary_search(&record.geoname_id).is_ok()
    }

    fn replace_location(&self, record: &mut PlaceRecord) {
        if let Some(patch) = self
            .patches
            .iter()
            .find(|p| p.geoname_id == record.geoname_id)
        {
            debug!(
                "patching {} location to {},{}",
                record.geoname_id, patch.latitude, patch.longitude
            );
            record.latitude = patch.latitude;
            record.longitude = patch.longitude;
        }
    }
}

/// Accepts national capitals only. The substitute pass for countries
/// without one lives in [`select_capitals`].
pub struct CapitalFilter;

impl NameFilter for CapitalFilter {
    fn accept(&self, record: &PlaceRecord) -> bool {
        record.feature_code == FEATURE_CODE_CAPITAL
    }
}

/// Feature codes ordered least to most capital-like. Position is the rank;
/// codes not listed rank below everything here. The relative order is
/// load-bearing: it decides which settlement stands in for a missing
/// capital, so reordering entries changes output.
const FEATURE_RANK: &[&str] = &[
    "PPLW",  // destroyed populated place
    "PPLQ",  // abandoned populated place
    "PPLH",  // historical populated place
    "PPLR",  // religious populated place
    "PPLF",  // farm village
    "PPLL",  // populated locality
    "PPLS",  // populated places
    "PPLX",  // section of populated place
    "PPL",   // populated place
    "STLMT", // israeli settlement
    "PPLCH", // historical capital
    "PPLG",  // seat of government
    "PPLA4", // seat of fourth-order administrative division
    "PPLA3", // seat of third-order administrative division
    "PPLA2", // seat of second-order administrative division
    "PPLA",  // seat of first-order administrative division
    FEATURE_CODE_CAPITAL,
];

/// Rank of a feature code in the capital-substitute order. Unlisted codes
/// rank 0, below every listed code.
fn feature_rank(code: &str) -> usize {
    FEATURE_RANK
        .iter()
        .position(|c| *c == code)
        .map_or(0, |i| i + 1)
}

/// Two-pass capital selection over a full, unfiltered record set.
///
/// Pass one keeps every explicit capital. Pass two, for each country code
/// with no capital captured, picks the best substitute among that country's
/// records: highest feature-code rank, then larger population on a rank
/// tie. Countries are visited in order of first appearance in the input.
pub fn select_capitals(records: &[PlaceRecord]) -> Vec<PlaceRecord> {
    let filter = CapitalFilter;
    let mut selected: Vec<PlaceRecord> = Vec::new();
    let mut covered: HashSet<&str> = HashSet::new();

    for record in records {
        if filter.accept(record) {
            covered.insert(record.country_code.as_str());
            selected.push(record.clone());
        }
    }

    let mut seen: HashSet<&str> = HashSet::new();
    for record in records {
        let country = record.country_code.as_str();
        if covered.contains(country) || !seen.insert(country) {
            continue;
        }
        let substitute = records
            .iter()
            .filter(|r| r.country_code == country)
            .max_by(|a, b| {
                feature_rank(&a.feature_code)
                    .cmp(&feature_rank(&b.feature_code))
                    .then_with(|| a.population.cmp(&b.population))
            });
        if let Some(substitute) = substitute {
            debug!(
                "no capital for {}, substituting {} ({})",
                country, substitute.name, substitute.feature_code
            );
            selected.push(substitute.clone());
        }
    }

    selected
}

const BAHAI_CITIES: &[i64] = &[
    98182,   // Baghdad
    112931,  // Tehran
    232422,  // Kampala
    294801,  // Haifa
    295721,  // Acre
    745044,  // Istanbul
    747712,  // Edirne
    1261481, // New Delhi
    2147714, // Sydney
    2925533, // Frankfurt am Main
    3703443, // Panama City
    3871336, // Santiago
    4035413, // Apia
    4887398, // Chicago
    4916732, // Wilmette
];

const BAHAI_PATCHES: &[LocationPatch] = &[
    // Shrine of the Báb, not the Haifa city centroid.
    LocationPatch {
        geoname_id: 294801,
        latitude: 32.8136,
        longitude: 34.9858,
    },
    // Mansion of Bahjí, north of Acre proper.
    LocationPatch {
        geoname_id: 295721,
        latitude: 32.9433,
        longitude: 35.0922,
    },
];

const JEWISH_CITIES: &[i64] = &[
    281184,  // Jerusalem
    285046,  // Hebron
    293100,  // Safed
    293322,  // Tiberias
    293397,  // Tel Aviv
    294801,  // Haifa
    295514,  // Bnei Brak
    295530,  // Beersheba
    524901,  // Moscow
    698740,  // Odesa
    703448,  // Kyiv
    993800,  // Johannesburg
    2158177, // Melbourne
    2643743, // London
    2759794, // Amsterdam
    2761369, // Vienna
    2803138, // Antwerp
    2988507, // Paris
    3054643, // Budapest
    3435910, // Buenos Aires
    4347778, // Baltimore
    5110302, // Brooklyn
    5128581, // New York City
    5368361, // Los Angeles
    6077243, // Montreal
    6167865, // Toronto
];

const JEWISH_PATCHES: &[LocationPatch] = &[
    // Western Wall plaza, not the municipal centroid.
    LocationPatch {
        geoname_id: 281184,
        latitude: 31.7767,
        longitude: 35.2345,
    },
    // Old City of Safed.
    LocationPatch {
        geoname_id: 293100,
        latitude: 32.9658,
        longitude: 35.4983,
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn place(id: i64, country: &str, code: &str, population: i64) -> PlaceRecord {
        PlaceRecord {
            geoname_id: id,
            name: format!("place-{id}"),
            ascii_name: format!("place-{id}"),
            alternate_names: HashMap::new(),
            latitude: 10.0,
            longitude: 20.0,
            feature_class: "P".to_string(),
            feature_code: code.to_string(),
            country_code: country.to_string(),
            alternate_country_codes: Vec::new(),
            admin_codes: Default::default(),
            population,
            elevation: None,
            dem: None,
            timezone: "Etc/UTC".to_string(),
            modified: None,
        }
    }

    #[test]
    fn test_allow_list_round_trip() {
        // Shuffled on purpose; the constructor sorts.
        let ids = [5128581, 281184, 2643743, 524901, 293397];
        let filter = AllowListFilter::new(&ids, &[]);

        for id in ids {
            assert!(filter.accept(&place(id, "XX", "PPL", 0)), "{id} rejected");
        }
        assert!(!filter.accept(&place(42, "XX", "PPL", 0)));
        assert!(!filter.accept(&place(6167865, "XX", "PPL", 0)));
    }

    #[test]
    fn test_patch_replaces_coordinates_exactly() {
        let filter = AllowListFilter::jewish();
        let mut rec = place(281184, "IL", "PPLC", 800_000);
        rec.latitude = 31.769;
        rec.longitude = 35.216;

        filter.replace_location(&mut rec);
        assert_eq!(rec.latitude, 31.7767);
        assert_eq!(rec.longitude, 35.2345);
    }

    #[test]
    fn test_patch_is_noop_for_unpatched_ids() {
        let filter = AllowListFilter::jewish();
        let mut rec = place(293397, "IL", "PPL", 400_000);
        filter.replace_location(&mut rec);
        assert_eq!(rec.latitude, 10.0);
        assert_eq!(rec.longitude, 20.0);
    }

    #[test]
    fn test_explicit_capital_wins() {
        let records = vec![
            place(1, "AA", "PPLA", 9_000_000),
            place(2, "AA", "PPLC", 100),
            place(3, "BB", "PPL", 1_000),
            place(4, "BB", "PPLA", 500),
        ];
        let selected = select_capitals(&records);

        let aa: Vec<_> = selected.iter().filter(|r| r.country_code == "AA").collect();
        assert_eq!(aa.len(), 1);
        assert_eq!(aa[0].geoname_id, 2);

        // BB has no PPLC; the admin seat outranks the plain populated place
        // despite the smaller population.
        let bb: Vec<_> = selected.iter().filter(|r| r.country_code == "BB").collect();
        assert_eq!(bb.len(), 1);
        assert_eq!(bb[0].geoname_id, 4);
    }

    #[test]
    fn test_population_breaks_rank_ties() {
        let records = vec![
            place(1, "CC", "PPL", 5_000),
            place(2, "CC", "PPL", 50_000),
            place(3, "CC", "PPLW", 1_000_000),
        ];
        let selected = select_capitals(&records);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].geoname_id, 2);
    }

    #[test]
    fn test_admin_seat_outranks_historical_capital() {
        let records = vec![
            place(1, "DD", "PPLCH", 2_000_000),
            place(2, "DD", "PPLA", 30_000),
        ];
        let selected = select_capitals(&records);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].geoname_id, 2);
    }
}
