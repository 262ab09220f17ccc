//! Geolocation disambiguation: a free-text profile location plus optional
//! timezone and language hints in, exactly one canonical `Place` out.
//!
//! Most profile locations are ambiguous ("springfield" matches dozens of
//! records). Disambiguation narrows candidates with secondary signals —
//! timezone, US state code — and falls back to population as a prior for
//! the most likely intended place.

use anyhow::Result;
use async_trait::async_trait;

use crate::place::{CityRecord, Place};
use crate::tables::{iana_timezone, is_us_timezone, us_state_code, COMMA_STATE_SUBSTITUTIONS};

/// Read-only access to the city reference collection.
#[async_trait]
pub trait CityRepository: Send + Sync {
    /// Exact-match lookup on the lowercase canonical name.
    async fn find_by_name(&self, name: &str) -> Result<Vec<CityRecord>>;

    /// Closest record to the given coordinate, if any.
    async fn find_near(&self, lng: f64, lat: f64) -> Result<Option<CityRecord>>;
}

/// Outcome of a location lookup. Status 200 carries a place; status 500
/// means not found or over-filtered. A structured result, never an error:
/// the caller decides whether to proceed without location data.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupResult {
    pub status: u16,
    pub message: String,
    pub place: Option<Place>,
}

impl LookupResult {
    fn ok(place: Place) -> Self {
        Self {
            status: 200,
            message: "OK".to_string(),
            place: Some(place),
        }
    }

    fn not_found() -> Self {
        Self {
            status: 500,
            message: "not found".to_string(),
            place: None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.status == 200
    }
}

/// Resolve a free-text location string to a single place.
///
/// The raw text is lowercased, comma-bearing region names are folded into
/// single tokens, and the result is comma-split. The first token is the city
/// name query; a two-letter second token is treated as a US state or country
/// code. "In-US" context (timezone unset or a US zone) additionally swaps
/// full state names for their codes before the query.
pub async fn determine_location(
    repo: &dyn CityRepository,
    raw_text: &str,
    timezone: Option<&str>,
    language: Option<&str>,
) -> Result<LookupResult> {
    let mut location = raw_text.to_lowercase();

    let mut timezone = timezone.unwrap_or("").to_string();
    if let Some(zone) = iana_timezone(&timezone) {
        timezone = zone.to_string();
    }

    // Fold region names containing commas into single tokens so the
    // comma-split below cannot corrupt them.
    for (literal, replacement) in COMMA_STATE_SUBSTITUTIONS {
        location = location.replace(literal, replacement);
    }

    let mut tokens: Vec<String> = location.split(',').map(|t| t.trim().to_string()).collect();

    if tokens.len() == 2 && tokens[1].len() == 2 {
        tokens[1] = tokens[1].to_uppercase();
    }

    let in_us = timezone.is_empty() || is_us_timezone(&timezone);
    if in_us {
        for token in &mut tokens {
            if let Some(code) = us_state_code(token) {
                *token = code.to_string();
            }
        }
    }

    let candidates = repo.find_by_name(&tokens[0]).await?;

    let result = match candidates.len() {
        0 => LookupResult::not_found(),
        1 => LookupResult::ok(Place::from_city(&candidates[0])),
        _ => disambiguate(candidates, &tokens, &timezone, in_us, language),
    };
    Ok(result)
}

/// Narrow a multi-candidate match down to one place.
///
/// The state-code filter is asymmetric on purpose: in-US context hard-filters
/// on the admin1 code (an empty result is a legitimate miss), while a
/// two-letter second token outside US context only narrows when it leaves at
/// least one candidate — such tokens are confusable with unrelated
/// abbreviations and must not over-constrain.
fn disambiguate(
    candidates: Vec<CityRecord>,
    tokens: &[String],
    timezone: &str,
    in_us: bool,
    language: Option<&str>,
) -> LookupResult {
    let mut results = candidates;

    // Timezone narrows but never empties the candidate set.
    if !timezone.is_empty() {
        let filtered: Vec<CityRecord> = results
            .iter()
            .filter(|c| c.timezone == timezone)
            .cloned()
            .collect();
        if !filtered.is_empty() {
            results = filtered;
        }
    }

    if in_us && tokens.len() > 1 && tokens[1].len() == 2 {
        results.retain(|c| c.admin1_code == tokens[1]);
    } else if tokens.len() == 2 && tokens[1].len() == 2 {
        let filtered: Vec<CityRecord> = results
            .iter()
            .filter(|c| c.admin1_code == tokens[1])
            .cloned()
            .collect();
        if !filtered.is_empty() {
            results = filtered;
        }
    }

    results = filter_by_language(results, language);

    if results.is_empty() {
        return LookupResult::not_found();
    }

    // Population as a prior for "most likely intended place" when the
    // textual signals are insufficient.
    results.sort_by(|a, b| b.population.cmp(&a.population));
    LookupResult::ok(Place::from_city(&results[0]))
}

/// Language-based candidate filtering. Recognized refinement, not yet
/// implemented: candidates pass through unchanged. Kept as an explicit
/// extension point rather than folded away.
fn filter_by_language(candidates: Vec<CityRecord>, _language: Option<&str>) -> Vec<CityRecord> {
    candidates
}

/// Resolve a coordinate to the closest known city. No disambiguation is
/// needed — geometry is unambiguous.
pub async fn nearest_city(
    repo: &dyn CityRepository,
    lng: f64,
    lat: f64,
) -> Result<Option<Place>> {
    let record = repo.find_near(lng, lat).await?;
    Ok(record.map(|r| Place::from_city(&r)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// HashMap-backed repository: name → candidate records.
    struct MapRepo {
        cities: HashMap<String, Vec<CityRecord>>,
    }

    impl MapRepo {
        fn new() -> Self {
            Self {
                cities: HashMap::new(),
            }
        }

        fn with(mut self, records: Vec<CityRecord>) -> Self {
            for record in records {
                self.cities
                    .entry(record.name.clone())
                    .or_default()
                    .push(record);
            }
            self
        }
    }

    #[async_trait]
    impl CityRepository for MapRepo {
        async fn find_by_name(&self, name: &str) -> Result<Vec<CityRecord>> {
            Ok(self.cities.get(name).cloned().unwrap_or_default())
        }

        async fn find_near(&self, _lng: f64, _lat: f64) -> Result<Option<CityRecord>> {
            Ok(self
                .cities
                .values()
                .flatten()
                .max_by_key(|c| c.population)
                .cloned())
        }
    }

    fn city(
        name: &str,
        admin1_code: &str,
        admin1: &str,
        timezone: &str,
        population: i64,
    ) -> CityRecord {
        CityRecord {
            name: name.into(),
            country: "United States".into(),
            country_code: "US".into(),
            admin1_code: admin1_code.into(),
            admin1: admin1.into(),
            timezone: timezone.into(),
            population,
            location: [-93.2650, 44.9778],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn zero_matches_yield_500_with_no_place() {
        let repo = MapRepo::new();
        let result = determine_location(&repo, "Atlantis", None, None)
            .await
            .unwrap();
        assert_eq!(result.status, 500);
        assert!(result.place.is_none());
    }

    #[tokio::test]
    async fn single_match_resolves_directly() {
        let record = city("duluth", "MN", "Minnesota", "America/Chicago", 86_697);
        let repo = MapRepo::new().with(vec![record.clone()]);
        let result = determine_location(&repo, "Duluth", None, None)
            .await
            .unwrap();
        assert_eq!(result.status, 200);
        assert_eq!(result.place, Some(Place::from_city(&record)));
    }

    #[tokio::test]
    async fn population_breaks_remaining_ties() {
        let repo = MapRepo::new().with(vec![
            city("springfield", "MA", "Massachusetts", "America/New_York", 50_000),
            city("springfield", "MO", "Missouri", "America/Chicago", 200_000),
            city("springfield", "VT", "Vermont", "America/New_York", 10_000),
        ]);
        let result = determine_location(&repo, "Springfield", None, None)
            .await
            .unwrap();
        assert_eq!(result.status, 200);
        assert_eq!(result.place.unwrap().state, "Missouri");
    }

    #[tokio::test]
    async fn timezone_filter_narrows_candidates() {
        let repo = MapRepo::new().with(vec![
            city("portland", "OR", "Oregon", "America/Los_Angeles", 650_000),
            city("portland", "ME", "Maine", "America/New_York", 66_000),
        ]);
        let result = determine_location(
            &repo,
            "Portland",
            Some("Eastern Time (US & Canada)"),
            None,
        )
        .await
        .unwrap();
        assert_eq!(result.place.unwrap().state, "Maine");
    }

    #[tokio::test]
    async fn timezone_filter_never_empties_the_set() {
        // Neither candidate is in the hinted zone; the filter must be
        // dropped rather than forcing a 500.
        let repo = MapRepo::new().with(vec![
            city("portland", "OR", "Oregon", "America/Los_Angeles", 650_000),
            city("portland", "ME", "Maine", "America/New_York", 66_000),
        ]);
        let result = determine_location(&repo, "Portland", Some("America/Phoenix"), None)
            .await
            .unwrap();
        assert_eq!(result.status, 200);
        assert_eq!(result.place.unwrap().state, "Oregon");
    }

    #[tokio::test]
    async fn in_us_state_code_filter_is_hard() {
        // "portland, wy" matches no admin1 code: the in-US filter may
        // legitimately empty the set.
        let repo = MapRepo::new().with(vec![
            city("portland", "OR", "Oregon", "America/Los_Angeles", 650_000),
            city("portland", "ME", "Maine", "America/New_York", 66_000),
        ]);
        let result = determine_location(&repo, "Portland, WY", None, None)
            .await
            .unwrap();
        assert_eq!(result.status, 500);
        assert!(result.place.is_none());
    }

    #[tokio::test]
    async fn in_us_state_code_filter_selects_the_state() {
        let repo = MapRepo::new().with(vec![
            city("portland", "OR", "Oregon", "America/Los_Angeles", 650_000),
            city("portland", "ME", "Maine", "America/New_York", 66_000),
        ]);
        let result = determine_location(&repo, "portland, me", None, None)
            .await
            .unwrap();
        assert_eq!(result.place.unwrap().state, "Maine");
    }

    #[tokio::test]
    async fn state_names_are_swapped_for_codes_in_us_context() {
        let repo = MapRepo::new().with(vec![
            city("portland", "OR", "Oregon", "America/Los_Angeles", 650_000),
            city("portland", "ME", "Maine", "America/New_York", 66_000),
        ]);
        let result = determine_location(&repo, "Portland, Oregon", None, None)
            .await
            .unwrap();
        assert_eq!(result.place.unwrap().state, "Oregon");
    }

    #[tokio::test]
    async fn non_us_two_letter_token_filter_is_soft() {
        // Non-US context (non-US timezone): "st" matches no admin1 code,
        // so the filter must be ignored rather than emptying the set.
        let mut a = city("cambridge", "ENG", "England", "Europe/London", 145_700);
        a.country = "United Kingdom".into();
        a.country_code = "GB".into();
        a.admin2 = "Cambridgeshire".into();
        a.admin2_code = "CAM".into();
        let mut b = a.clone();
        b.admin2 = "Oxfordshire".into();
        b.admin2_code = "OXF".into();
        b.population = 10_000;
        let repo = MapRepo::new().with(vec![a, b]);

        let result = determine_location(&repo, "Cambridge, ST", Some("London"), None)
            .await
            .unwrap();
        assert_eq!(result.status, 200);
        assert_eq!(result.place.unwrap().state, "Cambridgeshire");
    }

    #[tokio::test]
    async fn comma_state_substitution_collapses_washington_dc() {
        let dc = CityRecord {
            name: "washington dc".into(),
            display_name: "Washington, D.C.".into(),
            country: "United States".into(),
            country_code: "US".into(),
            admin1_code: "DC".into(),
            admin1: "District of Columbia".into(),
            timezone: "America/New_York".into(),
            population: 689_545,
            location: [-77.0369, 38.9072],
            ..Default::default()
        };
        let repo = MapRepo::new().with(vec![dc.clone()]);
        let result = determine_location(&repo, "Washington, D.C.", None, None)
            .await
            .unwrap();
        assert_eq!(result.status, 200);
        assert_eq!(result.place, Some(Place::from_city(&dc)));
    }

    #[tokio::test]
    async fn nearest_city_resolves_without_disambiguation() {
        let record = city("minneapolis", "MN", "Minnesota", "America/Chicago", 429_954);
        let repo = MapRepo::new().with(vec![record.clone()]);
        let place = nearest_city(&repo, -93.2650, 44.9778).await.unwrap();
        assert_eq!(place, Some(Place::from_city(&record)));
    }
}
