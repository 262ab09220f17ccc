use crate::tables::{has_state_codes, uses_admin2};

/// Reference entity from the city repository. Read-only; never mutated here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CityRecord {
    /// Lowercase canonical name, matched exactly by name queries.
    pub name: String,
    /// Pre-capitalized display form; empty when the repository has none.
    pub display_name: String,
    pub country: String,
    pub country_code: String,
    pub admin1_code: String,
    pub admin1: String,
    pub admin2_code: String,
    pub admin2: String,
    /// IANA zone identifier.
    pub timezone: String,
    pub population: i64,
    /// Longitude, latitude.
    pub location: [f64; 2],
    pub languages: Vec<String>,
}

/// Reference entity from a postal-code lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostalCodeRecord {
    pub place_name: String,
    pub country: String,
    pub country_code: String,
    pub admin1_code: String,
    pub admin1_name: String,
    pub admin2_code: String,
    pub admin2_name: String,
    pub location: [f64; 2],
}

/// A resolved geographic entity. Immutable once constructed; built
/// transiently by the disambiguator or nearest-city lookup, never persisted
/// standalone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Place {
    pub city: String,
    pub state: String,
    pub state_code: String,
    pub country: String,
    pub country_code: String,
    /// Longitude, latitude. `[0, 0]` means unresolved.
    pub loc: [f64; 2],
}

impl Place {
    /// Resolve a city record into a canonical place.
    ///
    /// When the record has no display name the city name is derived by
    /// capitalizing each space-separated token of the raw name. State fields
    /// come from the second administrative level for countries on the
    /// admin2 policy table, otherwise from the first.
    pub fn from_city(city: &CityRecord) -> Self {
        let name = if city.display_name.is_empty() {
            initial_capitals(&city.name)
        } else {
            city.display_name.clone()
        };

        let (state, state_code) = if uses_admin2(&city.country) {
            (city.admin2.clone(), city.admin2_code.clone())
        } else {
            (city.admin1.clone(), city.admin1_code.clone())
        };

        Self {
            city: name,
            state,
            state_code,
            country: city.country.clone(),
            country_code: city.country_code.clone(),
            loc: city.location,
        }
    }

    /// Resolve a postal-code record into a canonical place. Same admin-level
    /// policy as `from_city`; the place name is used verbatim.
    pub fn from_postal_code(record: &PostalCodeRecord) -> Self {
        let (state, state_code) = if uses_admin2(&record.country) {
            (record.admin2_name.clone(), record.admin2_code.clone())
        } else {
            (record.admin1_name.clone(), record.admin1_code.clone())
        };

        Self {
            city: record.place_name.clone(),
            state,
            state_code,
            country: record.country.clone(),
            country_code: record.country_code.clone(),
            loc: record.location,
        }
    }
}

/// `"CC-SS"` for countries with state-level reporting, the bare country
/// code otherwise. Used when stamping `LocationAttributes.StateCode`.
pub fn qualified_state_code(country_code: &str, state_code: &str) -> String {
    if has_state_codes(country_code) {
        format!("{country_code}-{state_code}")
    } else {
        country_code.to_string()
    }
}

/// Capitalize the first letter of each space-separated token.
pub fn initial_capitals(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
