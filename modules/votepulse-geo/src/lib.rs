//! Geographic reference data and location resolution.
//!
//! `tables` holds the static lookup maps (US states, timezone aliases,
//! country codes). `place` turns raw city/postal-code records into canonical
//! `Place` values. `lookup` is the disambiguator: free text plus timezone and
//! language hints in, exactly one `Place` (or a structured failure) out.

pub mod lookup;
pub mod place;
pub mod tables;

pub use lookup::{determine_location, nearest_city, CityRepository, LookupResult};
pub use place::{CityRecord, Place, PostalCodeRecord};
