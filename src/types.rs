//! Core types: the canonical address record and provider identification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between non-empty fields of a formatted address.
pub const FIELD_SEPARATOR: &str = ", ";

/// A WGS84 coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl Coordinate {
    /// Create a coordinate from latitude and longitude.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Returns true if both components are finite real numbers.
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

/// One resolved address in the shape every provider is normalized into.
///
/// Records are built by the normalizers and are never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddressRecord {
    street_address: String,
    city: String,
    postcode: String,
    state: String,
    country: String,
    location: Coordinate,
}

impl AddressRecord {
    pub(crate) fn new(
        street_address: impl Into<String>,
        city: impl Into<String>,
        postcode: impl Into<String>,
        state: impl Into<String>,
        country: impl Into<String>,
        location: Coordinate,
    ) -> Self {
        Self {
            street_address: street_address.into(),
            city: city.into(),
            postcode: postcode.into(),
            state: state.into(),
            country: country.into(),
            location,
        }
    }

    /// Street lines, joined.
    pub fn street_address(&self) -> &str {
        &self.street_address
    }

    /// City or post town.
    pub fn city(&self) -> &str {
        &self.city
    }

    /// Postal code.
    pub fn postcode(&self) -> &str {
        &self.postcode
    }

    /// State, county, or region.
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Country name.
    pub fn country(&self) -> &str {
        &self.country
    }

    /// Geographic position of the address.
    pub fn location(&self) -> Coordinate {
        self.location
    }

    /// All non-empty fields joined in street, city, postcode, state, country order.
    pub fn formatted_address(&self) -> String {
        [
            self.street_address.as_str(),
            self.city.as_str(),
            self.postcode.as_str(),
            self.state.as_str(),
            self.country.as_str(),
        ]
        .iter()
        .filter(|field| !field.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(FIELD_SEPARATOR)
    }
}

impl fmt::Display for AddressRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.formatted_address())
    }
}

/// The geocoding backends geolookup can query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// On-device search engine.
    Local,
    /// Remote free-text geocoder returning `candidates`.
    Geocoder,
    /// Remote UK postcode lookup returning raw address lines.
    Postcode,
}

impl ProviderKind {
    /// Returns the human-readable name of this provider.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Geocoder => "geocoder",
            Self::Postcode => "postcode",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(street: &str, city: &str, postcode: &str, state: &str, country: &str) -> AddressRecord {
        AddressRecord::new(street, city, postcode, state, country, Coordinate::new(52.0, -1.0))
    }

    #[test]
    fn formatted_address_joins_in_field_order() {
        let r = record("1 The Lea", "Loughborough", "LE12 6SY", "Leicestershire", "United Kingdom");
        assert_eq!(
            r.formatted_address(),
            "1 The Lea, Loughborough, LE12 6SY, Leicestershire, United Kingdom"
        );
    }

    #[test]
    fn formatted_address_skips_empty_fields() {
        let r = record("", "Paris", "", "", "France");
        assert_eq!(r.formatted_address(), "Paris, France");
    }

    #[test]
    fn formatted_address_of_empty_record_is_empty() {
        assert!(record("", "", "", "", "").formatted_address().is_empty());
    }

    #[test]
    fn identical_fields_give_identical_formatting() {
        let a = record("10 Downing St", "London", "SW1A 2AA", "", "UK");
        let b = record("10 Downing St", "London", "SW1A 2AA", "", "UK");
        assert_eq!(a, b);
        assert_eq!(a.formatted_address(), b.formatted_address());
        assert_eq!(a.to_string(), a.formatted_address());
    }

    #[test]
    fn coordinate_finiteness() {
        assert!(Coordinate::new(51.5, -0.12).is_finite());
        assert!(!Coordinate::new(f64::NAN, 0.0).is_finite());
        assert!(!Coordinate::new(0.0, f64::INFINITY).is_finite());
    }

    #[test]
    fn record_serializes_fields() {
        let r = record("1 High St", "Bath", "BA1 1AA", "Somerset", "United Kingdom");
        let json = serde_json::to_value(&r).expect("serialize");
        assert_eq!(json["street_address"], "1 High St");
        assert_eq!(json["location"]["latitude"], 52.0);
    }

    #[test]
    fn provider_kind_display_and_serde() {
        assert_eq!(ProviderKind::Geocoder.to_string(), "geocoder");
        let json = serde_json::to_string(&ProviderKind::Postcode).expect("serialize");
        assert_eq!(json, "\"postcode\"");
    }
}
