//! Geocoder candidates → address records.
//!
//! A usable candidate looks like:
//!
//! ```json
//! { "formatted_address": "10 Downing St, London SW1A 2AA, UK",
//!   "geometry": { "location": { "lat": 51.5034, "lng": -0.1276 } } }
//! ```
//!
//! Anything else is skipped. The formatted string is decomposed by an
//! [`AddressParser`].

use serde_json::Value;

use crate::types::{AddressRecord, Coordinate};

use super::ordering::sort_records;
use super::parser::AddressParser;

/// Map usable candidates to records, sorted by formatted address.
///
/// Candidates without a string `formatted_address` or numeric
/// `geometry.location.lat`/`lng` are dropped, as are records whose
/// formatted address comes out empty.
pub fn normalize_candidates(
    candidates: &[Value],
    parser: &dyn AddressParser,
) -> Vec<AddressRecord> {
    let records: Vec<AddressRecord> = candidates
        .iter()
        .filter_map(|candidate| candidate_record(candidate, parser))
        .filter(|record| !record.formatted_address().is_empty())
        .collect();

    let dropped = candidates.len() - records.len();
    if dropped > 0 {
        tracing::debug!(dropped, kept = records.len(), "skipped unusable candidates");
    }
    sort_records(records)
}

fn candidate_record(candidate: &Value, parser: &dyn AddressParser) -> Option<AddressRecord> {
    let text = candidate.get("formatted_address")?.as_str()?;
    let location = candidate.get("geometry")?.get("location")?;
    let coordinate = Coordinate::new(
        location.get("lat")?.as_f64()?,
        location.get("lng")?.as_f64()?,
    );
    if !coordinate.is_finite() {
        return None;
    }

    let parts = parser.parse(text);
    Some(AddressRecord::new(
        parts.street,
        parts.city,
        parts.postcode,
        parts.state,
        parts.country,
        coordinate,
    ))
}
