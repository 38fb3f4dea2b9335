//! Local placemarks → address records.
//!
//! Placemarks already carry structured fields, so this is a field-for-field
//! copy with no text parsing.

use crate::gateways::local::AddressedPlacemark;
use crate::types::AddressRecord;

use super::ordering::sort_records;

/// Map each addressed placemark to one record, sorted by formatted address.
///
/// Placemarks with a non-finite coordinate are dropped.
pub fn normalize_placemarks(placemarks: &[AddressedPlacemark]) -> Vec<AddressRecord> {
    let records = placemarks
        .iter()
        .filter(|p| p.coordinate.is_finite())
        .map(|p| {
            AddressRecord::new(
                p.address.street.trim(),
                p.address.city.trim(),
                p.address.postcode.trim(),
                p.address.state.trim(),
                p.address.country.trim(),
                p.coordinate,
            )
        })
        .collect();
    sort_records(records)
}
