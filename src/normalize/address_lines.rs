//! Postcode address lines → address records.
//!
//! Each line holds up to seven comma-separated fragments:
//!
//! | index | meaning          |
//! |-------|------------------|
//! | 0–3   | street lines     |
//! | 4     | locality         |
//! | 5     | town or city     |
//! | 6     | county           |
//!
//! The locality moves into the first free street slot among 2 and 3, or is
//! dropped when both are taken. Missing fragments read as empty.

use crate::gateways::postcode::PostcodeLookup;
use crate::types::{AddressRecord, Coordinate, FIELD_SEPARATOR};

use super::ordering::sort_records;

/// Country reported for every postcode result.
pub const POSTCODE_COUNTRY: &str = "United Kingdom";

const LOCALITY: usize = 4;
const CITY: usize = 5;
const COUNTY: usize = 6;

/// Map every address line of `lookup` to a record, sorted by formatted address.
///
/// Returns no records when the lookup coordinate is not finite.
pub fn normalize_postcode_lookup(lookup: &PostcodeLookup) -> Vec<AddressRecord> {
    if !lookup.location.is_finite() {
        tracing::warn!("postcode lookup has a non-finite coordinate");
        return Vec::new();
    }
    let records = lookup
        .addresses
        .iter()
        .map(|line| parse_address_line(line, &lookup.postcode, lookup.location))
        .collect();
    sort_records(records)
}

/// Build one record from a raw address line.
///
/// `postcode` and `location` come from the lookup, not from the line.
pub fn parse_address_line(line: &str, postcode: &str, location: Coordinate) -> AddressRecord {
    let fragments: Vec<&str> = line.split(',').map(str::trim).collect();
    let fragment = |i: usize| fragments.get(i).copied().unwrap_or_default();

    let mut street = [fragment(0), fragment(1), fragment(2), fragment(3)];
    let locality = fragment(LOCALITY);
    if street[2].is_empty() {
        street[2] = locality;
    } else if street[3].is_empty() {
        street[3] = locality;
    }

    let street_address = street
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(FIELD_SEPARATOR);

    AddressRecord::new(
        street_address,
        fragment(CITY),
        postcode,
        fragment(COUNTY),
        POSTCODE_COUNTRY,
        location,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location() -> Coordinate {
        Coordinate::new(52.8217, -1.0672)
    }

    fn lookup(addresses: &[&str]) -> PostcodeLookup {
        PostcodeLookup {
            postcode: "LE126SY".into(),
            location: location(),
            addresses: addresses.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn locality_fills_blank_third_line() {
        let r = parse_address_line(
            "1 The Lea,Westhorpe,,,Willoughby on the Wolds,Loughborough,Leicestershire",
            "LE126SY",
            location(),
        );
        assert_eq!(r.street_address(), "1 The Lea, Westhorpe, Willoughby on the Wolds");
        assert_eq!(r.city(), "Loughborough");
        assert_eq!(r.state(), "Leicestershire");
        assert_eq!(r.postcode(), "LE126SY");
        assert_eq!(r.country(), "United Kingdom");
        assert_eq!(r.location(), location());
    }

    #[test]
    fn locality_fills_fourth_line_when_third_taken() {
        let r = parse_address_line(
            "1 The Lea,Westhorpe,Unit 4,,Willoughby on the Wolds,Loughborough,Leicestershire",
            "LE126SY",
            location(),
        );
        assert_eq!(
            r.street_address(),
            "1 The Lea, Westhorpe, Unit 4, Willoughby on the Wolds"
        );
    }

    #[test]
    fn locality_dropped_when_both_lines_taken() {
        let r = parse_address_line(
            "Flat 1,The Mill,Mill Lane,Westhorpe,Willoughby on the Wolds,Loughborough,Leicestershire",
            "LE126SY",
            location(),
        );
        assert_eq!(r.street_address(), "Flat 1, The Mill, Mill Lane, Westhorpe");
    }

    #[test]
    fn whitespace_only_fragments_count_as_blank() {
        let r = parse_address_line(
            " 2 The Lea , ,   ,  , , Loughborough , Leicestershire ",
            "LE126SY",
            location(),
        );
        assert_eq!(r.street_address(), "2 The Lea");
        assert_eq!(r.city(), "Loughborough");
        assert_eq!(r.state(), "Leicestershire");
    }

    #[test]
    fn short_lines_default_missing_fragments() {
        let r = parse_address_line("3 The Lea", "LE126SY", location());
        assert_eq!(r.street_address(), "3 The Lea");
        assert_eq!(r.city(), "");
        assert_eq!(r.state(), "");
        assert_eq!(
            r.formatted_address(),
            "3 The Lea, LE126SY, United Kingdom"
        );

        let r = parse_address_line("", "LE126SY", location());
        assert_eq!(r.street_address(), "");
    }

    #[test]
    fn lookup_output_is_sorted() {
        let records = normalize_postcode_lookup(&lookup(&[
            "10 The Lea,,,,,Loughborough,Leicestershire",
            "9 The Lea,,,,,Loughborough,Leicestershire",
            "1 The Lea,,,,,Loughborough,Leicestershire",
        ]));
        let streets: Vec<&str> = records.iter().map(|r| r.street_address()).collect();
        assert_eq!(streets, vec!["1 The Lea", "9 The Lea", "10 The Lea"]);
    }

    #[test]
    fn normalizing_twice_is_identical() {
        let input = lookup(&[
            "b Road,,,,,Town,County",
            "A Road,,,,,Town,County",
            "a road,,,,,Town,County",
        ]);
        assert_eq!(
            normalize_postcode_lookup(&input),
            normalize_postcode_lookup(&input)
        );
    }

    #[test]
    fn empty_address_list_is_empty_result() {
        assert!(normalize_postcode_lookup(&lookup(&[])).is_empty());
    }
}
