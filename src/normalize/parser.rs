//! Free-text address decomposition.
//!
//! Geocoder candidates carry a single formatted string such as
//! `"1600 Amphitheatre Pkwy, Mountain View, CA 94043, USA"`. An
//! [`AddressParser`] splits such a string into street, city, postcode, state
//! and country. Every extractor is total and deterministic, and yields an
//! empty string for a component it cannot identify.

use regex::Regex;

/// Components extracted from a formatted address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressComponents {
    /// Street lines, joined with `", "`.
    pub street: String,
    /// City or town.
    pub city: String,
    /// Postal code.
    pub postcode: String,
    /// State, county, or region.
    pub state: String,
    /// Country.
    pub country: String,
}

/// Splits formatted address text into components.
pub trait AddressParser: Send + Sync {
    /// Decompose `text`. Must not panic for any input.
    fn parse(&self, text: &str) -> AddressComponents;

    /// Street part of `text`.
    fn street(&self, text: &str) -> String {
        self.parse(text).street
    }

    /// City part of `text`.
    fn city(&self, text: &str) -> String {
        self.parse(text).city
    }

    /// Postal code in `text`.
    fn postcode(&self, text: &str) -> String {
        self.parse(text).postcode
    }

    /// State or region part of `text`.
    fn state(&self, text: &str) -> String {
        self.parse(text).state
    }

    /// Country part of `text`.
    fn country(&self, text: &str) -> String {
        self.parse(text).country
    }
}

/// Abbreviations that name a country rather than a state.
const COUNTRY_CODES: &[&str] = &["UK", "GB", "US", "USA", "UAE"];

/// Postcode shapes, most specific first.
const POSTCODE_PATTERNS: &[&str] = &[
    // United Kingdom: SW1A 2AA, LE12 6SY, M1 1AE
    r"(?i)\b[A-Z]{1,2}\d[A-Z\d]?\s*\d[A-Z]{2}\b",
    // Canada: K1A 0B1
    r"(?i)\b[A-Z]\d[A-Z]\s?\d[A-Z]\d\b",
    // United States ZIP and ZIP+4
    r"\b\d{5}(?:-\d{4})?\b",
    // Plain numeric codes (Australia, much of Europe)
    r"\b\d{4,6}\b",
];

/// Comma-segmentation parser for conventional postal address text.
///
/// Rules, applied in order:
/// 1. Split on commas and drop blank segments.
/// 2. With two or more segments, a trailing segment without digits that is
///    not a state code (`"NY"`, `"VIC"`) is the country.
/// 3. The last segment (other than the first) containing a postcode yields
///    the postcode. What remains of that segment is the city, or the state
///    when it ends in a state code (`"CA 94043"`, `"Melbourne VIC 3000"`).
/// 4. Without a postcode, a trailing state code is the state and the last
///    remaining segment after the first is the city.
/// 5. Everything before the city is the street.
#[derive(Debug, Clone)]
pub struct CommaAddressParser {
    postcode_patterns: Vec<Regex>,
}

impl Default for CommaAddressParser {
    fn default() -> Self {
        Self::new()
    }
}

impl CommaAddressParser {
    /// Create a parser with the built-in postcode patterns.
    pub fn new() -> Self {
        Self {
            postcode_patterns: POSTCODE_PATTERNS
                .iter()
                .filter_map(|p| Regex::new(p).ok())
                .collect(),
        }
    }

    /// Find the postcode in the last eligible segment that has one.
    ///
    /// Returns the segment index, the postcode, and the rest of the segment.
    fn find_postcode(&self, segments: &[String]) -> Option<(usize, String, String)> {
        let first_eligible = usize::from(segments.len() > 1);
        (first_eligible..segments.len()).rev().find_map(|idx| {
            let segment = &segments[idx];
            self.postcode_patterns.iter().find_map(|re| {
                re.find(segment).map(|m| {
                    let rest = format!("{} {}", &segment[..m.start()], &segment[m.end()..]);
                    (idx, m.as_str().trim().to_string(), collapse_whitespace(&rest))
                })
            })
        })
    }
}

impl AddressParser for CommaAddressParser {
    fn parse(&self, text: &str) -> AddressComponents {
        let mut segments: Vec<String> = text
            .split(',')
            .map(collapse_whitespace)
            .filter(|s| !s.is_empty())
            .collect();
        let mut out = AddressComponents::default();
        if segments.is_empty() {
            return out;
        }

        let trailing_country = segments
            .last()
            .is_some_and(|last| !has_digit(last) && !is_state_code(last));
        if segments.len() >= 2 && trailing_country {
            out.country = segments.pop().unwrap_or_default();
        }

        if let Some((idx, postcode, rest)) = self.find_postcode(&segments) {
            out.postcode = postcode;
            let after: Vec<String> = segments.split_off(idx + 1);
            segments.pop();
            let (place, region) = split_region(&rest);
            if !region.is_empty() {
                out.state = region;
                out.city = if place.is_empty() {
                    pop_city(&mut segments)
                } else {
                    place
                };
            } else if !place.is_empty() {
                out.city = place;
                out.state = after.first().cloned().unwrap_or_default();
            } else {
                out.city = pop_city(&mut segments);
                out.state = after.first().cloned().unwrap_or_default();
            }
        } else {
            if segments.len() >= 2 && segments.last().is_some_and(|s| is_state_code(s)) {
                out.state = segments.pop().unwrap_or_default();
            }
            out.city = pop_city(&mut segments);
        }

        if segments.len() == 1 && out.city.is_empty() && !has_digit(&segments[0]) {
            out.city = segments.pop().unwrap_or_default();
        }
        out.street = segments.join(", ");
        out
    }
}

/// Take the last segment as the city, leaving at least one segment for the street.
fn pop_city(segments: &mut Vec<String>) -> String {
    if segments.len() >= 2 {
        segments.pop().unwrap_or_default()
    } else {
        String::new()
    }
}

/// Split `"Melbourne VIC"` into `("Melbourne", "VIC")`, `"NY"` into `("", "NY")`.
fn split_region(rest: &str) -> (String, String) {
    let mut words: Vec<&str> = rest.split_whitespace().collect();
    match words.last() {
        Some(last) if is_state_code(last) => {
            let region = (*last).to_string();
            words.pop();
            (words.join(" "), region)
        }
        _ => (rest.to_string(), String::new()),
    }
}

fn is_state_code(s: &str) -> bool {
    (2..=3).contains(&s.len())
        && s.chars().all(|c| c.is_ascii_uppercase())
        && !COUNTRY_CODES.contains(&s)
}

fn has_digit(s: &str) -> bool {
    s.chars().any(|c| c.is_ascii_digit())
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
