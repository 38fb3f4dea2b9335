//! Natural, case-insensitive ordering for formatted addresses.
//!
//! Strings are compared after Unicode compatibility decomposition with
//! combining marks removed and lowercasing, so `"Évian"` sorts with
//! `"evian"`. Runs of ASCII digits compare by numeric value: `"9b"` sorts
//! before `"10"` and `"Flat 2"` before `"Flat 12"`. Strings that are equal
//! under these rules fall back to byte order, which keeps the ordering total.
//!
//! Numeric comparison is intentional: plain byte order would put `"10"`
//! before `"9b"`, which reads wrong in a list of house numbers.

use std::cmp::Ordering;
use std::iter::Peekable;
use std::str::Chars;

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::types::AddressRecord;

/// Fold `s` for comparison: NFKD, combining marks stripped, lowercased.
pub fn fold(s: &str) -> String {
    s.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Compare two strings in natural order.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    compare_folded(&fold(a), &fold(b)).then_with(|| a.cmp(b))
}

/// Sort records ascending by formatted address in natural order.
///
/// The sort is stable.
pub fn sort_records(records: Vec<AddressRecord>) -> Vec<AddressRecord> {
    let mut keyed: Vec<(String, String, AddressRecord)> = records
        .into_iter()
        .map(|record| {
            let formatted = record.formatted_address();
            (fold(&formatted), formatted, record)
        })
        .collect();
    keyed.sort_by(|(fa, ra, _), (fb, rb, _)| compare_folded(fa, fb).then_with(|| ra.cmp(rb)));
    keyed.into_iter().map(|(_, _, record)| record).collect()
}

fn compare_folded(a: &str, b: &str) -> Ordering {
    let mut a = a.chars().peekable();
    let mut b = b.chars().peekable();
    loop {
        match (a.peek().copied(), b.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(ca), Some(cb)) if ca.is_ascii_digit() && cb.is_ascii_digit() => {
                let run_a = digit_run(&mut a);
                let run_b = digit_run(&mut b);
                let ord = compare_numeric(&run_a, &run_b);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(ca), Some(cb)) => {
                if ca != cb {
                    return ca.cmp(&cb);
                }
                a.next();
                b.next();
            }
        }
    }
}

fn digit_run(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(c) = chars.next_if(char::is_ascii_digit) {
        run.push(c);
    }
    run
}

/// Compare two digit strings by value, without overflow for long runs.
fn compare_numeric(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}
