//! Result normalization: raw provider payloads → sorted address records.
//!
//! One pure function per provider. None of them fail: items that cannot be
//! mapped are dropped, so a successful fetch can normalize to an empty list.
//! All outputs are sorted by [`ordering::sort_records`].

pub mod address_lines;
pub mod candidates;
pub mod ordering;
pub mod parser;
pub mod placemark;

pub use address_lines::normalize_postcode_lookup;
pub use candidates::normalize_candidates;
pub use ordering::{natural_cmp, sort_records};
pub use parser::{AddressComponents, AddressParser, CommaAddressParser};
pub use placemark::normalize_placemarks;
