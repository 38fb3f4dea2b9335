//! Provider gateway implementations.
//!
//! Each module provides a struct implementing [`crate::gateway::ProviderGateway`]
//! for one geocoding backend.

pub mod geocoder;
pub mod local;
pub mod postcode;

pub use geocoder::GeocoderGateway;
pub use local::{
    AddressedPlacemark, LocalSearchEngine, LocalSearchGateway, Placemark, PlacemarkIndex,
    PostalAddress,
};
pub use postcode::{PostcodeGateway, PostcodeLookup};
