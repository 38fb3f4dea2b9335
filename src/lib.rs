//! # geolookup
//!
//! Unified address lookup across interchangeable geocoding providers.
//!
//! One query shape in, one result shape out, whichever backend answers:
//!
//! - **local**: an on-device [`LocalSearchEngine`](gateways::LocalSearchEngine)
//!   returning structured placemarks
//! - **geocoder**: a remote free-text geocoder returning formatted address
//!   strings with coordinates
//! - **postcode**: a remote UK postcode service returning comma-separated
//!   address lines for a postcode
//!
//! ## Design
//!
//! - [`gateway::ProviderGateway`] fetches a raw, backend-shaped payload
//! - [`normalize`] maps each payload shape to [`AddressRecord`]s, sorted in
//!   natural, case-insensitive order of their formatted address
//! - [`SearchController`] picks the gateway, debounces live-typing searches,
//!   and delivers each result exactly once through a callback
//!
//! ## Security
//!
//! - API keys never appear in error messages or logs
//! - Search terms are logged only at trace level

pub mod config;
pub mod controller;
pub mod error;
pub mod gateway;
pub mod gateways;
pub mod http;
pub mod normalize;
pub mod types;

mod slot;

pub use config::{LookupConfig, ProviderConfig};
pub use controller::{SearchController, SearchControllerBuilder, SearchOutcome};
pub use error::{ErrorKind, LookupError, Result};
pub use types::{AddressRecord, Coordinate, ProviderKind};

/// Look up `term` once with the provider selected in `config`.
///
/// Convenience wrapper around [`SearchController::lookup`] for callers that
/// need neither debouncing nor a callback.
///
/// # Errors
///
/// Returns [`LookupError::Config`] for an invalid configuration,
/// [`LookupError::MissingCredential`] for a remote provider without a key,
/// and [`LookupError::Generic`] if the provider request fails.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> geolookup::Result<()> {
/// let config = geolookup::LookupConfig::for_provider(geolookup::ProviderConfig::Geocoder {
///     api_key: Some("my-key".into()),
/// });
/// for record in geolookup::lookup("10 Downing St, London", &config).await? {
///     println!("{record}");
/// }
/// # Ok(())
/// # }
/// ```
pub async fn lookup(term: &str, config: &LookupConfig) -> Result<Vec<AddressRecord>> {
    let controller = SearchController::new(config.clone(), |_| {})?;
    controller.lookup(term).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lookup_validates_config() {
        let config = LookupConfig {
            timeout_seconds: 0,
            ..Default::default()
        };
        let err = lookup("anything", &config).await.unwrap_err();
        assert!(err.to_string().contains("timeout"));
    }

    #[tokio::test]
    async fn lookup_without_credential_fails_fast() {
        let config = LookupConfig::for_provider(ProviderConfig::Postcode { api_key: None });
        let err = lookup("LE12 6SY", &config).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingCredential);
    }

    #[tokio::test]
    async fn lookup_against_empty_local_index_is_empty() {
        let records = lookup("anything", &LookupConfig::default()).await.unwrap();
        assert!(records.is_empty());
    }
}
