//! Geocoder provider: free-text place search over HTTP.
//!
//! Sends the term to a find-place endpoint and returns the raw `candidates`
//! array. Each candidate is kept as a loosely typed JSON value; picking out
//! `formatted_address` and `geometry.location` happens during normalization.

use url::Url;

use crate::config::LookupConfig;
use crate::error::LookupError;
use crate::gateway::ProviderGateway;
use crate::http;
use crate::types::ProviderKind;

/// Default endpoint root for the geocoder API.
pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com";

const FIND_PLACE_PATH: &str = "/maps/api/place/findplacefromtext/json";

/// Gateway for the free-text geocoder.
#[derive(Debug, Clone)]
pub struct GeocoderGateway {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GeocoderGateway {
    /// Create a gateway using `api_key` and the HTTP settings of `config`.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::Generic`] if the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>, config: &LookupConfig) -> Result<Self, LookupError> {
        Ok(Self {
            client: http::build_client(config)?,
            api_key: api_key.into(),
            base_url: config
                .geocoder_base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
        })
    }

    /// Set a custom endpoint root.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Build the request URL for `term`.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::Generic`] if the base URL is not a valid URL.
    pub fn request_url(&self, term: &str) -> Result<Url, LookupError> {
        let root = self.base_url.trim_end_matches('/');
        let mut url = Url::parse(&format!("{root}{FIND_PLACE_PATH}"))
            .map_err(|e| LookupError::Generic(format!("invalid geocoder URL: {e}")))?;
        url.query_pairs_mut()
            .append_pair("input", term)
            .append_pair("inputtype", "textquery")
            .append_pair("fields", "formatted_address,geometry")
            .append_pair("key", &self.api_key);
        Ok(url)
    }
}

impl ProviderGateway for GeocoderGateway {
    type Payload = Vec<serde_json::Value>;

    async fn fetch(&self, term: &str) -> Result<Vec<serde_json::Value>, LookupError> {
        tracing::trace!(query = term, "geocoder search");

        let url = self.request_url(term)?;
        let mut body = http::get_json_object(&self.client, url, "geocoder").await?;

        let candidates = match body.remove("candidates") {
            Some(serde_json::Value::Array(items)) => items,
            _ => {
                return Err(LookupError::Generic(
                    "geocoder response has no candidates array".into(),
                ));
            }
        };

        tracing::debug!(count = candidates.len(), "geocoder candidates received");
        Ok(candidates)
    }

    fn provider(&self) -> ProviderKind {
        ProviderKind::Geocoder
    }
}
