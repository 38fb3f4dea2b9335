//! Postcode provider: UK postcode lookup over HTTP.
//!
//! The endpoint answers with one comma-separated line per address at the
//! postcode and a single coordinate for the postcode itself:
//!
//! ```json
//! { "latitude": 52.8, "longitude": -1.1,
//!   "addresses": ["1 The Lea, Westhorpe, , , Willoughby on the Wolds, Loughborough, Leicestershire"] }
//! ```

use url::Url;

use crate::config::LookupConfig;
use crate::error::LookupError;
use crate::gateway::ProviderGateway;
use crate::http;
use crate::types::{Coordinate, ProviderKind};

/// Default endpoint root for the postcode API.
pub const DEFAULT_BASE_URL: &str = "https://api.getaddress.io";

/// Raw result of a postcode lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct PostcodeLookup {
    /// The searched postcode, uppercased with whitespace removed.
    pub postcode: String,
    /// Coordinate of the postcode.
    pub location: Coordinate,
    /// Raw comma-separated address lines.
    pub addresses: Vec<String>,
}

/// Uppercase `term` and strip all whitespace: `" le12 6sy "` → `"LE126SY"`.
pub fn normalize_postcode(term: &str) -> String {
    term.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Gateway for the postcode lookup service.
#[derive(Debug, Clone)]
pub struct PostcodeGateway {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl PostcodeGateway {
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
                .postcode_base_url
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
    /// The term is trimmed and percent-encoded as a single path segment.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::Generic`] if the trimmed term is empty or the
    /// URL cannot be assembled. No request is made in either case.
    pub fn request_url(&self, term: &str) -> Result<Url, LookupError> {
        let trimmed = term.trim();
        if trimmed.is_empty() {
            return Err(LookupError::Generic("postcode search term is empty".into()));
        }
        let encoded = urlencoding::encode(trimmed);
        let root = self.base_url.trim_end_matches('/');
        let mut url = Url::parse(&format!("{root}/find/{encoded}"))
            .map_err(|e| LookupError::Generic(format!("invalid postcode URL: {e}")))?;
        url.query_pairs_mut().append_pair("api-key", &self.api_key);
        Ok(url)
    }
}

impl ProviderGateway for PostcodeGateway {
    type Payload = PostcodeLookup;

    async fn fetch(&self, term: &str) -> Result<PostcodeLookup, LookupError> {
        tracing::trace!(query = term, "postcode lookup");

        let url = self.request_url(term)?;
        let body = http::get_json_object(&self.client, url, "postcode").await?;

        let addresses = match body.get("addresses") {
            Some(serde_json::Value::Array(items)) => items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_owned))
                .collect::<Vec<_>>(),
            _ => {
                return Err(LookupError::Generic(
                    "postcode response has no addresses array".into(),
                ));
            }
        };
        let coordinate_field = |name: &str| {
            body.get(name)
                .and_then(serde_json::Value::as_f64)
                .ok_or_else(|| LookupError::Generic(format!("postcode response has no {name}")))
        };
        let location = Coordinate::new(coordinate_field("latitude")?, coordinate_field("longitude")?);

        tracing::debug!(count = addresses.len(), "postcode addresses received");
        Ok(PostcodeLookup {
            postcode: normalize_postcode(term),
            location,
            addresses,
        })
    }

    fn provider(&self) -> ProviderKind {
        ProviderKind::Postcode
    }
}
