//! Shared HTTP client for the remote geocoding providers.
//!
//! Also holds the response classification both remote gateways share: any
//! transport error, non-2xx status, or undecodable body is a generic failure.

use std::time::Duration;

use crate::config::LookupConfig;
use crate::error::LookupError;

/// User-Agent sent when the configuration does not set one.
const DEFAULT_USER_AGENT: &str = concat!("geolookup/", env!("CARGO_PKG_VERSION"));

/// Build a [`reqwest::Client`] for geocoding API requests.
///
/// The client has:
/// - Timeout from config
/// - Custom User-Agent if configured, otherwise `geolookup/<version>`
///
/// # Errors
///
/// Returns [`LookupError::Generic`] if the client cannot be constructed.
pub fn build_client(config: &LookupConfig) -> Result<reqwest::Client, LookupError> {
    let ua = config
        .user_agent
        .clone()
        .unwrap_or_else(|| DEFAULT_USER_AGENT.to_owned());

    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(ua)
        .build()
        .map_err(|e| LookupError::Generic(format!("failed to build HTTP client: {e}")))
}

/// Send a GET request and decode a 2xx response body as a JSON object.
///
/// `label` names the provider in diagnostic messages. The request URL is
/// stripped from transport errors since it carries the API key.
pub(crate) async fn get_json_object(
    client: &reqwest::Client,
    url: url::Url,
    label: &str,
) -> Result<serde_json::Map<String, serde_json::Value>, LookupError> {
    let response = client
        .get(url)
        .header("Accept", "application/json")
        .send()
        .await
        .map_err(|e| LookupError::Generic(format!("{label} request failed: {}", e.without_url())))?;

    let status = response.status();
    if !status.is_success() {
        return Err(LookupError::Generic(format!(
            "{label} returned HTTP {}",
            status.as_u16()
        )));
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| LookupError::Generic(format!("{label} response read failed: {}", e.without_url())))?;

    tracing::trace!(bytes = body.len(), provider = label, "response received");

    match serde_json::from_slice::<serde_json::Value>(&body) {
        Ok(serde_json::Value::Object(map)) => Ok(map),
        Ok(_) => Err(LookupError::Generic(format!(
            "{label} response is not a JSON object"
        ))),
        Err(e) => Err(LookupError::Generic(format!(
            "{label} response is not valid JSON: {e}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_client_with_default_config() {
        let config = LookupConfig::default();
        assert!(build_client(&config).is_ok());
    }

    #[test]
    fn build_client_with_custom_ua() {
        let config = LookupConfig {
            user_agent: Some("AddressBook/2.1".into()),
            ..Default::default()
        };
        assert!(build_client(&config).is_ok());
    }

    #[test]
    fn default_user_agent_names_crate() {
        assert!(DEFAULT_USER_AGENT.starts_with("geolookup/"));
    }
}
