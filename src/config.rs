//! Lookup configuration with sensible defaults.
//!
//! [`LookupConfig`] selects the provider (and its credential), the debounce
//! delay, and HTTP behaviour. It can be loaded from and saved to TOML:
//!
//! ```toml
//! debounce_ms = 300
//! timeout_seconds = 10
//!
//! [provider]
//! kind = "postcode"
//! api_key = "..."
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{LookupError, Result};
use crate::types::ProviderKind;

/// Which backend to query, with its credential.
///
/// A remote variant without a key is representable; searching with it fails
/// with [`LookupError::MissingCredential`] before any I/O.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ProviderConfig {
    /// On-device search.
    #[default]
    Local,
    /// Remote free-text geocoder.
    Geocoder {
        /// API key sent with every request.
        #[serde(default)]
        api_key: Option<String>,
    },
    /// Remote UK postcode lookup.
    Postcode {
        /// API key sent with every request.
        #[serde(default)]
        api_key: Option<String>,
    },
}

impl ProviderConfig {
    /// Returns which provider this configuration selects.
    pub fn kind(&self) -> ProviderKind {
        match self {
            Self::Local => ProviderKind::Local,
            Self::Geocoder { .. } => ProviderKind::Geocoder,
            Self::Postcode { .. } => ProviderKind::Postcode,
        }
    }

    /// Returns the configured API key, ignoring blank values.
    pub fn api_key(&self) -> Option<&str> {
        match self {
            Self::Local => None,
            Self::Geocoder { api_key } | Self::Postcode { api_key } => api_key
                .as_deref()
                .map(str::trim)
                .filter(|key| !key.is_empty()),
        }
    }

    /// Returns the API key a remote provider requires.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::MissingCredential`] for a remote provider with no key.
    /// The local provider never needs one and yields an empty string.
    pub fn credential(&self) -> Result<&str> {
        match self {
            Self::Local => Ok(""),
            Self::Geocoder { .. } | Self::Postcode { .. } => self.api_key().ok_or_else(|| {
                LookupError::MissingCredential(format!(
                    "{} provider requires an API key",
                    self.kind()
                ))
            }),
        }
    }

    /// Replace the API key of a remote provider. Has no effect on [`ProviderConfig::Local`].
    pub fn with_api_key(self, key: impl Into<String>) -> Self {
        match self {
            Self::Local => Self::Local,
            Self::Geocoder { .. } => Self::Geocoder {
                api_key: Some(key.into()),
            },
            Self::Postcode { .. } => Self::Postcode {
                api_key: Some(key.into()),
            },
        }
    }
}

/// Configuration for a [`SearchController`](crate::controller::SearchController).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    /// Selected provider and credential.
    pub provider: ProviderConfig,
    /// Default delay for debounced searches, in milliseconds.
    pub debounce_ms: u64,
    /// HTTP request timeout in seconds for remote providers.
    pub timeout_seconds: u64,
    /// Custom User-Agent string. If `None`, a crate-specific agent is sent.
    pub user_agent: Option<String>,
    /// Override for the geocoder endpoint root.
    pub geocoder_base_url: Option<String>,
    /// Override for the postcode endpoint root.
    pub postcode_base_url: Option<String>,
    /// JSON file of placemarks backing the local provider.
    pub local_index: Option<PathBuf>,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::Local,
            debounce_ms: 500,
            timeout_seconds: 10,
            user_agent: None,
            geocoder_base_url: None,
            postcode_base_url: None,
            local_index: None,
        }
    }
}

impl LookupConfig {
    /// Create a default configuration for the given provider.
    pub fn for_provider(provider: ProviderConfig) -> Self {
        Self {
            provider,
            ..Default::default()
        }
    }

    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `timeout_seconds` must be greater than 0
    /// - base URL overrides must be absolute `http`/`https` URLs
    ///
    /// A missing credential is not a configuration error; it is reported per search.
    pub fn validate(&self) -> Result<()> {
        if self.timeout_seconds == 0 {
            return Err(LookupError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        for (name, value) in [
            ("geocoder_base_url", &self.geocoder_base_url),
            ("postcode_base_url", &self.postcode_base_url),
        ] {
            if let Some(raw) = value {
                let parsed = Url::parse(raw)
                    .map_err(|e| LookupError::Config(format!("{name} is not a valid URL: {e}")))?;
                if !matches!(parsed.scheme(), "http" | "https") {
                    return Err(LookupError::Config(format!(
                        "{name} must use http or https"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| LookupError::Config(format!("cannot read {}: {e}", path.display())))?;
        toml::from_str(&content).map_err(|e| LookupError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| LookupError::Config(format!("cannot create {}: {e}", parent.display())))?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| LookupError::Config(e.to_string()))?;
        std::fs::write(path, content)
            .map_err(|e| LookupError::Config(format!("cannot write {}: {e}", path.display())))
    }

    /// Returns the default config file path: `<config dir>/geolookup/config.toml`.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("geolookup")
            .join("config.toml")
    }
}
