//! Error types for geolookup.
//!
//! Each error variant carries a stable error code (SCREAMING_SNAKE_CASE)
//! that is included in the Display output and accessible via [`LookupError::code()`].
//! No API keys appear in error messages.

/// Stable error codes for programmatic error handling.
pub mod error_codes {
    /// A remote provider was selected without an API key.
    pub const MISSING_CREDENTIAL: &str = "MISSING_CREDENTIAL";

    /// Transport failure, non-2xx status, or unusable response body.
    pub const GENERIC: &str = "GENERIC";

    /// Invalid or unreadable configuration.
    pub const CONFIG_INVALID: &str = "CONFIG_INVALID";

    /// A local search was replaced by a newer one.
    pub const SUPERSEDED: &str = "SUPERSEDED";
}

/// The two error kinds a search callback can observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Remote provider selected without a credential.
    MissingCredential,
    /// Any other failure. Carries no further detail for callers.
    Generic,
}

/// Errors produced by geolookup.
///
/// The Display impl formats as `[CODE] message`.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LookupError {
    /// A remote provider was selected without an API key. No I/O was attempted.
    #[error("[{}] {}", error_codes::MISSING_CREDENTIAL, .0)]
    MissingCredential(String),

    /// The request failed. The message is diagnostic only.
    #[error("[{}] {}", error_codes::GENERIC, .0)]
    Generic(String),

    /// Invalid configuration.
    #[error("[{}] {}", error_codes::CONFIG_INVALID, .0)]
    Config(String),

    /// The local search was cancelled by a newer local search.
    ///
    /// Never delivered to a search callback.
    #[error("[{}] local search superseded", error_codes::SUPERSEDED)]
    Superseded,
}

impl LookupError {
    /// Returns the stable error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingCredential(_) => error_codes::MISSING_CREDENTIAL,
            Self::Generic(_) => error_codes::GENERIC,
            Self::Config(_) => error_codes::CONFIG_INVALID,
            Self::Superseded => error_codes::SUPERSEDED,
        }
    }

    /// Collapses this error into the kind a caller reacts to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingCredential(_) => ErrorKind::MissingCredential,
            Self::Generic(_) | Self::Config(_) | Self::Superseded => ErrorKind::Generic,
        }
    }
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, LookupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_code() {
        let err = LookupError::MissingCredential("postcode provider requires an API key".into());
        assert_eq!(
            err.to_string(),
            "[MISSING_CREDENTIAL] postcode provider requires an API key"
        );

        let err = LookupError::Generic("HTTP 500".into());
        assert_eq!(err.to_string(), "[GENERIC] HTTP 500");
    }

    #[test]
    fn superseded_display() {
        assert_eq!(
            LookupError::Superseded.to_string(),
            "[SUPERSEDED] local search superseded"
        );
    }

    #[test]
    fn codes_are_stable() {
        assert_eq!(LookupError::Generic(String::new()).code(), "GENERIC");
        assert_eq!(LookupError::Config(String::new()).code(), "CONFIG_INVALID");
        assert_eq!(
            LookupError::MissingCredential(String::new()).code(),
            "MISSING_CREDENTIAL"
        );
        assert_eq!(LookupError::Superseded.code(), "SUPERSEDED");
    }

    #[test]
    fn kind_collapses_to_two_values() {
        assert_eq!(
            LookupError::MissingCredential("x".into()).kind(),
            ErrorKind::MissingCredential
        );
        assert_eq!(LookupError::Generic("x".into()).kind(), ErrorKind::Generic);
        assert_eq!(LookupError::Config("x".into()).kind(), ErrorKind::Generic);
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<LookupError>();
    }
}
