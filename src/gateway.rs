//! Trait definition for provider gateways.
//!
//! A gateway issues one request against one geocoding backend and returns
//! the backend-shaped payload. Turning that payload into
//! [`AddressRecord`](crate::types::AddressRecord)s is the job of the
//! [`normalize`](crate::normalize) functions.

use crate::error::LookupError;
use crate::types::ProviderKind;

/// A geocoding backend reachable through one request per search term.
///
/// Each gateway handles its own:
///
/// - request construction from the term and credential
/// - transport, status and body classification
/// - extraction of the fields its normalizer needs
///
/// Gateways do no internal queueing; keeping one fetch outstanding is up to
/// the caller. All implementations must be `Send + Sync` so a controller can
/// share them with spawned tasks.
pub trait ProviderGateway: Send + Sync {
    /// Raw, backend-shaped result of a successful fetch.
    type Payload: Send + 'static;

    /// Fetch the raw payload for `term`.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::Generic`] for any transport or decoding failure.
    /// The local gateway also returns [`LookupError::Superseded`] when a newer
    /// fetch cancelled this one.
    fn fetch(
        &self,
        term: &str,
    ) -> impl std::future::Future<Output = Result<Self::Payload, LookupError>> + Send;

    /// Returns which provider this gateway talks to.
    fn provider(&self) -> ProviderKind;
}
