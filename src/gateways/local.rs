//! Local provider: on-device search through a [`LocalSearchEngine`].
//!
//! The engine itself is an external collaborator. [`PlacemarkIndex`] is a
//! small in-memory engine loaded from a JSON file so the local provider works
//! without one.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::LookupError;
use crate::gateway::ProviderGateway;
use crate::slot::{CancelSlot, Ticket};
use crate::types::{Coordinate, ProviderKind};

/// Structured postal address attached to a placemark.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostalAddress {
    /// Street lines.
    pub street: String,
    /// City or town.
    pub city: String,
    /// Postal code.
    pub postcode: String,
    /// State, county, or region.
    pub state: String,
    /// Country name.
    pub country: String,
}

/// A candidate returned by a local search engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placemark {
    /// Display name of the place.
    #[serde(default)]
    pub name: String,
    /// Postal address, when the engine has one for this place.
    #[serde(default)]
    pub postal_address: Option<PostalAddress>,
    /// Position of the place.
    pub coordinate: Coordinate,
}

/// An on-device engine answering natural-language place queries.
#[async_trait]
pub trait LocalSearchEngine: Send + Sync {
    /// Return the candidates matching `query`, in engine order.
    async fn search(&self, query: &str) -> Result<Vec<Placemark>, LookupError>;
}

/// In-memory placemark list matched by query tokens.
///
/// A placemark matches when every alphanumeric token of the query appears,
/// case-insensitively, in its name or address fields.
#[derive(Debug, Clone, Default)]
pub struct PlacemarkIndex {
    placemarks: Vec<Placemark>,
}

impl PlacemarkIndex {
    /// Create an index over `placemarks`.
    pub fn new(placemarks: Vec<Placemark>) -> Self {
        Self { placemarks }
    }

    /// Load placemarks from a JSON array file.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::Config`] if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, LookupError> {
        let content = std::fs::read(path)
            .map_err(|e| LookupError::Config(format!("cannot read {}: {e}", path.display())))?;
        let placemarks: Vec<Placemark> = serde_json::from_slice(&content).map_err(|e| {
            LookupError::Config(format!("invalid placemark file {}: {e}", path.display()))
        })?;
        tracing::debug!(count = placemarks.len(), "placemark index loaded");
        Ok(Self::new(placemarks))
    }

    /// Number of placemarks in the index.
    pub fn len(&self) -> usize {
        self.placemarks.len()
    }

    /// Returns true if the index holds no placemarks.
    pub fn is_empty(&self) -> bool {
        self.placemarks.is_empty()
    }

    fn matches(placemark: &Placemark, tokens: &[String]) -> bool {
        let mut haystack = placemark.name.to_lowercase();
        if let Some(address) = &placemark.postal_address {
            for field in [
                &address.street,
                &address.city,
                &address.postcode,
                &address.state,
                &address.country,
            ] {
                haystack.push(' ');
                haystack.push_str(&field.to_lowercase());
            }
        }
        tokens.iter().all(|token| haystack.contains(token.as_str()))
    }
}

#[async_trait]
impl LocalSearchEngine for PlacemarkIndex {
    async fn search(&self, query: &str) -> Result<Vec<Placemark>, LookupError> {
        let tokens: Vec<String> = query
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
            .collect();
        if tokens.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .placemarks
            .iter()
            .filter(|p| Self::matches(p, &tokens))
            .cloned()
            .collect())
    }
}

/// A placemark known to carry a postal address.
#[derive(Debug, Clone, PartialEq)]
pub struct AddressedPlacemark {
    /// The structured address.
    pub address: PostalAddress,
    /// Position of the place.
    pub coordinate: Coordinate,
}

/// Gateway over a [`LocalSearchEngine`].
///
/// Starting a fetch cancels the previous one; the cancelled fetch resolves to
/// [`LookupError::Superseded`] and its results are never returned.
pub struct LocalSearchGateway {
    engine: Arc<dyn LocalSearchEngine>,
    in_flight: CancelSlot,
}

impl LocalSearchGateway {
    /// Create a gateway over `engine`.
    pub fn new(engine: Arc<dyn LocalSearchEngine>) -> Self {
        Self {
            engine,
            in_flight: CancelSlot::new(),
        }
    }

    /// Cancel the in-flight local search, if any.
    pub fn cancel(&self) -> bool {
        self.in_flight.cancel()
    }

    /// Claim the in-flight slot now, cancelling the current occupant.
    ///
    /// Lets a caller fix the order of searches before the fetch itself runs
    /// on another task.
    pub(crate) fn begin(&self) -> Ticket {
        self.in_flight.arm()
    }

    /// Run a fetch that already holds `ticket`.
    pub(crate) async fn fetch_with(
        &self,
        ticket: Ticket,
        term: &str,
    ) -> Result<Vec<AddressedPlacemark>, LookupError> {
        tracing::trace!(query = term, "local search");

        let outcome = tokio::select! {
            biased;
            _ = ticket.token.cancelled() => Err(LookupError::Superseded),
            result = self.engine.search(term) => result,
        };
        if !self.in_flight.claim(ticket.id) {
            return Err(LookupError::Superseded);
        }

        let placemarks = outcome?;
        let total = placemarks.len();
        let addressed: Vec<AddressedPlacemark> = placemarks
            .into_iter()
            .filter_map(|p| {
                p.postal_address.map(|address| AddressedPlacemark {
                    address,
                    coordinate: p.coordinate,
                })
            })
            .collect();

        tracing::debug!(
            total,
            addressed = addressed.len(),
            "local search returned placemarks"
        );
        Ok(addressed)
    }
}

impl ProviderGateway for LocalSearchGateway {
    type Payload = Vec<AddressedPlacemark>;

    async fn fetch(&self, term: &str) -> Result<Vec<AddressedPlacemark>, LookupError> {
        let ticket = self.begin();
        self.fetch_with(ticket, term).await
    }

    fn provider(&self) -> ProviderKind {
        ProviderKind::Local
    }
}
