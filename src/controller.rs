//! Search controller: provider dispatch, debouncing, and result delivery.
//!
//! [`SearchController`] is the single entry point for address searches. It
//! owns the configured gateway, a debounce slot for delayed searches, and the
//! callback every result is delivered to.
//!
//! # Delivery guarantees
//!
//! - The callback never runs inside [`search`](SearchController::search) or
//!   [`search_with_delay`](SearchController::search_with_delay); results are
//!   delivered from a spawned task.
//! - Each accepted search delivers exactly once, success or failure.
//! - A delayed search replaced by a newer one, or cancelled with
//!   [`cancel_search`](SearchController::cancel_search), never delivers.
//! - A local search started while another local search is in flight cancels
//!   the older one, which never delivers. Remote searches are not cancelable
//!   once issued.

use std::sync::Arc;
use std::time::Duration;

use crate::config::{LookupConfig, ProviderConfig};
use crate::error::{LookupError, Result};
use crate::gateway::ProviderGateway;
use crate::gateways::local::{LocalSearchEngine, PlacemarkIndex};
use crate::gateways::{GeocoderGateway, LocalSearchGateway, PostcodeGateway};
use crate::normalize::{
    AddressParser, CommaAddressParser, normalize_candidates, normalize_placemarks,
    normalize_postcode_lookup,
};
use crate::slot::{CancelSlot, Ticket};
use crate::types::{AddressRecord, ProviderKind};

/// What a search callback receives.
pub type SearchOutcome = std::result::Result<Vec<AddressRecord>, LookupError>;

type Callback = Arc<dyn Fn(SearchOutcome) + Send + Sync>;

/// The configured gateway, chosen once at construction.
enum Backend {
    Local(LocalSearchGateway),
    Geocoder(GeocoderGateway),
    Postcode(PostcodeGateway),
    /// A remote provider configured without an API key, with the error every
    /// search reports.
    MissingCredential(ProviderKind, LookupError),
}

impl Backend {
    fn kind(&self) -> ProviderKind {
        match self {
            Self::Local(g) => g.provider(),
            Self::Geocoder(g) => g.provider(),
            Self::Postcode(g) => g.provider(),
            Self::MissingCredential(kind, _) => *kind,
        }
    }

    /// Claim the local in-flight slot, if this is the local backend.
    fn begin(&self) -> Option<Ticket> {
        match self {
            Self::Local(g) => Some(g.begin()),
            _ => None,
        }
    }
}

struct Inner {
    backend: Backend,
    parser: Arc<dyn AddressParser>,
    on_result: Callback,
    debounce: CancelSlot,
    runtime: tokio::runtime::Handle,
}

impl Inner {
    async fn lookup(&self, term: &str, ticket: Option<Ticket>) -> SearchOutcome {
        match &self.backend {
            Backend::Local(gateway) => {
                let ticket = ticket.unwrap_or_else(|| gateway.begin());
                let placemarks = gateway.fetch_with(ticket, term).await?;
                Ok(normalize_placemarks(&placemarks))
            }
            Backend::Geocoder(gateway) => {
                let candidates = gateway.fetch(term).await?;
                Ok(normalize_candidates(&candidates, self.parser.as_ref()))
            }
            Backend::Postcode(gateway) => {
                let lookup = gateway.fetch(term).await?;
                Ok(normalize_postcode_lookup(&lookup))
            }
            Backend::MissingCredential(_, err) => Err(err.clone()),
        }
    }

    async fn run(&self, term: String, ticket: Option<Ticket>) {
        let provider = self.backend.kind();
        tracing::trace!(query = %term, %provider, "search started");

        match self.lookup(&term, ticket).await {
            Err(LookupError::Superseded) => {
                tracing::trace!(%provider, "search superseded; result dropped");
            }
            Ok(records) => {
                tracing::debug!(%provider, count = records.len(), "search completed");
                (self.on_result)(Ok(records));
            }
            Err(err) => {
                tracing::warn!(%provider, code = err.code(), error = %err, "search failed");
                (self.on_result)(Err(err));
            }
        }
    }

    fn spawn_search(self: &Arc<Self>, term: String) {
        let ticket = self.backend.begin();
        let inner = Arc::clone(self);
        self.runtime.spawn(async move { inner.run(term, ticket).await });
    }
}

/// Builder for [`SearchController`].
pub struct SearchControllerBuilder {
    config: LookupConfig,
    local_engine: Option<Arc<dyn LocalSearchEngine>>,
    parser: Option<Arc<dyn AddressParser>>,
}

impl SearchControllerBuilder {
    /// Use `engine` for the local provider instead of loading `config.local_index`.
    pub fn local_engine(mut self, engine: Arc<dyn LocalSearchEngine>) -> Self {
        self.local_engine = Some(engine);
        self
    }

    /// Use `parser` to decompose geocoder addresses instead of [`CommaAddressParser`].
    pub fn parser(mut self, parser: Arc<dyn AddressParser>) -> Self {
        self.parser = Some(parser);
        self
    }

    /// Build the controller, delivering every result to `on_result`.
    ///
    /// Must be called from within a tokio runtime; searches are spawned on it.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::Config`] if the configuration is invalid, the
    /// local index cannot be loaded, or no tokio runtime is running.
    pub fn build<F>(self, on_result: F) -> Result<SearchController>
    where
        F: Fn(SearchOutcome) + Send + Sync + 'static,
    {
        self.config.validate()?;
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| LookupError::Config(format!("search controller needs a tokio runtime: {e}")))?;

        let config = &self.config;
        let backend = match &config.provider {
            ProviderConfig::Local => {
                let engine: Arc<dyn LocalSearchEngine> = match (self.local_engine, &config.local_index) {
                    (Some(engine), _) => engine,
                    (None, Some(path)) => Arc::new(PlacemarkIndex::from_file(path)?),
                    (None, None) => Arc::new(PlacemarkIndex::default()),
                };
                Backend::Local(LocalSearchGateway::new(engine))
            }
            ProviderConfig::Geocoder { .. } => match config.provider.credential() {
                Ok(key) => Backend::Geocoder(GeocoderGateway::new(key, config)?),
                Err(err) => Backend::MissingCredential(ProviderKind::Geocoder, err),
            },
            ProviderConfig::Postcode { .. } => match config.provider.credential() {
                Ok(key) => Backend::Postcode(PostcodeGateway::new(key, config)?),
                Err(err) => Backend::MissingCredential(ProviderKind::Postcode, err),
            },
        };

        tracing::debug!(provider = %backend.kind(), "search controller ready");

        Ok(SearchController {
            inner: Arc::new(Inner {
                backend,
                parser: self
                    .parser
                    .unwrap_or_else(|| Arc::new(CommaAddressParser::new())),
                on_result: Arc::new(on_result),
                debounce: CancelSlot::new(),
                runtime,
            }),
            default_delay: Duration::from_millis(self.config.debounce_ms),
        })
    }
}

/// Runs address searches against the configured provider.
///
/// # Examples
///
/// ```no_run
/// use geolookup::{LookupConfig, ProviderConfig, SearchController};
///
/// # async fn example() -> geolookup::Result<()> {
/// let config = LookupConfig::for_provider(ProviderConfig::Postcode {
///     api_key: Some("my-key".into()),
/// });
/// let controller = SearchController::new(config, |outcome| match outcome {
///     Ok(records) => records.iter().for_each(|r| println!("{r}")),
///     Err(err) => eprintln!("lookup failed: {err}"),
/// })?;
/// controller.search_debounced("LE12 6SY");
/// # Ok(())
/// # }
/// ```
pub struct SearchController {
    inner: Arc<Inner>,
    default_delay: Duration,
}

impl SearchController {
    /// Start building a controller for `config`.
    pub fn builder(config: LookupConfig) -> SearchControllerBuilder {
        SearchControllerBuilder {
            config,
            local_engine: None,
            parser: None,
        }
    }

    /// Create a controller with the default local engine and address parser.
    ///
    /// # Errors
    ///
    /// See [`SearchControllerBuilder::build`].
    pub fn new<F>(config: LookupConfig, on_result: F) -> Result<Self>
    where
        F: Fn(SearchOutcome) + Send + Sync + 'static,
    {
        Self::builder(config).build(on_result)
    }

    /// Returns the configured provider.
    pub fn provider(&self) -> ProviderKind {
        self.inner.backend.kind()
    }

    /// Search for `term` now.
    ///
    /// Cancels any pending delayed search. An earlier remote search that is
    /// already in flight still delivers its result.
    pub fn search(&self, term: &str) {
        if self.inner.debounce.cancel() {
            tracing::trace!("pending delayed search replaced by immediate search");
        }
        self.inner.spawn_search(term.to_owned());
    }

    /// Search for `term` once `delay` has passed without another delayed search.
    ///
    /// Replaces any pending delayed search; only the most recent one fires.
    pub fn search_with_delay(&self, term: &str, delay: Duration) {
        let ticket = self.inner.debounce.arm();
        let inner = Arc::clone(&self.inner);
        let term = term.to_owned();
        self.inner.runtime.spawn(async move {
            tokio::select! {
                biased;
                _ = ticket.token.cancelled() => {
                    tracing::trace!("delayed search cancelled");
                    return;
                }
                _ = tokio::time::sleep(delay) => {}
            }
            if !inner.debounce.claim(ticket.id) {
                return;
            }
            let local = inner.backend.begin();
            inner.run(term, local).await;
        });
    }

    /// [`search_with_delay`](Self::search_with_delay) with the configured `debounce_ms`.
    pub fn search_debounced(&self, term: &str) {
        self.search_with_delay(term, self.default_delay);
    }

    /// Cancel the pending delayed search, if any.
    ///
    /// Searches already issued are not aborted. Returns true if a pending
    /// search was cancelled.
    pub fn cancel_search(&self) -> bool {
        self.inner.debounce.cancel()
    }

    /// Returns true while a delayed search is waiting to fire.
    pub fn has_pending_search(&self) -> bool {
        self.inner.debounce.is_armed()
    }

    /// Search for `term` and return the outcome directly instead of through
    /// the callback.
    ///
    /// Does not touch the debounce slot. A local lookup still cancels, and
    /// can be cancelled by, other local searches from this controller.
    pub async fn lookup(&self, term: &str) -> SearchOutcome {
        self.inner.lookup(term, None).await
    }
}

impl Drop for SearchController {
    fn drop(&mut self) {
        self.inner.debounce.cancel();
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::error::ErrorKind;
    use crate::gateways::local::{Placemark, PostalAddress};
    use crate::types::Coordinate;
    use async_trait::async_trait;
    use tokio::sync::mpsc;

    fn placemark(street: &str, city: &str) -> Placemark {
        Placemark {
            name: street.into(),
            postal_address: Some(PostalAddress {
                street: street.into(),
                city: city.into(),
                ..Default::default()
            }),
            coordinate: Coordinate::new(52.0, -1.0),
        }
    }

    fn index() -> Arc<dyn LocalSearchEngine> {
        Arc::new(PlacemarkIndex::new(vec![
            placemark("10 Alpha Road", "Aston"),
            placemark("9 Alpha Road", "Aston"),
            placemark("1 Bravo Street", "Bourne"),
        ]))
    }

    /// Engine that answers after a fixed delay.
    struct SlowEngine(Duration);

    #[async_trait]
    impl LocalSearchEngine for SlowEngine {
        async fn search(&self, query: &str) -> std::result::Result<Vec<Placemark>, LookupError> {
            tokio::time::sleep(self.0).await;
            Ok(vec![placemark(query, "Slowtown")])
        }
    }

    fn controller_with(
        config: LookupConfig,
        engine: Arc<dyn LocalSearchEngine>,
    ) -> (SearchController, mpsc::UnboundedReceiver<SearchOutcome>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let controller = SearchController::builder(config)
            .local_engine(engine)
            .build(move |outcome| {
                let _ = tx.send(outcome);
            })
            .unwrap();
        (controller, rx)
    }

    fn local_controller() -> (SearchController, mpsc::UnboundedReceiver<SearchOutcome>) {
        controller_with(LookupConfig::default(), index())
    }

    fn streets(outcome: SearchOutcome) -> Vec<String> {
        outcome
            .unwrap()
            .iter()
            .map(|r| r.street_address().to_string())
            .collect()
    }

    #[tokio::test]
    async fn search_delivers_sorted_records_asynchronously() {
        let (controller, mut rx) = local_controller();
        controller.search("alpha");
        assert!(rx.try_recv().is_err(), "callback must not run synchronously");

        let outcome = rx.recv().await.unwrap();
        assert_eq!(streets(outcome), vec!["9 Alpha Road", "10 Alpha Road"]);
    }

    #[tokio::test]
    async fn search_with_no_matches_delivers_empty_list() {
        let (controller, mut rx) = local_controller();
        controller.search("zulu");
        let outcome = rx.recv().await.unwrap();
        assert!(outcome.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn delayed_search_waits_for_delay() {
        let (controller, mut rx) = local_controller();
        controller.search_with_delay("bravo", Duration::from_millis(500));
        assert!(controller.has_pending_search());

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_millis(200)).await;
        let outcome = rx.recv().await.unwrap();
        assert_eq!(streets(outcome), vec!["1 Bravo Street"]);
        assert!(!controller.has_pending_search());
    }

    #[tokio::test(start_paused = true)]
    async fn newer_delayed_search_replaces_older() {
        let (controller, mut rx) = local_controller();
        controller.search_with_delay("alpha", Duration::from_millis(500));
        tokio::time::sleep(Duration::from_millis(100)).await;
        controller.search_with_delay("bravo", Duration::from_millis(500));

        tokio::time::sleep(Duration::from_secs(2)).await;
        let outcome = rx.try_recv().unwrap();
        assert_eq!(streets(outcome), vec!["1 Bravo Street"]);
        assert!(rx.try_recv().is_err(), "superseded search must not fire");
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_search_prevents_delivery() {
        let (controller, mut rx) = local_controller();
        controller.search_with_delay("alpha", Duration::from_millis(500));
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(controller.cancel_search());
        assert!(!controller.cancel_search());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn immediate_search_cancels_pending_delayed_search() {
        let (controller, mut rx) = local_controller();
        controller.search_with_delay("alpha", Duration::from_millis(500));
        controller.search("bravo");

        tokio::time::sleep(Duration::from_secs(2)).await;
        let outcome = rx.try_recv().unwrap();
        assert_eq!(streets(outcome), vec!["1 Bravo Street"]);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_controller_cancels_pending_search() {
        let (controller, mut rx) = local_controller();
        controller.search_with_delay("alpha", Duration::from_millis(500));
        drop(controller);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn newer_local_search_supersedes_in_flight_one() {
        let (controller, mut rx) =
            controller_with(LookupConfig::default(), Arc::new(SlowEngine(Duration::from_millis(100))));
        controller.search("first");
        controller.search("second");

        tokio::time::sleep(Duration::from_secs(1)).await;
        let outcome = rx.try_recv().unwrap();
        assert_eq!(streets(outcome), vec!["second"]);
        assert!(rx.try_recv().is_err(), "stale local result must not deliver");
    }

    #[tokio::test(start_paused = true)]
    async fn search_debounced_uses_configured_delay() {
        let config = LookupConfig {
            debounce_ms: 50,
            ..Default::default()
        };
        let (controller, mut rx) = controller_with(config, index());
        controller.search_debounced("bravo");

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(rx.try_recv().is_err());
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(rx.recv().await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn remote_provider_without_key_reports_missing_credential() {
        for provider in [
            ProviderConfig::Geocoder { api_key: None },
            ProviderConfig::Postcode {
                api_key: Some(" ".into()),
            },
        ] {
            let (controller, mut rx) = controller_with(LookupConfig::for_provider(provider), index());
            controller.search("LE12 6SY");
            let err = rx.recv().await.unwrap().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::MissingCredential);
        }
    }

    #[tokio::test]
    async fn missing_credential_error_matches_config_and_repeats() {
        let provider = ProviderConfig::Geocoder { api_key: None };
        let expected = provider.credential().unwrap_err().to_string();
        let (controller, mut rx) = controller_with(LookupConfig::for_provider(provider), index());

        controller.search("first");
        controller.search("second");
        for _ in 0..2 {
            let err = rx.recv().await.unwrap().unwrap_err();
            assert_eq!(err.to_string(), expected);
        }
    }

    #[tokio::test]
    async fn lookup_returns_outcome_directly() {
        let (controller, mut rx) = local_controller();
        let records = controller.lookup("alpha").await.unwrap();
        assert_eq!(records.len(), 2);
        assert!(rx.try_recv().is_err(), "lookup does not use the callback");
    }

    #[tokio::test]
    async fn provider_reports_configured_kind() {
        let (controller, _rx) = local_controller();
        assert_eq!(controller.provider(), ProviderKind::Local);

        let config = LookupConfig::for_provider(ProviderConfig::Geocoder { api_key: None });
        let (controller, _rx) = controller_with(config, index());
        assert_eq!(controller.provider(), ProviderKind::Geocoder);
    }

    #[tokio::test]
    async fn invalid_config_is_rejected() {
        let config = LookupConfig {
            timeout_seconds: 0,
            ..Default::default()
        };
        let result = SearchController::new(config, |_| {});
        assert!(matches!(result, Err(LookupError::Config(_))));
    }

    #[test]
    fn building_outside_runtime_fails() {
        let result = SearchController::new(LookupConfig::default(), |_| {});
        assert!(matches!(result, Err(LookupError::Config(_))));
    }
}
