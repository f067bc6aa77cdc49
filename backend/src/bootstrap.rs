//! Assemble a search service from [`NearbySettings`].
//!
//! Shared by the HTTP server and the one-shot CLI so both run the same
//! adapters with the same configuration.

use std::path::PathBuf;
use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use prometheus::Registry;
use tracing::info;

use crate::domain::ports::{DisabledPlaceCache, PlaceCache, PlaceSource};
use crate::domain::{
    BaselineScorer, CatalogueError, CategoryCatalogue, CategoryResolver, EnrichedScorer,
    PlaceScorer, PlaceSearchPorts, PlaceSearchService, ScoringTier, SearchEngineConfig,
};
use crate::outbound::cache::InMemoryPlaceCache;
use crate::outbound::metrics::PrometheusSearchMetrics;
use crate::outbound::overpass::{OverpassHttpIdentity, OverpassHttpSource};
use crate::settings::{NearbySettings, SettingsError};

/// Startup failures.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// A setting could not be interpreted.
    #[error(transparent)]
    Settings(#[from] SettingsError),
    /// The catalogue file could not be read.
    #[error("failed to read category catalogue {path}: {source}")]
    ReadCatalogue {
        /// Configured path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The catalogue file is invalid.
    #[error("invalid category catalogue {path}: {source}")]
    Catalogue {
        /// Configured path.
        path: PathBuf,
        /// Validation failure.
        source: CatalogueError,
    },
    /// The HTTP client could not be built.
    #[error("failed to build Overpass client: {0}")]
    HttpClient(#[from] reqwest::Error),
    /// The search counters could not be registered.
    #[error("failed to register search metrics: {0}")]
    Metrics(#[from] prometheus::Error),
}

/// Service plus the handles the server needs alongside it.
pub struct SearchStack {
    /// Shared search service.
    pub service: Arc<PlaceSearchService>,
    /// Cache backing the service, swept in the background.
    pub cache: Arc<dyn PlaceCache>,
    /// Registry holding the search counters.
    pub registry: Registry,
}

/// Build the production stack: Overpass source, in-memory cache, Prometheus
/// counters, and the system clock.
///
/// # Errors
/// See [`BootstrapError`].
pub fn build_search_stack(settings: &NearbySettings) -> Result<SearchStack, BootstrapError> {
    let identity = OverpassHttpIdentity {
        user_agent: settings
            .overpass_user_agent
            .clone()
            .unwrap_or_else(|| OverpassHttpIdentity::default().user_agent),
        contact: settings
            .overpass_contact
            .clone()
            .unwrap_or_else(|| OverpassHttpIdentity::default().contact),
        query_timeout_seconds: settings.query_timeout_seconds(),
    };
    let source = OverpassHttpSource::with_identity(
        settings.overpass_endpoint()?,
        settings.http_timeout(),
        identity,
    )?;
    build_search_stack_with(settings, Arc::new(source), Arc::new(DefaultClock))
}

/// Build a stack around an explicit provider and clock.
///
/// # Errors
/// See [`BootstrapError`].
pub fn build_search_stack_with(
    settings: &NearbySettings,
    source: Arc<dyn PlaceSource>,
    clock: Arc<dyn Clock>,
) -> Result<SearchStack, BootstrapError> {
    let config = engine_config(settings)?;
    let catalogue = load_catalogue(settings)?;
    let resolver = CategoryResolver::new(settings.category_mode()?, Arc::new(catalogue));
    let scorer: Arc<dyn PlaceScorer> = match settings.scoring_tier()? {
        ScoringTier::Baseline => Arc::new(BaselineScorer),
        ScoringTier::Enriched => Arc::new(EnrichedScorer::default()),
    };
    let ttl = settings.cache_ttl();
    let cache: Arc<dyn PlaceCache> = if ttl.is_zero() {
        info!("result caching disabled");
        Arc::new(DisabledPlaceCache)
    } else {
        Arc::new(InMemoryPlaceCache::new(ttl, clock.clone()))
    };
    let registry = Registry::new();
    let metrics = PrometheusSearchMetrics::new(&registry)?;
    let ports = PlaceSearchPorts::new(source, cache.clone(), Arc::new(metrics));

    info!(
        mode = ?resolver.mode(),
        radii = ?config.radii.radii(),
        top_n = config.top_n,
        "search service configured"
    );
    let service = PlaceSearchService::new(ports, resolver, scorer, clock, config);
    Ok(SearchStack {
        service: Arc::new(service),
        cache,
        registry,
    })
}

/// Translate settings into engine tuning.
///
/// # Errors
/// See [`SettingsError`].
pub fn engine_config(settings: &NearbySettings) -> Result<SearchEngineConfig, SettingsError> {
    Ok(SearchEngineConfig {
        radii: settings.radii()?,
        top_n: settings.top_n()?,
        coordinate_precision: settings.coordinate_precision()?,
        provider_timeout: settings.http_timeout(),
        convention: settings.bucket_convention()?,
        utc_offset: settings.utc_offset()?,
    })
}

fn load_catalogue(settings: &NearbySettings) -> Result<CategoryCatalogue, BootstrapError> {
    let Some(path) = settings.catalogue_path.as_ref() else {
        return Ok(CategoryCatalogue::builtin());
    };
    let raw = std::fs::read_to_string(path).map_err(|source| BootstrapError::ReadCatalogue {
        path: path.clone(),
        source,
    })?;
    let catalogue =
        CategoryCatalogue::from_json(&raw).map_err(|source| BootstrapError::Catalogue {
            path: path.clone(),
            source,
        })?;
    info!(
        path = %path.display(),
        categories = catalogue.rules().len(),
        "loaded category catalogue"
    );
    Ok(catalogue)
}
