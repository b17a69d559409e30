//! The suggestion engine: one pipeline shared by every call site.
//!
//! ```text
//! adapter.search ─▶ detail fan-out ─▶ normalize ─▶ secondary filter
//!                                                   ─▶ truncate(K) ─▶ cover chains
//! ```
//!
//! Every provider failure collapses to "no data from this provider"; the
//! engine's entry points never return an error.

use async_trait::async_trait;
use futures::future::join_all;
use mediahint_common::{Category, Error, ProviderQuery, QueryToken, SearchField, Suggestion};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::Config;

use super::covers::{CoverArtResolver, CoverSources};
use super::normalize;
use super::provider::{CatalogAdapter, RawCandidate};
use super::registry::AdapterRegistry;

/// Anything that can turn a [`ProviderQuery`] into suggestions.
///
/// The request coordinator depends on this seam rather than on the engine
/// directly.
#[async_trait]
pub trait Resolve: Send + Sync {
    /// Resolve `query` into at most `max_results` suggestions. Never fails.
    async fn resolve_query(
        &self,
        query: &ProviderQuery,
        max_results: usize,
        cancel: &CancellationToken,
    ) -> Vec<Suggestion>;
}

/// Resolves queries against the registered adapters and one profile's cover
/// fallback chains.
pub struct SuggestionEngine {
    registry: AdapterRegistry,
    covers: CoverArtResolver,
    default_max_results: usize,
}

impl SuggestionEngine {
    pub fn new(
        registry: AdapterRegistry,
        covers: CoverArtResolver,
        default_max_results: usize,
    ) -> Self {
        Self {
            registry,
            covers,
            default_max_results,
        }
    }

    /// Build the engine for the named call-site profile.
    pub fn from_config(config: &Config, profile_name: &str) -> anyhow::Result<Self> {
        let profile = config
            .profiles
            .get(profile_name)
            .ok_or_else(|| anyhow::anyhow!("Unknown lookup profile '{}'", profile_name))?;

        let registry = AdapterRegistry::from_config(config);
        let covers = CoverArtResolver::from_profile(&CoverSources::from_config(config), profile);

        info!(
            profile = profile_name,
            max_results = profile.max_results,
            adapters = ?registry.available(),
            "Suggestion engine ready"
        );

        Ok(Self::new(registry, covers, profile.max_results))
    }

    /// The profile's result cap.
    pub fn default_max_results(&self) -> usize {
        self.default_max_results
    }

    /// Resolve one lookup to at most `max_results` suggestions.
    ///
    /// Returns an empty list when `primary_term` is blank (without any
    /// network call), when the provider fails, or when the secondary filter
    /// removes every candidate.
    pub async fn resolve(
        &self,
        category: Category,
        field: SearchField,
        primary_term: &str,
        secondary_term: &str,
        max_results: usize,
    ) -> Vec<Suggestion> {
        let query = ProviderQuery::new(
            category,
            field,
            primary_term,
            secondary_term,
            QueryToken::FIRST,
        );
        self.run(&query, max_results, &CancellationToken::new()).await
    }

    async fn run(
        &self,
        query: &ProviderQuery,
        max_results: usize,
        cancel: &CancellationToken,
    ) -> Vec<Suggestion> {
        if query.is_empty() || max_results == 0 {
            return Vec::new();
        }

        let Some(adapter) = self.registry.get(query.category(), query.field()) else {
            warn!(
                category = %query.category(),
                field = %query.field(),
                "No available adapter; returning no suggestions"
            );
            return Vec::new();
        };

        let candidates = match adapter.search(query, cancel).await {
            Ok(candidates) => candidates,
            Err(e) => {
                log_collapsed(adapter.name(), query, &e);
                return Vec::new();
            }
        };

        let candidates = complete_details(adapter.as_ref(), query, candidates, cancel).await;
        let suggestions =
            normalize::shape(query.field(), query.secondary_term(), candidates, max_results);

        debug!(
            token = %query.token(),
            provider = adapter.name(),
            count = suggestions.len(),
            "Suggestions shaped"
        );

        self.covers
            .fill_all(suggestions, query.category(), cancel)
            .await
    }
}

#[async_trait]
impl Resolve for SuggestionEngine {
    async fn resolve_query(
        &self,
        query: &ProviderQuery,
        max_results: usize,
        cancel: &CancellationToken,
    ) -> Vec<Suggestion> {
        self.run(query, max_results, cancel).await
    }
}

/// Run the adapter's detail call for every candidate concurrently and wait
/// for all of them. A failed detail call keeps the search-level candidate.
async fn complete_details(
    adapter: &dyn CatalogAdapter,
    query: &ProviderQuery,
    mut candidates: Vec<RawCandidate>,
    cancel: &CancellationToken,
) -> Vec<RawCandidate> {
    let Some(limit) = adapter.detail_limit(query.field()) else {
        return candidates;
    };
    candidates.truncate(limit);

    join_all(candidates.into_iter().map(|candidate| async move {
        match adapter.detail(candidate.clone(), cancel).await {
            Ok(completed) => completed,
            Err(e) => {
                log_collapsed(adapter.name(), query, &e);
                candidate
            }
        }
    }))
    .await
}

fn log_collapsed(provider: &'static str, query: &ProviderQuery, error: &Error) {
    if error.is_cancelled() {
        debug!(provider, token = %query.token(), "Provider call cancelled");
    } else {
        warn!(
            provider,
            token = %query.token(),
            term = query.primary_term(),
            error = %error,
            "Provider call failed; treating as no data"
        );
    }
}
