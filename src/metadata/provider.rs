//! Trait definitions and types for catalog adapters and cover sources.
//!
//! This module defines the [`CatalogAdapter`] trait that every primary
//! catalog (OMDb, AniList, iTunes, Google Books) implements, the
//! [`CoverSource`] trait for secondary cover-art services, and the
//! [`RawCandidate`] shape both sides exchange before normalization.

use async_trait::async_trait;
use mediahint_common::{Category, ProviderQuery, Result, SearchField};
use tokio_util::sync::CancellationToken;

// ---------------------------------------------------------------------------
// Raw candidates
// ---------------------------------------------------------------------------

/// A provider record before normalization.
///
/// Adapters fill in whatever their endpoint exposes and leave the rest at
/// the default; the normalizer never fails on a missing field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawCandidate {
    /// Provider-specific identifier, used for detail fetches.
    pub provider_id: Option<String>,
    /// Work title as the provider spells it.
    pub title: Option<String>,
    /// Creator string exactly as the provider returned it.
    pub creator: Option<String>,
    /// Individual creator names, for grouping in creator mode. When empty,
    /// `creator` is treated as a single name.
    pub creators: Vec<String>,
    /// Cover image URL.
    pub poster_url: Option<String>,
    /// Release year.
    pub year: Option<u16>,
    /// Works already grouped under this creator by the provider.
    pub related_works: Vec<String>,
    /// ISBN-13 or ISBN-10, books only.
    pub isbn: Option<String>,
}

impl RawCandidate {
    /// Individual creator names: `creators` if populated, else `creator`.
    pub fn creator_names(&self) -> Vec<&str> {
        if !self.creators.is_empty() {
            return self.creators.iter().map(String::as_str).collect();
        }
        self.creator
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .into_iter()
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Catalog adapter trait
// ---------------------------------------------------------------------------

/// Async trait implemented by each primary catalog.
///
/// One adapter serves one [`Category`] and both search fields. Adapters whose
/// search endpoint omits the creator override [`detail_limit`](Self::detail_limit)
/// and [`detail`](Self::detail); the engine fans detail calls out concurrently.
#[async_trait]
pub trait CatalogAdapter: Send + Sync {
    /// Short, lowercase identifier for this adapter (e.g. `"omdb"`).
    fn name(&self) -> &'static str;

    /// The category this adapter answers for.
    fn category(&self) -> Category;

    /// Returns `true` when the adapter has the credentials it needs.
    fn is_available(&self) -> bool;

    /// Run the provider search for `query`, searching by `query.field()`.
    ///
    /// Results keep provider order.
    async fn search(
        &self,
        query: &ProviderQuery,
        cancel: &CancellationToken,
    ) -> Result<Vec<RawCandidate>>;

    /// How many search results need a detail fetch in `field` mode, or `None`
    /// when the search response is already complete.
    fn detail_limit(&self, _field: SearchField) -> Option<usize> {
        None
    }

    /// Complete a search result with fields only the detail endpoint exposes.
    async fn detail(
        &self,
        candidate: RawCandidate,
        _cancel: &CancellationToken,
    ) -> Result<RawCandidate> {
        Ok(candidate)
    }
}

// ---------------------------------------------------------------------------
// Cover source trait
// ---------------------------------------------------------------------------

/// What a cover source may key its lookup on.
#[derive(Debug, Clone, Copy)]
pub struct CoverRequest<'a> {
    pub title: &'a str,
    pub creator: &'a str,
    pub year: Option<u16>,
    pub isbn: Option<&'a str>,
}

/// One step of a cover-art fallback chain.
#[async_trait]
pub trait CoverSource: Send + Sync {
    /// Short, lowercase identifier for this source (e.g. `"jikan"`).
    fn name(&self) -> &'static str;

    /// Look up a cover image. `Ok(None)` means the source had no match or
    /// could not key a lookup from `request`.
    async fn find_cover(
        &self,
        request: &CoverRequest<'_>,
        cancel: &CancellationToken,
    ) -> Result<Option<String>>;
}
