//! Cover-art fallback chains.
//!
//! When a suggestion leaves normalization without a cover, the
//! [`CoverArtResolver`] walks the category's ordered chain of
//! [`CoverSource`]s one step at a time and stops at the first image. A step
//! that errors, finds nothing, or cannot key a lookup simply hands over to
//! the next one; an exhausted chain leaves the cover empty.

pub mod jikan;
pub mod musicbrainz;
pub mod open_library;
pub mod tmdb;

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use mediahint_common::{Category, Suggestion};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::{Config, CoverSourceKind, LookupProfile};

use super::provider::{CoverRequest, CoverSource};

pub use jikan::JikanImageSource;
pub use musicbrainz::MusicBrainzCoverSource;
pub use open_library::{OpenLibraryIsbnSource, OpenLibrarySearchSource};
pub use tmdb::TmdbPosterSource;

/// Run `chain` in order and return the first non-empty image URL.
///
/// Steps after the first success are never invoked.
pub async fn first_success(
    chain: &[Arc<dyn CoverSource>],
    request: &CoverRequest<'_>,
    cancel: &CancellationToken,
) -> Option<String> {
    for source in chain {
        if cancel.is_cancelled() {
            return None;
        }

        match source.find_cover(request, cancel).await {
            Ok(Some(url)) if !url.trim().is_empty() => {
                debug!(source = source.name(), title = request.title, "Cover found");
                return Some(url);
            }
            Ok(_) => {
                debug!(source = source.name(), title = request.title, "No cover; trying next source");
            }
            Err(e) => {
                debug!(
                    source = source.name(),
                    title = request.title,
                    error = %e,
                    "Cover source failed; trying next source"
                );
            }
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Source catalog
// ---------------------------------------------------------------------------

/// Every cover source the configuration enables, keyed by kind.
#[derive(Default, Clone)]
pub struct CoverSources {
    sources: HashMap<CoverSourceKind, Arc<dyn CoverSource>>,
}

impl CoverSources {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build every enabled source from `config`. TMDB is skipped without an
    /// API key.
    pub fn from_config(config: &Config) -> Self {
        let lookup = &config.lookup;
        let p = &config.providers;
        let mut sources = Self::new();

        if p.tmdb.enabled && p.tmdb.api_key().is_some() {
            sources.insert(
                CoverSourceKind::Tmdb,
                Arc::new(TmdbPosterSource::new(lookup, &p.tmdb)),
            );
        }
        if p.jikan.enabled {
            sources.insert(
                CoverSourceKind::Jikan,
                Arc::new(JikanImageSource::new(lookup, &p.jikan)),
            );
        }
        if p.musicbrainz.enabled && p.cover_art_archive.enabled {
            sources.insert(
                CoverSourceKind::Musicbrainz,
                Arc::new(MusicBrainzCoverSource::new(
                    lookup,
                    &p.musicbrainz,
                    &p.cover_art_archive,
                )),
            );
        }
        if p.open_library.enabled {
            sources.insert(
                CoverSourceKind::OpenLibraryIsbn,
                Arc::new(OpenLibraryIsbnSource::new(lookup, &p.open_library)),
            );
            sources.insert(
                CoverSourceKind::OpenLibrarySearch,
                Arc::new(OpenLibrarySearchSource::new(
                    lookup,
                    &p.open_library,
                    &p.open_library_covers,
                )),
            );
        }

        sources
    }

    pub fn insert(&mut self, kind: CoverSourceKind, source: Arc<dyn CoverSource>) {
        self.sources.insert(kind, source);
    }

    pub fn get(&self, kind: CoverSourceKind) -> Option<Arc<dyn CoverSource>> {
        self.sources.get(&kind).cloned()
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Per-category fallback chains for one call-site profile.
#[derive(Default, Clone)]
pub struct CoverArtResolver {
    chains: HashMap<Category, Vec<Arc<dyn CoverSource>>>,
}

impl CoverArtResolver {
    /// A resolver with no chains; every cover stays as normalized.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble the chains `profile` names from the available `sources`.
    /// Kinds with no built source are left out of the chain.
    pub fn from_profile(sources: &CoverSources, profile: &LookupProfile) -> Self {
        let mut resolver = Self::new();
        for category in Category::ALL {
            let chain: Vec<_> = profile
                .chain(category)
                .iter()
                .filter_map(|kind| {
                    let source = sources.get(*kind);
                    if source.is_none() {
                        debug!(%category, source = %kind, "Fallback source not configured; skipping");
                    }
                    source
                })
                .collect();
            resolver.set_chain(category, chain);
        }
        resolver
    }

    /// Replace the chain for `category`.
    pub fn set_chain(&mut self, category: Category, chain: Vec<Arc<dyn CoverSource>>) {
        if chain.is_empty() {
            self.chains.remove(&category);
        } else {
            self.chains.insert(category, chain);
        }
    }

    /// Number of steps in the chain for `category`.
    pub fn chain_len(&self, category: Category) -> usize {
        self.chains.get(&category).map_or(0, Vec::len)
    }

    /// Populate `suggestion.poster_url` from the category's chain when it is
    /// missing. Creator-mode records (no title) are returned unchanged.
    pub async fn fill_cover_art(
        &self,
        mut suggestion: Suggestion,
        category: Category,
        cancel: &CancellationToken,
    ) -> Suggestion {
        if !suggestion.is_missing_cover() || suggestion.title.is_none() {
            return suggestion;
        }
        let Some(chain) = self.chains.get(&category) else {
            return suggestion;
        };

        let request = CoverRequest {
            title: suggestion.title.as_deref().unwrap_or_default(),
            creator: &suggestion.creator,
            year: suggestion.year,
            isbn: suggestion.isbn.as_deref(),
        };

        if let Some(url) = first_success(chain, &request, cancel).await {
            suggestion.poster_url = Some(url);
        }
        suggestion
    }

    /// Fill every suggestion's cover; chains for different suggestions run
    /// concurrently, each chain stays sequential. Order is preserved.
    pub async fn fill_all(
        &self,
        suggestions: Vec<Suggestion>,
        category: Category,
        cancel: &CancellationToken,
    ) -> Vec<Suggestion> {
        join_all(
            suggestions
                .into_iter()
                .map(|s| self.fill_cover_art(s, category, cancel)),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mediahint_common::{Error, Result};
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum Outcome {
        Image(&'static str),
        Nothing,
        Fails,
    }

    struct StubSource {
        name: &'static str,
        outcome: Outcome,
        calls: AtomicUsize,
    }

    impl StubSource {
        fn new(name: &'static str, outcome: Outcome) -> Arc<Self> {
            Arc::new(Self {
                name,
                outcome,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CoverSource for StubSource {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn find_cover(
            &self,
            _request: &CoverRequest<'_>,
            _cancel: &CancellationToken,
        ) -> Result<Option<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.outcome {
                Outcome::Image(url) => Ok(Some(url.to_string())),
                Outcome::Nothing => Ok(None),
                Outcome::Fails => Err(Error::transport(self.name, "connection reset")),
            }
        }
    }

    fn resolver_with(category: Category, chain: Vec<Arc<StubSource>>) -> CoverArtResolver {
        let mut resolver = CoverArtResolver::new();
        resolver.set_chain(
            category,
            chain
                .into_iter()
                .map(|s| s as Arc<dyn CoverSource>)
                .collect(),
        );
        resolver
    }

    #[tokio::test]
    async fn first_successful_step_wins_and_later_steps_are_skipped() {
        let first = StubSource::new("first", Outcome::Fails);
        let second = StubSource::new("second", Outcome::Nothing);
        let third = StubSource::new("third", Outcome::Image("https://img/third.jpg"));
        let fourth = StubSource::new("fourth", Outcome::Image("https://img/fourth.jpg"));
        let resolver = resolver_with(
            Category::Book,
            vec![first.clone(), second.clone(), third.clone(), fourth.clone()],
        );

        let filled = resolver
            .fill_cover_art(
                Suggestion::work("Dune", "Frank Herbert"),
                Category::Book,
                &CancellationToken::new(),
            )
            .await;

        assert_eq!(filled.poster_url.as_deref(), Some("https://img/third.jpg"));
        assert_eq!(first.calls(), 1);
        assert_eq!(second.calls(), 1);
        assert_eq!(third.calls(), 1);
        assert_eq!(fourth.calls(), 0);
    }

    #[tokio::test]
    async fn exhausted_chain_leaves_cover_empty() {
        let only = StubSource::new("only", Outcome::Fails);
        let resolver = resolver_with(Category::Anime, vec![only.clone()]);

        let filled = resolver
            .fill_cover_art(
                Suggestion::work("Akira", "TMS Entertainment"),
                Category::Anime,
                &CancellationToken::new(),
            )
            .await;

        assert!(filled.poster_url.is_none());
        assert_eq!(only.calls(), 1);
    }

    #[tokio::test]
    async fn existing_cover_is_not_looked_up() {
        let source = StubSource::new("source", Outcome::Image("https://img/new.jpg"));
        let resolver = resolver_with(Category::Music, vec![source.clone()]);

        let mut suggestion = Suggestion::work("Kid A", "Radiohead");
        suggestion.poster_url = Some("https://img/original.jpg".into());

        let filled = resolver
            .fill_cover_art(suggestion, Category::Music, &CancellationToken::new())
            .await;
        assert_eq!(filled.poster_url.as_deref(), Some("https://img/original.jpg"));
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn creator_records_and_other_categories_are_untouched() {
        let source = StubSource::new("source", Outcome::Image("https://img/x.jpg"));
        let resolver = resolver_with(Category::Anime, vec![source.clone()]);
        let cancel = CancellationToken::new();

        let studio = resolver
            .fill_cover_art(
                Suggestion::creator("Studio Ghibli", vec!["Ponyo".into()]),
                Category::Anime,
                &cancel,
            )
            .await;
        assert!(studio.poster_url.is_none());

        let film = resolver
            .fill_cover_art(Suggestion::work("Heat", "Michael Mann"), Category::Film, &cancel)
            .await;
        assert!(film.poster_url.is_none());
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn cancelled_walk_stops_before_first_step() {
        let source = StubSource::new("source", Outcome::Image("https://img/x.jpg"));
        let resolver = resolver_with(Category::Book, vec![source.clone()]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let filled = resolver
            .fill_cover_art(Suggestion::work("Emma", "Jane Austen"), Category::Book, &cancel)
            .await;
        assert!(filled.poster_url.is_none());
        assert_eq!(source.calls(), 0);
    }

    #[test]
    fn profile_chain_skips_unbuilt_sources() {
        let mut sources = CoverSources::new();
        sources.insert(
            CoverSourceKind::OpenLibrarySearch,
            StubSource::new("search", Outcome::Nothing),
        );

        let profile = LookupProfile {
            max_results: 5,
            fallbacks: [(
                Category::Book,
                vec![
                    CoverSourceKind::OpenLibraryIsbn,
                    CoverSourceKind::OpenLibrarySearch,
                ],
            )]
            .into_iter()
            .collect(),
        };

        let resolver = CoverArtResolver::from_profile(&sources, &profile);
        assert_eq!(resolver.chain_len(Category::Book), 1);
        assert_eq!(resolver.chain_len(Category::Film), 0);
    }

    #[test]
    fn tmdb_requires_api_key() {
        let sources = CoverSources::from_config(&Config::default());
        assert!(sources.get(CoverSourceKind::Tmdb).is_none());
        assert!(sources.get(CoverSourceKind::Jikan).is_some());
        assert!(sources.get(CoverSourceKind::OpenLibraryIsbn).is_some());
    }
}
