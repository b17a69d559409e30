//! iTunes Search music catalog adapter.
//!
//! Title mode searches albums; a typed artist is prepended to the search
//! term to bias results server-side. Creator mode restricts term matching
//! to the artist attribute, so every album returned belongs to a matching
//! artist and can be grouped under it.

use async_trait::async_trait;
use mediahint_common::{Category, ProviderQuery, Result, SearchField};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::{LookupConfig, ProviderEndpoint};
use crate::metadata::http::{parse_year, HttpClient};
use crate::metadata::provider::{CatalogAdapter, RawCandidate};

const ITUNES_BASE_URL: &str = "https://itunes.apple.com";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<Album>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Album {
    collection_id: Option<u64>,
    collection_name: Option<String>,
    artist_name: Option<String>,
    artwork_url100: Option<String>,
    release_date: Option<String>,
}

/// Ask the artwork CDN for a larger rendition than the 100px default.
fn upscale_artwork(url: &str) -> String {
    url.replace("100x100bb", "600x600bb")
}

/// Music adapter backed by the iTunes Search API.
pub struct ItunesAdapter {
    http: HttpClient,
    base_url: String,
    page_size: usize,
    enabled: bool,
}

impl ItunesAdapter {
    pub fn new(lookup: &LookupConfig, endpoint: &ProviderEndpoint) -> Self {
        Self {
            http: HttpClient::new("itunes", lookup, endpoint),
            base_url: endpoint.base_url_or(ITUNES_BASE_URL),
            page_size: lookup.page_size,
            enabled: endpoint.enabled,
        }
    }

    fn params(&self, query: &ProviderQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("media", "music".to_string()),
            ("entity", "album".to_string()),
            ("limit", self.page_size.to_string()),
        ];

        match query.field() {
            SearchField::Title => {
                let term = match query.secondary_term() {
                    Some(artist) => format!("{artist} {}", query.primary_term()),
                    None => query.primary_term().to_string(),
                };
                params.push(("term", term));
            }
            SearchField::Creator => {
                params.push(("term", query.primary_term().to_string()));
                params.push(("attribute", "artistTerm".to_string()));
            }
        }
        params
    }
}

#[async_trait]
impl CatalogAdapter for ItunesAdapter {
    fn name(&self) -> &'static str {
        "itunes"
    }

    fn category(&self) -> Category {
        Category::Music
    }

    fn is_available(&self) -> bool {
        self.enabled
    }

    async fn search(
        &self,
        query: &ProviderQuery,
        cancel: &CancellationToken,
    ) -> Result<Vec<RawCandidate>> {
        let url = format!("{}/search", self.base_url);
        let body: SearchResponse = self
            .http
            .get_json(&url, &self.params(query), cancel)
            .await?;

        let candidates: Vec<RawCandidate> = body
            .results
            .into_iter()
            .map(|album| RawCandidate {
                provider_id: album.collection_id.map(|id| id.to_string()),
                title: album.collection_name,
                creator: album.artist_name,
                poster_url: album.artwork_url100.as_deref().map(upscale_artwork),
                year: parse_year(album.release_date.as_deref()),
                ..RawCandidate::default()
            })
            .collect();

        debug!(
            term = query.primary_term(),
            field = %query.field(),
            count = candidates.len(),
            "iTunes search"
        );
        Ok(candidates)
    }
}
