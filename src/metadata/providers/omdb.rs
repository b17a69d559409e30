//! OMDb film catalog adapter.
//!
//! The search endpoint (`?s=`) returns titles, years and posters but no
//! director, so every candidate gets a detail call (`?i=`) that the engine
//! fans out concurrently. Search pages hold ten results; pages are fetched
//! until the per-field candidate limit is reached.

use async_trait::async_trait;
use mediahint_common::{Category, Error, ProviderQuery, Result, SearchField};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::{LookupConfig, ProviderEndpoint};
use crate::metadata::http::{parse_year, HttpClient};
use crate::metadata::normalize::split_creators;
use crate::metadata::provider::{CatalogAdapter, RawCandidate};

const OMDB_BASE_URL: &str = "https://www.omdbapi.com";
const OMDB_PAGE_SIZE: usize = 10;
const NOT_FOUND: &str = "Movie not found!";

// ---------------------------------------------------------------------------
// OMDb API response types (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct OmdbSearchResponse {
    #[serde(rename = "Search", default)]
    search: Vec<OmdbSearchItem>,
    #[serde(rename = "totalResults")]
    total_results: Option<String>,
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Error")]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OmdbSearchItem {
    #[serde(rename = "Title")]
    title: Option<String>,
    #[serde(rename = "Year")]
    year: Option<String>,
    #[serde(rename = "imdbID")]
    imdb_id: Option<String>,
    #[serde(rename = "Poster")]
    poster: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OmdbDetail {
    #[serde(rename = "Year")]
    year: Option<String>,
    #[serde(rename = "Director")]
    director: Option<String>,
    #[serde(rename = "Poster")]
    poster: Option<String>,
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Error")]
    error: Option<String>,
}

/// OMDb returns the literal `"N/A"` for absent fields.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty() && v != "N/A")
}

// ---------------------------------------------------------------------------
// Adapter implementation
// ---------------------------------------------------------------------------

/// Film adapter backed by the OMDb search and detail endpoints.
pub struct OmdbAdapter {
    http: HttpClient,
    base_url: String,
    api_key: Option<String>,
    title_detail_limit: usize,
    creator_detail_limit: usize,
}

impl OmdbAdapter {
    pub fn new(lookup: &LookupConfig, endpoint: &ProviderEndpoint) -> Self {
        Self {
            http: HttpClient::new("omdb", lookup, endpoint),
            base_url: endpoint.base_url_or(OMDB_BASE_URL),
            api_key: endpoint.api_key().map(str::to_string),
            title_detail_limit: lookup.film_title_detail_limit,
            creator_detail_limit: lookup.film_creator_detail_limit,
        }
    }

    fn limit_for(&self, field: SearchField) -> usize {
        match field {
            SearchField::Title => self.title_detail_limit,
            SearchField::Creator => self.creator_detail_limit,
        }
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or(Error::NotConfigured("omdb"))
    }

    async fn search_page(
        &self,
        term: &str,
        page: usize,
        cancel: &CancellationToken,
    ) -> Result<OmdbSearchResponse> {
        let params = [
            ("apikey", self.api_key()?.to_string()),
            ("s", term.to_string()),
            ("type", "movie".to_string()),
            ("page", page.to_string()),
        ];
        self.http
            .get_json(&format!("{}/", self.base_url), &params, cancel)
            .await
    }
}

#[async_trait]
impl CatalogAdapter for OmdbAdapter {
    fn name(&self) -> &'static str {
        "omdb"
    }

    fn category(&self) -> Category {
        Category::Film
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    async fn search(
        &self,
        query: &ProviderQuery,
        cancel: &CancellationToken,
    ) -> Result<Vec<RawCandidate>> {
        let limit = self.limit_for(query.field());
        let mut candidates: Vec<RawCandidate> = Vec::new();
        let mut page = 1;

        while candidates.len() < limit {
            let body = self.search_page(query.primary_term(), page, cancel).await?;

            if body.response != "True" {
                return match body.error.as_deref() {
                    None | Some(NOT_FOUND) => Ok(candidates),
                    Some(other) => Err(Error::decode("omdb", other.to_string())),
                };
            }
            if body.search.is_empty() {
                break;
            }

            candidates.extend(body.search.into_iter().map(|item| RawCandidate {
                provider_id: item.imdb_id,
                title: item.title,
                year: parse_year(item.year.as_deref()),
                poster_url: present(item.poster),
                ..RawCandidate::default()
            }));

            let total = body
                .total_results
                .as_deref()
                .and_then(|t| t.parse::<usize>().ok())
                .unwrap_or(0);
            if page * OMDB_PAGE_SIZE >= total {
                break;
            }
            page += 1;
        }

        candidates.truncate(limit);
        debug!(
            term = query.primary_term(),
            count = candidates.len(),
            pages = page,
            "OMDb search"
        );
        Ok(candidates)
    }

    fn detail_limit(&self, field: SearchField) -> Option<usize> {
        Some(self.limit_for(field))
    }

    async fn detail(
        &self,
        mut candidate: RawCandidate,
        cancel: &CancellationToken,
    ) -> Result<RawCandidate> {
        let Some(id) = candidate.provider_id.clone() else {
            return Ok(candidate);
        };

        let params = [("apikey", self.api_key()?.to_string()), ("i", id)];
        let detail: OmdbDetail = self
            .http
            .get_json(&format!("{}/", self.base_url), &params, cancel)
            .await?;

        if detail.response != "True" {
            return Err(Error::decode(
                "omdb",
                detail.error.unwrap_or_else(|| "detail lookup failed".into()),
            ));
        }

        if let Some(director) = present(detail.director) {
            candidate.creators = split_creators(&director);
            candidate.creator = Some(director);
        }
        if candidate.poster_url.is_none() {
            candidate.poster_url = present(detail.poster);
        }
        if candidate.year.is_none() {
            candidate.year = parse_year(detail.year.as_deref());
        }

        Ok(candidate)
    }
}
