//! TMDB (The Movie Database) poster source.
//!
//! Searches `/search/movie` by title and returns the poster of the
//! best-scoring result, scored on title similarity and year proximity.

use async_trait::async_trait;
use mediahint_common::{Error, Result};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::config::{LookupConfig, ProviderEndpoint};
use crate::metadata::http::{parse_year, HttpClient};
use crate::metadata::provider::{CoverRequest, CoverSource};

const TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";
const TMDB_IMAGE_BASE: &str = "https://image.tmdb.org/t/p/w500";

#[derive(Debug, Deserialize)]
struct TmdbSearchResponse {
    #[serde(default)]
    results: Vec<TmdbMovieSearchResult>,
}

#[derive(Debug, Deserialize)]
struct TmdbMovieSearchResult {
    title: Option<String>,
    release_date: Option<String>,
    poster_path: Option<String>,
}

/// Poster fallback backed by the TMDB v3 search API.
pub struct TmdbPosterSource {
    http: HttpClient,
    base_url: String,
    api_key: Option<String>,
    language: String,
}

impl TmdbPosterSource {
    pub fn new(lookup: &LookupConfig, endpoint: &ProviderEndpoint) -> Self {
        Self {
            http: HttpClient::new("tmdb", lookup, endpoint),
            base_url: endpoint.base_url_or(TMDB_BASE_URL),
            api_key: endpoint.api_key().map(str::to_string),
            language: endpoint
                .language
                .clone()
                .unwrap_or_else(|| "en-US".to_string()),
        }
    }

    /// Confidence that `result_title`/`result_year` is the film asked for.
    fn confidence(
        query_title: &str,
        result_title: &str,
        query_year: Option<u16>,
        result_year: Option<u16>,
    ) -> f64 {
        let base = if query_title == result_title {
            0.5
        } else if query_title.eq_ignore_ascii_case(result_title) {
            0.4
        } else if result_title
            .to_ascii_lowercase()
            .contains(&query_title.to_ascii_lowercase())
        {
            0.2
        } else {
            0.1
        };

        let year_bonus = match (query_year, result_year) {
            (Some(q), Some(r)) if q == r => 0.3,
            (Some(q), Some(r)) if q.abs_diff(r) <= 1 => 0.15,
            _ => 0.0,
        };

        base + year_bonus
    }
}

/// Convert a TMDB image path fragment to a full URL.
fn image_url(path: &str) -> String {
    format!("{TMDB_IMAGE_BASE}{path}")
}

#[async_trait]
impl CoverSource for TmdbPosterSource {
    fn name(&self) -> &'static str {
        "tmdb"
    }

    async fn find_cover(
        &self,
        request: &CoverRequest<'_>,
        cancel: &CancellationToken,
    ) -> Result<Option<String>> {
        let api_key = self.api_key.as_deref().ok_or(Error::NotConfigured("tmdb"))?;

        let mut params = vec![
            ("api_key", api_key.to_string()),
            ("language", self.language.clone()),
            ("query", request.title.to_string()),
        ];
        if let Some(year) = request.year {
            params.push(("year", year.to_string()));
        }

        let url = format!("{}/search/movie", self.base_url);
        let body: TmdbSearchResponse = self.http.get_json(&url, &params, cancel).await?;

        let best = body
            .results
            .into_iter()
            .filter_map(|r| {
                let path = r.poster_path.filter(|p| !p.is_empty())?;
                let score = Self::confidence(
                    request.title,
                    r.title.as_deref().unwrap_or_default(),
                    request.year,
                    parse_year(r.release_date.as_deref()),
                );
                Some((score, path))
            })
            .max_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        Ok(best.map(|(_, path)| image_url(&path)))
    }
}
