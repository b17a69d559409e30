//! Google Books volume search adapter.
//!
//! A typed author turns the title search into explicit `intitle:`/`inauthor:`
//! qualifiers instead of a free-text blend. Creator mode searches by
//! `inauthor:` and the engine groups the returned volumes by author.

use async_trait::async_trait;
use mediahint_common::{Category, ProviderQuery, Result, SearchField};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::{LookupConfig, ProviderEndpoint};
use crate::metadata::http::{parse_year, HttpClient};
use crate::metadata::provider::{CatalogAdapter, RawCandidate};

const GOOGLE_BOOKS_BASE_URL: &str = "https://www.googleapis.com/books/v1";

#[derive(Debug, Deserialize)]
struct VolumesResponse {
    #[serde(default)]
    items: Vec<Volume>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Volume {
    id: Option<String>,
    volume_info: Option<VolumeInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VolumeInfo {
    title: Option<String>,
    #[serde(default)]
    authors: Vec<String>,
    published_date: Option<String>,
    image_links: Option<ImageLinks>,
    #[serde(default)]
    industry_identifiers: Vec<IndustryIdentifier>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageLinks {
    thumbnail: Option<String>,
    small_thumbnail: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IndustryIdentifier {
    #[serde(rename = "type")]
    kind: String,
    identifier: String,
}

/// ISBN-13 when present, else ISBN-10.
fn pick_isbn(identifiers: &[IndustryIdentifier]) -> Option<String> {
    ["ISBN_13", "ISBN_10"].iter().find_map(|wanted| {
        identifiers
            .iter()
            .find(|id| id.kind == *wanted)
            .map(|id| id.identifier.clone())
    })
}

/// Build the `q` parameter for `query`.
///
/// Qualified terms are quoted so every word stays inside its qualifier.
fn volume_query(query: &ProviderQuery) -> String {
    match (query.field(), query.secondary_term()) {
        (SearchField::Title, Some(author)) => format!(
            "intitle:{} inauthor:{}",
            quoted(query.primary_term()),
            quoted(author)
        ),
        (SearchField::Title, None) => query.primary_term().to_string(),
        (SearchField::Creator, _) => format!("inauthor:{}", quoted(query.primary_term())),
    }
}

fn quoted(term: &str) -> String {
    format!("\"{}\"", term.replace('"', ""))
}

fn volume_to_candidate(volume: Volume) -> Option<RawCandidate> {
    let info = volume.volume_info?;
    let poster_url = info
        .image_links
        .and_then(|links| links.thumbnail.or(links.small_thumbnail))
        .map(|url| url.replacen("http://", "https://", 1));

    Some(RawCandidate {
        provider_id: volume.id,
        creator: (!info.authors.is_empty()).then(|| info.authors.join(", ")),
        creators: info.authors,
        title: info.title,
        poster_url,
        year: parse_year(info.published_date.as_deref()),
        isbn: pick_isbn(&info.industry_identifiers),
        related_works: Vec::new(),
    })
}

/// Book adapter backed by the Google Books volumes endpoint.
pub struct GoogleBooksAdapter {
    http: HttpClient,
    base_url: String,
    api_key: Option<String>,
    page_size: usize,
    enabled: bool,
}

impl GoogleBooksAdapter {
    pub fn new(lookup: &LookupConfig, endpoint: &ProviderEndpoint) -> Self {
        Self {
            http: HttpClient::new("google_books", lookup, endpoint),
            base_url: endpoint.base_url_or(GOOGLE_BOOKS_BASE_URL),
            api_key: endpoint.api_key().map(str::to_string),
            page_size: lookup.page_size.clamp(1, 40),
            enabled: endpoint.enabled,
        }
    }
}

#[async_trait]
impl CatalogAdapter for GoogleBooksAdapter {
    fn name(&self) -> &'static str {
        "google_books"
    }

    fn category(&self) -> Category {
        Category::Book
    }

    fn is_available(&self) -> bool {
        self.enabled
    }

    async fn search(
        &self,
        query: &ProviderQuery,
        cancel: &CancellationToken,
    ) -> Result<Vec<RawCandidate>> {
        let mut params = vec![
            ("q", volume_query(query)),
            ("printType", "books".to_string()),
            ("maxResults", self.page_size.to_string()),
        ];
        if let Some(key) = &self.api_key {
            params.push(("key", key.clone()));
        }

        let url = format!("{}/volumes", self.base_url);
        let body: VolumesResponse = self.http.get_json(&url, &params, cancel).await?;

        let candidates: Vec<RawCandidate> = body
            .items
            .into_iter()
            .filter_map(volume_to_candidate)
            .collect();

        debug!(
            term = query.primary_term(),
            field = %query.field(),
            count = candidates.len(),
            "Google Books search"
        );
        Ok(candidates)
    }
}
