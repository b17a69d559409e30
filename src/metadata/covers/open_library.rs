//! Open Library cover sources for books.
//!
//! [`OpenLibraryIsbnSource`] keys on the ISBN reported by the primary book
//! catalog; [`OpenLibrarySearchSource`] falls back to a title and author
//! search and builds the cover URL from the matched cover id.

use std::collections::HashMap;

use async_trait::async_trait;
use mediahint_common::Result;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::config::{LookupConfig, ProviderEndpoint};
use crate::metadata::http::HttpClient;
use crate::metadata::provider::{CoverRequest, CoverSource};

const OPEN_LIBRARY_BASE_URL: &str = "https://openlibrary.org";
const OPEN_LIBRARY_COVERS_URL: &str = "https://covers.openlibrary.org";

#[derive(Debug, Deserialize)]
struct BookData {
    cover: Option<CoverSizes>,
}

#[derive(Debug, Deserialize)]
struct CoverSizes {
    large: Option<String>,
    medium: Option<String>,
    small: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    docs: Vec<SearchDoc>,
}

#[derive(Debug, Deserialize)]
struct SearchDoc {
    cover_i: Option<i64>,
}

/// Cover lookup by ISBN via the Books API.
pub struct OpenLibraryIsbnSource {
    http: HttpClient,
    base_url: String,
}

impl OpenLibraryIsbnSource {
    pub fn new(lookup: &LookupConfig, endpoint: &ProviderEndpoint) -> Self {
        Self {
            http: HttpClient::new("open_library", lookup, endpoint),
            base_url: endpoint.base_url_or(OPEN_LIBRARY_BASE_URL),
        }
    }
}

#[async_trait]
impl CoverSource for OpenLibraryIsbnSource {
    fn name(&self) -> &'static str {
        "open_library_isbn"
    }

    async fn find_cover(
        &self,
        request: &CoverRequest<'_>,
        cancel: &CancellationToken,
    ) -> Result<Option<String>> {
        let Some(isbn) = request.isbn.filter(|i| !i.trim().is_empty()) else {
            return Ok(None);
        };

        let bibkey = format!("ISBN:{}", isbn.trim());
        let params = [
            ("bibkeys", bibkey.clone()),
            ("format", "json".to_string()),
            ("jscmd", "data".to_string()),
        ];
        let url = format!("{}/api/books", self.base_url);
        let mut books: HashMap<String, BookData> = self.http.get_json(&url, &params, cancel).await?;

        Ok(books
            .remove(&bibkey)
            .and_then(|book| book.cover)
            .and_then(|c| c.large.or(c.medium).or(c.small))
            .filter(|url| !url.is_empty()))
    }
}

/// Cover lookup by title and author via the search API.
pub struct OpenLibrarySearchSource {
    http: HttpClient,
    base_url: String,
    covers_url: String,
}

impl OpenLibrarySearchSource {
    pub fn new(
        lookup: &LookupConfig,
        endpoint: &ProviderEndpoint,
        covers: &ProviderEndpoint,
    ) -> Self {
        Self {
            http: HttpClient::new("open_library", lookup, endpoint),
            base_url: endpoint.base_url_or(OPEN_LIBRARY_BASE_URL),
            covers_url: covers.base_url_or(OPEN_LIBRARY_COVERS_URL),
        }
    }
}

#[async_trait]
impl CoverSource for OpenLibrarySearchSource {
    fn name(&self) -> &'static str {
        "open_library_search"
    }

    async fn find_cover(
        &self,
        request: &CoverRequest<'_>,
        cancel: &CancellationToken,
    ) -> Result<Option<String>> {
        let mut params = vec![
            ("title", request.title.to_string()),
            ("limit", "1".to_string()),
            ("fields", "cover_i".to_string()),
        ];
        if !request.creator.trim().is_empty() {
            params.push(("author", request.creator.to_string()));
        }

        let url = format!("{}/search.json", self.base_url);
        let body: SearchResponse = self.http.get_json(&url, &params, cancel).await?;

        Ok(body
            .docs
            .into_iter()
            .find_map(|doc| doc.cover_i)
            .filter(|id| *id > 0)
            .map(|id| format!("{}/b/id/{}-L.jpg", self.covers_url, id)))
    }
}
