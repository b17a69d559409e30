//! AniList anime catalog adapter.
//!
//! Both fields are answered by a single GraphQL request: a media search in
//! title mode, a studio search in creator mode.

use async_trait::async_trait;
use mediahint_common::{Category, Error, ProviderQuery, Result, SearchField};
use serde::Deserialize;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::{LookupConfig, ProviderEndpoint};
use crate::metadata::http::HttpClient;
use crate::metadata::provider::{CatalogAdapter, RawCandidate};

const ANILIST_ENDPOINT: &str = "https://graphql.anilist.co";

const MEDIA_QUERY: &str = r#"
query ($search: String, $perPage: Int) {
  Page(perPage: $perPage) {
    media(search: $search, type: ANIME) {
      title { english romaji native }
      coverImage { extraLarge large }
      startDate { year }
      studios(isMain: true) { nodes { name } }
    }
  }
}
"#;

const STUDIO_QUERY: &str = r#"
query ($search: String, $perPage: Int) {
  Page(perPage: $perPage) {
    studios(search: $search) {
      name
      media(sort: POPULARITY_DESC, perPage: 10) {
        nodes { title { english romaji native } }
      }
    }
  }
}
"#;

// ---------------------------------------------------------------------------
// AniList response types (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<Data>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct Data {
    #[serde(rename = "Page")]
    page: Option<Page>,
}

#[derive(Debug, Default, Deserialize)]
struct Page {
    #[serde(default)]
    media: Vec<Media>,
    #[serde(default)]
    studios: Vec<Studio>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Media {
    title: Option<MediaTitle>,
    cover_image: Option<CoverImage>,
    start_date: Option<FuzzyDate>,
    studios: Option<Connection<StudioName>>,
}

#[derive(Debug, Deserialize)]
struct MediaTitle {
    english: Option<String>,
    romaji: Option<String>,
    native: Option<String>,
}

impl MediaTitle {
    fn preferred(self) -> Option<String> {
        self.english.or(self.romaji).or(self.native)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CoverImage {
    extra_large: Option<String>,
    large: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FuzzyDate {
    year: Option<u16>,
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct Connection<T> {
    #[serde(default)]
    nodes: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct StudioName {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Studio {
    name: String,
    media: Option<Connection<TitleNode>>,
}

#[derive(Debug, Deserialize)]
struct TitleNode {
    title: Option<MediaTitle>,
}

// ---------------------------------------------------------------------------
// Adapter implementation
// ---------------------------------------------------------------------------

/// Anime adapter backed by the AniList GraphQL API.
pub struct AniListAdapter {
    http: HttpClient,
    endpoint: String,
    page_size: usize,
    enabled: bool,
}

impl AniListAdapter {
    pub fn new(lookup: &LookupConfig, endpoint: &ProviderEndpoint) -> Self {
        Self {
            http: HttpClient::new("anilist", lookup, endpoint),
            endpoint: endpoint.base_url_or(ANILIST_ENDPOINT),
            page_size: lookup.page_size,
            enabled: endpoint.enabled,
        }
    }

    async fn page(&self, query: &str, search: &str, cancel: &CancellationToken) -> Result<Page> {
        let body = json!({
            "query": query,
            "variables": { "search": search, "perPage": self.page_size }
        });

        let resp: GraphQlResponse = self.http.post_json(&self.endpoint, &body, cancel).await?;

        match (resp.data.and_then(|d| d.page), resp.errors) {
            (Some(page), _) => Ok(page),
            (None, Some(errors)) if !errors.is_empty() => Err(Error::decode(
                "anilist",
                errors
                    .into_iter()
                    .map(|e| e.message)
                    .collect::<Vec<_>>()
                    .join("; "),
            )),
            (None, _) => Ok(Page::default()),
        }
    }
}

fn media_to_candidate(media: Media) -> RawCandidate {
    let poster_url = media
        .cover_image
        .and_then(|c| c.extra_large.or(c.large));
    let creator = media
        .studios
        .and_then(|s| s.nodes.into_iter().next())
        .map(|s| s.name);

    RawCandidate {
        title: media.title.and_then(MediaTitle::preferred),
        creator,
        poster_url,
        year: media.start_date.and_then(|d| d.year),
        ..RawCandidate::default()
    }
}

fn studio_to_candidate(studio: Studio) -> RawCandidate {
    let related_works = studio
        .media
        .map(|m| m.nodes)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|node| node.title.and_then(MediaTitle::preferred))
        .collect();

    RawCandidate {
        creator: Some(studio.name),
        related_works,
        ..RawCandidate::default()
    }
}

#[async_trait]
impl CatalogAdapter for AniListAdapter {
    fn name(&self) -> &'static str {
        "anilist"
    }

    fn category(&self) -> Category {
        Category::Anime
    }

    fn is_available(&self) -> bool {
        self.enabled
    }

    async fn search(
        &self,
        query: &ProviderQuery,
        cancel: &CancellationToken,
    ) -> Result<Vec<RawCandidate>> {
        let candidates: Vec<RawCandidate> = match query.field() {
            SearchField::Title => self
                .page(MEDIA_QUERY, query.primary_term(), cancel)
                .await?
                .media
                .into_iter()
                .map(media_to_candidate)
                .collect(),
            SearchField::Creator => self
                .page(STUDIO_QUERY, query.primary_term(), cancel)
                .await?
                .studios
                .into_iter()
                .map(studio_to_candidate)
                .collect(),
        };

        debug!(
            term = query.primary_term(),
            field = %query.field(),
            count = candidates.len(),
            "AniList search"
        );
        Ok(candidates)
    }
}
