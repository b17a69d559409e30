//! MusicBrainz release lookup followed by a Cover Art Archive fetch.
//!
//! The registry search resolves title and artist to a release MBID; the
//! archive is then asked for that release's front image. MusicBrainz allows
//! one anonymous request per second, which the configured rate limit honours.

use async_trait::async_trait;
use mediahint_common::Result;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::{LookupConfig, ProviderEndpoint};
use crate::metadata::http::HttpClient;
use crate::metadata::provider::{CoverRequest, CoverSource};

const MUSICBRAINZ_BASE_URL: &str = "https://musicbrainz.org/ws/2";
const COVER_ART_ARCHIVE_BASE_URL: &str = "https://coverartarchive.org";

#[derive(Debug, Deserialize)]
struct ReleaseSearch {
    #[serde(default)]
    releases: Vec<Release>,
}

#[derive(Debug, Deserialize)]
struct Release {
    id: String,
}

#[derive(Debug, Deserialize)]
struct CoverListing {
    #[serde(default)]
    images: Vec<CoverImage>,
}

#[derive(Debug, Deserialize)]
struct CoverImage {
    #[serde(default)]
    front: bool,
    image: Option<String>,
    thumbnails: Option<Thumbnails>,
}

#[derive(Debug, Deserialize)]
struct Thumbnails {
    large: Option<String>,
    #[serde(rename = "500")]
    px500: Option<String>,
}

/// Lucene phrase for a MusicBrainz field query. Quotes and backslashes are
/// dropped rather than escaped.
fn phrase(field: &str, value: &str) -> String {
    let cleaned: String = value.chars().filter(|c| !matches!(c, '"' | '\\')).collect();
    format!("{field}:\"{}\"", cleaned.trim())
}

fn release_query(request: &CoverRequest<'_>) -> String {
    let mut query = phrase("release", request.title);
    if !request.creator.trim().is_empty() {
        query.push_str(" AND ");
        query.push_str(&phrase("artist", request.creator));
    }
    query
}

fn front_image(listing: CoverListing) -> Option<String> {
    let image = listing.images.into_iter().find(|img| img.front)?;
    image
        .thumbnails
        .and_then(|t| t.large.or(t.px500))
        .or(image.image)
        .filter(|url| !url.is_empty())
}

pub struct MusicBrainzCoverSource {
    registry: HttpClient,
    archive: HttpClient,
    registry_url: String,
    archive_url: String,
}

impl MusicBrainzCoverSource {
    pub fn new(
        lookup: &LookupConfig,
        registry: &ProviderEndpoint,
        archive: &ProviderEndpoint,
    ) -> Self {
        Self {
            registry: HttpClient::new("musicbrainz", lookup, registry),
            archive: HttpClient::new("cover_art_archive", lookup, archive),
            registry_url: registry.base_url_or(MUSICBRAINZ_BASE_URL),
            archive_url: archive.base_url_or(COVER_ART_ARCHIVE_BASE_URL),
        }
    }

    async fn release_id(
        &self,
        request: &CoverRequest<'_>,
        cancel: &CancellationToken,
    ) -> Result<Option<String>> {
        let params = [
            ("query", release_query(request)),
            ("fmt", "json".to_string()),
            ("limit", "1".to_string()),
        ];
        let url = format!("{}/release/", self.registry_url);
        let body: ReleaseSearch = self.registry.get_json(&url, &params, cancel).await?;
        Ok(body.releases.into_iter().next().map(|r| r.id))
    }
}

#[async_trait]
impl CoverSource for MusicBrainzCoverSource {
    fn name(&self) -> &'static str {
        "musicbrainz"
    }

    async fn find_cover(
        &self,
        request: &CoverRequest<'_>,
        cancel: &CancellationToken,
    ) -> Result<Option<String>> {
        let Some(mbid) = self.release_id(request, cancel).await? else {
            return Ok(None);
        };
        debug!(title = request.title, mbid = %mbid, "MusicBrainz release matched");

        let url = format!("{}/release/{}", self.archive_url, mbid);
        let listing: CoverListing = self.archive.get_json(&url, &[], cancel).await?;
        Ok(front_image(listing))
    }
}
