//! Jikan (MyAnimeList mirror) image source for anime.

use async_trait::async_trait;
use mediahint_common::Result;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::config::{LookupConfig, ProviderEndpoint};
use crate::metadata::http::HttpClient;
use crate::metadata::provider::{CoverRequest, CoverSource};

const JIKAN_BASE_URL: &str = "https://api.jikan.moe/v4";

#[derive(Debug, Deserialize)]
struct AnimeSearch {
    #[serde(default)]
    data: Vec<Anime>,
}

#[derive(Debug, Deserialize)]
struct Anime {
    images: Option<Images>,
}

#[derive(Debug, Deserialize)]
struct Images {
    jpg: Option<ImageSet>,
    webp: Option<ImageSet>,
}

#[derive(Debug, Deserialize)]
struct ImageSet {
    large_image_url: Option<String>,
    image_url: Option<String>,
}

impl Images {
    fn best(self) -> Option<String> {
        self.jpg
            .and_then(ImageSet::best)
            .or_else(|| self.webp.and_then(ImageSet::best))
    }
}

impl ImageSet {
    /// Largest non-blank url in the set.
    fn best(self) -> Option<String> {
        [self.large_image_url, self.image_url]
            .into_iter()
            .flatten()
            .find(|url| !url.trim().is_empty())
    }
}

pub struct JikanImageSource {
    http: HttpClient,
    base_url: String,
}

impl JikanImageSource {
    pub fn new(lookup: &LookupConfig, endpoint: &ProviderEndpoint) -> Self {
        Self {
            http: HttpClient::new("jikan", lookup, endpoint),
            base_url: endpoint.base_url_or(JIKAN_BASE_URL),
        }
    }
}

#[async_trait]
impl CoverSource for JikanImageSource {
    fn name(&self) -> &'static str {
        "jikan"
    }

    async fn find_cover(
        &self,
        request: &CoverRequest<'_>,
        cancel: &CancellationToken,
    ) -> Result<Option<String>> {
        let params = [("q", request.title.to_string()), ("limit", "1".to_string())];
        let url = format!("{}/anime", self.base_url);
        let body: AnimeSearch = self.http.get_json(&url, &params, cancel).await?;

        Ok(body
            .data
            .into_iter()
            .next()
            .and_then(|anime| anime.images)
            .and_then(Images::best))
    }
}
