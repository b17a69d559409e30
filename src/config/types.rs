use mediahint_common::Category;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub lookup: LookupConfig,

    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Call-site profiles keyed by name. Built-in profiles are filled in for
    /// any name the file does not define.
    #[serde(default = "builtin_profiles")]
    pub profiles: BTreeMap<String, LookupProfile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lookup: LookupConfig::default(),
            providers: ProvidersConfig::default(),
            profiles: builtin_profiles(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LookupConfig {
    /// Quiet period after the last edit before a query is issued.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Profile used when the caller does not name one.
    #[serde(default = "default_profile")]
    pub profile: String,

    /// Per-request timeout for every provider call.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Sent with every request; MusicBrainz rejects anonymous clients.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Film candidates that receive a detail fetch in title mode.
    #[serde(default = "default_film_title_detail_limit")]
    pub film_title_detail_limit: usize,

    /// Film candidates that receive a detail fetch in creator mode.
    #[serde(default = "default_film_creator_detail_limit")]
    pub film_creator_detail_limit: usize,

    /// Page size requested from catalogs that accept one.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_debounce_ms() -> u64 {
    200
}
fn default_profile() -> String {
    "create".to_string()
}
fn default_request_timeout() -> u64 {
    10
}
fn default_user_agent() -> String {
    format!("mediahint/{}", env!("CARGO_PKG_VERSION"))
}
fn default_film_title_detail_limit() -> usize {
    30
}
fn default_film_creator_detail_limit() -> usize {
    10
}
fn default_page_size() -> usize {
    10
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            profile: default_profile(),
            request_timeout_secs: default_request_timeout(),
            user_agent: default_user_agent(),
            film_title_detail_limit: default_film_title_detail_limit(),
            film_creator_detail_limit: default_film_creator_detail_limit(),
            page_size: default_page_size(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub omdb: ProviderEndpoint,

    #[serde(default)]
    pub anilist: ProviderEndpoint,

    #[serde(default)]
    pub itunes: ProviderEndpoint,

    #[serde(default)]
    pub google_books: ProviderEndpoint,

    #[serde(default)]
    pub tmdb: ProviderEndpoint,

    #[serde(default)]
    pub jikan: ProviderEndpoint,

    #[serde(default = "default_musicbrainz")]
    pub musicbrainz: ProviderEndpoint,

    #[serde(default)]
    pub cover_art_archive: ProviderEndpoint,

    #[serde(default)]
    pub open_library: ProviderEndpoint,

    #[serde(default)]
    pub open_library_covers: ProviderEndpoint,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            omdb: ProviderEndpoint::default(),
            anilist: ProviderEndpoint::default(),
            itunes: ProviderEndpoint::default(),
            google_books: ProviderEndpoint::default(),
            tmdb: ProviderEndpoint::default(),
            jikan: ProviderEndpoint::default(),
            musicbrainz: default_musicbrainz(),
            cover_art_archive: ProviderEndpoint::default(),
            open_library: ProviderEndpoint::default(),
            open_library_covers: ProviderEndpoint::default(),
        }
    }
}

fn default_musicbrainz() -> ProviderEndpoint {
    ProviderEndpoint {
        requests_per_second: Some(1),
        ..ProviderEndpoint::default()
    }
}

/// Connection settings for one external service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderEndpoint {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Overrides the service's public base URL.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Credential for services keyed by an API key query parameter.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Language tag for services that localise results (e.g. `"en-US"`).
    #[serde(default)]
    pub language: Option<String>,

    /// Client-side request ceiling; unlimited when absent.
    #[serde(default)]
    pub requests_per_second: Option<u32>,
}

fn default_enabled() -> bool {
    true
}

impl Default for ProviderEndpoint {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            base_url: None,
            api_key: None,
            language: None,
            requests_per_second: None,
        }
    }
}

impl ProviderEndpoint {
    /// Configured base URL without a trailing slash, or `default`.
    pub fn base_url_or(&self, default: &str) -> String {
        self.base_url
            .as_deref()
            .unwrap_or(default)
            .trim_end_matches('/')
            .to_string()
    }

    /// The API key, if one is set and non-blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }
}

/// Settings that distinguish one call site from another.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LookupProfile {
    /// Upper bound on suggestions delivered per query.
    pub max_results: usize,

    /// Ordered cover-art fallback chain per category. Missing categories have
    /// no fallback.
    #[serde(default)]
    pub fallbacks: BTreeMap<Category, Vec<CoverSourceKind>>,
}

impl LookupProfile {
    /// The fallback chain configured for `category`.
    pub fn chain(&self, category: Category) -> &[CoverSourceKind] {
        self.fallbacks
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Identifier of a secondary cover-art source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverSourceKind {
    /// Secondary movie database, keyed by title.
    Tmdb,
    /// Secondary anime database, keyed by title.
    Jikan,
    /// Music release registry, then the cover archive keyed by release id.
    Musicbrainz,
    /// Library covers service keyed by ISBN.
    OpenLibraryIsbn,
    /// Library covers service keyed by title and author.
    OpenLibrarySearch,
}

impl CoverSourceKind {
    /// The only category whose chain this source may appear in.
    pub fn category(&self) -> Category {
        match self {
            Self::Tmdb => Category::Film,
            Self::Jikan => Category::Anime,
            Self::Musicbrainz => Category::Music,
            Self::OpenLibraryIsbn | Self::OpenLibrarySearch => Category::Book,
        }
    }
}

impl fmt::Display for CoverSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tmdb => write!(f, "tmdb"),
            Self::Jikan => write!(f, "jikan"),
            Self::Musicbrainz => write!(f, "musicbrainz"),
            Self::OpenLibraryIsbn => write!(f, "open_library_isbn"),
            Self::OpenLibrarySearch => write!(f, "open_library_search"),
        }
    }
}

/// The create, edit and now-playing call sites.
pub fn builtin_profiles() -> BTreeMap<String, LookupProfile> {
    let create = BTreeMap::from([
        (Category::Anime, vec![CoverSourceKind::Jikan]),
        (Category::Music, vec![CoverSourceKind::Musicbrainz]),
        (
            Category::Book,
            vec![
                CoverSourceKind::OpenLibraryIsbn,
                CoverSourceKind::OpenLibrarySearch,
            ],
        ),
    ]);

    let mut edit = create.clone();
    edit.insert(Category::Film, vec![CoverSourceKind::Tmdb]);

    let now_playing = BTreeMap::from([
        (Category::Anime, vec![CoverSourceKind::Jikan]),
        (Category::Music, vec![CoverSourceKind::Musicbrainz]),
        (Category::Book, vec![CoverSourceKind::OpenLibraryIsbn]),
    ]);

    BTreeMap::from([
        (
            "create".to_string(),
            LookupProfile {
                max_results: 5,
                fallbacks: create,
            },
        ),
        (
            "edit".to_string(),
            LookupProfile {
                max_results: 5,
                fallbacks: edit,
            },
        ),
        (
            "now_playing".to_string(),
            LookupProfile {
                max_results: 3,
                fallbacks: now_playing,
            },
        ),
    ])
}
