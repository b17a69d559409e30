//! The normalized candidate record returned to callers.

use serde::{Deserialize, Serialize};

/// A normalized candidate metadata record.
///
/// Title-mode suggestions describe one work; creator-mode suggestions describe
/// one creator and list their works in `related_works`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Canonical title. Absent for creator-mode suggestions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Director, studio, artist or author, as the provider spells it.
    pub creator: String,
    /// Cover art URL, if the provider or a fallback source supplied one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    /// Release or first-air year.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
    /// Works attributed to the creator, in provider order. Creator mode only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_works: Vec<String>,
    /// ISBN reported by the primary book provider, used to key cover lookups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
}

impl Suggestion {
    /// A title-mode suggestion.
    pub fn work(title: impl Into<String>, creator: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            creator: creator.into(),
            ..Self::default()
        }
    }

    /// A creator-mode suggestion carrying the creator's works.
    pub fn creator(creator: impl Into<String>, related_works: Vec<String>) -> Self {
        Self {
            creator: creator.into(),
            related_works,
            ..Self::default()
        }
    }

    /// `true` when no usable cover URL is present.
    pub fn is_missing_cover(&self) -> bool {
        self.poster_url
            .as_deref()
            .map_or(true, |url| url.trim().is_empty())
    }
}
