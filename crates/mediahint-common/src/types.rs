//! Core type definitions for lookup categories and fields.
//!
//! Both enums are closed sets and are serialized in lowercase (snake case for
//! multi-word names) so they can be used directly as config-file keys.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Media category a lookup is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Feature films.
    Film,
    /// Anime series and films.
    Anime,
    /// Albums and tracks.
    Music,
    /// Books.
    Book,
}

impl Category {
    /// Every category, in declaration order.
    pub const ALL: [Category; 4] = [Self::Film, Self::Anime, Self::Music, Self::Book];

    /// Lowercase name used in config files and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Film => "film",
            Self::Anime => "anime",
            Self::Music => "music",
            Self::Book => "book",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "film" | "movie" => Ok(Self::Film),
            "anime" => Ok(Self::Anime),
            "music" => Ok(Self::Music),
            "book" => Ok(Self::Book),
            other => Err(Error::invalid_input(format!("unknown category '{other}'"))),
        }
    }
}

/// Which of the two user-entered values is the primary query term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchField {
    /// The work's title is being typed.
    Title,
    /// The creator (director, studio, artist, author) is being typed.
    Creator,
}

impl SearchField {
    /// The field whose value acts as the secondary filter term.
    pub fn other(&self) -> Self {
        match self {
            Self::Title => Self::Creator,
            Self::Creator => Self::Title,
        }
    }
}

impl fmt::Display for SearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Title => write!(f, "title"),
            Self::Creator => write!(f, "creator"),
        }
    }
}

impl FromStr for SearchField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "title" => Ok(Self::Title),
            "creator" => Ok(Self::Creator),
            other => Err(Error::invalid_input(format!("unknown search field '{other}'"))),
        }
    }
}
