//! Query descriptors issued to provider adapters.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Category, SearchField};

/// Strictly increasing identifier assigned to each issued query.
///
/// Tokens are only comparable within the coordinator that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QueryToken(u64);

impl QueryToken {
    /// The token of the first query a coordinator issues.
    pub const FIRST: QueryToken = QueryToken(1);

    /// Wrap a raw counter value.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// The raw counter value.
    pub fn value(&self) -> u64 {
        self.0
    }

    /// The token that follows this one.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for QueryToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One issued lookup. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderQuery {
    category: Category,
    field: SearchField,
    primary_term: String,
    secondary_term: Option<String>,
    token: QueryToken,
}

impl ProviderQuery {
    /// Build a query. Surrounding whitespace is stripped from both terms and
    /// a blank secondary term is recorded as absent.
    pub fn new(
        category: Category,
        field: SearchField,
        primary_term: &str,
        secondary_term: &str,
        token: QueryToken,
    ) -> Self {
        let secondary = secondary_term.trim();
        Self {
            category,
            field,
            primary_term: primary_term.trim().to_string(),
            secondary_term: (!secondary.is_empty()).then(|| secondary.to_string()),
            token,
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn field(&self) -> SearchField {
        self.field
    }

    pub fn primary_term(&self) -> &str {
        &self.primary_term
    }

    pub fn secondary_term(&self) -> Option<&str> {
        self.secondary_term.as_deref()
    }

    pub fn token(&self) -> QueryToken {
        self.token
    }

    /// `true` when there is nothing to search for.
    pub fn is_empty(&self) -> bool {
        self.primary_term.is_empty()
    }
}
