//! Adapter dispatch table keyed by `(Category, SearchField)`.
//!
//! The [`AdapterRegistry`] replaces per-call-site branching on category and
//! field: the engine asks it for the adapter serving a query and gets either
//! an available adapter or nothing.

use std::collections::HashMap;
use std::sync::Arc;

use mediahint_common::{Category, SearchField};

use crate::config::Config;

use super::provider::CatalogAdapter;
use super::providers::{AniListAdapter, GoogleBooksAdapter, ItunesAdapter, OmdbAdapter};

const FIELDS: [SearchField; 2] = [SearchField::Title, SearchField::Creator];

/// Dispatch table from `(Category, SearchField)` to a [`CatalogAdapter`].
///
/// # Examples
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use mediahint::metadata::registry::AdapterRegistry;
///
/// let mut registry = AdapterRegistry::new();
/// registry.register(Arc::new(my_adapter));
///
/// let adapter = registry.get(Category::Book, SearchField::Title);
/// ```
#[derive(Default, Clone)]
pub struct AdapterRegistry {
    adapters: HashMap<(Category, SearchField), Arc<dyn CatalogAdapter>>,
}

impl AdapterRegistry {
    /// Create an empty registry with no adapters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in adapter for each category.
    pub fn from_config(config: &Config) -> Self {
        let lookup = &config.lookup;
        let p = &config.providers;
        let mut registry = Self::new();

        registry.register(Arc::new(OmdbAdapter::new(lookup, &p.omdb)));
        registry.register(Arc::new(AniListAdapter::new(lookup, &p.anilist)));
        registry.register(Arc::new(ItunesAdapter::new(lookup, &p.itunes)));
        registry.register(Arc::new(GoogleBooksAdapter::new(lookup, &p.google_books)));

        registry
    }

    /// Register `adapter` for both fields of its category, replacing any
    /// adapter already registered there.
    pub fn register(&mut self, adapter: Arc<dyn CatalogAdapter>) {
        for field in FIELDS {
            self.register_for(field, adapter.clone());
        }
    }

    /// Register `adapter` for one field of its category only.
    pub fn register_for(&mut self, field: SearchField, adapter: Arc<dyn CatalogAdapter>) {
        self.adapters.insert((adapter.category(), field), adapter);
    }

    /// The available adapter serving `(category, field)`, if any.
    pub fn get(&self, category: Category, field: SearchField) -> Option<Arc<dyn CatalogAdapter>> {
        self.adapters
            .get(&(category, field))
            .filter(|a| a.is_available())
            .cloned()
    }

    /// Names of every registered adapter that is currently available,
    /// sorted and deduplicated.
    pub fn available(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self
            .adapters
            .values()
            .filter(|a| a.is_available())
            .map(|a| a.name())
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}
