//! Media suggestion lookup against external catalogs.
//!
//! A partially typed title or creator, scoped to a [`Category`], is resolved
//! into a short list of [`Suggestion`]s with title, creator, year and cover
//! art, reconciled from heterogeneous provider APIs.
//!
//! # Module layout
//!
//! - [`http`] -- Shared JSON client with timeouts, rate limiting and cancellation.
//! - [`provider`] -- Adapter and cover-source traits plus the raw candidate shape.
//! - [`providers`] -- Primary catalog adapters (OMDb, AniList, iTunes, Google Books).
//! - [`covers`] -- Cover-art fallback sources and the chain resolver.
//! - [`normalize`] -- Candidate-to-suggestion mapping, creator grouping and filtering.
//! - [`registry`] -- `(Category, SearchField)` dispatch table.
//! - [`engine`] -- The end-to-end resolution pipeline.
//! - [`coordinator`] -- Debounced, token-checked request coordination.
//!
//! [`Category`]: mediahint_common::Category
//! [`Suggestion`]: mediahint_common::Suggestion

pub mod coordinator;
pub mod covers;
pub mod engine;
pub mod http;
pub mod normalize;
pub mod provider;
pub mod providers;
pub mod registry;

pub use coordinator::{
    CoordinatorSettings, CoordinatorState, CoordinatorStats, Delivery, FormInput, LookupScreen,
    RequestCoordinator,
};
pub use covers::{CoverArtResolver, CoverSources};
pub use engine::{Resolve, SuggestionEngine};
pub use provider::{CatalogAdapter, CoverRequest, CoverSource, RawCandidate};
pub use registry::AdapterRegistry;
