//! Concrete catalog adapter implementations.
//!
//! Each submodule wraps a single external catalog and implements the
//! [`CatalogAdapter`](super::CatalogAdapter) trait for one category.

pub mod anilist;
pub mod google_books;
pub mod itunes;
pub mod omdb;

pub use anilist::AniListAdapter;
pub use google_books::GoogleBooksAdapter;
pub use itunes::ItunesAdapter;
pub use omdb::OmdbAdapter;
