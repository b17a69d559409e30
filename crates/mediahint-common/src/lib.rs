//! Mediahint-Common: Shared types and errors.
//!
//! This crate provides the vocabulary used across mediahint:
//!
//! - **Core Types**: [`Category`] and [`SearchField`], the closed sets that
//!   drive adapter and fallback-chain selection
//! - **Queries**: [`ProviderQuery`] and its monotonic [`QueryToken`]
//! - **Suggestions**: the normalized [`Suggestion`] record handed to callers
//! - **Error Handling**: the common [`Error`] type and [`Result`] alias
//!
//! # Examples
//!
//! ```
//! use mediahint_common::{Category, ProviderQuery, QueryToken, SearchField};
//!
//! let category: Category = "book".parse().unwrap();
//! let query = ProviderQuery::new(category, SearchField::Title, "dune", "herbert", QueryToken::FIRST);
//!
//! assert_eq!(query.secondary_term(), Some("herbert"));
//! ```

pub mod error;
pub mod query;
pub mod suggestion;
pub mod types;

pub use error::{Error, Result};
pub use query::{ProviderQuery, QueryToken};
pub use suggestion::Suggestion;
pub use types::{Category, SearchField};
