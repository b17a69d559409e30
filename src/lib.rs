//! mediahint - Media suggestion lookup
//!
//! This library crate exposes the lookup engine for the binary and for
//! integration testing.

pub mod config;
pub mod metadata;
