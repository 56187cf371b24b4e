//! Graph-break registry: data model, fetcher and fuzzy search.
//!
//! The registry is an externally published JSON document mapping each
//! GBID to its entry history. This crate only reads it.

pub mod fetch;
pub mod model;
pub mod search;

pub use fetch::{
    fetch_registry, ConfigError, FetchError, RegistryClient, RegistryConfig, DEFAULT_REGISTRY_URL,
    DEFAULT_TTL_SECS,
};
pub use model::{normalize_id, slug, FlatRecord, Registry, RegistryEntry};
pub use search::{search, FuzzyMatcher, SearchHit, SearchIndex, DEFAULT_THRESHOLD};
