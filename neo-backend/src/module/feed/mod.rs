//! Near-Earth object feed: validate a date window, fetch the provider feed,
//! flatten it into summaries, rank them and cache the ranked list.

pub mod types;
pub mod error;
pub mod api_client;
pub mod transform;
pub mod rank;
pub mod cache;
pub mod service;

#[cfg(test)]
pub(crate) mod test_support;

// Commonly used re-exports
pub use types::DateRange;
pub use error::{NeoError, UpstreamError, ValidationError};
pub use api_client::{FeedSource, NasaFeedClient};
pub use cache::{MemoryCache, ResultCache};
pub use service::{FeedQuery, NeoService, QueryOutcome, ResultSource};
