//! Upstream endpoint access.

pub mod fetcher;

pub use fetcher::{Fetch, FetchError, HttpFetcher};
