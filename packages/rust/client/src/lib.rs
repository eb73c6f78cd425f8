//! Search and fetch client for the Wikipedia APIs.
//!
//! [`WikiClient`] resolves free-text queries to articles, suggests titles,
//! and fetches page summaries and lead-section wikitext. All outbound calls go
//! through a shared [`RateLimiter`] and are retried on transient failures.

mod client;
mod payload;
pub mod rate_limit;
pub mod similarity;

pub use client::WikiClient;
pub use rate_limit::RateLimiter;
pub use similarity::similarity;
