//! Shared types, error model, and configuration for Chronicle.
//!
//! This crate is the foundation depended on by all other Chronicle crates.
//! It provides:
//! - [`ChronicleError`], the unified error type
//! - Domain types ([`StructuredDate`], [`Tag`], [`CanonicalReference`], [`PageBody`])
//! - Configuration ([`AppConfig`], [`ClientConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    ApiConfig, AppConfig, ClientConfig, MAX_BACKOFF_MS, PipelineConfig, QualityWeights,
    RateLimitConfig, RetryConfig, SearchConfig, config_dir, config_file_path, init_config,
    init_config_at, load_config, load_config_from, validate_config,
};
pub use error::{ChronicleError, Result};
pub use types::{
    CanonicalReference, Coordinates, DatePrecision, Era, MONTH_NAMES, PageBody, RawFieldMap,
    StructuredDate, Tag,
};
