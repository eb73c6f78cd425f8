//! Application configuration for Chronicle.
//!
//! User config lives at `~/.chronicle/chronicle.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ChronicleError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "chronicle.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".chronicle";

// ---------------------------------------------------------------------------
// Config structs (matching chronicle.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Encyclopedia endpoints and HTTP client settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Outbound call spacing.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Transient failure handling.
    #[serde(default)]
    pub retry: RetryConfig,

    /// Query resolution and suggestions.
    #[serde(default)]
    pub search: SearchConfig,

    /// Whole-pipeline settings.
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Quality score weights.
    #[serde(default)]
    pub quality: QualityWeights,
}

/// `[api]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// MediaWiki action API endpoint (opensearch, revisions).
    #[serde(default = "default_action_url")]
    pub action_url: String,

    /// REST v1 base URL (page summaries).
    #[serde(default = "default_rest_url")]
    pub rest_url: String,

    /// User-Agent sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            action_url: default_action_url(),
            rest_url: default_rest_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_action_url() -> String {
    "https://en.wikipedia.org/w/api.php".into()
}
fn default_rest_url() -> String {
    "https://en.wikipedia.org/api/rest_v1".into()
}
fn default_user_agent() -> String {
    concat!(
        "Chronicle/",
        env!("CARGO_PKG_VERSION"),
        " (historical figure lookup; educational)"
    )
    .into()
}
fn default_timeout_secs() -> u64 {
    10
}

/// `[rate_limit]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Minimum ms between any two outbound calls from this process.
    #[serde(default = "default_min_interval")]
    pub min_interval_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: default_min_interval(),
        }
    }
}

fn default_min_interval() -> u64 {
    100
}

/// `[retry]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts per call, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Linear backoff step: attempt `n` waits `n * backoff_ms` before retrying.
    #[serde(default = "default_backoff")]
    pub backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_ms: default_backoff(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}
fn default_backoff() -> u64 {
    250
}

/// Largest accepted `retry.backoff_ms`.
pub const MAX_BACKOFF_MS: u64 = 60_000;

/// `[search]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Minimum query/title similarity (0..=1) for a candidate to resolve.
    #[serde(default = "default_similarity_floor")]
    pub similarity_floor: f64,

    /// How many opensearch candidates to consider when resolving.
    #[serde(default = "default_candidate_limit")]
    pub candidate_limit: u32,

    /// Default number of suggestions returned by `suggest`.
    #[serde(default = "default_suggest_limit")]
    pub suggest_limit: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            similarity_floor: default_similarity_floor(),
            candidate_limit: default_candidate_limit(),
            suggest_limit: default_suggest_limit(),
        }
    }
}

fn default_similarity_floor() -> f64 {
    0.5
}
fn default_candidate_limit() -> u32 {
    5
}
fn default_suggest_limit() -> u32 {
    8
}

/// `[pipeline]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Upper bound on one query's end-to-end latency.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_request_timeout() -> u64 {
    30
}

/// `[quality]` section: weight of each field in the quality score.
///
/// The defaults sum to 1.0, so a complete and consistent record scores 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityWeights {
    pub name: f64,
    pub summary: f64,
    pub birth_date: f64,
    pub death_date: f64,
    pub birth_place: f64,
    pub death_place: f64,
    pub occupations: f64,
    pub nationality: f64,
    pub categories: f64,
    /// Subtracted when the death date precedes the birth date.
    pub inconsistency_penalty: f64,
}

impl Default for QualityWeights {
    fn default() -> Self {
        Self {
            name: 0.20,
            summary: 0.25,
            birth_date: 0.15,
            death_date: 0.05,
            birth_place: 0.10,
            death_place: 0.05,
            occupations: 0.10,
            nationality: 0.05,
            categories: 0.05,
            inconsistency_penalty: 0.10,
        }
    }
}

impl QualityWeights {
    /// Sum of the field weights; a record with every field present earns this much.
    pub fn field_total(&self) -> f64 {
        self.name
            + self.summary
            + self.birth_date
            + self.death_date
            + self.birth_place
            + self.death_place
            + self.occupations
            + self.nationality
            + self.categories
    }

    fn all(&self) -> [(&'static str, f64); 10] {
        [
            ("name", self.name),
            ("summary", self.summary),
            ("birth_date", self.birth_date),
            ("death_date", self.death_date),
            ("birth_place", self.birth_place),
            ("death_place", self.death_place),
            ("occupations", self.occupations),
            ("nationality", self.nationality),
            ("categories", self.categories),
            ("inconsistency_penalty", self.inconsistency_penalty),
        ]
    }
}

// ---------------------------------------------------------------------------
// Client config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime settings for the encyclopedia client, derived from [`AppConfig`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub action_url: String,
    pub rest_url: String,
    pub user_agent: String,
    pub timeout: Duration,
    pub max_attempts: u32,
    pub backoff: Duration,
    pub similarity_floor: f64,
    pub candidate_limit: u32,
    pub suggest_limit: u32,
}

impl From<&AppConfig> for ClientConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            action_url: config.api.action_url.clone(),
            rest_url: config.api.rest_url.clone(),
            user_agent: config.api.user_agent.clone(),
            timeout: Duration::from_secs(config.api.timeout_secs),
            max_attempts: config.retry.max_attempts,
            backoff: Duration::from_millis(config.retry.backoff_ms),
            similarity_floor: config.search.similarity_floor,
            candidate_limit: config.search.candidate_limit,
            suggest_limit: config.search.suggest_limit,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.chronicle/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| ChronicleError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.chronicle/chronicle.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ChronicleError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        ChronicleError::config(format!("failed to parse {}: {e}", path.display()))
    })?;

    validate_config(&config)?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let path = config_file_path()?;
    init_config_at(&path)?;
    Ok(path)
}

/// Write a default config file at `path`, creating parent directories.
pub fn init_config_at(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| ChronicleError::io(dir, e))?;
    }

    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| ChronicleError::config(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| ChronicleError::io(path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(())
}

/// Reject values the client or validator cannot work with.
pub fn validate_config(config: &AppConfig) -> Result<()> {
    validate_http_url("api.action_url", &config.api.action_url)?;
    validate_http_url("api.rest_url", &config.api.rest_url)?;

    if config.api.user_agent.trim().is_empty() {
        return Err(ChronicleError::config("api.user_agent must not be empty"));
    }
    if config.api.timeout_secs == 0 {
        return Err(ChronicleError::config("api.timeout_secs must be at least 1"));
    }
    if config.retry.max_attempts == 0 {
        return Err(ChronicleError::config("retry.max_attempts must be at least 1"));
    }
    if config.retry.backoff_ms > MAX_BACKOFF_MS {
        return Err(ChronicleError::config(format!(
            "retry.backoff_ms must be at most {MAX_BACKOFF_MS}, got {}",
            config.retry.backoff_ms
        )));
    }
    if !(0.0..=1.0).contains(&config.search.similarity_floor) {
        return Err(ChronicleError::config(format!(
            "search.similarity_floor must be within 0..=1, got {}",
            config.search.similarity_floor
        )));
    }
    if config.search.candidate_limit == 0 {
        return Err(ChronicleError::config("search.candidate_limit must be at least 1"));
    }
    if config.pipeline.request_timeout_secs == 0 {
        return Err(ChronicleError::config(
            "pipeline.request_timeout_secs must be at least 1",
        ));
    }
    for (field, weight) in config.quality.all() {
        if !weight.is_finite() || weight < 0.0 {
            return Err(ChronicleError::config(format!(
                "quality.{field} must be a non-negative number, got {weight}"
            )));
        }
    }
    validate_weights(&config.quality)?;

    Ok(())
}

/// The score is normalized by the field total, and an inconsistent record must
/// score strictly below its consistent counterpart after rounding to 0.001.
fn validate_weights(weights: &QualityWeights) -> Result<()> {
    let total = weights.field_total();
    if total <= 0.0 {
        return Err(ChronicleError::config(
            "quality weights must not all be zero",
        ));
    }
    if weights.inconsistency_penalty < 0.001 {
        return Err(ChronicleError::config(format!(
            "quality.inconsistency_penalty must be at least 0.001, got {}",
            weights.inconsistency_penalty
        )));
    }
    // Both dates are present whenever the penalty applies.
    let dates_share = (weights.birth_date + weights.death_date) / total;
    if weights.inconsistency_penalty > dates_share {
        return Err(ChronicleError::config(format!(
            "quality.inconsistency_penalty ({}) must not exceed the normalized date weight ({dates_share:.3})",
            weights.inconsistency_penalty
        )));
    }
    Ok(())
}

fn validate_http_url(field: &str, value: &str) -> Result<()> {
    let url = Url::parse(value)
        .map_err(|e| ChronicleError::config(format!("{field}: invalid URL '{value}': {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(ChronicleError::config(format!(
            "{field}: unsupported URL scheme '{scheme}'"
        ))),
    }
}
