//! Encyclopedia API client: query resolution, suggestions, page bodies and
//! infobox wikitext, with shared rate limiting and bounded retry.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};
use url::Url;

use chronicle_shared::{CanonicalReference, ChronicleError, ClientConfig, PageBody, Result};

use crate::payload::{OpenSearchResponse, RevisionsResponse, SummaryResponse};
use crate::rate_limit::RateLimiter;
use crate::similarity::similarity;

/// Maximum number of redirects followed per request.
const MAX_REDIRECTS: usize = 5;

// ---------------------------------------------------------------------------
// Attempt outcome
// ---------------------------------------------------------------------------

/// How a single request attempt failed.
enum Failure {
    /// Worth another attempt: timeouts, connection errors, 5xx, 429, bad payloads.
    Transient(String),
    /// Retrying cannot help.
    Fatal(ChronicleError),
}

// ---------------------------------------------------------------------------
// WikiClient
// ---------------------------------------------------------------------------

/// Client for the MediaWiki action API and the REST v1 API.
///
/// Cheap to clone; clones share the HTTP connection pool and the rate limiter.
#[derive(Debug, Clone)]
pub struct WikiClient {
    http: Client,
    config: ClientConfig,
    action_url: Url,
    rest_url: Url,
    limiter: Arc<RateLimiter>,
}

impl WikiClient {
    /// Build a client from runtime settings and a process-wide rate limiter.
    pub fn new(config: ClientConfig, limiter: Arc<RateLimiter>) -> Result<Self> {
        let action_url = parse_endpoint("action_url", &config.action_url)?;
        let rest_url = parse_endpoint("rest_url", &config.rest_url)?;

        let http = Client::builder()
            .user_agent(config.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(config.timeout)
            .build()
            .map_err(|e| ChronicleError::fetch(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            config,
            action_url,
            rest_url,
            limiter,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Resolve a free-text query to the best matching article.
    ///
    /// Picks the highest-ranked search candidate whose similarity to the query
    /// clears the configured floor. An empty query fails without a request.
    #[instrument(skip_all, fields(query = %query))]
    pub async fn resolve(&self, query: &str) -> Result<CanonicalReference> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ChronicleError::not_found("empty query"));
        }

        let candidates = self.opensearch(query, self.config.candidate_limit).await?;
        debug!(candidates = candidates.len(), "search candidates received");

        for (title, url) in candidates {
            let score = similarity(query, &title);
            if score >= self.config.similarity_floor {
                info!(title = %title, score, "query resolved");
                let mut reference = CanonicalReference::from_title(&title);
                reference.url = url;
                return Ok(reference);
            }
            debug!(title = %title, score, "candidate below similarity floor");
        }

        Err(ChronicleError::not_found(format!(
            "no article matches '{query}'"
        )))
    }

    /// Ranked title suggestions for a prefix, at most `limit` of them.
    #[instrument(skip_all, fields(prefix = %prefix, limit))]
    pub async fn suggest(&self, prefix: &str, limit: u32) -> Result<Vec<String>> {
        let prefix = prefix.trim();
        if prefix.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let candidates = self.opensearch(prefix, limit).await?;
        Ok(candidates
            .into_iter()
            .map(|(title, _)| title)
            .take(limit as usize)
            .collect())
    }

    /// Fetch the lead extract and page metadata.
    #[instrument(skip_all, fields(key = %reference.key))]
    pub async fn fetch_body(&self, reference: &CanonicalReference) -> Result<PageBody> {
        let mut url = self.rest_url.clone();
        url.path_segments_mut()
            .map_err(|()| ChronicleError::pipeline("rest_url cannot carry a path"))?
            .pop_if_empty()
            .extend(["page", "summary", reference.key.as_str()]);

        let summary: SummaryResponse = self.get_json(&url).await?;
        let body = PageBody::from(summary);
        debug!(
            title = %body.title,
            kind = %body.kind,
            extract_len = body.text.len(),
            "page body fetched"
        );
        Ok(body)
    }

    /// Fetch the wikitext of the article's lead section, where the infobox lives.
    #[instrument(skip_all, fields(key = %reference.key))]
    pub async fn fetch_infobox(&self, reference: &CanonicalReference) -> Result<String> {
        let mut url = self.action_url.clone();
        url.query_pairs_mut()
            .append_pair("action", "query")
            .append_pair("prop", "revisions")
            .append_pair("rvprop", "content")
            .append_pair("rvslots", "main")
            .append_pair("rvsection", "0")
            .append_pair("titles", &reference.title)
            .append_pair("redirects", "1")
            .append_pair("formatversion", "2")
            .append_pair("format", "json");

        let response: RevisionsResponse = self.get_json(&url).await?;
        let page = response
            .query
            .and_then(|query| query.pages.into_iter().next())
            .ok_or_else(|| {
                ChronicleError::fetch(format!("no page data returned for '{}'", reference.title))
            })?;

        if page.missing || page.invalid {
            return Err(ChronicleError::not_found(format!(
                "no such page: '{}'",
                page.title
            )));
        }

        let wikitext = page
            .revisions
            .into_iter()
            .next()
            .map(|revision| revision.slots.main.content)
            .unwrap_or_default();
        debug!(wikitext_len = wikitext.len(), "lead wikitext fetched");
        Ok(wikitext)
    }

    // -----------------------------------------------------------------------
    // Requests
    // -----------------------------------------------------------------------

    async fn opensearch(&self, search: &str, limit: u32) -> Result<Vec<(String, Option<String>)>> {
        let mut url = self.action_url.clone();
        url.query_pairs_mut()
            .append_pair("action", "opensearch")
            .append_pair("search", search)
            .append_pair("limit", &limit.to_string())
            .append_pair("namespace", "0")
            .append_pair("redirects", "resolve")
            .append_pair("format", "json");

        let response: OpenSearchResponse = self.get_json(&url).await?;
        Ok(response.candidates())
    }

    /// GET a JSON document, retrying transient failures with linear backoff.
    async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T> {
        let max_attempts = self.config.max_attempts.max(1);
        let mut last_failure = String::new();

        for attempt in 1..=max_attempts {
            match self.try_get_json(url).await {
                Ok(value) => return Ok(value),
                Err(Failure::Fatal(err)) => return Err(err),
                Err(Failure::Transient(reason)) => {
                    if attempt < max_attempts {
                        let backoff = backoff_delay(self.config.backoff, attempt);
                        warn!(
                            %url,
                            attempt,
                            max_attempts,
                            backoff_ms = backoff.as_millis() as u64,
                            error = %reason,
                            "transient failure, retrying"
                        );
                        tokio::time::sleep(backoff).await;
                    }
                    last_failure = reason;
                }
            }
        }

        Err(ChronicleError::fetch(format!(
            "{url}: {last_failure} (gave up after {max_attempts} attempts)"
        )))
    }

    async fn try_get_json<T: DeserializeOwned>(&self, url: &Url) -> std::result::Result<T, Failure> {
        self.limiter.acquire().await;
        debug!(%url, "GET");

        let response = self.http.get(url.clone()).send().await.map_err(|e| {
            if e.is_builder() || e.is_redirect() {
                Failure::Fatal(ChronicleError::fetch(format!("{url}: {e}")))
            } else {
                Failure::Transient(e.to_string())
            }
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(Failure::Fatal(ChronicleError::not_found(format!(
                "no such page: {url}"
            ))));
        }
        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            return Err(Failure::Transient(format!("HTTP {status}")));
        }
        if !status.is_success() {
            return Err(Failure::Fatal(ChronicleError::fetch(format!(
                "{url}: HTTP {status}"
            ))));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Failure::Transient(format!("failed to read body: {e}")))?;

        serde_json::from_str(&body)
            .map_err(|e| Failure::Transient(format!("malformed payload: {e}")))
    }
}

fn parse_endpoint(name: &str, raw: &str) -> Result<Url> {
    let url = Url::parse(raw)
        .map_err(|e| ChronicleError::config(format!("{name} is not a valid URL: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(ChronicleError::config(format!("{name} cannot be a base URL: {raw}")));
    }
    Ok(url)
}

/// Linear backoff for the given attempt, saturating instead of overflowing.
fn backoff_delay(step: Duration, attempt: u32) -> Duration {
    step.saturating_mul(attempt)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
