//! End-to-end lookup pipeline: query → resolve → fetch → extract → transform → validate.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, instrument, warn};

use chronicle_client::{RateLimiter, WikiClient};
use chronicle_shared::{AppConfig, ChronicleError, ClientConfig, QualityWeights, Result};

use crate::assembler::{self, BiographyRecord, SourceMaterial};
use crate::quality;

// ---------------------------------------------------------------------------
// Stages and progress
// ---------------------------------------------------------------------------

/// Where a lookup currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineStage {
    Resolving,
    Fetching,
    Extracting,
    Transforming,
    Validating,
    Done,
    /// Terminal failure, with the reason.
    Failed(String),
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolving => f.write_str("Resolving query"),
            Self::Fetching => f.write_str("Fetching article"),
            Self::Extracting => f.write_str("Extracting infobox"),
            Self::Transforming => f.write_str("Transforming fields"),
            Self::Validating => f.write_str("Validating record"),
            Self::Done => f.write_str("Done"),
            Self::Failed(reason) => write!(f, "Failed: {reason}"),
        }
    }
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called on every stage transition, including the terminal one.
    fn stage(&self, stage: &PipelineStage);
    /// Called once when a record has been assembled.
    fn done(&self, record: &BiographyRecord);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn stage(&self, _stage: &PipelineStage) {}
    fn done(&self, _record: &BiographyRecord) {}
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Assembles biography records for free-text queries.
#[derive(Debug, Clone)]
pub struct Pipeline {
    client: WikiClient,
    weights: QualityWeights,
    request_timeout: Duration,
}

impl Pipeline {
    pub fn new(client: WikiClient, weights: QualityWeights, request_timeout: Duration) -> Self {
        Self {
            client,
            weights,
            request_timeout,
        }
    }

    /// Build a pipeline from the application config and a shared rate limiter.
    pub fn from_config(config: &AppConfig, limiter: Arc<RateLimiter>) -> Result<Self> {
        let client = WikiClient::new(ClientConfig::from(config), limiter)?;
        Ok(Self::new(
            client,
            config.quality.clone(),
            Duration::from_secs(config.pipeline.request_timeout_secs),
        ))
    }

    pub fn client(&self) -> &WikiClient {
        &self.client
    }

    /// Look up one historical figure.
    ///
    /// Returns either a complete record or a typed failure; nothing partial.
    /// The whole lookup is bounded by the request timeout, whose expiry is
    /// reported as a fetch failure.
    #[instrument(skip_all, fields(query = %query))]
    pub async fn assemble(
        &self,
        query: &str,
        progress: &dyn ProgressReporter,
    ) -> Result<BiographyRecord> {
        let start = Instant::now();

        let result = match tokio::time::timeout(self.request_timeout, self.run(query, progress))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(ChronicleError::fetch(format!(
                "lookup timed out after {}s",
                self.request_timeout.as_secs_f64()
            ))),
        };

        match &result {
            Ok(record) => {
                progress.stage(&PipelineStage::Done);
                progress.done(record);
                info!(
                    name = %record.name(),
                    score = record.quality_score(),
                    warnings = record.warnings().len(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "lookup complete"
                );
            }
            Err(e) => {
                progress.stage(&PipelineStage::Failed(e.reason()));
                warn!(
                    error = %e,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "lookup failed"
                );
            }
        }

        result
    }

    async fn run(&self, query: &str, progress: &dyn ProgressReporter) -> Result<BiographyRecord> {
        enter(PipelineStage::Resolving, progress);
        let reference = self.client.resolve(query).await?;

        enter(PipelineStage::Fetching, progress);
        let body = self.client.fetch_body(&reference).await?;
        let wikitext = self.client.fetch_infobox(&reference).await?;

        enter(PipelineStage::Extracting, progress);
        let fields = chronicle_infobox::extract(&wikitext);

        enter(PipelineStage::Transforming, progress);
        let material = SourceMaterial {
            reference,
            body,
            fields,
        };
        let transformed = assembler::transform(&material)?;

        enter(PipelineStage::Validating, progress);
        let assessment = quality::validate(&transformed.draft, &self.weights);

        BiographyRecord::from_parts(material, transformed, assessment)
    }
}

fn enter(stage: PipelineStage, progress: &dyn ProgressReporter) {
    debug!(stage = ?stage, "entering stage");
    progress.stage(&stage);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chronicle_shared::{Era, Tag};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const API_PATH: &str = "/w/api.php";

    fn fixture(name: &str) -> String {
        std::fs::read_to_string(format!("../../../fixtures/wiki/{name}"))
            .unwrap_or_else(|e| panic!("fixture {name}: {e}"))
    }

    fn pipeline(server: &MockServer, request_timeout: Duration) -> Pipeline {
        let config = ClientConfig {
            action_url: format!("{}{API_PATH}", server.uri()),
            rest_url: format!("{}/api/rest_v1", server.uri()),
            backoff: Duration::from_millis(1),
            ..ClientConfig::default()
        };
        let client = WikiClient::new(config, Arc::new(RateLimiter::new(Duration::ZERO)))
            .expect("client");
        Pipeline::new(client, QualityWeights::default(), request_timeout)
    }

    #[derive(Default)]
    struct RecordingProgress {
        stages: Mutex<Vec<PipelineStage>>,
    }

    impl ProgressReporter for RecordingProgress {
        fn stage(&self, stage: &PipelineStage) {
            self.stages.lock().expect("lock").push(stage.clone());
        }
        fn done(&self, _record: &BiographyRecord) {}
    }

    impl RecordingProgress {
        fn stages(&self) -> Vec<PipelineStage> {
            self.stages.lock().expect("lock").clone()
        }
    }

    async fn mount_einstein(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path(API_PATH))
            .and(query_param("action", "opensearch"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(fixture("opensearch_einstein.json")),
            )
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/rest_v1/page/summary/Albert_Einstein"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(fixture("einstein_summary.json")),
            )
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path(API_PATH))
            .and(query_param("action", "query"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(fixture("einstein_revisions.json")),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn einstein_end_to_end() {
        let server = MockServer::start().await;
        mount_einstein(&server).await;

        let progress = RecordingProgress::default();
        let record = pipeline(&server, Duration::from_secs(30))
            .assemble("Albert Einstein", &progress)
            .await
            .expect("record");

        assert_eq!(record.name(), "Albert Einstein");
        assert!(record.summary().starts_with("Albert Einstein was a German-born"));
        assert!(record.occupations().contains("physicist"), "{:?}", record.occupations());
        assert!(record.categories().contains(&Tag::Scientist));
        assert!(record.categories().contains(&Tag::Contemporary));
        assert!(record.quality_score() > 0.5);
        assert!(record.warnings().is_empty(), "{:?}", record.warnings());

        let birth = record.birth_date().expect("birth date");
        assert_eq!((birth.year, birth.month, birth.day, birth.era), (1879, Some(3), Some(14), Era::Ce));
        assert_eq!(record.age_at_death(), Some(76));
        assert_eq!(
            record.birth_place(),
            Some("Ulm, Kingdom of Württemberg, German Empire")
        );
        assert_eq!(record.death_place(), Some("Princeton, New Jersey, U.S."));
        assert_eq!(record.reference().key, "Albert_Einstein");
        assert_eq!(
            record.page_url(),
            Some("https://en.wikipedia.org/wiki/Albert_Einstein")
        );
        assert!(record.image_url().is_some());

        assert_eq!(
            progress.stages(),
            vec![
                PipelineStage::Resolving,
                PipelineStage::Fetching,
                PipelineStage::Extracting,
                PipelineStage::Transforming,
                PipelineStage::Validating,
                PipelineStage::Done,
            ]
        );
    }

    #[tokio::test]
    async fn gibberish_query_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(API_PATH))
            .and(query_param("action", "opensearch"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(fixture("opensearch_empty.json")),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/rest_v1/page/summary/Xyzzyqqplonk123"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let progress = RecordingProgress::default();
        let err = pipeline(&server, Duration::from_secs(30))
            .assemble("Xyzzyqqplonk123", &progress)
            .await
            .expect_err("should fail");

        assert!(matches!(err, ChronicleError::NotFound { .. }));
        assert!(err.is_user_facing());
        let stages = progress.stages();
        assert_eq!(stages.first(), Some(&PipelineStage::Resolving));
        assert!(matches!(stages.last(), Some(PipelineStage::Failed(_))));
        assert_eq!(stages.len(), 2);
    }

    #[tokio::test]
    async fn empty_query_fails_without_requests() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = pipeline(&server, Duration::from_secs(30))
            .assemble("   ", &SilentProgress)
            .await
            .expect_err("empty");
        assert!(matches!(err, ChronicleError::NotFound { .. }));
    }

    #[tokio::test]
    async fn missing_page_fails_during_fetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(API_PATH))
            .and(query_param("action", "opensearch"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(fixture("opensearch_einstein.json")),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/rest_v1/page/summary/Albert_Einstein"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let progress = RecordingProgress::default();
        let err = pipeline(&server, Duration::from_secs(30))
            .assemble("Einstein", &progress)
            .await
            .expect_err("missing");

        assert!(matches!(err, ChronicleError::NotFound { .. }));
        let stages = progress.stages();
        assert_eq!(stages[..2], [PipelineStage::Resolving, PipelineStage::Fetching]);
        assert!(matches!(stages.last(), Some(PipelineStage::Failed(_))));
    }

    #[tokio::test]
    async fn request_timeout_maps_to_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(API_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(fixture("opensearch_einstein.json"))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let err = pipeline(&server, Duration::from_millis(200))
            .assemble("Einstein", &SilentProgress)
            .await
            .expect_err("timeout");
        assert!(matches!(err, ChronicleError::Fetch { .. }));
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn infobox_without_dates_still_assembles() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(API_PATH))
            .and(query_param("action", "opensearch"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                "Hypatia",
                ["Hypatia"],
                [""],
                ["https://en.wikipedia.org/wiki/Hypatia"]
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/rest_v1/page/summary/Hypatia"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "type": "standard",
                "title": "Hypatia",
                "extract": "Hypatia was a Neoplatonist philosopher, astronomer, and mathematician who lived in Alexandria.",
                "description": "Alexandrian mathematician and philosopher"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(API_PATH))
            .and(query_param("action", "query"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "query": {"pages": [{"title": "Hypatia", "revisions": [{"slots": {"main": {
                    "content": "{{Infobox philosopher\n| name = Hypatia\n| birth_date = c. 350–370\n| death_date = March 415\n| occupation = Philosopher, astronomer\n}}"
                }}}]}]}
            })))
            .mount(&server)
            .await;

        let record = pipeline(&server, Duration::from_secs(30))
            .assemble("Hypatia", &SilentProgress)
            .await
            .expect("record");

        assert_eq!(record.birth_date(), None);
        assert_eq!(record.death_date().map(|d| (d.year, d.month)), Some((415, Some(3))));
        assert_eq!(
            record.warnings(),
            ["could not parse birth date: 'c. 350–370'"]
        );
        assert!(record.categories().contains(&Tag::Philosopher));
        assert!(record.categories().contains(&Tag::Scientist));
        assert!(record.categories().contains(&Tag::Ancient));
        assert_eq!(record.page_url(), Some("https://en.wikipedia.org/wiki/Hypatia"));
    }
}
