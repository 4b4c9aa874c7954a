//! Match Engine — the surface the request-handling layer consumes.
//!
//! Flow: submit_job → JobHandle → submit_batch → RankingResult →
//!       build_report → ReportPayload for the external renderer.
//!
//! The engine owns the provider clients behind capability traits so tests
//! run the full pipeline against deterministic stubs.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::batch::BatchCoordinator;
use crate::config::Config;
use crate::errors::EngineError;
use crate::models::{JobHandle, JobProfile, RankingResult, ResumeSubmission};
use crate::normalize::ontology_scan;
use crate::report::{self, ReportPayload};
use crate::scoring::embedding::{EmbeddingProvider, GeminiEmbeddingClient};
use crate::scoring::reasoning::{HttpReasoningClient, ReasoningScorer};

/// Job titles longer than this are treated as body text, not a title.
const MAX_TITLE_CHARS: usize = 80;

pub struct MatchEngine {
    config: Config,
    embedder: Arc<dyn EmbeddingProvider>,
    reasoner: Arc<dyn ReasoningScorer>,
}

impl MatchEngine {
    /// Builds an engine with production provider clients.
    /// Fails fast on missing credentials — never mid-batch.
    pub fn from_env() -> Result<Self, EngineError> {
        let config = Config::from_env().map_err(|e| EngineError::Config(format!("{e:#}")))?;
        let embedder = Arc::new(GeminiEmbeddingClient::new(config.gemini_api_key.clone()));
        let reasoner = Arc::new(HttpReasoningClient::new(config.anthropic_api_key.clone()));
        Ok(Self::with_providers(config, embedder, reasoner))
    }

    /// Builds an engine with explicit providers — the seam tests use.
    pub fn with_providers(
        config: Config,
        embedder: Arc<dyn EmbeddingProvider>,
        reasoner: Arc<dyn ReasoningScorer>,
    ) -> Self {
        Self {
            config,
            embedder,
            reasoner,
        }
    }

    /// Parses a job description into a handle that owns its profile.
    /// The handle is threaded through every batch call explicitly; the
    /// engine keeps no per-job state.
    pub fn submit_job(&self, job_text: &str) -> Result<JobHandle, EngineError> {
        let trimmed = job_text.trim();
        if trimmed.is_empty() {
            return Err(EngineError::Validation(
                "job description must not be empty".to_string(),
            ));
        }

        let title = trimmed
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .filter(|l| l.chars().count() <= MAX_TITLE_CHARS)
            .map(String::from);

        let handle = JobHandle {
            id: Uuid::new_v4(),
            profile: JobProfile {
                title,
                description_text: trimmed.to_string(),
                required_skills: ontology_scan(trimmed),
            },
        };
        info!(
            "Job {} submitted: title={:?}, {} required skills",
            handle.id,
            handle.profile.title,
            handle.profile.required_skills.len()
        );
        Ok(handle)
    }

    /// Runs one batch of resumes against a job and returns the top-K ranking.
    pub async fn submit_batch(
        &self,
        job: &JobHandle,
        submissions: Vec<ResumeSubmission>,
        top_k: usize,
    ) -> Result<RankingResult, EngineError> {
        if top_k < 1 {
            return Err(EngineError::Validation("top_k must be >= 1".to_string()));
        }

        let coordinator = BatchCoordinator::new(
            Arc::clone(&self.embedder),
            Arc::clone(&self.reasoner),
            self.config.fusion_weights,
            self.config.max_concurrency,
            self.config.batch_timeout,
        );
        Ok(coordinator.run(&job.profile, submissions, top_k).await)
    }

    /// Assembles the self-contained payload the report renderer consumes.
    pub fn build_report(&self, ranking: &RankingResult, job: &JobHandle) -> ReportPayload {
        report::assemble(ranking, &job.profile)
    }
}
