//! Batch Coordinator — fans candidates out against one job under bounded
//! concurrency and aggregates their outcomes into a deterministic ranking.
//!
//! Flow per candidate: normalize (inline, pure) → embed + reason (the only
//! suspension points, run concurrently) → fuse → tagged outcome.
//! One candidate's failure never aborts the batch; the semaphore is the
//! sole backpressure mechanism against the reasoning service.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::{timeout_at, Instant};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::FusionWeights;
use crate::models::{
    BatchStatus, ExcludedCandidate, JobProfile, MatchOutcome, RankingResult, ResumeRecord,
    ResumeSubmission,
};
use crate::normalize::normalize;
use crate::scoring::embedding::EmbeddingProvider;
use crate::scoring::fusion::fuse;
use crate::scoring::reasoning::ReasoningScorer;
use crate::scoring::similarity::similarity;

/// Reason recorded when a candidate cannot be scored. Exclusion happens only
/// when both signals are unavailable, and the reasoning signal is absent in
/// every such case.
pub const REASON_REASONING_UNAVAILABLE: &str = "reasoning_unavailable";

/// Per-candidate result: scored or excluded, never an escaped error.
#[derive(Debug, Clone)]
enum CandidateOutcome {
    Scored(MatchOutcome),
    Excluded(ExcludedCandidate),
}

/// Runs batches of candidate pipelines against a job.
pub struct BatchCoordinator {
    embedder: Arc<dyn EmbeddingProvider>,
    reasoner: Arc<dyn ReasoningScorer>,
    weights: FusionWeights,
    max_concurrency: usize,
    batch_timeout: Duration,
}

impl BatchCoordinator {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        reasoner: Arc<dyn ReasoningScorer>,
        weights: FusionWeights,
        max_concurrency: usize,
        batch_timeout: Duration,
    ) -> Self {
        Self {
            embedder,
            reasoner,
            weights,
            max_concurrency,
            batch_timeout,
        }
    }

    /// Scores every submission against the job and returns the top-K ranking.
    ///
    /// Status: `Completed` when every candidate scored, `Partial` when at
    /// least one scored and at least one was excluded, `Failed` when none
    /// scored. Ordering is a strict total order: final_score descending,
    /// filename ascending on ties.
    pub async fn run(
        &self,
        job: &JobProfile,
        submissions: Vec<ResumeSubmission>,
        top_k: usize,
    ) -> RankingResult {
        let batch_id = Uuid::new_v4();
        info!(
            "Batch {batch_id} running: {} candidates, top_k={top_k}",
            submissions.len()
        );

        if submissions.is_empty() {
            return RankingResult {
                batch_id,
                status: BatchStatus::Failed,
                ranked: Vec::new(),
                excluded: Vec::new(),
                raw_texts: BTreeMap::new(),
            };
        }

        let raw_by_filename: BTreeMap<String, String> = submissions
            .iter()
            .map(|s| (s.filename.clone(), s.text.clone()))
            .collect();

        let deadline = Instant::now() + self.batch_timeout;

        // The job vector is computed once per batch and shared read-only
        // across pipelines. If it is unavailable every candidate falls back
        // to reasoning-only scoring.
        let job = Arc::new(job.clone());
        let job_vector = Arc::new(match timeout_at(deadline, self.embed_job(&job)).await {
            Ok(vector) => vector,
            Err(_) => {
                warn!("Batch deadline hit while embedding the job description");
                None
            }
        });
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut tasks = JoinSet::new();

        for submission in submissions {
            let embedder = Arc::clone(&self.embedder);
            let reasoner = Arc::clone(&self.reasoner);
            let job = Arc::clone(&job);
            let job_vector = Arc::clone(&job_vector);
            let semaphore = Arc::clone(&semaphore);
            let weights = self.weights;

            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("batch semaphore closed");

                let record = normalize(&submission.text, &submission.filename);
                let pipeline =
                    score_candidate(&record, &job, &job_vector, &*embedder, &*reasoner, weights);

                match timeout_at(deadline, pipeline).await {
                    Ok(outcome) => outcome,
                    // A cancelled call is a provider failure, not its own
                    // error class: both signals are gone, so the candidate
                    // takes the double-failure path.
                    Err(_) => {
                        warn!("Batch deadline hit while scoring {}", record.filename);
                        CandidateOutcome::Excluded(ExcludedCandidate {
                            candidate_name: record.candidate_name.clone(),
                            filename: record.filename.clone(),
                            reason: REASON_REASONING_UNAVAILABLE.to_string(),
                        })
                    }
                }
            });
        }

        let mut ranked = Vec::new();
        let mut excluded = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(CandidateOutcome::Scored(outcome)) => ranked.push(outcome),
                Ok(CandidateOutcome::Excluded(marker)) => excluded.push(marker),
                Err(e) => warn!("Candidate pipeline task failed to join: {e}"),
            }
        }

        let status = if ranked.is_empty() {
            BatchStatus::Failed
        } else if excluded.is_empty() {
            BatchStatus::Completed
        } else {
            BatchStatus::Partial
        };

        ranked.sort_by(|a, b| {
            b.final_score
                .cmp(&a.final_score)
                .then_with(|| a.filename.cmp(&b.filename))
        });
        ranked.truncate(top_k);
        excluded.sort_by(|a, b| a.filename.cmp(&b.filename));

        let raw_texts: BTreeMap<String, String> = ranked
            .iter()
            .filter_map(|o| {
                raw_by_filename
                    .get(&o.filename)
                    .map(|text| (o.filename.clone(), text.clone()))
            })
            .collect();

        info!(
            "Batch {batch_id} {:?}: {} ranked, {} excluded",
            status,
            ranked.len(),
            excluded.len()
        );

        RankingResult {
            batch_id,
            status,
            ranked,
            excluded,
            raw_texts,
        }
    }

    async fn embed_job(&self, job: &JobProfile) -> Option<Vec<f32>> {
        match self.embedder.embed(&job_embed_input(job)).await {
            Ok(vector) => Some(vector),
            Err(e) => {
                warn!("Job embedding unavailable ({e}); batch falls back to reasoning-only");
                None
            }
        }
    }
}

/// Scores a single candidate. Provider failures become absent signals; the
/// fusion table decides the rest.
async fn score_candidate(
    record: &ResumeRecord,
    job: &JobProfile,
    job_vector: &Option<Vec<f32>>,
    embedder: &dyn EmbeddingProvider,
    reasoner: &dyn ReasoningScorer,
    weights: FusionWeights,
) -> CandidateOutcome {
    let embed_signal = async {
        // Without a job vector there is nothing to compare against; skip the
        // call rather than spend a request on an unusable vector.
        let job_vector = job_vector.as_ref()?;
        match embedder.embed(&resume_embed_input(record)).await {
            Ok(vector) => similarity(job_vector, &vector),
            Err(e) => {
                warn!("Embedding unavailable for {} ({e})", record.filename);
                None
            }
        }
    };

    let reason_signal = async {
        match reasoner.score(record, job).await {
            Ok(verdict) => Some(verdict),
            Err(e) => {
                warn!("Reasoning unavailable for {} ({e})", record.filename);
                None
            }
        }
    };

    let (similarity_score, verdict) = tokio::join!(embed_signal, reason_signal);

    match fuse(weights, similarity_score, verdict.as_ref()) {
        Some(mut fused) => {
            if verdict.is_none() && fused.gaps.is_empty() {
                // Similarity-only outcomes still get gap evidence: required
                // skills the resume does not list.
                fused.gaps = job
                    .required_skills
                    .difference(&record.skills)
                    .cloned()
                    .collect();
            }
            CandidateOutcome::Scored(MatchOutcome {
                candidate_name: record.candidate_name.clone(),
                filename: record.filename.clone(),
                final_score: fused.final_score,
                justification: fused.justification,
                strengths: fused.strengths,
                gaps: fused.gaps,
            })
        }
        None => CandidateOutcome::Excluded(ExcludedCandidate {
            candidate_name: record.candidate_name.clone(),
            filename: record.filename.clone(),
            reason: REASON_REASONING_UNAVAILABLE.to_string(),
        }),
    }
}

/// Text sent to the embedding provider for a resume.
pub fn resume_embed_input(record: &ResumeRecord) -> String {
    let skills = record
        .skills
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    format!("Skills: {skills}. Summary: {}", record.raw_text)
}

/// Text sent to the embedding provider for a job.
pub fn job_embed_input(job: &JobProfile) -> String {
    format!(
        "Job Title: {}. Description: {}",
        job.title.as_deref().unwrap_or("Untitled"),
        job.description_text
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ProviderError;
    use crate::scoring::fusion::SIMILARITY_ONLY_JUSTIFICATION;
    use crate::scoring::reasoning::ReasoningVerdict;
    use async_trait::async_trait;
    use std::collections::BTreeSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Embeds text as word-overlap counts against fixed marker terms, with a
    /// constant bias dimension so vectors are never zero. Texts containing
    /// `EMBEDFAIL` simulate an unreachable provider.
    struct StubEmbedder;

    const MARKERS: &[&str] = &["distributed", "backend", "frontend", "microservices"];

    #[async_trait]
    impl EmbeddingProvider for StubEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
            if text.contains("EMBEDFAIL") {
                return Err(ProviderError::Timeout);
            }
            let lower = text.to_lowercase();
            let mut vector = vec![0.2_f32];
            for marker in MARKERS {
                vector.push(lower.matches(marker).count() as f32);
            }
            Ok(vector)
        }
    }

    /// Scores by word overlap between resume text and job description.
    /// Filenames starting with `fail_` simulate a reasoning-service timeout.
    struct StubReasoner {
        running: AtomicUsize,
        peak: AtomicUsize,
    }

    impl StubReasoner {
        fn new() -> Self {
            Self {
                running: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ReasoningScorer for StubReasoner {
        async fn score(
            &self,
            resume: &ResumeRecord,
            job: &JobProfile,
        ) -> Result<ReasoningVerdict, ProviderError> {
            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.running.fetch_sub(1, Ordering::SeqCst);

            if resume.filename.starts_with("fail_") {
                return Err(ProviderError::Timeout);
            }

            let job_words: BTreeSet<&str> = job.description_text.split_whitespace().collect();
            let hits = resume
                .raw_text
                .split_whitespace()
                .filter(|w| job_words.contains(w))
                .count();
            let score = (hits as u32 * 10).min(100);
            Ok(ReasoningVerdict {
                match_score: score,
                strengths: vec![format!("{hits} overlapping terms")],
                gaps: vec![],
                justification: "Deterministic stub verdict.".to_string(),
            })
        }
    }

    /// Never completes within any reasonable deadline.
    struct HangingReasoner;

    #[async_trait]
    impl ReasoningScorer for HangingReasoner {
        async fn score(
            &self,
            _resume: &ResumeRecord,
            _job: &JobProfile,
        ) -> Result<ReasoningVerdict, ProviderError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Err(ProviderError::Timeout)
        }
    }

    struct HangingEmbedder;

    #[async_trait]
    impl EmbeddingProvider for HangingEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, ProviderError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Err(ProviderError::Timeout)
        }
    }

    fn job() -> JobProfile {
        JobProfile {
            title: Some("Senior Backend Engineer".to_string()),
            description_text: "Senior backend engineer, 5+ years distributed systems".to_string(),
            required_skills: BTreeSet::from(["Rust".to_string(), "Docker".to_string()]),
        }
    }

    fn coordinator(
        embedder: Arc<dyn EmbeddingProvider>,
        reasoner: Arc<dyn ReasoningScorer>,
        max_concurrency: usize,
        timeout: Duration,
    ) -> BatchCoordinator {
        BatchCoordinator::new(
            embedder,
            reasoner,
            FusionWeights::default(),
            max_concurrency,
            timeout,
        )
    }

    fn default_coordinator() -> BatchCoordinator {
        coordinator(
            Arc::new(StubEmbedder),
            Arc::new(StubReasoner::new()),
            4,
            Duration::from_secs(30),
        )
    }

    #[tokio::test]
    async fn test_stronger_candidate_ranks_first() {
        let submissions = vec![
            ResumeSubmission::new("a.pdf", "Ann Able\n5 years distributed systems, microservices"),
            ResumeSubmission::new("b.pdf", "Bob Baker\n2 years frontend UI"),
        ];

        let result = default_coordinator().run(&job(), submissions, 2).await;

        assert_eq!(result.status, BatchStatus::Completed);
        assert_eq!(result.ranked.len(), 2);
        assert_eq!(result.ranked[0].filename, "a.pdf");
        assert_eq!(result.ranked[1].filename, "b.pdf");
        assert!(result.ranked[0].final_score > result.ranked[1].final_score);
    }

    #[tokio::test]
    async fn test_partial_batch_lists_excluded_with_reason() {
        let mut submissions = Vec::new();
        for i in 0..7 {
            submissions.push(ResumeSubmission::new(
                format!("ok_{i}.pdf"),
                format!("Candidate {i}\ndistributed systems backend work"),
            ));
        }
        for i in 0..3 {
            // Both signals fail: reasoning via the fail_ filename, embedding
            // via the EMBEDFAIL marker in the text.
            submissions.push(ResumeSubmission::new(
                format!("fail_{i}.pdf"),
                format!("Candidate F{i}\nEMBEDFAIL distributed"),
            ));
        }

        let result = default_coordinator().run(&job(), submissions, 10).await;

        assert_eq!(result.status, BatchStatus::Partial);
        assert_eq!(result.ranked.len(), 7);
        assert_eq!(result.excluded.len(), 3);
        for marker in &result.excluded {
            assert_eq!(marker.reason, REASON_REASONING_UNAVAILABLE);
            assert!(marker.filename.starts_with("fail_"));
        }
    }

    #[tokio::test]
    async fn test_reasoning_failure_falls_back_to_similarity_only() {
        let submissions = vec![ResumeSubmission::new(
            "fail_only_reasoning.pdf",
            "Jane Doe\nSkills\nRust\ndistributed backend systems",
        )];

        let result = default_coordinator().run(&job(), submissions, 1).await;

        assert_eq!(result.status, BatchStatus::Completed);
        assert_eq!(result.ranked.len(), 1);
        let outcome = &result.ranked[0];
        assert_eq!(outcome.justification, SIMILARITY_ONLY_JUSTIFICATION);
        // Gap fallback: required skills the resume does not list.
        assert_eq!(outcome.gaps, vec!["Docker".to_string()]);
    }

    #[tokio::test]
    async fn test_top_k_truncates_ranking() {
        let submissions: Vec<_> = (0..5)
            .map(|i| {
                ResumeSubmission::new(
                    format!("c{i}.pdf"),
                    format!("Candidate {i}\nbackend distributed systems"),
                )
            })
            .collect();

        let result = default_coordinator().run(&job(), submissions, 2).await;

        assert_eq!(result.ranked.len(), 2);
        assert_eq!(result.status, BatchStatus::Completed);
    }

    #[tokio::test]
    async fn test_ties_break_by_filename_ascending() {
        // Identical text for every candidate forces identical scores.
        let submissions: Vec<_> = ["zeta.pdf", "alpha.pdf", "mid.pdf"]
            .iter()
            .map(|f| ResumeSubmission::new(*f, "Same Person\nbackend distributed systems"))
            .collect();

        let first = default_coordinator().run(&job(), submissions.clone(), 3).await;
        let second = default_coordinator().run(&job(), submissions, 3).await;

        let order: Vec<&str> = first.ranked.iter().map(|o| o.filename.as_str()).collect();
        assert_eq!(order, vec!["alpha.pdf", "mid.pdf", "zeta.pdf"]);
        let order_again: Vec<&str> = second.ranked.iter().map(|o| o.filename.as_str()).collect();
        assert_eq!(order, order_again);
    }

    #[tokio::test]
    async fn test_all_failures_yield_failed_status() {
        let submissions = vec![
            ResumeSubmission::new("fail_a.pdf", "A\nEMBEDFAIL"),
            ResumeSubmission::new("fail_b.pdf", "B\nEMBEDFAIL"),
        ];

        let result = default_coordinator().run(&job(), submissions, 5).await;

        assert_eq!(result.status, BatchStatus::Failed);
        assert!(result.ranked.is_empty());
        assert_eq!(result.excluded.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_batch_is_failed() {
        let result = default_coordinator().run(&job(), Vec::new(), 3).await;
        assert_eq!(result.status, BatchStatus::Failed);
        assert!(result.ranked.is_empty());
        assert!(result.excluded.is_empty());
    }

    #[tokio::test]
    async fn test_empty_resume_still_scores() {
        // Extraction produced nothing: empty collections, but the reasoning
        // stub still returns a verdict, so the candidate is scored.
        let submissions = vec![ResumeSubmission::new("blank.pdf", "")];

        let result = default_coordinator().run(&job(), submissions, 1).await;

        assert_eq!(result.status, BatchStatus::Completed);
        assert_eq!(result.ranked.len(), 1);
        assert_eq!(result.ranked[0].candidate_name, "blank");
    }

    #[tokio::test]
    async fn test_deadline_excludes_outstanding_candidates() {
        let coordinator = coordinator(
            Arc::new(HangingEmbedder),
            Arc::new(HangingReasoner),
            4,
            Duration::from_millis(50),
        );
        let submissions = vec![
            ResumeSubmission::new("slow_a.pdf", "A"),
            ResumeSubmission::new("slow_b.pdf", "B"),
        ];

        let result = coordinator.run(&job(), submissions, 2).await;

        assert_eq!(result.status, BatchStatus::Failed);
        assert_eq!(result.excluded.len(), 2);
        for marker in &result.excluded {
            assert_eq!(marker.reason, REASON_REASONING_UNAVAILABLE);
        }
    }

    #[tokio::test]
    async fn test_concurrency_stays_bounded() {
        let reasoner = Arc::new(StubReasoner::new());
        let coordinator = coordinator(
            Arc::new(StubEmbedder),
            Arc::clone(&reasoner) as Arc<dyn ReasoningScorer>,
            2,
            Duration::from_secs(30),
        );
        let submissions: Vec<_> = (0..8)
            .map(|i| ResumeSubmission::new(format!("c{i}.pdf"), "backend distributed"))
            .collect();

        let result = coordinator.run(&job(), submissions, 8).await;

        assert_eq!(result.ranked.len(), 8);
        assert!(
            reasoner.peak.load(Ordering::SeqCst) <= 2,
            "peak concurrency {} exceeded limit",
            reasoner.peak.load(Ordering::SeqCst)
        );
    }

    #[tokio::test]
    async fn test_raw_texts_cover_exactly_the_ranked_set() {
        let submissions: Vec<_> = (0..4)
            .map(|i| {
                ResumeSubmission::new(
                    format!("c{i}.pdf"),
                    format!("Candidate {i}\nbackend distributed"),
                )
            })
            .collect();

        let result = default_coordinator().run(&job(), submissions, 2).await;

        assert_eq!(result.raw_texts.len(), 2);
        for outcome in &result.ranked {
            assert!(result.raw_texts.contains_key(&outcome.filename));
        }
    }
}
