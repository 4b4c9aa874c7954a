//! screener-engine — hybrid resume matching and ranking.
//!
//! Matches candidate resumes against a job description and produces a
//! ranked, explained shortlist. Each candidate runs through an independent
//! pipeline — normalize, embed, reason — whose signals are fused into one
//! 0–100 score; batches fan out under bounded concurrency with per-candidate
//! failure isolation and a deterministic final ordering.
//!
//! Binary-document extraction, persistence, request handling, and report
//! rendering are external collaborators: this crate consumes plain text and
//! emits a self-contained report payload.

pub mod batch;
pub mod config;
pub mod engine;
pub mod errors;
pub mod models;
pub mod normalize;
pub mod report;
pub mod scoring;
pub mod telemetry;

pub use config::{Config, FusionWeights};
pub use engine::MatchEngine;
pub use errors::{EngineError, ProviderError};
pub use models::{
    BatchStatus, ExcludedCandidate, JobHandle, JobProfile, MatchOutcome, RankingResult,
    ResumeRecord, ResumeSubmission,
};
pub use report::ReportPayload;
pub use scoring::embedding::EmbeddingProvider;
pub use scoring::reasoning::{ReasoningScorer, ReasoningVerdict};
