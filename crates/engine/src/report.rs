//! Report Assembler — packages a ranking into one self-contained payload.
//!
//! Pure transform: the payload carries everything a rendering collaborator
//! needs (ranking, per-candidate evidence, job text), so an identical report
//! can be regenerated from the payload alone with no further calls. The
//! same inputs always produce the same payload.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{BatchStatus, ExcludedCandidate, JobProfile, RankingResult};

/// Self-contained input for the external report renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportPayload {
    pub batch_id: Uuid,
    pub status: BatchStatus,
    pub job_title: Option<String>,
    pub job_description: String,
    pub ranking: Vec<RankedCandidate>,
    pub excluded: Vec<ExcludedCandidate>,
}

/// One ranked candidate with the evidence backing the score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedCandidate {
    /// 1-based position in the ranking.
    pub rank: usize,
    pub candidate_name: String,
    pub filename: String,
    pub final_score: u32,
    pub justification: String,
    pub strengths: Vec<String>,
    pub gaps: Vec<String>,
    /// Raw resume text retained from the batch run.
    pub evidence: String,
}

/// Assembles the report payload from a ranking and the job it ran against.
pub fn assemble(ranking: &RankingResult, job: &JobProfile) -> ReportPayload {
    let candidates = ranking
        .ranked
        .iter()
        .enumerate()
        .map(|(index, outcome)| RankedCandidate {
            rank: index + 1,
            candidate_name: outcome.candidate_name.clone(),
            filename: outcome.filename.clone(),
            final_score: outcome.final_score,
            justification: outcome.justification.clone(),
            strengths: outcome.strengths.clone(),
            gaps: outcome.gaps.clone(),
            evidence: ranking
                .raw_texts
                .get(&outcome.filename)
                .cloned()
                .unwrap_or_default(),
        })
        .collect();

    ReportPayload {
        batch_id: ranking.batch_id,
        status: ranking.status,
        job_title: job.title.clone(),
        job_description: job.description_text.clone(),
        ranking: candidates,
        excluded: ranking.excluded.clone(),
    }
}
