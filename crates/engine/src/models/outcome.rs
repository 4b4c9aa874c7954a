use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A scored candidate — the unit that is ranked and serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub candidate_name: String,
    pub filename: String,
    /// Always defined: fusion guarantees a fallback whenever at least one
    /// signal is available, and double failures never produce an outcome.
    pub final_score: u32,
    pub justification: String,
    pub strengths: Vec<String>,
    pub gaps: Vec<String>,
}

/// A candidate dropped from the ranking, with the reason recorded as data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExcludedCandidate {
    pub candidate_name: String,
    pub filename: String,
    pub reason: String,
}

/// Terminal batch status.
///
/// `Partial` distinguishes "some candidates failed to score" from both
/// `Completed` (everyone scored) and `Failed` (nobody did).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchStatus {
    Completed,
    Partial,
    Failed,
}

/// Final result of a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingResult {
    pub batch_id: Uuid,
    pub status: BatchStatus,
    /// Descending final_score, filename ascending on ties, truncated to top_k.
    pub ranked: Vec<MatchOutcome>,
    pub excluded: Vec<ExcludedCandidate>,
    /// Raw resume text for every ranked candidate, retained so a report
    /// can be regenerated without re-running the batch.
    pub raw_texts: BTreeMap<String, String>,
}
