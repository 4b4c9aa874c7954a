//! Score Fusion — combines the similarity and reasoning signals into one
//! comparable 0–100 score.
//!
//! | similarity | reasoning | final_score                          |
//! |-----------|-----------|---------------------------------------|
//! | present   | present   | round(w_s * S * 100 + w_r * R)        |
//! | present   | absent    | round(S * 100), generic justification |
//! | absent    | present   | R, verdict justification              |
//! | absent    | absent    | no outcome — candidate excluded       |
//!
//! A double failure yields `None` rather than a zero score: ranking an
//! unscored candidate below legitimately low-scoring ones would conflate
//! "failed to score" with "scored badly".

use crate::config::FusionWeights;
use crate::scoring::reasoning::ReasoningVerdict;

/// Justification used when only the similarity signal is available.
pub const SIMILARITY_ONLY_JUSTIFICATION: &str =
    "Similarity-only score; reasoning service unavailable.";

/// The fused signal for one candidate, before identity fields are attached.
#[derive(Debug, Clone, PartialEq)]
pub struct FusedScore {
    pub final_score: u32,
    pub justification: String,
    pub strengths: Vec<String>,
    pub gaps: Vec<String>,
}

/// Fuses the two signals. `similarity` is in [0, 1] when present.
/// Returns `None` only when both signals are unavailable.
pub fn fuse(
    weights: FusionWeights,
    similarity: Option<f32>,
    reasoning: Option<&ReasoningVerdict>,
) -> Option<FusedScore> {
    match (similarity, reasoning) {
        (Some(s), Some(verdict)) => {
            let blended = weights.similarity * f64::from(s) * 100.0
                + weights.reasoning * f64::from(verdict.match_score);
            Some(FusedScore {
                final_score: blended.round() as u32,
                justification: verdict.justification.clone(),
                strengths: verdict.strengths.clone(),
                gaps: verdict.gaps.clone(),
            })
        }
        (Some(s), None) => Some(FusedScore {
            final_score: (f64::from(s) * 100.0).round() as u32,
            justification: SIMILARITY_ONLY_JUSTIFICATION.to_string(),
            strengths: Vec::new(),
            gaps: Vec::new(),
        }),
        (None, Some(verdict)) => Some(FusedScore {
            final_score: verdict.match_score,
            justification: verdict.justification.clone(),
            strengths: verdict.strengths.clone(),
            gaps: verdict.gaps.clone(),
        }),
        (None, None) => None,
    }
}
