use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A job description parsed into the fields the scoring pipeline needs.
/// Immutable once created; shared read-only across candidate pipelines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobProfile {
    pub title: Option<String>,
    pub description_text: String,
    /// Skills detected in the description against the built-in ontology.
    /// May be empty — gap fallback then has nothing to subtract against.
    pub required_skills: BTreeSet<String>,
}

/// Handle returned by `submit_job`. Owns its profile outright so every
/// batch call threads the job explicitly — there is no session state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobHandle {
    pub id: Uuid,
    pub profile: JobProfile,
}
