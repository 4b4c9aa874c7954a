use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::EngineError;

/// A resume as submitted to the engine: a filename plus the plain text an
/// external extraction collaborator produced from the uploaded document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeSubmission {
    pub filename: String,
    pub text: String,
}

impl ResumeSubmission {
    pub fn new(filename: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            text: text.into(),
        }
    }

    /// Wraps the result of an external document-extraction call.
    ///
    /// An unreadable document degrades to an empty submission — downstream
    /// scoring treats empty text as zero overlap, never as a batch-fatal
    /// condition.
    pub fn from_extraction(
        filename: impl Into<String>,
        extracted: Result<String, EngineError>,
    ) -> Self {
        let filename = filename.into();
        match extracted {
            Ok(text) => Self { filename, text },
            Err(e) => {
                warn!("Document extraction failed for {filename}: {e}. Using empty text.");
                Self {
                    filename,
                    text: String::new(),
                }
            }
        }
    }
}

/// Structured resume produced by the text normalizer.
/// Created once per submission and immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeRecord {
    /// Best-effort extracted name; falls back to the filename stem.
    pub candidate_name: String,
    pub filename: String,
    pub raw_text: String,
    pub skills: BTreeSet<String>,
    pub experience: Vec<String>,
    pub education: Vec<String>,
}
