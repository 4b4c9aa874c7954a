//! Reasoning Scorer — the single point of entry for all reasoning-service
//! calls in the engine.
//!
//! ARCHITECTURAL RULE: no other module may call the reasoning API directly.
//! The verdict is parsed into a strict schema; any violation (non-JSON body,
//! missing field, out-of-range score) is a rejection, never coerced or
//! clamped — clamping would silently trust a malformed model output.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::ProviderError;
use crate::models::{JobProfile, ResumeRecord};
use crate::scoring::prompts::{REASONING_PROMPT_TEMPLATE, REASONING_SYSTEM};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for all reasoning calls.
/// Intentionally hardcoded to prevent accidental drift between batches.
pub const REASONING_MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 1024;
/// Exactly one retry, and only on transient transport failure. A response
/// that failed validation is not retried — it is not transient.
const MAX_RETRIES: u32 = 1;
/// Upper bound on the strengths and gaps lists kept from a verdict.
const MAX_LIST_ITEMS: usize = 8;
/// Experience entries included in the prompt, per the request contract.
const PROMPT_EXPERIENCE_ENTRIES: usize = 3;

/// A validated verdict from the reasoning service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasoningVerdict {
    /// Integer 0–100, validated on parse.
    pub match_score: u32,
    pub strengths: Vec<String>,
    pub gaps: Vec<String>,
    pub justification: String,
}

/// Capability interface for qualitative candidate-job scoring.
/// Production uses the network client; tests substitute deterministic stubs
/// behind the identical contract.
#[async_trait]
pub trait ReasoningScorer: Send + Sync {
    async fn score(
        &self,
        resume: &ResumeRecord,
        job: &JobProfile,
    ) -> Result<ReasoningVerdict, ProviderError>;
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

impl AnthropicResponse {
    fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

/// Network client for the reasoning service.
#[derive(Clone)]
pub struct HttpReasoningClient {
    client: Client,
    api_key: String,
}

impl HttpReasoningClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(60))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }

    async fn call_once(&self, prompt: &str) -> Result<String, ProviderError> {
        let request_body = AnthropicRequest {
            model: REASONING_MODEL,
            max_tokens: MAX_TOKENS,
            system: REASONING_SYSTEM,
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: AnthropicResponse = response.json().await?;
        debug!(
            "Reasoning call succeeded: input_tokens={}, output_tokens={}",
            body.usage.input_tokens, body.usage.output_tokens
        );

        body.text()
            .map(str::to_string)
            .ok_or(ProviderError::EmptyContent)
    }

    async fn call_with_retry(&self, prompt: &str) -> Result<String, ProviderError> {
        let mut attempt = 0;
        loop {
            match self.call_once(prompt).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_transient() && attempt < MAX_RETRIES => {
                    attempt += 1;
                    warn!("Reasoning call failed transiently ({e}), retry {attempt}/{MAX_RETRIES}");
                    tokio::time::sleep(std::time::Duration::from_millis(500)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[async_trait]
impl ReasoningScorer for HttpReasoningClient {
    async fn score(
        &self,
        resume: &ResumeRecord,
        job: &JobProfile,
    ) -> Result<ReasoningVerdict, ProviderError> {
        let prompt = build_reasoning_prompt(resume, job);
        let text = self.call_with_retry(&prompt).await?;
        parse_verdict(&text)
    }
}

/// Builds the deterministic request payload: identical resume and job inputs
/// always produce an identical prompt.
pub fn build_reasoning_prompt(resume: &ResumeRecord, job: &JobProfile) -> String {
    let skills = resume
        .skills
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    let experience = resume
        .experience
        .iter()
        .take(PROMPT_EXPERIENCE_ENTRIES)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" | ");
    let education = resume
        .education
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" | ");

    REASONING_PROMPT_TEMPLATE
        .replace("{candidate_name}", &resume.candidate_name)
        .replace("{skills}", &skills)
        .replace("{experience}", &experience)
        .replace("{education}", &education)
        .replace("{job_text}", &job.description_text)
}

// Verdict fields as they arrive off the wire, before range validation.
#[derive(Debug, Deserialize)]
struct RawVerdict {
    match_score: i64,
    strengths: Vec<String>,
    gaps: Vec<String>,
    justification: String,
}

/// Parses and validates a reasoning response body.
///
/// The service is instructed to return bare JSON, but models are known to
/// wrap it in prose or code fences; the first balanced JSON object in the
/// body is taken. Missing fields and out-of-range scores are rejections.
pub fn parse_verdict(body: &str) -> Result<ReasoningVerdict, ProviderError> {
    let json = extract_json_object(body).ok_or_else(|| {
        ProviderError::Validation("response contains no JSON object".to_string())
    })?;

    let raw: RawVerdict = serde_json::from_str(json)?;

    if !(0..=100).contains(&raw.match_score) {
        return Err(ProviderError::Validation(format!(
            "match_score {} outside 0-100",
            raw.match_score
        )));
    }

    let mut strengths = raw.strengths;
    strengths.truncate(MAX_LIST_ITEMS);
    let mut gaps = raw.gaps;
    gaps.truncate(MAX_LIST_ITEMS);

    Ok(ReasoningVerdict {
        match_score: raw.match_score as u32,
        strengths,
        gaps,
        justification: raw.justification,
    })
}

/// Returns the first balanced `{...}` object in `text`, tolerating
/// surrounding prose and code fences. Braces inside JSON strings are
/// ignored.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}
