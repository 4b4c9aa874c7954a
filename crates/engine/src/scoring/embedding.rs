//! Embedding Provider — turns text into fixed-length semantic vectors.
//!
//! The production client calls the Gemini `embedContent` API. Failures are
//! returned as errors for the pipeline to record as "unavailable" — never a
//! zero vector, which would silently bias similarity toward the midpoint.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::ProviderError;

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
/// The embedding model used for all similarity scoring.
/// Intentionally hardcoded: mixing vectors from different models in one
/// batch would make cosine scores incomparable.
pub const EMBEDDING_MODEL: &str = "text-embedding-004";
/// Chunking threshold in characters. Text beyond this is split and the
/// chunk vectors averaged, rather than the request being rejected.
const MAX_CHUNK_CHARS: usize = 8000;

/// Capability interface for embedding generation. Deterministic for
/// identical input under a fixed model; tests substitute stubs.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedContentRequest<'a> {
    content: Content<'a>,
    task_type: &'a str,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedContentResponse {
    embedding: EmbeddingValues,
}

#[derive(Debug, Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

/// Gemini embedding client.
#[derive(Clone)]
pub struct GeminiEmbeddingClient {
    client: Client,
    api_key: String,
}

impl GeminiEmbeddingClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }

    async fn embed_chunk(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        let request = EmbedContentRequest {
            content: Content {
                parts: vec![Part { text }],
            },
            task_type: "RETRIEVAL_DOCUMENT",
        };

        let url = format!(
            "{GEMINI_API_URL}/models/{EMBEDDING_MODEL}:embedContent?key={}",
            self.api_key
        );
        debug!("Embedding chunk of {} chars", text.len());

        let response = self.client.post(&url).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: EmbedContentResponse = response.json().await?;
        if body.embedding.values.is_empty() {
            return Err(ProviderError::EmptyContent);
        }
        Ok(body.embedding.values)
    }
}

#[async_trait]
impl EmbeddingProvider for GeminiEmbeddingClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        let chunks = chunk_text(text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(ProviderError::EmptyContent);
        }

        let mut vectors = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            vectors.push(self.embed_chunk(chunk).await?);
        }
        average_vectors(&vectors).ok_or(ProviderError::EmptyContent)
    }
}

/// Splits text into chunks of at most `max_chars` characters, breaking on
/// char boundaries.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let chars: Vec<char> = trimmed.chars().collect();
    chars
        .chunks(max_chars)
        .map(|c| c.iter().collect())
        .collect()
}

/// Element-wise mean of equal-length vectors. `None` when the input is
/// empty or dimensions disagree.
pub fn average_vectors(vectors: &[Vec<f32>]) -> Option<Vec<f32>> {
    let first = vectors.first()?;
    let dim = first.len();
    if vectors.iter().any(|v| v.len() != dim) {
        return None;
    }

    let mut sums = vec![0.0_f64; dim];
    for vector in vectors {
        for (sum, value) in sums.iter_mut().zip(vector) {
            *sum += f64::from(*value);
        }
    }
    let count = vectors.len() as f64;
    Some(sums.into_iter().map(|s| (s / count) as f32).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_single_chunk() {
        let chunks = chunk_text("hello world", 100);
        assert_eq!(chunks, vec!["hello world".to_string()]);
    }

    #[test]
    fn test_long_text_is_split_on_char_boundaries() {
        let text = "ab".repeat(10); // 20 chars
        let chunks = chunk_text(&text, 7);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].chars().count(), 7);
        assert_eq!(chunks[2].chars().count(), 6);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_multibyte_text_chunks_cleanly() {
        let text = "é".repeat(10);
        let chunks = chunk_text(&text, 4);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_empty_text_yields_no_chunks() {
        assert!(chunk_text("   \n ", 10).is_empty());
    }

    #[test]
    fn test_average_of_two_vectors() {
        let avg = average_vectors(&[vec![1.0, 3.0], vec![3.0, 1.0]]).unwrap();
        assert_eq!(avg, vec![2.0, 2.0]);
    }

    #[test]
    fn test_average_of_single_vector_is_identity() {
        let avg = average_vectors(&[vec![0.25, -0.5]]).unwrap();
        assert_eq!(avg, vec![0.25, -0.5]);
    }

    #[test]
    fn test_average_rejects_dimension_mismatch() {
        assert!(average_vectors(&[vec![1.0], vec![1.0, 2.0]]).is_none());
    }

    #[test]
    fn test_average_of_nothing_is_none() {
        assert!(average_vectors(&[]).is_none());
    }
}
