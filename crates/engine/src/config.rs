use anyhow::{Context, Result};
use std::time::Duration;

/// Relative weights for fusing the similarity and reasoning signals.
///
/// Defaults favor reasoning (0.6) over similarity (0.4): the reasoning
/// verdict captures contextual fit that vector similarity alone misses.
/// Both weights must be non-negative and sum to 1.0.
#[derive(Debug, Clone, Copy)]
pub struct FusionWeights {
    pub similarity: f64,
    pub reasoning: f64,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            similarity: 0.4,
            reasoning: 0.6,
        }
    }
}

impl FusionWeights {
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.similarity >= 0.0 && self.reasoning >= 0.0,
            "fusion weights must be non-negative (similarity={}, reasoning={})",
            self.similarity,
            self.reasoning
        );
        anyhow::ensure!(
            (self.similarity + self.reasoning - 1.0).abs() < 1e-9,
            "fusion weights must sum to 1.0 (similarity={}, reasoning={})",
            self.similarity,
            self.reasoning
        );
        Ok(())
    }
}

/// Engine configuration loaded from environment variables.
/// Missing credentials fail here, at startup — never mid-batch.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub gemini_api_key: String,
    pub fusion_weights: FusionWeights,
    /// Upper bound on concurrently running candidate pipelines.
    /// The sole backpressure mechanism against the reasoning service.
    pub max_concurrency: usize,
    /// Deadline for an entire batch. Candidates still in flight when it
    /// expires are treated as provider failures.
    pub batch_timeout: Duration,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let fusion_weights = FusionWeights {
            similarity: optional_env_f64("SIMILARITY_WEIGHT", 0.4)?,
            reasoning: optional_env_f64("REASONING_WEIGHT", 0.6)?,
        };
        fusion_weights.validate()?;

        let max_concurrency = std::env::var("MAX_CONCURRENCY")
            .unwrap_or_else(|_| "4".to_string())
            .parse::<usize>()
            .context("MAX_CONCURRENCY must be a positive integer")?;
        anyhow::ensure!(max_concurrency >= 1, "MAX_CONCURRENCY must be >= 1");

        let batch_timeout_secs = std::env::var("BATCH_TIMEOUT_SECS")
            .unwrap_or_else(|_| "120".to_string())
            .parse::<u64>()
            .context("BATCH_TIMEOUT_SECS must be a positive integer")?;

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            fusion_weights,
            max_concurrency,
            batch_timeout: Duration::from_secs(batch_timeout_secs),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env_f64(key: &str, default: f64) -> Result<f64> {
    match std::env::var(key) {
        Ok(v) => v
            .parse::<f64>()
            .with_context(|| format!("{key} must be a number")),
        Err(_) => Ok(default),
    }
}
