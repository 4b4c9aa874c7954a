//! Cosine similarity between job and resume embedding vectors.
//!
//! The raw cosine lives in [-1, 1]; `similarity` rescales it to [0, 1] here
//! and only here — callers never re-apply the rescale.

/// Raw cosine similarity. `None` when the vectors differ in dimension or
/// either has zero magnitude — a zero vector has no direction to compare.
pub fn cosine(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }

    let mut dot = 0.0_f64;
    let mut norm_a = 0.0_f64;
    let mut norm_b = 0.0_f64;
    for (x, y) in a.iter().zip(b) {
        dot += f64::from(*x) * f64::from(*y);
        norm_a += f64::from(*x) * f64::from(*x);
        norm_b += f64::from(*y) * f64::from(*y);
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return None;
    }

    Some((dot / (norm_a.sqrt() * norm_b.sqrt())) as f32)
}

/// Similarity rescaled to [0, 1] via `(cosine + 1) / 2`.
pub fn similarity(job: &[f32], resume: &[f32]) -> Option<f32> {
    cosine(job, resume).map(|c| ((c + 1.0) / 2.0).clamp(0.0, 1.0))
}
