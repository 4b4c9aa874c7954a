// All LLM prompt constants for the reasoning scorer.

/// System prompt for candidate-job fit analysis — enforces JSON-only output.
pub const REASONING_SYSTEM: &str = "You are an expert technical recruiter \
    analyzing how well a candidate fits a job description. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Reasoning prompt template. Replace `{candidate_name}`, `{skills}`,
/// `{experience}`, `{education}`, and `{job_text}` before sending.
pub const REASONING_PROMPT_TEMPLATE: &str = r#"Analyze the candidate below against the job description and return a JSON object with this EXACT schema (no extra fields):
{
  "match_score": <integer 0-100>,
  "strengths": ["specific strength drawn from the resume"],
  "gaps": ["specific requirement the candidate does not cover"],
  "justification": "<one short professional paragraph>"
}

Rules:
- match_score reflects overall fit: seniority, domain relevance, and skill coverage.
- strengths and gaps must reference concrete evidence, not generic traits.
- Do not invent experience the candidate did not list.

CANDIDATE:
Name: {candidate_name}
Skills: {skills}
Experience: {experience}
Education: {education}

JOB DESCRIPTION:
{job_text}"#;
