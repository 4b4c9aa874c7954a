//! Text Normalizer — turns raw extracted resume text into a structured record.
//!
//! Normalization never fails: empty or unrecognizable input yields a record
//! with empty collections, which downstream scoring treats as zero overlap.

use std::collections::BTreeSet;

use crate::models::ResumeRecord;

/// Built-in skill ontology used when a resume has no explicit skills section
/// and when scanning job descriptions for required skills.
pub const SKILL_ONTOLOGY: &[&str] = &[
    "Python",
    "Java",
    "C++",
    "JavaScript",
    "TypeScript",
    "Rust",
    "Go",
    "SQL",
    "HTML",
    "CSS",
    "React.js",
    "Flask",
    "RESTful APIs",
    "MongoDB",
    "MySQL",
    "PostgreSQL",
    "Docker",
    "Kubernetes",
    "AWS",
    "Azure",
    "Google Cloud Run",
    "Firebase",
    "Git",
    "CI/CD",
    "Machine Learning",
    "Deep Learning",
    "NLP",
    "Generative AI",
    "LLM Fine-Tuning",
    "RAG",
    "Transformers",
    "TensorFlow",
    "PyTorch",
    "Scikit-learn",
    "OpenCV",
    "Hugging Face",
    "LangChain",
    "Pandas",
    "Microservices",
    "Distributed Systems",
    "Data Structures and Algorithms",
    "Object Oriented Programming",
    "Computer Networks",
    "Operating Systems",
    "Database Management",
];

/// Canonical section names with their heading synonyms (all compared
/// lowercase with trailing colons stripped).
const SECTION_SYNONYMS: &[(&str, &[&str])] = &[
    (
        "experience",
        &[
            "experience",
            "work experience",
            "employment history",
            "professional experience",
            "work history",
        ],
    ),
    (
        "education",
        &["education", "academic background", "academics"],
    ),
    (
        "skills",
        &[
            "skills",
            "technical skills",
            "core competencies",
            "technologies",
        ],
    ),
    ("projects", &["projects", "personal projects"]),
];

/// Normalizes raw resume text into a `ResumeRecord`.
pub fn normalize(raw_text: &str, filename: &str) -> ResumeRecord {
    let sections = detect_sections(raw_text);

    let skills_section = section_text(&sections, "skills");
    let skills = if skills_section.is_empty() {
        // No explicit skills section: fall back to a dictionary scan of
        // the whole document.
        ontology_scan(raw_text)
    } else {
        extract_skills(&skills_section)
    };

    ResumeRecord {
        candidate_name: extract_name(raw_text).unwrap_or_else(|| filename_stem(filename)),
        filename: filename.to_string(),
        raw_text: raw_text.to_string(),
        skills,
        experience: extract_experience(&section_text(&sections, "experience")),
        education: nonempty_lines(&section_text(&sections, "education")),
    }
}

/// Splits text into named sections by scanning for heading lines.
/// Lines before the first recognized heading land in a "header" bucket.
fn detect_sections(text: &str) -> Vec<(&'static str, String)> {
    let mut sections: Vec<(&'static str, String)> = Vec::new();
    let mut current: &'static str = "header";
    let mut buffer: Vec<&str> = Vec::new();

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let normalized = line.trim_end_matches(':').trim().to_lowercase();
        let heading = SECTION_SYNONYMS
            .iter()
            .find(|(_, synonyms)| synonyms.contains(&normalized.as_str()))
            .map(|(name, _)| *name);

        match heading {
            Some(name) => {
                if !buffer.is_empty() {
                    sections.push((current, buffer.join("\n")));
                }
                current = name;
                buffer = Vec::new();
            }
            None => buffer.push(line),
        }
    }
    if !buffer.is_empty() {
        sections.push((current, buffer.join("\n")));
    }
    sections
}

fn section_text(sections: &[(&'static str, String)], name: &str) -> String {
    sections
        .iter()
        .filter(|(sec, _)| *sec == name)
        .map(|(_, body)| body.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// First-line heuristic: a short title-cased line without an email or digits
/// is taken as the candidate name. Scans at most the first few lines.
fn extract_name(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .take(5)
        .find(|l| looks_like_name(l))
        .map(String::from)
}

fn looks_like_name(line: &str) -> bool {
    let word_count = line.split_whitespace().count();
    (1..4).contains(&word_count)
        && line.len() < 60
        && !line.contains('@')
        && !line.chars().any(|c| c.is_ascii_digit())
        && line
            .split_whitespace()
            .all(|w| w.chars().next().is_some_and(|c| c.is_uppercase()))
}

/// Derives a default candidate name from the filename: stem without the
/// extension, underscores and hyphens flattened to spaces.
fn filename_stem(filename: &str) -> String {
    let stem = filename.rsplit_once('.').map_or(filename, |(s, _)| s);
    stem.replace(['_', '-'], " ").trim().to_string()
}

/// Pulls skills from an explicit skills section: comma/bullet-separated
/// values, with any `Label:` prefix per line dropped, then matched against
/// the ontology to canonicalize spelling.
fn extract_skills(section: &str) -> BTreeSet<String> {
    let mut candidates: Vec<String> = Vec::new();
    for line in section.lines() {
        let content = line.rsplit_once(':').map_or(line, |(_, rest)| rest);
        for part in content.split([',', ';', '•', '|']) {
            let cleaned = part.trim().trim_start_matches('-').trim();
            if !cleaned.is_empty() {
                candidates.push(cleaned.to_string());
            }
        }
    }

    let mut skills = BTreeSet::new();
    for candidate in &candidates {
        let lower = candidate.to_lowercase();
        match SKILL_ONTOLOGY
            .iter()
            .find(|term| term.to_lowercase() == lower || lower.contains(&term.to_lowercase()))
        {
            Some(term) => {
                skills.insert((*term).to_string());
            }
            // Keep unrecognized entries verbatim — a niche skill listed in a
            // skills section is still evidence.
            None => {
                skills.insert(candidate.clone());
            }
        }
    }
    skills
}

/// Dictionary-based fallback: every ontology term that appears anywhere in
/// the text counts as a skill.
pub fn ontology_scan(text: &str) -> BTreeSet<String> {
    let lower = text.to_lowercase();
    SKILL_ONTOLOGY
        .iter()
        .filter(|term| lower.contains(&term.to_lowercase()))
        .map(|term| (*term).to_string())
        .collect()
}

/// Groups experience lines into entries: a non-bullet line starts a new
/// entry, bullet lines attach to the current one.
fn extract_experience(section: &str) -> Vec<String> {
    let mut entries = Vec::new();
    let mut current = String::new();

    for line in section.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if line.starts_with('•') || line.starts_with('-') || line.starts_with('*') {
            current.push('\n');
            current.push_str(line);
        } else {
            if !current.is_empty() {
                entries.push(current.trim().to_string());
            }
            current = line.to_string();
        }
    }
    if !current.is_empty() {
        entries.push(current.trim().to_string());
    }
    entries
}

fn nonempty_lines(section: &str) -> Vec<String> {
    section
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RESUME: &str = "\
Jane Doe
jane.doe@example.com

Work Experience:
Backend Engineer, Acme Corp
• Built distributed ingestion pipeline in Rust
• Cut p99 latency by 40%
Software Engineer, Widgets Inc

Education
B.S. Computer Science, State University

Technical Skills
Languages: Rust, Python, SQL
Docker, Kubernetes
";

    #[test]
    fn test_sections_detected_with_synonyms() {
        let sections = detect_sections(SAMPLE_RESUME);
        let names: Vec<&str> = sections.iter().map(|(n, _)| *n).collect();
        assert!(names.contains(&"experience"));
        assert!(names.contains(&"education"));
        assert!(names.contains(&"skills"));
    }

    #[test]
    fn test_full_normalization() {
        let record = normalize(SAMPLE_RESUME, "jane_doe.pdf");
        assert_eq!(record.candidate_name, "Jane Doe");
        assert_eq!(record.filename, "jane_doe.pdf");
        assert!(record.skills.contains("Rust"));
        assert!(record.skills.contains("Python"));
        assert!(record.skills.contains("Docker"));
        assert!(record.skills.contains("Kubernetes"));
        assert_eq!(record.experience.len(), 2);
        assert!(record.experience[0].contains("distributed ingestion"));
        assert_eq!(record.education.len(), 1);
    }

    #[test]
    fn test_empty_input_yields_empty_record() {
        let record = normalize("", "empty-resume.txt");
        assert_eq!(record.candidate_name, "empty resume");
        assert!(record.skills.is_empty());
        assert!(record.experience.is_empty());
        assert!(record.education.is_empty());
    }

    #[test]
    fn test_name_falls_back_past_email_first_line() {
        let text = "jane@example.com\nJane Doe\nExperience\nSomething";
        let record = normalize(text, "r.pdf");
        assert_eq!(record.candidate_name, "Jane Doe");
    }

    #[test]
    fn test_name_defaults_to_filename_stem() {
        let text = "contact: someone@example.com\n555 123 4567";
        let record = normalize(text, "strong_candidate.docx");
        assert_eq!(record.candidate_name, "strong candidate");
    }

    #[test]
    fn test_skills_fallback_scans_whole_text() {
        // No skills section at all — ontology terms in prose still count.
        let text = "John Smith\nI have five years of Python and Docker experience.";
        let record = normalize(text, "john.pdf");
        assert!(record.skills.contains("Python"));
        assert!(record.skills.contains("Docker"));
    }

    #[test]
    fn test_unknown_skill_in_section_kept_verbatim() {
        let text = "Jane Doe\nSkills\nZig, Rust";
        let record = normalize(text, "jane.pdf");
        assert!(record.skills.contains("Zig"));
        assert!(record.skills.contains("Rust"));
    }

    #[test]
    fn test_experience_bullets_group_under_role_line() {
        let section = "Engineer, Acme\n• did a thing\n• did another\nManager, Other";
        let entries = extract_experience(section);
        assert_eq!(entries.len(), 2);
        assert!(entries[0].contains("did another"));
        assert!(entries[1].starts_with("Manager"));
    }

    #[test]
    fn test_filename_stem_strips_extension_and_separators() {
        assert_eq!(filename_stem("ada-lovelace_cv.pdf"), "ada lovelace cv");
        assert_eq!(filename_stem("plain"), "plain");
    }
}
