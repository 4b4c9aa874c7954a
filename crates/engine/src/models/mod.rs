pub mod job;
pub mod outcome;
pub mod resume;

pub use job::{JobHandle, JobProfile};
pub use outcome::{BatchStatus, ExcludedCandidate, MatchOutcome, RankingResult};
pub use resume::{ResumeRecord, ResumeSubmission};
