pub mod embedding;
pub mod fusion;
pub mod prompts;
pub mod reasoning;
pub mod similarity;
