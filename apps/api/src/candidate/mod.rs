// Candidate side: CV intake and the profile the interviewer is briefed with.
// All LLM calls go through llm_client.

pub mod cv;
pub mod handlers;
pub mod profile;
pub mod prompts;
pub mod repository;
