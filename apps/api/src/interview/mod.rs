// AI interview: session state machine, assessment, live-session store, HTTP surface.
// All LLM calls go through llm_client; sessions only see the ChatModel trait.

pub mod assessment;
pub mod handlers;
pub mod prompts;
pub mod repository;
pub mod session;
pub mod store;
