// Shared prompt fragments.
// Each module that needs LLM calls defines its own prompts.rs alongside it.

/// Trailer appended to every prompt that expects a bare JSON answer.
pub const JSON_ONLY_TRAILER: &str = "Return ONLY the JSON, no other text.";
