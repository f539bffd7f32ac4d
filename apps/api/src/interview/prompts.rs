// Interview prompt templates.
// All prompts the interview session sends upstream are defined here.

use crate::llm_client::prompts::JSON_ONLY_TRAILER;

/// Interviewer persona. Replace: {position}, {candidate_context}, {job_description}, {max_turns}
pub const INTERVIEWER_SYSTEM_TEMPLATE: &str = r#"You are a seasoned HR interviewer running a professional interview for the {position} role.

CANDIDATE:
{candidate_context}

JOB DESCRIPTION:
{job_description}

YOUR JOB:
1. Hold a natural, conversational HR interview
2. Ask about the candidate's experience, skills and motivation
3. Gauge cultural fit and career goals
4. Stay professional, friendly and encouraging
5. Follow up on what the candidate actually says
6. Cover: background, experience, skills, motivation, career goals
7. Keep each reply short (usually 2-4 sentences)
8. Ask exactly one question per reply

FLOW:
- Open with a warm introduction
- Move through background and experience
- Discuss the skills that matter for this role
- Explore why they want this role
- Wrap up with next steps after {max_turns} questions in total (the introduction counts)

HARD RULE: ONE question at a time. Wait for the candidate's answer before asking the next one."#;

/// Appended as a system entry on the final turn so the model closes the interview.
pub const CLOSING_INSTRUCTION: &str = "Thank the candidate for their time and tell them \
    the team will be in touch about next steps. Keep it brief and professional.";

/// One-shot evaluation prompt. Replace: {position}, {json_trailer}
pub const ASSESSMENT_PROMPT_TEMPLATE: &str = r#"Using the interview conversation above, write a complete assessment of the candidate for the {position} role.

Return a JSON object with this EXACT shape:
{
    "overall_score": <1-100>,
    "skills_match": <1-10>,
    "cultural_fit": <1-10>,
    "communication": <1-10>,
    "motivation": <1-10>,
    "experience_relevance": <1-10>,
    "strengths": ["strength1", "strength2", "strength3"],
    "concerns": ["concern1", "concern2"],
    "recommendation": "Strong Yes | Yes | Maybe | No",
    "summary": "2-3 sentence summary of the candidate"
}

RULES:
- At most 3 strengths and at most 2 concerns
- recommendation must be exactly one of: "Strong Yes", "Yes", "Maybe", "No"

{json_trailer}"#;

pub fn interviewer_system_prompt(
    position: &str,
    candidate_context: &str,
    job_description: &str,
    max_turns: u32,
) -> String {
    INTERVIEWER_SYSTEM_TEMPLATE
        .replace("{position}", position)
        .replace("{candidate_context}", candidate_context)
        .replace("{job_description}", job_description)
        .replace("{max_turns}", &max_turns.to_string())
}

pub fn assessment_prompt(position: &str) -> String {
    ASSESSMENT_PROMPT_TEMPLATE
        .replace("{position}", position)
        .replace("{json_trailer}", JSON_ONLY_TRAILER)
}
