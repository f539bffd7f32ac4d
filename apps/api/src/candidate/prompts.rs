// Candidate profile prompt templates.

pub const PROFILE_EXTRACT_SYSTEM: &str = "\
You are a CV parsing assistant. \
Extract the candidate's details from CV text and return them as JSON. \
You MUST respond with valid JSON only. No markdown fences, no explanations. \
Never invent details that are not in the CV; use empty strings or empty lists instead.";

/// Replace: {cv_text}, {json_trailer}
pub const PROFILE_EXTRACT_PROMPT: &str = r#"Extract the following information from this CV and return a JSON object with this EXACT structure:

{
  "name": "string",
  "email": "string",
  "phone": "string",
  "current_position": "string",
  "years_of_experience": 0.0,
  "skills": ["skill1", "skill2"],
  "education": [{"degree": "string", "institution": "string", "year": "string"}],
  "work_history": [{"position": "string", "company": "string", "duration": "string", "description": "string"}],
  "certifications": ["cert1"],
  "languages": ["lang1"]
}

CV TEXT:
{cv_text}

{json_trailer}"#;
