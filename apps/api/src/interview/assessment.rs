//! Assessment: the structured post-interview evaluation record.
//!
//! The model is asked for a fixed JSON shape but is not trusted to produce it.
//! Parsing therefore yields an `AssessmentOutcome`: either a normalized
//! `Assessment` or the raw text the model sent back. Callers persist both.
//!
//! Any valid JSON object carrying a usable `overall_score` is kept. The other
//! fields are read leniently: numeric strings count as scores, a lone string
//! counts as a one-item list, unknown recommendations are dropped.

use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::warn;

use crate::llm_client::strip_json_fences;

/// Score recorded for an assessment the model returned in an unreadable shape.
pub const FALLBACK_SCORE: u32 = 50;
const FALLBACK_ERROR: &str = "parse failed";
const MAX_STRENGTHS: usize = 3;
const MAX_CONCERNS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Recommendation {
    #[serde(rename = "Strong Yes")]
    StrongYes,
    Yes,
    Maybe,
    No,
}

impl Recommendation {
    /// Reads a label case-insensitively, ignoring spaces, `_` and `-`.
    pub fn from_label(label: &str) -> Option<Self> {
        let key: String = label
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "strongyes" => Some(Recommendation::StrongYes),
            "yes" => Some(Recommendation::Yes),
            "maybe" => Some(Recommendation::Maybe),
            "no" => Some(Recommendation::No),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    /// 1 – 100
    pub overall_score: u32,
    // Sub-scores, 1 – 10 each.
    pub skills_match: Option<u32>,
    pub cultural_fit: Option<u32>,
    pub communication: Option<u32>,
    pub motivation: Option<u32>,
    pub experience_relevance: Option<u32>,
    pub strengths: Vec<String>,
    pub concerns: Vec<String>,
    pub recommendation: Option<Recommendation>,
    pub summary: String,
}

impl Assessment {
    /// Builds an assessment from a decoded JSON object. `None` when there is
    /// no usable `overall_score`.
    fn from_object(fields: &Map<String, Value>) -> Option<Self> {
        let overall_score = fields.get("overall_score").and_then(read_score)?;
        let sub_score = |key: &str| fields.get(key).and_then(read_score);

        let assessment = Assessment {
            overall_score,
            skills_match: sub_score("skills_match"),
            cultural_fit: sub_score("cultural_fit"),
            communication: sub_score("communication"),
            motivation: sub_score("motivation"),
            experience_relevance: sub_score("experience_relevance"),
            strengths: fields.get("strengths").map(read_list).unwrap_or_default(),
            concerns: fields.get("concerns").map(read_list).unwrap_or_default(),
            recommendation: fields
                .get("recommendation")
                .and_then(Value::as_str)
                .and_then(Recommendation::from_label),
            summary: fields
                .get("summary")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        };
        Some(assessment.normalized())
    }

    /// Clamps scores into their ranges and trims list fields to their limits.
    fn normalized(mut self) -> Self {
        self.overall_score = self.overall_score.clamp(1, 100);
        for sub in [
            &mut self.skills_match,
            &mut self.cultural_fit,
            &mut self.communication,
            &mut self.motivation,
            &mut self.experience_relevance,
        ] {
            if let Some(score) = sub {
                *score = (*score).clamp(1, 10);
            }
        }
        self.strengths.truncate(MAX_STRENGTHS);
        self.concerns.truncate(MAX_CONCERNS);
        self
    }
}

/// Result of reading the model's assessment text.
///
/// `Unparsed` is not an error: downstream consumers must handle it, and it
/// still carries a score (`FALLBACK_SCORE`) so ranking keeps working.
#[derive(Debug, Clone, PartialEq)]
pub enum AssessmentOutcome {
    Parsed(Assessment),
    Unparsed { raw_text: String },
}

impl AssessmentOutcome {
    /// Parses raw model output. Never fails: unreadable output becomes `Unparsed`.
    pub fn parse(raw: &str) -> Self {
        let text = strip_json_fences(raw);
        let unparsed = || AssessmentOutcome::Unparsed {
            raw_text: text.to_string(),
        };

        let value = match serde_json::from_str::<Value>(text) {
            Ok(value) => value,
            Err(e) => {
                warn!("Assessment response was not valid JSON, keeping raw text: {e}");
                return unparsed();
            }
        };

        match value.as_object().and_then(Assessment::from_object) {
            Some(assessment) => AssessmentOutcome::Parsed(assessment),
            None => {
                warn!("Assessment JSON has no usable overall_score, keeping raw text");
                unparsed()
            }
        }
    }

    pub fn overall_score(&self) -> u32 {
        match self {
            AssessmentOutcome::Parsed(a) => a.overall_score,
            AssessmentOutcome::Unparsed { .. } => FALLBACK_SCORE,
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, AssessmentOutcome::Parsed(_))
    }

    /// The JSON record that gets persisted alongside the interview.
    pub fn to_record(&self) -> Value {
        match self {
            AssessmentOutcome::Parsed(a) => serde_json::to_value(a).unwrap_or_else(|_| {
                json!({ "overall_score": a.overall_score })
            }),
            AssessmentOutcome::Unparsed { raw_text } => json!({
                "overall_score": FALLBACK_SCORE,
                "raw_assessment": raw_text,
                "error": FALLBACK_ERROR,
            }),
        }
    }
}

/// A number, or a string holding one, rounded to a whole non-negative score.
fn read_score(value: &Value) -> Option<u32> {
    let raw = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !raw.is_finite() || raw < 0.0 {
        return None;
    }
    Some(raw.round().min(u32::MAX as f64) as u32)
}

/// A list of strings, or a lone string as a one-item list. Blank items are skipped.
fn read_list(value: &Value) -> Vec<String> {
    let items: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };
    items
        .into_iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
