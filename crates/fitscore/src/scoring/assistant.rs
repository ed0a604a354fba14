use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::breakdown::{
    clamp_points, ScoreBreakdown, FORMATTING_MAX, KEYWORD_COVERAGE_MAX, QUANTIFICATION_MAX,
    READABILITY_MAX, RELEVANCE_MAX,
};
use super::domain::ScoreInput;
use crate::config::AssistantConfig;

/// External service that can grade a candidate against a target.
#[async_trait]
pub trait ScoringAssistant: Send + Sync {
    async fn assess(&self, input: &ScoreInput) -> Result<AssistedAssessment, AssistError>;
}

/// Sub-scores and suggestions as returned by the assistant. Values are untrusted until
/// passed through [`AssistedAssessment::apply`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistedAssessment {
    pub keyword_coverage: f64,
    pub relevance: f64,
    pub quantification: f64,
    pub formatting: f64,
    pub readability: f64,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

impl AssistedAssessment {
    /// Overwrite the points of a locally computed breakdown with the clamped assisted
    /// values. Metadata (matched keywords, bullet counts, grade level) stays local.
    pub fn apply(&self, mut breakdown: ScoreBreakdown) -> ScoreBreakdown {
        breakdown.keyword_coverage.points = clamp_points(self.keyword_coverage, KEYWORD_COVERAGE_MAX);
        breakdown.relevance.points = clamp_points(self.relevance, RELEVANCE_MAX);
        breakdown.quantification.points = clamp_points(self.quantification, QUANTIFICATION_MAX);
        breakdown.formatting.points = clamp_points(self.formatting, FORMATTING_MAX);
        breakdown.readability.points = clamp_points(self.readability, READABILITY_MAX);
        breakdown
    }

    /// Non-empty, trimmed suggestions in the order given.
    pub fn cleaned_suggestions(&self) -> Vec<String> {
        self.suggestions
            .iter()
            .map(|suggestion| suggestion.trim())
            .filter(|suggestion| !suggestion.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AssistError {
    #[error("assistant transport failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("assistant responded with status {0}")]
    Status(u16),
    #[error("assistant response malformed: {0}")]
    Malformed(String),
    #[error("assistant response violates schema: {0}")]
    Schema(#[from] serde_json::Error),
}

const SYSTEM_PROMPT: &str = "You grade how well a resume matches a job posting. \
Respond with a single JSON object and nothing else.";

/// Prompt asking for the five sub-scores in a fixed schema.
pub(crate) fn build_prompt(input: &ScoreInput) -> String {
    let candidate = serde_json::to_string_pretty(&input.candidate)
        .unwrap_or_else(|_| input.candidate_text.clone());
    format!(
        "Score the candidate against the target posting.\n\n\
         Return JSON with exactly these fields:\n\
         - keyword_coverage: integer 0-{KEYWORD_COVERAGE_MAX} (share of posting keywords present in the resume)\n\
         - relevance: integer 0-{RELEVANCE_MAX} (semantic fit of experience to the role)\n\
         - quantification: integer 0-{QUANTIFICATION_MAX} (share of bullets with concrete metrics)\n\
         - formatting: integer 0-{FORMATTING_MAX} (name, contact, summary, experience, skills present and tidy)\n\
         - readability: integer 0-{READABILITY_MAX} (professional reading level)\n\
         - suggestions: array of at most 5 short improvement suggestions\n\n\
         Candidate (structured):\n{candidate}\n\n\
         Candidate (text):\n{}\n\n\
         Target posting:\n{}\n",
        input.candidate_text, input.target_text
    )
}

/// Parse the assistant's message content, tolerating a fenced code block around the JSON.
pub(crate) fn parse_assessment(content: &str) -> Result<AssistedAssessment, AssistError> {
    let trimmed = content.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.trim_end().strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();
    if body.is_empty() {
        return Err(AssistError::Malformed("empty content".to_string()));
    }
    Ok(serde_json::from_str(body)?)
}

fn message_content(response: &Value) -> Result<&str, AssistError> {
    response
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .ok_or_else(|| AssistError::Malformed("missing choices[0].message.content".to_string()))
}

/// Assistant backed by an OpenAI-compatible chat completions endpoint.
pub struct HttpScoringAssistant {
    client: reqwest::Client,
    config: AssistantConfig,
}

impl HttpScoringAssistant {
    pub fn new(config: AssistantConfig) -> Result<Self, AssistError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(connect_timeout(config.timeout))
            .build()?;
        Ok(Self { client, config })
    }
}

const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection setup gets its own, shorter budget; never longer than the whole request.
fn connect_timeout(request_timeout: Duration) -> Duration {
    request_timeout.min(MAX_CONNECT_TIMEOUT)
}

#[async_trait]
impl ScoringAssistant for HttpScoringAssistant {
    async fn assess(&self, input: &ScoreInput) -> Result<AssistedAssessment, AssistError> {
        let body = json!({
            "model": self.config.model,
            "temperature": 0,
            "response_format": { "type": "json_object" },
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": build_prompt(input) },
            ],
        });

        let mut request = self.client.post(&self.config.endpoint).json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AssistError::Status(status.as_u16()));
        }

        let payload: Value = response.json().await?;
        parse_assessment(message_content(&payload)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::deterministic;
    use crate::scoring::domain::CandidateDocument;

    #[test]
    fn parses_plain_and_fenced_json() {
        let raw = r#"{"keyword_coverage": 31, "relevance": 20, "quantification": 9,
                     "formatting": 8, "readability": 10, "suggestions": ["Add metrics"]}"#;
        let plain = parse_assessment(raw).expect("plain json");
        let fenced = parse_assessment(&format!("```json\n{raw}\n```")).expect("fenced json");
        assert_eq!(plain, fenced);
        assert_eq!(plain.suggestions, vec!["Add metrics".to_string()]);
    }

    #[test]
    fn missing_fields_violate_schema() {
        let err = parse_assessment(r#"{"keyword_coverage": 31}"#).expect_err("incomplete");
        assert!(matches!(err, AssistError::Schema(_)));
    }

    #[test]
    fn empty_content_is_malformed() {
        assert!(matches!(parse_assessment("  "), Err(AssistError::Malformed(_))));
    }

    #[test]
    fn extracts_chat_completion_content() {
        let response = json!({"choices": [{"message": {"content": "{}"}}]});
        assert_eq!(message_content(&response).expect("content"), "{}");
        assert!(message_content(&json!({"choices": []})).is_err());
    }

    #[test]
    fn apply_clamps_out_of_contract_points() {
        let input = ScoreInput::new("", CandidateDocument::default(), "");
        let assessment = AssistedAssessment {
            keyword_coverage: 55.0,
            relevance: -3.0,
            quantification: 14.6,
            formatting: 10.0,
            readability: 99.0,
            suggestions: vec!["  ".to_string(), "Lead with impact".to_string()],
        };

        let breakdown = assessment.apply(deterministic::breakdown(&input));
        assert_eq!(breakdown.keyword_coverage.points, 40);
        assert_eq!(breakdown.relevance.points, 0);
        assert_eq!(breakdown.quantification.points, 15);
        assert_eq!(breakdown.formatting.points, 10);
        assert_eq!(breakdown.readability.points, 10);
        assert_eq!(assessment.cleaned_suggestions(), vec!["Lead with impact".to_string()]);
    }

    #[test]
    fn connect_budget_never_exceeds_the_request_budget() {
        assert_eq!(connect_timeout(Duration::from_secs(20)), Duration::from_secs(10));
        assert_eq!(connect_timeout(Duration::from_secs(3)), Duration::from_secs(3));
    }

    #[test]
    fn client_builds_from_config() {
        let assistant = HttpScoringAssistant::new(AssistantConfig {
            endpoint: "http://127.0.0.1:9/v1/chat/completions".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            timeout: Duration::from_secs(2),
        });
        assert!(assistant.is_ok());
    }

    #[test]
    fn prompt_names_every_field() {
        let input = ScoreInput::new("Rust engineer", CandidateDocument::default(), "Hiring Rust");
        let prompt = build_prompt(&input);
        for field in [
            "keyword_coverage",
            "relevance",
            "quantification",
            "formatting",
            "readability",
            "suggestions",
        ] {
            assert!(prompt.contains(field), "prompt missing {field}");
        }
        assert!(prompt.contains("Hiring Rust"));
    }
}
