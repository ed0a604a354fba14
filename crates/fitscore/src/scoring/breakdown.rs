use serde::{Deserialize, Serialize};

pub const KEYWORD_COVERAGE_MAX: u8 = 40;
pub const RELEVANCE_MAX: u8 = 25;
pub const QUANTIFICATION_MAX: u8 = 15;
pub const FORMATTING_MAX: u8 = 10;
pub const READABILITY_MAX: u8 = 10;

pub const MAX_SUGGESTIONS: usize = 5;

/// Scale `numerator / denominator` onto `[0, max]`, treating an empty denominator as zero.
pub(crate) fn proportional_points(max: u8, numerator: usize, denominator: usize) -> u8 {
    if denominator == 0 {
        return 0;
    }
    let ratio = numerator.min(denominator) as f64 / denominator as f64;
    (f64::from(max) * ratio).round() as u8
}

/// Round an untrusted value into `[0, max]`.
pub(crate) fn clamp_points(value: f64, max: u8) -> u8 {
    if !value.is_finite() {
        return 0;
    }
    value.round().clamp(0.0, f64::from(max)) as u8
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordCoverage {
    pub points: u8,
    pub max_points: u8,
    pub matched: usize,
    pub total: usize,
    pub missing: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelevanceSignal {
    KeywordProxy,
    Embedding,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relevance {
    pub points: u8,
    pub max_points: u8,
    pub signal: RelevanceSignal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quantification {
    pub points: u8,
    pub max_points: u8,
    pub quantified: usize,
    pub total_bullets: usize,
}

/// Formatting problem detected on the structured profile, with its fixed deduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormattingIssue {
    MissingName,
    MissingContact,
    MissingSummary,
    ShortSummary,
    EmptyExperience,
    MissingSkills,
    BulletLength,
}

impl FormattingIssue {
    pub const fn deduction(self) -> u8 {
        match self {
            FormattingIssue::MissingName
            | FormattingIssue::MissingContact
            | FormattingIssue::MissingSummary
            | FormattingIssue::ShortSummary
            | FormattingIssue::EmptyExperience => 2,
            FormattingIssue::MissingSkills | FormattingIssue::BulletLength => 1,
        }
    }

    pub const fn advice(self) -> &'static str {
        match self {
            FormattingIssue::MissingName => "Add your full name at the top of the document",
            FormattingIssue::MissingContact => "Add an e-mail address or phone number",
            FormattingIssue::MissingSummary => "Add a short professional summary",
            FormattingIssue::ShortSummary => {
                "Expand your summary to two or three sentences about your focus and impact"
            }
            FormattingIssue::EmptyExperience => "List at least one role under experience",
            FormattingIssue::MissingSkills => "Add a skills section",
            FormattingIssue::BulletLength => {
                "Keep each experience bullet to one or two lines (roughly 30 to 220 characters)"
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Formatting {
    pub points: u8,
    pub max_points: u8,
    pub issues: Vec<FormattingIssue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadabilityBand {
    Professional,
    Acceptable,
    Outside,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Readability {
    pub points: u8,
    pub max_points: u8,
    pub grade_level: f32,
    pub band: ReadabilityBand,
}

/// Five weighted sub-scores behind an overall match score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub keyword_coverage: KeywordCoverage,
    pub relevance: Relevance,
    pub quantification: Quantification,
    pub formatting: Formatting,
    pub readability: Readability,
}

impl ScoreBreakdown {
    /// `(name, points, max_points)` for every sub-score, in weight order.
    pub fn sub_scores(&self) -> [(&'static str, u8, u8); 5] {
        [
            (
                "keyword_coverage",
                self.keyword_coverage.points,
                self.keyword_coverage.max_points,
            ),
            ("relevance", self.relevance.points, self.relevance.max_points),
            (
                "quantification",
                self.quantification.points,
                self.quantification.max_points,
            ),
            ("formatting", self.formatting.points, self.formatting.max_points),
            (
                "readability",
                self.readability.points,
                self.readability.max_points,
            ),
        ]
    }

    pub fn overall(&self) -> u8 {
        self.sub_scores()
            .iter()
            .map(|(_, points, _)| *points)
            .sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringStrategy {
    Assisted,
    Deterministic,
}

/// Scored match between one candidate and one target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub overall: u8,
    pub breakdown: ScoreBreakdown,
    pub suggestions: Vec<String>,
    pub strategy: ScoringStrategy,
}

impl ScoreResult {
    pub(crate) fn new(
        breakdown: ScoreBreakdown,
        mut suggestions: Vec<String>,
        strategy: ScoringStrategy,
    ) -> Self {
        suggestions.truncate(MAX_SUGGESTIONS);
        Self {
            overall: breakdown.overall(),
            breakdown,
            suggestions,
            strategy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_sum_to_one_hundred() {
        let total: u32 = [
            KEYWORD_COVERAGE_MAX,
            RELEVANCE_MAX,
            QUANTIFICATION_MAX,
            FORMATTING_MAX,
            READABILITY_MAX,
        ]
        .iter()
        .map(|max| u32::from(*max))
        .sum();
        assert_eq!(total, 100);
    }

    #[test]
    fn proportional_points_guards_empty_denominator() {
        assert_eq!(proportional_points(40, 0, 0), 0);
        assert_eq!(proportional_points(40, 3, 4), 30);
        assert_eq!(proportional_points(15, 1, 3), 5);
    }

    #[test]
    fn clamp_points_rejects_out_of_contract_values() {
        assert_eq!(clamp_points(73.0, 40), 40);
        assert_eq!(clamp_points(-4.0, 10), 0);
        assert_eq!(clamp_points(f64::NAN, 10), 0);
        assert_eq!(clamp_points(12.6, 25), 13);
    }
}
