//! Local heuristics behind the fallback scoring strategy. Everything here is a pure
//! function of the [`ScoreInput`].

pub(crate) mod formatting;
pub(crate) mod keywords;
pub(crate) mod quantification;
pub(crate) mod readability;
pub(crate) mod relevance;

use super::breakdown::{ScoreBreakdown, ScoreResult, ScoringStrategy};
use super::domain::ScoreInput;
use super::suggestions;

/// Compute the five sub-scores independently.
pub fn breakdown(input: &ScoreInput) -> ScoreBreakdown {
    let keyword_coverage = keywords::score(&input.candidate_text, &input.target_text);
    let relevance = relevance::score(keyword_coverage.points, input.embeddings.as_ref());

    ScoreBreakdown {
        relevance,
        keyword_coverage,
        quantification: quantification::score(&input.candidate),
        formatting: formatting::score(&input.candidate),
        readability: readability::score(&input.candidate_text),
    }
}

/// Deterministic strategy end to end: breakdown, suggestions, overall.
pub fn score(input: &ScoreInput) -> ScoreResult {
    from_breakdown(breakdown(input))
}

pub(crate) fn from_breakdown(breakdown: ScoreBreakdown) -> ScoreResult {
    let suggestions = suggestions::derive(&breakdown);
    ScoreResult::new(breakdown, suggestions, ScoringStrategy::Deterministic)
}
