//! Deterministic tailoring: rearrange a candidate profile so the material that overlaps a
//! target surfaces first. Nothing is invented; content is only reordered.

use std::cmp::Reverse;

use serde::{Deserialize, Serialize};

use super::breakdown::ScoreResult;
use super::deterministic::{self, keywords::KeywordSet};
use super::domain::{CandidateDocument, ScoreInput, TargetDocument};

/// Candidate profile reordered for one target, with the scores before and after.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TailoredDraft {
    pub target_id: String,
    pub candidate: CandidateDocument,
    /// Target keywords the profile still lacks, in target order.
    pub focus_keywords: Vec<String>,
    pub baseline_overall: u8,
    pub score: ScoreResult,
}

pub fn tailor(candidate: &CandidateDocument, target: &TargetDocument) -> TailoredDraft {
    let target_keywords = KeywordSet::extract(&target.text());
    let baseline = deterministic::score(&ScoreInput::from_documents(candidate, target));

    let mut draft = candidate.clone();
    let (mut matched, rest): (Vec<String>, Vec<String>) = draft
        .skills
        .drain(..)
        .partition(|skill| overlap(skill, &target_keywords) > 0);
    matched.extend(rest);
    draft.skills = matched;

    for entry in &mut draft.experience {
        entry
            .bullets
            .sort_by_cached_key(|bullet| Reverse(overlap(bullet, &target_keywords)));
    }

    let score = deterministic::score(&ScoreInput::from_documents(&draft, target));
    TailoredDraft {
        target_id: target.id.clone(),
        focus_keywords: score.breakdown.keyword_coverage.missing.clone(),
        baseline_overall: baseline.overall,
        candidate: draft,
        score,
    }
}

fn overlap(text: &str, target_keywords: &KeywordSet) -> usize {
    KeywordSet::extract(text)
        .iter()
        .filter(|keyword| target_keywords.contains(keyword))
        .count()
}
