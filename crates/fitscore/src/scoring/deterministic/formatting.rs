use crate::scoring::breakdown::{Formatting, FormattingIssue, FORMATTING_MAX};
use crate::scoring::domain::CandidateDocument;

pub(crate) const MIN_SUMMARY_CHARS: usize = 80;
pub(crate) const BULLET_CHARS: std::ops::RangeInclusive<usize> = 30..=220;

pub(crate) fn detect_issues(candidate: &CandidateDocument) -> Vec<FormattingIssue> {
    let mut issues = Vec::new();

    if candidate.name.trim().is_empty() {
        issues.push(FormattingIssue::MissingName);
    }
    if !candidate.contact.is_reachable() {
        issues.push(FormattingIssue::MissingContact);
    }

    let summary_chars = candidate.summary.trim().chars().count();
    if summary_chars == 0 {
        issues.push(FormattingIssue::MissingSummary);
    } else if summary_chars < MIN_SUMMARY_CHARS {
        issues.push(FormattingIssue::ShortSummary);
    }

    if candidate.experience.is_empty() {
        issues.push(FormattingIssue::EmptyExperience);
    }
    if candidate.skills.iter().all(|skill| skill.trim().is_empty()) {
        issues.push(FormattingIssue::MissingSkills);
    }
    if candidate
        .bullets()
        .any(|bullet| !BULLET_CHARS.contains(&bullet.trim().chars().count()))
    {
        issues.push(FormattingIssue::BulletLength);
    }

    issues
}

pub(crate) fn score(candidate: &CandidateDocument) -> Formatting {
    let issues = detect_issues(candidate);
    let points = issues
        .iter()
        .fold(FORMATTING_MAX, |points, issue| {
            points.saturating_sub(issue.deduction())
        });

    Formatting {
        points,
        max_points: FORMATTING_MAX,
        issues,
    }
}
