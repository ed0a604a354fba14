use super::breakdown::{ReadabilityBand, ScoreBreakdown, MAX_SUGGESTIONS, RELEVANCE_MAX};

const KEYWORDS_PER_SUGGESTION: usize = 5;

/// Turn a breakdown into at most five ordered improvement suggestions. Every suggestion
/// points at a gap visible in the breakdown itself.
pub fn derive(breakdown: &ScoreBreakdown) -> Vec<String> {
    let mut suggestions = Vec::new();

    let coverage = &breakdown.keyword_coverage;
    if !coverage.missing.is_empty() {
        let keywords: Vec<&str> = coverage
            .missing
            .iter()
            .take(KEYWORDS_PER_SUGGESTION)
            .map(String::as_str)
            .collect();
        suggestions.push(format!(
            "Incorporate missing keywords: {}",
            keywords.join(", ")
        ));
    }

    let quantification = &breakdown.quantification;
    if quantification.total_bullets == 0 {
        suggestions.push(
            "Add experience bullets that describe measurable achievements".to_string(),
        );
    } else if quantification.quantified < quantification.total_bullets {
        let gap = quantification.total_bullets - quantification.quantified;
        let noun = if gap == 1 { "achievement" } else { "achievements" };
        suggestions.push(format!(
            "Add {gap} more quantified {noun} (numbers, percentages, or dollar amounts)"
        ));
    }

    suggestions.extend(
        breakdown
            .formatting
            .issues
            .iter()
            .map(|issue| issue.advice().to_string()),
    );

    let readability = &breakdown.readability;
    if readability.band != ReadabilityBand::Professional {
        if readability.grade_level > 12.0 {
            suggestions.push(format!(
                "Shorten sentences and prefer plainer wording (estimated grade level {:.1})",
                readability.grade_level
            ));
        } else {
            suggestions.push(format!(
                "Write fuller sentences that explain context and outcome (estimated grade level {:.1})",
                readability.grade_level
            ));
        }
    }

    if u16::from(breakdown.relevance.points) * 10 < u16::from(RELEVANCE_MAX) * 7 {
        suggestions.push(
            "Tailor your summary and most recent role to the target posting".to_string(),
        );
    }

    suggestions.truncate(MAX_SUGGESTIONS);
    suggestions
}
