use crate::scoring::breakdown::{proportional_points, Quantification, QUANTIFICATION_MAX};
use crate::scoring::domain::CandidateDocument;

use super::keywords::normalize;

const COUNT_WORDS: &[&str] = &[
    "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten", "eleven", "twelve",
    "fifteen", "twenty", "thirty", "fifty", "hundred", "hundreds", "thousand", "thousands",
    "million", "millions", "billion", "dozen", "dozens", "several", "multiple",
];

const UNIT_WORDS: &[&str] = &[
    "users", "customers", "clients", "people", "engineers", "developers", "members", "team",
    "teams", "reports", "projects", "products", "markets", "countries", "regions", "stores",
    "accounts", "releases", "services", "languages", "million", "billion", "thousand",
];

/// A bullet counts as quantified when it carries a digit, a percent or dollar sign, or a
/// spelled-out count followed by a unit word ("dozens of engineers" does not count, "twelve
/// engineers" does).
pub(crate) fn is_quantified(bullet: &str) -> bool {
    if bullet
        .chars()
        .any(|ch| ch.is_ascii_digit() || ch == '%' || ch == '$')
    {
        return true;
    }

    let normalized = normalize(bullet);
    let words: Vec<&str> = normalized.split(' ').collect();
    words
        .windows(2)
        .any(|pair| COUNT_WORDS.contains(&pair[0]) && UNIT_WORDS.contains(&pair[1]))
}

pub(crate) fn score(candidate: &CandidateDocument) -> Quantification {
    let (total, quantified) = candidate
        .bullets()
        .fold((0usize, 0usize), |(total, quantified), bullet| {
            (total + 1, quantified + usize::from(is_quantified(bullet)))
        });

    Quantification {
        points: proportional_points(QUANTIFICATION_MAX, quantified, total),
        max_points: QUANTIFICATION_MAX,
        quantified,
        total_bullets: total,
    }
}
