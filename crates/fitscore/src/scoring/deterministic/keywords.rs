use std::collections::HashSet;

use crate::scoring::breakdown::{proportional_points, KeywordCoverage, KEYWORD_COVERAGE_MAX};

const MAX_MISSING_REPORTED: usize = 10;

/// Multi-word terms that carry meaning only as a unit. Stored in normalized form.
const PHRASES: &[&str] = &[
    "machine learning",
    "deep learning",
    "data analysis",
    "data science",
    "data engineering",
    "project management",
    "product management",
    "program management",
    "software development",
    "software engineering",
    "distributed systems",
    "cloud infrastructure",
    "continuous integration",
    "continuous delivery",
    "cross functional",
    "stakeholder management",
    "team leadership",
    "people management",
    "customer success",
    "customer service",
    "user experience",
    "business development",
    "supply chain",
    "quality assurance",
    "financial modeling",
    "public speaking",
    "natural language processing",
    "computer vision",
    "site reliability",
    "incident response",
];

const STOP_WORDS: &[&str] = &[
    "about", "above", "across", "after", "again", "against", "also", "among", "been", "before",
    "being", "below", "between", "both", "could", "does", "doing", "down", "during", "each",
    "every", "from", "further", "have", "having", "here", "including", "into", "just", "like",
    "more", "most", "much", "must", "only", "other", "ours", "over", "same", "should", "some",
    "such", "than", "that", "their", "theirs", "them", "then", "there", "these", "they", "this",
    "those", "through", "under", "until", "upon", "very", "well", "were", "what", "when",
    "where", "which", "while", "will", "with", "within", "without", "would", "your", "yours",
];

/// Lowercase, map punctuation to spaces and collapse whitespace. `+` and `#` survive so
/// terms like `c++` and `c#` stay intact.
pub(crate) fn normalize(text: &str) -> String {
    let mapped: String = text
        .chars()
        .flat_map(|ch| {
            let keep = ch.is_alphanumeric() || ch == '+' || ch == '#';
            ch.to_lowercase()
                .map(move |lower| if keep { lower } else { ' ' })
        })
        .collect();
    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_keyword_word(word: &str) -> bool {
    word.chars().count() > 3
        && !word.chars().all(|ch| ch.is_ascii_digit())
        && !STOP_WORDS.contains(&word)
}

/// Ordered, de-duplicated keyword set: phrases first, then single words, each in order of
/// first appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct KeywordSet {
    ordered: Vec<String>,
    lookup: HashSet<String>,
}

impl KeywordSet {
    pub(crate) fn extract(text: &str) -> Self {
        let normalized = normalize(text);
        let padded = format!(" {normalized} ");
        let mut set = KeywordSet::default();

        let mut phrases: Vec<(usize, &str)> = PHRASES
            .iter()
            .filter_map(|phrase| {
                padded
                    .find(&format!(" {phrase} "))
                    .map(|position| (position, *phrase))
            })
            .collect();
        phrases.sort_by_key(|(position, _)| *position);
        for (_, phrase) in phrases {
            set.insert(phrase);
        }

        for word in normalized.split(' ').filter(|word| is_keyword_word(word)) {
            set.insert(word);
        }
        set
    }

    fn insert(&mut self, keyword: &str) {
        if self.lookup.insert(keyword.to_string()) {
            self.ordered.push(keyword.to_string());
        }
    }

    pub(crate) fn contains(&self, keyword: &str) -> bool {
        self.lookup.contains(keyword)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &str> {
        self.ordered.iter().map(String::as_str)
    }

    pub(crate) fn len(&self) -> usize {
        self.ordered.len()
    }
}

pub(crate) fn score(candidate_text: &str, target_text: &str) -> KeywordCoverage {
    let target = KeywordSet::extract(target_text);
    let candidate = KeywordSet::extract(candidate_text);

    let (matched, missing): (Vec<&str>, Vec<&str>) =
        target.iter().partition(|keyword| candidate.contains(keyword));

    KeywordCoverage {
        points: proportional_points(KEYWORD_COVERAGE_MAX, matched.len(), target.len()),
        max_points: KEYWORD_COVERAGE_MAX,
        matched: matched.len(),
        total: target.len(),
        missing: missing
            .into_iter()
            .take(MAX_MISSING_REPORTED)
            .map(str::to_string)
            .collect(),
    }
}
