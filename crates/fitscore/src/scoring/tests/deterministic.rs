use super::common::*;
use crate::scoring::breakdown::{
    FORMATTING_MAX, KEYWORD_COVERAGE_MAX, QUANTIFICATION_MAX, READABILITY_MAX, RELEVANCE_MAX,
};
use crate::scoring::{
    deterministic, CandidateDocument, EmbeddingPair, RelevanceSignal, ScoreInput,
    ScoringStrategy, TargetDocument,
};

#[test]
fn max_points_are_fixed_and_sum_to_one_hundred() {
    let result = deterministic::score(&input());
    let maxima: Vec<u8> = result
        .breakdown
        .sub_scores()
        .iter()
        .map(|(_, _, max)| *max)
        .collect();
    assert_eq!(
        maxima,
        vec![
            KEYWORD_COVERAGE_MAX,
            RELEVANCE_MAX,
            QUANTIFICATION_MAX,
            FORMATTING_MAX,
            READABILITY_MAX
        ]
    );
    assert_eq!(maxima, vec![40, 25, 15, 10, 10]);
    assert_eq!(maxima.iter().map(|max| u32::from(*max)).sum::<u32>(), 100);
}

#[test]
fn points_stay_in_range_and_overall_is_their_sum() {
    let inputs = [
        input(),
        ScoreInput::from_documents(&CandidateDocument::default(), &target()),
        ScoreInput::from_documents(&candidate(), &TargetDocument::default()),
        ScoreInput::new("", CandidateDocument::default(), ""),
    ];

    for input in &inputs {
        let result = deterministic::score(input);
        let mut sum = 0u8;
        for (name, points, max) in result.breakdown.sub_scores() {
            assert!(points <= max, "{name} exceeded its maximum: {points} > {max}");
            sum += points;
        }
        assert_eq!(result.overall, sum);
        assert!(result.overall <= 100);
        assert!(result.suggestions.len() <= 5);
        assert_eq!(result.strategy, ScoringStrategy::Deterministic);
    }
}

#[test]
fn identical_inputs_produce_identical_results() {
    assert_eq!(deterministic::score(&input()), deterministic::score(&input()));
}

#[test]
fn strong_candidate_scores_expected_sub_scores() {
    let breakdown = deterministic::breakdown(&input());
    assert_eq!(breakdown.quantification.quantified, 2);
    assert_eq!(breakdown.quantification.total_bullets, 3);
    assert_eq!(breakdown.quantification.points, 10);
    assert_eq!(breakdown.formatting.points, FORMATTING_MAX);
    assert!(breakdown.formatting.issues.is_empty());
    assert!(breakdown
        .keyword_coverage
        .missing
        .contains(&"prometheus".to_string()));
}

#[test]
fn zero_bullets_means_zero_quantification() {
    let mut candidate = candidate();
    candidate.experience.clear();
    let breakdown = deterministic::breakdown(&ScoreInput::from_documents(&candidate, &target()));
    assert_eq!(breakdown.quantification.points, 0);
    assert_eq!(breakdown.quantification.total_bullets, 0);
}

#[test]
fn empty_target_keyword_set_means_zero_coverage() {
    let target = TargetDocument {
        id: "post-empty".to_string(),
        description: "We are it.".to_string(),
        ..TargetDocument::default()
    };
    let breakdown = deterministic::breakdown(&ScoreInput::from_documents(&candidate(), &target));
    assert_eq!(breakdown.keyword_coverage.total, 0);
    assert_eq!(breakdown.keyword_coverage.points, 0);
    assert_eq!(breakdown.relevance.points, 10);
}

#[test]
fn embeddings_replace_the_keyword_proxy() {
    let input = input().with_embeddings(EmbeddingPair {
        candidate: vec![1.0, 0.0],
        target: vec![1.0, 0.0],
    });
    let relevance = deterministic::breakdown(&input).relevance;
    assert_eq!(relevance.signal, RelevanceSignal::Embedding);
    assert_eq!(relevance.points, RELEVANCE_MAX);
}

#[test]
fn mismatched_embeddings_fall_back_to_the_proxy() {
    let input = input().with_embeddings(EmbeddingPair {
        candidate: vec![1.0, 0.0, 0.5],
        target: vec![1.0, 0.0],
    });
    let relevance = deterministic::breakdown(&input).relevance;
    assert_eq!(relevance.signal, RelevanceSignal::KeywordProxy);
    assert!(relevance.similarity.is_none());
}

#[test]
fn suggestions_lead_with_missing_keywords() {
    let result = deterministic::score(&input());
    assert!(result.suggestions[0].starts_with("Incorporate missing keywords:"));
    assert!(result.suggestions[0].contains("prometheus"));
}
