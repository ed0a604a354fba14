use crate::scoring::breakdown::{Relevance, RelevanceSignal, RELEVANCE_MAX};
use crate::scoring::domain::EmbeddingPair;

/// Coarse relevance estimate. Uses embedding similarity when a usable pair is supplied,
/// otherwise a bounded function of keyword coverage.
pub(crate) fn score(keyword_points: u8, embeddings: Option<&EmbeddingPair>) -> Relevance {
    if let Some(similarity) =
        embeddings.and_then(|pair| cosine_similarity(&pair.candidate, &pair.target))
    {
        let points = (f32::from(RELEVANCE_MAX) * similarity)
            .round()
            .clamp(0.0, f32::from(RELEVANCE_MAX)) as u8;
        return Relevance {
            points,
            max_points: RELEVANCE_MAX,
            signal: RelevanceSignal::Embedding,
            similarity: Some(similarity),
        };
    }

    let proxy = (0.6 * f64::from(keyword_points) + 10.0).round() as u8;
    Relevance {
        points: proxy.min(RELEVANCE_MAX),
        max_points: RELEVANCE_MAX,
        signal: RelevanceSignal::KeywordProxy,
        similarity: None,
    }
}

/// `None` when the vectors are empty, differ in length, or either has zero magnitude.
pub(crate) fn cosine_similarity(left: &[f32], right: &[f32]) -> Option<f32> {
    if left.is_empty() || left.len() != right.len() {
        return None;
    }

    let (dot, left_norm, right_norm) = left.iter().zip(right).fold(
        (0.0f32, 0.0f32, 0.0f32),
        |(dot, ln, rn), (l, r)| (dot + l * r, ln + l * l, rn + r * r),
    );
    if left_norm == 0.0 || right_norm == 0.0 {
        return None;
    }

    let similarity = dot / (left_norm.sqrt() * right_norm.sqrt());
    similarity.is_finite().then_some(similarity.clamp(-1.0, 1.0))
}
