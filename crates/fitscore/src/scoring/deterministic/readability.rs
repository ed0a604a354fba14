use crate::scoring::breakdown::{Readability, ReadabilityBand, READABILITY_MAX};

const PROFESSIONAL_BAND: std::ops::RangeInclusive<f32> = 8.0..=12.0;
const ACCEPTABLE_BAND: std::ops::RangeInclusive<f32> = 6.0..=14.0;

/// Simplified Flesch-Kincaid grade level. Empty text grades 0.
pub(crate) fn grade_level(text: &str) -> f32 {
    let sentences = text
        .split(['.', '!', '?', '\n'])
        .filter(|sentence| sentence.split_whitespace().any(|word| !clean_word(word).is_empty()))
        .count();
    let words: Vec<String> = text
        .split_whitespace()
        .map(clean_word)
        .filter(|word| !word.is_empty())
        .collect();

    if sentences == 0 || words.is_empty() {
        return 0.0;
    }

    let syllables: usize = words.iter().map(|word| count_syllables(word)).sum();
    let words_per_sentence = words.len() as f32 / sentences as f32;
    let syllables_per_word = syllables as f32 / words.len() as f32;
    let grade = 0.39 * words_per_sentence + 11.8 * syllables_per_word - 15.59;
    (grade * 10.0).round() / 10.0
}

fn clean_word(raw: &str) -> String {
    raw.chars()
        .filter(|ch| ch.is_alphabetic())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Vowel-group heuristic with a silent trailing `e`; every word has at least one syllable.
pub(crate) fn count_syllables(word: &str) -> usize {
    let mut groups = 0;
    let mut previous_vowel = false;
    for ch in word.chars() {
        let vowel = matches!(ch, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');
        if vowel && !previous_vowel {
            groups += 1;
        }
        previous_vowel = vowel;
    }
    if groups > 1 && word.ends_with('e') && !word.ends_with("le") {
        groups -= 1;
    }
    groups.max(1)
}

pub(crate) fn band_for(grade: f32) -> (u8, ReadabilityBand) {
    if PROFESSIONAL_BAND.contains(&grade) {
        (READABILITY_MAX, ReadabilityBand::Professional)
    } else if ACCEPTABLE_BAND.contains(&grade) {
        (7, ReadabilityBand::Acceptable)
    } else {
        (4, ReadabilityBand::Outside)
    }
}

pub(crate) fn score(candidate_text: &str) -> Readability {
    let grade = grade_level(candidate_text);
    let (points, band) = band_for(grade);
    Readability {
        points,
        max_points: READABILITY_MAX,
        grade_level: grade,
        band,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syllable_heuristic() {
        assert_eq!(count_syllables("cat"), 1);
        assert_eq!(count_syllables("make"), 1);
        assert_eq!(count_syllables("table"), 2);
        assert_eq!(count_syllables("readability"), 5);
        assert_eq!(count_syllables("rhythm"), 1);
    }

    #[test]
    fn bands() {
        assert_eq!(band_for(9.5), (10, ReadabilityBand::Professional));
        assert_eq!(band_for(12.0), (10, ReadabilityBand::Professional));
        assert_eq!(band_for(13.2), (7, ReadabilityBand::Acceptable));
        assert_eq!(band_for(6.0), (7, ReadabilityBand::Acceptable));
        assert_eq!(band_for(17.0), (4, ReadabilityBand::Outside));
    }

    #[test]
    fn empty_text_is_outside_band() {
        let readability = score("");
        assert_eq!(readability.grade_level, 0.0);
        assert_eq!(readability.points, 4);
    }

    #[test]
    fn very_short_sentences_grade_low() {
        let readability = score("The cat sat. The dog ran.");
        assert!(readability.grade_level < 6.0);
        assert_eq!(readability.band, ReadabilityBand::Outside);
    }

    #[test]
    fn dense_prose_grades_higher_than_simple_prose() {
        let simple = grade_level("We ship code. We fix bugs. We help users.");
        let dense = grade_level(
            "Orchestrated organizational transformation initiatives emphasizing \
             operational excellence, infrastructure modernization, and sustainable \
             engineering accountability across international subsidiaries.",
        );
        assert!(dense > simple);
    }
}
