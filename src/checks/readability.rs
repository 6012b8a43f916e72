//! Readability check: Flesch reading-ease and Flesch-Kincaid grade
//! level, computed directly since no portable Rust equivalent of `textstat`
//! exists in this crate's dependency stack.

use crate::config::EngineConfig;
use crate::model::{CheckResult, Finding, Severity};

use super::Check;

fn is_vowel(c: char) -> bool {
    matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u' | 'y')
}

/// Count syllables in one word via the conventional vowel-group heuristic:
/// count runs of consecutive vowels, drop a trailing silent `e`, floor at 1.
fn count_syllables(word: &str) -> usize {
    let lower: Vec<char> = word.chars().filter(|c| c.is_alphabetic()).map(|c| c.to_ascii_lowercase()).collect();
    if lower.is_empty() {
        return 0;
    }

    let mut count = 0usize;
    let mut prev_was_vowel = false;
    for &c in &lower {
        let is_v = is_vowel(c);
        if is_v && !prev_was_vowel {
            count += 1;
        }
        prev_was_vowel = is_v;
    }

    if lower.len() > 2 && lower[lower.len() - 1] == 'e' && !is_vowel(lower[lower.len() - 2]) && count > 1 {
        count -= 1;
    }

    count.max(1)
}

fn count_sentences(text: &str) -> usize {
    let count = text.matches(['.', '!', '?']).count();
    count.max(1)
}

struct TextStats {
    word_count: usize,
    sentence_count: usize,
    syllable_count: usize,
}

fn compute_stats(text: &str) -> TextStats {
    let words: Vec<&str> = text.split_whitespace().filter(|w| w.chars().any(char::is_alphabetic)).collect();
    let word_count = words.len().max(1);
    let syllable_count: usize = words.iter().map(|w| count_syllables(w)).sum();
    TextStats {
        word_count,
        sentence_count: count_sentences(text),
        syllable_count: syllable_count.max(1),
    }
}

fn flesch_reading_ease(stats: &TextStats) -> f64 {
    let words_per_sentence = stats.word_count as f64 / stats.sentence_count as f64;
    let syllables_per_word = stats.syllable_count as f64 / stats.word_count as f64;
    206.835 - 1.015 * words_per_sentence - 84.6 * syllables_per_word
}

fn flesch_kincaid_grade(stats: &TextStats) -> f64 {
    let words_per_sentence = stats.word_count as f64 / stats.sentence_count as f64;
    let syllables_per_word = stats.syllable_count as f64 / stats.word_count as f64;
    0.39 * words_per_sentence + 11.8 * syllables_per_word - 15.59
}

/// Scores prose against a configured Flesch reading-ease band.
pub struct ReadabilityCheck {
    min_score: f64,
    max_score: f64,
}

impl ReadabilityCheck {
    /// Build from the configured min/max acceptable reading-ease band.
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            min_score: config.readability_min_score,
            max_score: config.readability_max_score,
        }
    }
}

impl Check for ReadabilityCheck {
    fn name(&self) -> &'static str {
        "readability"
    }

    fn run(&self, normalized_text: &str) -> CheckResult {
        let stats = compute_stats(normalized_text);
        let flesch_score = (flesch_reading_ease(&stats) * 10.0).round() / 10.0;
        let grade_level = (flesch_kincaid_grade(&stats) * 10.0).round() / 10.0;

        let in_range = flesch_score >= self.min_score && flesch_score <= self.max_score;

        let finding = if in_range {
            Finding::new(self.name(), Severity::Info, "Readability is within the acceptable range")
                .with_meta("flesch_score", flesch_score)
                .with_meta("grade_level", grade_level)
        } else if flesch_score < self.min_score {
            Finding::new(self.name(), Severity::Warning, "Text is too complex for the target audience")
                .with_meta("flesch_score", flesch_score)
                .with_meta("grade_level", grade_level)
                .with_meta("threshold", "min")
        } else {
            Finding::new(self.name(), Severity::Warning, "Text is too simple for the target audience")
                .with_meta("flesch_score", flesch_score)
                .with_meta("grade_level", grade_level)
                .with_meta("threshold", "max")
        };

        let score = flesch_score.clamp(0.0, 100.0);
        CheckResult::new(self.name(), in_range, Some(score), vec![finding])
            .expect("flesch_score is clamped into [0.0, 100.0] before use as a check score")
    }
}
