//! Brand-voice check: scores tone consistency, configured keyword
//! coverage, and reader-engagement language against a 0–100 scale.

use std::collections::BTreeMap;

use regex::{Regex, RegexBuilder};

use crate::config::EngineConfig;
use crate::model::{CheckResult, Finding, Severity};

use super::Check;

const PROFESSIONAL_OFF_TONE: &[&str] = &[
    "lol", "omg", "bruh", "gonna", "wanna", "kinda", "sorta", "tbh", "ngl", "fr fr", "yo", "dude",
    "bro",
];

const CASUAL_OFF_TONE: &[&str] = &[
    "hereby",
    "aforementioned",
    "pursuant",
    "notwithstanding",
    "heretofore",
    "therein",
    "whereas",
];

const POSITIVE_SIGNALS: &[&str] = &["we", "our", "us", "you", "your"];

fn off_tone_words_for(tone: &str) -> &'static [&'static str] {
    if tone.eq_ignore_ascii_case("casual") {
        CASUAL_OFF_TONE
    } else {
        PROFESSIONAL_OFF_TONE
    }
}

/// Build a matcher for one token: word-boundary anchored for a single word,
/// a plain literal (no boundary) for a multi-word phrase like `"fr fr"`.
fn build_token_pattern(token: &str) -> Regex {
    let escaped = regex::escape(token);
    let pattern = if token.contains(' ') {
        escaped
    } else {
        format!(r"\b{escaped}\b")
    };
    RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .expect("escaped literal/word-boundary pattern is always valid")
}

/// Scores how well text matches a configured brand tone, rewards configured
/// keyword coverage, and rewards second-person/first-person-plural
/// engagement language.
pub struct BrandVoiceCheck {
    tone: String,
    keywords: Vec<String>,
    target_score: f64,
    off_tone_patterns: Vec<(String, Regex)>,
    keyword_patterns: Vec<(String, Regex)>,
    positive_patterns: Vec<Regex>,
}

impl BrandVoiceCheck {
    /// Build from the configured tone, keyword list, and target score.
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        let off_tone_patterns = off_tone_words_for(&config.brand_voice_tone)
            .iter()
            .map(|w| (w.to_string(), build_token_pattern(w)))
            .collect();

        let keyword_patterns = config
            .brand_voice_keywords
            .iter()
            .map(|k| (k.clone(), build_token_pattern(k)))
            .collect();

        let positive_patterns = POSITIVE_SIGNALS.iter().map(|w| build_token_pattern(w)).collect();

        Self {
            tone: config.brand_voice_tone.clone(),
            keywords: config.brand_voice_keywords.clone(),
            target_score: config.brand_voice_target_score,
            off_tone_patterns,
            keyword_patterns,
            positive_patterns,
        }
    }
}

impl Check for BrandVoiceCheck {
    fn name(&self) -> &'static str {
        "brand_voice"
    }

    fn run(&self, normalized_text: &str) -> CheckResult {
        let mut findings = Vec::new();

        let word_count = normalized_text.split_whitespace().count().max(1);

        let mut off_tone_total = 0usize;
        let mut off_tone_counts: BTreeMap<&str, usize> = BTreeMap::new();
        for (word, re) in &self.off_tone_patterns {
            let count = re.find_iter(normalized_text).count();
            if count > 0 {
                off_tone_total += count;
                off_tone_counts.insert(word.as_str(), count);
            }
        }

        let mut keyword_hits = 0usize;
        for (_keyword, re) in &self.keyword_patterns {
            if re.is_match(normalized_text) {
                keyword_hits += 1;
            }
        }

        let positive_hits: usize = self
            .positive_patterns
            .iter()
            .map(|re| re.find_iter(normalized_text).count())
            .sum();
        let engagement_ratio = positive_hits as f64 / word_count as f64;

        let mut score = 70.0;
        score -= (off_tone_total as f64 * 5.0).min(40.0);
        if !self.keywords.is_empty() {
            score += (keyword_hits as f64 / self.keywords.len() as f64) * 15.0;
        }
        score += engagement_ratio.min(0.15) * 100.0;
        score = score.clamp(0.0, 100.0);
        score = (score * 10.0).round() / 10.0;

        for (word, count) in &off_tone_counts {
            let finding = Finding::new(
                self.name(),
                Severity::Warning,
                format!("Off-tone word \"{word}\" found for {} voice", self.tone),
            )
            .with_meta("word", *word)
            .with_meta("count", *count);
            findings.push(finding);
        }

        let passed = score >= self.target_score;
        if !passed {
            let finding = Finding::new(
                self.name(),
                Severity::Error,
                format!(
                    "Brand-voice score {score} is below the target of {}",
                    self.target_score
                ),
            )
            .with_meta("score", score)
            .with_meta("target", self.target_score);
            findings.push(finding);
        }

        CheckResult::new(self.name(), passed, Some(score), findings)
            .expect("score is always clamped into [0.0, 100.0]")
    }
}
