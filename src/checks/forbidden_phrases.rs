//! Forbidden-phrase check: flags every case-insensitive occurrence of a
//! configured needle phrase, no word-boundary anchoring.

use aho_corasick::{AhoCorasick, MatchKind};

use crate::config::EngineConfig;
use crate::model::{CheckResult, Finding, Severity};

use super::Check;

/// Flags AI-slop/forbidden phrases anywhere they occur as a substring —
/// including inside a larger word (`"cat"` matches inside `"concatenate"`,
/// documented behavior, not a bug). A single multi-pattern automaton scans
/// the text once regardless of how many phrases are configured, rather than
/// one regex pass per phrase.
pub struct ForbiddenPhrasesCheck {
    phrases: Vec<String>,
    automaton: AhoCorasick,
}

impl ForbiddenPhrasesCheck {
    /// Build from the configured phrase list, compiling one case-insensitive
    /// Aho-Corasick automaton over all phrases at once.
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        let phrases = config.forbidden_phrases.clone();
        let automaton = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .match_kind(MatchKind::Standard)
            .build(&phrases)
            .expect("forbidden_phrases always yields a buildable automaton");
        Self { phrases, automaton }
    }
}

impl Check for ForbiddenPhrasesCheck {
    fn name(&self) -> &'static str {
        "forbidden_phrases"
    }

    fn run(&self, normalized_text: &str) -> CheckResult {
        let mut findings = Vec::new();

        // Overlapping matches are reported individually: distinct phrases
        // may share characters, and each occurrence of a repeated phrase is
        // its own finding.
        for m in self.automaton.find_overlapping_iter(normalized_text) {
            let phrase = &self.phrases[m.pattern().as_usize()];
            let start = normalized_text[..m.start()].chars().count();
            let end = normalized_text[..m.end()].chars().count();
            let finding = Finding::new(
                self.name(),
                Severity::Error,
                format!("Forbidden phrase detected: \"{phrase}\""),
            )
            .with_span(start, end)
            .expect("start <= end by construction")
            .with_meta("phrase", phrase.as_str())
            .with_meta("span_basis", "normalized");
            findings.push(finding);
        }

        findings.sort_by_key(|f| f.span.map(|s| (s.start, s.end)));

        let passed = findings.is_empty();
        CheckResult::new(self.name(), passed, None, findings)
            .expect("no score is provided, so range validation cannot fail")
    }
}
