//! Prompt-injection check: a fixed table of named regex families run
//! against the normalized text. Eight families (`ignore_instructions`
//! through `hidden_text`) are inherited near-verbatim from this engine's
//! Python predecessor; the remaining families cover attack shapes that
//! predecessor never named (delimiter smuggling via markdown, template
//! injection, fake chat-role fencing) and are authored fresh in the same
//! regex-table idiom.
//!
//! Every match produces its own [`crate::model::Finding`] and counts toward
//! the risk score, which scales with total match count across all families,
//! not just how many distinct families fired.

use regex::{Regex, RegexSet};
use std::sync::LazyLock;

use crate::config::EngineConfig;
use crate::model::{CheckResult, Finding, Severity};

use super::Check;

struct Family {
    name: &'static str,
    regex: &'static str,
}

/// Registry order also determines `metadata["pattern"]` naming and is the
/// order findings from different families appear in when several all match
/// at the same text position (stable sort by family, left-to-right within a
/// family).
const FAMILIES: &[Family] = &[
    Family { name: "ignore_instructions", regex: r"(?i)ignore\s+(?:all\s+)?(?:previous|prior|above)\s+(?:instructions?|prompts?|rules?)" },
    Family { name: "system_prompt_leak", regex: r"(?i)(?:reveal|show|display|print|output)\s+(?:your\s+)?(?:system\s+)?prompt" },
    Family { name: "role_override", regex: r"(?i)(?:you\s+are\s+now|now\s+you\s+are)\s+(?:a|an)?\s*(?:DAN|unrestricted|jailbroken|evil|uncensored)\b" },
    Family { name: "delimiter_injection", regex: r"(?i)```\s*(?:system|assistant)\b" },
    Family { name: "encoded_injection", regex: r"(?i)(?:base64|rot13|hex)\s*[:\-]?\s*[A-Za-z0-9+/=]{16,}" },
    Family { name: "do_anything_now", regex: r"(?i)do\s+anything\s+now|\bDAN\b" },
    Family { name: "instruction_override", regex: r"(?i)(?:disregard|override)\s+(?:the\s+)?(?:previous|prior|above)\s+(?:instructions?|rules?|guidelines?)" },
    Family { name: "hidden_text", regex: r"(?i)</?\s*(?:hidden|invisible|secret)\s*>" },
    Family { name: "forget_everything", regex: r"(?i)forget\s+(?:everything|all)\s+(?:you\s+)?(?:know|learned|were\s+told)" },
    Family { name: "act_as", regex: r"(?i)act\s+as\s+(?:a|an)\s+[\w\s]{1,40}?(?:without|with\s+no)\s+(?:restrictions?|filters?|rules?)" },
    Family { name: "token_manipulation", regex: r"(?i)\b(?:temperature|top_p)\s*[:=]\s*[\d.]+" },
    Family { name: "context_boundary", regex: r"(?i)</s>|\[INST\]|<\|system\|>" },
    Family { name: "markdown_exfil", regex: r"(?i)!\[[^\]]*\]\(\s*https?://[^\s)]+\)" },
    Family { name: "developer_mode", regex: r"(?i)developer\s+mode|dev\s+mode\s+enabled" },
    Family { name: "privilege_escalation", regex: r"(?i)grant\s+(?:me\s+)?(?:admin|root|sudo|superuser)\s+(?:access|privileges?|rights?)" },
    Family { name: "template_injection", regex: r"\{\{[^}]{1,80}\}\}|\$\{[^}]{1,80}\}|<%[^%]{1,80}%>" },
    Family { name: "xml_tag_injection", regex: r"(?i)</?\s*(?:system|instructions?|admin)\s*>" },
    Family { name: "markdown_role_block", regex: r"(?i)(?:-{3,}|={3,}|\*{3,})\s*(?:end|begin|start)\s+(?:of\s+)?(?:system|user|instructions?)" },
    Family { name: "payload_separator", regex: r"[-=_*]{5,}" },
    Family { name: "cognitive_hacking", regex: r"(?i)let'?s\s+play\s+a\s+game\s+where\s+you|pretend\s+(?:you\s+have\s+)?no\s+(?:restrictions?|rules?|filters?)" },
    Family { name: "continuation_attack", regex: r"(?i)continue\s+(?:the\s+)?(?:following|this)\s+as\s+if\s+(?:there\s+)?(?:are\s+)?no\s+(?:rules?|restrictions?)" },
];

static REGEX_SET: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new(FAMILIES.iter().map(|f| f.regex)).expect("all family patterns are valid regex")
});

static COMPILED: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    FAMILIES
        .iter()
        .map(|f| Regex::new(f.regex).expect("all family patterns are valid regex"))
        .collect()
});

fn truncate_matched(matched: &str) -> String {
    if matched.chars().count() > 60 {
        let head: String = matched.chars().take(60).collect();
        format!("{head}...")
    } else {
        matched.to_string()
    }
}

/// Flags text matching any of a fixed set of prompt-injection attack
/// families. Stateless beyond the compiled pattern table, so construction
/// from config is trivial — no config key currently affects this check.
pub struct PromptInjectionCheck;

impl PromptInjectionCheck {
    /// Build the check. No config keys currently affect prompt-injection
    /// detection; the parameter is accepted for symmetry with the other
    /// checks' `build()` call sites.
    #[must_use]
    pub fn new(_config: &EngineConfig) -> Self {
        Self
    }
}

impl Check for PromptInjectionCheck {
    fn name(&self) -> &'static str {
        "prompt_injection"
    }

    fn run(&self, normalized_text: &str) -> CheckResult {
        let triggered = REGEX_SET.matches(normalized_text);
        let mut findings = Vec::new();

        for idx in triggered.iter() {
            let family = &FAMILIES[idx];
            let re = &COMPILED[idx];

            for m in re.find_iter(normalized_text) {
                let start = normalized_text[..m.start()].chars().count();
                let end = normalized_text[..m.end()].chars().count();
                let truncated = truncate_matched(m.as_str());
                let finding = Finding::new(
                    self.name(),
                    Severity::Critical,
                    format!("Prompt injection pattern detected: {}", family.name),
                )
                .with_span(start, end)
                .expect("start <= end by construction")
                .with_meta("pattern", family.name)
                .with_meta("matched", truncated)
                .with_meta("span_basis", "normalized");
                findings.push(finding);
            }
        }

        let total_matches = findings.len();
        let risk = (total_matches as f64 / FAMILIES.len().max(1) as f64).min(1.0);
        let score = ((1.0 - risk) * 100.0 * 10.0).round() / 10.0;
        let passed = score >= 100.0;

        CheckResult::new(self.name(), passed, Some(score), findings)
            .expect("score is always clamped into [0.0, 100.0]")
    }
}
