//! PII check: email, phone, SSN, and credit-card detection.
//!
//! The `regex` crate is deliberately linear-time and offers no look-around
//! assertions, so the digit-adjacency guards the phone/SSN/credit-card
//! patterns need (`(?<!\d)...(?!\d)`) are applied manually: each
//! candidate match is checked against the character immediately before and
//! after it in the source text, and rejected if either is itself a digit.
//!
//! Every finding's message and metadata carry only a fixed redaction
//! placeholder — never the matched substring. This is a hard invariant: a
//! detected credit-card number must never appear, even truncated, anywhere
//! in a [`crate::model::Finding`].

use regex::Regex;
use std::sync::LazyLock;

use crate::config::{EngineConfig, PiiPatternType};
use crate::model::{CheckResult, Finding, Severity};

use super::Check;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("valid regex")
});

static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:\+1[-.\s])?(?:\(\d{3}\)[-.\s]?\d{3}[-.\s]\d{4}|\d{3}[-.\s]\d{3}[-.\s]\d{4})",
    )
    .expect("valid regex")
});

static SSN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{3})[-.\s](\d{2})[-.\s](\d{4})").expect("valid regex"));

static CREDIT_CARD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:4\d{3}(?:[-\s]?\d{4}){3}|5[1-5]\d{2}(?:[-\s]?\d{4}){3}|3[47]\d{2}[-\s]?\d{6}[-\s]?\d{5}|(?:6011|65\d{2})(?:[-\s]?\d{4}){3})",
    )
    .expect("valid regex")
});

fn redaction_placeholder(pii_type: &str) -> &'static str {
    match pii_type {
        "email" => "***@***.***",
        "phone" => "***-***-****",
        "ssn" => "***-**-****",
        "credit_card" => "****-****-****-****",
        other => unreachable!("unknown pii_type: {other}"),
    }
}

/// `true` if the character immediately before or after `[start, end)` (byte
/// offsets) is itself an ASCII digit — i.e. the match is embedded in a
/// larger digit run and should be rejected.
fn has_digit_boundary_violation(text: &str, start: usize, end: usize) -> bool {
    let prev_is_digit = text[..start].chars().next_back().is_some_and(|c| c.is_ascii_digit());
    let next_is_digit = text[end..].chars().next().is_some_and(|c| c.is_ascii_digit());
    prev_is_digit || next_is_digit
}

fn is_valid_ssn(area: &str, group: &str, serial: &str) -> bool {
    if area == "000" || area == "666" || area.starts_with('9') {
        return false;
    }
    if group == "00" {
        return false;
    }
    if serial == "0000" {
        return false;
    }
    true
}

/// Flags email addresses, NANP phone numbers, US Social Security Numbers,
/// and major-network credit card numbers, per the configured subset.
pub struct PiiCheck {
    enabled: Vec<PiiPatternType>,
}

impl PiiCheck {
    /// Build from the configured `pii_patterns_enabled` subset.
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            enabled: config.pii_patterns_enabled.clone(),
        }
    }

    fn push_finding(findings: &mut Vec<Finding>, pii_type: &str, start: usize, end: usize) {
        let redacted = redaction_placeholder(pii_type);
        let finding = Finding::new(
            "pii",
            Severity::Critical,
            format!("Potential {} detected (redacted: {redacted})", pii_type.to_uppercase()),
        )
        .with_span(start, end)
        .expect("start <= end by construction")
        .with_meta("pii_type", pii_type)
        .with_meta("redacted", redacted)
        .with_meta("span_basis", "normalized");
        findings.push(finding);
    }
}

impl Check for PiiCheck {
    fn name(&self) -> &'static str {
        "pii"
    }

    fn run(&self, normalized_text: &str) -> CheckResult {
        let mut findings = Vec::new();

        if self.enabled.contains(&PiiPatternType::Email) {
            for m in EMAIL_RE.find_iter(normalized_text) {
                let start = normalized_text[..m.start()].chars().count();
                let end = normalized_text[..m.end()].chars().count();
                Self::push_finding(&mut findings, "email", start, end);
            }
        }

        if self.enabled.contains(&PiiPatternType::Phone) {
            for m in PHONE_RE.find_iter(normalized_text) {
                if has_digit_boundary_violation(normalized_text, m.start(), m.end()) {
                    continue;
                }
                let start = normalized_text[..m.start()].chars().count();
                let end = normalized_text[..m.end()].chars().count();
                Self::push_finding(&mut findings, "phone", start, end);
            }
        }

        if self.enabled.contains(&PiiPatternType::Ssn) {
            for caps in SSN_RE.captures_iter(normalized_text) {
                let m = caps.get(0).expect("whole match always present");
                if has_digit_boundary_violation(normalized_text, m.start(), m.end()) {
                    continue;
                }
                let area = caps.get(1).expect("group 1").as_str();
                let group = caps.get(2).expect("group 2").as_str();
                let serial = caps.get(3).expect("group 3").as_str();
                if !is_valid_ssn(area, group, serial) {
                    continue;
                }
                let start = normalized_text[..m.start()].chars().count();
                let end = normalized_text[..m.end()].chars().count();
                Self::push_finding(&mut findings, "ssn", start, end);
            }
        }

        if self.enabled.contains(&PiiPatternType::CreditCard) {
            for m in CREDIT_CARD_RE.find_iter(normalized_text) {
                if has_digit_boundary_violation(normalized_text, m.start(), m.end()) {
                    continue;
                }
                let start = normalized_text[..m.start()].chars().count();
                let end = normalized_text[..m.end()].chars().count();
                Self::push_finding(&mut findings, "credit_card", start, end);
            }
        }

        let passed = findings.is_empty();
        CheckResult::new(self.name(), passed, None, findings)
            .expect("no score is provided, so range validation cannot fail")
    }
}
