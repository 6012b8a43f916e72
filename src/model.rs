//! Shared value types: severity, findings, per-check results.
//!
//! These are the vocabulary every check (`crate::checks`) and the engine
//! (`crate::engine`) speak. Construction is fallible where the wire
//! contract demands it — a negative span or non-scalar metadata value is a
//! programming error in a check, not a recoverable runtime condition, but we
//! still reject it via `Result` rather than panicking so a single
//! misbehaving check can be isolated by the engine (see `crate::engine`).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Totally ordered severity tag, carrying the point value used by the risk
/// taxonomy (`crate::risk`) when summing finding severities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational observation; does not affect pass/fail on its own.
    Info,
    /// Minor concern.
    Warning,
    /// A check-failing condition.
    Error,
    /// A hard-failing, escalation-triggering condition.
    Critical,
}

impl Severity {
    /// Point value used when summing findings into a raw risk-axis score.
    #[must_use]
    pub fn points(self) -> f64 {
        match self {
            Self::Info => 0.0,
            Self::Warning => 15.0,
            Self::Error => 40.0,
            Self::Critical => 80.0,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        };
        write!(f, "{s}")
    }
}

/// A scalar metadata value. Findings may only carry scalars — never nested
/// maps or arrays — so a serialized finding can be scanned for sensitive
/// substrings without recursive traversal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    /// A string value.
    Str(String),
    /// A numeric value.
    Num(f64),
    /// A boolean value.
    Bool(bool),
}

impl From<&str> for MetaValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<f64> for MetaValue {
    fn from(v: f64) -> Self {
        Self::Num(v)
    }
}

impl From<usize> for MetaValue {
    fn from(v: usize) -> Self {
        #[allow(clippy::cast_precision_loss)]
        Self::Num(v as f64)
    }
}

impl From<bool> for MetaValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

/// Half-open character span `[start, end)` into the normalized text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// Inclusive start character offset.
    pub start: usize,
    /// Exclusive end character offset.
    pub end: usize,
}

/// Errors raised when constructing a [`Finding`] or [`CheckResult`] with an
/// invalid shape. These indicate a bug in a check implementation, not a
/// content-level outcome — the engine isolates them the same way it isolates
/// a panicking check (see `crate::engine::Engine::run`).
#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    /// `end < start` for a span.
    #[error("finding span end ({end}) is before start ({start})")]
    SpanEndBeforeStart {
        /// The offending start offset.
        start: usize,
        /// The offending end offset.
        end: usize,
    },
    /// A score outside `[0.0, 100.0]`.
    #[error("score {0} is outside the valid range [0.0, 100.0]")]
    ScoreOutOfRange(f64),
}

/// One observation produced by a check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    /// Name of the check that produced this finding.
    pub check: String,
    /// Severity of the observation.
    pub severity: Severity,
    /// Human-readable message. MUST NOT contain a detected sensitive
    /// substring for PII findings, and MUST truncate `matched` text to ≤ 63
    /// characters for prompt-injection findings (see `crate::checks::pii`
    /// and `crate::checks::prompt_injection`).
    pub message: String,
    /// Half-open character span into the normalized text, if applicable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
    /// Scalar metadata, ordered for deterministic serialization.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, MetaValue>,
}

impl Finding {
    /// Build a finding with no span and no metadata.
    #[must_use]
    pub fn new(check: impl Into<String>, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            check: check.into(),
            severity,
            message: message.into(),
            span: None,
            metadata: BTreeMap::new(),
        }
    }

    /// Attach a span. Rejects `end < start`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::SpanEndBeforeStart`] if `end < start`.
    pub fn with_span(mut self, start: usize, end: usize) -> Result<Self, ModelError> {
        if end < start {
            return Err(ModelError::SpanEndBeforeStart { start, end });
        }
        self.span = Some(Span { start, end });
        Ok(self)
    }

    /// Attach one metadata entry, overwriting any prior value for `key`.
    #[must_use]
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<MetaValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Per-check outcome: whether it passed, an optional 0–100 score (higher =
/// safer), and the ordered findings that led to that outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    /// Name of the check.
    pub check: String,
    /// Whether the check passed.
    pub passed: bool,
    /// Optional numeric score in `[0.0, 100.0]`, higher = safer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Findings in the order the check's algorithm produced them.
    pub findings: Vec<Finding>,
}

impl CheckResult {
    /// Build a result. Rejects a score outside `[0.0, 100.0]`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::ScoreOutOfRange`] if `score` is provided and
    /// outside `[0.0, 100.0]`.
    pub fn new(
        check: impl Into<String>,
        passed: bool,
        score: Option<f64>,
        findings: Vec<Finding>,
    ) -> Result<Self, ModelError> {
        if let Some(s) = score
            && !(0.0..=100.0).contains(&s)
        {
            return Err(ModelError::ScoreOutOfRange(s));
        }
        Ok(Self {
            check: check.into(),
            passed,
            score,
            findings,
        })
    }
}
