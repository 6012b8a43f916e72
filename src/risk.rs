//! Risk taxonomy: aggregates per-check results into five weighted axes, a
//! critical-finding escalation bonus, and a single composite score with a
//! traffic-light band.
//!
//! Weights are 0.30/0.25/0.20/0.15/0.10 across axes A-E, and a higher raw
//! axis score means more risk. See `DESIGN.md` for the rationale behind this
//! weighting over alternatives considered during design.

use serde::{Deserialize, Serialize};

use crate::model::CheckResult;

struct AxisDef {
    axis: &'static str,
    label: &'static str,
    weight: f64,
    checks: &'static [&'static str],
}

const AXES: &[AxisDef] = &[
    AxisDef {
        axis: "A",
        label: "Synthetic Artifacts",
        weight: 0.30,
        checks: &["forbidden_phrases", "readability"],
    },
    AxisDef {
        axis: "B",
        label: "Hallucination / Factual Integrity",
        weight: 0.25,
        checks: &["readability"],
    },
    AxisDef {
        axis: "C",
        label: "Brand Safety",
        weight: 0.20,
        checks: &["brand_voice"],
    },
    AxisDef {
        axis: "D",
        label: "Regulatory Compliance / PII",
        weight: 0.15,
        checks: &["pii"],
    },
    AxisDef {
        axis: "E",
        label: "Adversarial Robustness / Injection",
        weight: 0.10,
        checks: &["prompt_injection"],
    },
];

/// One axis's contribution to the composite score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAxis {
    /// Single-letter axis identifier (`"A"`..`"E"`).
    pub axis: String,
    /// Human-readable axis name.
    pub label: String,
    /// This axis's fixed weight in the composite sum.
    pub weight: f64,
    /// Raw risk contribution from this axis's checks, in `[0, 100]`.
    pub raw_score: f64,
    /// `raw_score * weight`.
    pub weighted_score: f64,
}

/// Traffic-light risk band derived from the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    /// `[0, 20)`.
    Green,
    /// `[20, 50)`.
    Yellow,
    /// `[50, 80)`.
    Orange,
    /// `[80, 100]`.
    Red,
}

impl RiskLevel {
    fn from_composite(composite: f64) -> Self {
        if composite >= 80.0 {
            Self::Red
        } else if composite >= 50.0 {
            Self::Orange
        } else if composite >= 20.0 {
            Self::Yellow
        } else {
            Self::Green
        }
    }
}

/// The complete risk assessment for one validation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskTaxonomy {
    /// Final weighted-sum-plus-escalation score, clamped to `[0, 100]`.
    pub composite_risk_score: f64,
    /// Traffic-light band derived from `composite_risk_score`.
    pub risk_level: RiskLevel,
    /// Per-axis breakdown, in the fixed A-E order.
    pub axes: Vec<RiskAxis>,
}

/// Raw per-check contribution to its axis:
/// - a clean pass contributes 0
/// - a scored failure contributes `100 - score`
/// - an unscored failure contributes the summed severity points of its
///   findings, capped at 100
fn raw_contribution(result: &CheckResult) -> f64 {
    if result.passed && result.findings.is_empty() {
        return 0.0;
    }
    if !result.passed {
        if let Some(score) = result.score {
            return (100.0 - score).clamp(0.0, 100.0);
        }
    }
    let points: f64 = result.findings.iter().map(|f| f.severity.points()).sum();
    points.min(100.0)
}

/// Compute the full risk taxonomy from this request's check results. Checks
/// that were not run (narrowed selection) contribute `0` to any axis they'd
/// otherwise feed.
#[must_use]
pub fn compute(results: &[CheckResult]) -> RiskTaxonomy {
    let mut axes = Vec::with_capacity(AXES.len());

    for def in AXES {
        let contributions: Vec<f64> = def
            .checks
            .iter()
            .map(|name| {
                results
                    .iter()
                    .find(|r| r.check == *name)
                    .map(raw_contribution)
                    .unwrap_or(0.0)
            })
            .collect();

        let raw = if contributions.is_empty() {
            0.0
        } else {
            (contributions.iter().sum::<f64>() / contributions.len() as f64).clamp(0.0, 100.0)
        };

        axes.push(RiskAxis {
            axis: def.axis.to_string(),
            label: def.label.to_string(),
            weight: def.weight,
            raw_score: raw,
            weighted_score: raw * def.weight,
        });
    }

    let critical_axes = AXES
        .iter()
        .filter(|def| {
            def.checks.iter().any(|name| {
                results
                    .iter()
                    .find(|r| r.check == *name)
                    .is_some_and(|r| r.findings.iter().any(|f| f.severity == crate::model::Severity::Critical))
            })
        })
        .count();

    let escalation = match critical_axes {
        0 => 0.0,
        1 => 40.0,
        2 => 80.0,
        _ => 100.0,
    };

    let weighted_sum: f64 = axes.iter().map(|a| a.weighted_score).sum();
    let composite = (weighted_sum + escalation).min(100.0);
    let composite = (composite * 10.0).round() / 10.0;

    RiskTaxonomy {
        composite_risk_score: composite,
        risk_level: RiskLevel::from_composite(composite),
        axes,
    }
}

/// A terminal, empty-axes risk result used when the request is rejected
/// before any check runs (oversized text).
#[must_use]
pub fn terminal_red() -> RiskTaxonomy {
    RiskTaxonomy {
        composite_risk_score: 100.0,
        risk_level: RiskLevel::Red,
        axes: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CheckResult, Finding, Severity};

    #[test]
    fn all_clean_results_yield_green() {
        let results: Vec<CheckResult> = ["forbidden_phrases", "pii", "brand_voice", "prompt_injection", "readability"]
            .iter()
            .map(|name| CheckResult::new(*name, true, Some(100.0), vec![]).unwrap())
            .collect();
        let taxonomy = compute(&results);
        assert_eq!(taxonomy.composite_risk_score, 0.0);
        assert_eq!(taxonomy.risk_level, RiskLevel::Green);
    }

    #[test]
    fn axis_weights_sum_to_one() {
        let total: f64 = AXES.iter().map(|a| a.weight).sum();
        assert!((total - 1.0).abs() < 0.001);
    }

    #[test]
    fn single_critical_finding_axis_adds_forty_point_escalation() {
        let pii_finding = Finding::new("pii", Severity::Critical, "Potential EMAIL detected (redacted: ***@***.***)");
        let results = vec![
            CheckResult::new("pii", false, None, vec![pii_finding]).unwrap(),
            CheckResult::new("forbidden_phrases", true, None, vec![]).unwrap(),
        ];
        let taxonomy = compute(&results);
        // D-axis raw = 80 (critical points) * 0.15 weight = 12, plus 40 escalation = 52.
        assert!(taxonomy.composite_risk_score >= 50.0);
        assert_eq!(taxonomy.risk_level, RiskLevel::Orange);
    }

    #[test]
    fn composite_is_always_within_bounds() {
        let all_critical: Vec<CheckResult> = ["forbidden_phrases", "pii", "brand_voice", "prompt_injection", "readability"]
            .iter()
            .map(|name| {
                let f = Finding::new(*name, Severity::Critical, "x");
                CheckResult::new(*name, false, None, vec![f; 5]).unwrap()
            })
            .collect();
        let taxonomy = compute(&all_critical);
        assert!(taxonomy.composite_risk_score <= 100.0);
        assert_eq!(taxonomy.risk_level, RiskLevel::Red);
    }

    #[test]
    fn terminal_red_has_no_axes() {
        let taxonomy = terminal_red();
        assert!(taxonomy.axes.is_empty());
        assert_eq!(taxonomy.composite_risk_score, 100.0);
    }
}
