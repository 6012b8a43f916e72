//! The dispatcher. Normalizes a request, sanitizes its per-request
//! overrides, runs the selected checks, aggregates risk, and assembles the
//! response. Synchronous and CPU-bound throughout — there is no I/O and no
//! suspension point anywhere in [`Engine::run`].

use std::collections::BTreeMap;
use std::panic::{AssertUnwindSafe, catch_unwind};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::checks::{self, Check, REGISTRY_ORDER};
use crate::config::{EngineConfig, LOCKED_KEYS};
use crate::model::{CheckResult, Finding, Severity};
use crate::normalize::normalize;
use crate::risk::{self, RiskTaxonomy};

/// Per-request override payloads larger than this (serialized) are dropped
/// wholesale rather than partially applied.
const MAX_OVERRIDE_PAYLOAD_BYTES: usize = 16 * 1024;

fn default_validators() -> Vec<String> {
    vec!["all".to_string()]
}

/// One content validation request.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidationRequest {
    /// The text to validate.
    pub text: String,
    /// Which checks to run — `["all"]` (the default) expands to the full
    /// registry in [`REGISTRY_ORDER`].
    #[serde(default = "default_validators")]
    pub validators: Vec<String>,
    /// Per-request config overrides, keyed by check name, each a flat map
    /// of scalar values. Subject to sanitization before use (see
    /// [`Engine::run`]).
    #[serde(default)]
    pub config_overrides: BTreeMap<String, Value>,
}

/// The full response for one validation request.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResponse {
    /// Request identifier — caller-supplied, or a generated 32-hex-digit id.
    pub request_id: String,
    /// UTC ISO-8601 timestamp of when the response was assembled.
    pub timestamp: String,
    /// Engine semver. Changes only on verdict-altering taxonomy or pattern
    /// changes.
    pub version: String,
    /// Overall pass/fail: every check that ran passed, and at least one ran.
    pub passed: bool,
    /// Per-check results, in registry/resolution order.
    pub results: Vec<CheckResult>,
    /// Aggregated risk assessment.
    pub risk: RiskTaxonomy,
    /// Length of the original (pre-normalization) request text, in
    /// characters.
    pub text_length: usize,
    /// Number of checks that actually ran (may be `0` on the length-gate
    /// early return).
    pub validators_run: usize,
}

/// Drop locked keys (wherever nested) and non-object check-level entries
/// from `overrides`, or drop the whole payload if it serializes oversized.
/// Every drop is logged at WARN.
fn sanitize_overrides(overrides: BTreeMap<String, Value>) -> BTreeMap<String, Value> {
    if overrides.is_empty() {
        return overrides;
    }

    let serialized_len = serde_json::to_vec(&overrides).map(|b| b.len()).unwrap_or(usize::MAX);
    if serialized_len > MAX_OVERRIDE_PAYLOAD_BYTES {
        warn!(
            serialized_len,
            limit = MAX_OVERRIDE_PAYLOAD_BYTES,
            "config_overrides payload exceeds size limit, dropping all overrides"
        );
        return BTreeMap::new();
    }

    let mut sanitized = BTreeMap::new();
    for (check_name, value) in overrides {
        let Value::Object(map) = value else {
            warn!(check_name, "config_overrides entry is not an object, dropping");
            continue;
        };

        let mut cleaned = serde_json::Map::new();
        for (key, v) in map {
            if LOCKED_KEYS.contains(&key.as_str()) {
                warn!(check_name, key, "dropping locked config key from per-request override");
                continue;
            }
            cleaned.insert(key, v);
        }
        sanitized.insert(check_name, Value::Object(cleaned));
    }
    sanitized
}

/// Merge a per-check override object onto a clone of `base`, producing a
/// transient config for one check instance.
fn merge_override(base: &EngineConfig, override_obj: &Value) -> EngineConfig {
    let mut base_value = serde_json::to_value(base).expect("EngineConfig always serializes");
    if let (Value::Object(base_map), Value::Object(override_map)) = (&mut base_value, override_obj) {
        for (k, v) in override_map {
            base_map.insert(k.clone(), v.clone());
        }
    }
    serde_json::from_value(base_value).unwrap_or_else(|_| base.clone())
}

/// The validation engine: a fixed, read-only config and a set of cached
/// check instances built from it. Both are read-only after construction, so
/// an `Engine` can be shared across threads without locking.
pub struct Engine {
    config: EngineConfig,
    cached_checks: BTreeMap<&'static str, Box<dyn Check>>,
}

impl Engine {
    /// Build an engine from a fully-resolved config, constructing one
    /// cached check instance per registry entry.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        let cached_checks = REGISTRY_ORDER
            .iter()
            .map(|&name| (name, checks::build(name, &config)))
            .collect();
        Self { config, cached_checks }
    }

    /// The checks this engine knows how to run, in registry order.
    #[must_use]
    pub fn available_checks(&self) -> &'static [&'static str] {
        &REGISTRY_ORDER
    }

    fn resolve_selection(&self, requested: &[String]) -> Vec<&'static str> {
        if requested.iter().any(|v| v == "all") {
            return REGISTRY_ORDER.to_vec();
        }

        let mut selected = Vec::new();
        for name in requested {
            match REGISTRY_ORDER.iter().find(|r| *r == name) {
                Some(&known) => selected.push(known),
                None => warn!(check_name = %name, "unknown check name in validators selection, skipping"),
            }
        }
        selected
    }

    fn run_one(&self, name: &'static str, text: &str, overrides: &BTreeMap<String, Value>) -> CheckResult {
        let transient;
        let check: &dyn Check = if let Some(override_obj) = overrides.get(name) {
            let merged_config = merge_override(&self.config, override_obj);
            transient = checks::build(name, &merged_config);
            transient.as_ref()
        } else {
            self.cached_checks
                .get(name)
                .expect("name is drawn from REGISTRY_ORDER, which seeds cached_checks")
                .as_ref()
        };

        match catch_unwind(AssertUnwindSafe(|| check.run(text))) {
            Ok(result) => result,
            Err(panic) => {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "check panicked with a non-string payload".to_string());
                tracing::error!(check_name = name, %message, "check raised unexpectedly, isolating");
                CheckResult::new(
                    name,
                    false,
                    None,
                    vec![Finding::new("engine", Severity::Error, format!("check '{name}' failed: {message}"))],
                )
                .expect("engine-constructed finding has no score, so range validation cannot fail")
            }
        }
    }

    /// Run validation on `request`, returning the full response.
    ///
    /// Steps: length-gate, normalize, sanitize overrides, resolve selection,
    /// dispatch each selected check (isolating panics), compute risk,
    /// assemble the response.
    #[must_use]
    pub fn run(&self, request: &ValidationRequest, request_id: Option<String>) -> ValidationResponse {
        let request_id = request_id.unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string());
        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S+00:00").to_string();
        let text_length = request.text.chars().count();

        if text_length > self.config.max_text_length {
            let finding = Finding::new(
                "engine",
                Severity::Error,
                format!(
                    "request text length {text_length} exceeds the configured limit of {}",
                    self.config.max_text_length
                ),
            );
            let result = CheckResult::new("engine", false, None, vec![finding])
                .expect("engine-constructed finding has no score, so range validation cannot fail");
            return ValidationResponse {
                request_id,
                timestamp,
                version: env!("CARGO_PKG_VERSION").to_string(),
                passed: false,
                results: vec![result],
                risk: risk::terminal_red(),
                text_length,
                validators_run: 0,
            };
        }

        let normalized = normalize(&request.text);
        let overrides = sanitize_overrides(request.config_overrides.clone());
        let selected = self.resolve_selection(&request.validators);

        let results: Vec<CheckResult> =
            selected.iter().map(|&name| self.run_one(name, &normalized, &overrides)).collect();

        let risk_taxonomy = risk::compute(&results);
        let passed = !results.is_empty() && results.iter().all(|r| r.passed);

        ValidationResponse {
            request_id,
            timestamp,
            version: env!("CARGO_PKG_VERSION").to_string(),
            passed,
            validators_run: results.len(),
            results,
            risk: risk_taxonomy,
            text_length,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::RiskLevel;

    fn engine() -> Engine {
        Engine::new(EngineConfig::default())
    }

    fn request(text: &str) -> ValidationRequest {
        ValidationRequest {
            text: text.to_string(),
            validators: vec!["all".to_string()],
            config_overrides: BTreeMap::new(),
        }
    }

    #[test]
    fn clean_text_passes_all_checks_green() {
        let response = engine().run(
            &request("We are proud to share our latest release notes with you and your team."),
            None,
        );
        assert!(response.passed);
        assert_eq!(response.validators_run, 5);
        assert_eq!(response.risk.risk_level, RiskLevel::Green);
    }

    #[test]
    fn oversized_text_short_circuits_with_zero_validators_run() {
        let mut config = EngineConfig::default();
        config.max_text_length = 50;
        let response = Engine::new(config).run(&request(&"A".repeat(100)), None);
        assert!(!response.passed);
        assert_eq!(response.validators_run, 0);
        assert_eq!(response.risk.risk_level, RiskLevel::Red);
        assert!(response.results[0].findings[0].message.contains("exceeds"));
    }

    #[test]
    fn unknown_validator_name_is_skipped_not_fatal() {
        let mut req = request("Plain text.");
        req.validators = vec!["not_a_real_check".to_string()];
        let response = engine().run(&req, None);
        assert_eq!(response.validators_run, 0);
        assert!(!response.passed);
    }

    #[test]
    fn locked_override_key_is_a_no_op() {
        let mut req = request("Plain text with no PII.");
        let mut overrides = serde_json::Map::new();
        overrides.insert("pii_patterns_enabled".to_string(), serde_json::json!([]));
        req.config_overrides.insert("pii".to_string(), Value::Object(overrides));

        let response = engine().run(&req, None);
        let pii_result = response.results.iter().find(|r| r.check == "pii").unwrap();
        assert!(pii_result.passed);
    }

    #[test]
    fn generated_request_id_is_32_hex_characters() {
        let response = engine().run(&request("hello"), None);
        assert_eq!(response.request_id.len(), 32);
        assert!(response.request_id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn caller_supplied_request_id_is_echoed() {
        let response = engine().run(&request("hello"), Some("my-id".to_string()));
        assert_eq!(response.request_id, "my-id");
    }
}
