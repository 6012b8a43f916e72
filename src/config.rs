//! Configuration surface — layered defaults → external overlay (one
//! document, loaded at engine construction) → environment-scoped overrides.
//!
//! Per-request overrides are handled separately by the engine
//! (`crate::engine`), which sanitizes them against the [`LOCKED_KEYS`]
//! allowlist before merging them onto this config for a transient check
//! instance.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

/// Config keys callers may never override per-request — doing so would
/// disable a safety mechanism (e.g. turning off PII detection or raising the
/// length limit).
pub const LOCKED_KEYS: [&str; 3] = ["pii_patterns_enabled", "forbidden_phrases", "max_text_length"];

/// Errors raised while building an [`EngineConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the overlay file.
    #[error("failed to read config file at {path}: {source}")]
    FileRead {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the overlay file.
    #[error("failed to parse {format} config: {source}")]
    ParseError {
        /// Format that failed to parse (YAML, TOML, JSON).
        format: String,
        /// Underlying parse error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Unsupported or unrecognised configuration file extension.
    #[error("unsupported config file format: {message}")]
    UnsupportedFormat {
        /// Description of the problem.
        message: String,
    },

    /// Configuration validation failed.
    #[error("config validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// Environment variable parsing error.
    #[error("failed to parse environment variable {key}: {message}")]
    EnvParse {
        /// Environment variable key.
        key: String,
        /// Error message.
        message: String,
    },
}

/// One of the four PII pattern families a request may enable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PiiPatternType {
    /// Email addresses.
    Email,
    /// NANP phone numbers.
    Phone,
    /// US Social Security Numbers.
    Ssn,
    /// Credit card numbers.
    CreditCard,
}

impl PiiPatternType {
    /// All four known types, the default-enabled set.
    #[must_use]
    pub fn all() -> Vec<Self> {
        vec![Self::Email, Self::Phone, Self::Ssn, Self::CreditCard]
    }
}

fn default_max_text_length() -> usize {
    500_000
}

fn default_forbidden_phrases() -> Vec<String> {
    vec![
        "as an ai".to_string(),
        "as a language model".to_string(),
        "i cannot and will not".to_string(),
        "i'm just an ai".to_string(),
        "delve".to_string(),
        "leverage".to_string(),
        "synergy".to_string(),
        "game-changer".to_string(),
        "circle back".to_string(),
        "deep dive".to_string(),
        "unpack".to_string(),
        "at the end of the day".to_string(),
    ]
}

fn default_pii_patterns_enabled() -> Vec<PiiPatternType> {
    PiiPatternType::all()
}

fn default_brand_voice_tone() -> String {
    "professional".to_string()
}

fn default_brand_voice_target_score() -> f64 {
    60.0
}

fn default_readability_min_score() -> f64 {
    30.0
}

fn default_readability_max_score() -> f64 {
    80.0
}

/// The engine's effective, immutable configuration once built. Construction
/// is the only place validation happens; an `EngineConfig` is read-only for
/// the rest of its lifetime, which is what lets the engine and its checks be
/// shared across threads without locking.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum accepted request text length, in characters.
    #[validate(range(min = 1))]
    #[serde(default = "default_max_text_length")]
    pub max_text_length: usize,

    /// Case-insensitive needle strings the forbidden-phrase check scans for.
    #[serde(default = "default_forbidden_phrases")]
    pub forbidden_phrases: Vec<String>,

    /// Which PII pattern families the PII check runs.
    #[serde(default = "default_pii_patterns_enabled")]
    pub pii_patterns_enabled: Vec<PiiPatternType>,

    /// Target tone for the brand-voice check.
    #[serde(default = "default_brand_voice_tone")]
    pub brand_voice_tone: String,

    /// Keywords the brand-voice check rewards for appearing.
    #[serde(default)]
    pub brand_voice_keywords: Vec<String>,

    /// Minimum brand-voice score required to pass.
    #[validate(range(min = 0.0, max = 100.0))]
    #[serde(default = "default_brand_voice_target_score")]
    pub brand_voice_target_score: f64,

    /// Minimum acceptable Flesch reading-ease score.
    #[validate(range(min = 0.0, max = 100.0))]
    #[serde(default = "default_readability_min_score")]
    pub readability_min_score: f64,

    /// Maximum acceptable Flesch reading-ease score.
    #[validate(range(min = 0.0, max = 100.0))]
    #[serde(default = "default_readability_max_score")]
    pub readability_max_score: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_text_length: default_max_text_length(),
            forbidden_phrases: default_forbidden_phrases(),
            pii_patterns_enabled: default_pii_patterns_enabled(),
            brand_voice_tone: default_brand_voice_tone(),
            brand_voice_keywords: Vec::new(),
            brand_voice_target_score: default_brand_voice_target_score(),
            readability_min_score: default_readability_min_score(),
            readability_max_score: default_readability_max_score(),
        }
    }
}

/// Builder for constructing an [`EngineConfig`] from built-in defaults, an
/// optional overlay file, and environment-scoped overrides — applied in
/// that order, later wins.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    base: EngineConfig,
    use_env: bool,
}

impl ConfigBuilder {
    /// Start from the built-in defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: EngineConfig::default(),
            use_env: false,
        }
    }

    /// Load the single overlay document (YAML, TOML, or JSON, sniffed by
    /// file extension).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        let config: EngineConfig = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => {
                serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
                    format: "YAML".to_string(),
                    source: Box::new(e),
                })?
            }
            Some("toml") => toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                format: "TOML".to_string(),
                source: Box::new(e),
            })?,
            Some("json") => {
                serde_json::from_str(&content).map_err(|e| ConfigError::ParseError {
                    format: "JSON".to_string(),
                    source: Box::new(e),
                })?
            }
            _ => {
                return Err(ConfigError::UnsupportedFormat {
                    message: "file extension must be .yaml, .yml, .toml, or .json".to_string(),
                });
            }
        };

        self.base = config;
        Ok(self)
    }

    /// Enable loading overrides from `CONTENTWARDEN_*` environment
    /// variables (and a `.env` file, if present).
    #[must_use]
    pub fn with_env(mut self) -> Self {
        self.use_env = true;
        self
    }

    /// Build and validate the final config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if validation fails or an environment
    /// variable holds an unparseable value.
    pub fn build(mut self) -> Result<EngineConfig, ConfigError> {
        if self.use_env {
            dotenvy::dotenv().ok();

            if let Ok(raw) = std::env::var("CONTENTWARDEN_MAX_TEXT_LENGTH") {
                self.base.max_text_length = raw.parse().map_err(|_| ConfigError::EnvParse {
                    key: "CONTENTWARDEN_MAX_TEXT_LENGTH".to_string(),
                    message: "must be a positive integer".to_string(),
                })?;
            }

            if let Ok(raw) = std::env::var("CONTENTWARDEN_BRAND_VOICE_TONE") {
                self.base.brand_voice_tone = raw;
            }

            if let Ok(raw) = std::env::var("CONTENTWARDEN_BRAND_VOICE_TARGET_SCORE") {
                self.base.brand_voice_target_score =
                    raw.parse().map_err(|_| ConfigError::EnvParse {
                        key: "CONTENTWARDEN_BRAND_VOICE_TARGET_SCORE".to_string(),
                        message: "must be a number".to_string(),
                    })?;
            }
        }

        self.base.validate()?;
        Ok(self.base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = EngineConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.max_text_length, 500_000);
        assert_eq!(cfg.pii_patterns_enabled.len(), 4);
    }

    #[test]
    fn builder_with_no_file_or_env_yields_defaults() {
        let cfg = ConfigBuilder::new().build().unwrap();
        assert_eq!(cfg.brand_voice_target_score, 60.0);
    }

    #[test]
    fn zero_max_text_length_fails_validation() {
        let mut cfg = EngineConfig::default();
        cfg.max_text_length = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn loads_yaml_overlay() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.yaml");
        std::fs::write(&path, "max_text_length: 1000\nbrand_voice_tone: casual\n").unwrap();
        let cfg = ConfigBuilder::new().with_file(&path).unwrap().build().unwrap();
        assert_eq!(cfg.max_text_length, 1000);
        assert_eq!(cfg.brand_voice_tone, "casual");
    }

    #[test]
    fn rejects_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.ini");
        std::fs::write(&path, "max_text_length=1000").unwrap();
        let err = ConfigBuilder::new().with_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat { .. }));
    }

    #[test]
    fn locked_keys_cover_the_three_named_in_spec() {
        assert!(LOCKED_KEYS.contains(&"pii_patterns_enabled"));
        assert!(LOCKED_KEYS.contains(&"forbidden_phrases"));
        assert!(LOCKED_KEYS.contains(&"max_text_length"));
        assert_eq!(LOCKED_KEYS.len(), 3);
    }
}
