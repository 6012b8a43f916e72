//! ```text
//! EngineConfig ──► Engine::new ──► Engine
//!                                    │
//!                                    ├─► normalize()
//!                                    ├─► sanitize config_overrides
//!                                    ├─► resolve_selection()
//!                                    │
//!                                    └─► per selected check ──► CheckResult
//!                                          ├─► forbidden_phrases
//!                                          ├─► pii
//!                                          ├─► brand_voice
//!                                          ├─► prompt_injection
//!                                          └─► readability
//!                                                  │
//!                                                  └─► risk::compute() ──► RiskTaxonomy
//!                                                          │
//!                                                          └─► ValidationResponse
//! ```
//!
//! # contentwarden
//!
//! **Pre-publication content validation engine.**
//!
//! `contentwarden` screens a single block of text against a fixed battery of
//! content checks — forbidden phrases, PII, brand voice, prompt-injection
//! patterns, and readability — before publication, and rolls every check's
//! outcome into one weighted, five-axis composite risk score with a
//! traffic-light verdict.
//!
//! ## Quick Start
//!
//! ```rust
//! use contentwarden::prelude::*;
//!
//! let engine = Engine::new(EngineConfig::default());
//! let request = ValidationRequest {
//!     text: "We're excited to share our quarterly results with you.".to_string(),
//!     validators: vec!["all".to_string()],
//!     config_overrides: Default::default(),
//! };
//! let response = engine.run(&request, None);
//! assert!(response.passed);
//! ```
//!
//! ## Key properties
//!
//! - **Synchronous, CPU-bound** – no I/O and no async runtime anywhere in
//!   the validation path.
//! - **Thread-safe without locking** – an [`Engine`] is read-only after
//!   construction and may be shared across threads freely.
//! - **Deterministic** – normalization is total and idempotent; check
//!   and finding ordering is fixed by registry/algorithm order, never by
//!   iteration-order artifacts.
//! - **No PII leakage** – PII findings carry only a fixed redaction
//!   placeholder, never the matched substring (see [`checks::pii`]).
//!
//! ## Modules
//!
//! - [`config`] – layered configuration: defaults → overlay file → env
//! - [`model`] – shared vocabulary: [`model::Severity`], [`model::Finding`],
//!   [`model::CheckResult`]
//! - [`normalize`] – text canonicalization
//! - [`checks`] – the five content checks and the [`checks::Check`] trait
//! - [`risk`] – the five-axis weighted risk taxonomy
//! - [`engine`] – the dispatcher: [`engine::Engine`], [`engine::ValidationRequest`],
//!   [`engine::ValidationResponse`]

#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod checks;
pub mod config;
pub mod engine;
pub mod model;
pub mod normalize;
pub mod risk;

/// Re-exports for convenient access to the engine's public surface.
pub mod prelude {
    pub use crate::checks::Check;
    pub use crate::config::{ConfigBuilder, ConfigError, EngineConfig, PiiPatternType};
    pub use crate::engine::{Engine, ValidationRequest, ValidationResponse};
    pub use crate::model::{CheckResult, Finding, MetaValue, Severity, Span};
    pub use crate::risk::{RiskAxis, RiskLevel, RiskTaxonomy};
}
