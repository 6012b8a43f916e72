//! The five content checks and the trait the engine dispatches through.

pub mod brand_voice;
pub mod forbidden_phrases;
pub mod pii;
pub mod prompt_injection;
pub mod readability;

use crate::config::EngineConfig;
use crate::model::CheckResult;

/// Static registry order. `["all"]` in a request expands to this list, and
/// response `results` appear in this order unless the caller narrowed the
/// selection.
pub const REGISTRY_ORDER: [&str; 5] = [
    "forbidden_phrases",
    "pii",
    "brand_voice",
    "prompt_injection",
    "readability",
];

/// One independent content inspection. Implementations compile their
/// pattern sets once at construction (`from_config`) and hold only
/// read-only data thereafter, so a built check is safely shared across
/// threads.
pub trait Check: Send + Sync {
    /// The check's registry name — matches one entry in [`REGISTRY_ORDER`].
    fn name(&self) -> &'static str;

    /// Run the check against already-normalized text and return its result.
    fn run(&self, normalized_text: &str) -> CheckResult;
}

/// Construct the check with the given name from a fully-resolved config.
///
/// # Panics
///
/// Panics if `name` is not one of [`REGISTRY_ORDER`] — callers must resolve
/// names against the registry first (see `crate::engine::Engine::resolve`).
#[must_use]
pub fn build(name: &str, config: &EngineConfig) -> Box<dyn Check> {
    match name {
        "forbidden_phrases" => Box::new(forbidden_phrases::ForbiddenPhrasesCheck::new(config)),
        "pii" => Box::new(pii::PiiCheck::new(config)),
        "brand_voice" => Box::new(brand_voice::BrandVoiceCheck::new(config)),
        "prompt_injection" => Box::new(prompt_injection::PromptInjectionCheck::new(config)),
        "readability" => Box::new(readability::ReadabilityCheck::new(config)),
        other => panic!("unknown check name in registry: {other}"),
    }
}
