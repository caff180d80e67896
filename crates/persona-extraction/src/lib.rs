use persona_core::config::{AppConfig, ExtractorKind};
use persona_core::error::Result;
use persona_core::extraction::EntityExtractor;

mod llm;
mod rules;

pub use llm::LlmEntityExtractor;
pub use rules::{EntityPattern, ExtractorConfig, RuleBasedExtractor};

/// Extractor selected by `config.extractor`. The rule-based one uses the
/// built-in patterns.
pub fn build_extractor(config: &AppConfig) -> Result<Box<dyn EntityExtractor>> {
    let extractor: Box<dyn EntityExtractor> = match config.extractor {
        ExtractorKind::Rules => Box::new(RuleBasedExtractor::new(ExtractorConfig::default())?),
        ExtractorKind::Llm => Box::new(LlmEntityExtractor::new(&config.llm)?),
    };
    tracing::info!(extractor = extractor.name(), "Selected entity extractor");
    Ok(extractor)
}
