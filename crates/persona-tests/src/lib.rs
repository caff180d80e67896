//! Shared fixtures for the cross-crate integration tests in `tests/`.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;

use persona_core::entity::ExtractedEntity;
use persona_core::error::{PersonaError, Result};
use persona_core::estimation::TraitEstimator;
use persona_core::extraction::EntityExtractor;
use persona_core::personality::TraitMap;
use persona_extraction::{ExtractorConfig, RuleBasedExtractor};

pub const SAMPLE_TEXT: &str = include_str!("../../../data/complex_example.txt");

pub const SARAH_TEXT: &str = "Sarah works at Microsoft and knows Python.";

/// Returns the same `(text, label)` list for any input.
pub struct FixedExtractor(pub Vec<(&'static str, &'static str)>);

#[async_trait]
impl EntityExtractor for FixedExtractor {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn extract(&self, _text: &str) -> Result<Vec<ExtractedEntity>> {
        Ok(self
            .0
            .iter()
            .map(|(text, label)| ExtractedEntity::new(*text, *label))
            .collect())
    }
}

pub struct FailingExtractor;

#[async_trait]
impl EntityExtractor for FailingExtractor {
    fn name(&self) -> &str {
        "failing"
    }

    async fn extract(&self, _text: &str) -> Result<Vec<ExtractedEntity>> {
        Err(PersonaError::Extraction("model not loaded".into()))
    }
}

pub struct FailingEstimator;

#[async_trait]
impl TraitEstimator for FailingEstimator {
    fn name(&self) -> &str {
        "failing"
    }

    async fn estimate(
        &self,
        _entity_ids: &BTreeSet<String>,
        _texts: Option<&BTreeMap<String, String>>,
    ) -> Result<TraitMap> {
        Err(PersonaError::Estimation("scoring service unreachable".into()))
    }
}

pub fn rule_extractor() -> RuleBasedExtractor {
    RuleBasedExtractor::new(ExtractorConfig::default()).expect("default extractor config is valid")
}
