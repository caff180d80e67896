use std::collections::{BTreeMap, BTreeSet};

use persona_core::config::{AppConfig, EstimatorKind};
use persona_core::error::Result;
use persona_core::estimation::TraitEstimator;
use persona_core::personality::{TraitMap, TraitProfile, NEUTRAL_SCORE};

mod keyword;
mod llm;
mod random;

pub use keyword::KeywordEstimator;
pub use llm::LlmEstimator;
pub use random::RandomEstimator;

/// Estimator selected by `config.estimator`.
pub fn build_estimator(config: &AppConfig) -> Result<Box<dyn TraitEstimator>> {
    let estimator: Box<dyn TraitEstimator> = match config.estimator {
        EstimatorKind::Keyword => Box::new(KeywordEstimator::new()),
        EstimatorKind::Random => Box::new(RandomEstimator::new(config.random_seed)),
        EstimatorKind::Llm => Box::new(LlmEstimator::new(&config.llm)?),
    };
    tracing::info!(estimator = estimator.name(), "Selected trait estimator");
    Ok(estimator)
}

/// Runs `estimator` and normalises its output for merging.
///
/// Every requested id ends up with all five Big Five traits: ids the
/// estimator left out get the neutral profile, traits it left out get
/// [`NEUTRAL_SCORE`]. If the estimator fails, every requested id gets the
/// neutral profile.
pub async fn estimate_or_neutral(
    estimator: &dyn TraitEstimator,
    entity_ids: &BTreeSet<String>,
    texts: Option<&BTreeMap<String, String>>,
) -> TraitMap {
    let mut map = match estimator.estimate(entity_ids, texts).await {
        Ok(map) => map,
        Err(e) => {
            tracing::warn!(
                estimator = estimator.name(),
                error = %e,
                entities = entity_ids.len(),
                "Trait estimation failed, substituting neutral scores"
            );
            return neutral_map(entity_ids);
        }
    };

    let mut filled = 0;
    for id in entity_ids {
        filled += map
            .entry(id.clone())
            .or_default()
            .fill_missing(NEUTRAL_SCORE);
    }
    if filled > 0 {
        tracing::debug!(filled = filled, "Filled missing trait scores with neutral default");
    }
    map
}

pub fn neutral_map(entity_ids: &BTreeSet<String>) -> TraitMap {
    entity_ids
        .iter()
        .map(|id| (id.clone(), TraitProfile::neutral()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use persona_core::error::PersonaError;
    use persona_core::personality::BigFive;

    struct PartialEstimator;

    #[async_trait]
    impl TraitEstimator for PartialEstimator {
        fn name(&self) -> &str {
            "partial"
        }

        async fn estimate(
            &self,
            _ids: &BTreeSet<String>,
            _texts: Option<&BTreeMap<String, String>>,
        ) -> Result<TraitMap> {
            let mut map = TraitMap::new();
            map.insert("a".into(), TraitProfile::from_pairs([("openness", 0.9)]));
            Ok(map)
        }
    }

    struct BrokenEstimator;

    #[async_trait]
    impl TraitEstimator for BrokenEstimator {
        fn name(&self) -> &str {
            "broken"
        }

        async fn estimate(
            &self,
            _ids: &BTreeSet<String>,
            _texts: Option<&BTreeMap<String, String>>,
        ) -> Result<TraitMap> {
            Err(PersonaError::Estimation("service unavailable".into()))
        }
    }

    fn ids() -> BTreeSet<String> {
        ["a".to_string(), "b".to_string()].into()
    }

    #[tokio::test]
    async fn test_partial_output_is_filled() {
        let map = estimate_or_neutral(&PartialEstimator, &ids(), None).await;
        assert_eq!(map.len(), 2);
        assert!(map.values().all(TraitProfile::is_complete));
        assert_eq!(map["a"].score(BigFive::Openness), Some(0.9));
        assert_eq!(map["a"].score(BigFive::Neuroticism), Some(NEUTRAL_SCORE));
        assert_eq!(map["b"], TraitProfile::neutral());
    }

    #[tokio::test]
    async fn test_failure_substitutes_neutral_for_all() {
        let map = estimate_or_neutral(&BrokenEstimator, &ids(), None).await;
        assert_eq!(map, neutral_map(&ids()));
    }

    #[test]
    fn test_build_estimator_by_kind() {
        let mut config = AppConfig::default();
        assert_eq!(build_estimator(&config).unwrap().name(), "keyword");
        config.estimator = EstimatorKind::Random;
        config.random_seed = Some(42);
        assert_eq!(build_estimator(&config).unwrap().name(), "random");
        config.estimator = EstimatorKind::Llm;
        config.llm.base_url = "not a url".into();
        assert!(build_estimator(&config).is_err());
    }
}
