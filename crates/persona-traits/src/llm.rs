use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;

use persona_core::config::LlmConfig;
use persona_core::error::{PersonaError, Result};
use persona_core::estimation::TraitEstimator;
use persona_core::llm::{extract_json_object, ChatClient, ChatMessage};
use persona_core::personality::{BigFive, TraitMap, TraitProfile, NEUTRAL_SCORE};

use crate::keyword::KeywordEstimator;

/// LLM trait scoring blended with the keyword baseline.
///
/// The final score is `baseline * (1 - w) + llm * w` with `w` the configured
/// LLM weight. Entities without text get the neutral profile and cost no
/// request.
pub struct LlmEstimator {
    client: ChatClient,
    baseline: KeywordEstimator,
    llm_weight: f64,
}

impl LlmEstimator {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        Ok(Self {
            client: ChatClient::new(config)?,
            baseline: KeywordEstimator::new(),
            llm_weight: config.llm_weight.clamp(0.0, 1.0),
        })
    }

    fn build_prompt(text: &str) -> String {
        format!(
            "Analyze the following text and rate the Big Five personality traits \
             (Openness, Conscientiousness, Extraversion, Agreeableness, Neuroticism) \
             on a scale of 0.0 to 1.0. Provide only the numerical scores in JSON format.\n\n\
             Text to analyze: {text}"
        )
    }

    /// Scores from a model response. Keys are matched case-insensitively and
    /// missing traits default to neutral; `None` when no JSON object parses.
    fn parse_scores(raw: &str) -> Option<TraitProfile> {
        let json = extract_json_object(raw.trim())?;
        let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json).ok()?;

        let mut profile = TraitProfile::new();
        for t in BigFive::ALL {
            let score = map
                .iter()
                .find(|(k, _)| k.trim().eq_ignore_ascii_case(t.as_str()))
                .and_then(|(_, v)| v.as_f64().or_else(|| v.as_str()?.trim().parse().ok()))
                .unwrap_or(NEUTRAL_SCORE);
            profile.set(t.as_str(), score);
        }
        Some(profile)
    }

    fn blend(&self, baseline: &TraitProfile, llm: &TraitProfile) -> TraitProfile {
        let mut out = TraitProfile::new();
        for t in BigFive::ALL {
            let base = baseline.score(t).unwrap_or(NEUTRAL_SCORE);
            let model = llm.score(t).unwrap_or(NEUTRAL_SCORE);
            out.set(t.as_str(), base * (1.0 - self.llm_weight) + model * self.llm_weight);
        }
        out
    }

    async fn analyze_text(&self, text: &str) -> Result<TraitProfile> {
        let raw = self
            .client
            .complete(vec![ChatMessage::user(Self::build_prompt(text))])
            .await
            .map_err(|e| PersonaError::Estimation(format!("chat request failed: {e}")))?;

        Ok(Self::parse_scores(&raw).unwrap_or_else(|| {
            tracing::warn!(response_len = raw.len(), "Unparseable trait scores from LLM, using neutral");
            TraitProfile::neutral()
        }))
    }
}

#[async_trait]
impl TraitEstimator for LlmEstimator {
    fn name(&self) -> &str {
        "llm"
    }

    async fn estimate(
        &self,
        entity_ids: &BTreeSet<String>,
        texts: Option<&BTreeMap<String, String>>,
    ) -> Result<TraitMap> {
        let mut out = TraitMap::new();
        for id in entity_ids {
            let profile = match texts.and_then(|t| t.get(id)) {
                Some(text) => {
                    let llm = self.analyze_text(text).await?;
                    self.blend(&self.baseline.estimate_traits(text), &llm)
                }
                None => TraitProfile::neutral(),
            };
            out.insert(id.clone(), profile);
        }
        tracing::info!(entities = out.len(), model = self.client.model(), "LLM trait estimation complete");
        Ok(out)
    }
}
