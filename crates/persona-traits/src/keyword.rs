use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use persona_core::error::Result;
use persona_core::estimation::TraitEstimator;
use persona_core::personality::{BigFive, TraitMap, TraitProfile};

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z]+").expect("valid word regex"));

fn keywords(t: BigFive) -> &'static [&'static str] {
    match t {
        BigFive::Openness => &["creative", "innovative", "curious", "artistic", "imaginative"],
        BigFive::Conscientiousness => &["organized", "responsible", "methodical", "thorough", "systematic"],
        BigFive::Extraversion => &["outgoing", "sociable", "energetic", "assertive", "talkative"],
        BigFive::Agreeableness => &["cooperative", "compassionate", "helpful", "sympathetic", "kind"],
        BigFive::Neuroticism => &["anxious", "tense", "worried", "nervous", "stressed"],
    }
}

/// Scores traits by counting trait keywords in the text.
///
/// Each trait gets `count / (total + 1)` where `total` counts keyword hits of
/// all traits. Text without any hit gets the neutral profile.
#[derive(Debug, Clone, Default)]
pub struct KeywordEstimator;

impl KeywordEstimator {
    pub fn new() -> Self {
        Self
    }

    pub fn estimate_traits(&self, text: &str) -> TraitProfile {
        let lower = text.to_lowercase();
        let mut counts = [0usize; 5];
        let mut total = 0usize;

        for word in WORD_RE.find_iter(&lower) {
            for (slot, t) in BigFive::ALL.iter().enumerate() {
                if keywords(*t).contains(&word.as_str()) {
                    counts[slot] += 1;
                    total += 1;
                }
            }
        }

        if total == 0 {
            return TraitProfile::neutral();
        }

        let mut profile = TraitProfile::new();
        for (slot, t) in BigFive::ALL.iter().enumerate() {
            let score = (counts[slot] as f64 / (total + 1) as f64).min(1.0);
            profile.set(t.as_str(), score);
        }
        profile
    }
}

#[async_trait]
impl TraitEstimator for KeywordEstimator {
    fn name(&self) -> &str {
        "keyword"
    }

    async fn estimate(
        &self,
        entity_ids: &BTreeSet<String>,
        texts: Option<&BTreeMap<String, String>>,
    ) -> Result<TraitMap> {
        let out = entity_ids
            .iter()
            .map(|id| {
                let profile = match texts.and_then(|t| t.get(id)) {
                    Some(text) => self.estimate_traits(text),
                    None => TraitProfile::neutral(),
                };
                (id.clone(), profile)
            })
            .collect();
        Ok(out)
    }
}
