use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PersonaError, Result};

/// Which trait estimation strategy the pipeline uses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EstimatorKind {
    Keyword,
    Random,
    Llm,
}

impl FromStr for EstimatorKind {
    type Err = PersonaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "keyword" | "heuristic" => Ok(EstimatorKind::Keyword),
            "random" | "stub" => Ok(EstimatorKind::Random),
            "llm" => Ok(EstimatorKind::Llm),
            other => Err(PersonaError::Config(format!("unknown estimator '{other}'"))),
        }
    }
}

/// Which entity extractor feeds the graph.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExtractorKind {
    Rules,
    Llm,
}

impl FromStr for ExtractorKind {
    type Err = PersonaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "rules" | "rule" => Ok(ExtractorKind::Rules),
            "llm" => Ok(ExtractorKind::Llm),
            other => Err(PersonaError::Config(format!("unknown extractor '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub api_key: String,
    /// Base URL of an OpenAI-compatible chat completions API.
    pub base_url: String,
    pub model: String,
    pub temperature: f64,
    /// Weight of the LLM score when blended with the keyword baseline.
    pub llm_weight: f64,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.groq.com/openai/v1".into(),
            model: "mixtral-8x7b-32768".into(),
            temperature: 0.3,
            llm_weight: 0.6,
            timeout_secs: 60,
        }
    }
}

impl LlmConfig {
    pub fn baseline_weight(&self) -> f64 {
        1.0 - self.llm_weight
    }

    pub fn completions_url(&self) -> Result<url::Url> {
        let base = url::Url::parse(&self.base_url)
            .map_err(|e| PersonaError::Config(format!("invalid LLM base URL '{}': {e}", self.base_url)))?;
        let joined = format!("{}/chat/completions", base.as_str().trim_end_matches('/'));
        url::Url::parse(&joined)
            .map_err(|e| PersonaError::Config(format!("invalid completions URL '{joined}': {e}")))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub sample_path: PathBuf,
    pub output_path: PathBuf,
    pub source_id: String,
    pub extractor: ExtractorKind,
    pub estimator: EstimatorKind,
    pub random_seed: Option<u64>,
    /// Test both `(a, b)` and `(b, a)` against the relationship rule table.
    pub symmetric_inference: bool,
    pub llm: LlmConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sample_path: PathBuf::from("data/complex_example.txt"),
            output_path: PathBuf::from("knowledge_graph.html"),
            source_id: "doc".into(),
            extractor: ExtractorKind::Rules,
            estimator: EstimatorKind::Keyword,
            random_seed: None,
            symmetric_inference: false,
            llm: LlmConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable lookup. Unparseable values
    /// fall back to their defaults.
    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let llm_defaults = LlmConfig::default();

        let estimator = match lookup("PERSONA_ESTIMATOR") {
            Some(v) => v.parse().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Falling back to keyword estimator");
                EstimatorKind::Keyword
            }),
            None => defaults.estimator,
        };

        let extractor = match lookup("PERSONA_EXTRACTOR") {
            Some(v) => v.parse().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Falling back to rule-based extractor");
                ExtractorKind::Rules
            }),
            None => defaults.extractor,
        };

        Self {
            sample_path: lookup("PERSONA_SAMPLE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.sample_path),
            output_path: lookup("PERSONA_OUTPUT_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_path),
            source_id: lookup("PERSONA_SOURCE_ID").unwrap_or(defaults.source_id),
            extractor,
            estimator,
            random_seed: lookup("PERSONA_RANDOM_SEED").and_then(|s| s.parse().ok()),
            symmetric_inference: lookup("PERSONA_SYMMETRIC_INFERENCE")
                .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(defaults.symmetric_inference),
            llm: LlmConfig {
                api_key: lookup("GROQ_API_KEY").unwrap_or_default(),
                base_url: lookup("PERSONA_LLM_BASE_URL").unwrap_or(llm_defaults.base_url),
                model: lookup("PERSONA_LLM_MODEL").unwrap_or(llm_defaults.model),
                temperature: lookup("PERSONA_LLM_TEMPERATURE")
                    .and_then(|t| t.parse().ok())
                    .unwrap_or(llm_defaults.temperature),
                llm_weight: lookup("PERSONA_LLM_WEIGHT")
                    .and_then(|w| w.parse().ok())
                    .unwrap_or(llm_defaults.llm_weight),
                timeout_secs: lookup("PERSONA_LLM_TIMEOUT_SECS")
                    .and_then(|t| t.parse().ok())
                    .unwrap_or(llm_defaults.timeout_secs),
            },
        }
    }

    pub fn uses_llm(&self) -> bool {
        self.extractor == ExtractorKind::Llm || self.estimator == EstimatorKind::Llm
    }

    pub fn validate(&self) -> Result<()> {
        if self.source_id.trim().is_empty() {
            return Err(PersonaError::Config("source id must not be empty".into()));
        }
        if !(0.0..=1.0).contains(&self.llm.llm_weight) {
            return Err(PersonaError::Config(format!(
                "LLM weight must be within [0, 1], got {}",
                self.llm.llm_weight
            )));
        }
        if self.uses_llm() {
            if self.llm.api_key.is_empty() {
                return Err(PersonaError::Config(
                    "GROQ_API_KEY is required for the llm extractor or estimator".into(),
                ));
            }
            self.llm.completions_url()?;
        }
        Ok(())
    }
}
