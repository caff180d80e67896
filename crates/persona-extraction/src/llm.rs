use async_trait::async_trait;
use serde::Deserialize;

use persona_core::config::LlmConfig;
use persona_core::entity::{EntityLabel, ExtractedEntity};
use persona_core::error::{PersonaError, Result};
use persona_core::extraction::EntityExtractor;
use persona_core::llm::{extract_json_object, ChatClient, ChatMessage};

const SYSTEM_PROMPT: &str = r#"You are a named-entity extraction system.

Given a text, list every mention of a person, organization, skill or personality trait, in the order the mentions appear.

Return ONLY valid JSON (no markdown fences, no commentary) matching this exact schema:

{
  "entities": [
    { "text": "exact surface text as it appears", "label": "PERSON | ORG | SKILL | TRAIT" }
  ]
}

Rules:
- "text" MUST be copied verbatim from the input.
- Repeat an entity once per mention.
- If nothing can be extracted, return {"entities": []}."#;

/// Entity extraction backed by an OpenAI-compatible chat model.
pub struct LlmEntityExtractor {
    client: ChatClient,
}

#[derive(Debug, Deserialize)]
struct LlmExtractionOutput {
    #[serde(default)]
    entities: Vec<LlmEntity>,
}

#[derive(Debug, Deserialize)]
struct LlmEntity {
    text: String,
    label: String,
}

impl LlmEntityExtractor {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        Ok(Self {
            client: ChatClient::new(config)?,
        })
    }

    fn parse_response(raw: &str) -> Result<Vec<ExtractedEntity>> {
        let json = extract_json_object(raw).ok_or_else(|| {
            PersonaError::Extraction("no JSON object in model response".to_string())
        })?;

        let output: LlmExtractionOutput = serde_json::from_str(json).map_err(|e| {
            tracing::error!(raw = %json, error = %e, "Failed to parse LLM extraction JSON");
            PersonaError::Extraction(format!("Failed to parse LLM JSON output: {e}"))
        })?;

        output
            .entities
            .into_iter()
            .enumerate()
            .map(|(i, e)| {
                if e.text.trim().is_empty() || e.label.trim().is_empty() {
                    return Err(PersonaError::Extraction(format!(
                        "model returned an empty entity at index {i}"
                    )));
                }
                Ok(ExtractedEntity::new(e.text, EntityLabel::parse(&e.label)))
            })
            .collect()
    }
}

#[async_trait]
impl EntityExtractor for LlmEntityExtractor {
    fn name(&self) -> &str {
        "llm"
    }

    async fn extract(&self, text: &str) -> Result<Vec<ExtractedEntity>> {
        tracing::info!(
            model = self.client.model(),
            content_len = text.len(),
            "Starting LLM entity extraction"
        );

        let raw = self
            .client
            .complete(vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(format!("Text:\n{text}")),
            ])
            .await
            .map_err(|e| PersonaError::Extraction(format!("chat request failed: {e}")))?;

        let entities = Self::parse_response(&raw)?;
        tracing::info!(entities = entities.len(), "LLM extraction complete");
        Ok(entities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_response_valid() {
        let raw = r#"{
            "entities": [
                {"text": "Sarah", "label": "PERSON"},
                {"text": "Microsoft", "label": "org"},
                {"text": "Python", "label": "SKILL"}
            ]
        }"#;
        let entities = LlmEntityExtractor::parse_response(raw).unwrap();
        assert_eq!(entities.len(), 3);
        assert_eq!(entities[0], ExtractedEntity::new("Sarah", "PERSON"));
        assert_eq!(entities[1].label, EntityLabel::Org);
        assert_eq!(entities[2].text, "Python");
    }

    #[test]
    fn test_parse_response_with_code_fences() {
        let raw = "```json\n{\"entities\": [{\"text\": \"Ada\", \"label\": \"PERSON\"}]}\n```";
        let entities = LlmEntityExtractor::parse_response(raw).unwrap();
        assert_eq!(entities, vec![ExtractedEntity::new("Ada", "PERSON")]);
    }

    #[test]
    fn test_parse_response_keeps_unknown_labels() {
        let raw = r#"{"entities": [{"text": "Paris", "label": "GPE"}]}"#;
        let entities = LlmEntityExtractor::parse_response(raw).unwrap();
        assert_eq!(entities[0].label, EntityLabel::Other("GPE".into()));
    }

    #[test]
    fn test_parse_response_empty() {
        let entities = LlmEntityExtractor::parse_response(r#"{"entities": []}"#).unwrap();
        assert!(entities.is_empty());
    }

    #[test]
    fn test_parse_response_invalid_json() {
        let err = LlmEntityExtractor::parse_response("not json at all").unwrap_err();
        assert!(matches!(err, PersonaError::Extraction(_)));
        let err = LlmEntityExtractor::parse_response("{\"entities\": [{\"text\": 3}]}").unwrap_err();
        assert!(matches!(err, PersonaError::Extraction(_)));
    }

    #[test]
    fn test_parse_response_rejects_blank_entity() {
        let raw = r#"{"entities": [{"text": " ", "label": "PERSON"}]}"#;
        assert!(LlmEntityExtractor::parse_response(raw).is_err());
    }
}
