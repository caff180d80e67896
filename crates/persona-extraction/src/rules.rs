//! Pattern-ruler entity extraction.
//!
//! Phrase patterns are matched first (longest match wins), then runs of
//! capitalised tokens are labelled ORG or PERSON from their surroundings.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use persona_core::entity::{EntityLabel, ExtractedEntity};
use persona_core::error::{PersonaError, Result};
use persona_core::extraction::EntityExtractor;

static TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\p{L}\p{N}][\p{L}\p{N}+#&-]*").expect("valid token regex"));

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntityPattern {
    pub label: String,
    /// Whitespace-separated words, matched case-insensitively.
    pub phrase: String,
}

impl EntityPattern {
    pub fn new(label: &str, phrase: &str) -> Self {
        Self {
            label: label.to_string(),
            phrase: phrase.to_string(),
        }
    }
}

/// Everything the rule-based extractor knows. Each extractor owns its own
/// copy, so differently configured extractors can coexist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    pub patterns: Vec<EntityPattern>,
    /// Capitalised words that never start or join an entity.
    pub skip_words: Vec<String>,
    /// A capitalised run right after one of these words is an ORG.
    pub org_cues: Vec<String>,
    /// A capitalised run ending in one of these words is an ORG.
    pub org_suffixes: Vec<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        let patterns = vec![
            EntityPattern::new("SKILL", "python"),
            EntityPattern::new("SKILL", "java"),
            EntityPattern::new("SKILL", "machine learning"),
            EntityPattern::new("SKILL", "deep learning"),
            EntityPattern::new("SKILL", "data science"),
            EntityPattern::new("SKILL", "natural language processing"),
            EntityPattern::new("SKILL", "computer vision"),
            EntityPattern::new("TRAIT", "creative"),
            EntityPattern::new("TRAIT", "analytical"),
        ];
        let words = |list: &[&str]| list.iter().map(|w| w.to_string()).collect::<Vec<_>>();
        Self {
            patterns,
            skip_words: words(&[
                "a", "an", "the", "this", "that", "these", "those", "and", "but", "or", "at",
                "in", "on", "for", "with", "from", "by", "of", "to", "as", "while", "after",
                "before", "when", "i", "you", "he", "she", "it", "we", "they", "his", "her",
                "its", "our", "their", "them", "him", "known", "also", "there", "here",
            ]),
            org_cues: words(&["at", "for", "with", "from", "joined", "joins"]),
            org_suffixes: words(&[
                "inc", "corp", "corporation", "ltd", "llc", "labs", "lab", "university",
                "institute", "research", "ai", "solutions", "systems", "group",
            ]),
        }
    }
}

#[derive(Debug)]
struct CompiledPattern {
    label: EntityLabel,
    words: Vec<String>,
}

#[derive(Debug)]
struct Token<'a> {
    text: &'a str,
    lower: String,
    start: usize,
    end: usize,
    sentence_start: bool,
}

impl Token<'_> {
    fn is_capitalised(&self) -> bool {
        self.text.chars().next().is_some_and(char::is_uppercase)
    }
}

pub struct RuleBasedExtractor {
    patterns: Vec<CompiledPattern>,
    config: ExtractorConfig,
}

impl RuleBasedExtractor {
    pub fn new(config: ExtractorConfig) -> Result<Self> {
        let mut patterns = Vec::with_capacity(config.patterns.len());
        for pattern in &config.patterns {
            let words: Vec<String> = pattern
                .phrase
                .split_whitespace()
                .map(str::to_lowercase)
                .collect();
            if words.is_empty() || pattern.label.trim().is_empty() {
                return Err(PersonaError::Config(format!(
                    "invalid entity pattern {:?}",
                    pattern
                )));
            }
            patterns.push(CompiledPattern {
                label: EntityLabel::parse(&pattern.label),
                words,
            });
        }
        // Longest phrase first so "machine learning" beats a shorter overlap.
        patterns.sort_by(|a, b| b.words.len().cmp(&a.words.len()));

        let config = ExtractorConfig {
            skip_words: lowercase_all(&config.skip_words),
            org_cues: lowercase_all(&config.org_cues),
            org_suffixes: lowercase_all(&config.org_suffixes),
            ..config
        };

        tracing::debug!(patterns = patterns.len(), "Built rule-based extractor");
        Ok(Self { patterns, config })
    }

    /// Entities in order of appearance in `text`.
    pub fn extract_entities(&self, text: &str) -> Vec<ExtractedEntity> {
        let tokens = tokenize(text);
        let mut entities = Vec::new();
        let mut i = 0;

        while i < tokens.len() {
            if let Some((len, label)) = self.match_pattern(&tokens, i) {
                let span = &text[tokens[i].start..tokens[i + len - 1].end];
                entities.push(ExtractedEntity::new(span, label.clone()));
                i += len;
                continue;
            }

            if tokens[i].is_capitalised() && !self.is_skip_word(&tokens[i]) {
                let mut j = i + 1;
                while j < tokens.len()
                    && !tokens[j].sentence_start
                    && tokens[j].is_capitalised()
                    && !self.is_skip_word(&tokens[j])
                    && text[tokens[j - 1].end..tokens[j].start].trim().is_empty()
                    && self.match_pattern(&tokens, j).is_none()
                {
                    j += 1;
                }
                let span = &text[tokens[i].start..tokens[j - 1].end];
                let label = self.classify_run(&tokens, i, j);
                entities.push(ExtractedEntity::new(span, label));
                i = j;
                continue;
            }

            i += 1;
        }

        entities
    }

    fn match_pattern(&self, tokens: &[Token<'_>], at: usize) -> Option<(usize, &EntityLabel)> {
        self.patterns.iter().find_map(|p| {
            let end = at + p.words.len();
            if end > tokens.len() {
                return None;
            }
            let matches = tokens[at..end]
                .iter()
                .zip(&p.words)
                .enumerate()
                .all(|(k, (t, w))| t.lower == *w && (k == 0 || !t.sentence_start));
            matches.then_some((p.words.len(), &p.label))
        })
    }

    fn is_skip_word(&self, token: &Token<'_>) -> bool {
        self.config.skip_words.contains(&token.lower)
    }

    fn classify_run(&self, tokens: &[Token<'_>], start: usize, end: usize) -> EntityLabel {
        let cued = start > 0
            && !tokens[start].sentence_start
            && self.config.org_cues.contains(&tokens[start - 1].lower);
        let suffixed = end - start > 1 && self.config.org_suffixes.contains(&tokens[end - 1].lower);
        if cued || suffixed {
            EntityLabel::Org
        } else {
            EntityLabel::Person
        }
    }
}

fn lowercase_all(words: &[String]) -> Vec<String> {
    words.iter().map(|w| w.to_lowercase()).collect()
}

fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens: Vec<Token<'_>> = Vec::new();
    for m in TOKEN_RE.find_iter(text) {
        let sentence_start = match tokens.last() {
            None => true,
            Some(prev) => text[prev.end..m.start()].contains(|c| matches!(c, '.' | '!' | '?')),
        };
        tokens.push(Token {
            text: m.as_str(),
            lower: m.as_str().to_lowercase(),
            start: m.start(),
            end: m.end(),
            sentence_start,
        });
    }
    tokens
}

#[async_trait]
impl EntityExtractor for RuleBasedExtractor {
    fn name(&self) -> &str {
        "rules"
    }

    async fn extract(&self, text: &str) -> Result<Vec<ExtractedEntity>> {
        let entities = self.extract_entities(text);
        tracing::debug!(
            text_len = text.len(),
            entities = entities.len(),
            "Rule-based extraction complete"
        );
        Ok(entities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> RuleBasedExtractor {
        RuleBasedExtractor::new(ExtractorConfig::default()).unwrap()
    }

    fn pairs(entities: &[ExtractedEntity]) -> Vec<(&str, &str)> {
        entities
            .iter()
            .map(|e| (e.text.as_str(), e.label.as_str()))
            .collect()
    }

    #[test]
    fn test_sarah_sentence() {
        let entities = extractor().extract_entities("Sarah works at Microsoft. She knows Python.");
        assert_eq!(
            pairs(&entities),
            vec![("Sarah", "PERSON"), ("Microsoft", "ORG"), ("Python", "SKILL")]
        );
    }

    #[test]
    fn test_john_sentence_order() {
        let entities = extractor()
            .extract_entities("John is a Python developer at Google. He knows machine learning.");
        assert_eq!(
            pairs(&entities),
            vec![
                ("John", "PERSON"),
                ("Python", "SKILL"),
                ("Google", "ORG"),
                ("machine learning", "SKILL"),
            ]
        );
    }

    #[test]
    fn test_multi_word_names_and_org_suffix() {
        let entities = extractor().extract_entities(
            "Wei Chen, known for being analytical, works with Stanford University on Java projects.",
        );
        assert_eq!(
            pairs(&entities),
            vec![
                ("Wei Chen", "PERSON"),
                ("analytical", "TRAIT"),
                ("Stanford University", "ORG"),
                ("Java", "SKILL"),
            ]
        );
    }

    #[test]
    fn test_sentence_initial_cue_word() {
        let entities = extractor().extract_entities("At TechCorp, Priya Patel leads the team.");
        assert_eq!(pairs(&entities), vec![("TechCorp", "ORG"), ("Priya Patel", "PERSON")]);
    }

    #[test]
    fn test_punctuation_breaks_runs() {
        let entities = extractor().extract_entities("Ada, Grace and Linus met.");
        assert_eq!(
            pairs(&entities),
            vec![("Ada", "PERSON"), ("Grace", "PERSON"), ("Linus", "PERSON")]
        );
    }

    #[test]
    fn test_custom_config_is_isolated() {
        let mut config = ExtractorConfig::default();
        config.patterns = vec![EntityPattern::new("SKILL", "rust")];
        let custom = RuleBasedExtractor::new(config).unwrap();

        let text = "She writes rust and python.";
        assert_eq!(pairs(&custom.extract_entities(text)), vec![("rust", "SKILL")]);
        assert_eq!(pairs(&extractor().extract_entities(text)), vec![("python", "SKILL")]);
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let mut config = ExtractorConfig::default();
        config.patterns.push(EntityPattern::new("SKILL", "   "));
        assert!(matches!(
            RuleBasedExtractor::new(config),
            Err(PersonaError::Config(_))
        ));
    }

    #[test]
    fn test_empty_text() {
        assert!(extractor().extract_entities("").is_empty());
        assert!(extractor().extract_entities("   ...  ").is_empty());
    }

    #[tokio::test]
    async fn test_extraction_is_deterministic() {
        let ex = extractor();
        let text = "Alex Johnson is a creative researcher at Neural Labs.";
        let first = ex.extract(text).await.unwrap();
        let second = ex.extract(text).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(
            pairs(&first),
            vec![("Alex Johnson", "PERSON"), ("creative", "TRAIT"), ("Neural Labs", "ORG")]
        );
    }
}
