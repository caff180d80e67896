pub mod config;
pub mod entity;
pub mod error;
pub mod estimation;
pub mod extraction;
pub mod llm;
pub mod personality;

pub use config::{AppConfig, EstimatorKind, ExtractorKind, LlmConfig};
pub use entity::{
    entity_node_id, Edge, EntityLabel, ExtractedEntity, Node, NodeKind, RelationType,
};
pub use error::{PersonaError, Result};
pub use estimation::TraitEstimator;
pub use extraction::EntityExtractor;
pub use llm::{ChatClient, ChatMessage};
pub use personality::{BigFive, TraitMap, TraitProfile, NEUTRAL_SCORE};
