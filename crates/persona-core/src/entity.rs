use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::personality::TraitProfile;

/// Type tag attached to an entity by the extractor.
///
/// The four known labels drive relationship inference; anything else the
/// extractor emits is carried verbatim in `Other` and never produces edges.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityLabel {
    Person,
    Org,
    Skill,
    Trait,
    Other(String),
}

impl EntityLabel {
    pub fn parse(label: &str) -> Self {
        match label.trim().to_uppercase().as_str() {
            "PERSON" => EntityLabel::Person,
            "ORG" => EntityLabel::Org,
            "SKILL" => EntityLabel::Skill,
            "TRAIT" => EntityLabel::Trait,
            _ => EntityLabel::Other(label.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EntityLabel::Person => "PERSON",
            EntityLabel::Org => "ORG",
            EntityLabel::Skill => "SKILL",
            EntityLabel::Trait => "TRAIT",
            EntityLabel::Other(s) => s,
        }
    }
}

impl fmt::Display for EntityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for EntityLabel {
    fn from(s: &str) -> Self {
        EntityLabel::parse(s)
    }
}

impl Serialize for EntityLabel {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EntityLabel {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(EntityLabel::parse(&s))
    }
}

/// One `(surface, label)` pair as returned by an extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedEntity {
    pub text: String,
    pub label: EntityLabel,
}

impl ExtractedEntity {
    pub fn new(text: impl Into<String>, label: impl Into<EntityLabel>) -> Self {
        Self {
            text: text.into(),
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Document,
    Entity,
}

/// A graph node. Documents carry no label or text; entities carry both plus
/// whatever trait scores have been merged onto them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub kind: NodeKind,
    pub label: Option<EntityLabel>,
    pub text: Option<String>,
    #[serde(default)]
    pub traits: TraitProfile,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingested_at: Option<DateTime<Utc>>,
}

impl Node {
    pub fn document(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: NodeKind::Document,
            label: None,
            text: None,
            traits: TraitProfile::default(),
            ingested_at: Some(Utc::now()),
        }
    }

    pub fn entity(id: impl Into<String>, label: EntityLabel, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: NodeKind::Entity,
            label: Some(label),
            text: Some(text.into()),
            traits: TraitProfile::default(),
            ingested_at: None,
        }
    }

    pub fn is_entity(&self) -> bool {
        self.kind == NodeKind::Entity
    }
}

/// Entity node id for the entity at `index` in the extraction output of `source_id`.
pub fn entity_node_id(source_id: &str, index: usize) -> String {
    format!("{source_id}_ent_{index}")
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RelationType {
    Mentions,
    WorksAt,
    HasSkill,
    Exhibits,
    Custom(String),
}

impl RelationType {
    pub fn as_str(&self) -> &str {
        match self {
            RelationType::Mentions => "mentions",
            RelationType::WorksAt => "works_at",
            RelationType::HasSkill => "has_skill",
            RelationType::Exhibits => "exhibits",
            RelationType::Custom(s) => s,
        }
    }
}

impl From<&str> for RelationType {
    fn from(s: &str) -> Self {
        match s {
            "mentions" => RelationType::Mentions,
            "works_at" => RelationType::WorksAt,
            "has_skill" => RelationType::HasSkill,
            "exhibits" => RelationType::Exhibits,
            other => RelationType::Custom(other.to_string()),
        }
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RelationType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RelationType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(RelationType::from(s.as_str()))
    }
}

/// Directed edge payload. `attrs` holds any extra attributes beyond `type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    #[serde(rename = "type")]
    pub relation: RelationType,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, serde_json::Value>,
}
