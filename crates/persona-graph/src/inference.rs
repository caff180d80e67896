use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use persona_core::entity::{EntityLabel, RelationType};
use persona_core::error::Result;

use crate::store::KnowledgeGraph;

/// How entity pairs are tested against the rule table.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InferenceMode {
    /// Only `(a, b)` with `a` inserted before `b`.
    #[default]
    Directional,
    /// Both `(a, b)` and `(b, a)`.
    Symmetric,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct InferenceReport {
    pub pairs_examined: usize,
    pub edges_added: usize,
}

/// Relationship implied by the ordered label pair, if any.
pub fn relation_for(a: &EntityLabel, b: &EntityLabel) -> Option<RelationType> {
    match (a, b) {
        (EntityLabel::Person, EntityLabel::Org) => Some(RelationType::WorksAt),
        (EntityLabel::Person, EntityLabel::Skill) => Some(RelationType::HasSkill),
        (EntityLabel::Person, EntityLabel::Trait) => Some(RelationType::Exhibits),
        _ => None,
    }
}

impl KnowledgeGraph {
    /// Adds semantic edges between entity nodes based solely on their labels.
    ///
    /// Every unordered pair of entities is visited once in insertion order.
    /// Edges are never removed, and an edge that already exists is not added
    /// again, so repeated runs over an unchanged graph add nothing.
    pub fn infer_relationships(&mut self, mode: InferenceMode) -> Result<InferenceReport> {
        let entities: Vec<(String, EntityLabel)> = self
            .entity_nodes()
            .filter_map(|n| n.label.clone().map(|l| (n.id.clone(), l)))
            .collect();

        let mut report = InferenceReport::default();
        let mut by_type: BTreeMap<String, usize> = BTreeMap::new();

        for (i, (a_id, a_label)) in entities.iter().enumerate() {
            for (b_id, b_label) in &entities[i + 1..] {
                report.pairs_examined += 1;

                let mut candidates = vec![(a_id, b_id, relation_for(a_label, b_label))];
                if mode == InferenceMode::Symmetric {
                    candidates.push((b_id, a_id, relation_for(b_label, a_label)));
                }

                for (src, dst, relation) in candidates {
                    let Some(relation) = relation else { continue };
                    let key = relation.as_str().to_string();
                    if self.add_edge(src, dst, relation, BTreeMap::new())? {
                        report.edges_added += 1;
                        *by_type.entry(key).or_insert(0) += 1;
                    }
                }
            }
        }

        tracing::info!(
            mode = ?mode,
            pairs = report.pairs_examined,
            edges_added = report.edges_added,
            by_type = ?by_type,
            "Inferred relationships"
        );

        Ok(report)
    }
}
