use serde::{Deserialize, Serialize};

use persona_core::personality::TraitMap;

use crate::store::KnowledgeGraph;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MergeReport {
    /// Entities that received at least one score.
    pub merged: usize,
    /// Ids that are unknown or not entity nodes.
    pub skipped: Vec<String>,
}

impl KnowledgeGraph {
    /// Overlays trait scores onto entity nodes.
    ///
    /// Each score overwrites the previous value of the same trait, so merging
    /// the same map twice is a no-op the second time. Ids that are missing
    /// from the graph, or that name a document node, are skipped: estimates
    /// may come from a stale entity snapshot.
    pub fn merge_traits(&mut self, traits: &TraitMap) -> MergeReport {
        let mut report = MergeReport::default();

        for (entity_id, profile) in traits {
            match self.node_mut(entity_id) {
                Some(node) if node.is_entity() => {
                    node.traits.overlay(profile);
                    report.merged += 1;
                }
                _ => {
                    tracing::debug!(entity_id = %entity_id, "Skipping traits for unknown entity");
                    report.skipped.push(entity_id.clone());
                }
            }
        }

        if !report.skipped.is_empty() {
            tracing::warn!(
                skipped = report.skipped.len(),
                "Trait map referenced entities not in the graph"
            );
        }
        tracing::info!(merged = report.merged, "Merged trait scores");

        report
    }
}
