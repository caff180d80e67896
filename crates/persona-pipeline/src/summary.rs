use std::fmt;

use serde::{Deserialize, Serialize};

use persona_core::personality::display_trait_name;
use persona_graph::KnowledgeGraph;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntityLine {
    pub text: String,
    pub label: String,
    /// `(display name, score)` in profile order.
    pub traits: Vec<(String, f64)>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RelationshipLine {
    pub source: String,
    pub relation: String,
    pub target: String,
}

/// Plain-text view of the entities and the relationships between them.
/// Document nodes and `mentions` edges are left out.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GraphSummary {
    pub entities: Vec<EntityLine>,
    pub relationships: Vec<RelationshipLine>,
}

impl GraphSummary {
    pub fn from_graph(graph: &KnowledgeGraph) -> Self {
        let entities = graph
            .entity_nodes()
            .map(|node| EntityLine {
                text: node.text.clone().unwrap_or_default(),
                label: node
                    .label
                    .as_ref()
                    .map(|l| l.as_str().to_string())
                    .unwrap_or_default(),
                traits: node
                    .traits
                    .iter()
                    .map(|(name, score)| (display_trait_name(name), score))
                    .collect(),
            })
            .collect();

        let text_of = |id: &str| {
            graph
                .node(id)
                .and_then(|n| n.text.clone())
                .unwrap_or_else(|| id.to_string())
        };
        let is_entity = |id: &str| graph.node(id).is_some_and(|n| n.is_entity());

        let relationships = graph
            .edges()
            .filter(|(src, dst, _)| is_entity(src) && is_entity(dst))
            .map(|(src, dst, edge)| RelationshipLine {
                source: text_of(src),
                relation: edge.relation.to_string(),
                target: text_of(dst),
            })
            .collect();

        Self {
            entities,
            relationships,
        }
    }
}

impl fmt::Display for GraphSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Knowledge Graph Summary:")?;
        writeln!(f, "\nNodes:")?;
        for entity in &self.entities {
            writeln!(f, "\n{} ({}):", entity.text, entity.label)?;
            for (name, score) in &entity.traits {
                writeln!(f, "  {name}: {score:.2}")?;
            }
        }
        writeln!(f, "\nRelationships:")?;
        for rel in &self.relationships {
            writeln!(f, "{} {} {}", rel.source, rel.relation, rel.target)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use persona_core::entity::{EntityLabel, Node, RelationType};
    use persona_core::personality::TraitProfile;
    use std::collections::BTreeMap;

    fn sample_graph() -> KnowledgeGraph {
        let mut graph = KnowledgeGraph::new();
        graph.add_node(Node::document("d"));
        let mut sarah = Node::entity("d_ent_0", EntityLabel::Person, "Sarah");
        sarah.traits = TraitProfile::from_pairs([("openness", 0.8), ("neuroticism", 0.2)]);
        graph.add_node(sarah);
        graph.add_node(Node::entity("d_ent_1", EntityLabel::Org, "Microsoft"));
        graph
            .add_edge("d", "d_ent_0", RelationType::Mentions, BTreeMap::new())
            .unwrap();
        graph
            .add_edge("d_ent_0", "d_ent_1", RelationType::WorksAt, BTreeMap::new())
            .unwrap();
        graph
    }

    #[test]
    fn test_summary_skips_document_edges() {
        let summary = GraphSummary::from_graph(&sample_graph());
        assert_eq!(summary.entities.len(), 2);
        assert_eq!(
            summary.relationships,
            vec![RelationshipLine {
                source: "Sarah".into(),
                relation: "works_at".into(),
                target: "Microsoft".into(),
            }]
        );
    }

    #[test]
    fn test_summary_text_format() {
        let text = GraphSummary::from_graph(&sample_graph()).to_string();
        let expected = "Knowledge Graph Summary:\n\nNodes:\n\n\
                        Sarah (PERSON):\n  Openness: 0.80\n  Neuroticism: 0.20\n\n\
                        Microsoft (ORG):\n\nRelationships:\nSarah works_at Microsoft\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_empty_graph_summary() {
        let text = GraphSummary::from_graph(&KnowledgeGraph::new()).to_string();
        assert_eq!(text, "Knowledge Graph Summary:\n\nNodes:\n\nRelationships:\n");
    }
}
