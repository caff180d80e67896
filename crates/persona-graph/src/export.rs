//! Read-only projections of a [`KnowledgeGraph`] for renderers.
//!
//! Nothing here holds state: every function reads the graph at call time.

use serde::{Deserialize, Serialize};

use persona_core::entity::Node;
use persona_core::personality::display_trait_name;

use crate::store::KnowledgeGraph;

/// Group used for nodes without a label (documents).
pub const OTHER_GROUP: &str = "OTHER";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportNode {
    pub id: String,
    pub display_label: String,
    pub group: String,
    pub tooltip: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportEdge {
    pub src: String,
    pub dst: String,
    #[serde(rename = "type")]
    pub relation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GraphExport {
    pub nodes: Vec<ExportNode>,
    pub edges: Vec<ExportEdge>,
}

/// Node shape expected by force-directed renderers such as vis-network.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RenderNode {
    pub id: String,
    pub label: String,
    pub title: String,
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RenderEdge {
    pub from: String,
    pub to: String,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RenderData {
    pub nodes: Vec<RenderNode>,
    pub edges: Vec<RenderEdge>,
}

pub fn group_color(group: &str) -> &'static str {
    match group {
        "PERSON" => "#4CAF50",
        "ORG" => "#2196F3",
        "SKILL" => "#FFC107",
        "TRAIT" => "#9C27B0",
        _ => "#607D8B",
    }
}

fn group_of(node: &Node) -> String {
    node.label
        .as_ref()
        .map(|l| l.as_str().to_string())
        .unwrap_or_else(|| OTHER_GROUP.to_string())
}

/// `Type: PERSON<br>` followed, when traits are present, by one
/// `Name: 0.00<br>` line per trait.
pub fn tooltip(node: &Node) -> String {
    let mut title = format!("Type: {}<br>", group_of(node));
    if !node.traits.is_empty() {
        title.push_str("<br>Personality Traits:<br>");
        for (name, score) in node.traits.iter() {
            title.push_str(&format!("{}: {:.2}<br>", display_trait_name(name), score));
        }
    }
    title
}

pub fn export(graph: &KnowledgeGraph) -> GraphExport {
    let nodes = graph
        .nodes()
        .map(|node| ExportNode {
            id: node.id.clone(),
            display_label: node.text.clone().unwrap_or_else(|| node.id.clone()),
            group: group_of(node),
            tooltip: tooltip(node),
        })
        .collect();

    let edges = graph
        .edges()
        .map(|(src, dst, edge)| ExportEdge {
            src: src.to_string(),
            dst: dst.to_string(),
            relation: edge.relation.as_str().to_string(),
        })
        .collect();

    GraphExport { nodes, edges }
}

impl GraphExport {
    pub fn to_render_data(&self) -> RenderData {
        RenderData {
            nodes: self
                .nodes
                .iter()
                .map(|n| RenderNode {
                    id: n.id.clone(),
                    label: n.display_label.clone(),
                    title: n.tooltip.clone(),
                    color: group_color(&n.group).to_string(),
                })
                .collect(),
            edges: self
                .edges
                .iter()
                .map(|e| RenderEdge {
                    from: e.src.clone(),
                    to: e.dst.clone(),
                    title: e.relation.clone(),
                })
                .collect(),
        }
    }
}
