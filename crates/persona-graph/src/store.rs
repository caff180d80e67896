use std::collections::{BTreeMap, HashMap};

use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};

use persona_core::entity::{entity_node_id, Edge, Node, NodeKind, RelationType};
use persona_core::error::{PersonaError, Result};
use persona_core::extraction::EntityExtractor;

/// In-memory knowledge graph of document and entity nodes.
///
/// Node identity is the string id; node and edge iteration follow insertion
/// order. Edges are unique per `(src, dst, type)`.
pub struct KnowledgeGraph {
    graph: DiGraph<Node, Edge>,
    index: HashMap<String, NodeIndex>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub document_count: usize,
    pub entity_count: usize,
    pub labels: BTreeMap<String, usize>,
}

impl KnowledgeGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            index: HashMap::new(),
        }
    }

    /// Extracts entities from `text` and records them under `source_id`.
    ///
    /// Entity `i` of the extraction output becomes node `{source_id}_ent_{i}`
    /// with a `mentions` edge from the document node. Re-ingesting a source id
    /// overwrites label and text of the entities it produces again. Returns
    /// the entity ids in extraction order.
    ///
    /// Documents and entities share one id space: a `source_id` naming an
    /// entity, or an entity id naming a document, fails with
    /// [`PersonaError::IdConflict`] before the graph is touched.
    pub async fn ingest(
        &mut self,
        extractor: &dyn EntityExtractor,
        text: &str,
        source_id: &str,
    ) -> Result<Vec<String>> {
        let entities = extractor.extract(text).await.map_err(|e| match e {
            PersonaError::Extraction(_) => e,
            other => PersonaError::Extraction(format!("{} extractor failed: {other}", extractor.name())),
        })?;

        // Validate everything before touching the graph.
        for (i, entity) in entities.iter().enumerate() {
            if entity.text.trim().is_empty() || entity.label.as_str().trim().is_empty() {
                return Err(PersonaError::Extraction(format!(
                    "{} extractor returned an empty entity at index {i}",
                    extractor.name()
                )));
            }
        }

        if let Some(node) = self.node(source_id) {
            if node.kind != NodeKind::Document {
                return Err(PersonaError::IdConflict(format!(
                    "source id '{source_id}' names an existing entity node"
                )));
            }
        }
        for i in 0..entities.len() {
            let id = entity_node_id(source_id, i);
            if self.node(&id).is_some_and(|n| n.kind == NodeKind::Document) {
                return Err(PersonaError::IdConflict(format!(
                    "entity id '{id}' names an existing document node"
                )));
            }
        }

        if !self.contains(source_id) {
            self.add_node(Node::document(source_id));
        }

        let mut ids = Vec::with_capacity(entities.len());
        for (i, entity) in entities.into_iter().enumerate() {
            let id = entity_node_id(source_id, i);
            self.add_node(Node::entity(id.clone(), entity.label, entity.text));
            self.add_edge(source_id, &id, RelationType::Mentions, BTreeMap::new())?;
            ids.push(id);
        }

        tracing::info!(
            source_id = source_id,
            extractor = extractor.name(),
            entities = ids.len(),
            "Ingested document"
        );

        Ok(ids)
    }

    /// Inserts `node`, or replaces kind, label and text of the node with the
    /// same id. Trait scores already on an existing node are kept and
    /// overlaid with those of `node`. Returns true when the node is new.
    pub fn add_node(&mut self, node: Node) -> bool {
        match self.index.get(&node.id) {
            Some(&idx) => {
                let existing = &mut self.graph[idx];
                existing.kind = node.kind;
                existing.label = node.label;
                existing.text = node.text;
                if node.ingested_at.is_some() {
                    existing.ingested_at = node.ingested_at;
                }
                existing.traits.overlay(&node.traits);
                tracing::debug!(node_id = %existing.id, "Updated node");
                false
            }
            None => {
                let id = node.id.clone();
                let idx = self.graph.add_node(node);
                self.index.insert(id, idx);
                true
            }
        }
    }

    /// Adds a directed `relation` edge between two existing nodes.
    ///
    /// Fails with [`PersonaError::UnknownNode`] if either endpoint is absent.
    /// If the `(src, dst, relation)` edge already exists, `attrs` are merged
    /// into it and false is returned.
    pub fn add_edge(
        &mut self,
        src: &str,
        dst: &str,
        relation: RelationType,
        attrs: BTreeMap<String, serde_json::Value>,
    ) -> Result<bool> {
        let a = self.require(src)?;
        let b = self.require(dst)?;

        if let Some(edge_idx) = self.find_edge(a, b, &relation) {
            self.graph[edge_idx].attrs.extend(attrs);
            return Ok(false);
        }

        tracing::debug!(src = src, dst = dst, rel_type = %relation, "Added edge");
        self.graph.add_edge(a, b, Edge { relation, attrs });
        Ok(true)
    }

    pub fn has_edge(&self, src: &str, dst: &str, relation: &RelationType) -> bool {
        match (self.index.get(src), self.index.get(dst)) {
            (Some(&a), Some(&b)) => self.find_edge(a, b, relation).is_some(),
            _ => false,
        }
    }

    fn find_edge(&self, a: NodeIndex, b: NodeIndex, relation: &RelationType) -> Option<EdgeIndex> {
        self.graph
            .edges_connecting(a, b)
            .find(|e| e.weight().relation == *relation)
            .map(|e| e.id())
    }

    fn require(&self, id: &str) -> Result<NodeIndex> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| PersonaError::UnknownNode(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&idx| &self.graph[idx])
    }

    pub(crate) fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        match self.index.get(id) {
            Some(&idx) => Some(&mut self.graph[idx]),
            None => None,
        }
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.node_weights()
    }

    /// Entity nodes in insertion order.
    pub fn entity_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes().filter(|n| n.is_entity())
    }

    /// All edges as `(src id, dst id, edge)` in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str, &Edge)> {
        let graph = &self.graph;
        graph.edge_references().map(move |e| {
            (
                graph[e.source()].id.as_str(),
                graph[e.target()].id.as_str(),
                e.weight(),
            )
        })
    }

    pub fn to_edge_list(&self) -> Vec<(String, String, Edge)> {
        self.edges()
            .map(|(s, d, e)| (s.to_string(), d.to_string(), e.clone()))
            .collect()
    }

    /// `text` of each listed entity that exists, keyed by id.
    pub fn entity_texts<'a, I>(&self, ids: I) -> BTreeMap<String, String>
    where
        I: IntoIterator<Item = &'a String>,
    {
        ids.into_iter()
            .filter_map(|id| {
                let node = self.node(id)?;
                let text = node.text.clone()?;
                Some((id.clone(), text))
            })
            .collect()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn stats(&self) -> GraphStats {
        let mut labels = BTreeMap::new();
        let mut document_count = 0;
        let mut entity_count = 0;
        for node in self.nodes() {
            match node.kind {
                NodeKind::Document => document_count += 1,
                NodeKind::Entity => entity_count += 1,
            }
            if let Some(label) = &node.label {
                *labels.entry(label.as_str().to_string()).or_insert(0) += 1;
            }
        }
        GraphStats {
            node_count: self.node_count(),
            edge_count: self.edge_count(),
            document_count,
            entity_count,
            labels,
        }
    }
}

impl Default for KnowledgeGraph {
    fn default() -> Self {
        Self::new()
    }
}
