use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use persona_core::config::AppConfig;
use persona_core::error::Result;
use persona_core::estimation::TraitEstimator;
use persona_core::extraction::EntityExtractor;
use persona_graph::{InferenceMode, InferenceReport, KnowledgeGraph, MergeReport};

mod summary;

pub use summary::GraphSummary;

/// Outcome of one [`Pipeline::run`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub source_id: String,
    /// Entity ids produced by this run, in extraction order.
    pub entity_ids: Vec<String>,
    pub merge: MergeReport,
    pub inference: InferenceReport,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub finished_at: chrono::DateTime<chrono::Utc>,
}

/// Ingest, estimate, merge and infer over one shared graph.
///
/// Documents accumulate across runs. Estimation failures never abort a run:
/// the affected entities get neutral scores instead.
pub struct Pipeline {
    extractor: Box<dyn EntityExtractor>,
    estimator: Box<dyn TraitEstimator>,
    mode: InferenceMode,
    graph: KnowledgeGraph,
}

impl Pipeline {
    pub fn new(extractor: Box<dyn EntityExtractor>, estimator: Box<dyn TraitEstimator>) -> Self {
        Self {
            extractor,
            estimator,
            mode: InferenceMode::default(),
            graph: KnowledgeGraph::new(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let extractor = persona_extraction::build_extractor(config)?;
        let estimator = persona_traits::build_estimator(config)?;
        let mode = if config.symmetric_inference {
            InferenceMode::Symmetric
        } else {
            InferenceMode::Directional
        };
        Ok(Self::new(extractor, estimator).with_mode(mode))
    }

    pub fn with_mode(mut self, mode: InferenceMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn graph(&self) -> &KnowledgeGraph {
        &self.graph
    }

    pub fn into_graph(self) -> KnowledgeGraph {
        self.graph
    }

    pub async fn run(&mut self, text: &str, source_id: &str) -> Result<RunReport> {
        let run_id = Uuid::new_v4();
        let started_at = chrono::Utc::now();
        tracing::info!(
            run_id = %run_id,
            source_id = source_id,
            extractor = self.extractor.name(),
            estimator = self.estimator.name(),
            "Starting pipeline run"
        );

        let entity_ids = self
            .graph
            .ingest(self.extractor.as_ref(), text, source_id)
            .await?;

        let requested: BTreeSet<String> = entity_ids.iter().cloned().collect();
        let texts = self.graph.entity_texts(&requested);
        let traits =
            persona_traits::estimate_or_neutral(self.estimator.as_ref(), &requested, Some(&texts))
                .await;

        let merge = self.graph.merge_traits(&traits);
        let inference = self.graph.infer_relationships(self.mode)?;

        let finished_at = chrono::Utc::now();
        tracing::info!(
            run_id = %run_id,
            entities = entity_ids.len(),
            merged = merge.merged,
            edges_added = inference.edges_added,
            elapsed_ms = (finished_at - started_at).num_milliseconds(),
            "Pipeline run complete"
        );

        Ok(RunReport {
            run_id,
            source_id: source_id.to_string(),
            entity_ids,
            merge,
            inference,
            started_at,
            finished_at,
        })
    }

    pub fn summary(&self) -> GraphSummary {
        GraphSummary::from_graph(&self.graph)
    }

    pub async fn export_html(&self, path: &Path) -> Result<()> {
        persona_graph::write_html(&self.graph, path).await
    }
}
