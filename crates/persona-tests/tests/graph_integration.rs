use std::collections::BTreeSet;

use persona_core::entity::{EntityLabel, RelationType};
use persona_core::error::PersonaError;
use persona_core::personality::{BigFive, TraitMap, TraitProfile, NEUTRAL_SCORE};
use persona_graph::{export, InferenceMode, KnowledgeGraph};
use persona_tests::{rule_extractor, FailingEstimator, FailingExtractor, FixedExtractor, SARAH_TEXT};
use persona_traits::{estimate_or_neutral, RandomEstimator};

fn edge_triples(graph: &KnowledgeGraph) -> Vec<(String, String, String)> {
    graph
        .to_edge_list()
        .into_iter()
        .map(|(s, d, e)| (s, d, e.relation.as_str().to_string()))
        .collect()
}

// ---------------------------------------------------------------------------
// Ingest
// ---------------------------------------------------------------------------

#[tokio::test]
async fn ingest_is_deterministic() {
    let extractor = rule_extractor();
    let mut a = KnowledgeGraph::new();
    let mut b = KnowledgeGraph::new();
    let ids_a = a.ingest(&extractor, SARAH_TEXT, "t1").await.expect("ingest a");
    let ids_b = b.ingest(&extractor, SARAH_TEXT, "t1").await.expect("ingest b");

    assert_eq!(ids_a, ids_b);
    assert_eq!(edge_triples(&a), edge_triples(&b));
    let attrs = |g: &KnowledgeGraph| -> Vec<(Option<String>, Option<EntityLabel>)> {
        g.nodes().map(|n| (n.text.clone(), n.label.clone())).collect()
    };
    assert_eq!(attrs(&a), attrs(&b));
    assert!(attrs(&a).iter().skip(1).all(|(text, label)| text.is_some() && label.is_some()));
}

#[tokio::test]
async fn entity_ids_follow_extraction_order() {
    let extractor = FixedExtractor(vec![("John", "PERSON"), ("Python", "SKILL"), ("Google", "ORG")]);
    let mut graph = KnowledgeGraph::new();
    let ids = graph
        .ingest(&extractor, "John uses Python at Google.", "t2")
        .await
        .expect("ingest");

    assert_eq!(ids, vec!["t2_ent_0", "t2_ent_1", "t2_ent_2"]);
    let john = graph.node("t2_ent_0").expect("john");
    assert_eq!(john.text.as_deref(), Some("John"));
    assert_eq!(john.label, Some(EntityLabel::Person));
    assert_eq!(graph.node("t2_ent_2").and_then(|n| n.label.clone()), Some(EntityLabel::Org));
}

#[tokio::test]
async fn extraction_failure_leaves_graph_untouched() {
    let mut graph = KnowledgeGraph::new();
    let err = graph
        .ingest(&FailingExtractor, "anything", "t9")
        .await
        .expect_err("extraction must fail");

    assert!(matches!(err, PersonaError::Extraction(_)));
    assert_eq!(graph.node_count(), 0);
    assert_eq!(graph.edge_count(), 0);
}

#[tokio::test]
async fn empty_extraction_still_creates_document() {
    let mut graph = KnowledgeGraph::new();
    let ids = graph
        .ingest(&FixedExtractor(vec![]), "nothing here", "t0")
        .await
        .expect("ingest");

    assert!(ids.is_empty());
    assert!(graph.contains("t0"));
    assert_eq!(graph.edge_count(), 0);
}

#[tokio::test]
async fn document_and_entity_ids_never_merge() {
    let mut graph = KnowledgeGraph::new();
    graph.ingest(&rule_extractor(), SARAH_TEXT, "t1").await.expect("ingest");
    let before = graph.stats();

    let err = graph
        .ingest(&rule_extractor(), SARAH_TEXT, "t1_ent_0")
        .await
        .expect_err("source id of an entity");
    assert!(matches!(err, PersonaError::IdConflict(_)));
    assert_eq!(graph.stats(), before);
}

#[test]
fn explicit_edge_to_unknown_node_fails() {
    let mut graph = KnowledgeGraph::new();
    let err = graph
        .add_edge("ghost", "phantom", RelationType::WorksAt, Default::default())
        .expect_err("unknown endpoints");
    assert!(matches!(err, PersonaError::UnknownNode(_)));
}

// ---------------------------------------------------------------------------
// Trait merge
// ---------------------------------------------------------------------------

#[tokio::test]
async fn merge_is_idempotent_and_complete() {
    let mut graph = KnowledgeGraph::new();
    let ids = graph
        .ingest(&rule_extractor(), SARAH_TEXT, "t1")
        .await
        .expect("ingest");
    let requested: BTreeSet<String> = ids.iter().cloned().collect();

    let traits = estimate_or_neutral(&RandomEstimator::new(Some(42)), &requested, None).await;
    graph.merge_traits(&traits);
    let first: Vec<TraitProfile> = graph.entity_nodes().map(|n| n.traits.clone()).collect();
    graph.merge_traits(&traits);
    let second: Vec<TraitProfile> = graph.entity_nodes().map(|n| n.traits.clone()).collect();

    assert_eq!(first, second);
    for profile in &second {
        assert_eq!(profile.len(), 5);
        for t in BigFive::ALL {
            let score = profile.score(t).expect("trait present");
            assert!((0.0..=1.0).contains(&score));
        }
    }
}

#[tokio::test]
async fn merge_skips_unknown_and_document_ids() {
    let mut graph = KnowledgeGraph::new();
    graph
        .ingest(&FixedExtractor(vec![("Ada", "PERSON")]), "Ada.", "t1")
        .await
        .expect("ingest");

    let mut traits = TraitMap::new();
    traits.insert("t1_ent_0".into(), TraitProfile::neutral());
    traits.insert("t1".into(), TraitProfile::neutral());
    traits.insert("t1_ent_7".into(), TraitProfile::neutral());
    let report = graph.merge_traits(&traits);

    assert_eq!(report.merged, 1);
    assert_eq!(report.skipped.len(), 2);
    assert!(graph.node("t1").expect("doc").traits.is_empty());
    assert!(!graph.contains("t1_ent_7"));
}

#[tokio::test]
async fn estimator_failure_yields_neutral_scores() {
    let mut graph = KnowledgeGraph::new();
    let ids = graph
        .ingest(&rule_extractor(), SARAH_TEXT, "t1")
        .await
        .expect("ingest");
    let requested: BTreeSet<String> = ids.into_iter().collect();

    let traits = estimate_or_neutral(&FailingEstimator, &requested, None).await;
    assert_eq!(traits.len(), requested.len());
    graph.merge_traits(&traits);

    for node in graph.entity_nodes() {
        assert!(node.traits.iter().all(|(_, s)| s == NEUTRAL_SCORE));
        assert!(node.traits.is_complete());
    }
}

// ---------------------------------------------------------------------------
// Relationship inference
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sarah_example_produces_typed_relationships() {
    let mut graph = KnowledgeGraph::new();
    graph
        .ingest(&rule_extractor(), SARAH_TEXT, "t1")
        .await
        .expect("ingest");
    graph
        .infer_relationships(InferenceMode::Directional)
        .expect("infer");

    let expected = vec![
        ("t1", "t1_ent_0", "mentions"),
        ("t1", "t1_ent_1", "mentions"),
        ("t1", "t1_ent_2", "mentions"),
        ("t1_ent_0", "t1_ent_1", "works_at"),
        ("t1_ent_0", "t1_ent_2", "has_skill"),
    ];
    let expected: Vec<(String, String, String)> = expected
        .into_iter()
        .map(|(s, d, r)| (s.to_string(), d.to_string(), r.to_string()))
        .collect();
    assert_eq!(edge_triples(&graph), expected);
}

#[tokio::test]
async fn repeated_inference_adds_no_duplicates() {
    let mut graph = KnowledgeGraph::new();
    graph
        .ingest(&rule_extractor(), SARAH_TEXT, "t1")
        .await
        .expect("ingest");

    let first = graph
        .infer_relationships(InferenceMode::Directional)
        .expect("first pass");
    let edges_after_first = graph.edge_count();
    let second = graph
        .infer_relationships(InferenceMode::Directional)
        .expect("second pass");

    assert_eq!(first.edges_added, 2);
    assert_eq!(second.edges_added, 0);
    assert_eq!(graph.edge_count(), edges_after_first);
}

#[tokio::test]
async fn reversed_order_needs_symmetric_mode() {
    let extractor = FixedExtractor(vec![("Microsoft", "ORG"), ("Sarah", "PERSON")]);

    let mut directional = KnowledgeGraph::new();
    directional.ingest(&extractor, "x", "t1").await.expect("ingest");
    directional
        .infer_relationships(InferenceMode::Directional)
        .expect("infer");
    assert!(!directional.has_edge("t1_ent_1", "t1_ent_0", &RelationType::WorksAt));

    let mut symmetric = KnowledgeGraph::new();
    symmetric.ingest(&extractor, "x", "t1").await.expect("ingest");
    symmetric
        .infer_relationships(InferenceMode::Symmetric)
        .expect("infer");
    assert!(symmetric.has_edge("t1_ent_1", "t1_ent_0", &RelationType::WorksAt));
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

#[tokio::test]
async fn export_reflects_current_graph() {
    let mut graph = KnowledgeGraph::new();
    graph
        .ingest(&rule_extractor(), SARAH_TEXT, "t1")
        .await
        .expect("ingest");
    let before = export(&graph);
    assert!(before.edges.iter().all(|e| e.relation == "mentions"));

    graph
        .infer_relationships(InferenceMode::Directional)
        .expect("infer");
    let after = export(&graph);

    assert_eq!(after.nodes.len(), graph.node_count());
    assert_eq!(after.edges.len(), 5);
    let doc = after.nodes.iter().find(|n| n.id == "t1").expect("doc node");
    assert_eq!(doc.display_label, "t1");
    let sarah = after.nodes.iter().find(|n| n.id == "t1_ent_0").expect("sarah");
    assert_eq!(sarah.display_label, "Sarah");
    assert_eq!(sarah.group, "PERSON");
    assert!(sarah.tooltip.starts_with("Type: PERSON<br>"));

    let json = serde_json::to_value(&after).expect("serialize export");
    assert_eq!(json["edges"][3]["type"], "works_at");
}
