use std::path::Path;

use chrono::Utc;

use persona_core::error::Result;

use crate::export::{export, RenderData};
use crate::store::KnowledgeGraph;

const VIS_NETWORK_CDN: &str = "https://unpkg.com/vis-network/standalone/umd/vis-network.min.js";

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Knowledge Graph</title>
<!-- generated __GENERATED_AT__ -->
<script type="text/javascript" src="__VIS_SRC__"></script>
<style type="text/css">
  #mynetwork {
    width: 100%;
    height: 800px;
    background-color: #ffffff;
    border: 1px solid lightgray;
  }
</style>
</head>
<body>
<div id="mynetwork"></div>
<script type="text/javascript">
  var rawNodes = __NODES__;
  var rawEdges = __EDGES__;
  rawNodes.forEach(function (n) {
    var el = document.createElement("div");
    el.innerHTML = n.title;
    n.title = el;
  });
  var nodes = new vis.DataSet(rawNodes);
  var edges = new vis.DataSet(rawEdges);
  var container = document.getElementById("mynetwork");
  var data = { nodes: nodes, edges: edges };
  var options = {
    nodes: { font: { color: "black" } },
    edges: { arrows: "to" },
    physics: { stabilization: true }
  };
  var network = new vis.Network(container, data, options);
</script>
</body>
</html>
"#;

/// JSON that is safe to inline inside a `<script>` element.
fn script_json<T: serde::Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

/// Renders a standalone vis-network page embedding `data`.
pub fn render_html(data: &RenderData) -> Result<String> {
    let nodes = script_json(&data.nodes)?;
    let edges = script_json(&data.edges)?;
    Ok(PAGE_TEMPLATE
        .replace("__GENERATED_AT__", &Utc::now().to_rfc3339())
        .replace("__VIS_SRC__", VIS_NETWORK_CDN)
        .replace("__NODES__", &nodes)
        .replace("__EDGES__", &edges))
}

/// Exports `graph` and writes the rendered page to `path`.
pub async fn write_html(graph: &KnowledgeGraph, path: &Path) -> Result<()> {
    let html = render_html(&export(graph).to_render_data())?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, html).await?;
    tracing::info!(
        path = %path.display(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "Graph visualization saved"
    );
    Ok(())
}
