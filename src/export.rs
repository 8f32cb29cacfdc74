use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use petal::cluster::{Cluster, Region, cluster, cluster_radius};
use petal::{Dataset, EdgeKind, LayoutConfig, Play, UserId};
use serde::Serialize;

/// Headless snapshot of both engines' output for one dataset.
#[derive(Debug, Serialize)]
pub struct ExportDocument {
    pub region: Option<Region>,
    pub cluster_radius: Option<f64>,
    pub clusters: Vec<Cluster<Play>>,
    pub nodes: Vec<ExportNode>,
    pub edges: Vec<ExportEdge>,
}

#[derive(Debug, Serialize)]
pub struct ExportNode {
    pub id: UserId,
    pub username: String,
    pub pinned: bool,
    pub followed: bool,
    pub radius: f32,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Serialize)]
pub struct ExportEdge {
    pub source: UserId,
    pub target: UserId,
    pub kind: EdgeKind,
    pub highlighted: bool,
    pub width: f32,
    pub opacity: f32,
}

/// Lays out the graph and clusters every play over the region that covers them.
pub fn build_export(
    dataset: &Dataset,
    layout_config: &LayoutConfig,
    fixed_radius: Option<f64>,
) -> ExportDocument {
    let mut graph = dataset.social_graph();
    graph.run_layout(layout_config);

    let region = dataset.play_region();
    let radius = region
        .as_ref()
        .map(|region| fixed_radius.unwrap_or_else(|| cluster_radius(region)));
    let clusters = cluster(&dataset.plays, region.as_ref(), radius);

    let nodes = graph
        .nodes
        .iter()
        .map(|node| ExportNode {
            id: node.id,
            username: node.user.username.clone(),
            pinned: node.pinned,
            followed: node.followed,
            radius: node.radius,
            x: node.x,
            y: node.y,
        })
        .collect();
    let edges = graph
        .edges
        .iter()
        .map(|edge| {
            let style = edge.style();
            ExportEdge {
                source: edge.source,
                target: edge.target,
                kind: edge.kind,
                highlighted: edge.highlighted,
                width: style.width,
                opacity: style.opacity,
            }
        })
        .collect();

    ExportDocument {
        region,
        cluster_radius: radius,
        clusters,
        nodes,
        edges,
    }
}

pub fn write_export(document: &ExportDocument, path: &Path) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, document)
        .with_context(|| format!("failed to serialize export to {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("failed to flush {}", path.display()))?;

    log::info!(
        "exported {} nodes, {} edges and {} clusters to {}",
        document.nodes.len(),
        document.edges.len(),
        document.clusters.len(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "viewer": { "id": 1, "username": "me" },
        "users": [ { "id": 2, "username": "ana" }, { "id": 3, "username": "bo" } ],
        "follow_status": { "2": true },
        "relationships": [ { "follower_id": 2, "followee_id": 3 } ],
        "plays": [
            { "id": 10, "latitude": 40.0, "longitude": -73.0, "track": "a" },
            { "id": 11, "latitude": 40.0001, "longitude": -73.0001, "track": "b" },
            { "id": 12, "latitude": 41.0, "longitude": -74.0, "track": "c" }
        ]
    }"#;

    #[test]
    fn export_carries_layout_and_clusters() {
        let dataset = Dataset::from_json(SAMPLE).expect("valid sample");
        let document = build_export(&dataset, &LayoutConfig::default().with_ticks(50), None);

        assert_eq!(document.nodes.len(), 3);
        let viewer = &document.nodes[0];
        assert!(viewer.pinned);
        assert_eq!((viewer.x, viewer.y), (0.0, 0.0));

        assert_eq!(document.edges.len(), 2);
        assert_eq!(document.edges[0].kind, EdgeKind::Direct);
        assert_eq!(document.edges[0].width, 2.0);
        assert!(document.edges[1].highlighted);

        let total = document.clusters.iter().map(|cluster| cluster.count).sum::<usize>();
        assert_eq!(total, 3);
        assert!(document.cluster_radius.is_some());

        let json = serde_json::to_value(&document).expect("serializable");
        assert_eq!(json["edges"][0]["kind"], "direct");
    }

    #[test]
    fn fixed_radius_overrides_zoom_radius() {
        let dataset = Dataset::from_json(SAMPLE).expect("valid sample");
        let document = build_export(&dataset, &LayoutConfig::default().with_ticks(1), Some(5.0));
        assert_eq!(document.cluster_radius, Some(5.0));
        assert_eq!(document.clusters.len(), 1);
    }
}
