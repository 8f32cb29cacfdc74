use std::collections::HashSet;
use std::path::Path;

use eframe::egui::{Vec2, vec2};
use petal::cluster::Coordinate;
use petal::{
    Dataset, EdgeKind, GeoItem, GestureEvent, LayoutConfig, Region, Transform, ViewportController,
    cluster,
};

fn sample_dataset() -> Dataset {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/sample.json");
    Dataset::load(&path).expect("bundled sample loads")
}

#[test]
fn nearby_items_share_a_cluster() {
    let items = vec![
        GeoItem::new(1, 37.7749, -122.4194, "a"),
        GeoItem::new(2, 37.7750, -122.4195, "b"),
        GeoItem::new(3, 37.8000, -122.4000, "c"),
    ];
    let region = Region::new(Coordinate::new(37.78, -122.41), 0.05, 0.05);

    let clusters = cluster(&items, Some(&region), None);

    assert_eq!(clusters.len(), 2);
    assert_eq!(clusters[0].id, "cluster-1");
    assert_eq!(clusters[0].count, 2);
    assert!((clusters[0].latitude - 37.77495).abs() < 1e-9);
    assert!((clusters[0].longitude - -122.41945).abs() < 1e-9);
    assert_eq!(clusters[1].id, "cluster-3");
    assert_eq!(clusters[1].count, 1);
}

#[test]
fn clustering_without_region_is_empty() {
    let items = vec![GeoItem::new(1, 0.0, 0.0, ())];
    assert!(cluster(&items, None, Some(1.0)).is_empty());
}

#[test]
fn sample_plays_cluster_into_a_partition() {
    let dataset = sample_dataset();
    let region = dataset.play_region().expect("sample has plays");

    let clusters = cluster(&dataset.plays, Some(&region), None);

    let ids = clusters
        .iter()
        .flat_map(|cluster| cluster.members.iter().map(|play| play.id))
        .collect::<Vec<_>>();
    let unique = ids.iter().copied().collect::<HashSet<_>>();
    assert_eq!(ids.len(), unique.len());
    assert_eq!(ids.len(), dataset.plays.len().min(region.item_cap()));
}

#[test]
fn sample_graph_lays_out_around_the_viewer() {
    let dataset = sample_dataset();
    let mut graph = dataset.social_graph();
    let viewer_id = graph.viewer_id.expect("sample has a viewer");

    let positions = graph.run_layout(&LayoutConfig::default());

    assert_eq!(positions.len(), graph.nodes.len());
    assert_eq!(positions[&viewer_id], Vec2::ZERO);
    assert!(
        positions
            .values()
            .all(|position| position.x.is_finite() && position.y.is_finite())
    );

    let direct = graph
        .edges
        .iter()
        .filter(|edge| edge.kind == EdgeKind::Direct)
        .collect::<Vec<_>>();
    let followed = graph.nodes.iter().filter(|node| node.followed).count();
    assert_eq!(direct.len(), followed);
    assert!(direct.iter().all(|edge| edge.source == viewer_id));
    assert!(
        graph
            .edges
            .iter()
            .filter(|edge| edge.kind == EdgeKind::Secondary)
            .all(|edge| edge.source != viewer_id && edge.source != edge.target)
    );
}

#[test]
fn viewport_composes_gesture_sessions() {
    let mut viewport = ViewportController::new();

    for event in [
        GestureEvent::PanStart,
        GestureEvent::PanUpdate(vec2(10.0, 0.0)),
        GestureEvent::PanEnd,
        GestureEvent::PanStart,
        GestureEvent::PanUpdate(vec2(5.0, -5.0)),
        GestureEvent::PanEnd,
        GestureEvent::PinchStart,
        GestureEvent::PinchUpdate(2.0),
        GestureEvent::PinchEnd,
        GestureEvent::PinchStart,
        GestureEvent::PinchUpdate(1.5),
        GestureEvent::PinchEnd,
    ] {
        viewport.handle(event);
    }

    assert_eq!(viewport.transform(), Transform::new(vec2(15.0, -5.0), 3.0));
}
