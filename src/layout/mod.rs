//! Fixed-budget force layout for the social graph.
//!
//! The whole simulation runs synchronously before any position is handed
//! out: nodes are seeded on a ring, the integrator is ticked a fixed number
//! of times, and the final positions are returned keyed by node id. There is
//! no convergence check and no incremental restart; callers recompute when
//! the node or edge set changes.

mod forces;
mod quadtree;
mod simulation;

use std::collections::HashMap;
use std::f32::consts::TAU;
use std::time::Instant;

use eframe::egui::{Vec2, vec2};

use crate::social::{GraphEdge, GraphNode, UserId};
use crate::util::stable_unit;
use simulation::Simulation;

/// Final layout positions keyed by node id.
pub type Positions = HashMap<UserId, Vec2>;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutConfig {
    /// Ticks run before positions are returned.
    pub ticks: usize,
    pub link_distance: f32,
    pub link_strength: f32,
    /// Negative values repel.
    pub charge_strength: f32,
    /// Pairs further apart than this exert no charge on each other.
    pub charge_max_distance: f32,
    /// Barnes-Hut opening angle.
    pub theta: f32,
    /// Added to each node's radius for collision.
    pub collision_padding: f32,
    pub collision_strength: f32,
    pub collision_iterations: usize,
    pub center_strength: f32,
    /// Alpha reached at the end of `ticks`.
    pub alpha_min: f32,
    /// Fraction of velocity lost per tick.
    pub velocity_decay: f32,
    pub seed_radius_min: f32,
    pub seed_radius_max: f32,
    /// Drives the radial jitter of the initial ring.
    pub seed: u64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            ticks: 300,
            link_distance: 300.0,
            link_strength: 0.3,
            charge_strength: -150.0,
            charge_max_distance: 250.0,
            theta: 0.9,
            collision_padding: 8.0,
            collision_strength: 1.0,
            collision_iterations: 2,
            center_strength: 0.05,
            alpha_min: 0.001,
            velocity_decay: 0.4,
            seed_radius_min: 150.0,
            seed_radius_max: 250.0,
            seed: 0,
        }
    }
}

impl LayoutConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_ticks(mut self, ticks: usize) -> Self {
        self.ticks = ticks;
        self
    }
}

/// Initial ring: node `i` of `n` at angle `i/n` of a turn, radius jittered per id.
fn seed_positions(nodes: &[GraphNode], pinned: Option<usize>, config: &LayoutConfig) -> Vec<Vec2> {
    let node_count = nodes.len() as f32;
    let spread = (config.seed_radius_max - config.seed_radius_min).max(0.0);

    nodes
        .iter()
        .enumerate()
        .map(|(index, node)| {
            if Some(index) == pinned {
                return Vec2::ZERO;
            }
            let angle = (index as f32 / node_count) * TAU;
            let radius = config.seed_radius_min + stable_unit(config.seed, node.id) * spread;
            vec2(angle.cos(), angle.sin()) * radius
        })
        .collect()
}

fn resolve_pinned(
    nodes: &[GraphNode],
    index_by_id: &HashMap<UserId, usize>,
    pinned: Option<UserId>,
) -> Option<usize> {
    pinned
        .and_then(|id| index_by_id.get(&id).copied())
        .or_else(|| nodes.iter().position(|node| node.pinned))
}

/// Lays out the graph with [`LayoutConfig::default`].
pub fn layout(nodes: &[GraphNode], edges: &[GraphEdge], pinned: Option<UserId>) -> Positions {
    layout_with(nodes, edges, pinned, &LayoutConfig::default())
}

/// Runs the force simulation and returns the settled position of every node.
///
/// The pinned node (the `pinned` id, or failing that the first node flagged
/// as pinned) stays at the origin. Edges naming unknown ids and self-loops
/// are ignored.
pub fn layout_with(
    nodes: &[GraphNode],
    edges: &[GraphEdge],
    pinned: Option<UserId>,
    config: &LayoutConfig,
) -> Positions {
    if nodes.is_empty() {
        return Positions::new();
    }

    let started = Instant::now();

    let mut index_by_id = HashMap::with_capacity(nodes.len());
    for (index, node) in nodes.iter().enumerate() {
        index_by_id.entry(node.id).or_insert(index);
    }
    let pinned_index = resolve_pinned(nodes, &index_by_id, pinned);

    let links = edges
        .iter()
        .filter_map(|edge| {
            let source = *index_by_id.get(&edge.source)?;
            let target = *index_by_id.get(&edge.target)?;
            (source != target).then_some((source, target))
        })
        .collect::<Vec<_>>();

    let collision_radii = nodes
        .iter()
        .map(|node| node.radius.max(0.0) + config.collision_padding)
        .collect::<Vec<_>>();

    let mut simulation = Simulation::new(
        seed_positions(nodes, pinned_index, config),
        collision_radii,
        &links,
        pinned_index,
        config,
    );
    simulation.run(config.ticks);

    log::debug!(
        "laid out {} nodes and {} links in {} ticks ({:.1} ms)",
        nodes.len(),
        links.len(),
        config.ticks,
        started.elapsed().as_secs_f64() * 1000.0
    );

    nodes
        .iter()
        .zip(simulation.positions())
        .map(|(node, position)| (node.id, *position))
        .collect()
}
