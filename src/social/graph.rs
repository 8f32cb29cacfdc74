use std::collections::{HashMap, HashSet};

use eframe::egui::Vec2;
use serde::Serialize;

use super::{User, UserId};
use crate::layout::{LayoutConfig, Positions, layout_with};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Between the viewer and someone the viewer follows.
    Direct,
    /// A follow between two other people in the graph.
    Secondary,
}

/// Stroke parameters the graph renderer draws an edge with.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct EdgeStyle {
    pub width: f32,
    pub opacity: f32,
}

impl EdgeStyle {
    pub const DIRECT: Self = Self {
        width: 2.0,
        opacity: 0.7,
    };
    pub const HIGHLIGHTED_SECONDARY: Self = Self {
        width: 1.5,
        opacity: 0.45,
    };
    pub const SECONDARY: Self = Self {
        width: 1.0,
        opacity: 0.18,
    };
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GraphNode {
    pub id: UserId,
    pub user: User,
    pub pinned: bool,
    /// Whether the viewer follows this user.
    pub followed: bool,
    /// Visual radius; the layout keeps centers at least this far apart plus padding.
    pub radius: f32,
    pub x: f32,
    pub y: f32,
}

impl GraphNode {
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct GraphEdge {
    pub source: UserId,
    pub target: UserId,
    pub kind: EdgeKind,
    /// Secondary edge touching someone the viewer follows.
    pub highlighted: bool,
}

impl GraphEdge {
    pub fn direct(source: UserId, target: UserId) -> Self {
        Self {
            source,
            target,
            kind: EdgeKind::Direct,
            highlighted: false,
        }
    }

    pub fn secondary(source: UserId, target: UserId, highlighted: bool) -> Self {
        Self {
            source,
            target,
            kind: EdgeKind::Secondary,
            highlighted,
        }
    }

    pub fn style(&self) -> EdgeStyle {
        match (self.kind, self.highlighted) {
            (EdgeKind::Direct, _) => EdgeStyle::DIRECT,
            (EdgeKind::Secondary, true) => EdgeStyle::HIGHLIGHTED_SECONDARY,
            (EdgeKind::Secondary, false) => EdgeStyle::SECONDARY,
        }
    }

    pub fn touches(&self, id: UserId) -> bool {
        self.source == id || self.target == id
    }
}

/// Nodes and derived edges of one follow-graph snapshot.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SocialGraph {
    pub viewer_id: Option<UserId>,
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl SocialGraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: UserId) -> Option<&GraphNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn index_by_id(&self) -> HashMap<UserId, usize> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.id, index))
            .collect()
    }

    /// Ids connected to `id` by any edge.
    pub fn neighbors(&self, id: UserId) -> HashSet<UserId> {
        self.edges
            .iter()
            .filter_map(|edge| {
                if edge.source == id {
                    Some(edge.target)
                } else if edge.target == id {
                    Some(edge.source)
                } else {
                    None
                }
            })
            .collect()
    }

    /// Writes `positions` into the matching nodes; nodes without an entry keep theirs.
    pub fn apply_positions(&mut self, positions: &Positions) {
        for node in &mut self.nodes {
            if let Some(position) = positions.get(&node.id) {
                node.x = position.x;
                node.y = position.y;
            }
        }
    }

    /// Runs the force layout over this graph and stores the result in the nodes.
    pub fn run_layout(&mut self, config: &LayoutConfig) -> Positions {
        let positions = layout_with(&self.nodes, &self.edges, self.viewer_id, config);
        self.apply_positions(&positions);
        positions
    }
}
