//! Follow-graph assembly.
//!
//! The social collaborator hands over a user list, the viewer's follow status
//! per user and a flat list of follower/followee pairs. [`GraphAssembler`]
//! turns that into a [`SocialGraph`] whose viewer node is pinned at the origin
//! and whose edges carry the kind and highlight state the renderer needs.

mod graph;

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

pub use graph::{EdgeKind, EdgeStyle, GraphEdge, GraphNode, SocialGraph};

pub type UserId = i64;

/// Viewer-follows-user flags, keyed by user id.
pub type FollowStatus = HashMap<UserId, bool>;

pub const VIEWER_NODE_RADIUS: f32 = 32.0;
pub const USER_NODE_RADIUS: f32 = 24.0;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl User {
    pub fn new(id: UserId, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            display_name: None,
            avatar_url: None,
        }
    }

    /// Display name when set, username otherwise.
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.username)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relationship {
    pub follower_id: UserId,
    pub followee_id: UserId,
}

impl Relationship {
    pub fn new(follower_id: UserId, followee_id: UserId) -> Self {
        Self {
            follower_id,
            followee_id,
        }
    }
}

/// Builds a [`SocialGraph`] from raw collaborator data.
pub struct GraphAssembler<'a> {
    viewer: Option<&'a User>,
    users: &'a [User],
    follow_status: &'a FollowStatus,
    relationships: &'a [Relationship],
}

impl<'a> GraphAssembler<'a> {
    pub fn new(
        users: &'a [User],
        follow_status: &'a FollowStatus,
        relationships: &'a [Relationship],
    ) -> Self {
        Self {
            viewer: None,
            users,
            follow_status,
            relationships,
        }
    }

    pub fn with_viewer(mut self, viewer: Option<&'a User>) -> Self {
        self.viewer = viewer;
        self
    }

    fn viewer_follows(&self, id: UserId) -> bool {
        self.follow_status.get(&id).copied().unwrap_or(false)
    }

    fn collect_nodes(&self) -> Vec<GraphNode> {
        let mut seen = HashSet::new();
        let mut nodes = Vec::with_capacity(self.users.len() + 1);

        if let Some(viewer) = self.viewer {
            seen.insert(viewer.id);
            nodes.push(GraphNode {
                id: viewer.id,
                user: viewer.clone(),
                pinned: true,
                followed: false,
                radius: VIEWER_NODE_RADIUS,
                x: 0.0,
                y: 0.0,
            });
        }

        for user in self.users {
            if !seen.insert(user.id) {
                continue;
            }
            nodes.push(GraphNode {
                id: user.id,
                user: user.clone(),
                pinned: false,
                followed: self.viewer_follows(user.id),
                radius: USER_NODE_RADIUS,
                x: 0.0,
                y: 0.0,
            });
        }

        nodes
    }

    fn collect_edges(&self, nodes: &[GraphNode]) -> Vec<GraphEdge> {
        let known = nodes.iter().map(|node| node.id).collect::<HashSet<_>>();
        let viewer_id = self.viewer.map(|viewer| viewer.id);
        let mut seen = HashSet::new();
        let mut edges = Vec::new();

        if let Some(viewer_id) = viewer_id {
            for node in nodes.iter().filter(|node| node.followed) {
                let edge = GraphEdge::direct(viewer_id, node.id);
                if seen.insert((edge.source, edge.target)) {
                    edges.push(edge);
                }
            }
        }

        for relationship in self.relationships {
            let (source, target) = (relationship.follower_id, relationship.followee_id);
            // The viewer's own follows are already the direct edges above.
            if Some(source) == viewer_id || source == target {
                continue;
            }
            if !known.contains(&source) || !known.contains(&target) {
                continue;
            }
            if !seen.insert((source, target)) {
                continue;
            }

            let highlighted = self.viewer_follows(source) || self.viewer_follows(target);
            edges.push(GraphEdge::secondary(source, target, highlighted));
        }

        edges
    }

    pub fn assemble(&self) -> SocialGraph {
        let nodes = self.collect_nodes();
        let edges = self.collect_edges(&nodes);

        log::debug!(
            "assembled social graph with {} nodes and {} edges",
            nodes.len(),
            edges.len()
        );

        SocialGraph {
            viewer_id: self.viewer.map(|viewer| viewer.id),
            nodes,
            edges,
        }
    }
}
