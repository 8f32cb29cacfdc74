//! Map clustering and social graph layout engines for the petal client.
//!
//! The crate is split along the four computational pieces the client needs:
//! [`cluster`] groups geotagged plays into map markers, [`social`] assembles
//! the follow graph, [`layout`] positions it with a fixed-budget force
//! simulation and [`viewport`] accumulates pan/pinch gestures into a render
//! transform. [`dataset`] loads the collaborator data those engines consume.

pub mod cluster;
pub mod dataset;
pub mod layout;
pub mod social;
pub mod viewport;

mod util;

pub use cluster::{Cluster, Clusterable, GeoItem, Region, cluster, cluster_radius};
pub use dataset::{Dataset, DatasetError, Play};
pub use layout::{LayoutConfig, Positions, layout, layout_with};
pub use social::{
    EdgeKind, EdgeStyle, GraphAssembler, GraphEdge, GraphNode, Relationship, SocialGraph, User,
    UserId,
};
pub use viewport::{GestureEvent, Transform, ViewportController};
