//! Collaborator data loaded from a JSON snapshot.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cluster::{Clusterable, Coordinate, Region};
use crate::social::{FollowStatus, GraphAssembler, Relationship, SocialGraph, User, UserId};

/// Padding, in degrees, around the plays when deriving their bounding region.
const REGION_PADDING: f64 = 0.01;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid dataset JSON")]
    Json(#[from] serde_json::Error),
    #[error("play {id} has out-of-range coordinates ({latitude}, {longitude})")]
    InvalidCoordinate {
        id: i64,
        latitude: f64,
        longitude: f64,
    },
}

/// A track play pinned to the place it was listened to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Play {
    pub id: i64,
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub latitude: f64,
    pub longitude: f64,
    pub track: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub artwork_url: Option<String>,
}

impl Clusterable for Play {
    fn id(&self) -> i64 {
        self.id
    }

    fn latitude(&self) -> f64 {
        self.latitude
    }

    fn longitude(&self) -> f64 {
        self.longitude
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub viewer: Option<User>,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub follow_status: FollowStatus,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
    #[serde(default)]
    pub plays: Vec<Play>,
}

impl Dataset {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let dataset = Self::from_json(&raw)?;

        log::info!(
            "loaded {} users, {} relationships and {} plays from {}",
            dataset.users.len(),
            dataset.relationships.len(),
            dataset.plays.len(),
            path.display()
        );
        Ok(dataset)
    }

    pub fn from_json(raw: &str) -> Result<Self, DatasetError> {
        let dataset: Self = serde_json::from_str(raw)?;
        dataset.validate()?;
        Ok(dataset)
    }

    fn validate(&self) -> Result<(), DatasetError> {
        for play in &self.plays {
            if !(-90.0..=90.0).contains(&play.latitude) || !(-180.0..=180.0).contains(&play.longitude)
            {
                return Err(DatasetError::InvalidCoordinate {
                    id: play.id,
                    latitude: play.latitude,
                    longitude: play.longitude,
                });
            }
        }

        let known = self
            .users
            .iter()
            .map(|user| user.id)
            .chain(self.viewer.as_ref().map(|viewer| viewer.id))
            .collect::<HashSet<_>>();
        let dangling = self
            .follow_status
            .keys()
            .filter(|id| !known.contains(id))
            .count();
        if dangling > 0 {
            log::warn!("{dangling} follow status entries name users missing from the dataset");
        }

        Ok(())
    }

    pub fn assembler(&self) -> GraphAssembler<'_> {
        GraphAssembler::new(&self.users, &self.follow_status, &self.relationships)
            .with_viewer(self.viewer.as_ref())
    }

    pub fn social_graph(&self) -> SocialGraph {
        self.assembler().assemble()
    }

    /// Smallest padded region covering every play, if there are any.
    pub fn play_region(&self) -> Option<Region> {
        let first = self.plays.first()?;
        let (mut south, mut north) = (first.latitude, first.latitude);
        let (mut west, mut east) = (first.longitude, first.longitude);
        for play in &self.plays[1..] {
            south = south.min(play.latitude);
            north = north.max(play.latitude);
            west = west.min(play.longitude);
            east = east.max(play.longitude);
        }

        Some(Region::from_bounds(
            Coordinate::new(south - REGION_PADDING, west - REGION_PADDING),
            Coordinate::new(north + REGION_PADDING, east + REGION_PADDING),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::social::EdgeKind;

    const SAMPLE: &str = r#"{
        "viewer": { "id": 1, "username": "me", "display_name": "Me" },
        "users": [
            { "id": 2, "username": "ana" },
            { "id": 3, "username": "bo", "avatar_url": "https://example.invalid/bo.png" }
        ],
        "follow_status": { "2": true, "3": false, "42": true },
        "relationships": [
            { "follower_id": 2, "followee_id": 3 },
            { "follower_id": 1, "followee_id": 3 }
        ],
        "plays": [
            { "id": 10, "user_id": 2, "latitude": 40.0, "longitude": -73.0, "track": "Song" },
            { "id": 11, "latitude": 40.0005, "longitude": -73.0005, "track": "Other", "artist": "X" }
        ]
    }"#;

    #[test]
    fn parses_sample_and_assembles_graph() {
        let dataset = Dataset::from_json(SAMPLE).expect("valid sample");

        assert_eq!(dataset.viewer.as_ref().map(User::label), Some("Me"));
        assert_eq!(dataset.follow_status.get(&2), Some(&true));
        assert_eq!(dataset.plays[0].artist, "");

        let graph = dataset.social_graph();
        assert_eq!(graph.nodes.len(), 3);
        let kinds = graph.edges.iter().map(|edge| edge.kind).collect::<Vec<_>>();
        assert_eq!(kinds, vec![EdgeKind::Direct, EdgeKind::Secondary]);
    }

    #[test]
    fn empty_object_is_an_empty_dataset() {
        let dataset = Dataset::from_json("{}").expect("empty dataset");
        assert_eq!(dataset, Dataset::default());
        assert!(dataset.play_region().is_none());
        assert!(dataset.social_graph().is_empty());
    }

    #[test]
    fn rejects_out_of_range_plays() {
        let raw = r#"{ "plays": [ { "id": 5, "latitude": 95.0, "longitude": 0.0, "track": "t" } ] }"#;
        let error = Dataset::from_json(raw).expect_err("latitude out of range");
        assert!(matches!(error, DatasetError::InvalidCoordinate { id: 5, .. }));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(Dataset::from_json("{ nope"), Err(DatasetError::Json(_))));
    }

    #[test]
    fn missing_file_reports_path() {
        let error = Dataset::load("/definitely/not/here.json").expect_err("missing file");
        assert!(error.to_string().contains("/definitely/not/here.json"));
    }

    #[test]
    fn play_region_covers_all_plays() {
        let dataset = Dataset::from_json(SAMPLE).expect("valid sample");
        let region = dataset.play_region().expect("plays present");
        for play in &dataset.plays {
            assert!(region.contains(play.coordinate()));
        }
        assert!(region.latitude_delta > 0.02);
    }
}
