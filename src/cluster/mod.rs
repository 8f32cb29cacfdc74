//! Greedy marker clustering for the play map.
//!
//! A pass walks the (capped) input once. Each item that is not yet assigned
//! seeds a cluster and pulls in every later unassigned item whose latitude
//! and longitude are each within `radius` of the seed. Membership is judged
//! against the seed only, so the grouping is not transitive, and distances
//! are per-axis degree differences rather than geodesic ones.

mod region;

use serde::Serialize;

pub use region::{Coordinate, MIN_CLUSTER_RADIUS, Region, cluster_radius};

/// Radius used when the caller does not supply one, in degrees.
pub const DEFAULT_CLUSTER_RADIUS: f64 = 0.002;

/// Anything with an id and a position on the map.
pub trait Clusterable {
    fn id(&self) -> i64;
    fn latitude(&self) -> f64;
    fn longitude(&self) -> f64;

    fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude(), self.longitude())
    }
}

/// Ad-hoc clusterable wrapper around an arbitrary payload.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GeoItem<P> {
    pub id: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub payload: P,
}

impl<P> GeoItem<P> {
    pub fn new(id: i64, latitude: f64, longitude: f64, payload: P) -> Self {
        Self {
            id,
            latitude,
            longitude,
            payload,
        }
    }
}

impl<P> Clusterable for GeoItem<P> {
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

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Cluster<T> {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub count: usize,
    pub members: Vec<T>,
}

impl<T: Clusterable> Cluster<T> {
    fn from_members(seed_id: i64, members: Vec<T>) -> Self {
        let count = members.len();
        let (latitude_sum, longitude_sum) = members.iter().fold((0.0, 0.0), |(lat, lon), item| {
            (lat + item.latitude(), lon + item.longitude())
        });

        Self {
            id: format!("cluster-{seed_id}"),
            latitude: latitude_sum / count as f64,
            longitude: longitude_sum / count as f64,
            count,
            members,
        }
    }
}

impl<T> Cluster<T> {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    /// Member whose artwork stands in for the whole marker.
    pub fn representative(&self) -> Option<&T> {
        self.members.first()
    }

    /// Count label for markers that group more than one item.
    pub fn badge(&self) -> Option<String> {
        (self.count > 1).then(|| self.count.to_string())
    }
}

fn within_radius<T: Clusterable>(seed: &T, other: &T, radius: f64) -> bool {
    (seed.latitude() - other.latitude()).abs() <= radius
        && (seed.longitude() - other.longitude()).abs() <= radius
}

/// Groups `items` into map clusters for the given viewport.
///
/// Returns nothing when there is no region or no items. Only the first
/// [`Region::item_cap`] items are considered; the rest are left out of every
/// cluster. `radius` defaults to [`DEFAULT_CLUSTER_RADIUS`].
pub fn cluster<T>(items: &[T], region: Option<&Region>, radius: Option<f64>) -> Vec<Cluster<T>>
where
    T: Clusterable + Clone,
{
    let Some(region) = region else {
        return Vec::new();
    };
    if items.is_empty() {
        return Vec::new();
    }

    let radius = radius.unwrap_or(DEFAULT_CLUSTER_RADIUS);
    let cap = region.item_cap();
    let considered = &items[..items.len().min(cap)];

    let mut assigned = vec![false; considered.len()];
    let mut clusters = Vec::new();

    for (seed_index, seed) in considered.iter().enumerate() {
        if assigned[seed_index] {
            continue;
        }
        assigned[seed_index] = true;

        let mut members = vec![seed.clone()];
        // Everything before the seed is already assigned.
        for (other_index, other) in considered.iter().enumerate().skip(seed_index + 1) {
            if assigned[other_index] || !within_radius(seed, other, radius) {
                continue;
            }
            assigned[other_index] = true;
            members.push(other.clone());
        }

        clusters.push(Cluster::from_members(seed.id(), members));
    }

    log::debug!(
        "clustered {} of {} items (cap {cap}, radius {radius}) into {} clusters",
        considered.len(),
        items.len(),
        clusters.len()
    );

    clusters
}
