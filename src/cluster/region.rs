use serde::{Deserialize, Serialize};

/// Smallest radius [`cluster_radius`] will hand out, in degrees.
pub const MIN_CLUSTER_RADIUS: f64 = 0.0005;
const RADIUS_PER_LATITUDE_DEGREE: f64 = 0.03;

const HIGH_ZOOM: f64 = 14.0;
const MEDIUM_ZOOM: f64 = 12.0;
const HIGH_ZOOM_ITEM_CAP: usize = 500;
const MEDIUM_ZOOM_ITEM_CAP: usize = 300;
const LOW_ZOOM_ITEM_CAP: usize = 200;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// The visible part of the map, as reported by the map collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub center: Coordinate,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl Region {
    pub fn new(center: Coordinate, latitude_delta: f64, longitude_delta: f64) -> Self {
        Self {
            center,
            latitude_delta,
            longitude_delta,
        }
    }

    /// Builds a region from its south-west and north-east corners.
    pub fn from_bounds(south_west: Coordinate, north_east: Coordinate) -> Self {
        let south = south_west.latitude.min(north_east.latitude);
        let north = south_west.latitude.max(north_east.latitude);
        let west = south_west.longitude.min(north_east.longitude);
        let east = south_west.longitude.max(north_east.longitude);

        Self {
            center: Coordinate::new((south + north) * 0.5, (west + east) * 0.5),
            latitude_delta: north - south,
            longitude_delta: east - west,
        }
    }

    /// Estimated map zoom level, `log2(360 / latitude_delta)`.
    ///
    /// A zero delta yields `+inf` (deepest zoom); a negative or NaN delta yields NaN,
    /// which [`Region::item_cap`] treats as the lowest zoom.
    pub fn zoom_level(&self) -> f64 {
        (360.0 / self.latitude_delta).log2()
    }

    /// Number of items a clustering pass considers at this zoom.
    pub fn item_cap(&self) -> usize {
        let zoom = self.zoom_level();
        if zoom > HIGH_ZOOM {
            HIGH_ZOOM_ITEM_CAP
        } else if zoom > MEDIUM_ZOOM {
            MEDIUM_ZOOM_ITEM_CAP
        } else {
            LOW_ZOOM_ITEM_CAP
        }
    }

    pub fn contains(&self, coordinate: Coordinate) -> bool {
        let half_lat = self.latitude_delta * 0.5;
        let half_lon = self.longitude_delta * 0.5;
        (coordinate.latitude - self.center.latitude).abs() <= half_lat
            && (coordinate.longitude - self.center.longitude).abs() <= half_lon
    }
}

/// Zoom-proportional cluster radius for callers that do not want the fixed default.
pub fn cluster_radius(region: &Region) -> f64 {
    (region.latitude_delta * RADIUS_PER_LATITUDE_DEGREE).max(MIN_CLUSTER_RADIUS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region_with_delta(latitude_delta: f64) -> Region {
        Region::new(Coordinate::new(40.0, -73.0), latitude_delta, latitude_delta)
    }

    #[test]
    fn whole_world_is_zoom_zero() {
        let region = region_with_delta(360.0);
        assert!(region.zoom_level().abs() < 1e-12);
        assert_eq!(region.item_cap(), 200);
    }

    #[test]
    fn cap_steps_up_with_zoom() {
        // 360 / 2^13 puts the estimate at exactly 13.
        assert_eq!(region_with_delta(360.0 / 8192.0).item_cap(), 300);
        assert_eq!(region_with_delta(360.0 / 32768.0).item_cap(), 500);
        // Thresholds are exclusive.
        assert_eq!(region_with_delta(360.0 / 4096.0).item_cap(), 200);
        assert_eq!(region_with_delta(360.0 / 16384.0).item_cap(), 300);
    }

    #[test]
    fn degenerate_deltas_do_not_panic() {
        assert_eq!(region_with_delta(0.0).item_cap(), 500);
        assert_eq!(region_with_delta(-1.0).item_cap(), 200);
        assert_eq!(region_with_delta(f64::NAN).item_cap(), 200);
    }

    #[test]
    fn radius_is_proportional_with_a_floor() {
        assert!((cluster_radius(&region_with_delta(1.0)) - 0.03).abs() < 1e-12);
        assert_eq!(cluster_radius(&region_with_delta(0.001)), MIN_CLUSTER_RADIUS);
    }

    #[test]
    fn bounds_round_trip_through_center_and_deltas() {
        let region = Region::from_bounds(Coordinate::new(41.0, -72.0), Coordinate::new(39.0, -74.0));
        assert_eq!(region.center, Coordinate::new(40.0, -73.0));
        assert_eq!(region.latitude_delta, 2.0);
        assert_eq!(region.longitude_delta, 2.0);
        assert!(region.contains(Coordinate::new(40.9, -72.1)));
        assert!(!region.contains(Coordinate::new(41.1, -73.0)));
    }
}
