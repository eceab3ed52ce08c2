use geo::{Distance, Haversine, Point};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Mean Earth radius in kilometres used by the haversine computation
/// (the IUGG mean radius, the same constant `geo` uses internally).
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Assumed average road speed for the rough travel-time estimate.
pub const DEFAULT_ROAD_SPEED_KMH: f64 = 70.0;

// ---------------------------------------------------------------------------
// Coordinates / base location
// ---------------------------------------------------------------------------

/// A WGS84 latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// `[x, y]` pair for plotting (longitude on the horizontal axis).
    pub fn plot_xy(&self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }

    fn to_point(self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}

/// Fixed reference point every distance is measured from.
///
/// Built once from configuration and passed by reference to the loader and
/// the detail resolver; never mutated during a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseLocation {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Default for BaseLocation {
    fn default() -> Self {
        Self {
            name: "Chingola (Base of Operations)".to_string(),
            latitude: -12.5333,
            longitude: 27.8500,
        }
    }
}

impl BaseLocation {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    /// Straight-line distance from the base to `target`, in kilometres.
    pub fn distance_to(&self, target: Coordinates) -> f64 {
        distance_km(
            self.latitude,
            self.longitude,
            target.latitude,
            target.longitude,
        )
    }
}

/// Latitude/longitude box a plausible property must fall inside.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionBounds {
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
}

impl RegionBounds {
    /// Zambia's national extent, slightly padded.
    pub const ZAMBIA: RegionBounds = RegionBounds {
        min_latitude: -18.1,
        max_latitude: -8.2,
        min_longitude: 21.9,
        max_longitude: 33.8,
    };

    pub fn contains(&self, c: Coordinates) -> bool {
        (self.min_latitude..=self.max_latitude).contains(&c.latitude)
            && (self.min_longitude..=self.max_longitude).contains(&c.longitude)
    }
}

impl Default for RegionBounds {
    fn default() -> Self {
        Self::ZAMBIA
    }
}

// ---------------------------------------------------------------------------
// Distance / travel time / route
// ---------------------------------------------------------------------------

/// Great-circle (haversine) distance between two points in kilometres.
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let a = Coordinates::new(lat1, lon1).to_point();
    let b = Coordinates::new(lat2, lon2).to_point();
    let metres = Haversine.distance(a, b);
    (metres / 1000.0).max(0.0)
}

/// Rough travel time for a straight-line distance at a fixed average speed.
///
/// This is an estimate only; there is no road network behind it.
pub fn travel_time_hours(distance_km: f64, speed_kmh: f64) -> f64 {
    if distance_km <= 0.0 || speed_kmh <= 0.0 {
        return 0.0;
    }
    distance_km / speed_kmh
}

/// Two-point polyline from the base to a property, for drawing a straight
/// route line on a map.
pub fn route_points(base: Coordinates, property: Coordinates) -> [Coordinates; 2] {
    [base, property]
}

/// Arithmetic midpoint of two coordinates, used to centre the route mini-map.
pub fn midpoint(a: Coordinates, b: Coordinates) -> Coordinates {
    Coordinates::new(
        (a.latitude + b.latitude) / 2.0,
        (a.longitude + b.longitude) / 2.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn distance_to_self_is_zero() {
        let base = BaseLocation::default();
        assert_eq!(base.distance_to(base.coordinates()), 0.0);
        assert_eq!(distance_km(-15.4, 28.3, -15.4, 28.3), 0.0);
    }

    #[test]
    fn chingola_to_lusaka_is_plausible() {
        // Lusaka sits roughly 340 km south of Chingola.
        let base = BaseLocation::default();
        let d = base.distance_to(Coordinates::new(-15.4167, 28.2833));
        assert!((300.0..380.0).contains(&d), "got {d}");
    }

    #[test]
    fn one_degree_of_latitude() {
        let d = distance_km(0.0, 0.0, 1.0, 0.0);
        let expected = EARTH_RADIUS_KM * std::f64::consts::PI / 180.0;
        assert!((d - expected).abs() < 0.5, "got {d}, expected {expected}");
    }

    #[test]
    fn travel_time_uses_road_speed() {
        assert_eq!(travel_time_hours(140.0, DEFAULT_ROAD_SPEED_KMH), 2.0);
        assert_eq!(travel_time_hours(0.0, DEFAULT_ROAD_SPEED_KMH), 0.0);
        assert_eq!(travel_time_hours(100.0, 0.0), 0.0);
    }

    #[test]
    fn route_runs_from_base_to_property() {
        let base = BaseLocation::default().coordinates();
        let site = Coordinates::new(-13.0, 28.0);
        let route = route_points(base, site);
        assert_eq!(route[0], base);
        assert_eq!(route[1], site);

        let mid = midpoint(base, site);
        assert!((mid.latitude - (-12.76665)).abs() < 1e-9);
        assert!((mid.longitude - 27.925).abs() < 1e-9);
    }

    #[test]
    fn region_bounds_flag_outsiders() {
        let zambia = RegionBounds::default();
        assert!(zambia.contains(BaseLocation::default().coordinates()));
        // Lat/lon swapped, a common data-entry slip.
        assert!(!zambia.contains(Coordinates::new(27.85, -12.5333)));
        assert!(!zambia.contains(Coordinates::new(-26.2, 28.0)));
    }

    proptest! {
        #[test]
        fn distance_is_symmetric_and_non_negative(
            lat1 in -18.0f64..-8.0,
            lon1 in 22.0f64..34.0,
            lat2 in -18.0f64..-8.0,
            lon2 in 22.0f64..34.0,
        ) {
            let ab = distance_km(lat1, lon1, lat2, lon2);
            let ba = distance_km(lat2, lon2, lat1, lon1);
            prop_assert!(ab >= 0.0);
            prop_assert!((ab - ba).abs() < 1e-9);
        }
    }
}
