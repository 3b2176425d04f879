//! Coordinate math module
//!
//! Provides the WGS-84 [`Coordinate`] type and the spherical-earth helpers
//! used by the exploration tracker (distance) and the overlay renderer
//! (destination points for reveal circles).

mod types;

pub use types::{CoordError, Coordinate, MAX_LAT, MAX_LON, MIN_LAT, MIN_LON};

/// Mean Earth radius in meters used for all great-circle math.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two coordinates using the haversine formula.
///
/// `d = 2·R·atan2(√a, √(1−a))` where
/// `a = sin²(Δlat/2) + cos(lat1)·cos(lat2)·sin²(Δlon/2)`.
///
/// # Returns
///
/// Distance in meters.
#[inline]
pub fn haversine_distance(from: &Coordinate, to: &Coordinate) -> f64 {
    let lat1 = from.latitude().to_radians();
    let lat2 = to.latitude().to_radians();
    let dlat = (to.latitude() - from.latitude()).to_radians();
    let dlon = (to.longitude() - from.longitude()).to_radians();

    let half_dlat = (dlat / 2.0).sin();
    let half_dlon = (dlon / 2.0).sin();
    let a = half_dlat * half_dlat + lat1.cos() * lat2.cos() * half_dlon * half_dlon;

    2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Projects a point `distance_m` meters away along `bearing_deg`.
///
/// Bearing is in degrees clockwise from true north. The resulting longitude
/// is normalized to -180..=180.
pub fn destination_point(origin: &Coordinate, bearing_deg: f64, distance_m: f64) -> Coordinate {
    let angular = distance_m / EARTH_RADIUS_M;
    let bearing = bearing_deg.to_radians();
    let lat1 = origin.latitude().to_radians();
    let lon1 = origin.longitude().to_radians();

    let lat2 = (lat1.sin() * angular.cos() + lat1.cos() * angular.sin() * bearing.cos()).asin();
    let lon2 = lon1
        + (bearing.sin() * angular.sin() * lat1.cos()).atan2(angular.cos() - lat1.sin() * lat2.sin());

    let mut lon_deg = lon2.to_degrees();
    if lon_deg > 180.0 {
        lon_deg -= 360.0;
    } else if lon_deg < -180.0 {
        lon_deg += 360.0;
    }

    Coordinate::new_unchecked(lat2.to_degrees(), lon_deg)
}

/// Finds the smallest distance from `target` to any coordinate in `points`.
///
/// Linear scan. Returns `None` when `points` is empty.
pub fn nearest_distance<'a, I>(target: &Coordinate, points: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a Coordinate>,
{
    points
        .into_iter()
        .map(|p| haversine_distance(target, p))
        .fold(None, |min, d| match min {
            Some(m) if m <= d => Some(m),
            _ => Some(d),
        })
}
