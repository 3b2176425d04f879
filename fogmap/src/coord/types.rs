//! Coordinate value types.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum valid latitude in degrees.
pub const MIN_LAT: f64 = -90.0;
/// Maximum valid latitude in degrees.
pub const MAX_LAT: f64 = 90.0;
/// Minimum valid longitude in degrees.
pub const MIN_LON: f64 = -180.0;
/// Maximum valid longitude in degrees.
pub const MAX_LON: f64 = 180.0;

/// Errors produced when constructing a coordinate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordError {
    #[error("Invalid latitude: {0} (must be within -90..=90)")]
    InvalidLatitude(f64),

    #[error("Invalid longitude: {0} (must be within -180..=180)")]
    InvalidLongitude(f64),
}

/// A WGS-84 position in degrees.
///
/// Immutable once produced; all arithmetic returns new values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

/// Wire shape, validated on the way in.
#[derive(Deserialize)]
struct RawCoordinate {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = CoordError;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Coordinate::new(raw.latitude, raw.longitude)
    }
}

impl Coordinate {
    /// Create a coordinate, validating both components.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordError> {
        if !latitude.is_finite() || !(MIN_LAT..=MAX_LAT).contains(&latitude) {
            return Err(CoordError::InvalidLatitude(latitude));
        }
        if !longitude.is_finite() || !(MIN_LON..=MAX_LON).contains(&longitude) {
            return Err(CoordError::InvalidLongitude(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Create a coordinate without validation.
    ///
    /// Intended for values that come from a trusted source such as the
    /// database or a platform location provider.
    pub const fn new_unchecked(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Latitude in degrees (positive = north).
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees (positive = east).
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_coordinate() {
        let c = Coordinate::new(22.3149, 87.3105).unwrap();
        assert_eq!(c.latitude(), 22.3149);
        assert_eq!(c.longitude(), 87.3105);
    }

    #[test]
    fn test_rejects_out_of_range_latitude() {
        assert_eq!(
            Coordinate::new(90.5, 0.0),
            Err(CoordError::InvalidLatitude(90.5))
        );
        assert!(Coordinate::new(-91.0, 0.0).is_err());
    }

    #[test]
    fn test_rejects_out_of_range_longitude() {
        assert_eq!(
            Coordinate::new(0.0, 180.1),
            Err(CoordError::InvalidLongitude(180.1))
        );
    }

    #[test]
    fn test_rejects_nan() {
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
        assert!(Coordinate::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_deserialize_validates() {
        let c: Coordinate =
            serde_json::from_str(r#"{"latitude":22.3149,"longitude":87.3105}"#).unwrap();
        assert_eq!(c, Coordinate::new(22.3149, 87.3105).unwrap());

        let err = serde_json::from_str::<Coordinate>(r#"{"latitude":123.0,"longitude":0.0}"#)
            .unwrap_err();
        assert!(err.to_string().contains("Invalid latitude"));
    }

    #[test]
    fn test_display_six_decimals() {
        let c = Coordinate::new_unchecked(1.5, -2.25);
        assert_eq!(c.to_string(), "(1.500000, -2.250000)");
    }
}
