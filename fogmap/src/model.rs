//! Core data types shared by the tracker, store and renderers.

use std::fmt;

use chrono::{DateTime, TimeZone, Utc};

use crate::coord::Coordinate;

/// A single position sample delivered by a fix source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fix {
    /// Where the sample was taken.
    pub coordinate: Coordinate,
    /// When the source produced the sample.
    pub timestamp: DateTime<Utc>,
}

impl Fix {
    /// Create a fix stamped with the current time.
    pub fn now(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            timestamp: Utc::now(),
        }
    }

    /// Create a fix with an explicit timestamp.
    pub fn at(coordinate: Coordinate, timestamp: DateTime<Utc>) -> Self {
        Self {
            coordinate,
            timestamp,
        }
    }
}

/// A point that has not been persisted yet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewPoint {
    pub coordinate: Coordinate,
    pub recorded_at: DateTime<Utc>,
}

impl NewPoint {
    pub fn new(coordinate: Coordinate, recorded_at: DateTime<Utc>) -> Self {
        Self {
            coordinate,
            recorded_at,
        }
    }
}

/// A persisted explored location.
///
/// Created once when a fix is classified as new territory and never updated.
/// The `id` is assigned by the store on insert.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExploredPoint {
    /// Surrogate id assigned by the store (monotonic).
    pub id: i64,
    pub coordinate: Coordinate,
    /// Creation time, truncated to millisecond precision.
    pub recorded_at: DateTime<Utc>,
}

impl ExploredPoint {
    /// Attach a store-assigned id to a new point.
    ///
    /// The timestamp is truncated to milliseconds so that in-memory values
    /// compare equal to what the store reads back.
    pub fn from_new(id: i64, point: NewPoint) -> Self {
        Self {
            id,
            coordinate: point.coordinate,
            recorded_at: from_millis(point.recorded_at.timestamp_millis()),
        }
    }

    /// Creation time as milliseconds since the Unix epoch.
    pub fn timestamp_ms(&self) -> i64 {
        self.recorded_at.timestamp_millis()
    }
}

impl fmt::Display for ExploredPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} @ {}",
            self.id,
            self.coordinate,
            self.recorded_at.format("%Y-%m-%d %H:%M:%S")
        )
    }
}

/// Convert milliseconds since the epoch into a UTC timestamp.
///
/// Out-of-range values clamp to the epoch.
pub fn from_millis(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .unwrap_or_default()
}

/// Geographic bounding box of a set of points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBounds {
    /// Minimum (southernmost) latitude
    pub min_lat: f64,
    /// Maximum (northernmost) latitude
    pub max_lat: f64,
    /// Minimum (westernmost) longitude
    pub min_lon: f64,
    /// Maximum (easternmost) longitude
    pub max_lon: f64,
}

impl GeoBounds {
    /// Create a bounding box from a single point.
    pub fn from_point(c: &Coordinate) -> Self {
        Self {
            min_lat: c.latitude(),
            max_lat: c.latitude(),
            min_lon: c.longitude(),
            max_lon: c.longitude(),
        }
    }

    /// Smallest box containing every coordinate, or `None` if there are none.
    pub fn from_coordinates<'a, I>(coords: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Coordinate>,
    {
        let mut iter = coords.into_iter();
        let mut bounds = Self::from_point(iter.next()?);
        for c in iter {
            bounds.expand(c);
        }
        Some(bounds)
    }

    /// Expand this bounding box to include a point.
    pub fn expand(&mut self, c: &Coordinate) {
        self.min_lat = self.min_lat.min(c.latitude());
        self.max_lat = self.max_lat.max(c.latitude());
        self.min_lon = self.min_lon.min(c.longitude());
        self.max_lon = self.max_lon.max(c.longitude());
    }

    /// Get the center point of the bounds.
    pub fn center(&self) -> Coordinate {
        Coordinate::new_unchecked(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        )
    }
}

/// What a renderer receives on every push.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    /// Last known position, if any fix has arrived yet.
    pub current: Option<Coordinate>,
    /// Full explored set in insertion order.
    pub explored: Vec<ExploredPoint>,
    /// Whether the view should re-center on `current`.
    pub recenter: bool,
}
