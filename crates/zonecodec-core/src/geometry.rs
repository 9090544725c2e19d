//! Geometry values decoded from the binary geometry stream.
//!
//! The shapefile family stores multi-ring shapes as one flat point array
//! plus a list of ring start indices. The decoder expands that encoding
//! into distinct `Ring`s, so consumers never see part indices.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single x/y coordinate pair. For NWS zone data x is longitude and
/// y is latitude, both in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
}

impl Coord {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An ordered sequence of coordinates forming one contour of a polygon or
/// polyline. Order is geometric order and is significant.
pub type Ring = Vec<Coord>;

/// Axis-aligned bounding box carried by PolyLine and Polygon records.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

/// A decoded shape record.
///
/// `Unknown` is not an error: shape type codes this decoder does not
/// handle pass through with their raw code so the batch layer can count
/// them as processed without aborting the stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Geometry {
    Null,
    Point {
        x: f64,
        y: f64,
    },
    #[serde(rename = "polyline")]
    PolyLine {
        bbox: BoundingBox,
        rings: Vec<Ring>,
    },
    Polygon {
        bbox: BoundingBox,
        rings: Vec<Ring>,
    },
    Unknown {
        shape_type: i32,
    },
}

impl Geometry {
    /// The rings of this shape. Null, Point, and Unknown shapes have none.
    pub fn rings(&self) -> &[Ring] {
        match self {
            Geometry::PolyLine { rings, .. } | Geometry::Polygon { rings, .. } => rings,
            _ => &[],
        }
    }

    /// Total point count across all rings.
    pub fn point_count(&self) -> usize {
        self.rings().iter().map(Vec::len).sum()
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Geometry::Null)
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Geometry::Null => write!(f, "null"),
            Geometry::Point { x, y } => write!(f, "point({x}, {y})"),
            Geometry::PolyLine { rings, .. } => {
                write!(f, "polyline({} rings, {} points)", rings.len(), self.point_count())
            }
            Geometry::Polygon { rings, .. } => {
                write!(f, "polygon({} rings, {} points)", rings.len(), self.point_count())
            }
            Geometry::Unknown { shape_type } => write!(f, "unknown(type {shape_type})"),
        }
    }
}
