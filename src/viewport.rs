//! Map viewport: the bounding polygon of the visible map area and the two
//! scale-dependent clustering parameters derived from it.

use std::collections::HashMap;

use geo::{Area, Coord, Intersects, LineString, Polygon};
use serde::Serialize;

use crate::cluster::Point;

/// Visible map area as sent by the client
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Latitude ±90, longitude ±180
    pub const WORLD: BoundingBox = BoundingBox {
        min_lat: -90.0,
        max_lat: 90.0,
        min_lon: -180.0,
        max_lon: 180.0,
    };

    /// The historical default of the public API, with latitude and longitude
    /// ranges swapped
    pub const LEGACY: BoundingBox = BoundingBox {
        min_lat: -180.0,
        max_lat: 180.0,
        min_lon: -90.0,
        max_lon: 90.0,
    };

    /// Reads `min_lat`, `max_lat`, `min_lon` and `max_lon` from query parameters
    ///
    /// Never fails: every missing, unparseable or non-finite value silently
    /// takes the matching side of `defaults`.
    pub fn from_params(params: &HashMap<String, String>, defaults: &BoundingBox) -> Self {
        let read = |key: &str, default: f64| {
            params
                .get(key)
                .and_then(|raw| raw.trim().parse::<f64>().ok())
                .filter(|v| v.is_finite())
                .unwrap_or(default)
        };

        BoundingBox {
            min_lat: read("min_lat", defaults.min_lat),
            max_lat: read("max_lat", defaults.max_lat),
            min_lon: read("min_lon", defaults.min_lon),
            max_lon: read("max_lon", defaults.max_lon),
        }
    }

    /// South-west corner, as given (not normalised for inverted boxes)
    pub fn min_corner(&self) -> Point {
        Point::new(self.min_lon, self.min_lat)
    }

    /// North-east corner, as given
    pub fn max_corner(&self) -> Point {
        Point::new(self.max_lon, self.max_lat)
    }
}

/// Scaling constants for viewport-derived clustering parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportSettings {
    /// How many clusters fit along the viewport diagonal
    pub max_objects_in_line: f64,
    /// How many grid cells fit along the viewport diagonal
    pub grid_cell_count: f64,
    /// Extent used for any bound the client leaves out
    pub default_bbox: BoundingBox,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            max_objects_in_line: 8.0,
            grid_cell_count: 500.0,
            default_bbox: BoundingBox::WORLD,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Viewport {
    pub bbox: BoundingBox,
    /// Closed ring `(min_lon,min_lat) (min_lon,max_lat) (max_lon,max_lat) (max_lon,min_lat) (min_lon,min_lat)`
    pub polygon: Polygon<f64>,
    /// DBSCAN neighbourhood radius, in degrees
    pub max_distance_between_objects: f64,
    /// Snapping step of the grid-approximate aggregator, in degrees
    pub grid_cell_size: f64,
    empty: bool,
}

impl Viewport {
    /// Builds the viewport polygon and derives both clustering scalars
    ///
    /// Inverted boxes (`min > max`) still describe the rectangle between the
    /// two corners. Zero-area boxes yield a viewport that covers nothing.
    pub fn resolve(bbox: BoundingBox, settings: &ViewportSettings) -> Self {
        let ring = LineString::from(vec![
            (bbox.min_lon, bbox.min_lat),
            (bbox.min_lon, bbox.max_lat),
            (bbox.max_lon, bbox.max_lat),
            (bbox.max_lon, bbox.min_lat),
            (bbox.min_lon, bbox.min_lat),
        ]);
        let polygon = Polygon::new(ring, Vec::new());
        let empty = polygon.unsigned_area() == 0.0;

        let diagonal = corner_distance(&bbox);

        Viewport {
            bbox,
            polygon,
            max_distance_between_objects: diagonal / settings.max_objects_in_line,
            grid_cell_size: diagonal / settings.grid_cell_count,
            empty,
        }
    }

    /// Planar corner-to-corner distance, in degrees
    pub fn diagonal(&self) -> f64 {
        corner_distance(&self.bbox)
    }

    /// True for zero-area boxes, which cover no point at all
    pub fn is_empty(&self) -> bool {
        self.empty
    }

    /// Closed containment: points on the polygon boundary are covered
    pub fn covers(&self, point: &Point) -> bool {
        !self.is_empty()
            && self.polygon.intersects(&Coord {
                x: point.lon(),
                y: point.lat(),
            })
    }
}

fn corner_distance(bbox: &BoundingBox) -> f64 {
    bbox.max_corner().dist(&bbox.min_corner())
}
