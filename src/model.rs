//! Vehicle records and the shapes the API returns for them.

use chrono::NaiveDate;
use serde::Serialize;

use crate::cluster::Point;

/// One abandoned-vehicle service request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Vehicle {
    #[serde(skip_serializing)]
    pub id: i64,
    pub creation_date: NaiveDate,
    pub status: Option<String>,
    pub completion_date: Option<NaiveDate>,
    pub service_request_number: String,
    pub type_of_service_request: String,
    pub license_plate: Option<String>,
    pub vehicle_make: Option<String>,
    pub vehicle_color: Option<String>,
    pub current_activity: Option<String>,
    pub most_recent_action: Option<String>,
    pub days_parked: Option<i64>,
    pub street_address: Option<String>,
    pub zip_code: Option<String>,
    pub x_coordinate: Option<f64>,
    pub y_coordinate: Option<f64>,
    pub ward: Option<i32>,
    pub police_district: Option<i32>,
    pub community_area: Option<i32>,
    pub ssa: Option<i32>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(serialize_with = "geojson::serialize_opt")]
    pub location: Option<Point>,
}

impl Vehicle {
    /// Reduced form shipped to map clients, `None` when the record has no location
    pub fn to_map_vehicle(&self) -> Option<MapVehicle> {
        Some(MapVehicle {
            vehicle_make: self.vehicle_make.clone(),
            vehicle_color: self.vehicle_color.clone(),
            creation_date: self.creation_date,
            completion_date: self.completion_date,
            type_of_service_request: self.type_of_service_request.clone(),
            location: self.location?,
        })
    }
}

/// A located record with the attribute set used for map rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapVehicle {
    pub vehicle_make: Option<String>,
    pub vehicle_color: Option<String>,
    pub creation_date: NaiveDate,
    pub completion_date: Option<NaiveDate>,
    pub type_of_service_request: String,
    #[serde(serialize_with = "geojson::serialize")]
    pub location: Point,
}

/// A group of nearby vehicles, drawn as one marker
///
/// Attribute fields are only filled in when the cluster holds exactly one
/// vehicle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapCluster {
    pub cluster: i64,
    pub vehicles_count: usize,
    pub vehicle_make: Option<String>,
    pub vehicle_color: Option<String>,
    pub creation_date: Option<NaiveDate>,
    pub completion_date: Option<NaiveDate>,
    pub type_of_service_request: Option<String>,
    #[serde(serialize_with = "geojson::serialize")]
    pub location: Point,
}

impl MapCluster {
    pub fn single(cluster: i64, vehicle: &MapVehicle) -> Self {
        MapCluster {
            cluster,
            vehicles_count: 1,
            vehicle_make: vehicle.vehicle_make.clone(),
            vehicle_color: vehicle.vehicle_color.clone(),
            creation_date: Some(vehicle.creation_date),
            completion_date: vehicle.completion_date,
            type_of_service_request: Some(vehicle.type_of_service_request.clone()),
            location: vehicle.location,
        }
    }

    pub fn group(cluster: i64, vehicles_count: usize, centroid: Point) -> Self {
        MapCluster {
            cluster,
            vehicles_count,
            vehicle_make: None,
            vehicle_color: None,
            creation_date: None,
            completion_date: None,
            type_of_service_request: None,
            location: centroid,
        }
    }
}

/// One page of a limit/offset listing
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Total number of matching records, ignoring pagination
    pub count: usize,
    pub results: Vec<T>,
}

/// GeoJSON encoding of [`Point`]
mod geojson {
    use serde::{Serialize, Serializer};

    use crate::cluster::Point;

    #[derive(Serialize)]
    struct GeoJsonPoint {
        #[serde(rename = "type")]
        kind: &'static str,
        coordinates: [f64; 2],
    }

    pub fn serialize<S: Serializer>(point: &Point, serializer: S) -> Result<S::Ok, S::Error> {
        GeoJsonPoint {
            kind: "Point",
            coordinates: point.0,
        }
        .serialize(serializer)
    }

    pub fn serialize_opt<S: Serializer>(
        point: &Option<Point>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match point {
            Some(point) => serialize(point, serializer),
            None => serializer.serialize_none(),
        }
    }
}
