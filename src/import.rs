//! Loads the city's abandoned-vehicle CSV export.
//!
//! The export is downloaded from the Chicago Data Portal
//! (<https://data.cityofchicago.org/api/views/3c9v-pnva/rows.csv?accessType=DOWNLOAD>)
//! and read once at startup.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::ReaderBuilder;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::cluster::Point;
use crate::model::Vehicle;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// One row of the export, as named in its header
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CsvRow {
    #[serde(rename = "Creation Date")]
    creation_date: String,
    #[serde(rename = "Status")]
    status: Option<String>,
    #[serde(rename = "Completion Date")]
    completion_date: Option<String>,
    #[serde(rename = "Service Request Number")]
    service_request_number: String,
    #[serde(rename = "Type of Service Request")]
    type_of_service_request: String,
    #[serde(rename = "License Plate")]
    license_plate: Option<String>,
    #[serde(rename = "Vehicle Make/Model")]
    vehicle_make: Option<String>,
    #[serde(rename = "Vehicle Color")]
    vehicle_color: Option<String>,
    #[serde(rename = "Current Activity")]
    current_activity: Option<String>,
    #[serde(rename = "Most Recent Action")]
    most_recent_action: Option<String>,
    #[serde(
        rename = "How Many Days Has the Vehicle Been Reported as Parked?",
        deserialize_with = "csv::invalid_option"
    )]
    days_parked: Option<f64>,
    #[serde(rename = "Street Address")]
    street_address: Option<String>,
    #[serde(rename = "ZIP Code")]
    zip_code: Option<String>,
    #[serde(rename = "X Coordinate", deserialize_with = "csv::invalid_option")]
    x_coordinate: Option<f64>,
    #[serde(rename = "Y Coordinate", deserialize_with = "csv::invalid_option")]
    y_coordinate: Option<f64>,
    #[serde(rename = "Ward", deserialize_with = "csv::invalid_option")]
    ward: Option<f64>,
    #[serde(rename = "Police District", deserialize_with = "csv::invalid_option")]
    police_district: Option<f64>,
    #[serde(rename = "Community Area", deserialize_with = "csv::invalid_option")]
    community_area: Option<f64>,
    #[serde(rename = "SSA", deserialize_with = "csv::invalid_option")]
    ssa: Option<f64>,
    #[serde(rename = "Latitude", deserialize_with = "csv::invalid_option")]
    latitude: Option<f64>,
    #[serde(rename = "Longitude", deserialize_with = "csv::invalid_option")]
    longitude: Option<f64>,
    #[serde(rename = "Location")]
    location: Option<String>,
}

/// Reads and converts every usable row of an export file
pub fn load_vehicles(path: &Path) -> Result<Vec<Vehicle>, ImportError> {
    let file = File::open(path).map_err(|source| ImportError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Loading vehicles from {}", path.display());
    read_vehicles(file)
}

/// Reads vehicles from CSV with a header row
///
/// Rows that do not deserialize or lack a valid creation date are skipped
/// with a warning; I/O failures abort the import. Ids are assigned in file
/// order starting from 1.
pub fn read_vehicles<R: Read>(reader: R) -> Result<Vec<Vehicle>, ImportError> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(reader);

    let mut vehicles = Vec::new();
    let mut skipped = 0usize;

    for (line, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = match result {
            Ok(row) => row,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                warn!("Skipping row {}: {e}", line + 2);
                skipped += 1;
                continue;
            }
        };

        match row.into_vehicle(vehicles.len() as i64 + 1) {
            Some(vehicle) => vehicles.push(vehicle),
            None => {
                warn!("Skipping row {}: missing or invalid creation date", line + 2);
                skipped += 1;
            }
        }
    }

    let located = vehicles.iter().filter(|v| v.location.is_some()).count();
    info!(
        loaded = vehicles.len(),
        located, skipped, "Finished reading vehicles"
    );
    Ok(vehicles)
}

impl CsvRow {
    fn into_vehicle(self, id: i64) -> Option<Vehicle> {
        let creation_date = parse_date(&self.creation_date)?;

        // The export fills `Location` only for geocoded requests
        let location = match (non_empty(self.location), self.longitude, self.latitude) {
            (Some(_), Some(lon), Some(lat)) if lon.is_finite() && lat.is_finite() => {
                Some(Point::new(lon, lat))
            }
            _ => None,
        };

        Some(Vehicle {
            id,
            creation_date,
            status: non_empty(self.status),
            completion_date: self.completion_date.as_deref().and_then(parse_date),
            service_request_number: self.service_request_number,
            type_of_service_request: self.type_of_service_request,
            license_plate: non_empty(self.license_plate),
            vehicle_make: non_empty(self.vehicle_make),
            vehicle_color: non_empty(self.vehicle_color),
            current_activity: non_empty(self.current_activity),
            most_recent_action: non_empty(self.most_recent_action),
            days_parked: self.days_parked.map(|d| d as i64),
            street_address: non_empty(self.street_address),
            zip_code: non_empty(self.zip_code),
            x_coordinate: self.x_coordinate,
            y_coordinate: self.y_coordinate,
            ward: self.ward.map(|v| v as i32),
            police_district: self.police_district.map(|v| v as i32),
            community_area: self.community_area.map(|v| v as i32),
            ssa: self.ssa.map(|v| v as i32),
            latitude: self.latitude,
            longitude: self.longitude,
            location,
        })
    }
}

/// Export dates are `MM/DD/YYYY`
fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%m/%d/%Y").ok()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
