//! Field filters from query parameters, and their application to records.

use std::collections::HashMap;

use chrono::NaiveDate;
use thiserror::Error;

use crate::model::{MapVehicle, Vehicle};
use crate::viewport::Viewport;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("{param}: enter a valid date (YYYY-MM-DD), got {value:?}")]
    InvalidDate { param: &'static str, value: String },
}

/// Strict bounds and equality on one date field
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DateRange {
    pub lt: Option<NaiveDate>,
    pub gt: Option<NaiveDate>,
    pub exact: Option<NaiveDate>,
}

impl DateRange {
    pub fn is_unbounded(&self) -> bool {
        self.lt.is_none() && self.gt.is_none() && self.exact.is_none()
    }

    /// A missing date fails every bound but passes when there is none
    pub fn matches(&self, date: Option<NaiveDate>) -> bool {
        if self.is_unbounded() {
            return true;
        }
        let Some(date) = date else {
            return false;
        };

        self.lt.is_none_or(|bound| date < bound)
            && self.gt.is_none_or(|bound| date > bound)
            && self.exact.is_none_or(|value| date == value)
    }

    fn from_params(
        params: &HashMap<String, String>,
        [lt, gt, exact]: [&'static str; 3],
    ) -> Result<Self, FilterError> {
        Ok(DateRange {
            lt: date_param(params, lt)?,
            gt: date_param(params, gt)?,
            exact: date_param(params, exact)?,
        })
    }
}

/// Every supported field predicate; absent ones match all records
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VehicleFilter {
    pub creation_date: DateRange,
    pub completion_date: DateRange,
    /// Case-insensitive substring of the make
    pub vehicle_make_icontains: Option<String>,
    pub vehicle_color: Option<String>,
    pub status: Option<String>,
}

impl VehicleFilter {
    /// Parses the recognised `field__lookup` parameters
    ///
    /// Empty values and unknown parameters are ignored. A malformed date is
    /// the only error.
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, FilterError> {
        Ok(VehicleFilter {
            creation_date: DateRange::from_params(
                params,
                [
                    "creation_date__lt",
                    "creation_date__gt",
                    "creation_date__exact",
                ],
            )?,
            completion_date: DateRange::from_params(
                params,
                [
                    "completion_date__lt",
                    "completion_date__gt",
                    "completion_date__exact",
                ],
            )?,
            vehicle_make_icontains: text_param(params, "vehicle_make__icontains"),
            vehicle_color: text_param(params, "vehicle_color__exact"),
            status: text_param(params, "status__exact"),
        })
    }

    pub fn matches(&self, vehicle: &Vehicle) -> bool {
        self.creation_date.matches(Some(vehicle.creation_date))
            && self.completion_date.matches(vehicle.completion_date)
            && self.make_matches(vehicle.vehicle_make.as_deref())
            && exact_matches(self.vehicle_color.as_deref(), vehicle.vehicle_color.as_deref())
            && exact_matches(self.status.as_deref(), vehicle.status.as_deref())
    }

    fn make_matches(&self, make: Option<&str>) -> bool {
        match (&self.vehicle_make_icontains, make) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(needle), Some(make)) => make.to_lowercase().contains(&needle.to_lowercase()),
        }
    }
}

fn exact_matches(wanted: Option<&str>, value: Option<&str>) -> bool {
    wanted.is_none_or(|wanted| value == Some(wanted))
}

fn text_param(params: &HashMap<String, String>, key: &str) -> Option<String> {
    params.get(key).filter(|v| !v.is_empty()).cloned()
}

fn date_param(
    params: &HashMap<String, String>,
    key: &'static str,
) -> Result<Option<NaiveDate>, FilterError> {
    match params.get(key).map(|v| v.trim()).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| FilterError::InvalidDate {
                param: key,
                value: raw.to_string(),
            }),
    }
}

/// Records matching every field predicate, in store order
pub fn select<'a>(vehicles: &'a [Vehicle], filter: &VehicleFilter) -> Vec<&'a Vehicle> {
    vehicles.iter().filter(|v| filter.matches(v)).collect()
}

/// Records matching every field predicate whose location is set and covered
/// by the viewport, in store order
pub fn select_in_viewport(
    vehicles: &[Vehicle],
    filter: &VehicleFilter,
    viewport: &Viewport,
) -> Vec<MapVehicle> {
    vehicles
        .iter()
        .filter(|v| filter.matches(v))
        .filter_map(Vehicle::to_map_vehicle)
        .filter(|v| viewport.covers(&v.location))
        .collect()
}
