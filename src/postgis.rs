//! PostGIS-backed record store.

use chrono::NaiveDate;
use sqlx::{
    FromRow, PgPool, Postgres,
    postgres::{PgArguments, PgPoolOptions},
    query::QueryAs,
};
use tracing::{debug, info};

use crate::aggregate::Strategy;
use crate::cluster::Point;
use crate::filter::VehicleFilter;
use crate::model::{MapCluster, MapVehicle, Page, Vehicle};
use crate::sql::{SqlParam, cluster_query, count_query, list_query, map_points_query};
use crate::store::PageRequest;
use crate::viewport::Viewport;

pub struct PgStore {
    pool: PgPool,
}

#[derive(FromRow)]
struct VehicleRow {
    id: i64,
    creation_date: NaiveDate,
    status: Option<String>,
    completion_date: Option<NaiveDate>,
    service_request_number: String,
    type_of_service_request: String,
    license_plate: Option<String>,
    vehicle_make: Option<String>,
    vehicle_color: Option<String>,
    current_activity: Option<String>,
    most_recent_action: Option<String>,
    days_parked: Option<i64>,
    street_address: Option<String>,
    zip_code: Option<String>,
    x_coordinate: Option<f64>,
    y_coordinate: Option<f64>,
    ward: Option<i32>,
    police_district: Option<i32>,
    community_area: Option<i32>,
    ssa: Option<i32>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    lon: Option<f64>,
    lat: Option<f64>,
}

#[derive(FromRow)]
struct MapVehicleRow {
    vehicle_make: Option<String>,
    vehicle_color: Option<String>,
    creation_date: NaiveDate,
    completion_date: Option<NaiveDate>,
    type_of_service_request: String,
    lon: f64,
    lat: f64,
}

#[derive(FromRow)]
struct ClusterRow {
    cluster: i32,
    vehicles_count: i64,
    lon: f64,
    lat: f64,
    vehicle_make: Option<String>,
    vehicle_color: Option<String>,
    creation_date: Option<NaiveDate>,
    completion_date: Option<NaiveDate>,
    type_of_service_request: Option<String>,
}

impl PgStore {
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new().max_connections(10).connect(url).await?;
        info!("Connected to PostGIS");
        Ok(Self { pool })
    }

    pub async fn list(
        &self,
        filter: &VehicleFilter,
        page: PageRequest,
    ) -> Result<Page<Vehicle>, sqlx::Error> {
        let count = count_query(filter);
        let (total,): (i64,) = bind_all(sqlx::query_as(&count.sql), &count.params)
            .fetch_one(&self.pool)
            .await?;

        let list = list_query(filter, page.limit, page.offset);
        let rows: Vec<VehicleRow> = bind_all(sqlx::query_as(&list.sql), &list.params)
            .fetch_all(&self.pool)
            .await?;

        Ok(Page {
            count: total.max(0) as usize,
            results: rows.into_iter().map(VehicleRow::into_vehicle).collect(),
        })
    }

    pub async fn map_points(
        &self,
        filter: &VehicleFilter,
        viewport: &Viewport,
    ) -> Result<Vec<MapVehicle>, sqlx::Error> {
        let query = map_points_query(filter, viewport);
        let rows: Vec<MapVehicleRow> = bind_all(sqlx::query_as(&query.sql), &query.params)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| MapVehicle {
                vehicle_make: row.vehicle_make,
                vehicle_color: row.vehicle_color,
                creation_date: row.creation_date,
                completion_date: row.completion_date,
                type_of_service_request: row.type_of_service_request,
                location: Point::new(row.lon, row.lat),
            })
            .collect())
    }

    pub async fn clusters(
        &self,
        filter: &VehicleFilter,
        viewport: &Viewport,
        strategy: Strategy,
    ) -> Result<Vec<MapCluster>, sqlx::Error> {
        let query = cluster_query(filter, viewport, strategy);
        debug!(
            strategy = strategy.as_str(),
            params = query.params.len(),
            "Running cluster query"
        );
        let rows: Vec<ClusterRow> = bind_all(sqlx::query_as(&query.sql), &query.params)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| MapCluster {
                cluster: row.cluster as i64,
                vehicles_count: row.vehicles_count.max(0) as usize,
                vehicle_make: row.vehicle_make,
                vehicle_color: row.vehicle_color,
                creation_date: row.creation_date,
                completion_date: row.completion_date,
                type_of_service_request: row.type_of_service_request,
                location: Point::new(row.lon, row.lat),
            })
            .collect())
    }
}

impl VehicleRow {
    fn into_vehicle(self) -> Vehicle {
        Vehicle {
            id: self.id,
            creation_date: self.creation_date,
            status: self.status,
            completion_date: self.completion_date,
            service_request_number: self.service_request_number,
            type_of_service_request: self.type_of_service_request,
            license_plate: self.license_plate,
            vehicle_make: self.vehicle_make,
            vehicle_color: self.vehicle_color,
            current_activity: self.current_activity,
            most_recent_action: self.most_recent_action,
            days_parked: self.days_parked,
            street_address: self.street_address,
            zip_code: self.zip_code,
            x_coordinate: self.x_coordinate,
            y_coordinate: self.y_coordinate,
            ward: self.ward,
            police_district: self.police_district,
            community_area: self.community_area,
            ssa: self.ssa,
            latitude: self.latitude,
            longitude: self.longitude,
            location: match (self.lon, self.lat) {
                (Some(lon), Some(lat)) => Some(Point::new(lon, lat)),
                _ => None,
            },
        }
    }
}

fn bind_all<'q, O>(
    mut query: QueryAs<'q, Postgres, O, PgArguments>,
    params: &[SqlParam],
) -> QueryAs<'q, Postgres, O, PgArguments> {
    for param in params {
        query = match param {
            SqlParam::Float(v) => query.bind(*v),
            SqlParam::Int(v) => query.bind(*v),
            SqlParam::Date(v) => query.bind(*v),
            SqlParam::Text(v) => query.bind(v.clone()),
        };
    }
    query
}
