//! PostGIS queries for listing and viewport clustering.
//!
//! Every value that comes from a request (filter values, viewport bounds,
//! clustering radius, grid size) is passed as a bound `$n` parameter. The
//! filtered row set is built once as a sub-query and both clustering
//! strategies wrap it in a CTE, so filtering and clustering compose without
//! string formatting of user data.

use chrono::NaiveDate;

use crate::aggregate::Strategy;
use crate::filter::{DateRange, VehicleFilter};
use crate::viewport::Viewport;

pub const VEHICLE_TABLE: &str = "main_vehicle";

/// Columns carried from the filtered rows into the clusters
const MAP_COLUMNS: &str =
    "vehicle_make, vehicle_color, creation_date, completion_date, type_of_service_request, location";

const VEHICLE_COLUMNS: &str = "id, creation_date, status, completion_date, \
    service_request_number, type_of_service_request, license_plate, vehicle_make, \
    vehicle_color, current_activity, most_recent_action, days_parked, street_address, \
    zip_code, x_coordinate, y_coordinate, ward, police_district, community_area, ssa, \
    latitude, longitude, ST_X(location) AS lon, ST_Y(location) AS lat";

#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Float(f64),
    Int(i64),
    Date(NaiveDate),
    Text(String),
}

/// SQL text with its positional parameters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqlQuery {
    pub sql: String,
    pub params: Vec<SqlParam>,
}

impl SqlQuery {
    /// Registers a parameter and returns its placeholder
    fn bind(&mut self, param: SqlParam) -> String {
        self.params.push(param);
        format!("${}", self.params.len())
    }
}

/// `WHERE` conditions for the field predicates
fn field_conditions(filter: &VehicleFilter, query: &mut SqlQuery) -> Vec<String> {
    let mut conditions = Vec::new();

    date_conditions("creation_date", &filter.creation_date, query, &mut conditions);
    date_conditions("completion_date", &filter.completion_date, query, &mut conditions);

    if let Some(make) = &filter.vehicle_make_icontains {
        let p = query.bind(SqlParam::Text(like_pattern(make)));
        conditions.push(format!("UPPER(vehicle_make::text) LIKE UPPER({p})"));
    }
    if let Some(color) = &filter.vehicle_color {
        let p = query.bind(SqlParam::Text(color.clone()));
        conditions.push(format!("vehicle_color = {p}"));
    }
    if let Some(status) = &filter.status {
        let p = query.bind(SqlParam::Text(status.clone()));
        conditions.push(format!("status = {p}"));
    }

    conditions
}

fn date_conditions(
    column: &str,
    range: &DateRange,
    query: &mut SqlQuery,
    conditions: &mut Vec<String>,
) {
    for (op, value) in [("<", range.lt), (">", range.gt), ("=", range.exact)] {
        if let Some(date) = value {
            let p = query.bind(SqlParam::Date(date));
            conditions.push(format!("{column} {op} {p}"));
        }
    }
}

/// `%needle%` with LIKE wildcards in the needle escaped
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn where_clause(conditions: &[String]) -> String {
    if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    }
}

/// `SELECT count(*)` over the field-filtered table
pub fn count_query(filter: &VehicleFilter) -> SqlQuery {
    let mut query = SqlQuery::default();
    let conditions = field_conditions(filter, &mut query);
    query.sql = format!("SELECT count(*) FROM {VEHICLE_TABLE}{}", where_clause(&conditions));
    query
}

/// One page of full records, ordered by id
pub fn list_query(filter: &VehicleFilter, limit: usize, offset: usize) -> SqlQuery {
    let mut query = SqlQuery::default();
    let conditions = field_conditions(filter, &mut query);
    let limit = query.bind(SqlParam::Int(i64::try_from(limit).unwrap_or(i64::MAX)));
    let offset = query.bind(SqlParam::Int(i64::try_from(offset).unwrap_or(i64::MAX)));
    query.sql = format!(
        "SELECT {VEHICLE_COLUMNS} FROM {VEHICLE_TABLE}{} ORDER BY id LIMIT {limit} OFFSET {offset}",
        where_clause(&conditions)
    );
    query
}

/// Located, field-filtered rows covered by the viewport envelope
pub fn filtered_subquery(filter: &VehicleFilter, viewport: &Viewport) -> SqlQuery {
    let mut query = SqlQuery::default();
    let bbox = &viewport.bbox;
    let min_lon = query.bind(SqlParam::Float(bbox.min_lon));
    let min_lat = query.bind(SqlParam::Float(bbox.min_lat));
    let max_lon = query.bind(SqlParam::Float(bbox.max_lon));
    let max_lat = query.bind(SqlParam::Float(bbox.max_lat));

    let mut conditions = vec![
        "location IS NOT NULL".to_string(),
        format!("ST_CoveredBy(location, ST_MakeEnvelope({min_lon}, {min_lat}, {max_lon}, {max_lat}, 4326))"),
    ];
    conditions.extend(field_conditions(filter, &mut query));

    query.sql = format!(
        "SELECT id, {MAP_COLUMNS} FROM {VEHICLE_TABLE}{}",
        where_clause(&conditions)
    );
    query
}

/// Reduced records for client-side clustering
pub fn map_points_query(filter: &VehicleFilter, viewport: &Viewport) -> SqlQuery {
    let mut query = filtered_subquery(filter, viewport);
    query.sql = format!(
        "SELECT vehicle_make, vehicle_color, creation_date, completion_date, \
         type_of_service_request, ST_X(location) AS lon, ST_Y(location) AS lat \
         FROM ({}) filtered ORDER BY id",
        query.sql
    );
    query
}

/// Viewport clusters of the filtered rows
///
/// Rows: `cluster, vehicles_count, lon, lat` and the five attribute columns,
/// which are `NULL` unless the cluster has a single member.
pub fn cluster_query(filter: &VehicleFilter, viewport: &Viewport, strategy: Strategy) -> SqlQuery {
    let mut query = filtered_subquery(filter, viewport);
    let filtered = std::mem::take(&mut query.sql);

    let clustered = match strategy {
        Strategy::Exact => {
            let eps = query.bind(SqlParam::Float(viewport.max_distance_between_objects));
            format!(
                "clustered AS (
    SELECT ST_ClusterDBSCAN(location, {eps}, 1) OVER () AS cluster, *
    FROM filtered
)"
            )
        }
        Strategy::Grid => {
            let cell = query.bind(SqlParam::Float(viewport.grid_cell_size));
            let eps = query.bind(SqlParam::Float(viewport.max_distance_between_objects));
            format!(
                "snapped AS (
    SELECT ST_SnapToGrid(location, {cell}) AS grid_location, *
    FROM filtered
),
cells AS (
    SELECT grid_location,
           ST_ClusterDBSCAN(grid_location, {eps}, 1) OVER () AS cluster
    FROM (SELECT DISTINCT grid_location FROM snapped) grid_points
),
clustered AS (
    SELECT snapped.*, cells.cluster
    FROM snapped
    INNER JOIN cells ON cells.grid_location = snapped.grid_location
)"
            )
        }
    };

    query.sql = format!(
        "WITH filtered AS (
    {filtered}
),
{clustered},
totals AS (
    SELECT cluster,
           count(*) AS vehicles_count,
           avg(ST_X(location)) AS lon,
           avg(ST_Y(location)) AS lat
    FROM clustered
    GROUP BY cluster
),
firsts AS (
    SELECT DISTINCT ON (cluster) cluster, vehicle_make, vehicle_color, creation_date,
           completion_date, type_of_service_request
    FROM clustered
    ORDER BY cluster, id
)
SELECT totals.cluster,
       totals.vehicles_count,
       totals.lon,
       totals.lat,
       CASE WHEN totals.vehicles_count = 1 THEN firsts.vehicle_make END AS vehicle_make,
       CASE WHEN totals.vehicles_count = 1 THEN firsts.vehicle_color END AS vehicle_color,
       CASE WHEN totals.vehicles_count = 1 THEN firsts.creation_date END AS creation_date,
       CASE WHEN totals.vehicles_count = 1 THEN firsts.completion_date END AS completion_date,
       CASE WHEN totals.vehicles_count = 1 THEN firsts.type_of_service_request END AS type_of_service_request
FROM totals
INNER JOIN firsts ON firsts.cluster = totals.cluster
ORDER BY totals.cluster"
    );
    query
}
