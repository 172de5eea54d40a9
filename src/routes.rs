use std::{collections::HashMap, sync::Arc};

use axum::{
    Json,
    extract::{Query, State as AxumState},
    http::{StatusCode, Uri},
    response::IntoResponse,
};
use serde::Serialize;
use tracing::debug;

use crate::{
    aggregate::Strategy,
    error::AppError,
    filter::VehicleFilter,
    model::{MapCluster, MapVehicle, Vehicle},
    state::State,
    store::PageRequest,
    viewport::{BoundingBox, Viewport},
};

type Params = Query<HashMap<String, String>>;

#[derive(Serialize)]
pub struct PaginatedResponse {
    count: usize,
    next: Option<String>,
    previous: Option<String>,
    results: Vec<Vehicle>,
}

/// Paginated listing of every record matching the field filters
pub async fn vehicles_handler(
    AxumState(state): AxumState<Arc<State>>,
    Query(params): Params,
    uri: Uri,
) -> Result<Json<PaginatedResponse>, AppError> {
    let filter = VehicleFilter::from_params(&params)?;
    let page = page_request(&params, state.config.page_size);

    let result = state.store.list(&filter, page).await?;

    Ok(Json(PaginatedResponse {
        next: (page.offset.saturating_add(page.limit) < result.count)
            .then(|| page_link(&uri, page.limit, page.offset + page.limit)),
        previous: (page.offset > 0)
            .then(|| page_link(&uri, page.limit, page.offset.saturating_sub(page.limit))),
        count: result.count,
        results: result.results,
    }))
}

/// Every filtered record in the viewport, for clustering in the browser
pub async fn js_clustering_handler(
    AxumState(state): AxumState<Arc<State>>,
    Query(params): Params,
) -> Result<Json<Vec<MapVehicle>>, AppError> {
    let filter = VehicleFilter::from_params(&params)?;
    let viewport = resolve_viewport(&state, &params);

    let points = state.store.map_points(&filter, &viewport).await?;
    debug!(points = points.len(), "Serving raw map points");

    Ok(Json(points))
}

/// Exact server-side clusters, for small filtered sets
pub async fn map_handler(
    AxumState(state): AxumState<Arc<State>>,
    Query(params): Params,
) -> Result<Json<Vec<MapCluster>>, AppError> {
    clusters(&state, &params, Strategy::Exact).await
}

/// Grid-approximate server-side clusters, for large filtered sets
pub async fn map_fast_handler(
    AxumState(state): AxumState<Arc<State>>,
    Query(params): Params,
) -> Result<Json<Vec<MapCluster>>, AppError> {
    clusters(&state, &params, Strategy::Grid).await
}

pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

async fn clusters(
    state: &State,
    params: &HashMap<String, String>,
    strategy: Strategy,
) -> Result<Json<Vec<MapCluster>>, AppError> {
    let filter = VehicleFilter::from_params(params)?;
    let viewport = resolve_viewport(state, params);

    let clusters = state.store.clusters(&filter, &viewport, strategy).await?;
    Ok(Json(clusters))
}

fn resolve_viewport(state: &State, params: &HashMap<String, String>) -> Viewport {
    let settings = &state.config.viewport;
    let bbox = BoundingBox::from_params(params, &settings.default_bbox);
    let viewport = Viewport::resolve(bbox, settings);

    debug!(
        ?bbox,
        diagonal = viewport.diagonal(),
        max_distance = viewport.max_distance_between_objects,
        grid_cell_size = viewport.grid_cell_size,
        "Resolved viewport"
    );
    viewport
}

/// Largest `limit` or `offset` any backend accepts (`BIGINT` in SQL)
const MAX_PAGE_WINDOW: u64 = i64::MAX as u64;

/// Invalid or missing `limit`/`offset` fall back to the page size and zero;
/// larger values are capped at [`MAX_PAGE_WINDOW`]
fn page_request(params: &HashMap<String, String>, page_size: usize) -> PageRequest {
    let read = |key: &str| {
        params
            .get(key)
            .and_then(|v| v.parse::<u64>().ok())
            .map(|v| usize::try_from(v.min(MAX_PAGE_WINDOW)).unwrap_or(usize::MAX))
    };
    let limit = read("limit").filter(|&v| v > 0).unwrap_or(page_size);
    let offset = read("offset").unwrap_or(0);

    PageRequest { limit, offset }
}

/// The request path and query with `limit` and `offset` replaced
fn page_link(uri: &Uri, limit: usize, offset: usize) -> String {
    let mut parts: Vec<String> = uri
        .query()
        .unwrap_or_default()
        .split('&')
        .filter(|part| {
            !part.is_empty() && !part.starts_with("limit=") && !part.starts_with("offset=")
        })
        .map(str::to_string)
        .collect();
    parts.push(format!("limit={limit}"));
    if offset > 0 {
        parts.push(format!("offset={offset}"));
    }

    format!("{}?{}", uri.path(), parts.join("&"))
}
