pub mod catalog;
pub mod config;
pub mod distance;
pub mod error;
pub mod models;
pub mod recommend;

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    routing::get,
};
use shared::{ApiError, WalkRoutesPayload};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::catalog::Catalog;
use crate::config::DEFAULT_MAX_LIMIT;
use crate::models::WalkRoutesParams;
use crate::recommend::{DEFAULT_ORIGIN, recommend};

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub max_limit: usize,
}

impl AppState {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
            max_limit: DEFAULT_MAX_LIMIT,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/walk-routes", get(walk_routes_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Grade recommendation when a known grade is given, plain listing otherwise.
async fn walk_routes_handler(
    State(state): State<AppState>,
    query: Result<Query<WalkRoutesParams>, QueryRejection>,
) -> Result<Json<WalkRoutesPayload>, (StatusCode, Json<ApiError>)> {
    let Query(params) = query.map_err(bad_request)?;
    let limit = params.limit(state.max_limit);

    if let Some(grade) = params.grade() {
        let origin = params.origin().unwrap_or(DEFAULT_ORIGIN);
        let rec = recommend(&state.catalog, grade, origin, limit);
        tracing::debug!(grade = grade.as_str(), routes = rec.routes.len(), "recommended walk routes");
        return Ok(Json(WalkRoutesPayload::Recommended {
            recommendation_reason: rec.reason.to_string(),
            routes: rec.routes,
        }));
    }

    let routes = state.catalog.walk_routes(
        params.filter_type(),
        params.category(),
        params.origin(),
        limit,
    );
    tracing::debug!(routes = routes.len(), "listed walk routes");
    Ok(Json(WalkRoutesPayload::Plain(routes)))
}

fn bad_request(rejection: QueryRejection) -> (StatusCode, Json<ApiError>) {
    tracing::warn!(error = %rejection, "rejected walk route query");
    (
        StatusCode::BAD_REQUEST,
        Json(ApiError {
            message: rejection.body_text(),
        }),
    )
}
