use axum::{
    extract::State,
    response::IntoResponse,
    routing::get,
    Router,
};

use super::common::{map_service_error, success_response};
use crate::auth::AuthenticatedUser;
use crate::errors::{ApiError, ErrorResponse};
use crate::services::stats::{AgendaStats, InventoryStats};
use crate::AppState;

/// Inventory dashboard counters
#[utoipa::path(
    get,
    path = "/api/v1/stats/inventory",
    responses(
        (status = 200, description = "Inventory counters", body = InventoryStats),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "stats"
)]
pub async fn inventory_stats(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let stats = state
        .services
        .stats
        .inventory_stats(user.user_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(stats))
}

/// Contact book counters
#[utoipa::path(
    get,
    path = "/api/v1/stats/agenda",
    responses(
        (status = 200, description = "Agenda counters", body = AgendaStats),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "stats"
)]
pub async fn agenda_stats(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let stats = state
        .services
        .stats
        .agenda_stats(user.user_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(stats))
}

pub fn stats_routes() -> Router<AppState> {
    Router::new()
        .route("/inventory", get(inventory_stats))
        .route("/agenda", get(agenda_stats))
}
