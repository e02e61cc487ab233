use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{delete, get, patch, post},
    Router,
};

use super::common::{
    created_response, entity_envelope, map_service_error, no_content_response, success_response,
    validate_input, ListQuery,
};
use crate::auth::AuthenticatedUser;
use crate::entities::supplier;
use crate::errors::{ApiError, ErrorResponse, ServiceError};
use crate::pagination::paginated_envelope;
use crate::services::suppliers::{CreateSupplierRequest, UpdateSupplierRequest};
use crate::AppState;

/// List suppliers with pagination, search and sorting
#[utoipa::path(
    get,
    path = "/api/v1/suppliers",
    params(ListQuery),
    responses(
        (status = 200, description = "Paginated supplier list"),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "suppliers"
)]
pub async fn list_suppliers(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let options = query.into_options();
    let (items, meta) = state
        .services
        .suppliers
        .list_suppliers(user.user_id, &options)
        .await
        .map_err(map_service_error)?;

    let body = paginated_envelope("suppliers", &items, &meta)
        .map_err(ServiceError::from)
        .map_err(map_service_error)?;
    Ok(success_response(body))
}

/// Get a single supplier
#[utoipa::path(
    get,
    path = "/api/v1/suppliers/{id}",
    params(("id" = i32, Path, description = "Supplier id")),
    responses(
        (status = 200, description = "The supplier", body = supplier::Model),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "suppliers"
)]
pub async fn get_supplier(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let found = state
        .services
        .suppliers
        .get_supplier(user.user_id, id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(entity_envelope("supplier", &found)?))
}

/// Create a supplier
#[utoipa::path(
    post,
    path = "/api/v1/suppliers",
    request_body = CreateSupplierRequest,
    responses(
        (status = 201, description = "Supplier created", body = supplier::Model),
        (status = 400, description = "Invalid payload", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "suppliers"
)]
pub async fn create_supplier(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateSupplierRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let created = state
        .services
        .suppliers
        .create_supplier(user.user_id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(entity_envelope("supplier", &created)?))
}

/// Update a supplier
#[utoipa::path(
    patch,
    path = "/api/v1/suppliers/{id}",
    params(("id" = i32, Path, description = "Supplier id")),
    request_body = UpdateSupplierRequest,
    responses(
        (status = 200, description = "Updated supplier", body = supplier::Model),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "suppliers"
)]
pub async fn update_supplier(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateSupplierRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let updated = state
        .services
        .suppliers
        .update_supplier(user.user_id, id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(entity_envelope("supplier", &updated)?))
}

/// Delete a supplier and its purchase links
#[utoipa::path(
    delete,
    path = "/api/v1/suppliers/{id}",
    params(("id" = i32, Path, description = "Supplier id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "suppliers"
)]
pub async fn delete_supplier(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .suppliers
        .delete_supplier(user.user_id, id)
        .await
        .map_err(map_service_error)?;
    Ok(no_content_response())
}

pub fn supplier_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_suppliers))
        .route("/", post(create_supplier))
        .route("/:id", get(get_supplier))
        .route("/:id", patch(update_supplier))
        .route("/:id", delete(delete_supplier))
}
