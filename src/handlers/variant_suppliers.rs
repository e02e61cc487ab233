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
use crate::entities::variant_supplier;
use crate::errors::{ApiError, ErrorResponse, ServiceError};
use crate::pagination::paginated_envelope;
use crate::services::variant_suppliers::{
    CreateVariantSupplierRequest, UpdateVariantSupplierRequest,
};
use crate::AppState;

/// List a supplier's purchase links, primary links first
#[utoipa::path(
    get,
    path = "/api/v1/suppliers/{supplier_id}/variants",
    params(("supplier_id" = i32, Path, description = "Supplier id"), ListQuery),
    responses(
        (status = 200, description = "Paginated purchase link list"),
        (status = 404, description = "Supplier not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "variant-suppliers"
)]
pub async fn list_supplier_variants(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(supplier_id): Path<i32>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let options = query.into_options();
    let (items, meta) = state
        .services
        .variant_suppliers
        .list_for_supplier(user.user_id, supplier_id, &options)
        .await
        .map_err(map_service_error)?;

    let body = paginated_envelope("variantSuppliers", &items, &meta)
        .map_err(ServiceError::from)
        .map_err(map_service_error)?;
    Ok(success_response(body))
}

/// Link a supplier to a variant with a purchase price
#[utoipa::path(
    post,
    path = "/api/v1/variant-suppliers",
    request_body = CreateVariantSupplierRequest,
    responses(
        (status = 201, description = "Link created", body = variant_supplier::Model),
        (status = 404, description = "Variant or supplier not found", body = ErrorResponse),
        (status = 409, description = "Already linked", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "variant-suppliers"
)]
pub async fn create_variant_supplier(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateVariantSupplierRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let link = state
        .services
        .variant_suppliers
        .create_link(user.user_id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(entity_envelope("variantSupplier", &link)?))
}

/// Get a single purchase link
#[utoipa::path(
    get,
    path = "/api/v1/variant-suppliers/{id}",
    params(("id" = i32, Path, description = "Link id")),
    responses(
        (status = 200, description = "The link", body = variant_supplier::Model),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "variant-suppliers"
)]
pub async fn get_variant_supplier(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let link = state
        .services
        .variant_suppliers
        .get_link(user.user_id, id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(entity_envelope("variantSupplier", &link)?))
}

/// Update a purchase link; promoting to primary demotes the others
#[utoipa::path(
    patch,
    path = "/api/v1/variant-suppliers/{id}",
    params(("id" = i32, Path, description = "Link id")),
    request_body = UpdateVariantSupplierRequest,
    responses(
        (status = 200, description = "Updated link", body = variant_supplier::Model),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "variant-suppliers"
)]
pub async fn update_variant_supplier(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateVariantSupplierRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let link = state
        .services
        .variant_suppliers
        .update_link(user.user_id, id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(entity_envelope("variantSupplier", &link)?))
}

/// Remove a purchase link
#[utoipa::path(
    delete,
    path = "/api/v1/variant-suppliers/{id}",
    params(("id" = i32, Path, description = "Link id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "variant-suppliers"
)]
pub async fn delete_variant_supplier(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .variant_suppliers
        .delete_link(user.user_id, id)
        .await
        .map_err(map_service_error)?;
    Ok(no_content_response())
}

/// Routes mounted under `/suppliers`. The parent segment reuses `:id` so the
/// merged router agrees on one parameter name per position.
pub fn supplier_scoped_routes() -> Router<AppState> {
    Router::new().route("/:id/variants", get(list_supplier_variants))
}

/// Routes mounted under `/variant-suppliers`
pub fn variant_supplier_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_variant_supplier))
        .route("/:id", get(get_variant_supplier))
        .route("/:id", patch(update_variant_supplier))
        .route("/:id", delete(delete_variant_supplier))
}
