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
use crate::entities::product_variant;
use crate::errors::{ApiError, ErrorResponse, ServiceError};
use crate::pagination::paginated_envelope;
use crate::services::variants::{CreateVariantRequest, UpdateVariantRequest};
use crate::AppState;

/// List the variants of a product, default variant first
#[utoipa::path(
    get,
    path = "/api/v1/products/{product_id}/variants",
    params(("product_id" = i32, Path, description = "Product id"), ListQuery),
    responses(
        (status = 200, description = "Paginated variant list"),
        (status = 404, description = "Product not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "variants"
)]
pub async fn list_variants(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(product_id): Path<i32>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let options = query.into_options();
    let (items, meta) = state
        .services
        .variants
        .list_variants(user.user_id, product_id, &options)
        .await
        .map_err(map_service_error)?;

    let body = paginated_envelope("variants", &items, &meta)
        .map_err(ServiceError::from)
        .map_err(map_service_error)?;
    Ok(success_response(body))
}

/// Create a variant for a product
#[utoipa::path(
    post,
    path = "/api/v1/products/{product_id}/variants",
    params(("product_id" = i32, Path, description = "Product id")),
    request_body = CreateVariantRequest,
    responses(
        (status = 201, description = "Variant created", body = product_variant::Model),
        (status = 404, description = "Product not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "variants"
)]
pub async fn create_variant(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(product_id): Path<i32>,
    Json(payload): Json<CreateVariantRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let variant = state
        .services
        .variants
        .create_variant(user.user_id, product_id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(entity_envelope("variant", &variant)?))
}

/// Get a single variant of a product
#[utoipa::path(
    get,
    path = "/api/v1/products/{product_id}/variants/{id}",
    params(
        ("product_id" = i32, Path, description = "Product id"),
        ("id" = i32, Path, description = "Variant id")
    ),
    responses(
        (status = 200, description = "The variant", body = product_variant::Model),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "variants"
)]
pub async fn get_variant(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((product_id, id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, ApiError> {
    let variant = state
        .services
        .variants
        .get_variant(user.user_id, product_id, id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(entity_envelope("variant", &variant)?))
}

/// Update a variant
#[utoipa::path(
    patch,
    path = "/api/v1/products/{product_id}/variants/{id}",
    params(
        ("product_id" = i32, Path, description = "Product id"),
        ("id" = i32, Path, description = "Variant id")
    ),
    request_body = UpdateVariantRequest,
    responses(
        (status = 200, description = "Updated variant", body = product_variant::Model),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "variants"
)]
pub async fn update_variant(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((product_id, id)): Path<(i32, i32)>,
    Json(payload): Json<UpdateVariantRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let variant = state
        .services
        .variants
        .update_variant(user.user_id, product_id, id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(entity_envelope("variant", &variant)?))
}

/// Delete a variant; the default variant is protected
#[utoipa::path(
    delete,
    path = "/api/v1/products/{product_id}/variants/{id}",
    params(
        ("product_id" = i32, Path, description = "Product id"),
        ("id" = i32, Path, description = "Variant id")
    ),
    responses(
        (status = 204, description = "Deleted"),
        (status = 400, description = "Cannot delete the default variant", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "variants"
)]
pub async fn delete_variant(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((product_id, id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .variants
        .delete_variant(user.user_id, product_id, id)
        .await
        .map_err(map_service_error)?;
    Ok(no_content_response())
}

/// Routes mounted under `/products`. The parent segment reuses `:id` so the
/// merged router agrees on one parameter name per position.
pub fn product_scoped_routes() -> Router<AppState> {
    Router::new()
        .route("/:id/variants", get(list_variants))
        .route("/:id/variants", post(create_variant))
        .route("/:id/variants/:variant_id", get(get_variant))
        .route("/:id/variants/:variant_id", patch(update_variant))
        .route("/:id/variants/:variant_id", delete(delete_variant))
}
