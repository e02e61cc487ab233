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
use crate::errors::{ApiError, ErrorResponse, ServiceError};
use crate::pagination::paginated_envelope;
use crate::services::products::{CreateProductRequest, ProductResponse, UpdateProductRequest};
use crate::AppState;

/// List products with pagination, search, category filter and sorting
#[utoipa::path(
    get,
    path = "/api/v1/products",
    params(ListQuery),
    responses(
        (status = 200, description = "Paginated product list"),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let options = query.into_options();
    let (items, meta) = state
        .services
        .products
        .list_products(user.user_id, &options)
        .await
        .map_err(map_service_error)?;

    let body = paginated_envelope("products", &items, &meta)
        .map_err(ServiceError::from)
        .map_err(map_service_error)?;
    Ok(success_response(body))
}

/// Get a single product with its variants and stock total
#[utoipa::path(
    get,
    path = "/api/v1/products/{id}",
    params(("id" = i32, Path, description = "Product id")),
    responses(
        (status = 200, description = "The product", body = ProductResponse),
        (status = 404, description = "Not found or owned by someone else", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state
        .services
        .products
        .get_product(user.user_id, id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(entity_envelope("product", &product)?))
}

/// Create a product together with its default variant
#[utoipa::path(
    post,
    path = "/api/v1/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Invalid payload", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let product = state
        .services
        .products
        .create_product(user.user_id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(entity_envelope("product", &product)?))
}

/// Update a product; stock fields fall through to the default variant
#[utoipa::path(
    patch,
    path = "/api/v1/products/{id}",
    params(("id" = i32, Path, description = "Product id")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Updated product", body = ProductResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let product = state
        .services
        .products
        .update_product(user.user_id, id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(entity_envelope("product", &product)?))
}

/// Delete a product and, through the cascade, its variants
#[utoipa::path(
    delete,
    path = "/api/v1/products/{id}",
    params(("id" = i32, Path, description = "Product id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .products
        .delete_product(user.user_id, id)
        .await
        .map_err(map_service_error)?;
    Ok(no_content_response())
}

pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products))
        .route("/", post(create_product))
        .route("/:id", get(get_product))
        .route("/:id", patch(update_product))
        .route("/:id", delete(delete_product))
}
