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
use crate::entities::category;
use crate::errors::{ApiError, ErrorResponse, ServiceError};
use crate::pagination::paginated_envelope;
use crate::services::categories::{CreateCategoryRequest, UpdateCategoryRequest};
use crate::AppState;

/// List categories with pagination, search and sorting
#[utoipa::path(
    get,
    path = "/api/v1/categories",
    params(ListQuery),
    responses(
        (status = 200, description = "Paginated category list"),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn list_categories(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let options = query.into_options();
    let (items, meta) = state
        .services
        .categories
        .list_categories(user.user_id, &options)
        .await
        .map_err(map_service_error)?;

    let body = paginated_envelope("categories", &items, &meta)
        .map_err(ServiceError::from)
        .map_err(map_service_error)?;
    Ok(success_response(body))
}

/// Get a single category
#[utoipa::path(
    get,
    path = "/api/v1/categories/{id}",
    params(("id" = i32, Path, description = "Category id")),
    responses(
        (status = 200, description = "The category", body = category::Model),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn get_category(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let found = state
        .services
        .categories
        .get_category(user.user_id, id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(entity_envelope("category", &found)?))
}

/// Create a category, optionally under a parent
#[utoipa::path(
    post,
    path = "/api/v1/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = category::Model),
        (status = 404, description = "Parent not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn create_category(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let created = state
        .services
        .categories
        .create_category(user.user_id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(entity_envelope("category", &created)?))
}

/// Update a category; reparenting keeps the tree acyclic
#[utoipa::path(
    patch,
    path = "/api/v1/categories/{id}",
    params(("id" = i32, Path, description = "Category id")),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Updated category", body = category::Model),
        (status = 400, description = "Invalid reparenting", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn update_category(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let updated = state
        .services
        .categories
        .update_category(user.user_id, id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(entity_envelope("category", &updated)?))
}

/// Delete a category; products keep existing without one
#[utoipa::path(
    delete,
    path = "/api/v1/categories/{id}",
    params(("id" = i32, Path, description = "Category id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn delete_category(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .categories
        .delete_category(user.user_id, id)
        .await
        .map_err(map_service_error)?;
    Ok(no_content_response())
}

pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories))
        .route("/", post(create_category))
        .route("/:id", get(get_category))
        .route("/:id", patch(update_category))
        .route("/:id", delete(delete_category))
}
