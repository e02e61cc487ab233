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
use crate::entities::customer;
use crate::errors::{ApiError, ErrorResponse, ServiceError};
use crate::pagination::paginated_envelope;
use crate::services::customers::{CreateCustomerRequest, UpdateCustomerRequest};
use crate::AppState;

/// List customers with pagination, search and sorting
#[utoipa::path(
    get,
    path = "/api/v1/customers",
    params(ListQuery),
    responses(
        (status = 200, description = "Paginated customer list"),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "customers"
)]
pub async fn list_customers(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let options = query.into_options();
    let (items, meta) = state
        .services
        .customers
        .list_customers(user.user_id, &options)
        .await
        .map_err(map_service_error)?;

    let body = paginated_envelope("customers", &items, &meta)
        .map_err(ServiceError::from)
        .map_err(map_service_error)?;
    Ok(success_response(body))
}

/// Get a single customer
#[utoipa::path(
    get,
    path = "/api/v1/customers/{id}",
    params(("id" = i32, Path, description = "Customer id")),
    responses(
        (status = 200, description = "The customer", body = customer::Model),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "customers"
)]
pub async fn get_customer(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let found = state
        .services
        .customers
        .get_customer(user.user_id, id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(entity_envelope("customer", &found)?))
}

/// Create a customer
#[utoipa::path(
    post,
    path = "/api/v1/customers",
    request_body = CreateCustomerRequest,
    responses(
        (status = 201, description = "Customer created", body = customer::Model),
        (status = 400, description = "Invalid payload", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "customers"
)]
pub async fn create_customer(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateCustomerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let created = state
        .services
        .customers
        .create_customer(user.user_id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(entity_envelope("customer", &created)?))
}

/// Update a customer
#[utoipa::path(
    patch,
    path = "/api/v1/customers/{id}",
    params(("id" = i32, Path, description = "Customer id")),
    request_body = UpdateCustomerRequest,
    responses(
        (status = 200, description = "Updated customer", body = customer::Model),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "customers"
)]
pub async fn update_customer(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateCustomerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let updated = state
        .services
        .customers
        .update_customer(user.user_id, id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(entity_envelope("customer", &updated)?))
}

/// Delete a customer
#[utoipa::path(
    delete,
    path = "/api/v1/customers/{id}",
    params(("id" = i32, Path, description = "Customer id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "customers"
)]
pub async fn delete_customer(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .customers
        .delete_customer(user.user_id, id)
        .await
        .map_err(map_service_error)?;
    Ok(no_content_response())
}

pub fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_customers))
        .route("/", post(create_customer))
        .route("/:id", get(get_customer))
        .route("/:id", patch(update_customer))
        .route("/:id", delete(delete_customer))
}
