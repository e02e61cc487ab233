use axum::{
    extract::{Json, State},
    response::IntoResponse,
    routing::post,
    Router,
};

use super::common::{created_response, map_service_error, success_response, validate_input};
use crate::errors::{ApiError, ErrorResponse};
use crate::services::users::{AuthResponse, LoginRequest, RegisterRequest};
use crate::AppState;

/// Register a new account and log it in
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let response = state
        .services
        .users
        .register(payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(response))
}

/// Exchange credentials for an access token
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let response = state
        .services
        .users
        .login(payload)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(response))
}

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}
