use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;
use validator::Validate;

use crate::errors::{ApiError, ServiceError};
use crate::pagination::PageRequest;
use crate::query::ListOptions;

/// Standard success response
pub fn success_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(data)).into_response()
}

/// Standard created response
pub fn created_response<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(data)).into_response()
}

/// Standard no content response
pub fn no_content_response() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

/// Validate request input
pub fn validate_input<T: Validate>(input: &T) -> Result<(), ApiError> {
    input
        .validate()
        .map_err(|e| ApiError::ValidationError(format!("Validation failed: {}", e)))
}

/// Map service errors to API errors
pub fn map_service_error(err: ServiceError) -> ApiError {
    ApiError::ServiceError(err)
}

/// Wrap a single entity under its resource key: `{"product": {...}}`.
pub fn entity_envelope<T: Serialize>(key: &str, value: &T) -> Result<serde_json::Value, ApiError> {
    let value = serde_json::to_value(value)
        .map_err(|e| ApiError::ServiceError(ServiceError::SerializationError(e)))?;
    let mut body = serde_json::Map::with_capacity(1);
    body.insert(key.to_string(), value);
    Ok(serde_json::Value::Object(body))
}

/// Query parameters shared by the list endpoints.
///
/// `page` and `limit` arrive as raw strings so garbage values coerce to the
/// defaults instead of failing deserialization; the pagination layer clamps
/// them. `category` only applies to the product list.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// 1-based page number; defaults to 1
    pub page: Option<String>,
    /// Page size, clamped to [1, 100]; defaults to 10
    pub limit: Option<String>,
    /// Case-insensitive substring search
    pub search: Option<String>,
    /// Numeric category id filter (product list only)
    pub category: Option<String>,
    /// Whitelisted sort field; unknown names fall back to the default
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    /// `asc` or `desc`; anything else sorts ascending
    #[serde(rename = "sortOrder")]
    pub sort_order: Option<String>,
}

impl ListQuery {
    pub fn into_options(self) -> ListOptions {
        ListOptions {
            page: PageRequest::from_raw(self.page.as_deref(), self.limit.as_deref()),
            category: crate::query::category_filter(self.category.as_deref()),
            search: self.search,
            sort_by: self.sort_by,
            sort_order: self.sort_order,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_query_coerces_raw_values() {
        let query = ListQuery {
            page: Some("abc".to_string()),
            limit: Some("500".to_string()),
            search: Some("beer".to_string()),
            category: Some("electronics".to_string()),
            sort_by: Some("name".to_string()),
            sort_order: Some("desc".to_string()),
        };
        let options = query.into_options();
        assert_eq!(options.page.page, 1);
        assert_eq!(options.page.limit, 100);
        assert_eq!(options.category, None);
        assert_eq!(options.search.as_deref(), Some("beer"));
    }
}
