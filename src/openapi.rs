use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Stockpilot API",
        version = "0.2.0",
        description = r#"
# Stockpilot Inventory API

Multi-tenant inventory management: products with stock-tracking variants,
hierarchical categories, customer and supplier books, and purchase links
between variants and suppliers. Every resource belongs to the account that
created it.

## Authentication

Register or log in under `/api/v1/auth`, then send the issued token on every
request:

```
Authorization: Bearer <token>
```

## Pagination

List endpoints accept `page`, `limit` (max 100), `search`, `sortBy` and
`sortOrder`. Responses wrap the items in `{"<resource>": [...], "pagination":
{...}}` with camelCase metadata fields.

## Errors

Failures answer with `{"msg": "..."}` and a matching HTTP status code.
        "#
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "auth", description = "Registration and login"),
        (name = "products", description = "Product catalog"),
        (name = "variants", description = "Product variants and stock"),
        (name = "categories", description = "Category tree"),
        (name = "customers", description = "Customer book"),
        (name = "suppliers", description = "Supplier book"),
        (name = "variant-suppliers", description = "Purchase links"),
        (name = "stats", description = "Dashboard counters"),
        (name = "health", description = "Service probes")
    ),
    paths(
        crate::handlers::auth::register,
        crate::handlers::auth::login,

        crate::handlers::products::list_products,
        crate::handlers::products::get_product,
        crate::handlers::products::create_product,
        crate::handlers::products::update_product,
        crate::handlers::products::delete_product,

        crate::handlers::variants::list_variants,
        crate::handlers::variants::create_variant,
        crate::handlers::variants::get_variant,
        crate::handlers::variants::update_variant,
        crate::handlers::variants::delete_variant,

        crate::handlers::categories::list_categories,
        crate::handlers::categories::get_category,
        crate::handlers::categories::create_category,
        crate::handlers::categories::update_category,
        crate::handlers::categories::delete_category,

        crate::handlers::customers::list_customers,
        crate::handlers::customers::get_customer,
        crate::handlers::customers::create_customer,
        crate::handlers::customers::update_customer,
        crate::handlers::customers::delete_customer,

        crate::handlers::suppliers::list_suppliers,
        crate::handlers::suppliers::get_supplier,
        crate::handlers::suppliers::create_supplier,
        crate::handlers::suppliers::update_supplier,
        crate::handlers::suppliers::delete_supplier,

        crate::handlers::variant_suppliers::list_supplier_variants,
        crate::handlers::variant_suppliers::create_variant_supplier,
        crate::handlers::variant_suppliers::get_variant_supplier,
        crate::handlers::variant_suppliers::update_variant_supplier,
        crate::handlers::variant_suppliers::delete_variant_supplier,

        crate::handlers::stats::inventory_stats,
        crate::handlers::stats::agenda_stats,

        crate::handlers::health::health_check,
        crate::handlers::health::root,
    ),
    components(
        schemas(
            crate::entities::product::Model,
            crate::entities::product_variant::Model,
            crate::entities::category::Model,
            crate::entities::customer::Model,
            crate::entities::supplier::Model,
            crate::entities::variant_supplier::Model,

            crate::services::products::CreateProductRequest,
            crate::services::products::UpdateProductRequest,
            crate::services::products::ProductResponse,
            crate::services::variants::CreateVariantRequest,
            crate::services::variants::UpdateVariantRequest,
            crate::services::categories::CreateCategoryRequest,
            crate::services::categories::UpdateCategoryRequest,
            crate::services::customers::CreateCustomerRequest,
            crate::services::customers::UpdateCustomerRequest,
            crate::services::suppliers::CreateSupplierRequest,
            crate::services::suppliers::UpdateSupplierRequest,
            crate::services::variant_suppliers::CreateVariantSupplierRequest,
            crate::services::variant_suppliers::UpdateVariantSupplierRequest,
            crate::services::users::RegisterRequest,
            crate::services::users::LoginRequest,
            crate::services::users::AuthResponse,
            crate::services::users::UserResponse,
            crate::services::stats::InventoryStats,
            crate::services::stats::AgendaStats,

            crate::pagination::PaginationMeta,
            crate::errors::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDocV1;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_includes_core_paths_and_auth_scheme() {
        let openapi = ApiDocV1::openapi();
        let json = serde_json::to_string(&openapi).unwrap();
        assert!(json.contains("Stockpilot API"));
        assert!(json.contains("/api/v1/products"));
        assert!(json.contains("/api/v1/products/{product_id}/variants/{id}"));
        assert!(json.contains("/api/v1/suppliers/{supplier_id}/variants"));
        assert!(json.contains("bearer_auth"));
    }
}
