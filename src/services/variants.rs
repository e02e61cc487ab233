//! Product variant service.
//!
//! Variants are the stock-carrying rows. The default variant is created by
//! the product service and cannot be deleted directly; it only disappears
//! when its product does.

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait,
    Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::common::normalize_title;
use crate::entities::{product, product_variant};
use crate::errors::ServiceError;
use crate::pagination::PaginationMeta;
use crate::query::{resolve_sort, search_condition, ListOptions};

pub const DEFAULT_VARIANT_NAME: &str = "Default";

/// Query-string names accepted by `sortBy` on the variant list. Whatever is
/// requested, the default variant always sorts first.
pub const VARIANT_SORT_FIELDS: &[(&str, product_variant::Column)] = &[
    ("variant_name", product_variant::Column::VariantName),
    ("stock", product_variant::Column::Stock),
    (
        "selling_price_modifier",
        product_variant::Column::SellingPriceModifier,
    ),
    ("created_at", product_variant::Column::CreatedAt),
    ("updated_at", product_variant::Column::UpdatedAt),
];

const VARIANT_SEARCH_FIELDS: [product_variant::Column; 1] = [product_variant::Column::VariantName];

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateVariantRequest {
    #[validate(length(min = 1, max = 255, message = "variant_name must not be empty"))]
    pub variant_name: String,

    #[validate(range(min = 0, message = "stock cannot be negative"))]
    pub stock: Option<i32>,

    /// Added to the product's base price; negative values are discounts
    pub selling_price_modifier: Option<Decimal>,

    #[validate(range(min = 0, message = "min_stock_alert cannot be negative"))]
    pub min_stock_alert: Option<i32>,

    pub enable_stock_alerts: Option<bool>,

    #[schema(value_type = Option<Object>)]
    pub attributes: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateVariantRequest {
    #[validate(length(min = 1, max = 255, message = "variant_name must not be empty"))]
    pub variant_name: Option<String>,

    #[validate(range(min = 0, message = "stock cannot be negative"))]
    pub stock: Option<i32>,

    pub selling_price_modifier: Option<Decimal>,

    #[validate(range(min = 0, message = "min_stock_alert cannot be negative"))]
    pub min_stock_alert: Option<i32>,

    pub enable_stock_alerts: Option<bool>,

    #[schema(value_type = Option<Object>)]
    pub attributes: Option<serde_json::Value>,
}

#[derive(Clone)]
pub struct VariantService {
    db: Arc<DatabaseConnection>,
}

impl VariantService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self, options))]
    pub async fn list_variants(
        &self,
        user_id: i32,
        product_id: i32,
        options: &ListOptions,
    ) -> Result<(Vec<product_variant::Model>, PaginationMeta), ServiceError> {
        self.ensure_product_owned(user_id, product_id).await?;

        let mut query = product_variant::Entity::find()
            .filter(product_variant::Column::ProductId.eq(product_id));

        if let Some(condition) = search_condition(options.search.as_deref(), &VARIANT_SEARCH_FIELDS)
        {
            query = query.filter(condition);
        }

        let total = query.clone().count(self.db.as_ref()).await?;

        let (sort_column, sort_order) = resolve_sort(
            options.sort_by.as_deref(),
            options.sort_order.as_deref(),
            VARIANT_SORT_FIELDS,
            product_variant::Column::VariantName,
        );

        let page = options.page;
        let variants = query
            .order_by(product_variant::Column::IsDefault, Order::Desc)
            .order_by(sort_column, sort_order)
            .offset(page.offset)
            .limit(page.limit)
            .all(self.db.as_ref())
            .await?;

        let meta = PaginationMeta::calculate(page.page, page.limit, total);
        Ok((variants, meta))
    }

    #[instrument(skip(self))]
    pub async fn get_variant(
        &self,
        user_id: i32,
        product_id: i32,
        variant_id: i32,
    ) -> Result<product_variant::Model, ServiceError> {
        self.find_owned(user_id, product_id, variant_id).await
    }

    #[instrument(skip(self, request))]
    pub async fn create_variant(
        &self,
        user_id: i32,
        product_id: i32,
        request: CreateVariantRequest,
    ) -> Result<product_variant::Model, ServiceError> {
        self.ensure_product_owned(user_id, product_id).await?;

        let variant = product_variant::ActiveModel {
            user_id: Set(user_id),
            product_id: Set(product_id),
            variant_name: Set(normalize_title(&request.variant_name)),
            stock: Set(request.stock.unwrap_or(0)),
            selling_price_modifier: Set(request.selling_price_modifier.unwrap_or(Decimal::ZERO)),
            min_stock_alert: Set(request.min_stock_alert.unwrap_or(0)),
            enable_stock_alerts: Set(request.enable_stock_alerts.unwrap_or(false)),
            is_default: Set(false),
            attributes: Set(request.attributes),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await?;

        info!(variant_id = variant.id, product_id, "variant created");
        Ok(variant)
    }

    #[instrument(skip(self, request))]
    pub async fn update_variant(
        &self,
        user_id: i32,
        product_id: i32,
        variant_id: i32,
        request: UpdateVariantRequest,
    ) -> Result<product_variant::Model, ServiceError> {
        let variant = self.find_owned(user_id, product_id, variant_id).await?;

        let mut active: product_variant::ActiveModel = variant.into();
        if let Some(name) = &request.variant_name {
            active.variant_name = Set(normalize_title(name));
        }
        if let Some(stock) = request.stock {
            active.stock = Set(stock);
        }
        if let Some(modifier) = request.selling_price_modifier {
            active.selling_price_modifier = Set(modifier);
        }
        if let Some(min_stock_alert) = request.min_stock_alert {
            active.min_stock_alert = Set(min_stock_alert);
        }
        if let Some(enable) = request.enable_stock_alerts {
            active.enable_stock_alerts = Set(enable);
        }
        if let Some(attributes) = request.attributes {
            active.attributes = Set(Some(attributes));
        }

        Ok(active.update(self.db.as_ref()).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_variant(
        &self,
        user_id: i32,
        product_id: i32,
        variant_id: i32,
    ) -> Result<(), ServiceError> {
        let variant = self.find_owned(user_id, product_id, variant_id).await?;

        if variant.is_default {
            return Err(ServiceError::InvalidOperation(
                "Cannot delete the default variant".to_string(),
            ));
        }

        variant.delete(self.db.as_ref()).await?;
        info!(variant_id, "variant deleted");
        Ok(())
    }

    /// A variant is only visible through its own product and owner; anything
    /// else answers as missing.
    async fn find_owned(
        &self,
        user_id: i32,
        product_id: i32,
        variant_id: i32,
    ) -> Result<product_variant::Model, ServiceError> {
        product_variant::Entity::find_by_id(variant_id)
            .filter(product_variant::Column::UserId.eq(user_id))
            .filter(product_variant::Column::ProductId.eq(product_id))
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Variant with id {} not found", variant_id))
            })
    }

    async fn ensure_product_owned(&self, user_id: i32, product_id: i32) -> Result<(), ServiceError> {
        product::Entity::find_by_id(product_id)
            .filter(ColumnTrait::eq(&product::Column::UserId, user_id))
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Product with id {} not found", product_id))
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn default_variant(id: i32) -> product_variant::Model {
        product_variant::Model {
            id,
            user_id: 1,
            product_id: 3,
            variant_name: DEFAULT_VARIANT_NAME.to_string(),
            stock: 4,
            selling_price_modifier: Decimal::ZERO,
            min_stock_alert: 0,
            enable_stock_alerts: false,
            is_default: true,
            attributes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn deleting_the_default_variant_is_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![default_variant(8)]])
            .into_connection();
        let service = VariantService::new(Arc::new(db));

        let err = service.delete_variant(1, 3, 8).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidOperation(_)));
    }

    #[tokio::test]
    async fn updating_the_default_variant_succeeds() {
        let mut updated = default_variant(8);
        updated.stock = 12;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![default_variant(8)]])
            .append_query_results([vec![updated]])
            .into_connection();
        let service = VariantService::new(Arc::new(db));

        let request = UpdateVariantRequest {
            stock: Some(12),
            ..Default::default()
        };
        let variant = service.update_variant(1, 3, 8, request).await.unwrap();
        assert_eq!(variant.stock, 12);
        assert!(variant.is_default);
    }

    #[tokio::test]
    async fn deleting_a_real_variant_succeeds() {
        let mut variant = default_variant(9);
        variant.is_default = false;
        variant.variant_name = "Large".to_string();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![variant]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let service = VariantService::new(Arc::new(db));

        assert!(service.delete_variant(1, 3, 9).await.is_ok());
    }

    #[tokio::test]
    async fn missing_variant_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<product_variant::Model>::new()])
            .into_connection();
        let service = VariantService::new(Arc::new(db));

        let err = service.get_variant(1, 3, 123).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(msg) if msg.contains("123")));
    }
}
