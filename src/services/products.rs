//! Product catalog service.
//!
//! Products always travel with their variants: creation inserts a hidden
//! default variant in the same transaction, reads attach the variant list and
//! the aggregated stock total, deletion cascades. All operations are scoped
//! to the calling user; rows owned by someone else are reported as missing.

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, ModelTrait, Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::common::normalize_title;
use crate::entities::{category, product, product_variant};
use crate::errors::ServiceError;
use crate::pagination::PaginationMeta;
use crate::query::{resolve_sort, search_condition, ListOptions};
use crate::services::stock::total_stock;
use crate::services::variants::DEFAULT_VARIANT_NAME;

/// Query-string names accepted by `sortBy` on the product list.
pub const PRODUCT_SORT_FIELDS: &[(&str, product::Column)] = &[
    ("name", product::Column::Name),
    ("selling_price", product::Column::SellingPrice),
    ("created_at", product::Column::CreatedAt),
    ("updated_at", product::Column::UpdatedAt),
];

const PRODUCT_SEARCH_FIELDS: [product::Column; 2] =
    [product::Column::Name, product::Column::Description];

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 255, message = "name must not be empty"))]
    pub name: String,

    pub description: Option<String>,

    pub selling_price: Decimal,

    pub category_id: Option<i32>,

    /// Initial stock held by the default variant
    #[validate(range(min = 0, message = "stock cannot be negative"))]
    pub stock: Option<i32>,

    #[validate(range(min = 0, message = "min_stock_alert cannot be negative"))]
    pub min_stock_alert: Option<i32>,

    pub enable_stock_alerts: Option<bool>,
}

/// Partial update. Absent fields keep their stored value. The stock-related
/// fields only apply while the product has no variant rows; as soon as any
/// exist, stock is managed per variant and these fields are ignored.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 255, message = "name must not be empty"))]
    pub name: Option<String>,

    pub description: Option<String>,

    pub selling_price: Option<Decimal>,

    pub category_id: Option<i32>,

    #[validate(range(min = 0, message = "stock cannot be negative"))]
    pub stock: Option<i32>,

    #[validate(range(min = 0, message = "min_stock_alert cannot be negative"))]
    pub min_stock_alert: Option<i32>,

    pub enable_stock_alerts: Option<bool>,
}

impl UpdateProductRequest {
    fn touches_default_variant(&self) -> bool {
        self.stock.is_some() || self.min_stock_alert.is_some() || self.enable_stock_alerts.is_some()
    }
}

/// A product as returned by the API: the row itself plus its variants, the
/// resolved category, the aggregated stock count and the alert settings
/// lifted from the default variant.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProductResponse {
    #[serde(flatten)]
    pub product: product::Model,
    pub total_stock: i64,
    pub min_stock_alert: i32,
    pub enable_stock_alerts: bool,
    pub variants: Vec<product_variant::Model>,
    pub category: Option<category::Model>,
}

impl ProductResponse {
    fn assemble(
        product: product::Model,
        variants: Vec<product_variant::Model>,
        category: Option<category::Model>,
    ) -> Self {
        let total_stock = total_stock(&variants);
        let default = variants.iter().find(|v| v.is_default);
        Self {
            product,
            total_stock,
            min_stock_alert: default.map(|v| v.min_stock_alert).unwrap_or(0),
            enable_stock_alerts: default.map(|v| v.enable_stock_alerts).unwrap_or(false),
            variants,
            category,
        }
    }
}

#[derive(Clone)]
pub struct ProductService {
    db: Arc<DatabaseConnection>,
}

impl ProductService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self, options))]
    pub async fn list_products(
        &self,
        user_id: i32,
        options: &ListOptions,
    ) -> Result<(Vec<ProductResponse>, PaginationMeta), ServiceError> {
        let mut query = product::Entity::find().filter(ColumnTrait::eq(&product::Column::UserId, user_id));

        if let Some(condition) = search_condition(options.search.as_deref(), &PRODUCT_SEARCH_FIELDS)
        {
            query = query.filter(condition);
        }
        if let Some(category_id) = options.category {
            query = query.filter(ColumnTrait::eq(&product::Column::CategoryId, category_id));
        }

        let total = query.clone().count(self.db.as_ref()).await?;

        let (sort_column, sort_order) = resolve_sort(
            options.sort_by.as_deref(),
            options.sort_order.as_deref(),
            PRODUCT_SORT_FIELDS,
            product::Column::Name,
        );

        let page = options.page;
        let products = query
            .order_by(sort_column, sort_order)
            .offset(page.offset)
            .limit(page.limit)
            .all(self.db.as_ref())
            .await?;

        let mut variants_by_product = self.load_variants_for(&products).await?;
        let mut categories_by_id = self.load_categories_for(&products).await?;

        let items = products
            .into_iter()
            .map(|p| {
                let variants = variants_by_product.remove(&p.id).unwrap_or_default();
                let category = p.category_id.and_then(|id| categories_by_id.remove(&id));
                ProductResponse::assemble(p, variants, category)
            })
            .collect();

        let meta = PaginationMeta::calculate(page.page, page.limit, total);
        Ok((items, meta))
    }

    #[instrument(skip(self))]
    pub async fn get_product(
        &self,
        user_id: i32,
        product_id: i32,
    ) -> Result<ProductResponse, ServiceError> {
        let product = self.find_owned(user_id, product_id).await?;

        let variants = product_variant::Entity::find()
            .filter(product_variant::Column::ProductId.eq(product.id))
            .order_by(product_variant::Column::IsDefault, Order::Desc)
            .order_by(product_variant::Column::VariantName, Order::Asc)
            .all(self.db.as_ref())
            .await?;

        let category = match product.category_id {
            Some(category_id) => {
                category::Entity::find_by_id(category_id)
                    .one(self.db.as_ref())
                    .await?
            }
            None => None,
        };

        Ok(ProductResponse::assemble(product, variants, category))
    }

    #[instrument(skip(self, request))]
    pub async fn create_product(
        &self,
        user_id: i32,
        request: CreateProductRequest,
    ) -> Result<ProductResponse, ServiceError> {
        if request.selling_price < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "selling_price cannot be negative".to_string(),
            ));
        }
        if let Some(category_id) = request.category_id {
            self.ensure_category_owned(user_id, category_id).await?;
        }

        let txn = self.db.begin().await?;

        let product = product::ActiveModel {
            user_id: Set(user_id),
            name: Set(normalize_title(&request.name)),
            description: Set(request.description.clone()),
            selling_price: Set(request.selling_price),
            category_id: Set(request.category_id),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        // The hidden default variant carries the product-level stock until
        // real variants are created.
        let default_variant = product_variant::ActiveModel {
            user_id: Set(user_id),
            product_id: Set(product.id),
            variant_name: Set(DEFAULT_VARIANT_NAME.to_string()),
            stock: Set(request.stock.unwrap_or(0)),
            selling_price_modifier: Set(Decimal::ZERO),
            min_stock_alert: Set(request.min_stock_alert.unwrap_or(0)),
            enable_stock_alerts: Set(request.enable_stock_alerts.unwrap_or(false)),
            is_default: Set(true),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        info!(product_id = product.id, "product created");

        let category = match product.category_id {
            Some(category_id) => {
                category::Entity::find_by_id(category_id)
                    .one(self.db.as_ref())
                    .await?
            }
            None => None,
        };

        Ok(ProductResponse::assemble(
            product,
            vec![default_variant],
            category,
        ))
    }

    #[instrument(skip(self, request))]
    pub async fn update_product(
        &self,
        user_id: i32,
        product_id: i32,
        request: UpdateProductRequest,
    ) -> Result<ProductResponse, ServiceError> {
        if let Some(price) = request.selling_price {
            if price < Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "selling_price cannot be negative".to_string(),
                ));
            }
        }
        if let Some(category_id) = request.category_id {
            self.ensure_category_owned(user_id, category_id).await?;
        }

        let product = self.find_owned(user_id, product_id).await?;

        let txn = self.db.begin().await?;

        let mut active: product::ActiveModel = product.into();
        if let Some(name) = &request.name {
            active.name = Set(normalize_title(name));
        }
        if let Some(description) = &request.description {
            active.description = Set(Some(description.clone()));
        }
        if let Some(price) = request.selling_price {
            active.selling_price = Set(price);
        }
        if let Some(category_id) = request.category_id {
            active.category_id = Set(Some(category_id));
        }
        let product = active.update(&txn).await?;

        if request.touches_default_variant() {
            self.apply_default_variant_fields(&txn, user_id, product.id, &request)
                .await?;
        }

        txn.commit().await?;

        self.get_product(user_id, product_id).await
    }

    /// Stock fields on a product update reach the default variant only when
    /// the product has no variant rows at all. Creation always inserts the
    /// default row, so normally this is a no-op; the branch covers rows
    /// predating that guarantee.
    async fn apply_default_variant_fields(
        &self,
        txn: &DatabaseTransaction,
        user_id: i32,
        product_id: i32,
        request: &UpdateProductRequest,
    ) -> Result<(), ServiceError> {
        let variant_rows = product_variant::Entity::find()
            .filter(product_variant::Column::ProductId.eq(product_id))
            .count(txn)
            .await?;
        if variant_rows > 0 {
            return Ok(());
        }

        let default_variant = product_variant::Entity::find()
            .filter(product_variant::Column::ProductId.eq(product_id))
            .filter(product_variant::Column::UserId.eq(user_id))
            .filter(product_variant::Column::IsDefault.eq(true))
            .one(txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Default variant for product {} not found",
                    product_id
                ))
            })?;

        let mut active: product_variant::ActiveModel = default_variant.into();
        if let Some(stock) = request.stock {
            active.stock = Set(stock);
        }
        if let Some(min_stock_alert) = request.min_stock_alert {
            active.min_stock_alert = Set(min_stock_alert);
        }
        if let Some(enable) = request.enable_stock_alerts {
            active.enable_stock_alerts = Set(enable);
        }
        active.update(txn).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, user_id: i32, product_id: i32) -> Result<(), ServiceError> {
        let product = self.find_owned(user_id, product_id).await?;
        product.delete(self.db.as_ref()).await?;
        info!(product_id, "product deleted");
        Ok(())
    }

    /// Ownership gate: a product belonging to another user is reported
    /// exactly like a missing one.
    async fn find_owned(&self, user_id: i32, product_id: i32) -> Result<product::Model, ServiceError> {
        product::Entity::find_by_id(product_id)
            .filter(ColumnTrait::eq(&product::Column::UserId, user_id))
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Product with id {} not found", product_id))
            })
    }

    async fn ensure_category_owned(
        &self,
        user_id: i32,
        category_id: i32,
    ) -> Result<(), ServiceError> {
        category::Entity::find_by_id(category_id)
            .filter(category::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Category with id {} not found", category_id))
            })?;
        Ok(())
    }

    async fn load_variants_for(
        &self,
        products: &[product::Model],
    ) -> Result<HashMap<i32, Vec<product_variant::Model>>, ServiceError> {
        if products.is_empty() {
            return Ok(HashMap::new());
        }
        let ids: Vec<i32> = products.iter().map(|p| p.id).collect();
        let variants = product_variant::Entity::find()
            .filter(product_variant::Column::ProductId.is_in(ids))
            .order_by(product_variant::Column::IsDefault, Order::Desc)
            .order_by(product_variant::Column::VariantName, Order::Asc)
            .all(self.db.as_ref())
            .await?;

        let mut grouped: HashMap<i32, Vec<product_variant::Model>> = HashMap::new();
        for variant in variants {
            grouped.entry(variant.product_id).or_default().push(variant);
        }
        Ok(grouped)
    }

    async fn load_categories_for(
        &self,
        products: &[product::Model],
    ) -> Result<HashMap<i32, category::Model>, ServiceError> {
        let ids: Vec<i32> = products.iter().filter_map(|p| p.category_id).collect();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let categories = category::Entity::find()
            .filter(category::Column::Id.is_in(ids))
            .all(self.db.as_ref())
            .await?;
        Ok(categories.into_iter().map(|c| (c.id, c)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn sample_product(id: i32, user_id: i32) -> product::Model {
        product::Model {
            id,
            user_id,
            name: "Widget".to_string(),
            description: None,
            selling_price: Decimal::new(1999, 2),
            category_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn get_product_rejects_foreign_rows() {
        // The row exists but belongs to user 2; the filtered query returns
        // nothing and the caller sees a plain not-found.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<product::Model>::new()])
            .into_connection();
        let service = ProductService::new(Arc::new(db));

        let err = service.get_product(1, 99).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(msg) if msg.contains("99")));
    }

    #[tokio::test]
    async fn get_product_attaches_variants_and_stock() {
        let product = sample_product(5, 1);
        let variants = vec![
            product_variant::Model {
                id: 10,
                user_id: 1,
                product_id: 5,
                variant_name: "Default".to_string(),
                stock: 7,
                selling_price_modifier: Decimal::ZERO,
                min_stock_alert: 0,
                enable_stock_alerts: false,
                is_default: true,
                attributes: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            product_variant::Model {
                id: 11,
                user_id: 1,
                product_id: 5,
                variant_name: "Large".to_string(),
                stock: 3,
                selling_price_modifier: Decimal::new(500, 2),
                min_stock_alert: 1,
                enable_stock_alerts: true,
                is_default: false,
                attributes: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
        ];

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![product]])
            .append_query_results([variants])
            .into_connection();
        let service = ProductService::new(Arc::new(db));

        let response = service.get_product(1, 5).await.unwrap();
        assert_eq!(response.variants.len(), 2);
        // Real variant stock wins over the stale default row.
        assert_eq!(response.total_stock, 3);
        // Alert settings come from the default row, not the real variant.
        assert_eq!(response.min_stock_alert, 0);
        assert!(!response.enable_stock_alerts);
        assert!(response.category.is_none());
    }

    #[tokio::test]
    async fn patching_stock_leaves_the_default_variant_alone() {
        // The product already owns its default row (stock 7), so the stock
        // field on the update must not reach it.
        let product = sample_product(5, 1);
        let default_variant = product_variant::Model {
            id: 10,
            user_id: 1,
            product_id: 5,
            variant_name: "Default".to_string(),
            stock: 7,
            selling_price_modifier: Decimal::ZERO,
            min_stock_alert: 0,
            enable_stock_alerts: false,
            is_default: true,
            attributes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let variant_count = std::collections::BTreeMap::from([(
            "num_items",
            sea_orm::Value::BigInt(Some(1)),
        )]);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![product.clone()]])
            .append_query_results([vec![product.clone()]])
            .append_query_results([vec![variant_count]])
            .append_query_results([vec![product]])
            .append_query_results([vec![default_variant]])
            .into_connection();
        let service = ProductService::new(Arc::new(db));

        let request = UpdateProductRequest {
            stock: Some(20),
            ..Default::default()
        };
        let response = service.update_product(1, 5, request).await.unwrap();
        assert_eq!(response.total_stock, 7);
        assert_eq!(response.variants[0].stock, 7);
    }

    #[tokio::test]
    async fn delete_product_checks_ownership_first() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<product::Model>::new()])
            .into_connection();
        let service = ProductService::new(Arc::new(db));

        let err = service.delete_product(1, 42).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[test]
    fn negative_stock_fails_validation() {
        let request = CreateProductRequest {
            name: "Widget".to_string(),
            description: None,
            selling_price: Decimal::new(100, 0),
            category_id: None,
            stock: Some(-5),
            min_stock_alert: None,
            enable_stock_alerts: None,
        };
        assert!(request.validate().is_err());
    }
}
