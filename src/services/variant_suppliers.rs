//! Purchase links between variants and suppliers.
//!
//! A link records what a supplier charges for one variant. Each variant has
//! at most one primary supplier: promoting a link demotes its siblings in
//! the same transaction.

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait,
    Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::entities::{product_variant, supplier, variant_supplier};
use crate::errors::ServiceError;
use crate::pagination::PaginationMeta;
use crate::query::{resolve_sort, ListOptions};

pub const VARIANT_SUPPLIER_SORT_FIELDS: &[(&str, variant_supplier::Column)] = &[
    ("purchase_price", variant_supplier::Column::PurchasePrice),
    ("created_at", variant_supplier::Column::CreatedAt),
    ("updated_at", variant_supplier::Column::UpdatedAt),
];

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateVariantSupplierRequest {
    pub variant_id: i32,

    pub supplier_id: i32,

    pub purchase_price: Decimal,

    pub is_primary_supplier: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateVariantSupplierRequest {
    pub purchase_price: Option<Decimal>,

    pub is_primary_supplier: Option<bool>,
}

#[derive(Clone)]
pub struct VariantSupplierService {
    db: Arc<DatabaseConnection>,
}

impl VariantSupplierService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self, options))]
    pub async fn list_for_supplier(
        &self,
        user_id: i32,
        supplier_id: i32,
        options: &ListOptions,
    ) -> Result<(Vec<variant_supplier::Model>, PaginationMeta), ServiceError> {
        self.ensure_supplier_owned(user_id, supplier_id).await?;

        let query = variant_supplier::Entity::find()
            .filter(variant_supplier::Column::SupplierId.eq(supplier_id));

        let total = query.clone().count(self.db.as_ref()).await?;

        let (sort_column, sort_order) = resolve_sort(
            options.sort_by.as_deref(),
            options.sort_order.as_deref(),
            VARIANT_SUPPLIER_SORT_FIELDS,
            variant_supplier::Column::CreatedAt,
        );

        let page = options.page;
        let links = query
            .order_by(variant_supplier::Column::IsPrimarySupplier, Order::Desc)
            .order_by(sort_column, sort_order)
            .offset(page.offset)
            .limit(page.limit)
            .all(self.db.as_ref())
            .await?;

        let meta = PaginationMeta::calculate(page.page, page.limit, total);
        Ok((links, meta))
    }

    #[instrument(skip(self))]
    pub async fn get_link(
        &self,
        user_id: i32,
        link_id: i32,
    ) -> Result<variant_supplier::Model, ServiceError> {
        self.find_owned(user_id, link_id).await
    }

    #[instrument(skip(self, request))]
    pub async fn create_link(
        &self,
        user_id: i32,
        request: CreateVariantSupplierRequest,
    ) -> Result<variant_supplier::Model, ServiceError> {
        if request.purchase_price < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "purchase_price cannot be negative".to_string(),
            ));
        }

        let variant_id = request.variant_id;
        self.ensure_variant_owned(user_id, variant_id).await?;
        self.ensure_supplier_owned(user_id, request.supplier_id)
            .await?;

        let already_linked = variant_supplier::Entity::find()
            .filter(variant_supplier::Column::VariantId.eq(variant_id))
            .filter(variant_supplier::Column::SupplierId.eq(request.supplier_id))
            .count(self.db.as_ref())
            .await?
            > 0;
        if already_linked {
            return Err(ServiceError::Conflict(
                "Supplier is already linked to this variant".to_string(),
            ));
        }

        let is_primary = request.is_primary_supplier.unwrap_or(false);

        let txn = self.db.begin().await?;
        if is_primary {
            self.demote_existing_primary(&txn, variant_id).await?;
        }
        let link = variant_supplier::ActiveModel {
            user_id: Set(user_id),
            variant_id: Set(variant_id),
            supplier_id: Set(request.supplier_id),
            purchase_price: Set(request.purchase_price),
            is_primary_supplier: Set(is_primary),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        info!(link_id = link.id, variant_id, "variant supplier linked");
        Ok(link)
    }

    #[instrument(skip(self, request))]
    pub async fn update_link(
        &self,
        user_id: i32,
        link_id: i32,
        request: UpdateVariantSupplierRequest,
    ) -> Result<variant_supplier::Model, ServiceError> {
        if let Some(price) = request.purchase_price {
            if price < Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "purchase_price cannot be negative".to_string(),
                ));
            }
        }

        let link = self.find_owned(user_id, link_id).await?;
        let variant_id = link.variant_id;
        let promote = request.is_primary_supplier == Some(true) && !link.is_primary_supplier;

        let txn = self.db.begin().await?;
        if promote {
            self.demote_existing_primary(&txn, variant_id).await?;
        }
        let mut active: variant_supplier::ActiveModel = link.into();
        if let Some(price) = request.purchase_price {
            active.purchase_price = Set(price);
        }
        if let Some(is_primary) = request.is_primary_supplier {
            active.is_primary_supplier = Set(is_primary);
        }
        let link = active.update(&txn).await?;
        txn.commit().await?;

        Ok(link)
    }

    #[instrument(skip(self))]
    pub async fn delete_link(&self, user_id: i32, link_id: i32) -> Result<(), ServiceError> {
        let link = self.find_owned(user_id, link_id).await?;
        link.delete(self.db.as_ref()).await?;
        info!(link_id, "variant supplier unlinked");
        Ok(())
    }

    async fn demote_existing_primary<C>(&self, conn: &C, variant_id: i32) -> Result<(), ServiceError>
    where
        C: sea_orm::ConnectionTrait,
    {
        variant_supplier::Entity::update_many()
            .col_expr(
                variant_supplier::Column::IsPrimarySupplier,
                sea_orm::sea_query::Expr::value(false),
            )
            .filter(variant_supplier::Column::VariantId.eq(variant_id))
            .filter(variant_supplier::Column::IsPrimarySupplier.eq(true))
            .exec(conn)
            .await?;
        Ok(())
    }

    async fn find_owned(
        &self,
        user_id: i32,
        link_id: i32,
    ) -> Result<variant_supplier::Model, ServiceError> {
        variant_supplier::Entity::find_by_id(link_id)
            .filter(variant_supplier::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Variant supplier with id {} not found", link_id))
            })
    }

    async fn ensure_variant_owned(&self, user_id: i32, variant_id: i32) -> Result<(), ServiceError> {
        product_variant::Entity::find_by_id(variant_id)
            .filter(product_variant::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Variant with id {} not found", variant_id))
            })?;
        Ok(())
    }

    async fn ensure_supplier_owned(
        &self,
        user_id: i32,
        supplier_id: i32,
    ) -> Result<(), ServiceError> {
        supplier::Entity::find_by_id(supplier_id)
            .filter(supplier::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Supplier with id {} not found", supplier_id))
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn linking_requires_an_owned_variant() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<product_variant::Model>::new()])
            .into_connection();
        let service = VariantSupplierService::new(Arc::new(db));

        let request = CreateVariantSupplierRequest {
            variant_id: 10,
            supplier_id: 2,
            purchase_price: Decimal::new(450, 2),
            is_primary_supplier: None,
        };
        let err = service.create_link(1, request).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn negative_purchase_price_is_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let service = VariantSupplierService::new(Arc::new(db));

        let request = CreateVariantSupplierRequest {
            variant_id: 10,
            supplier_id: 2,
            purchase_price: Decimal::new(-1, 0),
            is_primary_supplier: None,
        };
        let err = service.create_link(1, request).await.unwrap_err();
        assert!(matches!(err, ServiceError::ValidationError(_)));
    }
}
