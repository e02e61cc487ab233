//! Supplier book service. Mirrors the customer book; suppliers additionally
//! hang off purchase links (see `services::variant_suppliers`), which
//! cascade-delete with the supplier.

use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::common::{normalize_email, normalize_person_name, normalize_title};
use crate::entities::supplier;
use crate::errors::ServiceError;
use crate::pagination::PaginationMeta;
use crate::query::{resolve_sort, search_condition, ListOptions};

pub const SUPPLIER_SORT_FIELDS: &[(&str, supplier::Column)] = &[
    ("first_name", supplier::Column::FirstName),
    ("last_name", supplier::Column::LastName),
    ("email", supplier::Column::Email),
    ("created_at", supplier::Column::CreatedAt),
    ("updated_at", supplier::Column::UpdatedAt),
];

const SUPPLIER_SEARCH_FIELDS: [supplier::Column; 4] = [
    supplier::Column::FirstName,
    supplier::Column::LastName,
    supplier::Column::Email,
    supplier::Column::Company,
];

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateSupplierRequest {
    #[validate(length(min = 1, max = 255, message = "first_name must not be empty"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 255, message = "last_name must not be empty"))]
    pub last_name: String,

    #[validate(email(message = "email must be a valid address"))]
    pub email: String,

    pub phone: Option<String>,

    pub company: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateSupplierRequest {
    #[validate(length(min = 1, max = 255, message = "first_name must not be empty"))]
    pub first_name: Option<String>,

    #[validate(length(min = 1, max = 255, message = "last_name must not be empty"))]
    pub last_name: Option<String>,

    #[validate(email(message = "email must be a valid address"))]
    pub email: Option<String>,

    pub phone: Option<String>,

    pub company: Option<String>,
}

#[derive(Clone)]
pub struct SupplierService {
    db: Arc<DatabaseConnection>,
}

impl SupplierService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self, options))]
    pub async fn list_suppliers(
        &self,
        user_id: i32,
        options: &ListOptions,
    ) -> Result<(Vec<supplier::Model>, PaginationMeta), ServiceError> {
        let mut query = supplier::Entity::find().filter(supplier::Column::UserId.eq(user_id));

        if let Some(condition) =
            search_condition(options.search.as_deref(), &SUPPLIER_SEARCH_FIELDS)
        {
            query = query.filter(condition);
        }

        let total = query.clone().count(self.db.as_ref()).await?;

        let (sort_column, sort_order) = resolve_sort(
            options.sort_by.as_deref(),
            options.sort_order.as_deref(),
            SUPPLIER_SORT_FIELDS,
            supplier::Column::FirstName,
        );

        let page = options.page;
        let suppliers = query
            .order_by(sort_column, sort_order)
            .offset(page.offset)
            .limit(page.limit)
            .all(self.db.as_ref())
            .await?;

        let meta = PaginationMeta::calculate(page.page, page.limit, total);
        Ok((suppliers, meta))
    }

    #[instrument(skip(self))]
    pub async fn get_supplier(
        &self,
        user_id: i32,
        supplier_id: i32,
    ) -> Result<supplier::Model, ServiceError> {
        self.find_owned(user_id, supplier_id).await
    }

    #[instrument(skip(self, request))]
    pub async fn create_supplier(
        &self,
        user_id: i32,
        request: CreateSupplierRequest,
    ) -> Result<supplier::Model, ServiceError> {
        let supplier = supplier::ActiveModel {
            user_id: Set(user_id),
            first_name: Set(normalize_person_name(&request.first_name)),
            last_name: Set(normalize_person_name(&request.last_name)),
            email: Set(normalize_email(&request.email)),
            phone: Set(request.phone.clone()),
            company: Set(request.company.as_deref().map(normalize_title)),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await?;

        info!(supplier_id = supplier.id, "supplier created");
        Ok(supplier)
    }

    #[instrument(skip(self, request))]
    pub async fn update_supplier(
        &self,
        user_id: i32,
        supplier_id: i32,
        request: UpdateSupplierRequest,
    ) -> Result<supplier::Model, ServiceError> {
        let supplier = self.find_owned(user_id, supplier_id).await?;

        let mut active: supplier::ActiveModel = supplier.into();
        if let Some(first_name) = &request.first_name {
            active.first_name = Set(normalize_person_name(first_name));
        }
        if let Some(last_name) = &request.last_name {
            active.last_name = Set(normalize_person_name(last_name));
        }
        if let Some(email) = &request.email {
            active.email = Set(normalize_email(email));
        }
        if let Some(phone) = &request.phone {
            active.phone = Set(Some(phone.clone()));
        }
        if let Some(company) = &request.company {
            active.company = Set(Some(normalize_title(company)));
        }

        Ok(active.update(self.db.as_ref()).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_supplier(
        &self,
        user_id: i32,
        supplier_id: i32,
    ) -> Result<(), ServiceError> {
        let supplier = self.find_owned(user_id, supplier_id).await?;
        supplier.delete(self.db.as_ref()).await?;
        info!(supplier_id, "supplier deleted");
        Ok(())
    }

    async fn find_owned(
        &self,
        user_id: i32,
        supplier_id: i32,
    ) -> Result<supplier::Model, ServiceError> {
        supplier::Entity::find_by_id(supplier_id)
            .filter(supplier::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Supplier with id {} not found", supplier_id))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn missing_supplier_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<supplier::Model>::new()])
            .into_connection();
        let service = SupplierService::new(Arc::new(db));

        let err = service.get_supplier(1, 13).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(msg) if msg.contains("13")));
    }
}
