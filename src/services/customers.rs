//! Customer book service.
//!
//! Person names are normalized on the way in (lowercased, then first letter
//! capitalized) and emails are stored lowercased, so lookups and sorting
//! behave the same regardless of how the client typed them.

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
use crate::entities::customer;
use crate::errors::ServiceError;
use crate::pagination::PaginationMeta;
use crate::query::{resolve_sort, search_condition, ListOptions};

pub const CUSTOMER_SORT_FIELDS: &[(&str, customer::Column)] = &[
    ("first_name", customer::Column::FirstName),
    ("last_name", customer::Column::LastName),
    ("email", customer::Column::Email),
    ("created_at", customer::Column::CreatedAt),
    ("updated_at", customer::Column::UpdatedAt),
];

const CUSTOMER_SEARCH_FIELDS: [customer::Column; 4] = [
    customer::Column::FirstName,
    customer::Column::LastName,
    customer::Column::Email,
    customer::Column::Company,
];

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCustomerRequest {
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
pub struct UpdateCustomerRequest {
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
pub struct CustomerService {
    db: Arc<DatabaseConnection>,
}

impl CustomerService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self, options))]
    pub async fn list_customers(
        &self,
        user_id: i32,
        options: &ListOptions,
    ) -> Result<(Vec<customer::Model>, PaginationMeta), ServiceError> {
        let mut query = customer::Entity::find().filter(customer::Column::UserId.eq(user_id));

        if let Some(condition) =
            search_condition(options.search.as_deref(), &CUSTOMER_SEARCH_FIELDS)
        {
            query = query.filter(condition);
        }

        let total = query.clone().count(self.db.as_ref()).await?;

        let (sort_column, sort_order) = resolve_sort(
            options.sort_by.as_deref(),
            options.sort_order.as_deref(),
            CUSTOMER_SORT_FIELDS,
            customer::Column::FirstName,
        );

        let page = options.page;
        let customers = query
            .order_by(sort_column, sort_order)
            .offset(page.offset)
            .limit(page.limit)
            .all(self.db.as_ref())
            .await?;

        let meta = PaginationMeta::calculate(page.page, page.limit, total);
        Ok((customers, meta))
    }

    #[instrument(skip(self))]
    pub async fn get_customer(
        &self,
        user_id: i32,
        customer_id: i32,
    ) -> Result<customer::Model, ServiceError> {
        self.find_owned(user_id, customer_id).await
    }

    #[instrument(skip(self, request))]
    pub async fn create_customer(
        &self,
        user_id: i32,
        request: CreateCustomerRequest,
    ) -> Result<customer::Model, ServiceError> {
        let customer = customer::ActiveModel {
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

        info!(customer_id = customer.id, "customer created");
        Ok(customer)
    }

    #[instrument(skip(self, request))]
    pub async fn update_customer(
        &self,
        user_id: i32,
        customer_id: i32,
        request: UpdateCustomerRequest,
    ) -> Result<customer::Model, ServiceError> {
        let customer = self.find_owned(user_id, customer_id).await?;

        let mut active: customer::ActiveModel = customer.into();
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
    pub async fn delete_customer(
        &self,
        user_id: i32,
        customer_id: i32,
    ) -> Result<(), ServiceError> {
        let customer = self.find_owned(user_id, customer_id).await?;
        customer.delete(self.db.as_ref()).await?;
        info!(customer_id, "customer deleted");
        Ok(())
    }

    async fn find_owned(
        &self,
        user_id: i32,
        customer_id: i32,
    ) -> Result<customer::Model, ServiceError> {
        customer::Entity::find_by_id(customer_id)
            .filter(customer::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Customer with id {} not found", customer_id))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn missing_customer_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<customer::Model>::new()])
            .into_connection();
        let service = CustomerService::new(Arc::new(db));

        let err = service.get_customer(1, 55).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(msg) if msg.contains("55")));
    }

    #[test]
    fn create_request_rejects_bad_email() {
        let request = CreateCustomerRequest {
            first_name: "ada".to_string(),
            last_name: "lovelace".to_string(),
            email: "not-an-email".to_string(),
            phone: None,
            company: None,
        };
        assert!(request.validate().is_err());
    }
}
