//! Category service.
//!
//! Categories form a tree through `parent_id`. The cached `level` is
//! maintained here: root categories sit at level 0 and children at
//! `parent.level + 1`. Reparenting walks the ancestor chain to keep the
//! tree acyclic.

use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::common::normalize_title;
use crate::entities::category;
use crate::errors::ServiceError;
use crate::pagination::PaginationMeta;
use crate::query::{resolve_sort, search_condition, ListOptions};

pub const CATEGORY_SORT_FIELDS: &[(&str, category::Column)] = &[
    ("name", category::Column::Name),
    ("created_at", category::Column::CreatedAt),
    ("updated_at", category::Column::UpdatedAt),
];

const CATEGORY_SEARCH_FIELDS: [category::Column; 2] =
    [category::Column::Name, category::Column::Description];

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 255, message = "name must not be empty"))]
    pub name: String,

    pub description: Option<String>,

    pub parent_id: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCategoryRequest {
    #[validate(length(min = 1, max = 255, message = "name must not be empty"))]
    pub name: Option<String>,

    pub description: Option<String>,

    /// New parent; explicit `null` is not distinguished from absent, so
    /// moving a category to the root uses `parent_id: 0` by convention.
    pub parent_id: Option<i32>,
}

#[derive(Clone)]
pub struct CategoryService {
    db: Arc<DatabaseConnection>,
}

impl CategoryService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self, options))]
    pub async fn list_categories(
        &self,
        user_id: i32,
        options: &ListOptions,
    ) -> Result<(Vec<category::Model>, PaginationMeta), ServiceError> {
        let mut query = category::Entity::find().filter(category::Column::UserId.eq(user_id));

        if let Some(condition) =
            search_condition(options.search.as_deref(), &CATEGORY_SEARCH_FIELDS)
        {
            query = query.filter(condition);
        }

        let total = query.clone().count(self.db.as_ref()).await?;

        let (sort_column, sort_order) = resolve_sort(
            options.sort_by.as_deref(),
            options.sort_order.as_deref(),
            CATEGORY_SORT_FIELDS,
            category::Column::Name,
        );

        let page = options.page;
        let categories = query
            .order_by(sort_column, sort_order)
            .offset(page.offset)
            .limit(page.limit)
            .all(self.db.as_ref())
            .await?;

        let meta = PaginationMeta::calculate(page.page, page.limit, total);
        Ok((categories, meta))
    }

    #[instrument(skip(self))]
    pub async fn get_category(
        &self,
        user_id: i32,
        category_id: i32,
    ) -> Result<category::Model, ServiceError> {
        self.find_owned(user_id, category_id).await
    }

    #[instrument(skip(self, request))]
    pub async fn create_category(
        &self,
        user_id: i32,
        request: CreateCategoryRequest,
    ) -> Result<category::Model, ServiceError> {
        let level = match request.parent_id {
            Some(parent_id) => {
                let parent = self.find_owned(user_id, parent_id).await?;
                parent.level.unwrap_or(0) + 1
            }
            None => 0,
        };

        let category = category::ActiveModel {
            user_id: Set(user_id),
            name: Set(normalize_title(&request.name)),
            description: Set(request.description.clone()),
            parent_id: Set(request.parent_id),
            level: Set(Some(level)),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await?;

        info!(category_id = category.id, "category created");
        Ok(category)
    }

    #[instrument(skip(self, request))]
    pub async fn update_category(
        &self,
        user_id: i32,
        category_id: i32,
        request: UpdateCategoryRequest,
    ) -> Result<category::Model, ServiceError> {
        let category = self.find_owned(user_id, category_id).await?;

        let mut new_level = category.level;
        let mut new_parent = category.parent_id;
        if let Some(parent_id) = request.parent_id {
            if parent_id == 0 {
                new_parent = None;
                new_level = Some(0);
            } else {
                if parent_id == category_id {
                    return Err(ServiceError::InvalidOperation(
                        "A category cannot be its own parent".to_string(),
                    ));
                }
                let parent = self.find_owned(user_id, parent_id).await?;
                self.ensure_not_descendant(user_id, category_id, &parent)
                    .await?;
                new_parent = Some(parent_id);
                new_level = Some(parent.level.unwrap_or(0) + 1);
            }
        }

        let mut active: category::ActiveModel = category.into();
        if let Some(name) = &request.name {
            active.name = Set(normalize_title(name));
        }
        if let Some(description) = &request.description {
            active.description = Set(Some(description.clone()));
        }
        active.parent_id = Set(new_parent);
        active.level = Set(new_level);

        Ok(active.update(self.db.as_ref()).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_category(
        &self,
        user_id: i32,
        category_id: i32,
    ) -> Result<(), ServiceError> {
        let category = self.find_owned(user_id, category_id).await?;
        category.delete(self.db.as_ref()).await?;
        info!(category_id, "category deleted");
        Ok(())
    }

    /// Walks from `candidate_parent` up to the root and fails if
    /// `category_id` appears on the way, which would close a cycle.
    async fn ensure_not_descendant(
        &self,
        user_id: i32,
        category_id: i32,
        candidate_parent: &category::Model,
    ) -> Result<(), ServiceError> {
        let mut cursor = candidate_parent.parent_id;
        while let Some(ancestor_id) = cursor {
            if ancestor_id == category_id {
                return Err(ServiceError::InvalidOperation(
                    "Cannot move a category under one of its descendants".to_string(),
                ));
            }
            cursor = category::Entity::find_by_id(ancestor_id)
                .filter(category::Column::UserId.eq(user_id))
                .one(self.db.as_ref())
                .await?
                .and_then(|c| c.parent_id);
        }
        Ok(())
    }

    async fn find_owned(
        &self,
        user_id: i32,
        category_id: i32,
    ) -> Result<category::Model, ServiceError> {
        category::Entity::find_by_id(category_id)
            .filter(category::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Category with id {} not found", category_id))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn sample_category(id: i32, parent_id: Option<i32>, level: i32) -> category::Model {
        category::Model {
            id,
            user_id: 1,
            name: "Electronics".to_string(),
            description: None,
            parent_id,
            level: Some(level),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn category_cannot_become_its_own_parent() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![sample_category(4, None, 0)]])
            .into_connection();
        let service = CategoryService::new(Arc::new(db));

        let request = UpdateCategoryRequest {
            parent_id: Some(4),
            ..Default::default()
        };
        let err = service.update_category(1, 4, request).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidOperation(_)));
    }

    #[tokio::test]
    async fn reparenting_under_a_descendant_is_rejected() {
        // Category 1 is the root, category 2 is its child. Moving 1 under 2
        // would close a cycle.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![sample_category(1, None, 0)]])
            .append_query_results([vec![sample_category(2, Some(1), 1)]])
            .into_connection();
        let service = CategoryService::new(Arc::new(db));

        let request = UpdateCategoryRequest {
            parent_id: Some(2),
            ..Default::default()
        };
        let err = service.update_category(1, 1, request).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidOperation(_)));
    }

    #[tokio::test]
    async fn missing_category_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<category::Model>::new()])
            .into_connection();
        let service = CategoryService::new(Arc::new(db));

        let err = service.get_category(1, 77).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(msg) if msg.contains("77")));
    }
}
