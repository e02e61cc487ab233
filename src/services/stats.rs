//! Dashboard counters.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, IntoSimpleExpr, PaginatorTrait,
    QueryFilter,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;

use crate::entities::{customer, product, product_variant, supplier};
use crate::errors::ServiceError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryStats {
    pub total_products: u64,
    /// Alert-enabled variants with stock left but at or below the threshold
    pub low_stock_alerts: u64,
    pub out_of_stock_variants: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgendaStats {
    pub total_suppliers: u64,
    pub total_customers: u64,
}

/// A variant is low on stock when alerts are on, it still has units left and
/// the count sits at or below the threshold. Depleted variants belong to the
/// out-of-stock figure only.
fn low_stock_condition() -> Condition {
    Condition::all()
        .add(product_variant::Column::EnableStockAlerts.eq(true))
        .add(product_variant::Column::Stock.gt(0))
        .add(
            Expr::expr(product_variant::Column::Stock.into_simple_expr())
                .lte(product_variant::Column::MinStockAlert.into_simple_expr()),
        )
}

#[derive(Clone)]
pub struct StatsService {
    db: Arc<DatabaseConnection>,
}

impl StatsService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn inventory_stats(&self, user_id: i32) -> Result<InventoryStats, ServiceError> {
        let total_products = product::Entity::find()
            .filter(ColumnTrait::eq(&product::Column::UserId, user_id))
            .count(self.db.as_ref())
            .await?;

        let low_stock_alerts = product_variant::Entity::find()
            .filter(product_variant::Column::UserId.eq(user_id))
            .filter(low_stock_condition())
            .count(self.db.as_ref())
            .await?;

        let out_of_stock_variants = product_variant::Entity::find()
            .filter(product_variant::Column::UserId.eq(user_id))
            .filter(product_variant::Column::Stock.eq(0))
            .count(self.db.as_ref())
            .await?;

        Ok(InventoryStats {
            total_products,
            low_stock_alerts,
            out_of_stock_variants,
        })
    }

    #[instrument(skip(self))]
    pub async fn agenda_stats(&self, user_id: i32) -> Result<AgendaStats, ServiceError> {
        let total_suppliers = supplier::Entity::find()
            .filter(supplier::Column::UserId.eq(user_id))
            .count(self.db.as_ref())
            .await?;

        let total_customers = customer::Entity::find()
            .filter(customer::Column::UserId.eq(user_id))
            .count(self.db.as_ref())
            .await?;

        Ok(AgendaStats {
            total_suppliers,
            total_customers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, QueryTrait};

    #[test]
    fn low_stock_filter_skips_depleted_variants() {
        let sql = product_variant::Entity::find()
            .filter(low_stock_condition())
            .build(DatabaseBackend::Postgres)
            .to_string();
        assert!(sql.contains(r#""stock" > 0"#), "{sql}");
        assert!(sql.contains(r#""min_stock_alert""#), "{sql}");
    }

    #[test]
    fn stats_serialize_with_camel_case_keys() {
        let stats = InventoryStats {
            total_products: 12,
            low_stock_alerts: 3,
            out_of_stock_variants: 1,
        };
        let value = serde_json::to_value(&stats).unwrap();
        assert_eq!(value["totalProducts"], 12);
        assert_eq!(value["lowStockAlerts"], 3);
        assert_eq!(value["outOfStockVariants"], 1);
    }
}
