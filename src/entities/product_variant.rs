use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, ActiveValue::Set, ConnectionTrait};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Stock-tracking unit of a product.
///
/// Every product owns at least one variant. When the user never creates
/// variants explicitly, a single row with `is_default = true` and
/// `variant_name = "Default"` holds the product-level stock. The default
/// variant cannot be deleted on its own; it only goes away when the product
/// cascade-deletes.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = ProductVariant)]
#[sea_orm(table_name = "product_variants")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Owning tenant
    pub user_id: i32,

    pub product_id: i32,

    pub variant_name: String,

    /// Units on hand, never negative
    pub stock: i32,

    /// Added to the product's selling price; may be negative
    pub selling_price_modifier: Decimal,

    pub min_stock_alert: i32,

    pub enable_stock_alerts: bool,

    /// At most one variant per product carries this flag
    pub is_default: bool,

    /// Free-form key/value attributes, e.g. {"size": "L", "color": "red"}
    #[schema(value_type = Option<Object>)]
    pub attributes: Option<Json>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id",
        on_delete = "Cascade"
    )]
    Product,
    #[sea_orm(has_many = "super::variant_supplier::Entity")]
    VariantSuppliers,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl Related<super::variant_supplier::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VariantSuppliers.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        let now = Utc::now();
        if insert {
            if let ActiveValue::NotSet = active_model.stock {
                active_model.stock = Set(0);
            }
            if let ActiveValue::NotSet = active_model.min_stock_alert {
                active_model.min_stock_alert = Set(0);
            }
            if let ActiveValue::NotSet = active_model.enable_stock_alerts {
                active_model.enable_stock_alerts = Set(false);
            }
            if let ActiveValue::NotSet = active_model.is_default {
                active_model.is_default = Set(false);
            }
            active_model.created_at = Set(now);
        }
        active_model.updated_at = Set(now);
        Ok(active_model)
    }
}
