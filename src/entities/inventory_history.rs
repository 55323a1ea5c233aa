use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Stock movement recorded by a posted sale.
pub const ACTION_SALE: &str = "sales";
/// Stock movement recorded when a sale is reversed.
pub const ACTION_SALE_DELETED: &str = "sale_deleted";

/// Append-only stock movement audit. Rows are never updated or deleted.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory_histories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub inventory_id: i32,
    pub user_id: i32,
    pub action: String,
    pub description: String,
    pub stock_change: i32,
    pub previous_stock: i32,
    pub new_stock: i32,
    pub organization_id: Option<i32>,
    pub company_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::inventory::Entity",
        from = "Column::InventoryId",
        to = "super::inventory::Column::Id"
    )]
    Inventory,
}

impl Related<super::inventory::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Inventory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
