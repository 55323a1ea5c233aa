use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

/// Serial numbers consumed by a sale line, stored as a JSON array in
/// request order. Empty for non-serialized goods.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct SerialNumbers(pub Vec<String>);

impl SerialNumbers {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }
}

/// One cart line, bound to the concrete stock unit that satisfied it:
/// the store-inventory bucket that was decremented and the entry detail
/// the stock originated from.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sale_lines")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub sale_id: i32,
    pub product_id: i32,
    pub store_inventory_id: i32,
    pub entry_detail_id: i32,
    pub quantity: i32,
    pub unit_price: Decimal,
    #[sea_orm(column_type = "Json")]
    pub series: SerialNumbers,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::sale::Entity",
        from = "Column::SaleId",
        to = "super::sale::Column::Id"
    )]
    Sale,
    #[sea_orm(
        belongs_to = "super::store_inventory::Entity",
        from = "Column::StoreInventoryId",
        to = "super::store_inventory::Column::Id"
    )]
    StoreInventory,
    #[sea_orm(
        belongs_to = "super::entry_detail::Entity",
        from = "Column::EntryDetailId",
        to = "super::entry_detail::Column::Id"
    )]
    EntryDetail,
}

impl Related<super::sale::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sale.def()
    }
}

impl Related<super::store_inventory::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StoreInventory.def()
    }
}

impl Related<super::entry_detail::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EntryDetail.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
