use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Register status eligible to receive sale credits.
pub const STATUS_ACTIVE: &str = "ACTIVE";

/// Per-store running balance ledger. `current_balance` is credited once
/// per posted sale, debited on reversal.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cash_registers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub store_id: i32,
    pub name: String,
    pub initial_balance: Decimal,
    pub current_balance: Decimal,
    pub status: String,
    pub organization_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::store::Entity",
        from = "Column::StoreId",
        to = "super::store::Column::Id"
    )]
    Store,
    #[sea_orm(has_many = "super::cash_transaction::Entity")]
    CashTransaction,
}

impl Related<super::store::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Store.def()
    }
}

impl Related<super::cash_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CashTransaction.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
