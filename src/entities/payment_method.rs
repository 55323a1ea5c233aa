use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A way of receiving money. The unique name supports idempotent
/// bootstrap of the canonical legacy methods under concurrent writers.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payment_methods")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::sale_payment::Entity")]
    SalePayment,
    #[sea_orm(has_many = "super::cash_transaction_payment_method::Entity")]
    CashTransactionPaymentMethod,
}

impl Related<super::sale_payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SalePayment.def()
    }
}

impl Related<super::cash_transaction_payment_method::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CashTransactionPaymentMethod.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
