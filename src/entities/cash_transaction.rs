use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Ledger movement type for money received.
pub const TYPE_INCOME: &str = "INCOME";

/// One ledger movement against a cash register. Client identity is
/// snapshotted so the ledger stays meaningful if the client changes later.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cash_transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub cash_register_id: i32,
    pub transaction_type: String,
    pub amount: Decimal,
    pub description: String,
    pub user_id: i32,
    pub client_name: Option<String>,
    pub client_document: Option<String>,
    pub client_document_type: Option<String>,
    pub organization_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cash_register::Entity",
        from = "Column::CashRegisterId",
        to = "super::cash_register::Column::Id"
    )]
    CashRegister,
    #[sea_orm(has_many = "super::cash_transaction_payment_method::Entity")]
    CashTransactionPaymentMethod,
    #[sea_orm(has_many = "super::sale_payment::Entity")]
    SalePayment,
}

impl Related<super::cash_register::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CashRegister.def()
    }
}

impl Related<super::cash_transaction_payment_method::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CashTransactionPaymentMethod.def()
    }
}

impl Related<super::sale_payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SalePayment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
