use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// The join between money received and the ledger entry it created.
/// `transaction_id` carries the processor reference for card/wallet
/// payments taken upstream.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sale_payments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub sale_id: i32,
    pub payment_method_id: i32,
    pub amount: Decimal,
    pub currency: String,
    pub transaction_id: Option<String>,
    pub cash_transaction_id: i32,
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
        belongs_to = "super::payment_method::Entity",
        from = "Column::PaymentMethodId",
        to = "super::payment_method::Column::Id"
    )]
    PaymentMethod,
    #[sea_orm(
        belongs_to = "super::cash_transaction::Entity",
        from = "Column::CashTransactionId",
        to = "super::cash_transaction::Column::Id"
    )]
    CashTransaction,
}

impl Related<super::sale::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sale.def()
    }
}

impl Related<super::payment_method::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PaymentMethod.def()
    }
}

impl Related<super::cash_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CashTransaction.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
