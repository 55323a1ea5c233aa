use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Join between a ledger movement and the payment method that produced it.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cash_transaction_payment_methods")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub cash_transaction_id: i32,
    pub payment_method_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cash_transaction::Entity",
        from = "Column::CashTransactionId",
        to = "super::cash_transaction::Column::Id"
    )]
    CashTransaction,
    #[sea_orm(
        belongs_to = "super::payment_method::Entity",
        from = "Column::PaymentMethodId",
        to = "super::payment_method::Column::Id"
    )]
    PaymentMethod,
}

impl Related<super::cash_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CashTransaction.def()
    }
}

impl Related<super::payment_method::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PaymentMethod.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
