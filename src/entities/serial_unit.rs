use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};

/// Status of a serial unit that is still sellable.
pub const STATUS_ACTIVE: &str = "active";
/// Status of a serial unit consumed by a sale.
pub const STATUS_INACTIVE: &str = "inactive";

/// An individually tracked physical item. Transitions
/// `active -> inactive` exactly once, when a sale consumes it.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "serial_units")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub entry_detail_id: i32,
    pub serial: String,
    pub status: String,
    pub organization_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::entry_detail::Entity",
        from = "Column::EntryDetailId",
        to = "super::entry_detail::Column::Id"
    )]
    EntryDetail,
}

impl Related<super::entry_detail::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EntryDetail.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C: ConnectionTrait>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;

        let now = Utc::now();

        if insert {
            active_model.created_at = Set(now);
        }

        if let ActiveValue::NotSet = active_model.updated_at {
            active_model.updated_at = Set(Some(now));
        }

        Ok(active_model)
    }
}
