//! Resolution of the per-store context a sale posts into: the store row,
//! its single ACTIVE cash register, and the client the sale belongs to.
//!
//! Register and walk-in provisioning happen outside the posting
//! transaction on purpose: the resolved context is reusable across many
//! sales, and each creation is idempotent at the row level.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set, SqlErr,
};
use tracing::{info, instrument};

use crate::db::DbPool;
use crate::entities::{cash_register, client, store, user};
use crate::errors::ServiceError;

const GENERIC_USERNAME: &str = "generic_user";
const GENERIC_USER_EMAIL: &str = "generic_user@example.com";
const GENERIC_USER_ROLE: &str = "CLIENT";
const GENERIC_CLIENT_NAME: &str = "Sin Cliente";
const GENERIC_CLIENT_DOCUMENT_TYPE: &str = "Sin Documento";
const CLIENT_STATUS_ACTIVE: &str = "Activo";

/// Everything the posting engine needs to know about where a sale lands.
#[derive(Debug, Clone)]
pub struct SaleContext {
    pub store: store::Model,
    pub cash_register: cash_register::Model,
    pub client_id: i32,
}

/// Resolves a tenant scope id (organization or company) against the
/// store's, rejecting a provided value that contradicts it.
pub fn resolve_scope(
    provided: Option<i32>,
    fallback: Option<i32>,
    context: &str,
) -> Result<Option<i32>, ServiceError> {
    match (provided, fallback) {
        (Some(p), Some(f)) if p != f => Err(ServiceError::ValidationError(format!(
            "The provided {} does not match the selected store",
            context
        ))),
        (Some(p), _) => Ok(Some(p)),
        (None, f) => Ok(f),
    }
}

#[instrument(skip(db))]
pub async fn resolve_sale_context(
    db: &DbPool,
    store_id: i32,
    client_id: Option<i32>,
) -> Result<SaleContext, ServiceError> {
    let store = store::Entity::find_by_id(store_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("No store with ID {}", store_id)))?;

    let cash_register = resolve_active_register(db, &store).await?;

    let client_id = match client_id {
        Some(id) => id,
        None => provision_walk_in_client(db).await?,
    };

    Ok(SaleContext {
        store,
        cash_register,
        client_id,
    })
}

/// Finds the store's ACTIVE register, creating one with zero balances if
/// the store has none yet. A register whose organization diverges from the
/// store's is corrected in place (tenant backfill for rows that predate
/// organizations).
async fn resolve_active_register<C: ConnectionTrait>(
    conn: &C,
    store: &store::Model,
) -> Result<cash_register::Model, ServiceError> {
    let existing = cash_register::Entity::find()
        .filter(cash_register::Column::StoreId.eq(store.id))
        .filter(cash_register::Column::Status.eq(cash_register::STATUS_ACTIVE))
        .one(conn)
        .await?;

    let Some(register) = existing else {
        let now = Utc::now();
        let register = cash_register::ActiveModel {
            store_id: Set(store.id),
            name: Set(format!("Main register - store {}", store.id)),
            initial_balance: Set(Decimal::ZERO),
            current_balance: Set(Decimal::ZERO),
            status: Set(cash_register::STATUS_ACTIVE.to_string()),
            organization_id: Set(store.organization_id),
            created_at: Set(now),
            updated_at: Set(Some(now)),
            ..Default::default()
        }
        .insert(conn)
        .await?;

        info!(store_id = store.id, cash_register_id = register.id, "provisioned cash register");
        return Ok(register);
    };

    if register.organization_id != store.organization_id {
        let mut model: cash_register::ActiveModel = register.into();
        model.organization_id = Set(store.organization_id);
        model.updated_at = Set(Some(Utc::now()));
        return model.update(conn).await.map_err(Into::into);
    }

    Ok(register)
}

/// Idempotent provisioning of the walk-in sentinel user/client pair, keyed
/// by well-known username and client name. Unique constraints close the
/// find-then-create race; losing the race means the row exists, so refetch.
async fn provision_walk_in_client<C: ConnectionTrait>(conn: &C) -> Result<i32, ServiceError> {
    let user = match find_generic_user(conn).await? {
        Some(user) => user,
        None => {
            let now = Utc::now();
            let inserted = user::ActiveModel {
                email: Set(GENERIC_USER_EMAIL.to_string()),
                username: Set(GENERIC_USERNAME.to_string()),
                password: Set("*".to_string()),
                role: Set(GENERIC_USER_ROLE.to_string()),
                created_at: Set(now),
                updated_at: Set(Some(now)),
                ..Default::default()
            }
            .insert(conn)
            .await;

            match inserted {
                Ok(user) => user,
                Err(err) if is_unique_violation(&err) => find_generic_user(conn)
                    .await?
                    .ok_or_else(|| walk_in_vanished("user"))?,
                Err(err) => return Err(err.into()),
            }
        }
    };

    let client = match find_generic_client(conn).await? {
        Some(client) => client,
        None => {
            let now = Utc::now();
            let inserted = client::ActiveModel {
                name: Set(GENERIC_CLIENT_NAME.to_string()),
                document_type: Set(Some(GENERIC_CLIENT_DOCUMENT_TYPE.to_string())),
                document_number: Set(None),
                status: Set(CLIENT_STATUS_ACTIVE.to_string()),
                user_id: Set(Some(user.id)),
                organization_id: Set(None),
                created_at: Set(now),
                updated_at: Set(Some(now)),
                ..Default::default()
            }
            .insert(conn)
            .await;

            match inserted {
                Ok(client) => client,
                Err(err) if is_unique_violation(&err) => find_generic_client(conn)
                    .await?
                    .ok_or_else(|| walk_in_vanished("client"))?,
                Err(err) => return Err(err.into()),
            }
        }
    };

    Ok(client.id)
}

async fn find_generic_user<C: ConnectionTrait>(
    conn: &C,
) -> Result<Option<user::Model>, ServiceError> {
    user::Entity::find()
        .filter(user::Column::Username.eq(GENERIC_USERNAME))
        .one(conn)
        .await
        .map_err(Into::into)
}

async fn find_generic_client<C: ConnectionTrait>(
    conn: &C,
) -> Result<Option<client::Model>, ServiceError> {
    client::Entity::find()
        .filter(client::Column::Name.eq(GENERIC_CLIENT_NAME))
        .one(conn)
        .await
        .map_err(Into::into)
}

fn is_unique_violation(err: &sea_orm::DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

fn walk_in_vanished(kind: &str) -> ServiceError {
    ServiceError::InternalError(format!(
        "Walk-in {} vanished after losing the bootstrap race",
        kind
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rstest::rstest;

    #[rstest]
    #[case(None, None, None)]
    #[case(None, Some(3), Some(3))]
    #[case(Some(5), None, Some(5))]
    #[case(Some(5), Some(5), Some(5))]
    fn scope_resolution(
        #[case] provided: Option<i32>,
        #[case] fallback: Option<i32>,
        #[case] expected: Option<i32>,
    ) {
        assert_eq!(
            resolve_scope(provided, fallback, "organization").unwrap(),
            expected
        );
    }

    #[test]
    fn scope_mismatch_is_rejected() {
        let err = resolve_scope(Some(1), Some(2), "organization").unwrap_err();
        assert_matches!(err, ServiceError::ValidationError(_));
    }
}
