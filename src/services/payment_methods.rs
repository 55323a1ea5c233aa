//! Payment-method resolution, including the legacy sentinel ids.
//!
//! Legacy POS clients address the canonical methods with small negative
//! ids instead of real rows. Those resolve-or-create by exact name; the
//! unique name constraint plus refetch-on-conflict makes concurrent
//! first-time references converge on a single row.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set, SqlErr};

use crate::entities::payment_method;
use crate::errors::ServiceError;

/// Canonical names for the legacy sentinel ids. Names must match exactly:
/// downstream reporting groups ledger lines by method name.
const LEGACY_SENTINEL_METHODS: [(i32, &str); 6] = [
    (-1, "EN EFECTIVO"),
    (-2, "TRANSFERENCIA"),
    (-3, "PAGO CON VISA"),
    (-4, "YAPE"),
    (-5, "PLIN"),
    (-6, "OTRO MEDIO DE PAGO"),
];

/// Canonical method name for a legacy sentinel id, if the id is one.
pub fn legacy_method_name(payment_method_id: i32) -> Option<&'static str> {
    LEGACY_SENTINEL_METHODS
        .iter()
        .find(|(sentinel, _)| *sentinel == payment_method_id)
        .map(|(_, name)| *name)
}

/// Resolves a payment method by id, falling back to sentinel bootstrap.
/// Ids that are neither stored rows nor known sentinels are invalid input.
pub async fn resolve_payment_method<C: ConnectionTrait>(
    conn: &C,
    payment_method_id: i32,
) -> Result<payment_method::Model, ServiceError> {
    if let Some(method) = payment_method::Entity::find_by_id(payment_method_id)
        .one(conn)
        .await?
    {
        return Ok(method);
    }

    let name = legacy_method_name(payment_method_id).ok_or_else(|| {
        ServiceError::InvalidInput(format!(
            "Unknown payment method id: {}",
            payment_method_id
        ))
    })?;

    find_or_create_by_name(conn, name).await
}

/// Find-by-name before create; a unique-name violation means another
/// writer created the row first, so refetch instead of failing the sale.
async fn find_or_create_by_name<C: ConnectionTrait>(
    conn: &C,
    name: &str,
) -> Result<payment_method::Model, ServiceError> {
    if let Some(method) = find_by_name(conn, name).await? {
        return Ok(method);
    }

    let now = Utc::now();
    let inserted = payment_method::ActiveModel {
        name: Set(name.to_string()),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(Some(now)),
        ..Default::default()
    }
    .insert(conn)
    .await;

    match inserted {
        Ok(method) => Ok(method),
        Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            find_by_name(conn, name).await?.ok_or_else(|| {
                ServiceError::InternalError(format!(
                    "Payment method '{}' vanished after losing the bootstrap race",
                    name
                ))
            })
        }
        Err(err) => Err(err.into()),
    }
}

async fn find_by_name<C: ConnectionTrait>(
    conn: &C,
    name: &str,
) -> Result<Option<payment_method::Model>, ServiceError> {
    payment_method::Entity::find()
        .filter(payment_method::Column::Name.eq(name))
        .one(conn)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(-1, "EN EFECTIVO")]
    #[test_case(-2, "TRANSFERENCIA")]
    #[test_case(-3, "PAGO CON VISA")]
    #[test_case(-4, "YAPE")]
    #[test_case(-5, "PLIN")]
    #[test_case(-6, "OTRO MEDIO DE PAGO")]
    fn sentinel_ids_map_to_canonical_names(id: i32, expected: &str) {
        assert_eq!(legacy_method_name(id), Some(expected));
    }

    #[test_case(0)]
    #[test_case(-7)]
    #[test_case(1)]
    #[test_case(i32::MIN)]
    fn non_sentinel_ids_do_not_resolve(id: i32) {
        assert_eq!(legacy_method_name(id), None);
    }
}
