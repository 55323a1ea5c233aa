//! Binding of requested cart lines to concrete stock units.
//!
//! Availability is checked before the posting transaction opens; lineage
//! (entry detail) and serial resolution run inside it, on the transaction
//! connection, so a stale read cannot bind a sale to stock that is gone.

use std::collections::HashMap;

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, JoinType, QueryFilter, QuerySelect, RelationTrait};

use crate::db::DbPool;
use crate::entities::{entry, entry_detail, inventory, serial_unit, store, store_inventory};
use crate::errors::ServiceError;
use crate::services::sale_posting::{SaleAllocation, SaleLineRequest};

/// Batch-allocates lines against one store: a single query loads the
/// store-inventory rows for every requested product, then each line is
/// checked for availability. The returned allocations carry the pre-sale
/// stock used later for the audit trail.
pub async fn allocate_for_store(
    db: &DbPool,
    store_id: i32,
    lines: &[SaleLineRequest],
    organization_id: Option<i32>,
) -> Result<Vec<SaleAllocation>, ServiceError> {
    let product_ids: Vec<i32> = lines.iter().map(|line| line.product_id).collect();

    let mut query = store_inventory::Entity::find()
        .find_also_related(inventory::Entity)
        .filter(store_inventory::Column::StoreId.eq(store_id))
        .filter(inventory::Column::ProductId.is_in(product_ids));
    if let Some(org) = organization_id {
        query = query.filter(inventory::Column::OrganizationId.eq(org));
    }
    let rows = query.all(db).await?;

    let by_product: HashMap<i32, store_inventory::Model> = rows
        .into_iter()
        .filter_map(|(store_inventory, inventory)| {
            inventory.map(|inv| (inv.product_id, store_inventory))
        })
        .collect();

    let mut allocations = Vec::with_capacity(lines.len());
    for line in lines {
        let store_inventory = by_product
            .get(&line.product_id)
            .filter(|si| si.stock >= line.quantity)
            .ok_or_else(|| insufficient_stock(line.product_id, store_id))?;

        allocations.push(SaleAllocation {
            line: line.clone(),
            store_inventory: store_inventory.clone(),
        });
    }

    Ok(allocations)
}

/// Web-storefront allocation: per line, the first store-inventory row with
/// sufficient stock wins, whichever store holds it. Also returns the store
/// name per allocated bucket for audit narration.
pub async fn allocate_any_store(
    db: &DbPool,
    lines: &[SaleLineRequest],
    organization_id: Option<i32>,
) -> Result<(Vec<SaleAllocation>, HashMap<i32, String>), ServiceError> {
    let mut allocations = Vec::with_capacity(lines.len());
    let mut store_names = HashMap::new();

    for line in lines {
        let mut query = store_inventory::Entity::find()
            .find_also_related(store::Entity)
            .join(JoinType::InnerJoin, store_inventory::Relation::Inventory.def())
            .filter(inventory::Column::ProductId.eq(line.product_id))
            .filter(store_inventory::Column::Stock.gte(line.quantity));
        if let Some(org) = organization_id {
            query = query.filter(inventory::Column::OrganizationId.eq(org));
        }

        let (store_inventory, store) = query
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::InsufficientStock(format!(
                    "Insufficient stock for product ID {}",
                    line.product_id
                ))
            })?;

        if let Some(store) = store {
            store_names.insert(store_inventory.id, store.name);
        }

        allocations.push(SaleAllocation {
            line: line.clone(),
            store_inventory,
        });
    }

    Ok((allocations, store_names))
}

/// The entry detail that first brought the product into the store, used as
/// cost lineage on the sale line. A product in stock without one is data
/// corruption and fails loudly.
pub async fn resolve_entry_detail<C: ConnectionTrait>(
    conn: &C,
    product_id: i32,
    store_id: i32,
) -> Result<entry_detail::Model, ServiceError> {
    entry_detail::Entity::find()
        .filter(entry_detail::Column::ProductId.eq(product_id))
        .join(JoinType::InnerJoin, entry_detail::Relation::Entry.def())
        .filter(entry::Column::StoreId.eq(store_id))
        .one(conn)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!(
                "No goods entry found for product ID {} at store {}",
                product_id, store_id
            ))
        })
}

/// Resolves one serial to its `active` unit, scoped through entry detail
/// and entry to the product, store, and organization the sale runs under.
/// A serial that is missing or already consumed resolves to nothing, which
/// aborts the whole sale upstream.
pub async fn resolve_active_serial<C: ConnectionTrait>(
    conn: &C,
    serial: &str,
    organization_id: Option<i32>,
    product_id: i32,
    store_id: i32,
) -> Result<serial_unit::Model, ServiceError> {
    let mut query = serial_unit::Entity::find()
        .filter(serial_unit::Column::Serial.eq(serial))
        .filter(serial_unit::Column::Status.eq(serial_unit::STATUS_ACTIVE))
        .join(JoinType::InnerJoin, serial_unit::Relation::EntryDetail.def())
        .filter(entry_detail::Column::ProductId.eq(product_id))
        .join(JoinType::InnerJoin, entry_detail::Relation::Entry.def())
        .filter(entry::Column::StoreId.eq(store_id));

    query = match organization_id {
        Some(org) => query.filter(serial_unit::Column::OrganizationId.eq(org)),
        None => query.filter(serial_unit::Column::OrganizationId.is_null()),
    };

    query.one(conn).await?.ok_or_else(|| {
        ServiceError::NotFound(format!(
            "Serial {} not available for product ID {} at store {}",
            serial, product_id, store_id
        ))
    })
}

fn insufficient_stock(product_id: i32, store_id: i32) -> ServiceError {
    ServiceError::InsufficientStock(format!(
        "Insufficient stock for product ID {} at store {}",
        product_id, store_id
    ))
}
