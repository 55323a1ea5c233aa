//! The sale posting engine: one transaction that turns an allocated cart
//! into a consistent set of records across the sale itself, the inventory
//! ledger, the cash register, and invoice numbering.
//!
//! Settlement fan-out policy: the ledger gets one cash transaction (plus
//! method join and sale payment) per line per payment, `lines x payments`
//! rows in total. This reproduces the behavior the rest of the system and
//! its reports were built against; collapsing it to one row per payment is
//! a product decision, not a refactor. Integration tests pin the fan-out.
//!
//! Ordering inside the transaction is fixed: header, then per line
//! (line row, serial deactivation, settlement rows, stock decrement,
//! history), then the invoice, then the register balance. The balance is
//! touched exactly once and last to keep the contended lock window short.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use tracing::{info, instrument};

use crate::db::DbPool;
use crate::entities::sale::SaleSource;
use crate::entities::sale_line::SerialNumbers;
use crate::entities::{
    cash_register, cash_transaction, cash_transaction_payment_method, client, inventory_history,
    invoice, product, sale, sale_line, sale_payment, serial_unit, store_inventory,
};
use crate::errors::ServiceError;
use crate::services::notifier::{self, PostSaleHook};
use crate::services::{correlative, inventory_allocation, payment_methods};

/// Currency recorded on invoices when the caller sends none.
pub const DEFAULT_CURRENCY: &str = "PEN";

/// One requested cart line.
#[derive(Debug, Clone)]
pub struct SaleLineRequest {
    pub product_id: i32,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub series: Vec<String>,
}

/// One payment covering part of the sale total.
#[derive(Debug, Clone)]
pub struct SalePaymentRequest {
    pub payment_method_id: i32,
    pub amount: Decimal,
    pub currency: String,
    pub transaction_id: Option<String>,
}

/// A line bound to the concrete stock unit that satisfies it. The
/// store-inventory row carries its pre-sale stock, re-used for the audit
/// trail; the decrement itself runs as a direct SQL subtraction.
#[derive(Debug, Clone)]
pub struct SaleAllocation {
    pub line: SaleLineRequest,
    pub store_inventory: store_inventory::Model,
}

/// Resolves the audit-narration store name for an allocation.
pub type StoreNameResolver = Box<dyn Fn(&SaleAllocation) -> String + Send + Sync>;

/// Everything the engine needs to post one sale.
pub struct PostSaleParams {
    pub user_id: i32,
    pub store_id: i32,
    pub client_id: i32,
    pub description: Option<String>,
    pub allocations: Vec<SaleAllocation>,
    pub payments: Vec<SalePaymentRequest>,
    pub document_type: Option<String>,
    pub currency_code: String,
    pub cash_register: cash_register::Model,
    pub total: Decimal,
    pub source: SaleSource,
    pub organization_id: Option<i32>,
    pub company_id: Option<i32>,
    pub store_name_resolver: StoreNameResolver,
    pub on_posted: Option<PostSaleHook>,
}

/// Posts a sale atomically and, after commit, runs the caller-supplied
/// accounting notification with bounded retries.
///
/// Every failure before commit aborts the whole unit: no partial sale,
/// stock decrement, or cash entry is ever visible. The notification hook
/// runs to completion (or exhaustion) before this returns, but its outcome
/// never affects the committed sale or the returned result.
#[instrument(
    skip(db, params),
    fields(store_id = params.store_id, user_id = params.user_id, source = %params.source)
)]
pub async fn post_sale(db: &DbPool, params: PostSaleParams) -> Result<sale::Model, ServiceError> {
    validate_payment_methods(&params.payments)?;

    let txn = db.begin().await?;
    let sale = run_posting(&txn, &params).await?;
    txn.commit().await?;

    info!(sale_id = sale.id, total = %sale.total, "sale committed");

    if let Some(hook) = &params.on_posted {
        notifier::notify_sale_posted(hook, sale.id, Utc::now()).await;
    }

    Ok(sale)
}

/// Every payment must carry a resolvable method id: a stored row (positive)
/// or a known legacy sentinel. Rejected before any durable write.
fn validate_payment_methods(payments: &[SalePaymentRequest]) -> Result<(), ServiceError> {
    for payment in payments {
        if payment.payment_method_id <= 0
            && payment_methods::legacy_method_name(payment.payment_method_id).is_none()
        {
            return Err(ServiceError::InvalidInput(format!(
                "Invalid payment method id: {}",
                payment.payment_method_id
            )));
        }
    }
    Ok(())
}

struct ResolvedLine<'a> {
    allocation: &'a SaleAllocation,
    entry_detail_id: i32,
}

async fn run_posting(
    txn: &DatabaseTransaction,
    params: &PostSaleParams,
) -> Result<sale::Model, ServiceError> {
    let now = Utc::now();

    let sale = sale::ActiveModel {
        user_id: Set(params.user_id),
        store_id: Set(params.store_id),
        client_id: Set(params.client_id),
        total: Set(params.total),
        description: Set(params.description.clone()),
        source: Set(params.source.to_string()),
        organization_id: Set(params.organization_id),
        company_id: Set(params.company_id),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(txn)
    .await?;

    // identity snapshot carried onto every ledger row
    let client = client::Entity::find_by_id(params.client_id).one(txn).await?;

    // Resolve products and lineage up front and build the settlement
    // narrative once; it is shared by all cash transactions of the sale.
    let mut narrative = String::from("Sale recorded: ");
    let mut resolved = Vec::with_capacity(params.allocations.len());
    for allocation in &params.allocations {
        let line = &allocation.line;

        let product = product::Entity::find_by_id(line.product_id)
            .one(txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("No product with ID {}", line.product_id))
            })?;

        narrative.push_str(&format!(
            "{} - quantity: {}, unit price: {}",
            product.name, line.quantity, line.unit_price
        ));
        if !line.series.is_empty() {
            narrative.push_str(&format!(", serials: {}", line.series.join(", ")));
        }
        narrative.push_str("; ");

        let entry_detail = inventory_allocation::resolve_entry_detail(
            txn,
            line.product_id,
            allocation.store_inventory.store_id,
        )
        .await?;

        resolved.push(ResolvedLine {
            allocation,
            entry_detail_id: entry_detail.id,
        });
    }

    for resolved_line in &resolved {
        let allocation = resolved_line.allocation;
        let entry_detail_id = resolved_line.entry_detail_id;
        let line = &allocation.line;
        let store_inventory = &allocation.store_inventory;

        sale_line::ActiveModel {
            sale_id: Set(sale.id),
            product_id: Set(line.product_id),
            store_inventory_id: Set(store_inventory.id),
            entry_detail_id: Set(entry_detail_id),
            quantity: Set(line.quantity),
            unit_price: Set(line.unit_price),
            series: Set(SerialNumbers(line.series.clone())),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(txn)
        .await?;

        // each serial flips active -> inactive exactly once; a missing or
        // already-consumed serial aborts the whole sale
        for serial in &line.series {
            let unit = inventory_allocation::resolve_active_serial(
                txn,
                serial,
                params.organization_id,
                line.product_id,
                store_inventory.store_id,
            )
            .await?;

            let mut unit: serial_unit::ActiveModel = unit.into();
            unit.status = Set(serial_unit::STATUS_INACTIVE.to_string());
            unit.updated_at = Set(Some(now));
            unit.update(txn).await?;
        }

        // settlement fan-out: one ledger triple per payment, per line
        for payment in &params.payments {
            let method =
                payment_methods::resolve_payment_method(txn, payment.payment_method_id).await?;

            let transaction = cash_transaction::ActiveModel {
                cash_register_id: Set(params.cash_register.id),
                transaction_type: Set(cash_transaction::TYPE_INCOME.to_string()),
                amount: Set(payment.amount),
                description: Set(format!(
                    "Sale payment via {}. {}",
                    method.name, narrative
                )),
                user_id: Set(params.user_id),
                client_name: Set(client.as_ref().map(|c| c.name.clone())),
                client_document: Set(client.as_ref().and_then(|c| c.document_number.clone())),
                client_document_type: Set(client.as_ref().and_then(|c| c.document_type.clone())),
                organization_id: Set(params.organization_id),
                created_at: Set(now),
                ..Default::default()
            }
            .insert(txn)
            .await?;

            cash_transaction_payment_method::ActiveModel {
                cash_transaction_id: Set(transaction.id),
                payment_method_id: Set(method.id),
                ..Default::default()
            }
            .insert(txn)
            .await?;

            sale_payment::ActiveModel {
                sale_id: Set(sale.id),
                payment_method_id: Set(method.id),
                amount: Set(payment.amount),
                currency: Set(payment.currency.clone()),
                transaction_id: Set(payment.transaction_id.clone()),
                cash_transaction_id: Set(transaction.id),
                created_at: Set(now),
                ..Default::default()
            }
            .insert(txn)
            .await?;
        }

        // direct SQL decrement; the pre-read stock only feeds the audit row
        store_inventory::Entity::update_many()
            .col_expr(
                store_inventory::Column::Stock,
                Expr::col(store_inventory::Column::Stock).sub(line.quantity),
            )
            .filter(store_inventory::Column::Id.eq(store_inventory.id))
            .exec(txn)
            .await?;

        inventory_history::ActiveModel {
            inventory_id: Set(store_inventory.inventory_id),
            user_id: Set(params.user_id),
            action: Set(inventory_history::ACTION_SALE.to_string()),
            description: Set(format!(
                "Sale at store {}",
                (params.store_name_resolver)(allocation)
            )),
            stock_change: Set(-line.quantity),
            previous_stock: Set(store_inventory.stock),
            new_stock: Set(store_inventory.stock - line.quantity),
            organization_id: Set(params.organization_id),
            company_id: Set(params.company_id),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(txn)
        .await?;
    }

    if correlative::requires_invoice(params.document_type.as_deref()) {
        let document_type = params.document_type.as_deref().unwrap_or_default();
        let serie = correlative::series_for_document(document_type);
        let next = correlative::next_correlative(txn, document_type).await?;

        let currency = if params.currency_code.is_empty() {
            DEFAULT_CURRENCY.to_string()
        } else {
            params.currency_code.clone()
        };

        invoice::ActiveModel {
            sale_id: Set(sale.id),
            serie: Set(serie.to_string()),
            correlative: Set(next),
            document_type: Set(document_type.to_string()),
            currency: Set(currency),
            total: Set(params.total),
            issued_at: Set(now),
            created_at: Set(now),
            updated_at: Set(Some(now)),
            ..Default::default()
        }
        .insert(txn)
        .await?;
    }

    // balance credited exactly once, after everything else succeeded
    cash_register::Entity::update_many()
        .col_expr(
            cash_register::Column::CurrentBalance,
            Expr::col(cash_register::Column::CurrentBalance).add(params.total),
        )
        .filter(cash_register::Column::Id.eq(params.cash_register.id))
        .exec(txn)
        .await?;

    Ok(sale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;

    fn payment(id: i32) -> SalePaymentRequest {
        SalePaymentRequest {
            payment_method_id: id,
            amount: dec!(10),
            currency: "PEN".to_string(),
            transaction_id: None,
        }
    }

    #[test]
    fn stored_and_sentinel_method_ids_pass_validation() {
        assert!(validate_payment_methods(&[payment(1), payment(-4)]).is_ok());
    }

    #[test]
    fn zero_and_unknown_sentinel_ids_are_rejected() {
        assert_matches!(
            validate_payment_methods(&[payment(0)]),
            Err(ServiceError::InvalidInput(_))
        );
        assert_matches!(
            validate_payment_methods(&[payment(1), payment(-7)]),
            Err(ServiceError::InvalidInput(_))
        );
    }

    #[test]
    fn empty_payment_list_passes_validation() {
        assert!(validate_payment_methods(&[]).is_ok());
    }
}
