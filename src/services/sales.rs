use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use validator::{Validate, ValidationError};

use crate::db::DbPool;
use crate::entities::sale::SaleSource;
use crate::entities::{
    cash_register, cash_transaction, cash_transaction_payment_method, inventory_history, invoice,
    sale, sale_line, sale_payment, serial_unit, store, store_inventory,
};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::notifier::PostSaleHook;
use crate::services::sale_posting::{
    self, PostSaleParams, SaleLineRequest, SalePaymentRequest, DEFAULT_CURRENCY,
};
use crate::services::{inventory_allocation, tenant_context};

/// Request/response types for the sale service
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SaleLineInput {
    pub product_id: i32,
    #[validate(range(min = 1, message = "Quantity must be positive"))]
    pub quantity: i32,
    #[validate(custom = "validate_non_negative")]
    pub unit_price: Decimal,
    #[serde(default)]
    pub series: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SalePaymentInput {
    pub payment_method_id: i32,
    #[validate(custom = "validate_non_negative")]
    pub amount: Decimal,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub transaction_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateSaleRequest {
    pub user_id: i32,
    pub store_id: i32,
    pub client_id: Option<i32>,
    pub description: Option<String>,
    #[validate(length(min = 1, message = "At least one line is required"))]
    pub lines: Vec<SaleLineInput>,
    #[serde(default)]
    pub payments: Vec<SalePaymentInput>,
    pub document_type: Option<String>,
    #[serde(default = "default_currency")]
    pub currency_code: String,
    pub organization_id: Option<i32>,
    pub company_id: Option<i32>,
}

/// A posted sale plus the invoice issued for it, if any.
#[derive(Debug, Clone, Serialize)]
pub struct SaleReceipt {
    pub sale: sale::Model,
    pub invoice: Option<invoice::Model>,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() {
        return Err(ValidationError::new("negative_amount"));
    }
    Ok(())
}

impl From<&SaleLineInput> for SaleLineRequest {
    fn from(input: &SaleLineInput) -> Self {
        Self {
            product_id: input.product_id,
            quantity: input.quantity,
            unit_price: input.unit_price,
            series: input.series.clone(),
        }
    }
}

impl From<&SalePaymentInput> for SalePaymentRequest {
    fn from(input: &SalePaymentInput) -> Self {
        Self {
            payment_method_id: input.payment_method_id,
            amount: input.amount,
            currency: input.currency.clone(),
            transaction_id: input.transaction_id.clone(),
        }
    }
}

/// Point-of-sale flow over the posting engine.
#[derive(Clone)]
pub struct SaleService {
    db: Arc<DbPool>,
    event_sender: Option<EventSender>,
}

impl SaleService {
    pub fn new(db: Arc<DbPool>, event_sender: Option<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Posts a POS sale: resolves context and tenant scope, allocates
    /// stock per line, and hands the allocated cart to the posting engine.
    #[instrument(
        skip(self, request, on_posted),
        fields(store_id = request.store_id, user_id = request.user_id)
    )]
    pub async fn create_sale(
        &self,
        request: CreateSaleRequest,
        on_posted: Option<PostSaleHook>,
    ) -> Result<SaleReceipt, ServiceError> {
        request.validate()?;
        for line in &request.lines {
            line.validate()?;
        }
        for payment in &request.payments {
            payment.validate()?;
        }

        let context =
            tenant_context::resolve_sale_context(&self.db, request.store_id, request.client_id)
                .await?;

        let organization_id = tenant_context::resolve_scope(
            request.organization_id,
            context.store.organization_id,
            "organization",
        )?;
        let company_id = tenant_context::resolve_scope(
            request.company_id,
            context.store.company_id,
            "company",
        )?;

        let lines: Vec<SaleLineRequest> = request.lines.iter().map(Into::into).collect();
        let allocations = inventory_allocation::allocate_for_store(
            &self.db,
            request.store_id,
            &lines,
            organization_id,
        )
        .await?;

        let total: Decimal = lines
            .iter()
            .map(|line| line.unit_price * Decimal::from(line.quantity))
            .sum();

        let store_name = context.store.name.clone();
        let sale = sale_posting::post_sale(
            &self.db,
            PostSaleParams {
                user_id: request.user_id,
                store_id: request.store_id,
                client_id: context.client_id,
                description: request.description.clone(),
                allocations,
                payments: request.payments.iter().map(Into::into).collect(),
                document_type: request.document_type.clone(),
                currency_code: request.currency_code.clone(),
                cash_register: context.cash_register,
                total,
                source: SaleSource::Pos,
                organization_id,
                company_id,
                store_name_resolver: Box::new(move |_| store_name.clone()),
                on_posted,
            },
        )
        .await?;

        let invoice = invoice::Entity::find()
            .filter(invoice::Column::SaleId.eq(sale.id))
            .order_by_desc(invoice::Column::CreatedAt)
            .one(&*self.db)
            .await?;

        self.emit(Event::SalePosted {
            sale_id: sale.id,
            store_id: sale.store_id,
            total: sale.total,
            source: sale.source.clone(),
            posted_at: sale.created_at,
        })
        .await;
        if let Some(invoice) = &invoice {
            self.emit(Event::InvoiceIssued {
                sale_id: sale.id,
                serie: invoice.serie.clone(),
                correlative: invoice.correlative.clone(),
            })
            .await;
        }

        Ok(SaleReceipt { sale, invoice })
    }

    /// Tenant-filtered lookup of a single sale.
    #[instrument(skip(self), fields(sale_id = sale_id))]
    pub async fn get_sale(
        &self,
        sale_id: i32,
        organization_id: Option<i32>,
        company_id: Option<i32>,
    ) -> Result<sale::Model, ServiceError> {
        tenant_scoped(
            sale::Entity::find().filter(sale::Column::Id.eq(sale_id)),
            organization_id,
            company_id,
        )
        .one(&*self.db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("No sale with ID {}", sale_id)))
    }

    /// Newest-first listing for the admin surface.
    #[instrument(skip(self))]
    pub async fn list_recent_sales(
        &self,
        limit: u64,
        organization_id: Option<i32>,
        company_id: Option<i32>,
    ) -> Result<Vec<sale::Model>, ServiceError> {
        tenant_scoped(sale::Entity::find(), organization_id, company_id)
            .order_by_desc(sale::Column::CreatedAt)
            .limit(limit)
            .all(&*self.db)
            .await
            .map_err(Into::into)
    }

    /// Compensating reversal: restores stock and serial status, debits the
    /// register by every payment, and removes all sale-scoped rows, in one
    /// transaction. The posted sale is otherwise immutable.
    #[instrument(skip(self), fields(sale_id = sale_id))]
    pub async fn delete_sale(
        &self,
        sale_id: i32,
        actor_id: Option<i32>,
        organization_id: Option<i32>,
        company_id: Option<i32>,
    ) -> Result<sale::Model, ServiceError> {
        let txn = self.db.begin().await?;

        let sale = tenant_scoped(
            sale::Entity::find().filter(sale::Column::Id.eq(sale_id)),
            organization_id,
            company_id,
        )
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("No sale with ID {}", sale_id)))?;

        let store_name = store::Entity::find_by_id(sale.store_id)
            .one(&txn)
            .await?
            .map(|s| s.name)
            .unwrap_or_else(|| format!("store {}", sale.store_id));

        let lines = sale_line::Entity::find()
            .filter(sale_line::Column::SaleId.eq(sale.id))
            .all(&txn)
            .await?;

        let now = Utc::now();
        for line in &lines {
            let bucket = store_inventory::Entity::find_by_id(line.store_inventory_id)
                .one(&txn)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!(
                        "No inventory record for sale line {} (store inventory {})",
                        line.id, line.store_inventory_id
                    ))
                })?;

            store_inventory::Entity::update_many()
                .col_expr(
                    store_inventory::Column::Stock,
                    Expr::col(store_inventory::Column::Stock).add(line.quantity),
                )
                .filter(store_inventory::Column::Id.eq(bucket.id))
                .exec(&txn)
                .await?;

            inventory_history::ActiveModel {
                inventory_id: Set(bucket.inventory_id),
                user_id: Set(actor_id.unwrap_or(sale.user_id)),
                action: Set(inventory_history::ACTION_SALE_DELETED.to_string()),
                description: Set(format!("Reversal of sale {} at {}", sale.id, store_name)),
                stock_change: Set(line.quantity),
                previous_stock: Set(bucket.stock),
                new_stock: Set(bucket.stock + line.quantity),
                organization_id: Set(sale.organization_id),
                company_id: Set(sale.company_id),
                created_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?;

            if !line.series.is_empty() {
                let mut restore = serial_unit::Entity::update_many()
                    .col_expr(
                        serial_unit::Column::Status,
                        Expr::value(serial_unit::STATUS_ACTIVE),
                    )
                    .filter(serial_unit::Column::EntryDetailId.eq(line.entry_detail_id))
                    .filter(serial_unit::Column::Serial.is_in(line.series.0.clone()));
                restore = match sale.organization_id {
                    Some(org) => restore.filter(serial_unit::Column::OrganizationId.eq(org)),
                    None => restore.filter(serial_unit::Column::OrganizationId.is_null()),
                };
                restore.exec(&txn).await?;
            }
        }

        let payments = sale_payment::Entity::find()
            .filter(sale_payment::Column::SaleId.eq(sale.id))
            .all(&txn)
            .await?;
        for payment in &payments {
            let Some(transaction) =
                cash_transaction::Entity::find_by_id(payment.cash_transaction_id)
                    .one(&txn)
                    .await?
            else {
                continue;
            };

            cash_transaction_payment_method::Entity::delete_many()
                .filter(
                    cash_transaction_payment_method::Column::CashTransactionId.eq(transaction.id),
                )
                .exec(&txn)
                .await?;

            cash_register::Entity::update_many()
                .col_expr(
                    cash_register::Column::CurrentBalance,
                    Expr::col(cash_register::Column::CurrentBalance).sub(payment.amount),
                )
                .filter(cash_register::Column::Id.eq(transaction.cash_register_id))
                .exec(&txn)
                .await?;

            cash_transaction::Entity::delete_by_id(transaction.id)
                .exec(&txn)
                .await?;
        }

        sale_payment::Entity::delete_many()
            .filter(sale_payment::Column::SaleId.eq(sale.id))
            .exec(&txn)
            .await?;
        invoice::Entity::delete_many()
            .filter(invoice::Column::SaleId.eq(sale.id))
            .exec(&txn)
            .await?;
        sale_line::Entity::delete_many()
            .filter(sale_line::Column::SaleId.eq(sale.id))
            .exec(&txn)
            .await?;
        sale::Entity::delete_by_id(sale.id).exec(&txn).await?;

        txn.commit().await?;

        info!(sale_id = sale.id, "sale reversed and removed");

        self.emit(Event::SaleReversed {
            sale_id: sale.id,
            store_id: sale.store_id,
            total: sale.total,
        })
        .await;

        Ok(sale)
    }

    async fn emit(&self, event: Event) {
        if let Some(sender) = &self.event_sender {
            if let Err(err) = sender.send(event).await {
                warn!(error = %err, "failed to publish domain event");
            }
        }
    }
}

fn tenant_scoped(
    mut query: Select<sale::Entity>,
    organization_id: Option<i32>,
    company_id: Option<i32>,
) -> Select<sale::Entity> {
    if let Some(org) = organization_id {
        query = query.filter(sale::Column::OrganizationId.eq(org));
    }
    if let Some(company) = company_id {
        query = query.filter(sale::Column::CompanyId.eq(company));
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn valid_request() -> CreateSaleRequest {
        CreateSaleRequest {
            user_id: 1,
            store_id: 1,
            client_id: None,
            description: None,
            lines: vec![SaleLineInput {
                product_id: 100,
                quantity: 1,
                unit_price: dec!(25),
                series: vec![],
            }],
            payments: vec![SalePaymentInput {
                payment_method_id: -1,
                amount: dec!(25),
                currency: "PEN".to_string(),
                transaction_id: None,
            }],
            document_type: None,
            currency_code: "PEN".to_string(),
            organization_id: None,
            company_id: None,
        }
    }

    #[test]
    fn request_without_lines_fails_validation() {
        let mut request = valid_request();
        request.lines.clear();
        assert!(request.validate().is_err());
    }

    #[test]
    fn line_with_zero_quantity_fails_validation() {
        let mut request = valid_request();
        request.lines[0].quantity = 0;
        assert!(request.lines[0].validate().is_err());
    }

    #[test]
    fn negative_unit_price_fails_validation() {
        let mut request = valid_request();
        request.lines[0].unit_price = dec!(-1);
        assert!(request.lines[0].validate().is_err());
    }

    #[test]
    fn valid_request_passes_validation() {
        let request = valid_request();
        assert!(request.validate().is_ok());
        assert!(request.lines[0].validate().is_ok());
        assert!(request.payments[0].validate().is_ok());
    }
}
