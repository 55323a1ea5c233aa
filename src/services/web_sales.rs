use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{instrument, warn};
use validator::Validate;

use crate::db::DbPool;
use crate::entities::sale::SaleSource;
use crate::entities::invoice;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::notifier::PostSaleHook;
use crate::services::sale_posting::{self, PostSaleParams, SaleLineRequest, DEFAULT_CURRENCY};
use crate::services::sales::{SaleLineInput, SalePaymentInput, SaleReceipt};
use crate::services::{inventory_allocation, tenant_context};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateWebSaleRequest {
    pub user_id: i32,
    /// Absent for storefront orders; the configured web store is used.
    pub store_id: Option<i32>,
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

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

/// Web-storefront flow over the posting engine. Unlike the POS flow the
/// store is implicit and stock may be satisfied by any store that has it.
#[derive(Clone)]
pub struct WebSaleService {
    db: Arc<DbPool>,
    event_sender: Option<EventSender>,
    default_store_id: i32,
}

impl WebSaleService {
    pub fn new(db: Arc<DbPool>, event_sender: Option<EventSender>, default_store_id: i32) -> Self {
        Self {
            db,
            event_sender,
            default_store_id,
        }
    }

    #[instrument(skip(self, request, on_posted), fields(user_id = request.user_id))]
    pub async fn create_web_sale(
        &self,
        request: CreateWebSaleRequest,
        on_posted: Option<PostSaleHook>,
    ) -> Result<SaleReceipt, ServiceError> {
        request.validate()?;
        for line in &request.lines {
            line.validate()?;
        }
        for payment in &request.payments {
            payment.validate()?;
        }

        let store_id = request.store_id.unwrap_or(self.default_store_id);
        let context =
            tenant_context::resolve_sale_context(&self.db, store_id, request.client_id).await?;

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
        let (allocations, store_names) =
            inventory_allocation::allocate_any_store(&self.db, &lines, organization_id).await?;

        let total: Decimal = lines
            .iter()
            .map(|line| line.unit_price * Decimal::from(line.quantity))
            .sum();

        let sale = sale_posting::post_sale(
            &self.db,
            PostSaleParams {
                user_id: request.user_id,
                store_id,
                client_id: context.client_id,
                description: request.description.clone(),
                allocations,
                payments: request.payments.iter().map(Into::into).collect(),
                document_type: request.document_type.clone(),
                currency_code: request.currency_code.clone(),
                cash_register: context.cash_register,
                total,
                source: SaleSource::Web,
                organization_id,
                company_id,
                store_name_resolver: Box::new(move |allocation| {
                    store_names
                        .get(&allocation.store_inventory.id)
                        .cloned()
                        .unwrap_or_default()
                }),
                on_posted,
            },
        )
        .await?;

        let invoice = invoice::Entity::find()
            .filter(invoice::Column::SaleId.eq(sale.id))
            .order_by_desc(invoice::Column::CreatedAt)
            .one(&*self.db)
            .await?;

        if let Some(sender) = &self.event_sender {
            let event = Event::SalePosted {
                sale_id: sale.id,
                store_id: sale.store_id,
                total: sale.total,
                source: sale.source.clone(),
                posted_at: sale.created_at,
            };
            if let Err(err) = sender.send(event).await {
                warn!(error = %err, "failed to publish domain event");
            }
        }

        Ok(SaleReceipt { sale, invoice })
    }
}
