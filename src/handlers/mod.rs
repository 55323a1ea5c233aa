use std::sync::Arc;

use crate::db::DbPool;
use crate::events::EventSender;
use crate::services::sales::SaleService;
use crate::services::web_sales::WebSaleService;

pub mod sales;

/// Services shared by HTTP handlers.
#[derive(Clone)]
pub struct AppServices {
    pub sales: Arc<SaleService>,
    pub web_sales: Arc<WebSaleService>,
}

impl AppServices {
    pub fn new(db: Arc<DbPool>, event_sender: EventSender, web_store_id: i32) -> Self {
        Self {
            sales: Arc::new(SaleService::new(db.clone(), Some(event_sender.clone()))),
            web_sales: Arc::new(WebSaleService::new(db, Some(event_sender), web_store_id)),
        }
    }
}
