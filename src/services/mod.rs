pub mod correlative;
pub mod inventory_allocation;
pub mod notifier;
pub mod payment_methods;
pub mod sale_posting;
pub mod sales;
pub mod tenant_context;
pub mod web_sales;
