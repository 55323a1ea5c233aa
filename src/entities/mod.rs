//! SeaORM entities for the retail schema.
//!
//! Primary keys are signed auto-increment integers for wire compatibility
//! with the legacy system (legacy clients address payment methods by small
//! negative sentinel ids).

pub mod cash_register;
pub mod cash_transaction;
pub mod cash_transaction_payment_method;
pub mod client;
pub mod entry;
pub mod entry_detail;
pub mod inventory;
pub mod inventory_history;
pub mod invoice;
pub mod payment_method;
pub mod product;
pub mod sale;
pub mod sale_line;
pub mod sale_payment;
pub mod serial_unit;
pub mod store;
pub mod store_inventory;
pub mod user;
