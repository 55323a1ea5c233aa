#![allow(dead_code)]

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};

use salepoint_api::db::{self, DbConfig, DbPool};
use salepoint_api::entities::{
    cash_register, client, entry, entry_detail, inventory, product, serial_unit, store,
    store_inventory, user,
};
use salepoint_api::services::sales::{
    CreateSaleRequest, SaleLineInput, SalePaymentInput, SaleService,
};

/// In-memory SQLite with the full schema applied. A single pooled
/// connection keeps every session on the same database.
pub async fn setup_db() -> Arc<DbPool> {
    let config = DbConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
        ..Default::default()
    };
    let pool = db::establish_connection_with_config(&config)
        .await
        .expect("db connect");
    db::run_migrations(&pool).await.expect("migrations");
    Arc::new(pool)
}

pub struct SaleFixture {
    pub db: Arc<DbPool>,
    pub service: SaleService,
    pub store: store::Model,
    pub cashier: user::Model,
}

/// One store, one cashier, no tenant scoping.
pub async fn sale_fixture() -> SaleFixture {
    let db = setup_db().await;
    let store = seed_store(&db, "Central", None).await;
    let cashier = seed_user(&db, "cashier").await;
    let service = SaleService::new(db.clone(), None);
    SaleFixture {
        db,
        service,
        store,
        cashier,
    }
}

pub async fn seed_store(db: &DbPool, name: &str, organization_id: Option<i32>) -> store::Model {
    store::ActiveModel {
        name: Set(name.to_string()),
        organization_id: Set(organization_id),
        company_id: Set(None),
        created_at: Set(Utc::now()),
        updated_at: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed store")
}

pub async fn seed_user(db: &DbPool, username: &str) -> user::Model {
    user::ActiveModel {
        email: Set(format!("{}@example.com", username)),
        username: Set(username.to_string()),
        password: Set("*".to_string()),
        role: Set("SELLER".to_string()),
        created_at: Set(Utc::now()),
        updated_at: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed user")
}

pub async fn seed_client(db: &DbPool, name: &str) -> client::Model {
    client::ActiveModel {
        name: Set(name.to_string()),
        document_type: Set(Some("DNI".to_string())),
        document_number: Set(Some("12345678".to_string())),
        status: Set("Activo".to_string()),
        user_id: Set(None),
        organization_id: Set(None),
        created_at: Set(Utc::now()),
        updated_at: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed client")
}

pub struct StockedProduct {
    pub product: product::Model,
    pub store_inventory: store_inventory::Model,
    pub entry_detail: entry_detail::Model,
}

/// Product with catalog row, per-store stock bucket, and the goods entry
/// that establishes its lineage at that store.
pub async fn seed_product_with_stock(
    db: &DbPool,
    store_id: i32,
    name: &str,
    price: Decimal,
    stock: i32,
    organization_id: Option<i32>,
) -> StockedProduct {
    let now = Utc::now();

    let product = product::ActiveModel {
        name: Set(name.to_string()),
        price: Set(price),
        organization_id: Set(organization_id),
        created_at: Set(now),
        updated_at: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed product");

    let inventory = inventory::ActiveModel {
        product_id: Set(product.id),
        organization_id: Set(organization_id),
        created_at: Set(now),
        updated_at: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed inventory");

    let store_inventory = store_inventory::ActiveModel {
        store_id: Set(store_id),
        inventory_id: Set(inventory.id),
        stock: Set(stock),
        created_at: Set(now),
        updated_at: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed store inventory");

    let entry = entry::ActiveModel {
        store_id: Set(store_id),
        organization_id: Set(organization_id),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed entry");

    let entry_detail = entry_detail::ActiveModel {
        entry_id: Set(entry.id),
        product_id: Set(product.id),
        quantity: Set(stock),
        price: Set(price),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed entry detail");

    StockedProduct {
        product,
        store_inventory,
        entry_detail,
    }
}

pub async fn seed_serial(
    db: &DbPool,
    entry_detail_id: i32,
    serial: &str,
    organization_id: Option<i32>,
) -> serial_unit::Model {
    serial_unit::ActiveModel {
        entry_detail_id: Set(entry_detail_id),
        serial: Set(serial.to_string()),
        status: Set(serial_unit::STATUS_ACTIVE.to_string()),
        organization_id: Set(organization_id),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed serial")
}

pub fn line(product_id: i32, quantity: i32, unit_price: Decimal) -> SaleLineInput {
    SaleLineInput {
        product_id,
        quantity,
        unit_price,
        series: vec![],
    }
}

pub fn line_with_series(
    product_id: i32,
    quantity: i32,
    unit_price: Decimal,
    series: &[&str],
) -> SaleLineInput {
    SaleLineInput {
        product_id,
        quantity,
        unit_price,
        series: series.iter().map(|s| s.to_string()).collect(),
    }
}

/// Cash payment through the legacy sentinel id.
pub fn cash_payment(amount: Decimal) -> SalePaymentInput {
    payment_with_method(-1, amount)
}

pub fn payment_with_method(payment_method_id: i32, amount: Decimal) -> SalePaymentInput {
    SalePaymentInput {
        payment_method_id,
        amount,
        currency: "PEN".to_string(),
        transaction_id: None,
    }
}

pub fn sale_request(
    user_id: i32,
    store_id: i32,
    lines: Vec<SaleLineInput>,
    payments: Vec<SalePaymentInput>,
) -> CreateSaleRequest {
    CreateSaleRequest {
        user_id,
        store_id,
        client_id: None,
        description: None,
        lines,
        payments,
        document_type: None,
        currency_code: "PEN".to_string(),
        organization_id: None,
        company_id: None,
    }
}

pub async fn active_register(db: &DbPool, store_id: i32) -> cash_register::Model {
    cash_register::Entity::find()
        .filter(cash_register::Column::StoreId.eq(store_id))
        .filter(cash_register::Column::Status.eq(cash_register::STATUS_ACTIVE))
        .one(db)
        .await
        .expect("query register")
        .expect("active register")
}

pub async fn current_stock(db: &DbPool, store_inventory_id: i32) -> i32 {
    store_inventory::Entity::find_by_id(store_inventory_id)
        .one(db)
        .await
        .expect("query stock")
        .expect("store inventory row")
        .stock
}

pub async fn serial_status(db: &DbPool, serial_unit_id: i32) -> String {
    serial_unit::Entity::find_by_id(serial_unit_id)
        .one(db)
        .await
        .expect("query serial")
        .expect("serial row")
        .status
}
