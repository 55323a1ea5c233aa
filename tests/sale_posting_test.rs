mod common;

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use assert_matches::assert_matches;
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};

use salepoint_api::entities::{
    cash_transaction, cash_transaction_payment_method, client, inventory_history, invoice,
    payment_method, sale, sale_line, sale_payment,
};
use salepoint_api::errors::ServiceError;
use salepoint_api::services::notifier::PostSaleHook;
use salepoint_api::services::sales::SaleService;

use common::*;

#[tokio::test]
async fn posts_sale_with_line_payment_fanout() {
    let fx = sale_fixture().await;
    let phones = seed_product_with_stock(&fx.db, fx.store.id, "Phone", dec!(25), 10, None).await;
    let cables = seed_product_with_stock(&fx.db, fx.store.id, "Cable", dec!(15), 8, None).await;

    let request = sale_request(
        fx.cashier.id,
        fx.store.id,
        vec![
            line(phones.product.id, 1, dec!(25)),
            line(cables.product.id, 2, dec!(15)),
        ],
        vec![cash_payment(dec!(30)), payment_with_method(-4, dec!(25))],
    );

    let receipt = fx.service.create_sale(request, None).await.expect("sale posts");

    assert_eq!(receipt.sale.total, dec!(55));
    assert_eq!(receipt.sale.source, "POS");
    assert!(receipt.invoice.is_none());

    // settlement fan-out: 2 lines x 2 payments = 4 ledger triples
    let transactions = cash_transaction::Entity::find()
        .count(fx.db.as_ref())
        .await
        .unwrap();
    let joins = cash_transaction_payment_method::Entity::find()
        .count(fx.db.as_ref())
        .await
        .unwrap();
    let payments = sale_payment::Entity::find()
        .count(fx.db.as_ref())
        .await
        .unwrap();
    assert_eq!(transactions, 4);
    assert_eq!(joins, 4);
    assert_eq!(payments, 4);

    // every payment resolved to the same two canonical methods
    let methods = payment_method::Entity::find()
        .all(fx.db.as_ref())
        .await
        .unwrap();
    let mut names: Vec<_> = methods.iter().map(|m| m.name.as_str()).collect();
    names.sort_unstable();
    assert_eq!(names, vec!["EN EFECTIVO", "YAPE"]);

    // stock decremented per line, with an audit row each
    assert_eq!(current_stock(&fx.db, phones.store_inventory.id).await, 9);
    assert_eq!(current_stock(&fx.db, cables.store_inventory.id).await, 6);
    let histories = inventory_history::Entity::find()
        .filter(inventory_history::Column::Action.eq("sales"))
        .all(fx.db.as_ref())
        .await
        .unwrap();
    assert_eq!(histories.len(), 2);
    assert!(histories.iter().all(|h| h.description.contains("Central")));

    // line rows carry the allocation linkage
    let lines = sale_line::Entity::find()
        .filter(sale_line::Column::SaleId.eq(receipt.sale.id))
        .all(fx.db.as_ref())
        .await
        .unwrap();
    assert_eq!(lines.len(), 2);
    assert!(lines
        .iter()
        .any(|l| l.entry_detail_id == phones.entry_detail.id
            && l.store_inventory_id == phones.store_inventory.id));

    // balance credited by the total exactly once, not once per ledger row
    let register = active_register(&fx.db, fx.store.id).await;
    assert_eq!(register.current_balance, dec!(55));
}

#[tokio::test]
async fn walk_in_client_is_provisioned_once() {
    let fx = sale_fixture().await;
    let snacks = seed_product_with_stock(&fx.db, fx.store.id, "Snack", dec!(5), 20, None).await;

    for _ in 0..2 {
        let request = sale_request(
            fx.cashier.id,
            fx.store.id,
            vec![line(snacks.product.id, 1, dec!(5))],
            vec![cash_payment(dec!(5))],
        );
        fx.service.create_sale(request, None).await.expect("sale posts");
    }

    let walk_ins = client::Entity::find()
        .filter(client::Column::Name.eq("Sin Cliente"))
        .all(fx.db.as_ref())
        .await
        .unwrap();
    assert_eq!(walk_ins.len(), 1);

    let sales = sale::Entity::find().all(fx.db.as_ref()).await.unwrap();
    assert_eq!(sales.len(), 2);
    assert!(sales.iter().all(|s| s.client_id == walk_ins[0].id));
}

#[tokio::test]
async fn invoice_correlatives_are_sequential_per_document_type() {
    let fx = sale_fixture().await;
    let books = seed_product_with_stock(&fx.db, fx.store.id, "Book", dec!(10), 30, None).await;

    for _ in 0..3 {
        let mut request = sale_request(
            fx.cashier.id,
            fx.store.id,
            vec![line(books.product.id, 1, dec!(10))],
            vec![cash_payment(dec!(10))],
        );
        request.document_type = Some("BOLETA".to_string());
        fx.service.create_sale(request, None).await.expect("sale posts");
    }

    let mut request = sale_request(
        fx.cashier.id,
        fx.store.id,
        vec![line(books.product.id, 1, dec!(10))],
        vec![cash_payment(dec!(10))],
    );
    request.document_type = Some("FACTURA".to_string());
    let factura = fx.service.create_sale(request, None).await.expect("sale posts");

    let boletas = invoice::Entity::find()
        .filter(invoice::Column::DocumentType.eq("BOLETA"))
        .order_by_asc(invoice::Column::Correlative)
        .all(fx.db.as_ref())
        .await
        .unwrap();
    let correlatives: Vec<_> = boletas.iter().map(|i| i.correlative.as_str()).collect();
    assert_eq!(correlatives, vec!["001", "002", "003"]);
    assert!(boletas.iter().all(|i| i.serie == "B001"));

    let factura_invoice = factura.invoice.expect("factura issues an invoice");
    assert_eq!(factura_invoice.serie, "F001");
    assert_eq!(factura_invoice.correlative, "001");
    assert_eq!(factura_invoice.currency, "PEN");
    assert_eq!(factura_invoice.total, dec!(10));
}

#[tokio::test]
async fn no_receipt_document_type_issues_no_invoice() {
    let fx = sale_fixture().await;
    let gums = seed_product_with_stock(&fx.db, fx.store.id, "Gum", dec!(2), 10, None).await;

    let mut request = sale_request(
        fx.cashier.id,
        fx.store.id,
        vec![line(gums.product.id, 1, dec!(2))],
        vec![cash_payment(dec!(2))],
    );
    request.document_type = Some("SIN COMPROBANTE".to_string());
    let receipt = fx.service.create_sale(request, None).await.expect("sale posts");

    assert!(receipt.invoice.is_none());
    let invoices = invoice::Entity::find().count(fx.db.as_ref()).await.unwrap();
    assert_eq!(invoices, 0);
}

#[tokio::test]
async fn sale_consumes_its_serials() {
    let fx = sale_fixture().await;
    let routers = seed_product_with_stock(&fx.db, fx.store.id, "Router", dec!(80), 5, None).await;
    let first = seed_serial(&fx.db, routers.entry_detail.id, "SN-1", None).await;
    let second = seed_serial(&fx.db, routers.entry_detail.id, "SN-2", None).await;

    let request = sale_request(
        fx.cashier.id,
        fx.store.id,
        vec![line_with_series(
            routers.product.id,
            2,
            dec!(80),
            &["SN-1", "SN-2"],
        )],
        vec![cash_payment(dec!(160))],
    );
    let receipt = fx.service.create_sale(request, None).await.expect("sale posts");

    assert_eq!(serial_status(&fx.db, first.id).await, "inactive");
    assert_eq!(serial_status(&fx.db, second.id).await, "inactive");

    let lines = sale_line::Entity::find()
        .filter(sale_line::Column::SaleId.eq(receipt.sale.id))
        .all(fx.db.as_ref())
        .await
        .unwrap();
    assert_eq!(lines[0].series.0, vec!["SN-1", "SN-2"]);
}

#[tokio::test]
async fn consumed_serial_cannot_be_sold_again() {
    let fx = sale_fixture().await;
    let laptops = seed_product_with_stock(&fx.db, fx.store.id, "Laptop", dec!(100), 5, None).await;
    seed_serial(&fx.db, laptops.entry_detail.id, "SN-9", None).await;

    let request = sale_request(
        fx.cashier.id,
        fx.store.id,
        vec![line_with_series(laptops.product.id, 1, dec!(100), &["SN-9"])],
        vec![cash_payment(dec!(100))],
    );
    fx.service.create_sale(request, None).await.expect("first sale posts");
    assert_eq!(current_stock(&fx.db, laptops.store_inventory.id).await, 4);

    let request = sale_request(
        fx.cashier.id,
        fx.store.id,
        vec![line_with_series(laptops.product.id, 1, dec!(100), &["SN-9"])],
        vec![cash_payment(dec!(100))],
    );
    let err = fx.service.create_sale(request, None).await.unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));

    // second attempt left every resource untouched
    let sales = sale::Entity::find().count(fx.db.as_ref()).await.unwrap();
    assert_eq!(sales, 1);
    assert_eq!(current_stock(&fx.db, laptops.store_inventory.id).await, 4);
    let register = active_register(&fx.db, fx.store.id).await;
    assert_eq!(register.current_balance, dec!(100));
}

#[tokio::test]
async fn missing_serial_aborts_the_whole_sale() {
    let fx = sale_fixture().await;
    let drones = seed_product_with_stock(&fx.db, fx.store.id, "Drone", dec!(200), 3, None).await;

    let request = sale_request(
        fx.cashier.id,
        fx.store.id,
        vec![line_with_series(drones.product.id, 1, dec!(200), &["GHOST"])],
        vec![cash_payment(dec!(200))],
    );
    let err = fx.service.create_sale(request, None).await.unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));

    assert_eq!(sale::Entity::find().count(fx.db.as_ref()).await.unwrap(), 0);
    assert_eq!(
        cash_transaction::Entity::find().count(fx.db.as_ref()).await.unwrap(),
        0
    );
    assert_eq!(
        inventory_history::Entity::find().count(fx.db.as_ref()).await.unwrap(),
        0
    );
    assert_eq!(current_stock(&fx.db, drones.store_inventory.id).await, 3);
    let register = active_register(&fx.db, fx.store.id).await;
    assert_eq!(register.current_balance, dec!(0));
}

#[tokio::test]
async fn unresolvable_payment_method_rolls_back_everything() {
    let fx = sale_fixture().await;
    let mice = seed_product_with_stock(&fx.db, fx.store.id, "Mouse", dec!(12), 6, None).await;

    // id 999 passes up-front validation but resolves to nothing in-transaction
    let request = sale_request(
        fx.cashier.id,
        fx.store.id,
        vec![line(mice.product.id, 1, dec!(12))],
        vec![payment_with_method(999, dec!(12))],
    );
    let err = fx.service.create_sale(request, None).await.unwrap_err();
    assert_matches!(err, ServiceError::InvalidInput(_));

    assert_eq!(sale::Entity::find().count(fx.db.as_ref()).await.unwrap(), 0);
    assert_eq!(
        sale_line::Entity::find().count(fx.db.as_ref()).await.unwrap(),
        0
    );
    assert_eq!(current_stock(&fx.db, mice.store_inventory.id).await, 6);
}

#[tokio::test]
async fn unknown_sentinel_is_rejected_before_any_write() {
    let fx = sale_fixture().await;
    let pens = seed_product_with_stock(&fx.db, fx.store.id, "Pen", dec!(3), 6, None).await;

    let request = sale_request(
        fx.cashier.id,
        fx.store.id,
        vec![line(pens.product.id, 1, dec!(3))],
        vec![payment_with_method(-7, dec!(3))],
    );
    let err = fx.service.create_sale(request, None).await.unwrap_err();
    assert_matches!(err, ServiceError::InvalidInput(_));

    assert_eq!(sale::Entity::find().count(fx.db.as_ref()).await.unwrap(), 0);
}

#[tokio::test]
async fn insufficient_stock_is_rejected_before_posting() {
    let fx = sale_fixture().await;
    let chairs = seed_product_with_stock(&fx.db, fx.store.id, "Chair", dec!(40), 2, None).await;

    let request = sale_request(
        fx.cashier.id,
        fx.store.id,
        vec![line(chairs.product.id, 3, dec!(40))],
        vec![cash_payment(dec!(120))],
    );
    let err = fx.service.create_sale(request, None).await.unwrap_err();
    assert_matches!(err, ServiceError::InsufficientStock(message) if message.contains(&chairs.product.id.to_string()));

    assert_eq!(sale::Entity::find().count(fx.db.as_ref()).await.unwrap(), 0);
    assert_eq!(current_stock(&fx.db, chairs.store_inventory.id).await, 2);
}

#[tokio::test]
async fn missing_store_is_not_found() {
    let fx = sale_fixture().await;
    let request = sale_request(fx.cashier.id, 9999, vec![line(1, 1, dec!(1))], vec![]);
    let err = fx.service.create_sale(request, None).await.unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn sentinel_payment_method_bootstrap_is_idempotent() {
    let fx = sale_fixture().await;
    let sodas = seed_product_with_stock(&fx.db, fx.store.id, "Soda", dec!(4), 20, None).await;

    for _ in 0..2 {
        let request = sale_request(
            fx.cashier.id,
            fx.store.id,
            vec![line(sodas.product.id, 1, dec!(4))],
            vec![payment_with_method(-4, dec!(4))],
        );
        fx.service.create_sale(request, None).await.expect("sale posts");
    }

    let yape_rows = payment_method::Entity::find()
        .filter(payment_method::Column::Name.eq("YAPE"))
        .count(fx.db.as_ref())
        .await
        .unwrap();
    assert_eq!(yape_rows, 1);
}

#[tokio::test]
async fn register_organization_is_backfilled_from_store() {
    let db = setup_db().await;
    let store = seed_store(&db, "Norte", Some(5)).await;
    let cashier = seed_user(&db, "cashier").await;
    let goods = seed_product_with_stock(&db, store.id, "Goods", dec!(9), 10, Some(5)).await;

    // register provisioned before the store was assigned to an organization
    use chrono::Utc;
    use sea_orm::{ActiveModelTrait, Set};
    salepoint_api::entities::cash_register::ActiveModel {
        store_id: Set(store.id),
        name: Set("Legacy register".to_string()),
        initial_balance: Set(dec!(0)),
        current_balance: Set(dec!(0)),
        status: Set("ACTIVE".to_string()),
        organization_id: Set(None),
        created_at: Set(Utc::now()),
        updated_at: Set(None),
        ..Default::default()
    }
    .insert(db.as_ref())
    .await
    .expect("seed register");

    let service = SaleService::new(db.clone(), None);
    let request = sale_request(
        cashier.id,
        store.id,
        vec![line(goods.product.id, 1, dec!(9))],
        vec![cash_payment(dec!(9))],
    );
    service.create_sale(request, None).await.expect("sale posts");

    let register = active_register(&db, store.id).await;
    assert_eq!(register.organization_id, Some(5));
    assert_eq!(register.name, "Legacy register");
}

#[tokio::test]
async fn failing_notifier_never_unposts_the_sale() {
    let fx = sale_fixture().await;
    let cakes = seed_product_with_stock(&fx.db, fx.store.id, "Cake", dec!(18), 4, None).await;

    let attempts = Arc::new(AtomicU32::new(0));
    let hook: PostSaleHook = {
        let attempts = attempts.clone();
        Arc::new(move |_, _| {
            attempts.fetch_add(1, Ordering::SeqCst);
            Box::pin(async { anyhow::bail!("journal subsystem down") })
        })
    };

    let request = sale_request(
        fx.cashier.id,
        fx.store.id,
        vec![line(cakes.product.id, 1, dec!(18))],
        vec![cash_payment(dec!(18))],
    );
    let receipt = fx
        .service
        .create_sale(request, Some(hook))
        .await
        .expect("sale posts despite notifier failures");

    assert_eq!(attempts.load(Ordering::SeqCst), 3);

    // the committed sale is retrievable as if nothing happened
    let fetched = fx
        .service
        .get_sale(receipt.sale.id, None, None)
        .await
        .expect("sale retrievable");
    assert_eq!(fetched.total, dec!(18));
}

#[tokio::test]
async fn notifier_receives_the_posted_sale_id() {
    let fx = sale_fixture().await;
    let teas = seed_product_with_stock(&fx.db, fx.store.id, "Tea", dec!(6), 4, None).await;

    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
    let hook: PostSaleHook = {
        let seen = seen.clone();
        Arc::new(move |sale_id, _| {
            seen.lock().unwrap().push(sale_id);
            Box::pin(async { Ok(()) })
        })
    };

    let request = sale_request(
        fx.cashier.id,
        fx.store.id,
        vec![line(teas.product.id, 1, dec!(6))],
        vec![cash_payment(dec!(6))],
    );
    let receipt = fx.service.create_sale(request, Some(hook)).await.expect("sale posts");

    assert_eq!(*seen.lock().unwrap(), vec![receipt.sale.id]);
}
