mod common;

use assert_matches::assert_matches;
use rust_decimal_macros::dec;
use sea_orm::{EntityTrait, PaginatorTrait};

use salepoint_api::entities::{
    cash_transaction, cash_transaction_payment_method, inventory_history, invoice, sale,
    sale_line, sale_payment,
};
use salepoint_api::errors::ServiceError;
use salepoint_api::services::sales::SaleService;

use common::*;

#[tokio::test]
async fn reversal_restores_every_resource_the_sale_touched() {
    let fx = sale_fixture().await;
    let cameras = seed_product_with_stock(&fx.db, fx.store.id, "Camera", dec!(50), 10, None).await;
    let serial = seed_serial(&fx.db, cameras.entry_detail.id, "CAM-1", None).await;

    let mut request = sale_request(
        fx.cashier.id,
        fx.store.id,
        vec![line_with_series(cameras.product.id, 1, dec!(50), &["CAM-1"])],
        vec![cash_payment(dec!(50))],
    );
    request.document_type = Some("BOLETA".to_string());
    let receipt = fx.service.create_sale(request, None).await.expect("sale posts");

    assert_eq!(current_stock(&fx.db, cameras.store_inventory.id).await, 9);
    assert_eq!(serial_status(&fx.db, serial.id).await, "inactive");
    assert_eq!(
        active_register(&fx.db, fx.store.id).await.current_balance,
        dec!(50)
    );

    let reversed = fx
        .service
        .delete_sale(receipt.sale.id, Some(fx.cashier.id), None, None)
        .await
        .expect("sale reverses");
    assert_eq!(reversed.id, receipt.sale.id);

    // stock, serial, and balance are back where they started
    assert_eq!(current_stock(&fx.db, cameras.store_inventory.id).await, 10);
    assert_eq!(serial_status(&fx.db, serial.id).await, "active");
    assert_eq!(
        active_register(&fx.db, fx.store.id).await.current_balance,
        dec!(0)
    );

    // all sale-scoped rows are gone
    assert_eq!(sale::Entity::find().count(fx.db.as_ref()).await.unwrap(), 0);
    assert_eq!(
        sale_line::Entity::find().count(fx.db.as_ref()).await.unwrap(),
        0
    );
    assert_eq!(
        sale_payment::Entity::find().count(fx.db.as_ref()).await.unwrap(),
        0
    );
    assert_eq!(
        cash_transaction::Entity::find().count(fx.db.as_ref()).await.unwrap(),
        0
    );
    assert_eq!(
        cash_transaction_payment_method::Entity::find()
            .count(fx.db.as_ref())
            .await
            .unwrap(),
        0
    );
    assert_eq!(invoice::Entity::find().count(fx.db.as_ref()).await.unwrap(), 0);

    // the audit trail is append-only: posting and reversal both remain
    let actions: Vec<String> = inventory_history::Entity::find()
        .all(fx.db.as_ref())
        .await
        .unwrap()
        .into_iter()
        .map(|h| h.action)
        .collect();
    assert_eq!(actions.len(), 2);
    assert!(actions.contains(&"sales".to_string()));
    assert!(actions.contains(&"sale_deleted".to_string()));
}

#[tokio::test]
async fn reversal_of_unknown_sale_is_not_found() {
    let fx = sale_fixture().await;
    let err = fx.service.delete_sale(424242, None, None, None).await.unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn reversal_is_tenant_scoped() {
    let db = setup_db().await;
    let store = seed_store(&db, "Sur", Some(1)).await;
    let cashier = seed_user(&db, "cashier").await;
    let goods = seed_product_with_stock(&db, store.id, "Goods", dec!(7), 5, Some(1)).await;

    let service = SaleService::new(db.clone(), None);
    let request = sale_request(
        cashier.id,
        store.id,
        vec![line(goods.product.id, 1, dec!(7))],
        vec![cash_payment(dec!(7))],
    );
    let receipt = service.create_sale(request, None).await.expect("sale posts");
    assert_eq!(receipt.sale.organization_id, Some(1));

    // another organization cannot see or reverse the sale
    let err = service
        .delete_sale(receipt.sale.id, None, Some(2), None)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));

    // the owning organization can
    service
        .delete_sale(receipt.sale.id, None, Some(1), None)
        .await
        .expect("owning organization reverses");
    assert_eq!(current_stock(&db, goods.store_inventory.id).await, 5);
}
