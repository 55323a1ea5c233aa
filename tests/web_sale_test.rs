mod common;

use rust_decimal_macros::dec;
use sea_orm::EntityTrait;

use salepoint_api::entities::inventory_history;
use salepoint_api::services::sales::{SaleLineInput, SalePaymentInput};
use salepoint_api::services::web_sales::{CreateWebSaleRequest, WebSaleService};

use common::*;

fn web_request(
    user_id: i32,
    lines: Vec<SaleLineInput>,
    payments: Vec<SalePaymentInput>,
) -> CreateWebSaleRequest {
    CreateWebSaleRequest {
        user_id,
        store_id: None,
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

#[tokio::test]
async fn web_sale_allocates_stock_from_whichever_store_has_it() {
    let db = setup_db().await;
    let web_store = seed_store(&db, "Web", None).await;
    let warehouse = seed_store(&db, "Warehouse", None).await;
    let buyer = seed_user(&db, "webuser").await;

    // stock lives only at the warehouse, not at the web store
    let speakers = seed_product_with_stock(&db, warehouse.id, "Speaker", dec!(35), 6, None).await;

    let service = WebSaleService::new(db.clone(), None, web_store.id);
    let receipt = service
        .create_web_sale(
            web_request(
                buyer.id,
                vec![line(speakers.product.id, 2, dec!(35))],
                vec![payment_with_method(-3, dec!(70))],
            ),
            None,
        )
        .await
        .expect("web sale posts");

    // the sale posts against the web store, the stock moves at the warehouse
    assert_eq!(receipt.sale.source, "WEB");
    assert_eq!(receipt.sale.store_id, web_store.id);
    assert_eq!(receipt.sale.total, dec!(70));
    assert_eq!(current_stock(&db, speakers.store_inventory.id).await, 4);

    // the audit narration names the store that surrendered the stock
    let histories = inventory_history::Entity::find()
        .all(db.as_ref())
        .await
        .unwrap();
    assert_eq!(histories.len(), 1);
    assert!(histories[0].description.contains("Warehouse"));

    // the web store's register takes the credit
    let register = active_register(&db, web_store.id).await;
    assert_eq!(register.current_balance, dec!(70));
}

#[tokio::test]
async fn web_sale_with_explicit_store_behaves_like_pos_allocation() {
    let db = setup_db().await;
    let store = seed_store(&db, "Lima", None).await;
    let buyer = seed_user(&db, "webuser").await;
    let lamps = seed_product_with_stock(&db, store.id, "Lamp", dec!(22), 3, None).await;

    let service = WebSaleService::new(db.clone(), None, store.id);
    let mut request = web_request(
        buyer.id,
        vec![line(lamps.product.id, 1, dec!(22))],
        vec![payment_with_method(-2, dec!(22))],
    );
    request.store_id = Some(store.id);

    let receipt = service.create_web_sale(request, None).await.expect("web sale posts");
    assert_eq!(receipt.sale.store_id, store.id);
    assert_eq!(current_stock(&db, lamps.store_inventory.id).await, 2);
}
