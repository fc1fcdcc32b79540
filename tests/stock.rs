mod common;

use rust_decimal::Decimal;
use stockroom::{
    errors::{RepositoryError, ServiceError},
    models::{LedgerFilter, NewProduct, TransactionKind},
    service::StockError,
};

use common::spawn_app;

fn product(name: &str, quantity: i32) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        description: None,
        category: None,
        quantity,
        price: Decimal::new(1999, 2),
        expiry_date: None,
        low_stock_threshold: 2,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_sales_never_oversell() {
    let app = spawn_app().await;
    let created = app
        .state
        .catalog
        .create_product(&app.manager, &product("Headphones", 10))
        .await
        .unwrap();

    let sales = (0..2).map(|_| {
        let stock = app.state.stock.clone();
        let cashier = app.cashier.clone();
        tokio::spawn(async move { stock.record(&cashier, created.id, 6, TransactionKind::Sale).await })
    });

    let mut succeeded = 0;
    let mut rejected = 0;
    for handle in sales.collect::<Vec<_>>() {
        match handle.await.unwrap() {
            Ok(_) => succeeded += 1,
            Err(ServiceError::Repo(RepositoryError::Stock(StockError::InsufficientStock { available, requested }))) => {
                assert_eq!((available, requested), (4, 6));
                rejected += 1;
            }
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!((succeeded, rejected), (1, 1));

    let after = app.state.catalog.get_product(&app.manager, created.id).await.unwrap();
    assert_eq!(after.quantity, 4);

    let sales = app
        .state
        .stock
        .ledger(
            &app.manager,
            &LedgerFilter {
                kind: Some(TransactionKind::Sale),
                product: Some(created.id),
            },
        )
        .await
        .unwrap();
    assert_eq!(sales.len(), 1);
}

#[tokio::test]
async fn ledger_balances_after_mixed_movements() {
    let app = spawn_app().await;
    let created = app
        .state
        .catalog
        .create_product(&app.manager, &product("Batteries", 3))
        .await
        .unwrap();

    let moves = [
        (TransactionKind::Sale, 2),
        (TransactionKind::Restock, 10),
        (TransactionKind::Sale, 12),
        (TransactionKind::Sale, 1),
        (TransactionKind::Restock, 4),
    ];
    for (kind, quantity) in moves {
        let actor = match kind {
            TransactionKind::Sale => &app.cashier,
            TransactionKind::Restock => &app.manager,
        };
        // The 12-unit sale exceeds the 11 on hand and is rejected.
        let _ = app.state.stock.record(actor, created.id, quantity, kind).await;
    }

    let product = app.state.catalog.get_product(&app.manager, created.id).await.unwrap();
    let entries = app
        .state
        .stock
        .ledger(
            &app.manager,
            &LedgerFilter {
                kind: None,
                product: Some(created.id),
            },
        )
        .await
        .unwrap();

    let balance: i32 = entries
        .iter()
        .map(|e| match e.transaction.kind {
            TransactionKind::Sale => -e.transaction.quantity,
            TransactionKind::Restock => e.transaction.quantity,
        })
        .sum();
    assert_eq!(product.quantity, 14);
    assert_eq!(balance, product.quantity);
    assert_eq!(entries.len(), 5);
}

#[tokio::test]
async fn cashier_restock_is_rejected_regardless_of_stock() {
    let app = spawn_app().await;
    let created = app
        .state
        .catalog
        .create_product(&app.manager, &product("Lamp", 0))
        .await
        .unwrap();

    let result = app
        .state
        .stock
        .record(&app.cashier, created.id, 1, TransactionKind::Restock)
        .await;
    assert!(matches!(result, Err(ServiceError::Forbidden(_))));

    let after = app.state.catalog.get_product(&app.manager, created.id).await.unwrap();
    assert_eq!(after.quantity, 0);
}
