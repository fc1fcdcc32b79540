mod common;

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

use common::{spawn_app, CASHIER, MANAGER};

async fn quantity_of(app: &common::TestApp, token: &str, product_id: &str) -> i64 {
    let response = app
        .api(Method::GET, &format!("/api/products/{product_id}"), Some(token), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    response.json()["quantity"].as_i64().unwrap()
}

#[tokio::test]
async fn laptop_sale_and_restock_scenario() {
    let app = spawn_app().await;
    let laptop = app.create_product("Laptop", 10).await;
    let cashier = app.token(CASHIER).await;
    let manager = app.token(MANAGER).await;

    let sold = app
        .api(Method::POST, "/api/sales", Some(&cashier), Some(json!({ "product": laptop, "quantity": 3 })))
        .await;
    assert_eq!(sold.status, StatusCode::CREATED, "{}", sold.body);
    let sale = sold.json();
    assert_eq!(sale["product"], laptop.as_str());
    assert_eq!(sale["quantity"], 3);
    assert_eq!(sale["transaction_type"], "sale");
    assert_eq!(sale["created_by"], app.cashier.id.to_string());
    assert_eq!(quantity_of(&app, &cashier, &laptop).await, 7);

    let rejected = app
        .api(Method::POST, "/api/sales", Some(&cashier), Some(json!({ "product": laptop, "quantity": 20 })))
        .await;
    assert_eq!(rejected.status, StatusCode::BAD_REQUEST);
    assert!(rejected.json()["detail"].as_str().unwrap().starts_with("Insufficient stock"));
    assert_eq!(quantity_of(&app, &cashier, &laptop).await, 7);

    let restocked = app
        .api(Method::POST, "/api/restock", Some(&manager), Some(json!({ "product": laptop, "quantity": 5 })))
        .await;
    assert_eq!(restocked.status, StatusCode::CREATED);
    assert_eq!(restocked.json()["transaction_type"], "restock");
    assert_eq!(quantity_of(&app, &manager, &laptop).await, 12);

    // Opening restock of 10, one sale of 3, one restock of 5.
    let ledger = app
        .api(Method::GET, &format!("/api/transactions?product={laptop}"), Some(&manager), None)
        .await;
    assert_eq!(ledger.status, StatusCode::OK);
    let entries = ledger.json();
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 3);
    let balance: i64 = entries
        .iter()
        .map(|e| {
            let quantity = e["quantity"].as_i64().unwrap();
            if e["transaction_type"] == "sale" { -quantity } else { quantity }
        })
        .sum();
    assert_eq!(balance, 12);
    assert_eq!(entries[0]["transaction_type"], "restock");
    assert_eq!(entries[0]["product_name"], "Laptop");
    assert_eq!(entries[0]["created_by_username"], "manager");
}

#[tokio::test]
async fn cashier_cannot_restock_or_manage_catalog() {
    let app = spawn_app().await;
    let product = app.create_product("Mouse", 0).await;
    let cashier = app.token(CASHIER).await;

    let restock = app
        .api(Method::POST, "/api/restock", Some(&cashier), Some(json!({ "product": product, "quantity": 5 })))
        .await;
    assert_eq!(restock.status, StatusCode::FORBIDDEN);
    assert_eq!(
        restock.json()["detail"],
        "You do not have permission to perform this action."
    );
    assert_eq!(quantity_of(&app, &cashier, &product).await, 0);

    let create = app
        .api(Method::POST, "/api/categories", Some(&cashier), Some(json!({ "name": "Peripherals" })))
        .await;
    assert_eq!(create.status, StatusCode::FORBIDDEN);

    let delete = app
        .api(Method::DELETE, &format!("/api/products/{product}"), Some(&cashier), None)
        .await;
    assert_eq!(delete.status, StatusCode::FORBIDDEN);

    let users = app
        .api(
            Method::POST,
            "/api/users",
            Some(&cashier),
            Some(json!({ "username": "other", "password": "long-enough", "role": "cashier" })),
        )
        .await;
    assert_eq!(users.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn ledger_visibility_follows_role() {
    let app = spawn_app().await;
    let cashier = app.token(CASHIER).await;
    let manager = app.token(MANAGER).await;

    assert_eq!(app.api(Method::GET, "/api/sales", Some(&cashier), None).await.status, StatusCode::OK);
    assert_eq!(app.api(Method::GET, "/api/restock", Some(&cashier), None).await.status, StatusCode::FORBIDDEN);
    assert_eq!(
        app.api(Method::GET, "/api/transactions", Some(&cashier), None).await.status,
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        app.api(Method::GET, "/api/transactions?type=sale", Some(&cashier), None).await.status,
        StatusCode::OK
    );
    assert_eq!(app.api(Method::GET, "/api/transactions", Some(&manager), None).await.status, StatusCode::OK);
}

#[tokio::test]
async fn requests_without_credentials_are_unauthorized() {
    let app = spawn_app().await;

    let response = app.api(Method::GET, "/api/products", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.json()["detail"], "Authentication credentials were not provided.");

    let response = app.api(Method::GET, "/api/products", Some("not-a-token"), None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app
        .api(
            Method::POST,
            "/api/auth/token",
            None,
            Some(json!({ "username": "manager", "password": "wrong" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_bodies_are_bad_requests() {
    let app = spawn_app().await;
    let cashier = app.token(CASHIER).await;

    let request = axum::http::Request::builder()
        .method(Method::POST)
        .uri("/api/sales")
        .header("authorization", format!("Bearer {cashier}"))
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{\"product\": "))
        .unwrap();
    let response = app.send(request).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.json()["detail"].is_string());

    let response = app
        .api(Method::POST, "/api/sales", Some(&cashier), Some(json!({ "product": "abc", "quantity": 1 })))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn transaction_quantity_and_product_are_checked() {
    let app = spawn_app().await;
    let product = app.create_product("Cable", 4).await;
    let cashier = app.token(CASHIER).await;

    let zero = app
        .api(Method::POST, "/api/sales", Some(&cashier), Some(json!({ "product": product, "quantity": 0 })))
        .await;
    assert_eq!(zero.status, StatusCode::BAD_REQUEST);

    let missing = app
        .api(
            Method::POST,
            "/api/sales",
            Some(&cashier),
            Some(json!({ "product": uuid::Uuid::new_v4(), "quantity": 1 })),
        )
        .await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing.json()["detail"], "Product not found.");

    assert_eq!(quantity_of(&app, &cashier, &product).await, 4);
}

#[tokio::test]
async fn product_update_cannot_touch_quantity() {
    let app = spawn_app().await;
    let product = app.create_product("Monitor", 2).await;
    let manager = app.token(MANAGER).await;

    let rejected = app
        .api(
            Method::PUT,
            &format!("/api/products/{product}"),
            Some(&manager),
            Some(json!({ "name": "Monitor", "price": "250.00", "quantity": 99 })),
        )
        .await;
    assert_eq!(rejected.status, StatusCode::BAD_REQUEST);

    let updated = app
        .api(
            Method::PUT,
            &format!("/api/products/{product}"),
            Some(&manager),
            Some(json!({ "name": "Wide monitor", "price": "250.00" })),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK, "{}", updated.body);
    let body = updated.json();
    assert_eq!(body["name"], "Wide monitor");
    assert_eq!(body["quantity"], 2);
}

#[tokio::test]
async fn invalid_products_are_rejected() {
    let app = spawn_app().await;
    let manager = app.token(MANAGER).await;

    for body in [
        json!({ "name": "", "price": "1.00" }),
        json!({ "name": "Free", "price": "0.00" }),
        json!({ "name": "Negative", "price": "1.00", "quantity": -1 }),
        json!({ "name": "Orphan", "price": "1.00", "category": uuid::Uuid::new_v4() }),
    ] {
        let response = app.api(Method::POST, "/api/products", Some(&manager), Some(body)).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{}", response.body);
    }

    let list = app.api(Method::GET, "/api/products", Some(&manager), None).await;
    assert_eq!(list.json(), Value::Array(vec![]));
}

#[tokio::test]
async fn deleting_a_category_keeps_its_products() {
    let app = spawn_app().await;
    let manager = app.token(MANAGER).await;

    let category = app
        .api(Method::POST, "/api/categories", Some(&manager), Some(json!({ "name": "Electronics" })))
        .await;
    assert_eq!(category.status, StatusCode::CREATED);
    let category_id = category.json()["id"].as_str().unwrap().to_string();

    let duplicate = app
        .api(Method::POST, "/api/categories", Some(&manager), Some(json!({ "name": "Electronics" })))
        .await;
    assert_eq!(duplicate.status, StatusCode::BAD_REQUEST);

    let product = app
        .api(
            Method::POST,
            "/api/products",
            Some(&manager),
            Some(json!({ "name": "Tablet", "price": "300.00", "category": category_id })),
        )
        .await;
    assert_eq!(product.status, StatusCode::CREATED);
    let product_id = product.json()["id"].as_str().unwrap().to_string();

    let filtered = app
        .api(Method::GET, &format!("/api/products?category={category_id}"), Some(&manager), None)
        .await;
    assert_eq!(filtered.json().as_array().unwrap().len(), 1);

    let deleted = app
        .api(Method::DELETE, &format!("/api/categories/{category_id}"), Some(&manager), None)
        .await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let product = app
        .api(Method::GET, &format!("/api/products/{product_id}"), Some(&manager), None)
        .await;
    assert_eq!(product.status, StatusCode::OK);
    assert_eq!(product.json()["category"], Value::Null);

    let gone = app
        .api(Method::GET, &format!("/api/categories/{category_id}"), Some(&manager), None)
        .await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_a_product_removes_its_transactions() {
    let app = spawn_app().await;
    let product = app.create_product("Keyboard", 5).await;
    let manager = app.token(MANAGER).await;

    let deleted = app
        .api(Method::DELETE, &format!("/api/products/{product}"), Some(&manager), None)
        .await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let ledger = app.api(Method::GET, "/api/transactions", Some(&manager), None).await;
    assert_eq!(ledger.json(), Value::Array(vec![]));

    let missing = app
        .api(Method::GET, &format!("/api/products/{product}"), Some(&manager), None)
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.json()["detail"], "Not found.");
}

#[tokio::test]
async fn manager_creates_cashier_accounts() {
    let app = spawn_app().await;
    let manager = app.token(MANAGER).await;

    let created = app
        .api(
            Method::POST,
            "/api/users",
            Some(&manager),
            Some(json!({ "username": "till2", "password": "till2-pass", "role": "cashier" })),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED, "{}", created.body);
    let body = created.json();
    assert_eq!(body["username"], "till2");
    assert_eq!(body["role"], "cashier");
    assert!(body.get("password_hash").is_none());

    let token = app.token(("till2", "till2-pass")).await;
    let sales = app.api(Method::GET, "/api/sales", Some(&token), None).await;
    assert_eq!(sales.status, StatusCode::OK);

    let short = app
        .api(
            Method::POST,
            "/api/users",
            Some(&manager),
            Some(json!({ "username": "till3", "password": "short", "role": "cashier" })),
        )
        .await;
    assert_eq!(short.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn whitespace_only_names_are_rejected() {
    let app = spawn_app().await;
    let manager = app.token(MANAGER).await;

    let category = app
        .api(Method::POST, "/api/categories", Some(&manager), Some(json!({ "name": "   " })))
        .await;
    assert_eq!(category.status, StatusCode::BAD_REQUEST, "{}", category.body);

    let product = app
        .api(Method::POST, "/api/products", Some(&manager), Some(json!({ "name": "   ", "price": "5.00" })))
        .await;
    assert_eq!(product.status, StatusCode::BAD_REQUEST, "{}", product.body);

    let user = app
        .api(
            Method::POST,
            "/api/users",
            Some(&manager),
            Some(json!({ "username": "   ", "password": "long-enough", "role": "cashier" })),
        )
        .await;
    assert_eq!(user.status, StatusCode::BAD_REQUEST, "{}", user.body);

    let padded = app
        .api(Method::POST, "/api/products", Some(&manager), Some(json!({ "name": "  Desk  ", "price": "5.00" })))
        .await;
    assert_eq!(padded.status, StatusCode::CREATED);
    assert_eq!(padded.json()["name"], "Desk");

    let categories = app.api(Method::GET, "/api/categories", Some(&manager), None).await;
    assert_eq!(categories.json(), Value::Array(vec![]));
}
