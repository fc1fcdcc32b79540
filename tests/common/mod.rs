#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use stockroom::{
    create_router,
    middleware::CurrentUser,
    models::Role,
    repository::{DynInventoryStore, MemoryStore},
    service::AuthSettings,
    AppState,
};

pub const MANAGER: (&str, &str) = ("manager", "manager-pass");
pub const CASHIER: (&str, &str) = ("cashier", "cashier-pass");

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub manager: CurrentUser,
    pub cashier: CurrentUser,
}

pub async fn spawn_app() -> TestApp {
    let store: DynInventoryStore = Arc::new(MemoryStore::new());
    let state = AppState::new(
        store,
        AuthSettings {
            jwt_secret: "test-secret".to_string(),
            token_ttl_hours: 1,
            bcrypt_cost: 4,
        },
    );

    let manager = state.auth.provision(MANAGER.0, MANAGER.1, Role::Manager).await.unwrap();
    let cashier = state.auth.provision(CASHIER.0, CASHIER.1, Role::Cashier).await.unwrap();

    TestApp {
        router: create_router(state.clone()),
        state,
        manager: manager.into(),
        cashier: cashier.into(),
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        if self.body.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&self.body).unwrap()
        }
    }

    pub fn location(&self) -> Option<&str> {
        self.headers.get(header::LOCATION).and_then(|v| v.to_str().ok())
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();

        TestResponse {
            status,
            headers,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }

    pub async fn api(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    pub async fn token(&self, (username, password): (&str, &str)) -> String {
        let response = self
            .api(
                Method::POST,
                "/api/auth/token",
                None,
                Some(serde_json::json!({ "username": username, "password": password })),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.body);
        response.json()["access"].as_str().unwrap().to_string()
    }

    /// Signs in through the login form and returns the `Cookie` header value.
    pub async fn login_cookie(&self, (username, password): (&str, &str)) -> String {
        let response = self
            .form(Method::POST, "/login", None, &format!("username={username}&password={password}"))
            .await;
        assert_eq!(response.status, StatusCode::SEE_OTHER);

        let set_cookie = response.headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }

    pub async fn form(&self, method: Method, uri: &str, cookie: Option<&str>, body: &str) -> TestResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap()).await
    }

    pub async fn page(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
        let mut builder = Request::builder().method(Method::GET).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    /// Creates a product through the API as the manager and returns its id.
    pub async fn create_product(&self, name: &str, quantity: i32) -> String {
        let token = self.token(MANAGER).await;
        let response = self
            .api(
                Method::POST,
                "/api/products",
                Some(&token),
                Some(serde_json::json!({
                    "name": name,
                    "quantity": quantity,
                    "price": "1000.00",
                })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.json()["id"].as_str().unwrap().to_string()
    }
}
