pub mod config;
pub mod database;
pub mod errors;
pub mod filters;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod service;
pub mod state;
pub mod utils;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_cookies::CookieManagerLayer;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use state::AppState;

use handlers::api;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Public pages
        .route("/", get(handlers::auth::home))
        .route("/login", get(handlers::auth::login_page).post(handlers::auth::login))
        .route("/logout", post(handlers::auth::logout))
        // Signed-in pages
        .route("/dashboard", get(handlers::dashboard::dashboard))
        .route("/sales", get(handlers::sales::sales_page).post(handlers::sales::record_sale))
        .route("/restock", get(handlers::sales::restock_page).post(handlers::sales::record_restock))
        // Catalog management
        .route(
            "/manage/categories",
            get(handlers::inventory::manage_categories).post(handlers::inventory::create_category),
        )
        .route("/manage/categories/:id/delete", post(handlers::inventory::delete_category))
        .route(
            "/manage/products",
            get(handlers::inventory::manage_products).post(handlers::inventory::create_product),
        )
        .route("/manage/products/:id/delete", post(handlers::inventory::delete_product))
        // JSON API
        .route("/api/auth/token", post(api::users::obtain_token))
        .route("/api/users", post(api::users::create_user))
        .route(
            "/api/categories",
            get(api::catalog::list_categories).post(api::catalog::create_category),
        )
        .route(
            "/api/categories/:id",
            get(api::catalog::get_category)
                .put(api::catalog::update_category)
                .delete(api::catalog::delete_category),
        )
        .route(
            "/api/products",
            get(api::catalog::list_products).post(api::catalog::create_product),
        )
        .route(
            "/api/products/:id",
            get(api::catalog::get_product)
                .put(api::catalog::update_product)
                .delete(api::catalog::delete_product),
        )
        .route("/api/sales", get(api::stock::list_sales).post(api::stock::create_sale))
        .route("/api/restock", get(api::stock::list_restocks).post(api::stock::create_restock))
        .route("/api/transactions", get(api::stock::list_transactions))
        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CookieManagerLayer::new())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(1024 * 1024)), // 1MB
        )
        .with_state(state)
}
