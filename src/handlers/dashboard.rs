use axum::extract::State;
use askama::Template;

use crate::{
    errors::PageError,
    filters,
    middleware::{CurrentUser, PageUser},
    models::Product,
    state::AppState,
};

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    current_user: CurrentUser,
    category_count: usize,
    product_count: usize,
    low_stock: Vec<Product>,
    expired: Vec<Product>,
}

pub async fn dashboard(
    State(state): State<AppState>,
    PageUser(current_user): PageUser,
) -> Result<DashboardTemplate, PageError> {
    let summary = state.catalog.summary(&current_user).await?;

    Ok(DashboardTemplate {
        current_user,
        category_count: summary.category_count,
        product_count: summary.product_count,
        low_stock: summary.low_stock,
        expired: summary.expired,
    })
}
