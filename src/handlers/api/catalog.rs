use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use super::ApiJson;
use crate::{
    errors::HttpError,
    middleware::CurrentUser,
    models::{Category, NewCategory, NewProduct, Product, ProductChanges, ProductFilter},
    state::AppState,
};

pub async fn list_categories(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> Result<Json<Vec<Category>>, HttpError> {
    let categories = state.catalog.list_categories(&current_user).await?;
    Ok(Json(categories))
}

pub async fn create_category(
    State(state): State<AppState>,
    current_user: CurrentUser,
    ApiJson(req): ApiJson<NewCategory>,
) -> Result<(StatusCode, Json<Category>), HttpError> {
    let category = state.catalog.create_category(&current_user, &req).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn get_category(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(category_id): Path<Uuid>,
) -> Result<Json<Category>, HttpError> {
    let category = state.catalog.get_category(&current_user, category_id).await?;
    Ok(Json(category))
}

pub async fn update_category(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(category_id): Path<Uuid>,
    ApiJson(req): ApiJson<NewCategory>,
) -> Result<Json<Category>, HttpError> {
    let category = state
        .catalog
        .rename_category(&current_user, category_id, &req)
        .await?;
    Ok(Json(category))
}

pub async fn delete_category(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(category_id): Path<Uuid>,
) -> Result<StatusCode, HttpError> {
    state.catalog.delete_category(&current_user, category_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_products(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(filter): Query<ProductFilter>,
) -> Result<Json<Vec<Product>>, HttpError> {
    let products = state.catalog.list_products(&current_user, &filter).await?;
    Ok(Json(products))
}

pub async fn create_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    ApiJson(req): ApiJson<NewProduct>,
) -> Result<(StatusCode, Json<Product>), HttpError> {
    let product = state.catalog.create_product(&current_user, &req).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn get_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> Result<Json<Product>, HttpError> {
    let product = state.catalog.get_product(&current_user, product_id).await?;
    Ok(Json(product))
}

pub async fn update_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
    ApiJson(changes): ApiJson<ProductChanges>,
) -> Result<Json<Product>, HttpError> {
    let product = state
        .catalog
        .update_product(&current_user, product_id, &changes)
        .await?;
    Ok(Json(product))
}

pub async fn delete_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> Result<StatusCode, HttpError> {
    state.catalog.delete_product(&current_user, product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
