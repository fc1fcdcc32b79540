use axum::{
    extract::{Form, Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use askama::Template;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use uuid::Uuid;

use crate::{
    errors::PageError,
    filters,
    handlers::form_errors,
    middleware::{CurrentUser, PageUser},
    models::{Category, NewCategory, NewProduct, Operation, ProductDisplay, ProductFilter, DEFAULT_LOW_STOCK_THRESHOLD},
    state::AppState,
};

#[derive(Template)]
#[template(path = "inventory/categories.html")]
struct CategoriesTemplate {
    current_user: CurrentUser,
    categories: Vec<Category>,
    errors: Vec<String>,
    name: String,
}

#[derive(Template)]
#[template(path = "inventory/products.html")]
struct ProductsTemplate {
    current_user: CurrentUser,
    products: Vec<ProductDisplay>,
    categories: Vec<Category>,
    errors: Vec<String>,
    form: ProductForm,
}

#[derive(Deserialize)]
pub struct CategoryForm {
    #[serde(default)]
    name: String,
}

// HTML forms post every field as text; empty optional fields arrive as "".
#[derive(Debug, Deserialize)]
pub struct ProductForm {
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    quantity: String,
    #[serde(default)]
    price: String,
    #[serde(default)]
    expiry_date: String,
    #[serde(default)]
    low_stock_threshold: String,
}

impl Default for ProductForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            category: String::new(),
            quantity: "0".to_string(),
            price: String::new(),
            expiry_date: String::new(),
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD.to_string(),
        }
    }
}

impl ProductForm {
    fn parse(&self) -> Result<NewProduct, Vec<String>> {
        let mut errors = Vec::new();

        let optional = |s: &str| {
            let s = s.trim();
            if s.is_empty() { None } else { Some(s.to_string()) }
        };

        let category = match optional(&self.category) {
            None => None,
            Some(raw) => Uuid::parse_str(&raw)
                .map_err(|_| errors.push("Select a valid category.".to_string()))
                .ok(),
        };
        let quantity = match optional(&self.quantity) {
            None => 0,
            Some(raw) => raw.parse::<i32>().unwrap_or_else(|_| {
                errors.push("Quantity must be a whole number.".to_string());
                0
            }),
        };
        let price = Decimal::from_str(self.price.trim()).unwrap_or_else(|_| {
            errors.push("Enter a valid price.".to_string());
            Decimal::ZERO
        });
        let expiry_date = match optional(&self.expiry_date) {
            None => None,
            Some(raw) => NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                .map_err(|_| errors.push("Enter a valid expiry date.".to_string()))
                .ok(),
        };
        let low_stock_threshold = match optional(&self.low_stock_threshold) {
            None => DEFAULT_LOW_STOCK_THRESHOLD,
            Some(raw) => raw.parse::<i32>().unwrap_or_else(|_| {
                errors.push("Low stock threshold must be a whole number.".to_string());
                DEFAULT_LOW_STOCK_THRESHOLD
            }),
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(NewProduct {
            name: self.name.trim().to_string(),
            description: optional(&self.description),
            category,
            quantity,
            price,
            expiry_date,
            low_stock_threshold,
        })
    }
}

async fn render_categories(
    state: &AppState,
    current_user: CurrentUser,
    errors: Vec<String>,
    name: String,
) -> Result<Response, PageError> {
    let categories = state.catalog.list_categories(&current_user).await?;
    let status = if errors.is_empty() { StatusCode::OK } else { StatusCode::BAD_REQUEST };

    let template = CategoriesTemplate { current_user, categories, errors, name };
    Ok((status, template).into_response())
}

async fn render_products(
    state: &AppState,
    current_user: CurrentUser,
    errors: Vec<String>,
    form: ProductForm,
) -> Result<Response, PageError> {
    let categories = state.catalog.list_categories(&current_user).await?;
    let products = state
        .catalog
        .list_products(&current_user, &ProductFilter::default())
        .await?
        .into_iter()
        .map(|p| ProductDisplay::new(p, &categories))
        .collect();
    let status = if errors.is_empty() { StatusCode::OK } else { StatusCode::BAD_REQUEST };

    let template = ProductsTemplate { current_user, products, categories, errors, form };
    Ok((status, template).into_response())
}

pub async fn manage_categories(
    State(state): State<AppState>,
    PageUser(current_user): PageUser,
) -> Result<Response, PageError> {
    current_user.require(Operation::ManageCatalog)?;

    render_categories(&state, current_user, Vec::new(), String::new()).await
}

pub async fn create_category(
    State(state): State<AppState>,
    PageUser(current_user): PageUser,
    Form(form): Form<CategoryForm>,
) -> Result<Response, PageError> {
    let req = NewCategory { name: form.name.trim().to_string() };
    match state.catalog.create_category(&current_user, &req).await {
        Ok(_) => Ok(Redirect::to("/manage/categories").into_response()),
        Err(err) => {
            let errors = form_errors(err)?;
            render_categories(&state, current_user, errors, form.name).await
        }
    }
}

pub async fn delete_category(
    State(state): State<AppState>,
    PageUser(current_user): PageUser,
    Path(category_id): Path<Uuid>,
) -> Result<Redirect, PageError> {
    state.catalog.delete_category(&current_user, category_id).await?;
    Ok(Redirect::to("/manage/categories"))
}

pub async fn manage_products(
    State(state): State<AppState>,
    PageUser(current_user): PageUser,
) -> Result<Response, PageError> {
    current_user.require(Operation::ManageCatalog)?;

    render_products(&state, current_user, Vec::new(), ProductForm::default()).await
}

pub async fn create_product(
    State(state): State<AppState>,
    PageUser(current_user): PageUser,
    Form(form): Form<ProductForm>,
) -> Result<Response, PageError> {
    current_user.require(Operation::ManageCatalog)?;

    let req = match form.parse() {
        Ok(req) => req,
        Err(errors) => return render_products(&state, current_user, errors, form).await,
    };

    match state.catalog.create_product(&current_user, &req).await {
        Ok(_) => Ok(Redirect::to("/manage/products").into_response()),
        Err(err) => {
            let errors = form_errors(err)?;
            render_products(&state, current_user, errors, form).await
        }
    }
}

pub async fn delete_product(
    State(state): State<AppState>,
    PageUser(current_user): PageUser,
    Path(product_id): Path<Uuid>,
) -> Result<Redirect, PageError> {
    state.catalog.delete_product(&current_user, product_id).await?;
    Ok(Redirect::to("/manage/products"))
}
