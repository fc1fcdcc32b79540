use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use askama::Template;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    errors::PageError,
    filters,
    handlers::form_errors,
    middleware::{CurrentUser, PageUser},
    models::{LedgerEntry, LedgerFilter, Operation, Product, ProductFilter, Transaction, TransactionKind},
    state::AppState,
};

#[derive(Template)]
#[template(path = "stock/sales.html")]
struct SalesTemplate {
    current_user: CurrentUser,
    products: Vec<Product>,
    entries: Vec<LedgerEntry>,
    errors: Vec<String>,
    form: MovementForm,
}

#[derive(Template)]
#[template(path = "stock/restock.html")]
struct RestockTemplate {
    current_user: CurrentUser,
    products: Vec<Product>,
    entries: Vec<LedgerEntry>,
    errors: Vec<String>,
    form: MovementForm,
}

#[derive(Template)]
#[template(path = "stock/receipt.html")]
struct ReceiptTemplate {
    current_user: CurrentUser,
    transaction: Transaction,
    product: Product,
    total: Decimal,
}

#[derive(Debug, Default, Deserialize)]
pub struct MovementForm {
    #[serde(default)]
    product: String,
    #[serde(default)]
    quantity: String,
}

impl MovementForm {
    fn parse(&self) -> Result<(Uuid, i32), Vec<String>> {
        let mut errors = Vec::new();

        let product = Uuid::parse_str(self.product.trim())
            .map_err(|_| errors.push("Select a product.".to_string()))
            .ok();
        let quantity = self
            .quantity
            .trim()
            .parse::<i32>()
            .map_err(|_| errors.push("Quantity must be a whole number.".to_string()))
            .ok();

        match (product, quantity) {
            (Some(product), Some(quantity)) => Ok((product, quantity)),
            _ => Err(errors),
        }
    }
}

/// What a movement page needs besides the form: the selectable products
/// and the recent ledger entries of the same kind.
async fn page_data(
    state: &AppState,
    current_user: &CurrentUser,
    kind: TransactionKind,
) -> Result<(Vec<Product>, Vec<LedgerEntry>), PageError> {
    let mut products = state
        .catalog
        .list_products(current_user, &ProductFilter::default())
        .await?;
    if kind == TransactionKind::Sale {
        products.retain(|p| p.quantity > 0);
    }

    let filter = LedgerFilter {
        kind: Some(kind),
        product: None,
    };
    let entries = state.stock.ledger(current_user, &filter).await?;

    Ok((products, entries))
}

fn status_for(errors: &[String]) -> StatusCode {
    if errors.is_empty() {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    }
}

async fn render_sales(
    state: &AppState,
    current_user: CurrentUser,
    errors: Vec<String>,
    form: MovementForm,
) -> Result<Response, PageError> {
    let (products, entries) = page_data(state, &current_user, TransactionKind::Sale).await?;
    let status = status_for(&errors);

    let template = SalesTemplate { current_user, products, entries, errors, form };
    Ok((status, template).into_response())
}

async fn render_restock(
    state: &AppState,
    current_user: CurrentUser,
    errors: Vec<String>,
    form: MovementForm,
) -> Result<Response, PageError> {
    let (products, entries) = page_data(state, &current_user, TransactionKind::Restock).await?;
    let status = status_for(&errors);

    let template = RestockTemplate { current_user, products, entries, errors, form };
    Ok((status, template).into_response())
}

pub async fn sales_page(
    State(state): State<AppState>,
    PageUser(current_user): PageUser,
) -> Result<Response, PageError> {
    current_user.require(Operation::RecordSale)?;

    render_sales(&state, current_user, Vec::new(), MovementForm::default()).await
}

pub async fn record_sale(
    State(state): State<AppState>,
    PageUser(current_user): PageUser,
    Form(form): Form<MovementForm>,
) -> Result<Response, PageError> {
    current_user.require(Operation::RecordSale)?;

    let (product_id, quantity) = match form.parse() {
        Ok(parsed) => parsed,
        Err(errors) => return render_sales(&state, current_user, errors, form).await,
    };

    match state
        .stock
        .record(&current_user, product_id, quantity, TransactionKind::Sale)
        .await
    {
        Ok((transaction, product)) => {
            let total = product.price * Decimal::from(transaction.quantity);
            let template = ReceiptTemplate {
                current_user,
                transaction,
                product,
                total,
            };
            Ok(template.into_response())
        }
        Err(err) => {
            let errors = form_errors(err)?;
            render_sales(&state, current_user, errors, form).await
        }
    }
}

pub async fn restock_page(
    State(state): State<AppState>,
    PageUser(current_user): PageUser,
) -> Result<Response, PageError> {
    current_user.require(Operation::RecordRestock)?;

    render_restock(&state, current_user, Vec::new(), MovementForm::default()).await
}

pub async fn record_restock(
    State(state): State<AppState>,
    PageUser(current_user): PageUser,
    Form(form): Form<MovementForm>,
) -> Result<Response, PageError> {
    current_user.require(Operation::RecordRestock)?;

    let (product_id, quantity) = match form.parse() {
        Ok(parsed) => parsed,
        Err(errors) => return render_restock(&state, current_user, errors, form).await,
    };

    match state
        .stock
        .record(&current_user, product_id, quantity, TransactionKind::Restock)
        .await
    {
        Ok(_) => Ok(Redirect::to("/restock").into_response()),
        Err(err) => {
            let errors = form_errors(err)?;
            render_restock(&state, current_user, errors, form).await
        }
    }
}
