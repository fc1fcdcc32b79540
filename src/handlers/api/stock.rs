use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use super::ApiJson;
use crate::{
    errors::HttpError,
    middleware::CurrentUser,
    models::{LedgerEntry, LedgerFilter, Transaction, TransactionKind},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct MovementRequest {
    pub product: Uuid,
    pub quantity: i32,
}

async fn record(
    state: &AppState,
    current_user: &CurrentUser,
    req: MovementRequest,
    kind: TransactionKind,
) -> Result<(StatusCode, Json<Transaction>), HttpError> {
    let (transaction, _) = state
        .stock
        .record(current_user, req.product, req.quantity, kind)
        .await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

async fn ledger_of(
    state: &AppState,
    current_user: &CurrentUser,
    kind: TransactionKind,
) -> Result<Json<Vec<LedgerEntry>>, HttpError> {
    let filter = LedgerFilter {
        kind: Some(kind),
        product: None,
    };
    let entries = state.stock.ledger(current_user, &filter).await?;
    Ok(Json(entries))
}

pub async fn list_sales(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> Result<Json<Vec<LedgerEntry>>, HttpError> {
    ledger_of(&state, &current_user, TransactionKind::Sale).await
}

pub async fn create_sale(
    State(state): State<AppState>,
    current_user: CurrentUser,
    ApiJson(req): ApiJson<MovementRequest>,
) -> Result<(StatusCode, Json<Transaction>), HttpError> {
    record(&state, &current_user, req, TransactionKind::Sale).await
}

pub async fn list_restocks(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> Result<Json<Vec<LedgerEntry>>, HttpError> {
    ledger_of(&state, &current_user, TransactionKind::Restock).await
}

pub async fn create_restock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    ApiJson(req): ApiJson<MovementRequest>,
) -> Result<(StatusCode, Json<Transaction>), HttpError> {
    record(&state, &current_user, req, TransactionKind::Restock).await
}

pub async fn list_transactions(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(filter): Query<LedgerFilter>,
) -> Result<Json<Vec<LedgerEntry>>, HttpError> {
    let entries = state.stock.ledger(&current_user, &filter).await?;
    Ok(Json(entries))
}
