use log::{info, warn};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    errors::{RepositoryError, ServiceError},
    middleware::CurrentUser,
    models::{LedgerEntry, LedgerFilter, Operation, Product, StockMovement, Transaction, TransactionKind},
    repository::DynInventoryStore,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StockError {
    #[error("Insufficient stock for sale.")]
    InsufficientStock { available: i32, requested: i32 },

    #[error("Quantity must be greater than zero.")]
    NonPositiveQuantity,

    #[error("Quantity out of range.")]
    QuantityOverflow,
}

/// The stock-adjustment rule. Every store calls this inside its atomic
/// section, so the quantity a product ends up with is decided here and
/// nowhere else.
pub fn next_quantity(current: i32, kind: TransactionKind, quantity: i32) -> Result<i32, StockError> {
    if quantity <= 0 {
        return Err(StockError::NonPositiveQuantity);
    }

    match kind {
        TransactionKind::Sale if current < quantity => Err(StockError::InsufficientStock {
            available: current,
            requested: quantity,
        }),
        TransactionKind::Sale => Ok(current - quantity),
        TransactionKind::Restock => current
            .checked_add(quantity)
            .ok_or(StockError::QuantityOverflow),
    }
}

pub struct StockService {
    store: DynInventoryStore,
}

impl StockService {
    pub fn new(store: DynInventoryStore) -> Self {
        Self { store }
    }

    /// Records a sale or restock for `actor`. The single entry point for
    /// both the JSON API and the HTML forms.
    pub async fn record(
        &self,
        actor: &CurrentUser,
        product_id: Uuid,
        quantity: i32,
        kind: TransactionKind,
    ) -> Result<(Transaction, Product), ServiceError> {
        actor.require(Operation::record(kind))?;

        if quantity <= 0 {
            return Err(ServiceError::Repo(StockError::NonPositiveQuantity.into()));
        }

        let movement = StockMovement {
            product_id,
            kind,
            quantity,
            created_by: Some(actor.id),
        };

        let (transaction, product) = self
            .store
            .record_movement(&movement)
            .await
            .map_err(|err| {
                if let RepositoryError::Stock(StockError::InsufficientStock { available, requested }) = &err {
                    info!(
                        "Rejected sale of {} units on product {} by {}: {} available",
                        requested, product_id, actor.username, available
                    );
                }
                match err {
                    RepositoryError::NotFound => ServiceError::validation("Product not found."),
                    other => other.into(),
                }
            })?;

        audit(&transaction, &actor.username);

        if product.is_low_stock() {
            warn!(
                "Product {} ({}) is low on stock: {} left, threshold {}",
                product.id, product.name, product.quantity, product.low_stock_threshold
            );
        }

        Ok((transaction, product))
    }

    pub async fn ledger(
        &self,
        actor: &CurrentUser,
        filter: &LedgerFilter,
    ) -> Result<Vec<LedgerEntry>, ServiceError> {
        actor.require(Operation::ViewLedger(filter.kind))?;
        Ok(self.store.list_transactions(filter).await?)
    }
}

pub(crate) fn audit(transaction: &Transaction, username: &str) {
    info!(
        target: "audit",
        "Transaction {}: {} of {} units on product {} by user {}",
        transaction.id, transaction.kind, transaction.quantity, transaction.product_id, username
    );
}
