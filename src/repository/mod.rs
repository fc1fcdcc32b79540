mod memory;
mod postgres;

pub use self::memory::MemoryStore;
pub use self::postgres::PgStore;

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    errors::RepositoryError,
    models::{
        Category, LedgerEntry, LedgerFilter, NewProduct, NewUser, Product, ProductChanges,
        ProductFilter, StockMovement, Transaction, User,
    },
};

pub type DynInventoryStore = Arc<dyn InventoryStore + Send + Sync>;

/// Storage for users, the catalog and the transaction ledger.
///
/// Implementations must apply `record_movement` (and the opening stock of
/// `create_product`) as one atomic unit that serializes concurrent movements
/// on the same product, and must decide the new quantity with
/// [`crate::service::next_quantity`].
#[async_trait]
pub trait InventoryStore {
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, RepositoryError>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError>;
    async fn create_user(&self, user: &NewUser) -> Result<User, RepositoryError>;

    async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError>;
    async fn find_category(&self, id: Uuid) -> Result<Option<Category>, RepositoryError>;
    async fn create_category(&self, name: &str) -> Result<Category, RepositoryError>;
    async fn rename_category(&self, id: Uuid, name: &str) -> Result<Category, RepositoryError>;
    /// Products in the category keep existing with no category.
    async fn delete_category(&self, id: Uuid) -> Result<(), RepositoryError>;

    async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, RepositoryError>;
    async fn find_product(&self, id: Uuid) -> Result<Option<Product>, RepositoryError>;
    /// Inserts the product at zero and, when `product.quantity` is positive,
    /// records the opening restock in the same unit.
    async fn create_product(
        &self,
        product: &NewProduct,
        created_by: Option<Uuid>,
    ) -> Result<(Product, Option<Transaction>), RepositoryError>;
    async fn update_product(&self, id: Uuid, changes: &ProductChanges) -> Result<Product, RepositoryError>;
    /// Removes the product together with its transactions.
    async fn delete_product(&self, id: Uuid) -> Result<(), RepositoryError>;

    async fn record_movement(&self, movement: &StockMovement) -> Result<(Transaction, Product), RepositoryError>;
    /// Newest first.
    async fn list_transactions(&self, filter: &LedgerFilter) -> Result<Vec<LedgerEntry>, RepositoryError>;
}
