use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    errors::RepositoryError,
    models::{
        Category, LedgerEntry, LedgerFilter, NewProduct, NewUser, Product, ProductChanges,
        ProductFilter, StockMovement, Transaction, TransactionKind, User,
    },
    repository::InventoryStore,
    service::next_quantity,
};

#[derive(Default)]
struct State {
    users: HashMap<Uuid, User>,
    categories: HashMap<Uuid, Category>,
    products: HashMap<Uuid, Product>,
    // insertion order; the ledger reads it back to front
    transactions: Vec<Transaction>,
}

/// In-process store. One mutex guards the whole state, so a movement's
/// check, insert and quantity update can never interleave with another's.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn apply_movement(
    state: &mut State,
    movement: &StockMovement,
) -> Result<(Transaction, Product), RepositoryError> {
    let product = state
        .products
        .get_mut(&movement.product_id)
        .ok_or(RepositoryError::NotFound)?;

    product.quantity = next_quantity(product.quantity, movement.kind, movement.quantity)?;
    let product = product.clone();

    let transaction = Transaction {
        id: Uuid::new_v4(),
        product_id: movement.product_id,
        quantity: movement.quantity,
        kind: movement.kind,
        timestamp: Utc::now(),
        created_by: movement.created_by,
    };
    state.transactions.push(transaction.clone());

    Ok((transaction, product))
}

fn check_category(state: &State, category: Option<Uuid>) -> Result<(), RepositoryError> {
    match category {
        Some(id) if !state.categories.contains_key(&id) => {
            Err(RepositoryError::ForeignKey("Category not found.".to_string()))
        }
        _ => Ok(()),
    }
}

fn name_taken(state: &State, name: &str, except: Option<Uuid>) -> bool {
    state
        .categories
        .values()
        .any(|c| c.name == name && Some(c.id) != except)
}

#[async_trait]
impl InventoryStore for MemoryStore {
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        let state = self.state.lock().await;
        Ok(state.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let state = self.state.lock().await;
        Ok(state.users.values().find(|u| u.username == username).cloned())
    }

    async fn create_user(&self, user: &NewUser) -> Result<User, RepositoryError> {
        let mut state = self.state.lock().await;
        if state.users.values().any(|u| u.username == user.username) {
            return Err(RepositoryError::AlreadyExists(
                "A user with that username already exists.".to_string(),
            ));
        }

        let user = User {
            id: Uuid::new_v4(),
            username: user.username.clone(),
            password_hash: user.password_hash.clone(),
            role: user.role,
            created_at: Utc::now(),
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let state = self.state.lock().await;
        let mut categories: Vec<Category> = state.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn find_category(&self, id: Uuid) -> Result<Option<Category>, RepositoryError> {
        let state = self.state.lock().await;
        Ok(state.categories.get(&id).cloned())
    }

    async fn create_category(&self, name: &str) -> Result<Category, RepositoryError> {
        let mut state = self.state.lock().await;
        if name_taken(&state, name, None) {
            return Err(RepositoryError::AlreadyExists(
                "category with this name already exists.".to_string(),
            ));
        }

        let category = Category {
            id: Uuid::new_v4(),
            name: name.to_string(),
        };
        state.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn rename_category(&self, id: Uuid, name: &str) -> Result<Category, RepositoryError> {
        let mut state = self.state.lock().await;
        if name_taken(&state, name, Some(id)) {
            return Err(RepositoryError::AlreadyExists(
                "category with this name already exists.".to_string(),
            ));
        }

        let category = state.categories.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        category.name = name.to_string();
        Ok(category.clone())
    }

    async fn delete_category(&self, id: Uuid) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().await;
        state.categories.remove(&id).ok_or(RepositoryError::NotFound)?;

        for product in state.products.values_mut() {
            if product.category_id == Some(id) {
                product.category_id = None;
            }
        }
        Ok(())
    }

    async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, RepositoryError> {
        let state = self.state.lock().await;
        let mut products: Vec<Product> = state
            .products
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    async fn find_product(&self, id: Uuid) -> Result<Option<Product>, RepositoryError> {
        let state = self.state.lock().await;
        Ok(state.products.get(&id).cloned())
    }

    async fn create_product(
        &self,
        product: &NewProduct,
        created_by: Option<Uuid>,
    ) -> Result<(Product, Option<Transaction>), RepositoryError> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        check_category(state, product.category)?;

        let created = Product {
            id: Uuid::new_v4(),
            name: product.name.clone(),
            description: product.description.clone(),
            category_id: product.category,
            quantity: 0,
            price: product.price,
            expiry_date: product.expiry_date,
            low_stock_threshold: product.low_stock_threshold,
        };
        let id = created.id;
        state.products.insert(id, created.clone());

        if product.quantity <= 0 {
            return Ok((created, None));
        }

        let opening = StockMovement {
            product_id: id,
            kind: TransactionKind::Restock,
            quantity: product.quantity,
            created_by,
        };
        match apply_movement(state, &opening) {
            Ok((transaction, created)) => Ok((created, Some(transaction))),
            Err(err) => {
                state.products.remove(&id);
                Err(err)
            }
        }
    }

    async fn update_product(&self, id: Uuid, changes: &ProductChanges) -> Result<Product, RepositoryError> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        check_category(state, changes.category)?;

        let product = state.products.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        product.name = changes.name.clone();
        product.description = changes.description.clone();
        product.category_id = changes.category;
        product.price = changes.price;
        product.expiry_date = changes.expiry_date;
        product.low_stock_threshold = changes.low_stock_threshold;
        Ok(product.clone())
    }

    async fn delete_product(&self, id: Uuid) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().await;
        state.products.remove(&id).ok_or(RepositoryError::NotFound)?;
        state.transactions.retain(|t| t.product_id != id);
        Ok(())
    }

    async fn record_movement(&self, movement: &StockMovement) -> Result<(Transaction, Product), RepositoryError> {
        let mut state = self.state.lock().await;
        apply_movement(&mut state, movement)
    }

    async fn list_transactions(&self, filter: &LedgerFilter) -> Result<Vec<LedgerEntry>, RepositoryError> {
        let state = self.state.lock().await;
        let mut entries: Vec<LedgerEntry> = state
            .transactions
            .iter()
            .rev()
            .filter(|t| filter.kind.map_or(true, |kind| t.kind == kind))
            .filter(|t| filter.product.map_or(true, |product| t.product_id == product))
            .map(|t| LedgerEntry {
                transaction: t.clone(),
                product_name: state
                    .products
                    .get(&t.product_id)
                    .map(|p| p.name.clone())
                    .unwrap_or_default(),
                created_by_username: t
                    .created_by
                    .and_then(|id| state.users.get(&id))
                    .map(|u| u.username.clone()),
            })
            .collect();
        // stable sort keeps newest-inserted first among equal timestamps
        entries.sort_by(|a, b| b.transaction.timestamp.cmp(&a.transaction.timestamp));
        Ok(entries)
    }
}
