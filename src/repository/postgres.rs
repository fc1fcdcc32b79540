use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{error, info};
use sqlx::{FromRow, PgConnection, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    database::Database,
    errors::RepositoryError,
    models::{
        Category, LedgerEntry, LedgerFilter, NewProduct, NewUser, Product, ProductChanges,
        ProductFilter, Role, StockMovement, Transaction, TransactionKind, User,
    },
    repository::InventoryStore,
    service::next_quantity,
};

const PRODUCT_COLUMNS: &str =
    "id, name, description, category_id, quantity, price, expiry_date, low_stock_threshold";

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role: Role = row.role.parse().map_err(RepositoryError::Corrupt)?;
        Ok(Self {
            id: row.id,
            username: row.username,
            password_hash: row.password_hash,
            role,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct TransactionRow {
    id: Uuid,
    product_id: Uuid,
    quantity: i32,
    transaction_type: String,
    timestamp: DateTime<Utc>,
    created_by: Option<Uuid>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = RepositoryError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let kind: TransactionKind = row.transaction_type.parse().map_err(RepositoryError::Corrupt)?;
        Ok(Self {
            id: row.id,
            product_id: row.product_id,
            quantity: row.quantity,
            kind,
            timestamp: row.timestamp,
            created_by: row.created_by,
        })
    }
}

#[derive(FromRow)]
struct LedgerRow {
    #[sqlx(flatten)]
    transaction: TransactionRow,
    product_name: String,
    created_by_username: Option<String>,
}

pub struct PgStore {
    db: Database,
}

impl PgStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

/// Locks the product row, asks the stock rule for the new quantity and
/// writes both the transaction and the quantity on the caller's
/// transaction. The caller commits.
async fn apply_movement(
    conn: &mut PgConnection,
    movement: &StockMovement,
) -> Result<(Transaction, Product), RepositoryError> {
    let current = sqlx::query_scalar::<_, i32>("SELECT quantity FROM products WHERE id = $1 FOR UPDATE")
        .bind(movement.product_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(RepositoryError::NotFound)?;

    let quantity = next_quantity(current, movement.kind, movement.quantity)?;

    let transaction: Transaction = sqlx::query_as::<_, TransactionRow>(
        r#"
        INSERT INTO stock_transactions (id, product_id, quantity, transaction_type, timestamp, created_by)
        VALUES ($1, $2, $3, $4, clock_timestamp(), $5)
        RETURNING id, product_id, quantity, transaction_type, timestamp, created_by
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(movement.product_id)
    .bind(movement.quantity)
    .bind(movement.kind.as_str())
    .bind(movement.created_by)
    .fetch_one(&mut *conn)
    .await?
    .try_into()?;

    let product = sqlx::query_as::<_, Product>(&format!(
        "UPDATE products SET quantity = $2 WHERE id = $1 RETURNING {PRODUCT_COLUMNS}"
    ))
    .bind(movement.product_id)
    .bind(quantity)
    .fetch_one(&mut *conn)
    .await?;

    Ok((transaction, product))
}

#[async_trait]
impl InventoryStore for PgStore {
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        sqlx::query_as::<_, UserRow>(
            "SELECT id, username, password_hash, role, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .map(User::try_from)
        .transpose()
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        sqlx::query_as::<_, UserRow>(
            "SELECT id, username, password_hash, role, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?
        .map(User::try_from)
        .transpose()
    }

    async fn create_user(&self, user: &NewUser) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, username, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, password_hash, role, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .fetch_one(&self.db)
        .await
        .map_err(|err| {
            RepositoryError::from(err).or_already_exists("A user with that username already exists.")
        })?;

        info!("Created {} account {}", user.role, user.username);
        row.try_into()
    }

    async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let categories = sqlx::query_as::<_, Category>("SELECT id, name FROM categories ORDER BY name")
            .fetch_all(&self.db)
            .await?;
        Ok(categories)
    }

    async fn find_category(&self, id: Uuid) -> Result<Option<Category>, RepositoryError> {
        let category = sqlx::query_as::<_, Category>("SELECT id, name FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(category)
    }

    async fn create_category(&self, name: &str) -> Result<Category, RepositoryError> {
        sqlx::query_as::<_, Category>("INSERT INTO categories (id, name) VALUES ($1, $2) RETURNING id, name")
            .bind(Uuid::new_v4())
            .bind(name)
            .fetch_one(&self.db)
            .await
            .map_err(|err| {
                RepositoryError::from(err).or_already_exists("category with this name already exists.")
            })
    }

    async fn rename_category(&self, id: Uuid, name: &str) -> Result<Category, RepositoryError> {
        sqlx::query_as::<_, Category>("UPDATE categories SET name = $2 WHERE id = $1 RETURNING id, name")
            .bind(id)
            .bind(name)
            .fetch_one(&self.db)
            .await
            .map_err(|err| {
                RepositoryError::from(err).or_already_exists("category with this name already exists.")
            })
    }

    async fn delete_category(&self, id: Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, RepositoryError> {
        let mut query = QueryBuilder::<Postgres>::new(format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE TRUE"));

        if let Some(category) = filter.category {
            query.push(" AND category_id = ").push_bind(category);
        }
        if let Some(term) = filter.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = format!("%{term}%");
            query
                .push(" AND (name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if filter.low_stock == Some(true) {
            query.push(" AND quantity <= low_stock_threshold");
        }
        query.push(" ORDER BY name");

        let products = query
            .build_query_as::<Product>()
            .fetch_all(&self.db)
            .await
            .map_err(|e| {
                error!("Failed to fetch products: {}", e);
                RepositoryError::from(e)
            })?;
        Ok(products)
    }

    async fn find_product(&self, id: Uuid) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(product)
    }

    async fn create_product(
        &self,
        product: &NewProduct,
        created_by: Option<Uuid>,
    ) -> Result<(Product, Option<Transaction>), RepositoryError> {
        let mut tx = self.db.begin().await?;

        let created = sqlx::query_as::<_, Product>(&format!(
            r#"
            INSERT INTO products (id, name, description, category_id, quantity, price, expiry_date, low_stock_threshold)
            VALUES ($1, $2, $3, $4, 0, $5, $6, $7)
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.category)
        .bind(product.price)
        .bind(product.expiry_date)
        .bind(product.low_stock_threshold)
        .fetch_one(&mut *tx)
        .await
        .map_err(|err| match RepositoryError::from(err) {
            RepositoryError::ForeignKey(_) => RepositoryError::ForeignKey("Category not found.".to_string()),
            other => other,
        })?;

        let result = if product.quantity > 0 {
            let opening = StockMovement {
                product_id: created.id,
                kind: TransactionKind::Restock,
                quantity: product.quantity,
                created_by,
            };
            let (transaction, created) = apply_movement(&mut *tx, &opening).await?;
            (created, Some(transaction))
        } else {
            (created, None)
        };

        tx.commit().await?;
        Ok(result)
    }

    async fn update_product(&self, id: Uuid, changes: &ProductChanges) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>(&format!(
            r#"
            UPDATE products
            SET name = $2,
                description = $3,
                category_id = $4,
                price = $5,
                expiry_date = $6,
                low_stock_threshold = $7
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.description)
        .bind(changes.category)
        .bind(changes.price)
        .bind(changes.expiry_date)
        .bind(changes.low_stock_threshold)
        .fetch_one(&self.db)
        .await
        .map_err(|err| match RepositoryError::from(err) {
            RepositoryError::ForeignKey(_) => RepositoryError::ForeignKey("Category not found.".to_string()),
            other => other,
        })
    }

    async fn delete_product(&self, id: Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn record_movement(&self, movement: &StockMovement) -> Result<(Transaction, Product), RepositoryError> {
        let mut tx = self.db.begin().await?;
        let result = apply_movement(&mut *tx, movement).await?;
        tx.commit().await?;
        Ok(result)
    }

    async fn list_transactions(&self, filter: &LedgerFilter) -> Result<Vec<LedgerEntry>, RepositoryError> {
        let mut query = QueryBuilder::<Postgres>::new(
            r#"
            SELECT t.id, t.product_id, t.quantity, t.transaction_type, t.timestamp, t.created_by,
                   p.name AS product_name,
                   u.username AS created_by_username
            FROM stock_transactions t
            JOIN products p ON t.product_id = p.id
            LEFT JOIN users u ON t.created_by = u.id
            WHERE TRUE
            "#,
        );

        if let Some(kind) = filter.kind {
            query.push(" AND t.transaction_type = ").push_bind(kind.as_str());
        }
        if let Some(product) = filter.product {
            query.push(" AND t.product_id = ").push_bind(product);
        }
        query.push(" ORDER BY t.timestamp DESC, t.seq DESC");

        query
            .build_query_as::<LedgerRow>()
            .fetch_all(&self.db)
            .await?
            .into_iter()
            .map(|row| -> Result<LedgerEntry, RepositoryError> {
                Ok(LedgerEntry {
                    transaction: row.transaction.try_into()?,
                    product_name: row.product_name,
                    created_by_username: row.created_by_username,
                })
            })
            .collect()
    }
}
