use chrono::Utc;
use log::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
    errors::{RepositoryError, ServiceError},
    middleware::CurrentUser,
    models::{Category, NewCategory, NewProduct, Operation, Product, ProductChanges, ProductFilter},
    repository::DynInventoryStore,
    service::stock::audit,
};

/// Counts and alert lists for the dashboard.
#[derive(Debug, Clone)]
pub struct CatalogSummary {
    pub category_count: usize,
    pub product_count: usize,
    pub low_stock: Vec<Product>,
    pub expired: Vec<Product>,
}

pub struct CatalogService {
    store: DynInventoryStore,
}

impl CatalogService {
    pub fn new(store: DynInventoryStore) -> Self {
        Self { store }
    }

    pub async fn list_categories(&self, actor: &CurrentUser) -> Result<Vec<Category>, ServiceError> {
        actor.require(Operation::ReadCatalog)?;
        Ok(self.store.list_categories().await?)
    }

    pub async fn get_category(&self, actor: &CurrentUser, id: Uuid) -> Result<Category, ServiceError> {
        actor.require(Operation::ReadCatalog)?;
        self.store
            .find_category(id)
            .await?
            .ok_or(ServiceError::Repo(RepositoryError::NotFound))
    }

    pub async fn create_category(
        &self,
        actor: &CurrentUser,
        req: &NewCategory,
    ) -> Result<Category, ServiceError> {
        actor.require(Operation::ManageCatalog)?;
        let req = req.normalized();
        req.validate()?;

        let category = self.store.create_category(&req.name).await?;
        info!("{} created category {} ({})", actor.username, category.name, category.id);
        Ok(category)
    }

    pub async fn rename_category(
        &self,
        actor: &CurrentUser,
        id: Uuid,
        req: &NewCategory,
    ) -> Result<Category, ServiceError> {
        actor.require(Operation::ManageCatalog)?;
        let req = req.normalized();
        req.validate()?;

        let category = self.store.rename_category(id, &req.name).await?;
        info!("{} renamed category {} to {}", actor.username, category.id, category.name);
        Ok(category)
    }

    pub async fn delete_category(&self, actor: &CurrentUser, id: Uuid) -> Result<(), ServiceError> {
        actor.require(Operation::ManageCatalog)?;
        self.store.delete_category(id).await?;
        info!("{} deleted category {}", actor.username, id);
        Ok(())
    }

    pub async fn list_products(
        &self,
        actor: &CurrentUser,
        filter: &ProductFilter,
    ) -> Result<Vec<Product>, ServiceError> {
        actor.require(Operation::ReadCatalog)?;
        Ok(self.store.list_products(filter).await?)
    }

    pub async fn get_product(&self, actor: &CurrentUser, id: Uuid) -> Result<Product, ServiceError> {
        actor.require(Operation::ReadCatalog)?;
        self.store
            .find_product(id)
            .await?
            .ok_or(ServiceError::Repo(RepositoryError::NotFound))
    }

    /// Creates the product; a positive starting quantity is booked as an
    /// opening restock by `actor`.
    pub async fn create_product(
        &self,
        actor: &CurrentUser,
        req: &NewProduct,
    ) -> Result<Product, ServiceError> {
        actor.require(Operation::ManageCatalog)?;
        let req = req.normalized();
        req.validate()?;

        let (product, opening) = self
            .store
            .create_product(&req, Some(actor.id))
            .await
            .map_err(unknown_category)?;

        info!("{} created product {} ({})", actor.username, product.name, product.id);
        if let Some(transaction) = opening {
            audit(&transaction, &actor.username);
        }
        Ok(product)
    }

    pub async fn update_product(
        &self,
        actor: &CurrentUser,
        id: Uuid,
        changes: &ProductChanges,
    ) -> Result<Product, ServiceError> {
        actor.require(Operation::ManageCatalog)?;
        let changes = changes.normalized();
        changes.validate()?;

        let product = self
            .store
            .update_product(id, &changes)
            .await
            .map_err(unknown_category)?;
        info!("{} updated product {} ({})", actor.username, product.name, product.id);
        Ok(product)
    }

    pub async fn delete_product(&self, actor: &CurrentUser, id: Uuid) -> Result<(), ServiceError> {
        actor.require(Operation::ManageCatalog)?;
        self.store.delete_product(id).await?;
        info!("{} deleted product {} and its transactions", actor.username, id);
        Ok(())
    }

    pub async fn summary(&self, actor: &CurrentUser) -> Result<CatalogSummary, ServiceError> {
        actor.require(Operation::ReadCatalog)?;

        let categories = self.store.list_categories().await?;
        let products = self.store.list_products(&ProductFilter::default()).await?;
        let today = Utc::now().date_naive();

        Ok(CatalogSummary {
            category_count: categories.len(),
            product_count: products.len(),
            low_stock: products.iter().filter(|p| p.is_low_stock()).cloned().collect(),
            expired: products.into_iter().filter(|p| p.is_expired_on(today)).collect(),
        })
    }
}

fn unknown_category(err: RepositoryError) -> ServiceError {
    match err {
        RepositoryError::ForeignKey(msg) => ServiceError::validation(msg),
        other => other.into(),
    }
}
