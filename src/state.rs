use std::sync::Arc;

use crate::{
    repository::DynInventoryStore,
    service::{AuthService, AuthSettings, CatalogService, StockService},
};

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub catalog: Arc<CatalogService>,
    pub stock: Arc<StockService>,
}

impl AppState {
    pub fn new(store: DynInventoryStore, auth: AuthSettings) -> Self {
        Self {
            auth: Arc::new(AuthService::new(store.clone(), auth)),
            catalog: Arc::new(CatalogService::new(store.clone())),
            stock: Arc::new(StockService::new(store)),
        }
    }
}
