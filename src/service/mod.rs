mod auth;
mod catalog;
mod stock;

pub use self::auth::{AuthService, AuthSettings};
pub use self::catalog::{CatalogService, CatalogSummary};
pub use self::stock::{next_quantity, StockError, StockService};
