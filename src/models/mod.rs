pub mod inventory;
pub mod role;
pub mod user;

pub use inventory::{
    Category, Product, ProductDisplay,
    Transaction, TransactionKind, LedgerEntry, StockMovement,
    LedgerFilter, ProductFilter,
    NewCategory, NewProduct, ProductChanges,
    DEFAULT_LOW_STOCK_THRESHOLD,
};
pub use role::{Role, Operation};
pub use user::{User, NewUser, CreateUser, LoginRequest, UserResponse};
