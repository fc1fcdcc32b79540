mod http;
mod page;
mod repository;
mod service;

pub use self::http::{ErrorResponse, HttpError};
pub use self::page::PageError;
pub use self::repository::RepositoryError;
pub use self::service::ServiceError;
