pub mod permission;

pub use permission::{CurrentUser, PageUser, AUTH_COOKIE};
