pub mod api;
pub mod auth;
pub mod dashboard;
pub mod inventory;
pub mod sales;

use crate::errors::{HttpError, PageError, ServiceError};

/// Splits a failed form submission into messages to show next to the form
/// and errors that replace the whole page.
pub(crate) fn form_errors(err: ServiceError) -> Result<Vec<String>, PageError> {
    match err {
        ServiceError::Validation(messages) => Ok(messages),
        ServiceError::Unauthenticated | ServiceError::Jwt(_) => Err(PageError::Login),
        other => match HttpError::from(other) {
            HttpError::BadRequest(detail) => Ok(vec![detail]),
            http => Err(PageError::Status(http.status(), http.detail().to_string())),
        },
    }
}
