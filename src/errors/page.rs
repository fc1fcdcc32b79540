use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use log::error;

use crate::errors::{HttpError, ServiceError};

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate {
    status_code: u16,
    message: String,
}

/// Error side of the HTML handlers: anonymous visitors go to the login
/// page, everything else renders the error page with the mapped status.
#[derive(Debug)]
pub enum PageError {
    Login,
    Status(StatusCode, String),
}

impl From<ServiceError> for PageError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Unauthenticated | ServiceError::Jwt(_) => PageError::Login,
            other => {
                let http = HttpError::from(other);
                PageError::Status(http.status(), http.detail().to_string())
            }
        }
    }
}

impl From<HttpError> for PageError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Unauthorized(_) => PageError::Login,
            other => PageError::Status(other.status(), other.detail().to_string()),
        }
    }
}

impl From<askama::Error> for PageError {
    fn from(err: askama::Error) -> Self {
        error!("Template rendering failed: {}", err);
        PageError::Status(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error.".into())
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        match self {
            PageError::Login => Redirect::to("/login").into_response(),
            PageError::Status(status, message) => {
                let template = ErrorTemplate {
                    status_code: status.as_u16(),
                    message,
                };
                match template.render() {
                    Ok(html) => (status, Html(html)).into_response(),
                    Err(_) => (status, template.message).into_response(),
                }
            }
        }
    }
}
