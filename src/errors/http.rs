use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use log::error;
use serde::{Deserialize, Serialize};

use crate::errors::{RepositoryError, ServiceError};

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

#[derive(Debug)]
pub enum HttpError {
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Internal(String),
}

impl HttpError {
    pub fn status(&self) -> StatusCode {
        match self {
            HttpError::BadRequest(_) => StatusCode::BAD_REQUEST,
            HttpError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            HttpError::Forbidden(_) => StatusCode::FORBIDDEN,
            HttpError::NotFound(_) => StatusCode::NOT_FOUND,
            HttpError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            HttpError::BadRequest(msg)
            | HttpError::Unauthorized(msg)
            | HttpError::Forbidden(msg)
            | HttpError::NotFound(msg)
            | HttpError::Internal(msg) => msg,
        }
    }
}

impl From<ServiceError> for HttpError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(errors) => HttpError::BadRequest(errors.join(" ")),

            ServiceError::Forbidden(msg) => HttpError::Forbidden(msg),

            ServiceError::Unauthenticated => HttpError::Unauthorized(
                "Authentication credentials were not provided.".into(),
            ),

            ServiceError::InvalidCredentials => HttpError::Unauthorized(
                "No active account found with the given credentials.".into(),
            ),

            ServiceError::Jwt(_) => HttpError::Unauthorized("Given token not valid.".into()),

            ServiceError::Repo(repo_err) => match repo_err {
                RepositoryError::NotFound => HttpError::NotFound("Not found.".into()),
                RepositoryError::AlreadyExists(msg) => HttpError::BadRequest(msg),
                RepositoryError::ForeignKey(msg) => HttpError::BadRequest(msg),
                RepositoryError::Stock(stock_err) => HttpError::BadRequest(stock_err.to_string()),
                other => {
                    error!("Repository failure: {}", other);
                    HttpError::Internal("Internal server error.".into())
                }
            },

            ServiceError::Bcrypt(err) => {
                error!("Password hashing failed: {}", err);
                HttpError::Internal("Internal server error.".into())
            }
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(ErrorResponse {
            detail: self.detail().to_string(),
        });

        (status, body).into_response()
    }
}
