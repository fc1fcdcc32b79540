use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use serde::{Deserialize, Serialize};
use tower_cookies::Cookies;
use uuid::Uuid;

use crate::{
    errors::{HttpError, PageError, ServiceError},
    models::{Operation, Role, User},
    state::AppState,
};

pub const AUTH_COOKIE: &str = "auth_token";

/// The authenticated actor behind a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
}

impl CurrentUser {
    pub fn can(&self, operation: Operation) -> bool {
        self.role.allows(operation)
    }

    pub fn require(&self, operation: Operation) -> Result<(), ServiceError> {
        if self.can(operation) {
            Ok(())
        } else {
            Err(ServiceError::forbidden())
        }
    }

    // Helper for templates
    pub fn is_manager(&self) -> bool {
        self.role == Role::Manager
    }
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
        }
    }
}

/// `Authorization: Bearer <token>` or `Authorization: JWT <token>`.
fn header_token(parts: &Parts) -> Option<String> {
    let value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;

    if scheme.eq_ignore_ascii_case("bearer") || scheme.eq_ignore_ascii_case("jwt") {
        Some(token.trim().to_string())
    } else {
        None
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = match header_token(parts) {
            Some(token) => token,
            None => {
                let cookies = Cookies::from_request_parts(parts, state)
                    .await
                    .map_err(|(_, msg)| HttpError::Internal(msg.to_string()))?;
                cookies
                    .get(AUTH_COOKIE)
                    .map(|cookie| cookie.value().to_string())
                    .ok_or(HttpError::from(ServiceError::Unauthenticated))?
            }
        };

        state.auth.authenticate(&token).await.map_err(HttpError::from)
    }
}

/// `CurrentUser` for HTML pages. A missing or stale token sends the visitor
/// to the login page; any other failure renders the error page.
pub struct PageUser(pub CurrentUser);

#[async_trait]
impl FromRequestParts<AppState> for PageUser {
    type Rejection = PageError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        CurrentUser::from_request_parts(parts, state)
            .await
            .map(PageUser)
            .map_err(PageError::from)
    }
}
